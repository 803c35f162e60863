//! Pipelines -- fit a model, then score the same variants by it.
//!
//! This module also has the two steps of the pipeline, used by the subcommands as well.
use definitions::VariantSet;
use serde::{Deserialize, Serialize};
extern crate log;
use log::*;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use variant_optimizer::diagnostics::{self, OptimizationCurve};
use variant_optimizer::{DataManager, GaussianMixtureModel, GmmConfig};
use variant_optimizer::{Recalibrate, RecalibrateConfig};

/// The configuration of the pipeline.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PipelineConfig {
    /// The path to the input file, a JSON-encoded variant set.
    input_file: PathBuf,
    /// The path to the output directory.
    out_dir: PathBuf,
    prefix: String,
    verbose: usize,
    threads: usize,
    seed: u64,
    annotations: Vec<String>,
    num_gaussians: usize,
    num_iterations: usize,
    #[serde(default)]
    min_var_in_cluster: usize,
    #[serde(default)]
    max_ac: usize,
    #[serde(default = "default_back_off")]
    back_off: f64,
    #[serde(default)]
    use_ac_prior: bool,
    target_titv: f64,
    #[serde(default)]
    desired_num_variants: usize,
}

fn default_back_off() -> f64 {
    1f64
}

pub fn run_pipeline(config: &PipelineConfig) -> std::io::Result<()> {
    let PipelineConfig {
        input_file,
        out_dir,
        prefix,
        verbose,
        threads,
        seed,
        annotations,
        num_gaussians,
        num_iterations,
        min_var_in_cluster,
        max_ac,
        back_off,
        use_ac_prior,
        target_titv,
        desired_num_variants,
    } = config.clone();
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    if let Err(why) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        debug!("{:?}", why);
    }
    std::fs::create_dir_all(&out_dir)?;
    let file_stem = out_dir.join(prefix);
    let clusters = file_stem.with_extension("clusters");
    let report = file_stem.with_extension("report");
    let curve = file_stem.with_extension("curve");
    let recalibrated = file_stem.with_extension("json");
    let gmm_config = GmmConfig::new(
        num_gaussians,
        num_iterations,
        min_var_in_cluster,
        max_ac,
        seed,
    );
    let recal_config =
        RecalibrateConfig::new(target_titv, back_off, use_ac_prior, desired_num_variants);
    let mut ds = parse_json(&input_file)?;
    let report = report.to_str();
    fit(&ds, &annotations, &gmm_config, &clusters, report)?;
    let curve = curve.to_str();
    apply(&mut ds, &clusters, &recal_config, curve)?;
    log(&ds, &recalibrated)
}

/// Fit a model on `ds` and write it into `cluster_file`. If `report` is given,
/// the histograms of the annotations are written as well.
pub fn fit(
    ds: &VariantSet,
    annotations: &[String],
    config: &GmmConfig,
    cluster_file: &Path,
    report: Option<&str>,
) -> std::io::Result<GaussianMixtureModel> {
    debug!("START\tFit");
    let data = DataManager::from_variants(annotations, &ds.variants).map_err(|e| {
        error!("{}", e);
        e
    })?;
    if let Some(prefix) = report {
        diagnostics::write_cluster_reports(&data, prefix)?;
    }
    let model = GaussianMixtureModel::new(*config, &data).and_then(|mut model| {
        model.run(&data, cluster_file)?;
        Ok(model)
    });
    let model = match model {
        Ok(model) => model,
        Err(why) => {
            error!("{}", why);
            return Err(why.into());
        }
    };
    debug!("END\tFit");
    Ok(model)
}

/// Score `ds` by the model in `cluster_file`, filling the recalibrated qualities.
pub fn apply(
    ds: &mut VariantSet,
    cluster_file: &Path,
    config: &RecalibrateConfig,
    curve: Option<&str>,
) -> std::io::Result<OptimizationCurve> {
    debug!("START\tApply");
    let back_off = config.back_off_gaussian_factor;
    let model = GaussianMixtureModel::from_cluster_file(cluster_file, back_off).map_err(|e| {
        error!("{}", e);
        e
    })?;
    let data = ds.recalibrate(&model, config).map_err(|e| {
        error!("{}", e);
        e
    })?;
    let result =
        diagnostics::optimization_curve(&data, config.target_titv, config.desired_num_variants);
    for cutoff in result.cutoffs.iter() {
        let q_cut = cutoff.point.q_cut;
        let percent = cutoff.fraction * 100f64;
        info!("{:.0}%\t{}\tQUAL >= {:.1}", percent, ds.passing(q_cut), q_cut);
    }
    if let Some(prefix) = curve {
        diagnostics::write_optimization_curve(&result, prefix)?;
    }
    debug!("END\tApply");
    Ok(result)
}

fn parse_json(filename: &Path) -> std::io::Result<VariantSet> {
    debug!("Opening {filename:?}");
    let rdr = std::fs::File::open(filename).map(BufReader::new)?;
    serde_json::de::from_reader(rdr).map_err(std::io::Error::from)
}

fn log(ds: &VariantSet, path: &Path) -> std::io::Result<()> {
    let mut wtr = std::fs::File::create(path).map(BufWriter::new)?;
    serde_json::ser::to_writer(&mut wtr, ds)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use definitions::RawVariant;
    fn tmp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vopt_cli_{}_{}", std::process::id(), name))
    }
    fn dataset() -> VariantSet {
        let variants: Vec<_> = (0..200)
            .map(|i| {
                let qd = (i % 20) as f64 + 0.5 * (i % 3) as f64;
                let sb = ((i * 7) % 13) as f64 * 0.1;
                let mut v = RawVariant::new(&format!("chr1:{}", i * 100), 30f64)
                    .with_attribute("QD", &format!("{}", qd))
                    .with_attribute("SB", &format!("{}", sb));
                v.is_known = i % 3 == 0;
                v.is_transition = i % 3 != 2;
                v.allele_count = 1 + i % 2;
                v
            })
            .collect();
        VariantSet::new("test.vcf", variants)
    }
    #[test]
    fn fit_then_apply() {
        let mut ds = dataset();
        let keys = vec!["QD".to_string(), "SB".to_string()];
        let config = GmmConfig::new(2, 5, 0, 0, 4324);
        let clusters = tmp_path("fit_then_apply.clusters");
        let model = fit(&ds, &keys, &config, &clusters, None).unwrap();
        assert!(clusters.exists());
        assert!(!model.clusters().is_empty());
        let recal = RecalibrateConfig::default();
        let curve = apply(&mut ds, &clusters, &recal, None).unwrap();
        assert!(ds.variants.iter().all(|v| v.recalibrated_qual.is_some()));
        assert_eq!(curve.points.len(), diagnostics::NUM_QUAL_CUTS);
        let last = curve.points.last().unwrap();
        assert_eq!(last.num_known + last.num_novel, 200);
    }
    #[test]
    fn no_gaussians() {
        let ds = dataset();
        let keys = vec!["QD".to_string()];
        let config = GmmConfig::new(0, 5, 0, 0, 4324);
        let clusters = tmp_path("no_gaussians.clusters");
        let err = fit(&ds, &keys, &config, &clusters, None).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert!(!clusters.exists());
    }
    #[test]
    fn missing_cluster_file() {
        let mut ds = dataset();
        let path = tmp_path("no_such_file.clusters");
        let recal = RecalibrateConfig::default();
        let err = apply(&mut ds, &path, &recal, None).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
    #[test]
    fn profile() {
        let profile = r#"
input_file = "variants.json"
out_dir = "result"
prefix = "sample"
verbose = 1
threads = 4
seed = 42
annotations = ["QD", "SB", "HRun"]
num_gaussians = 4
num_iterations = 10
target_titv = 2.1
use_ac_prior = true
"#;
        let config: PipelineConfig = toml::from_str(profile).unwrap();
        assert_eq!(config.annotations.len(), 3);
        assert_eq!(config.back_off, 1f64);
        assert_eq!(config.max_ac, 0);
        assert!(config.use_ac_prior);
    }
}
