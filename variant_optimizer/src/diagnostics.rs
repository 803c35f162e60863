//! Diagnostics of a clustering: per-annotation histograms of known/novel variants,
//! and a sweep over quality cutoffs looking for the novel Ti/Tv ratio to reach the target.
use crate::data_manager::DataManager;
use crate::error::{OptimizerError, Result};
use definitions::VariantDatum;
use std::io::{BufWriter, Write};

const STD_STEP: f64 = 0.2;
const MAX_STD: f64 = 4.0;
const MIN_STD: f64 = -4.0;
/// Bins are centered at -4.0, -3.8, ..., 4.0.
pub const NUM_STD_BINS: usize = 41;
pub const MAX_QUAL: f64 = 100.0;
/// The cutoffs are swept by 0.1.
const QUAL_STEPS_PER_UNIT: usize = 10;
pub const NUM_QUAL_CUTS: usize = MAX_QUAL as usize * QUAL_STEPS_PER_UNIT + 1;
/// Fractions of the target Ti/Tv ratio, searched in this order.
pub const TITV_FRACTIONS: [f64; 4] = [0.90, 0.95, 0.98, 1.00];

#[derive(Debug, Clone)]
pub struct AnnotationHistogram {
    pub annotation: String,
    /// (annotation value, density of known variants, density of novel variants)
    pub bins: Vec<(f64, f64, f64)>,
}

fn std_bin(z: f64) -> usize {
    let bin = ((z - MIN_STD) * (1f64 / STD_STEP)).round();
    bin.max(0f64).min((NUM_STD_BINS - 1) as f64) as usize
}

/// Histograms of the normalized annotations, clamped into [-4,4] standard deviations.
pub fn annotation_histograms(data: &DataManager) -> Vec<AnnotationHistogram> {
    assert!((MAX_STD - MIN_STD) / STD_STEP < NUM_STD_BINS as f64);
    let dim = data.num_annotations();
    // counts[annotation][bin] = (novel, known)
    let mut counts = vec![vec![(0usize, 0usize); NUM_STD_BINS]; dim];
    for datum in data.data.iter() {
        for (hist, &z) in counts.iter_mut().zip(datum.annotations.iter()) {
            let bin = &mut hist[std_bin(z)];
            match datum.is_known {
                true => bin.1 += 1,
                false => bin.0 += 1,
            }
        }
    }
    let total_known = data.data.iter().filter(|d| d.is_known).count() as f64;
    let total_novel = data.num_variants() as f64 - total_known;
    counts
        .iter()
        .enumerate()
        .map(|(j, hist)| {
            let bins = hist
                .iter()
                .enumerate()
                .map(|(i, &(novel, known))| {
                    let value = data.denormalize(j, i as f64 * STD_STEP + MIN_STD);
                    (value, known as f64 / total_known, novel as f64 / total_novel)
                })
                .collect();
            AnnotationHistogram {
                annotation: data.annotation_keys[j].clone(),
                bins,
            }
        })
        .collect()
}

/// Write `<prefix>.<annotation>.dat` for each annotation.
pub fn write_cluster_reports(data: &DataManager, prefix: &str) -> Result<()> {
    for hist in annotation_histograms(data) {
        let path = format!("{}.{}.dat", prefix, hist.annotation);
        let mut wtr = create(&path)?;
        writeln!(wtr, "annotationValue,knownDist,novelDist")?;
        for (value, known, novel) in hist.bins.iter() {
            writeln!(wtr, "{},{},{}", value, known, novel)?;
        }
        wtr.flush()?;
        debug!("REPORT\t{}", path);
    }
    Ok(())
}

fn create(path: &str) -> Result<BufWriter<std::fs::File>> {
    std::fs::File::create(path)
        .map(BufWriter::new)
        .map_err(|e| OptimizerError::resource(path, e))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPoint {
    pub q_cut: f64,
    pub num_known: usize,
    pub num_novel: usize,
    /// None if either the number of transitions or transversions is zero.
    pub known_titv: Option<f64>,
    pub novel_titv: Option<f64>,
}

impl CutPoint {
    pub fn dbsnp_rate(&self) -> f64 {
        100f64 * self.num_known as f64 / (self.num_known + self.num_novel) as f64
    }
    fn log(&self) {
        info!(
            "Keeping variants with QUAL >= {:.1} results in a filtered set with: ",
            self.q_cut
        );
        info!("\t{} known variants", self.num_known);
        info!(
            "\t{} novel variants, (dbSNP rate = {:.2}%)",
            self.num_novel,
            self.dbsnp_rate()
        );
        info!(
            "\t{:.4} known Ti/Tv ratio",
            self.known_titv.unwrap_or(f64::NAN)
        );
        info!(
            "\t{:.4} novel Ti/Tv ratio",
            self.novel_titv.unwrap_or(f64::NAN)
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityCutoff {
    /// Fraction of the target Ti/Tv ratio.
    pub fraction: f64,
    pub point: CutPoint,
}

#[derive(Debug, Clone)]
pub struct OptimizationCurve {
    pub target_titv: f64,
    /// From the strictest cut (MAX_QUAL) to the most permissive (0.0).
    pub points: Vec<CutPoint>,
    /// At most four, in the order of `TITV_FRACTIONS`.
    pub cutoffs: Vec<QualityCutoff>,
    /// The strictest cut retaining the desired number of variants, if requested.
    pub desired: Option<CutPoint>,
}

#[derive(Debug, Clone, Copy, Default)]
struct TiTvCounter {
    known_ti: usize,
    known_tv: usize,
    novel_ti: usize,
    novel_tv: usize,
}

fn titv(ti: usize, tv: usize) -> Option<f64> {
    match ti == 0 || tv == 0 {
        true => None,
        false => Some(ti as f64 / tv as f64),
    }
}

impl TiTvCounter {
    fn add(&mut self, datum: &VariantDatum) {
        match (datum.is_known, datum.is_transition) {
            (true, true) => self.known_ti += 1,
            (true, false) => self.known_tv += 1,
            (false, true) => self.novel_ti += 1,
            (false, false) => self.novel_tv += 1,
        }
    }
    fn point(&self, q_cut: f64) -> CutPoint {
        CutPoint {
            q_cut,
            num_known: self.known_ti + self.known_tv,
            num_novel: self.novel_ti + self.novel_tv,
            known_titv: titv(self.known_ti, self.known_tv),
            novel_titv: titv(self.novel_ti, self.novel_tv),
        }
    }
}

/// Sweep the quality cutoff from MAX_QUAL down to zero by 0.1, accumulating the variants
/// passing each cut. Then, starting from the most permissive cut and moving toward stricter
/// ones, find the cuts where the novel Ti/Tv ratio first reaches each of `TITV_FRACTIONS`
/// of `target_titv`. Each cut can satisfy at most one fraction.
pub fn optimization_curve(
    data: &[VariantDatum],
    target_titv: f64,
    desired_num_variants: usize,
) -> OptimizationCurve {
    let mut order: Vec<&VariantDatum> = data.iter().filter(|d| !d.quality.is_nan()).collect();
    order.sort_by(|x, y| y.quality.partial_cmp(&x.quality).unwrap());
    let mut order = order.into_iter().peekable();
    let mut counter = TiTvCounter::default();
    let mut desired = None;
    let points: Vec<_> = (0..NUM_QUAL_CUTS)
        .map(|i| {
            let q_cut = (NUM_QUAL_CUTS - 1 - i) as f64 / QUAL_STEPS_PER_UNIT as f64;
            while let Some(datum) = order.next_if(|d| q_cut <= d.quality) {
                counter.add(datum);
            }
            let point = counter.point(q_cut);
            let total = point.num_known + point.num_novel;
            if desired_num_variants != 0 && desired.is_none() && desired_num_variants <= total {
                point.log();
                desired = Some(point);
            }
            point
        })
        .collect();
    let mut cutoffs: Vec<QualityCutoff> = vec![];
    for point in points.iter().rev() {
        let fraction = match TITV_FRACTIONS.get(cutoffs.len()) {
            Some(&fraction) => fraction,
            None => break,
        };
        if fraction * target_titv <= point.novel_titv.unwrap_or(0f64) {
            point.log();
            cutoffs.push(QualityCutoff {
                fraction,
                point: *point,
            });
        }
    }
    if cutoffs.len() < TITV_FRACTIONS.len() {
        warn!(
            "Only {} of {} Ti/Tv quantiles were reached (target Ti/Tv = {})",
            cutoffs.len(),
            TITV_FRACTIONS.len(),
            target_titv
        );
    }
    OptimizationCurve {
        target_titv,
        points,
        cutoffs,
        desired,
    }
}

fn format_titv(titv: Option<f64>) -> String {
    match titv {
        Some(x) => format!("{}", x),
        None => "NaN".to_string(),
    }
}

/// Write `<prefix>.dat`.
pub fn write_optimization_curve(curve: &OptimizationCurve, prefix: &str) -> Result<()> {
    let path = format!("{}.dat", prefix);
    let mut wtr = create(&path)?;
    writeln!(wtr, "pCut,numKnown,numNovel,knownTITV,novelTITV")?;
    for point in curve.points.iter() {
        writeln!(
            wtr,
            "{},{},{},{},{}",
            point.q_cut,
            point.num_known,
            point.num_novel,
            format_titv(point.known_titv),
            format_titv(point.novel_titv)
        )?;
    }
    wtr.flush()?;
    Ok(())
}
