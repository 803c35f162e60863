//! Gaussian mixture model on the normalized annotations of variants.
//! The model is fitted by a fixed number of EM iterations. There is no convergence test;
//! the parameters after each iteration are written as a checkpoint instead.
use crate::cluster::Cluster;
use crate::cluster_file::{self, MAX_ALLELE_COUNT};
use crate::data_manager::DataManager;
use crate::error::{OptimizerError, Result};
use definitions::{RawVariant, VariantDatum};
use nalgebra::{DMatrix, DVector};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub const RANDOM_SEED: u64 = 91801305;
// Very small numbers are a very big problem.
const MIN_PROB: f64 = 0.0000001;
const MIN_SIGMA: f64 = 0.00001;
pub const MIN_DETERMINANT: f64 = 0.00001;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GmmConfig {
    pub num_gaussians: usize,
    pub num_iterations: usize,
    /// Clusters explaining this many variants or fewer are not written.
    pub min_var_in_cluster: usize,
    /// The largest allele count considered in the allele count prior.
    pub max_ac: usize,
    pub seed: u64,
}

impl std::default::Default for GmmConfig {
    fn default() -> Self {
        Self {
            num_gaussians: 4,
            num_iterations: 10,
            min_var_in_cluster: 0,
            max_ac: 0,
            seed: RANDOM_SEED,
        }
    }
}

impl GmmConfig {
    pub fn new(
        num_gaussians: usize,
        num_iterations: usize,
        min_var_in_cluster: usize,
        max_ac: usize,
        seed: u64,
    ) -> Self {
        Self {
            num_gaussians,
            num_iterations,
            min_var_in_cluster,
            max_ac,
            seed,
        }
    }
}

/// Responsibilities of the clusters. `resp[i][k]` is the responsibility of the
/// `start+k`-th cluster for the `i`-th variant.
pub type Responsibilities = Vec<Vec<f64>>;

#[derive(Debug, Clone)]
pub struct GaussianMixtureModel {
    config: GmmConfig,
    // Annotation keys and their moments, without any data.
    header: DataManager,
    clusters: Vec<Cluster>,
    allele_count_factor: Vec<f64>,
    num_variants: usize,
    rng: Xoshiro256PlusPlus,
}

impl std::fmt::Display for GaussianMixtureModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header.annotation_keys.join(","))?;
        for (i, cluster) in self.clusters.iter().enumerate() {
            write!(f, "\nCluster({})\t{}", i, cluster)?;
        }
        Ok(())
    }
}

impl GaussianMixtureModel {
    /// A model ready to be fitted on `data`. Every cluster has zero weight until it is initialized.
    pub fn new(config: GmmConfig, data: &DataManager) -> Result<Self> {
        if config.num_gaussians == 0 {
            return Err(OptimizerError::malformed("The number of Gaussians should be positive."));
        }
        if MAX_ALLELE_COUNT < config.max_ac {
            let message = format!(
                "The max allele count {} exceeds {}.",
                config.max_ac, MAX_ALLELE_COUNT
            );
            return Err(OptimizerError::malformed(message));
        }
        let dim = data.num_annotations();
        let clusters = (0..config.num_gaussians)
            .map(|_| Cluster::new(0f64, DVector::zeros(dim), DMatrix::identity(dim, dim)))
            .collect();
        let header = DataManager::with_moments(
            data.annotation_keys.clone(),
            data.mean.clone(),
            data.stddev.clone(),
        );
        Ok(Self {
            config,
            header,
            clusters,
            allele_count_factor: vec![1f64; config.max_ac + 1],
            num_variants: data.num_variants(),
            rng: SeedableRng::seed_from_u64(config.seed),
        })
    }
    /// A fitted model, frozen. Used in scoring.
    pub fn from_parts(
        header: DataManager,
        clusters: Vec<Cluster>,
        allele_count_factor: Vec<f64>,
    ) -> Self {
        let config = GmmConfig {
            num_gaussians: clusters.len(),
            num_iterations: 0,
            min_var_in_cluster: 0,
            max_ac: allele_count_factor.len().saturating_sub(1),
            seed: RANDOM_SEED,
        };
        Self {
            config,
            header,
            clusters,
            allele_count_factor,
            num_variants: 0,
            rng: SeedableRng::seed_from_u64(RANDOM_SEED),
        }
    }
    /// Load a cluster file. Every covariance is multiplied by `back_off_factor`.
    pub fn from_cluster_file<P: AsRef<Path>>(path: P, back_off_factor: f64) -> Result<Self> {
        let path = path.as_ref();
        let rdr = std::fs::File::open(path)
            .map(BufReader::new)
            .map_err(|e| OptimizerError::resource(path, e))?;
        let parsed = cluster_file::read(rdr, back_off_factor)?;
        let model = Self::from_parts(parsed.header, parsed.clusters, parsed.allele_count_factor);
        info!(
            "Found {} clusters and using {} annotations: {}",
            model.clusters.len(),
            model.header.num_annotations(),
            model.header.annotation_keys.join(",")
        );
        for (i, cluster) in model.clusters.iter().enumerate() {
            debug!("Cluster({})\t{}", i, cluster);
        }
        Ok(model)
    }
    pub fn config(&self) -> &GmmConfig {
        &self.config
    }
    pub fn header(&self) -> &DataManager {
        &self.header
    }
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }
    pub fn allele_count_factor(&self) -> &[f64] {
        &self.allele_count_factor
    }
    /// Fit all the clusters to `data`, writing checkpoints next to `cluster_file`.
    pub fn run<P: AsRef<Path>>(&mut self, data: &DataManager, cluster_file: P) -> Result<()> {
        self.generate_allele_count_prior(&data.data);
        info!("Clustering with {} variants.", data.num_variants());
        let num_gaussians = self.config.num_gaussians;
        self.create_clusters(&data.data, 0, num_gaussians, cluster_file)
    }
    /// The prior is (expected / observed), where the expected distribution is proportional to 1/AC.
    pub fn generate_allele_count_prior(&mut self, data: &[VariantDatum]) {
        let len = self.config.max_ac + 1;
        let sum_expectation = (1..len).map(|ac| 1f64 / ac as f64).sum::<f64>();
        let mut counts = vec![0usize; len];
        for datum in data.iter() {
            if let Some(count) = counts.get_mut(datum.allele_count) {
                *count += 1;
            }
        }
        let total = data.len() as f64;
        self.allele_count_factor = counts
            .iter()
            .enumerate()
            .map(|(ac, &count)| match (ac, count) {
                (0, _) | (_, 0) => 1f64,
                _ => {
                    let expected = 1f64 / ac as f64 / sum_expectation;
                    let observed = count as f64 / total;
                    expected / observed
                }
            })
            .collect();
        trace!("ACPrior\t{:?}", self.allele_count_factor);
    }
    pub fn allele_count_prior(&self, allele_count: usize) -> f64 {
        self.allele_count_factor
            .get(allele_count)
            .copied()
            .unwrap_or(1f64)
    }
    /// EM on the clusters in `[start, stop)`. The other clusters are left untouched.
    pub fn create_clusters<P: AsRef<Path>>(
        &mut self,
        data: &[VariantDatum],
        start: usize,
        stop: usize,
        cluster_file: P,
    ) -> Result<()> {
        let cluster_file = cluster_file.as_ref();
        self.initialize_clusters(data, start, stop)?;
        for t in 0..self.config.num_iterations {
            self.iterate(data, start, stop)?;
            let checkpoint = format!("{}.{}", cluster_file.display(), t + 1);
            self.write_clusters(&checkpoint)?;
            info!("Finished iteration {}", t + 1);
        }
        self.write_clusters(cluster_file)
    }
    fn check_range(&self, start: usize, stop: usize) -> Result<()> {
        match start < stop && stop <= self.clusters.len() {
            true => Ok(()),
            false => Err(OptimizerError::malformed(format!(
                "Cluster range {}..{} is out of 0..{}",
                start,
                stop,
                self.clusters.len()
            ))),
        }
    }
    pub fn initialize_clusters(
        &mut self,
        data: &[VariantDatum],
        start: usize,
        stop: usize,
    ) -> Result<()> {
        self.check_range(start, stop)?;
        if data.is_empty() {
            return Err(OptimizerError::malformed("There is no variant to cluster."));
        }
        let weight = 1f64 / (stop - start) as f64;
        for k in start..stop {
            self.clusters[k] = Cluster::random(data, weight, &mut self.rng);
            debug!("Init\t{}\t{}", k, self.clusters[k]);
        }
        Ok(())
    }
    /// One expectation step followed by one maximization step.
    /// The new clusters are computed aside and then swapped in.
    pub fn iterate(&mut self, data: &[VariantDatum], start: usize, stop: usize) -> Result<()> {
        let resp = self.expectation(data, start, stop)?;
        let updated = self.maximization(data, &resp, start, stop);
        for (slot, cluster) in self.clusters[start..stop].iter_mut().zip(updated) {
            *slot = cluster;
        }
        Ok(())
    }
    /// Calculate the probability that each data point is in each cluster.
    pub fn expectation(
        &self,
        data: &[VariantDatum],
        start: usize,
        stop: usize,
    ) -> Result<Responsibilities> {
        self.check_range(start, stop)?;
        let clusters = &self.clusters[start..stop];
        let denoms: Vec<f64> = clusters
            .iter()
            .enumerate()
            .map(|(k, cluster)| {
                let denom = cluster.normalizer();
                if !denom.is_finite() || cluster.determinant() < 0.5 * MIN_DETERMINANT {
                    let message = format!(
                        "determinant of covariance matrix <= 0 (det = {}, denom = {})",
                        cluster.determinant(),
                        denom
                    );
                    Err(OptimizerError::instability(start + k, message))
                } else {
                    Ok(denom)
                }
            })
            .collect::<Result<_>>()?;
        let per_variant: Vec<(Vec<f64>, f64)> = data
            .par_iter()
            .map(|datum| {
                let mut likelihood = 0f64;
                let mut probs = Vec::with_capacity(clusters.len());
                for (k, (cluster, denom)) in clusters.iter().zip(denoms.iter()).enumerate() {
                    let q = cluster.quadratic_form(&datum.annotations).ok_or_else(|| {
                        OptimizerError::instability(start + k, "covariance matrix is singular")
                    })?;
                    let prob = cluster.weight() * (-0.5 * q).exp() / denom;
                    likelihood += prob;
                    if q < 0f64 {
                        let message = format!(
                            "covariance matrix no longer positive definite (quadratic form = {})",
                            q
                        );
                        return Err(OptimizerError::instability(start + k, message));
                    }
                    if 1f64 < prob {
                        let message = format!(
                            "probability distribution returns > 1.0 ({}, det = {})",
                            prob,
                            cluster.determinant()
                        );
                        return Err(OptimizerError::instability(start + k, message));
                    }
                    probs.push(prob.max(MIN_PROB));
                }
                let sum = probs.iter().sum::<f64>();
                probs.iter_mut().for_each(|p| *p = *p / sum * datum.weight);
                Ok((probs, likelihood))
            })
            .collect::<Result<_>>()?;
        let likelihood = per_variant.iter().map(|x| x.1).sum::<f64>();
        info!(
            "Explained likelihood = {:.5}",
            likelihood / data.len() as f64
        );
        Ok(per_variant.into_iter().map(|x| x.0).collect())
    }
    /// Move the clusters to maximize the sum probability of each data point.
    /// Return the clusters in `[start, stop)`, whose weights sum up to one.
    pub fn maximization(
        &self,
        data: &[VariantDatum],
        resp: &[Vec<f64>],
        start: usize,
        stop: usize,
    ) -> Vec<Cluster> {
        let num_variants = data.len() as f64;
        let dim = self.header.num_annotations();
        let mut updated: Vec<_> = (0..stop - start)
            .into_par_iter()
            .map(|k| {
                let sum_prob = resp.iter().map(|r| r[k]).sum::<f64>();
                let mut mean = DVector::<f64>::zeros(dim);
                for (datum, r) in data.iter().zip(resp.iter()) {
                    for (m, x) in mean.iter_mut().zip(datum.annotations.iter()) {
                        *m += r[k] * x;
                    }
                }
                mean /= sum_prob;
                let mut sigma = DMatrix::<f64>::zeros(dim, dim);
                for (datum, r) in data.iter().zip(resp.iter()) {
                    let xs = &datum.annotations;
                    for j in 0..dim {
                        let diff = r[k] * (xs[j] - mean[j]);
                        for p in j..dim {
                            sigma[(j, p)] += diff * (xs[p] - mean[p]);
                        }
                    }
                }
                for j in 0..dim {
                    for p in j..dim {
                        sigma[(j, p)] = sigma[(j, p)].max(MIN_SIGMA);
                        sigma[(p, j)] = sigma[(j, p)];
                    }
                }
                sigma /= sum_prob;
                Cluster::new(sum_prob / num_variants, mean, sigma)
            })
            .collect();
        // Ensure the weights sum to one. They do not automatically, as very small numbers are capped.
        let sum = updated.iter().map(|c| c.weight()).sum::<f64>();
        for cluster in updated.iter_mut() {
            let weight = cluster.weight() / sum;
            cluster.set_weight(weight);
        }
        updated
    }
    /// Write the current clusters. Clusters with small support are dropped.
    pub fn write_clusters<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut wtr = std::fs::File::create(path)
            .map(BufWriter::new)
            .map_err(|e| OptimizerError::resource(path, e))?;
        let min_support = self.config.min_var_in_cluster as f64;
        cluster_file::write(
            &mut wtr,
            &self.header,
            &self.allele_count_factor,
            &self.clusters,
            self.num_variants,
            min_support,
        )?;
        Ok(())
    }
    /// The sum of the weighted densities of the clusters at `variant`.
    pub fn evaluate_variant(&self, variant: &RawVariant) -> Result<f64> {
        let annotations = self.header.normalize_variant(variant)?;
        self.evaluate_normalized(&annotations)
    }
    pub fn evaluate_normalized(&self, annotations: &[f64]) -> Result<f64> {
        self.clusters
            .iter()
            .enumerate()
            .map(|(k, cluster)| {
                cluster
                    .density(annotations)
                    .ok_or_else(|| OptimizerError::instability(k, "covariance matrix is singular"))
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand_distr::{Distribution, Normal};
    fn tmp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("variant_optimizer_gmm");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }
    fn two_blobs(num: usize, seed: u64) -> DataManager {
        let mut rng: Xoshiro256PlusPlus = SeedableRng::seed_from_u64(seed);
        let noise = Normal::new(0f64, 2f64).unwrap();
        let variants: Vec<_> = (0..2 * num)
            .map(|i| {
                let center = if i < num { -3f64 } else { 3f64 };
                let qd = center + noise.sample(&mut rng);
                let sb = -center + noise.sample(&mut rng);
                let mut v = RawVariant::new(&format!("v{}", i), rng.gen_range(0f64..100f64))
                    .with_attribute("QD", &qd.to_string())
                    .with_attribute("SB", &sb.to_string());
                v.allele_count = 1 + i % 3;
                v.is_known = i % 2 == 0;
                v
            })
            .collect();
        let keys = vec!["QD".to_string(), "SB".to_string()];
        DataManager::from_variants(&keys, &variants).unwrap()
    }
    #[test]
    fn responsibilities_sum_to_weight() {
        let mut data = two_blobs(50, 3290);
        for (i, datum) in data.data.iter_mut().enumerate() {
            datum.weight = 1f64 + (i % 4) as f64;
        }
        let config = GmmConfig::new(3, 1, 0, 0, 4932);
        let mut model = GaussianMixtureModel::new(config, &data).unwrap();
        model.initialize_clusters(&data.data, 0, 3).unwrap();
        let resp = model.expectation(&data.data, 0, 3).unwrap();
        assert_eq!(resp.len(), 100);
        for (r, datum) in resp.iter().zip(data.data.iter()) {
            assert_eq!(r.len(), 3);
            assert!((r.iter().sum::<f64>() - datum.weight).abs() < 1e-10);
            assert!(r.iter().all(|&p| 0f64 < p));
        }
        let updated = model.maximization(&data.data, &resp, 0, 3);
        let sum = updated.iter().map(|c| c.weight()).sum::<f64>();
        assert!((sum - 1f64).abs() < 1e-10);
        for cluster in updated.iter() {
            assert!(cluster.is_symmetric());
            assert!(cluster.determinant() > 0f64);
        }
    }
    #[test]
    fn fit_two_blobs() {
        let data = two_blobs(100, 12);
        let config = GmmConfig::new(2, 5, 0, 3, 349);
        let mut model = GaussianMixtureModel::new(config, &data).unwrap();
        let path = tmp_path("two_blobs.clusters");
        model.run(&data, &path).unwrap();
        let sum = model.clusters().iter().map(|c| c.weight()).sum::<f64>();
        assert!((sum - 1f64).abs() < 1e-10);
        for cluster in model.clusters() {
            assert!(cluster.is_symmetric());
            assert!(cluster.determinant() > 0f64);
        }
        for t in 1..=5 {
            let checkpoint = format!("{}.{}", path.display(), t);
            assert!(std::path::Path::new(&checkpoint).exists());
        }
        let loaded = GaussianMixtureModel::from_cluster_file(&path, 1f64).unwrap();
        assert_eq!(loaded.clusters().len(), 2);
        assert_eq!(loaded.header().annotation_keys, data.annotation_keys);
        let variant = RawVariant::new("test", 10f64)
            .with_attribute("QD", "-3.0")
            .with_attribute("SB", "3.0");
        let score = loaded.evaluate_variant(&variant).unwrap();
        let z = data.normalize(&[-3f64, 3f64]);
        let answer = model.evaluate_normalized(&z).unwrap();
        assert!((score - answer).abs() < 1e-12);
        assert!(0f64 < score);
    }
    #[test]
    fn single_cluster_mean_is_sample_mean() {
        let variants: Vec<_> = (0..100)
            .map(|i| {
                let qual = i as f64 * 100f64 / 99f64;
                let mut v = RawVariant::new(&format!("v{}", i), qual)
                    .with_attribute("QD", &((i % 7) as f64 * 1.5).to_string())
                    .with_attribute("HRun", &((i * i) % 11).to_string());
                v.is_known = 50f64 <= qual;
                v.is_transition = i % 3 != 0;
                v
            })
            .collect();
        let keys = vec!["QD".to_string(), "HRun".to_string(), "QUAL".to_string()];
        let data = DataManager::from_variants(&keys, &variants).unwrap();
        let config = GmmConfig::new(1, 1, 0, 0, RANDOM_SEED);
        let mut model = GaussianMixtureModel::new(config, &data).unwrap();
        model.run(&data, tmp_path("single.clusters")).unwrap();
        let cluster = &model.clusters()[0];
        assert!((cluster.weight() - 1f64).abs() < 1e-12);
        for j in 0..3 {
            let mean = data.data.iter().map(|d| d.annotations[j]).sum::<f64>() / 100f64;
            assert!((cluster.mean()[j] - mean).abs() < 1e-12);
        }
    }
    #[test]
    fn allele_count_prior() {
        // With max AC = 7, the expected frequencies of AC=1 and AC=2 are 140/363 and 70/363.
        // Put 280 variants on AC=1 (twice as expected) and 70 on AC=2 (as expected).
        let data: Vec<_> = (0..363)
            .map(|i| {
                let mut datum = VariantDatum::new(vec![0f64], 0f64);
                datum.allele_count = match i {
                    0..=279 => 1,
                    280..=349 => 2,
                    _ => 0,
                };
                datum
            })
            .collect();
        let header = DataManager::with_moments(vec!["QD".to_string()], vec![0f64], vec![1f64]);
        let config = GmmConfig::new(1, 1, 0, 7, RANDOM_SEED);
        let mut model = GaussianMixtureModel::new(config, &header).unwrap();
        model.generate_allele_count_prior(&data);
        assert_eq!(model.allele_count_factor().len(), 8);
        assert!((model.allele_count_prior(1) - 0.5).abs() < 1e-10);
        assert!((model.allele_count_prior(2) - 1f64).abs() < 1e-10);
        // Unobserved or out of range.
        assert_eq!(model.allele_count_prior(3), 1f64);
        assert_eq!(model.allele_count_prior(100), 1f64);
    }
    #[test]
    fn degenerated_covariance_is_fatal() {
        let header = DataManager::with_moments(
            vec!["QD".to_string(), "SB".to_string()],
            vec![0f64; 2],
            vec![1f64; 2],
        );
        let data: Vec<_> = (0..10)
            .map(|i| VariantDatum::new(vec![i as f64 / 10f64, 0f64], 0f64))
            .collect();
        // Determinant is 1e-6, below the half of the minimum.
        let flat = Cluster::new(
            0.5,
            DVector::zeros(2),
            DMatrix::from_row_slice(2, 2, &[1f64, 0f64, 0f64, 0.000001]),
        );
        let normal = Cluster::new(0.5, DVector::zeros(2), DMatrix::identity(2, 2));
        let model = GaussianMixtureModel::from_parts(header.clone(), vec![normal, flat], vec![]);
        let err = model.expectation(&data, 0, 2).unwrap_err();
        assert!(err.is_numerical_instability());
        // Only the first cluster is in the range.
        assert!(model.expectation(&data, 0, 1).is_ok());
        // Too sharp. The density at the center exceeds 1.
        let sharp = Cluster::new(
            1f64,
            DVector::zeros(2),
            DMatrix::from_row_slice(2, 2, &[0.01, 0f64, 0f64, 0.01]),
        );
        let model = GaussianMixtureModel::from_parts(header, vec![sharp], vec![]);
        let err = model.expectation(&data, 0, 1).unwrap_err();
        assert!(err.is_numerical_instability());
    }
    #[test]
    fn invalid_parameters() {
        let header = DataManager::with_moments(vec!["QD".to_string()], vec![0f64], vec![1f64]);
        let config = GmmConfig::new(0, 1, 0, 0, RANDOM_SEED);
        match GaussianMixtureModel::new(config, &header) {
            Err(OptimizerError::MalformedInput { .. }) => {}
            x => panic!("{:?}", x.map(|m| m.clusters().len())),
        }
        let config = GmmConfig::new(1, 1, 0, MAX_ALLELE_COUNT + 1, RANDOM_SEED);
        assert!(GaussianMixtureModel::new(config, &header).is_err());
        let config = GmmConfig::new(2, 1, 0, 0, RANDOM_SEED);
        let mut model = GaussianMixtureModel::new(config, &header).unwrap();
        let data: Vec<_> = (0..10)
            .map(|i| VariantDatum::new(vec![i as f64 / 10f64], 0f64))
            .collect();
        for &(start, stop) in [(0, 3), (1, 1), (2, 1)].iter() {
            match model.initialize_clusters(&data, start, stop) {
                Err(OptimizerError::MalformedInput { .. }) => {}
                x => panic!("{}..{}\t{:?}", start, stop, x),
            }
            assert!(model.expectation(&data, start, stop).is_err());
        }
        assert!(model.initialize_clusters(&data, 0, 2).is_ok());
    }
    #[test]
    fn negative_covariance_is_floored() {
        let header = DataManager::with_moments(
            vec!["QD".to_string(), "SB".to_string()],
            vec![0f64; 2],
            vec![1f64; 2],
        );
        // Anti-correlated points centered at the origin.
        let data: Vec<_> = [(1f64, -1f64), (-1f64, 1f64), (2f64, -2f64), (-2f64, 2f64)]
            .iter()
            .map(|&(x, y)| VariantDatum::new(vec![x, y], 0f64))
            .collect();
        let cluster = Cluster::new(1f64, DVector::zeros(2), DMatrix::identity(2, 2));
        let model = GaussianMixtureModel::from_parts(header, vec![cluster], vec![]);
        let resp = vec![vec![1f64]; 4];
        let updated = model.maximization(&data, &resp, 0, 1);
        let cov = updated[0].covariance();
        // The accumulator of the off-diagonal is -10, floored before the division by 4.
        assert_eq!(cov[(0, 1)], MIN_SIGMA / 4f64);
        assert_eq!(cov[(1, 0)], cov[(0, 1)]);
        assert!((cov[(0, 0)] - 2.5).abs() < 1e-12);
        assert!((cov[(1, 1)] - 2.5).abs() < 1e-12);
        assert!(updated[0].is_symmetric());
        assert!(updated[0].mean().iter().all(|m| m.abs() < 1e-12));
        assert!((updated[0].weight() - 1f64).abs() < 1e-12);
    }
}
