//! Data manager -- decodes the annotations of variants and turns them into z-scored feature vectors.
//! The per-feature moments are kept so that new variants can be normalized in the same way later.
use crate::error::{OptimizerError, Result};
use definitions::{RawVariant, VariantDatum};

/// The annotation key taken from the quality column instead of the attributes.
pub const QUAL_KEY: &str = "QUAL";
pub const ANNOTATION_PREFIX: &str = "@!ANNOTATION";

pub fn decode_annotation(key: &str, variant: &RawVariant) -> Result<f64> {
    if key == QUAL_KEY {
        return Ok(variant.qual);
    }
    let value = variant.attribute(key).ok_or_else(|| {
        OptimizerError::malformed(format!(
            "No value detected for annotation = {} in variant at {}",
            key, variant.id
        ))
    })?;
    value.trim().parse::<f64>().map_err(|_| {
        OptimizerError::malformed(format!(
            "No double value detected for annotation = {} in variant at {}, reported annotation value = {}",
            key, variant.id, value
        ))
    })
}

#[derive(Debug, Clone)]
pub struct DataManager {
    pub annotation_keys: Vec<String>,
    pub mean: Vec<f64>,
    pub stddev: Vec<f64>,
    pub data: Vec<VariantDatum>,
}

impl DataManager {
    /// Decode `keys` from each variant and normalize them.
    pub fn from_variants(keys: &[String], variants: &[RawVariant]) -> Result<Self> {
        if keys.is_empty() {
            return Err(OptimizerError::malformed("No annotation is specified."));
        }
        if variants.is_empty() {
            return Err(OptimizerError::malformed("There is no variant to cluster."));
        }
        if let Some(v) = variants
            .iter()
            .find(|v| !(v.weight.is_finite() && 0f64 < v.weight))
        {
            return Err(OptimizerError::malformed(format!(
                "Weight of variant at {} should be positive (weight = {})",
                v.id, v.weight
            )));
        }
        let raw: Vec<Vec<f64>> = variants
            .iter()
            .map(|v| keys.iter().map(|k| decode_annotation(k, v)).collect())
            .collect::<Result<_>>()?;
        let (mean, stddev) = moments(&raw);
        for ((key, m), sd) in keys.iter().zip(mean.iter()).zip(stddev.iter()) {
            debug!("DATA\t{}\t{:.4}\t{:.4}", key, m, sd);
            if !(sd.is_finite() && 0f64 < *sd) {
                return Err(OptimizerError::malformed(format!(
                    "Annotation {} has no variation (stddev = {}). Remove it from the feature set.",
                    key, sd
                )));
            }
        }
        let mut manager = Self::with_moments(keys.to_vec(), mean, stddev);
        manager.data = raw
            .iter()
            .zip(variants.iter())
            .map(|(xs, v)| VariantDatum {
                annotations: manager.normalize(xs),
                allele_count: v.allele_count,
                quality: v.qual,
                is_known: v.is_known,
                is_transition: v.is_transition,
                weight: v.weight,
            })
            .collect();
        info!(
            "DATA\t{}\t{}\t{}",
            manager.data.len(),
            manager.data.iter().filter(|d| d.is_known).count(),
            keys.join(",")
        );
        Ok(manager)
    }
    /// A data manager without any data. Used when scoring new variants against stored moments.
    pub fn with_moments(annotation_keys: Vec<String>, mean: Vec<f64>, stddev: Vec<f64>) -> Self {
        assert_eq!(annotation_keys.len(), mean.len());
        assert_eq!(annotation_keys.len(), stddev.len());
        Self {
            annotation_keys,
            mean,
            stddev,
            data: vec![],
        }
    }
    pub fn num_annotations(&self) -> usize {
        self.annotation_keys.len()
    }
    pub fn num_variants(&self) -> usize {
        self.data.len()
    }
    pub fn normalize(&self, raw: &[f64]) -> Vec<f64> {
        raw.iter()
            .zip(self.mean.iter().zip(self.stddev.iter()))
            .map(|(x, (m, sd))| (x - m) / sd)
            .collect()
    }
    pub fn denormalize(&self, feature: usize, z: f64) -> f64 {
        z * self.stddev[feature] + self.mean[feature]
    }
    pub fn normalize_variant(&self, variant: &RawVariant) -> Result<Vec<f64>> {
        let raw: Vec<f64> = self
            .annotation_keys
            .iter()
            .map(|k| decode_annotation(k, variant))
            .collect::<Result<_>>()?;
        Ok(self.normalize(&raw))
    }
    pub fn header_lines(&self) -> Vec<String> {
        self.annotation_keys
            .iter()
            .zip(self.mean.iter().zip(self.stddev.iter()))
            .map(|(key, (m, sd))| format!("{},{},{},{}", ANNOTATION_PREFIX, key, m, sd))
            .collect()
    }
}

/// Mean and (population) standard deviation of each column.
fn moments(raw: &[Vec<f64>]) -> (Vec<f64>, Vec<f64>) {
    let dim = raw[0].len();
    let len = raw.len() as f64;
    let mut mean = vec![0f64; dim];
    for xs in raw.iter() {
        mean.iter_mut().zip(xs).for_each(|(m, x)| *m += x);
    }
    mean.iter_mut().for_each(|m| *m /= len);
    let mut var = vec![0f64; dim];
    for xs in raw.iter() {
        var.iter_mut()
            .zip(xs.iter().zip(mean.iter()))
            .for_each(|(v, (x, m))| *v += (x - m).powi(2));
    }
    let stddev = var.iter().map(|v| (v / len).sqrt()).collect();
    (mean, stddev)
}
