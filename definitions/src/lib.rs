//! Definitions -- A tiny interface for the variant quality optimizer.
//! We pass variant records between the steps of the tool as a JSON object.
//! Specifically, the message is encoded as one, possibly large, structure named [VariantSet](VariantSet).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct VariantSet {
    pub input_file: String,
    pub variants: Vec<RawVariant>,
}

impl VariantSet {
    pub fn new(input_file: &str, variants: Vec<RawVariant>) -> Self {
        Self {
            input_file: input_file.to_string(),
            variants,
        }
    }
    pub fn known_count(&self) -> usize {
        self.variants.iter().filter(|v| v.is_known).count()
    }
    /// Return the number of variants whose recalibrated quality is at least `qual`.
    /// Variants not recalibrated yet are never counted.
    pub fn passing(&self, qual: f64) -> usize {
        self.variants
            .iter()
            .filter(|v| v.recalibrated_qual.map(|q| q >= qual).unwrap_or(false))
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVariant {
    /// Name of the variant, e.g., `chr1:12345`.
    pub id: String,
    /// Phred-scaled quality of the original call.
    pub qual: f64,
    /// Annotations as they appear in the INFO column. Values are kept as strings and
    /// parsed when they are used as features.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub allele_count: usize,
    #[serde(default)]
    pub is_known: bool,
    #[serde(default)]
    pub is_transition: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Filled by the recalibration step.
    #[serde(default)]
    pub recalibrated_qual: Option<f64>,
}

fn default_weight() -> f64 {
    1f64
}

impl RawVariant {
    pub fn new(id: &str, qual: f64) -> Self {
        Self {
            id: id.to_string(),
            qual,
            attributes: HashMap::new(),
            allele_count: 0,
            is_known: false,
            is_transition: false,
            weight: default_weight(),
            recalibrated_qual: None,
        }
    }
    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|x| x.as_str())
    }
}

impl std::fmt::Display for RawVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let qual = match self.recalibrated_qual {
            Some(q) => format!("{:.2}", q),
            None => "-".to_string(),
        };
        write!(
            f,
            "{}\t{:.2}\t{}\t{}\t{}\t{}",
            self.id, self.qual, qual, self.allele_count, self.is_known, self.is_transition
        )
    }
}

/// A normalized feature vector of a variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantDatum {
    /// Z-scored annotations. The order is the same as the annotation keys.
    pub annotations: Vec<f64>,
    pub allele_count: usize,
    pub quality: f64,
    pub is_known: bool,
    pub is_transition: bool,
    pub weight: f64,
}

impl VariantDatum {
    pub fn new(annotations: Vec<f64>, quality: f64) -> Self {
        Self {
            annotations,
            allele_count: 0,
            quality,
            is_known: false,
            is_transition: false,
            weight: 1f64,
        }
    }
}
