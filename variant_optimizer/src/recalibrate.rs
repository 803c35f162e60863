//! Score variants by a fitted mixture model and convert the scores into phred-scaled qualities.
use crate::error::Result;
use crate::gaussian_mixture::GaussianMixtureModel;
use definitions::{VariantDatum, VariantSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// Cap of the recalibrated quality, 90.
const MIN_ERROR_RATE: f64 = 0.000000001;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecalibrateConfig {
    pub target_titv: f64,
    pub back_off_gaussian_factor: f64,
    pub use_allele_count_prior: bool,
    pub desired_num_variants: usize,
}

impl std::default::Default for RecalibrateConfig {
    fn default() -> Self {
        Self {
            target_titv: 2.1,
            back_off_gaussian_factor: 1f64,
            use_allele_count_prior: false,
            desired_num_variants: 0,
        }
    }
}

impl RecalibrateConfig {
    pub fn new(
        target_titv: f64,
        back_off_gaussian_factor: f64,
        use_allele_count_prior: bool,
        desired_num_variants: usize,
    ) -> Self {
        Self {
            target_titv,
            back_off_gaussian_factor,
            use_allele_count_prior,
            desired_num_variants,
        }
    }
}

pub fn phred_scale(p_true: f64) -> f64 {
    -10f64 * (1f64 - p_true).max(MIN_ERROR_RATE).log10()
}

pub trait Recalibrate {
    /// Fill the recalibrated quality of each variant, and return the variants
    /// as normalized data whose quality is the recalibrated one.
    fn recalibrate(
        &mut self,
        model: &GaussianMixtureModel,
        config: &RecalibrateConfig,
    ) -> Result<Vec<VariantDatum>>;
}

impl Recalibrate for VariantSet {
    fn recalibrate(
        &mut self,
        model: &GaussianMixtureModel,
        config: &RecalibrateConfig,
    ) -> Result<Vec<VariantDatum>> {
        let header = model.header();
        let data: Vec<VariantDatum> = self
            .variants
            .par_iter_mut()
            .map(|variant| {
                let annotations = header.normalize_variant(variant)?;
                let mut p_true = model.evaluate_normalized(&annotations)?;
                if config.use_allele_count_prior {
                    p_true *= model.allele_count_prior(variant.allele_count);
                }
                let qual = phred_scale(p_true);
                variant.recalibrated_qual = Some(qual);
                trace!("RECAL\t{}\t{:.4e}", variant, p_true);
                Ok(VariantDatum {
                    annotations,
                    allele_count: variant.allele_count,
                    quality: qual,
                    is_known: variant.is_known,
                    is_transition: variant.is_transition,
                    weight: variant.weight,
                })
            })
            .collect::<Result<_>>()?;
        debug!("RECAL\t{}\t{}", self.variants.len(), self.known_count());
        Ok(data)
    }
}
