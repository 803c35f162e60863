use definitions::{RawVariant, VariantSet};
use log::debug;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Annotations of the simulated variants.
pub const ANNOTATIONS: [&str; 3] = ["QD", "SB", "HRun"];

#[derive(Debug, Clone, Copy)]
pub struct SimulationProfile {
    /// Fraction of the true variants.
    pub true_rate: f64,
    /// Fraction of the true variants found in the known catalogue.
    pub known_rate: f64,
    pub true_titv: f64,
    pub false_titv: f64,
    pub max_ac: usize,
}

impl std::default::Default for SimulationProfile {
    fn default() -> Self {
        Self {
            true_rate: 0.8,
            known_rate: 0.5,
            true_titv: 2.1,
            false_titv: 0.5,
            max_ac: 10,
        }
    }
}

fn is_transition<R: Rng>(titv: f64, rng: &mut R) -> bool {
    rng.gen_bool(titv / (1f64 + titv))
}

/// Simulate `num` variants. True variants have a high QD, an SB near -1, and a short HRun,
/// while false ones are spread widely and mostly rare.
pub fn simulate_variants<R: Rng>(
    num: usize,
    profile: &SimulationProfile,
    rng: &mut R,
) -> VariantSet {
    let true_qd = Normal::new(20f64, 4f64).unwrap();
    let false_qd = Normal::new(6f64, 4f64).unwrap();
    let true_sb = Normal::new(-1f64, 0.3).unwrap();
    let false_sb = Normal::new(0f64, 1f64).unwrap();
    let variants: Vec<_> = (0..num)
        .map(|i| {
            let is_true = rng.gen_bool(profile.true_rate);
            let id = format!("chr1:{}", 1_000 + 137 * i);
            let (qd, sb, hrun): (f64, f64, usize) = match is_true {
                true => (
                    true_qd.sample(rng),
                    true_sb.sample(rng),
                    rng.gen_range(0..3),
                ),
                false => (
                    false_qd.sample(rng),
                    false_sb.sample(rng),
                    rng.gen_range(0..10),
                ),
            };
            let qual = (qd * 5f64).max(0f64);
            let mut variant = RawVariant::new(&id, qual)
                .with_attribute(ANNOTATIONS[0], &format!("{:.3}", qd))
                .with_attribute(ANNOTATIONS[1], &format!("{:.3}", sb))
                .with_attribute(ANNOTATIONS[2], &format!("{}", hrun));
            if is_true {
                variant.is_known = rng.gen_bool(profile.known_rate);
                variant.is_transition = is_transition(profile.true_titv, rng);
                // Roughly proportional to 1/AC.
                let ac = (1..=profile.max_ac)
                    .find(|&ac| rng.gen_bool(0.5) || ac == profile.max_ac)
                    .unwrap_or(1);
                variant.allele_count = ac;
            } else {
                variant.is_transition = is_transition(profile.false_titv, rng);
                variant.allele_count = 1;
            }
            variant
        })
        .collect();
    debug!("SIMULATED\t{}", variants.len());
    VariantSet::new("simulated", variants)
}
