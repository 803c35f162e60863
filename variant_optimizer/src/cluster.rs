//! A Gaussian component of the mixture model.
//! The inverse and the determinant of the covariance are cached when a cluster is built,
//! and a cluster is never mutated except its weight. To change the covariance, build a new one.
use crate::error::{OptimizerError, Result};
use definitions::VariantDatum;
use nalgebra::{DMatrix, DVector};
use rand::Rng;

#[derive(Debug, Clone)]
pub struct Cluster {
    weight: f64,
    mean: DVector<f64>,
    covariance: DMatrix<f64>,
    inverse: Option<DMatrix<f64>>,
    determinant: f64,
}

impl std::fmt::Display for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mean: Vec<_> = self.mean.iter().map(|x| format!("{:.3}", x)).collect();
        write!(
            f,
            "{:.4}\t[{}]\t{:.4e}",
            self.weight,
            mean.join(","),
            self.determinant
        )
    }
}

impl Cluster {
    pub fn new(weight: f64, mean: DVector<f64>, covariance: DMatrix<f64>) -> Self {
        assert_eq!(mean.len(), covariance.nrows());
        assert_eq!(mean.len(), covariance.ncols());
        let determinant = covariance.determinant();
        let inverse = covariance.clone().try_inverse();
        Self {
            weight,
            mean,
            covariance,
            inverse,
            determinant,
        }
    }
    /// Build a cluster from stored parameters. The covariance should be invertible.
    pub fn from_parameters(weight: f64, mean: &[f64], covariance: &[f64]) -> Result<Self> {
        let dim = mean.len();
        if covariance.len() != dim * dim {
            return Err(OptimizerError::malformed(format!(
                "{} covariance values for {} annotations",
                covariance.len(),
                dim
            )));
        }
        let mean = DVector::from_column_slice(mean);
        let covariance = DMatrix::from_row_slice(dim, dim, covariance);
        let cluster = Self::new(weight, mean, covariance);
        if cluster.inverse.is_none() || cluster.determinant <= 0f64 {
            let message = format!("singular covariance (det = {})", cluster.determinant);
            return Err(OptimizerError::instability(0, message));
        }
        Ok(cluster)
    }
    /// A cluster centered at a randomly chosen data point. The covariance is
    /// `R * R^T` where `R` is an upper triangular matrix with entries in [0.5, 1.0).
    /// As the data has been normalized, the variances are centered around 1.0.
    pub fn random<R: Rng>(data: &[VariantDatum], weight: f64, rng: &mut R) -> Self {
        let picked = &data[rng.gen_range(0..data.len())];
        let dim = picked.annotations.len();
        let mean = DVector::from_column_slice(&picked.annotations);
        let upper = DMatrix::from_fn(dim, dim, |i, j| match i <= j {
            true => 0.5 + 0.5 * rng.gen::<f64>(),
            false => 0f64,
        });
        let mut covariance = &upper * upper.transpose();
        covariance.fill_lower_triangle_with_upper_triangle();
        Self::new(weight, mean, covariance)
    }
    pub fn weight(&self) -> f64 {
        self.weight
    }
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }
    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }
    pub fn determinant(&self) -> f64 {
        self.determinant
    }
    pub fn dim(&self) -> usize {
        self.mean.len()
    }
    /// Return a cluster with every covariance entry multiplied by `factor`.
    pub fn scale_covariance(&self, factor: f64) -> Self {
        Self::new(self.weight, self.mean.clone(), &self.covariance * factor)
    }
    /// `(2pi)^(d/2) * |det|^(1/2)`
    pub fn normalizer(&self) -> f64 {
        let dim = self.dim() as f64;
        (2f64 * std::f64::consts::PI).powf(dim / 2f64) * self.determinant.abs().sqrt()
    }
    /// `(x-mu)^T Sigma^-1 (x-mu)`. None if the covariance is singular.
    pub fn quadratic_form(&self, xs: &[f64]) -> Option<f64> {
        let inverse = self.inverse.as_ref()?;
        let diff: Vec<_> = xs.iter().zip(self.mean.iter()).map(|(x, m)| x - m).collect();
        let q = diff
            .iter()
            .enumerate()
            .map(|(j, dj)| {
                let col = inverse.column(j);
                dj * col.iter().zip(diff.iter()).map(|(s, d)| s * d).sum::<f64>()
            })
            .sum::<f64>();
        Some(q)
    }
    /// Weighted density of `xs`, i.e., `weight * N(xs|mu,Sigma)`.
    pub fn density(&self, xs: &[f64]) -> Option<f64> {
        let q = self.quadratic_form(xs)?;
        Some(self.weight * (-0.5 * q).exp() / self.normalizer())
    }
    pub fn is_symmetric(&self) -> bool {
        let dim = self.dim();
        (0..dim).all(|i| (0..i).all(|j| self.covariance[(i, j)] == self.covariance[(j, i)]))
    }
}
