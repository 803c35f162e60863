//! Variant quality optimizer.
//!
//! Fit a Gaussian mixture model on the annotations of variant calls,
//! then score every call by the density of the fitted model.
pub mod cluster;
pub mod cluster_file;
pub mod data_manager;
pub mod diagnostics;
pub mod error;
pub mod gaussian_mixture;
pub mod recalibrate;
#[macro_use]
extern crate log;

pub use data_manager::DataManager;
pub use error::{OptimizerError, Result};
pub use gaussian_mixture::{GaussianMixtureModel, GmmConfig};
pub use recalibrate::{Recalibrate, RecalibrateConfig};
