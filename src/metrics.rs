//! Summary statistics over per-period and per-run data.

use crate::error::{CollusimError, Result};
use serde::{Deserialize, Serialize};

/// Mean of a slice of values
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(CollusimError::EmptyHistory(
            "mean over no values".to_string(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation of a slice of values
pub fn std_dev(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(CollusimError::EmptyHistory(
            "standard deviation needs at least 2 values".to_string(),
        ));
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Ok(variance.sqrt())
}

/// Statistics for a collection of values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl Statistics {
    /// Compute statistics from a slice of values
    pub fn from_slice(values: &[f64]) -> Self {
        if values.is_empty() {
            return Statistics {
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
                count: 0,
            };
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            0.0
        } else {
            (values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
        };

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Statistics {
            mean,
            std,
            min,
            max,
            count,
        }
    }
}
