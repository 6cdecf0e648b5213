//! Small time-series statistics used by the forecasts

use serde::{Deserialize, Serialize};

/// Least-squares line through `(index, value)` points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
}

impl Trend {
    /// Value of the fitted line at index `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Arithmetic mean; 0 for an empty series
pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

/// Mean of the last `window` values (all values if there are fewer; a zero window means all)
pub fn moving_average(series: &[f64], window: usize) -> f64 {
    let take = if window == 0 { series.len() } else { window.min(series.len()) };
    mean(&series[series.len() - take..])
}

/// Ordinary least-squares fit of value against index `0..n-1`
pub fn linear_trend(series: &[f64]) -> Trend {
    let n = series.len();
    if n < 2 {
        return Trend {
            slope: 0.0,
            intercept: series.first().copied().unwrap_or(0.0),
        };
    }

    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = mean(series);

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, &y) in series.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    Trend {
        slope,
        intercept: y_mean - slope * x_mean,
    }
}

/// Population standard deviation; 0 for fewer than two values
pub fn std_dev(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let m = mean(series);
    let variance = series.iter().map(|v| (v - m).powi(2)).sum::<f64>() / series.len() as f64;
    variance.sqrt()
}
