//! Z-score normalization of relative strength series.
//!
//! μ and σ are the arithmetic mean and population standard deviation of the
//! defined values. Missing positions are excluded from both and stay missing
//! in the output.

use crate::error::EngineError;
use crate::types::{RelativeSeries, ZScoreSeries, ZScoreWindow};

/// Population mean and standard deviation. `None` for an empty slice.
pub fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// σ this small relative to μ is treated as a constant series.
fn is_degenerate(mean: f64, std: f64) -> bool {
    !std.is_finite() || std <= f64::EPSILON * mean.abs().max(1.0)
}

/// Full-window z-score.
///
/// Fails with `InsufficientSamples` when fewer than two values are defined or
/// the defined values are constant.
pub fn zscore(series: &RelativeSeries) -> Result<ZScoreSeries, EngineError> {
    let defined: Vec<f64> = series.defined().collect();
    if defined.len() < 2 {
        return Err(EngineError::InsufficientSamples(format!(
            "{} defined value(s), need at least 2",
            defined.len()
        )));
    }

    let (mean, std) = mean_and_std(&defined).unwrap_or((0.0, 0.0));
    if is_degenerate(mean, std) {
        return Err(EngineError::InsufficientSamples(format!(
            "standard deviation is zero (constant relative strength {})",
            mean
        )));
    }

    Ok(ZScoreSeries::new(
        series
            .values()
            .iter()
            .map(|v| v.map(|x| (x - mean) / std))
            .collect(),
    ))
}

/// Trailing-window z-score over the last `window` defined values.
///
/// Positions whose window has fewer than two values, or a constant window,
/// are left missing.
pub fn rolling_zscore(series: &RelativeSeries, window: usize) -> Result<ZScoreSeries, EngineError> {
    if window < 2 {
        return Err(EngineError::InsufficientSamples(format!(
            "rolling window {} is shorter than 2",
            window
        )));
    }
    let defined_count = series.defined_count();
    if defined_count < 2 {
        return Err(EngineError::InsufficientSamples(format!(
            "{} defined value(s), need at least 2",
            defined_count
        )));
    }

    let mut seen: Vec<f64> = Vec::with_capacity(defined_count);
    let mut out = Vec::with_capacity(series.len());
    for value in series.values() {
        let Some(x) = *value else {
            out.push(None);
            continue;
        };
        seen.push(x);

        let tail = &seen[seen.len().saturating_sub(window)..];
        let z = match mean_and_std(tail) {
            Some((mean, std)) if tail.len() >= 2 && !is_degenerate(mean, std) => {
                Some((x - mean) / std)
            }
            _ => None,
        };
        out.push(z);
    }

    Ok(ZScoreSeries::new(out))
}

/// Dispatch on the configured window.
pub fn zscore_with_window(
    series: &RelativeSeries,
    window: ZScoreWindow,
) -> Result<ZScoreSeries, EngineError> {
    match window {
        ZScoreWindow::Full => zscore(series),
        ZScoreWindow::Rolling(n) => rolling_zscore(series, n),
    }
}
