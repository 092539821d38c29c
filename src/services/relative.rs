//! Relative strength of each ticker against the normalization ticker.

use crate::error::EngineError;
use crate::types::{AlignedMatrix, RelativeSeries, Ticker};
use std::collections::BTreeMap;

/// `price(t, i) / price(normalization, i)` for every ticker other than the
/// normalization ticker. Positions where either side is missing stay missing.
///
/// Fails with `UnknownNormalizationTicker` if the normalization ticker has
/// no defined positions, and with `InvalidPrice` if a division would use a
/// non-positive or non-finite denominator.
pub fn relative_strength(
    matrix: &AlignedMatrix,
    normalization: &Ticker,
) -> Result<BTreeMap<Ticker, RelativeSeries>, EngineError> {
    let base = matrix
        .column(normalization)
        .filter(|c| c.iter().any(Option::is_some))
        .ok_or_else(|| {
            EngineError::UnknownNormalizationTicker(format!(
                "{} has no prices on the date axis",
                normalization
            ))
        })?;

    let mut out = BTreeMap::new();
    for (ticker, column) in matrix.columns() {
        if ticker == normalization {
            continue;
        }

        let mut values = Vec::with_capacity(column.len());
        for (i, (price, base_price)) in column.iter().zip(base).enumerate() {
            let value = match (price, base_price) {
                (Some(p), Some(b)) => {
                    if !b.is_finite() || *b <= 0.0 {
                        return Err(EngineError::InvalidPrice(format!(
                            "{} has price {} on {}",
                            normalization,
                            b,
                            matrix.dates()[i]
                        )));
                    }
                    Some(p / b)
                }
                _ => None,
            };
            values.push(value);
        }

        out.insert(ticker.clone(), RelativeSeries::new(values));
    }

    Ok(out)
}
