//! Percentile rating of a z-score.
//!
//! Uses the Abramowitz–Stegun polynomial for the standard normal tail
//! (absolute error below 7.5e-8).

const P: f64 = 0.2316419;
const PDF_SCALE: f64 = 0.3989423;
const B1: f64 = 0.3193815;
const B2: f64 = -0.3565638;
const B3: f64 = 1.781478;
const B4: f64 = -1.821256;
const B5: f64 = 1.330274;

/// Upper tail probability `P(Z > |z|)` of the standard normal.
pub fn upper_tail(z: f64) -> f64 {
    let t = 1.0 / (1.0 + P * z.abs());
    let d = PDF_SCALE * (-z * z / 2.0).exp();
    d * t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))))
}

/// Approximate standard normal CDF `Φ(z)`.
pub fn cum_prob(z: f64) -> f64 {
    let p = upper_tail(z);
    if z > 0.0 {
        1.0 - p
    } else {
        p
    }
}

/// Percentile rating in [0, 100]: `100 · Φ(z)`.
///
/// NaN propagates; callers reject it before calling.
pub fn rating(z: f64) -> f64 {
    100.0 * cum_prob(z)
}
