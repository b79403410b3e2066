//! Least-squares polynomial trend over a level history.
//!
//! Times are converted to fractional days and shifted so the most recent
//! sample sits at x = 0; the shift is returned alongside the fit so callers
//! can evaluate the polynomial at other instants.

use chrono::{DateTime, Utc};
use nalgebra::{DMatrix, DVector};

use crate::model::Reading;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A polynomial with coefficients stored lowest order first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Polynomial { coefficients }
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Coefficient of `x^power`; zero past the degree.
    pub fn coefficient(&self, power: usize) -> f64 {
        self.coefficients.get(power).copied().unwrap_or(0.0)
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + c)
    }
}

/// Fractional days since the Unix epoch.
pub fn to_days(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0 / SECONDS_PER_DAY
}

/// Fits a degree-`degree` polynomial to `(times, levels)`.
///
/// Returns the polynomial in shifted days together with the shift `d0` (the
/// last sample, in days since the epoch). `None` when the inputs differ in
/// length, there are fewer than `degree + 1` points, or the sample times
/// cannot support a fit of that degree.
pub fn polyfit(
    times: &[DateTime<Utc>],
    levels: &[f64],
    degree: usize,
) -> Option<(Polynomial, f64)> {
    if times.len() != levels.len() || times.len() <= degree {
        return None;
    }

    let days: Vec<f64> = times.iter().map(|t| to_days(*t)).collect();
    let d0 = *days.last()?;
    let xs: Vec<f64> = days.iter().map(|d| d - d0).collect();

    let coefficients = least_squares(&xs, levels, degree)?;
    Some((Polynomial::new(coefficients), d0))
}

/// `polyfit` over a fetched reading history.
pub fn fit_history(readings: &[Reading], degree: usize) -> Option<(Polynomial, f64)> {
    let times: Vec<_> = readings.iter().map(|r| r.time).collect();
    let levels: Vec<_> = readings.iter().map(|r| r.level).collect();
    polyfit(&times, &levels, degree)
}

/// Least-squares solution of `V c = y` for the Vandermonde matrix `V` of
/// `xs`, via SVD.
///
/// Columns are scaled to unit norm before the decomposition and the rank test
/// is relative to the largest singular value, so short or densely sampled
/// windows (where high powers of `x` are tiny) still fit.
fn least_squares(xs: &[f64], ys: &[f64], degree: usize) -> Option<Vec<f64>> {
    let mut vandermonde =
        DMatrix::from_fn(xs.len(), degree + 1, |row, col| xs[row].powi(col as i32));

    let norms: Vec<f64> = vandermonde.column_iter().map(|c| c.norm()).collect();
    if norms.iter().any(|&n| n == 0.0) {
        return None;
    }
    for (mut column, norm) in vandermonde.column_iter_mut().zip(&norms) {
        column /= *norm;
    }

    let svd = vandermonde.svd(true, true);
    let largest = svd.singular_values.max();
    let eps = largest * f64::EPSILON * xs.len() as f64;
    if svd.rank(eps) <= degree {
        return None;
    }

    let y = DVector::from_column_slice(ys);
    let scaled = svd.solve(&y, eps).ok()?;
    Some(scaled.iter().zip(&norms).map(|(c, n)| c / n).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
