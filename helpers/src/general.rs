use std::cmp::Ordering;
use std::error::Error;
use std::fmt;

/// InputValueError is used if some simulation option or parameter does not fulfill the posed
/// requirements, e.g., a segment that is shorter than the track sampling step.
#[derive(Debug, Clone)]
pub struct InputValueError;

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value")
    }
}

impl Error for InputValueError {}

/// sanitize_timestep maps negative and non-finite time steps to zero such that they can never
/// move a simulation backwards.
pub fn sanitize_timestep(dt: f64) -> f64 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// sign returns -1.0, 0.0, or 1.0 depending on the sign of x (unlike f64::signum, zero maps to
/// zero).
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that sort the array x. NaN values are sorted to the end in both
/// orders.
pub fn argsort(x: &[f64], order: SortOrder) -> Vec<usize> {
    let mut idxs: Vec<usize> = (0..x.len()).collect();

    let cmp = |a: f64, b: f64| match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    };

    match order {
        SortOrder::Ascending => idxs.sort_by(|&a, &b| cmp(x[a], x[b])),
        SortOrder::Descending => idxs.sort_by(|&a, &b| match (x[a].is_nan(), x[b].is_nan()) {
            (false, false) => cmp(x[b], x[a]),
            _ => cmp(x[a], x[b]),
        }),
    };

    idxs
}
