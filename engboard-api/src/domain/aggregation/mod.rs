//! Pure aggregation over fetched rows: utilization, hours, progress and cost.

mod hours;
mod utilization;

pub use hours::*;
pub use utilization::*;

/// Numbers read from the store may be missing or malformed; treat anything
/// non-finite or negative as 0.
pub(crate) fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
