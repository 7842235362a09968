//! Multi-series time alignment and axis scaling.

pub mod align;
pub mod axis;

pub use align::{AlignedSeries, AlignedSeriesSet, SeriesInput, align};
pub use axis::{AxisBounds, padded_bounds};
