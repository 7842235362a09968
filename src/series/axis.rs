use serde::Serialize;

/// Padded value range for a chart's y-axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

/// Y-axis range with 10% headroom.
///
/// Flat data is padded by 10% of its magnitude (or 1.0 around zero) so a
/// constant series is drawn as a line inside the plot, not on its edge.
/// Non-finite values are ignored; `None` if nothing finite remains.
#[must_use]
pub fn padded_bounds<I>(values: I) -> Option<AxisBounds>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let range = max - min;
    let pad = if range == 0.0 {
        if min == 0.0 { 1.0 } else { min.abs() * 0.1 }
    } else {
        range * 0.1
    };

    Some(AxisBounds {
        min: min - pad,
        max: max + pad,
    })
}
