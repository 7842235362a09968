use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::observations::Observation;

/// One labelled input series, in any order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesInput {
    pub label: String,
    pub points: Vec<Observation>,
}

impl SeriesInput {
    #[must_use]
    pub fn new(label: impl Into<String>, points: Vec<Observation>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub label: String,
    /// Same length as the axis; `None` where the series has no value
    pub values: Vec<Option<f64>>,
}

impl AlignedSeries {
    /// True when the series has no value anywhere on the axis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// Series sharing one sorted, duplicate-free time axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AlignedSeriesSet {
    pub timestamps: Vec<DateTime<Utc>>,
    pub series: Vec<AlignedSeries>,
}

impl AlignedSeriesSet {
    /// True when no series has a single value.
    #[must_use]
    pub fn has_no_data(&self) -> bool {
        self.series.iter().all(AlignedSeries::is_empty)
    }

    /// All finite values across every series.
    pub fn finite_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .filter(|v| v.is_finite())
    }
}

/// Put independently sampled series on a shared time axis.
///
/// The axis is the sorted union of all timestamps. Each series gets exactly
/// one slot per axis entry, holding its own value at that instant or `None`.
/// No interpolation, no carry-forward. Input order and labels are kept, and
/// empty series stay in the output with all-`None` values.
#[must_use]
pub fn align(inputs: &[SeriesInput]) -> AlignedSeriesSet {
    // 1. Unified axis (BTreeSet sorts and dedups in one pass)
    let timestamps: Vec<DateTime<Utc>> = inputs
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.timestamp))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // 2. time -> axis index
    let index: HashMap<DateTime<Utc>, usize> = timestamps
        .iter()
        .enumerate()
        .map(|(i, t)| (*t, i))
        .collect();

    // 3. Project each series onto the axis
    let series = inputs
        .iter()
        .map(|input| {
            let mut values: Vec<Option<f64>> = vec![None; timestamps.len()];
            let mut filled = vec![false; timestamps.len()];

            for point in &input.points {
                if let Some(&idx) = index.get(&point.timestamp) {
                    // First observation at an instant wins
                    if !filled[idx] {
                        filled[idx] = true;
                        values[idx] = point.value;
                    }
                }
            }

            AlignedSeries {
                label: input.label.clone(),
                values,
            }
        })
        .collect();

    AlignedSeriesSet { timestamps, series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    fn obs(hour: u32, value: f64) -> Observation {
        Observation::new(t(hour), Some(value))
    }

    #[test]
    fn no_series_gives_empty_set() {
        let aligned = align(&[]);
        assert!(aligned.timestamps.is_empty());
        assert!(aligned.series.is_empty());
        assert!(aligned.has_no_data());
    }

    #[test]
    fn single_series_is_reproduced() {
        let input = SeriesInput::new("tide", vec![obs(1, 3.0), obs(2, 4.0), obs(3, 5.0)]);
        let aligned = align(&[input]);
        assert_eq!(aligned.timestamps, vec![t(1), t(2), t(3)]);
        assert_eq!(aligned.series[0].values, vec![Some(3.0), Some(4.0), Some(5.0)]);
        assert_eq!(aligned.series[0].label, "tide");
    }

    #[test]
    fn disjoint_series_get_gaps() {
        let a = SeriesInput::new("A", vec![obs(1, 5.0)]);
        let b = SeriesInput::new("B", vec![obs(2, 7.0)]);
        let aligned = align(&[a, b]);
        assert_eq!(aligned.timestamps, vec![t(1), t(2)]);
        assert_eq!(aligned.series[0].values, vec![Some(5.0), None]);
        assert_eq!(aligned.series[1].values, vec![None, Some(7.0)]);
    }

    #[test]
    fn unsorted_input_and_shared_instants() {
        let a = SeriesInput::new("A", vec![obs(3, 1.0), obs(1, 2.0)]);
        let b = SeriesInput::new("B", vec![obs(1, 9.0), obs(2, 8.0), obs(3, 7.0)]);
        let aligned = align(&[a, b]);
        assert_eq!(aligned.timestamps, vec![t(1), t(2), t(3)]);
        assert_eq!(aligned.series[0].values, vec![Some(2.0), None, Some(1.0)]);
        assert_eq!(aligned.series[1].values, vec![Some(9.0), Some(8.0), Some(7.0)]);
    }

    #[test]
    fn empty_series_is_kept_with_gaps() {
        let a = SeriesInput::new("A", vec![obs(1, 1.0), obs(2, 2.0)]);
        let b = SeriesInput::new("B", vec![]);
        let aligned = align(&[a, b]);
        assert_eq!(aligned.series.len(), 2);
        assert_eq!(aligned.series[1].label, "B");
        assert_eq!(aligned.series[1].values, vec![None, None]);
        assert!(aligned.series[1].is_empty());
        assert!(!aligned.has_no_data());
    }

    #[test]
    fn duplicate_instants_keep_first_value() {
        let a = SeriesInput::new("A", vec![obs(1, 1.0), obs(1, 99.0)]);
        let aligned = align(&[a]);
        assert_eq!(aligned.timestamps, vec![t(1)]);
        assert_eq!(aligned.series[0].values, vec![Some(1.0)]);
    }

    #[test]
    fn absent_values_stay_gaps_not_zero() {
        let a = SeriesInput::new("A", vec![Observation::new(t(1), None), obs(2, 0.0)]);
        let aligned = align(&[a]);
        assert_eq!(aligned.series[0].values, vec![None, Some(0.0)]);
        assert_eq!(aligned.finite_values().collect::<Vec<_>>(), vec![0.0]);
    }

    #[test]
    fn axis_is_strictly_sorted_and_every_series_matches_its_length() {
        let inputs = vec![
            SeriesInput::new("A", vec![obs(5, 1.0), obs(2, 1.0), obs(9, 1.0)]),
            SeriesInput::new("B", vec![obs(2, 1.0), obs(7, 1.0)]),
            SeriesInput::new("C", vec![obs(9, 1.0), obs(0, 1.0), obs(5, 1.0)]),
            SeriesInput::new("D", vec![]),
        ];
        let aligned = align(&inputs);
        assert_eq!(aligned.timestamps.len(), 5);
        assert!(aligned.timestamps.windows(2).all(|w| w[0] < w[1]));
        for series in &aligned.series {
            assert_eq!(series.values.len(), aligned.timestamps.len());
        }
        let labels: Vec<&str> = aligned.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D"]);
    }
}
