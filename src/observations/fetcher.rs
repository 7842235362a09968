use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::error::AppResult;
use crate::observations::{Observation, TimeWindow};
use crate::sta::{EntityId, ObservationQuery, PageRequest, RawObservation, SensorSource};

/// All observations of a stream inside `window`, ascending by time.
///
/// # Errors
///
/// Returns the source error of the first page that fails. An empty vector
/// means the range holds no data.
pub async fn fetch_observations<S: SensorSource>(
    source: &S,
    stream: &EntityId,
    window: TimeWindow,
) -> AppResult<Vec<Observation>> {
    fetch_observations_since(source, stream, window.lower_bound(Utc::now())).await
}

/// All observations of a stream at or after `since`, following
/// `@iot.nextLink` until the server stops sending one or links back to a
/// page already read.
///
/// # Errors
///
/// Returns the source error of the first page that fails.
pub async fn fetch_observations_since<S: SensorSource>(
    source: &S,
    stream: &EntityId,
    since: Option<DateTime<Utc>>,
) -> AppResult<Vec<Observation>> {
    let mut request = PageRequest::First {
        datastream: stream.clone(),
        query: ObservationQuery::history(since),
    };
    let mut visited = HashSet::from([source.page_url(&request)]);
    let mut observations = Vec::new();
    let mut pages = 0usize;
    let mut skipped = 0usize;

    loop {
        let page = source.observations(&request).await?;
        pages += 1;
        skipped += extend_coerced(&mut observations, &page.value);

        let Some(link) = page.next_link else {
            break;
        };
        if !visited.insert(link.clone()) {
            tracing::warn!(stream = %stream, link = %link, "nextLink points to a page already read, stopping");
            break;
        }
        request = PageRequest::Next(link);
    }

    // Stable: equal instants keep server order
    observations.sort_by_key(|o| o.timestamp);

    tracing::debug!(
        stream = %stream,
        since = ?since,
        pages,
        count = observations.len(),
        skipped,
        "observations_fetched"
    );

    Ok(observations)
}

/// Most recent observation of a stream (single `$top=1` request).
///
/// # Errors
///
/// Returns the source error if the request fails.
pub async fn latest_observation<S: SensorSource>(
    source: &S,
    stream: &EntityId,
) -> AppResult<Option<Observation>> {
    let page = source
        .observations(&PageRequest::First {
            datastream: stream.clone(),
            query: ObservationQuery::latest(1),
        })
        .await?;

    Ok(page.value.iter().find_map(Observation::from_raw))
}

/// Append coerced observations; returns how many had no usable time.
fn extend_coerced(into: &mut Vec<Observation>, raw: &[RawObservation]) -> usize {
    let before = into.len();
    into.extend(raw.iter().filter_map(Observation::from_raw));
    raw.len() - (into.len() - before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::sta::memory::MemorySource;
    use crate::sta::{Collection, Datastream, Thing};
    use chrono::TimeZone;
    use serde_json::json;

    fn source_with_points(page_size: usize) -> MemorySource {
        let mut source = MemorySource::new().with_page_size(page_size);
        source.add_thing(1, "box", None);
        source.add_datastream(1, 10, "wave_height * box");
        source.add_observations(
            10,
            &[
                ("2025-06-01T00:00:00Z", json!(1.0)),
                ("2025-06-02T00:00:00Z", json!("2.5")),
                ("2025-06-03T00:00:00Z", json!("broken")),
                ("2025-06-04T00:00:00Z", json!(4.0)),
                ("2025-06-05T00:00:00Z", json!(5.0)),
            ],
        );
        source
    }

    #[tokio::test]
    async fn follows_every_page() {
        let source = source_with_points(2);
        let observations = fetch_observations_since(&source, &EntityId::Number(10), None)
            .await
            .unwrap();

        assert_eq!(observations.len(), 5);
        assert_eq!(source.observation_requests(), 3);
        assert!(observations.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(observations[1].value, Some(2.5));
        assert_eq!(observations[2].value, None);
    }

    #[tokio::test]
    async fn lower_bound_is_applied_by_the_source() {
        let source = source_with_points(100);
        let since = Utc.with_ymd_and_hms(2025, 6, 4, 0, 0, 0).unwrap();
        let observations = fetch_observations_since(&source, &EntityId::Number(10), Some(since))
            .await
            .unwrap();

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].timestamp, since);
    }

    #[tokio::test]
    async fn empty_range_is_not_an_error() {
        let source = source_with_points(100);
        let since = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let observations = fetch_observations_since(&source, &EntityId::Number(10), Some(since))
            .await
            .unwrap();
        assert!(observations.is_empty());
    }

    #[tokio::test]
    async fn failing_stream_is_source_unavailable() {
        let mut source = source_with_points(100);
        source.fail_datastream(10);
        let err = fetch_observations_since(&source, &EntityId::Number(10), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn window_bounds_history_relative_to_now() {
        let now = Utc::now();
        let recent = (now - chrono::Duration::hours(1)).to_rfc3339();
        let old = (now - chrono::Duration::hours(48)).to_rfc3339();

        let mut source = MemorySource::new();
        source.add_datastream(1, 10, "wave_height * box");
        source.add_observations(10, &[(old.as_str(), json!(1.0)), (recent.as_str(), json!(2.0))]);

        let last_day = fetch_observations(&source, &EntityId::Number(10), TimeWindow::Last24Hours)
            .await
            .unwrap();
        assert_eq!(last_day.len(), 1);
        assert_eq!(last_day[0].value, Some(2.0));

        let all = fetch_observations(&source, &EntityId::Number(10), TimeWindow::All)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, Some(1.0));
    }

    /// Serves fixed pages keyed by URL; `"first"` is the first page.
    struct LinkedPages {
        pages: Vec<(&'static str, &'static str, Option<&'static str>)>,
    }

    impl SensorSource for LinkedPages {
        async fn things(&self) -> AppResult<Collection<Thing>> {
            Ok(Collection::single_page(Vec::new()))
        }

        async fn datastreams(&self, _thing: &EntityId) -> AppResult<Collection<Datastream>> {
            Ok(Collection::single_page(Vec::new()))
        }

        async fn observations(&self, page: &PageRequest) -> AppResult<Collection<RawObservation>> {
            let url = self.page_url(page);
            let (_, time, next) = self
                .pages
                .iter()
                .find(|(key, _, _)| *key == url)
                .ok_or_else(|| AppError::SourceUnavailable(format!("HTTP 404 Not Found: {url}")))?;
            Ok(Collection {
                value: vec![RawObservation {
                    phenomenon_time: Some((*time).to_string()),
                    result: json!(1.0),
                }],
                next_link: next.map(ToString::to_string),
            })
        }

        fn page_url(&self, page: &PageRequest) -> String {
            match page {
                PageRequest::First { .. } => "first".to_string(),
                PageRequest::Next(link) => link.clone(),
            }
        }
    }

    #[tokio::test]
    async fn link_back_to_first_page_stops_paging() {
        let source = LinkedPages {
            pages: vec![("first", "2025-06-01T00:00:00Z", Some("first"))],
        };
        let observations = fetch_observations_since(&source, &EntityId::Number(1), None)
            .await
            .unwrap();
        assert_eq!(observations.len(), 1);
    }

    #[tokio::test]
    async fn link_cycle_stops_paging() {
        let source = LinkedPages {
            pages: vec![
                ("first", "2025-06-01T00:00:00Z", Some("a")),
                ("a", "2025-06-02T00:00:00Z", Some("b")),
                ("b", "2025-06-03T00:00:00Z", Some("a")),
            ],
        };
        let observations = fetch_observations_since(&source, &EntityId::Number(1), None)
            .await
            .unwrap();
        assert_eq!(observations.len(), 3);
    }

    #[tokio::test]
    async fn latest_returns_newest_point() {
        let source = source_with_points(2);
        let latest = latest_observation(&source, &EntityId::Number(10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            latest.timestamp,
            Utc.with_ymd_and_hms(2025, 6, 5, 0, 0, 0).unwrap()
        );
        assert_eq!(latest.value, Some(5.0));
    }
}
