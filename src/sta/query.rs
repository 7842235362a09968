use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_odata(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// OData options for an observations request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationQuery {
    pub order: SortOrder,
    /// Server-side lower bound on `phenomenonTime`
    pub since: Option<DateTime<Utc>>,
    /// Result cap (`$top`); `None` lets pagination deliver everything
    pub top: Option<u32>,
}

impl ObservationQuery {
    /// Full history in ascending order, optionally bounded below.
    #[must_use]
    pub fn history(since: Option<DateTime<Utc>>) -> Self {
        Self {
            order: SortOrder::Ascending,
            since,
            top: None,
        }
    }

    /// The `n` most recent observations, newest first.
    #[must_use]
    pub fn latest(n: u32) -> Self {
        Self {
            order: SortOrder::Descending,
            since: None,
            top: Some(n),
        }
    }

    /// Build the query string (without the leading `?`).
    ///
    /// Kept unencoded like the FROST documentation shows it; the HTTP client
    /// percent-encodes spaces when parsing the URL.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(top) = self.top {
            parts.push(format!("$top={top}"));
        }
        parts.push(format!("$orderby=phenomenonTime {}", self.order.as_odata()));
        if let Some(since) = self.since {
            parts.push(format!(
                "$filter=phenomenonTime ge {}",
                since.to_rfc3339_opts(SecondsFormat::Millis, true)
            ));
        }
        parts.join("&")
    }
}
