use std::sync::atomic::{AtomicU64, Ordering};

/// Independently refreshed parts of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    StationChart,
    LatestValues,
    HoverPreview,
    BatteryOverview,
}

impl Region {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        match self {
            Self::StationChart => 0,
            Self::LatestValues => 1,
            Self::HoverPreview => 2,
            Self::BatteryOverview => 3,
        }
    }
}

/// Ticket for one request sequence in a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    region: Region,
    seq: u64,
}

impl RequestToken {
    #[must_use]
    pub fn seq(self) -> u64 {
        self.seq
    }
}

/// Monotonic request counters, one per region.
///
/// A result may only be applied if its token is still the latest issued for
/// its region; anything older was overtaken by a newer selection.
#[derive(Debug, Default)]
pub struct RequestTokens {
    latest: [AtomicU64; Region::COUNT],
}

impl RequestTokens {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, region: Region) -> RequestToken {
        let seq = self.latest[region.index()].fetch_add(1, Ordering::SeqCst) + 1;
        RequestToken { region, seq }
    }

    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest[token.region.index()].load(Ordering::SeqCst) == token.seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_token_supersedes_older() {
        let tokens = RequestTokens::new();
        let first = tokens.issue(Region::StationChart);
        assert!(tokens.is_current(first));

        let second = tokens.issue(Region::StationChart);
        assert!(!tokens.is_current(first));
        assert!(tokens.is_current(second));
        assert!(second.seq() > first.seq());
    }

    #[test]
    fn regions_are_independent() {
        let tokens = RequestTokens::new();
        let chart = tokens.issue(Region::StationChart);
        let hover = tokens.issue(Region::HoverPreview);
        tokens.issue(Region::HoverPreview);

        assert!(tokens.is_current(chart));
        assert!(!tokens.is_current(hover));
    }
}
