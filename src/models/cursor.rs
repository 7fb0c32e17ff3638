use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Unix seconds of the epoch and of `0001-01-01T00:00:00Z`.
const UNSET_TIMESTAMPS: [i64; 2] = [0, -62_135_596_800];

/// Progress watermark for cursor feeds: `(updated_utc, id)`.
///
/// Ordered lexicographically, timestamp first. Every window payload carries
/// the next cursor; callers thread it into their next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCursor {
    pub updated_utc: DateTime<Utc>,
    pub id: i64,
}

impl FeedCursor {
    pub fn new(updated_utc: DateTime<Utc>, id: i64) -> Self {
        Self { updated_utc, id }
    }

    /// The timestamp was never set.
    ///
    /// Both the Unix epoch and `0001-01-01T00:00:00Z` count as unset; servers
    /// send the latter for an empty cursor.
    pub fn is_zero(&self) -> bool {
        self.updated_utc.timestamp_subsec_nanos() == 0
            && UNSET_TIMESTAMPS.contains(&self.updated_utc.timestamp())
    }

    /// `sinceUpdatedUtc` query value.
    pub fn since_param(&self) -> String {
        format_since(&self.updated_utc)
    }
}

/// RFC 3339 in UTC with whole seconds, e.g. `2025-01-02T03:04:05Z`.
pub(crate) fn format_since(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_since_param_drops_fraction() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(789);
        let cursor = FeedCursor::new(at, 42);
        assert_eq!(cursor.since_param(), "2025-01-02T03:04:05Z");
    }

    #[test]
    fn test_zero_cursor() {
        assert!(FeedCursor::default().is_zero());
        assert!(FeedCursor::new(DateTime::<Utc>::default(), 7).is_zero());

        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(!FeedCursor::new(at, 0).is_zero());
    }

    #[test]
    fn test_year_one_cursor_is_zero() {
        let year_one = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        assert!(FeedCursor::new(year_one, 3).is_zero());

        let cursor: FeedCursor =
            serde_json::from_str(r#"{"updatedUtc":"0001-01-01T00:00:00Z","id":0}"#).unwrap();
        assert!(cursor.is_zero());

        let just_after = year_one + chrono::Duration::seconds(1);
        assert!(!FeedCursor::new(just_after, 0).is_zero());
    }

    #[test]
    fn test_ordering_is_timestamp_then_id() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();

        assert!(FeedCursor::new(early, 9) < FeedCursor::new(late, 1));
        assert!(FeedCursor::new(early, 1) < FeedCursor::new(early, 2));
        assert_eq!(FeedCursor::new(late, 3), FeedCursor::new(late, 3));
    }
}
