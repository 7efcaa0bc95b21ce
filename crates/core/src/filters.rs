//! Client-side history filters.
//!
//! Only `status` is sent to the backend; everything else is applied to the
//! fetched items by [`HistoryFilters::apply`]. Each filter is an
//! independent predicate, so the result does not depend on the order in
//! which they are checked and applying the same set twice is a no-op.

use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::history::HistoryItem;
use crate::status::TaskStatus;
use crate::types::Timestamp;

/// Frame rate of a freshly generated clip; anything above it was
/// interpolated.
pub const BASE_FPS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    #[default]
    All,
    Week,
    Month,
    Quarter,
    /// Bounded by [`HistoryFilters::start`] / [`HistoryFilters::end`].
    Custom,
}

impl TimeRange {
    /// Look-back window for the relative ranges.
    fn window(self) -> Option<Duration> {
        match self {
            Self::Week => Some(Duration::days(7)),
            Self::Month => Some(Duration::days(30)),
            Self::Quarter => Some(Duration::days(90)),
            Self::All | Self::Custom => None,
        }
    }
}

impl FromStr for TimeRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "custom" => Ok(Self::Custom),
            other => Err(CoreError::Validation(format!("Unknown time range: '{other}'"))),
        }
    }
}

/// Ownership scope. Every video is currently personal, so this filter
/// matches everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoType {
    #[default]
    All,
    Group,
    Personal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    #[default]
    All,
    UltraHd,
    FpsEnhanced,
    Favorite,
    Liked,
}

impl OperationType {
    fn matches(self, item: &HistoryItem) -> bool {
        match self {
            Self::All => true,
            Self::UltraHd => item.is_ultra_hd,
            Self::FpsEnhanced => item.fps > BASE_FPS,
            Self::Favorite => item.is_favorite,
            Self::Liked => item.is_liked,
        }
    }
}

impl FromStr for OperationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "ultra_hd" => Ok(Self::UltraHd),
            "fps_enhanced" => Ok(Self::FpsEnhanced),
            "favorite" => Ok(Self::Favorite),
            "liked" => Ok(Self::Liked),
            other => Err(CoreError::Validation(format!(
                "Unknown operation type: '{other}'"
            ))),
        }
    }
}

/// The full filter set for the history view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryFilters {
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(default)]
    pub start: Option<Timestamp>,
    #[serde(default)]
    pub end: Option<Timestamp>,
    #[serde(default)]
    pub video_type: VideoType,
    #[serde(default)]
    pub operation_type: OperationType,
    /// Passed to the backend; not re-checked locally.
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

/// Partial update merged into the stored filters by `set_filters`.
#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub time_range: Option<TimeRange>,
    pub start: Option<Option<Timestamp>>,
    pub end: Option<Option<Timestamp>>,
    pub video_type: Option<VideoType>,
    pub operation_type: Option<OperationType>,
    pub status: Option<Option<TaskStatus>>,
}

impl HistoryFilters {
    /// Return a copy with every `Some` field of `update` applied.
    pub fn merged(&self, update: FilterUpdate) -> Self {
        Self {
            time_range: update.time_range.unwrap_or(self.time_range),
            start: update.start.unwrap_or(self.start),
            end: update.end.unwrap_or(self.end),
            video_type: update.video_type.unwrap_or(self.video_type),
            operation_type: update.operation_type.unwrap_or(self.operation_type),
            status: update.status.unwrap_or(self.status),
        }
    }

    /// Whether `item` passes every client-side predicate at time `now`.
    pub fn matches(&self, item: &HistoryItem, now: Timestamp) -> bool {
        self.matches_time_range(item, now)
            && self.matches_custom_range(item)
            && self.operation_type.matches(item)
    }

    /// Filter `items`, preserving order.
    pub fn apply(&self, items: &[HistoryItem], now: Timestamp) -> Vec<HistoryItem> {
        items
            .iter()
            .filter(|item| self.matches(item, now))
            .cloned()
            .collect()
    }

    fn matches_time_range(&self, item: &HistoryItem, now: Timestamp) -> bool {
        match self.time_range.window() {
            Some(window) => item.created_at >= now - window,
            None => true,
        }
    }

    /// Explicit bounds apply whenever both are set, inclusive at both ends.
    fn matches_custom_range(&self, item: &HistoryItem) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => item.created_at >= start && item.created_at <= end,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationRequest;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn item(id: i64, fps: u32, age_days: i64) -> HistoryItem {
        let mut item = HistoryItem::placeholder(
            id,
            format!("t{id}"),
            &GenerationRequest::new("p", 5),
            now() - Duration::days(age_days),
        );
        item.fps = fps;
        item
    }

    #[test]
    fn fps_enhanced_keeps_only_interpolated_clips() {
        let items = vec![item(1, 24, 0), item(2, 30, 0), item(3, 60, 0)];
        let filters = HistoryFilters {
            operation_type: OperationType::FpsEnhanced,
            ..Default::default()
        };
        let ids: Vec<_> = filters.apply(&items, now()).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn relative_time_ranges() {
        let items = vec![item(1, 24, 3), item(2, 24, 20), item(3, 24, 60), item(4, 24, 200)];
        let ids = |range| {
            let filters = HistoryFilters {
                time_range: range,
                ..Default::default()
            };
            filters.apply(&items, now()).iter().map(|i| i.id).collect::<Vec<_>>()
        };
        assert_eq!(ids(TimeRange::Week), vec![1]);
        assert_eq!(ids(TimeRange::Month), vec![1, 2]);
        assert_eq!(ids(TimeRange::Quarter), vec![1, 2, 3]);
        assert_eq!(ids(TimeRange::All), vec![1, 2, 3, 4]);
    }

    #[test]
    fn custom_range_is_inclusive() {
        let items = vec![item(1, 24, 1), item(2, 24, 5), item(3, 24, 10)];
        let filters = HistoryFilters {
            time_range: TimeRange::Custom,
            start: Some(now() - Duration::days(5)),
            end: Some(now() - Duration::days(1)),
            ..Default::default()
        };
        let ids: Vec<_> = filters.apply(&items, now()).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn flag_filters() {
        let mut fav = item(1, 24, 0);
        fav.is_favorite = true;
        let mut liked = item(2, 24, 0);
        liked.is_liked = true;
        let mut uhd = item(3, 24, 0);
        uhd.is_ultra_hd = true;
        let items = vec![fav, liked, uhd];

        let pick = |op| {
            let filters = HistoryFilters {
                operation_type: op,
                ..Default::default()
            };
            filters.apply(&items, now()).iter().map(|i| i.id).collect::<Vec<_>>()
        };
        assert_eq!(pick(OperationType::Favorite), vec![1]);
        assert_eq!(pick(OperationType::Liked), vec![2]);
        assert_eq!(pick(OperationType::UltraHd), vec![3]);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let items = vec![item(1, 60, 2), item(2, 24, 2), item(3, 60, 40)];
        let filters = HistoryFilters {
            time_range: TimeRange::Month,
            operation_type: OperationType::FpsEnhanced,
            ..Default::default()
        };
        let once = filters.apply(&items, now());
        let twice = filters.apply(&once, now());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 1);
    }

    #[test]
    fn video_type_is_a_no_op() {
        let items = vec![item(1, 24, 0), item(2, 24, 0)];
        let filters = HistoryFilters {
            video_type: VideoType::Group,
            ..Default::default()
        };
        assert_eq!(filters.apply(&items, now()).len(), 2);
    }

    #[test]
    fn merge_only_touches_given_fields() {
        let base = HistoryFilters {
            operation_type: OperationType::Liked,
            ..Default::default()
        };
        let merged = base.merged(FilterUpdate {
            time_range: Some(TimeRange::Week),
            ..Default::default()
        });
        assert_eq!(merged.time_range, TimeRange::Week);
        assert_eq!(merged.operation_type, OperationType::Liked);
    }

    #[test]
    fn parse_operation_type() {
        assert_eq!("fps_enhanced".parse::<OperationType>().unwrap(), OperationType::FpsEnhanced);
        assert!("sharpened".parse::<OperationType>().is_err());
    }
}
