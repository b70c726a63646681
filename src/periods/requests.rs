//! Request DTOs for period administration.

use serde::{Deserialize, Deserializer};

/// Request to create a period
#[derive(Debug, Deserialize)]
pub struct CreatePeriodRequest {
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_true")]
    pub is_open: bool,
    pub nightly_price: i64,
    #[serde(default)]
    pub weekly_discount_bps: Option<i32>,
    #[serde(default = "default_weekly_threshold")]
    pub weekly_threshold_nights: i32,
    #[serde(default = "default_min_nights")]
    pub min_nights: i32,
    pub max_guests: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_weekly_threshold() -> i32 {
    7
}

fn default_min_nights() -> i32 {
    1
}

/// Patch for a period.
///
/// For nullable columns "field absent" and "field: null" mean different
/// things: absent leaves the value alone, null clears it. The
/// `Option<Option<T>>` fields preserve that distinction (outer None =
/// absent, `Some(None)` = explicit null).
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePeriodRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_open: Option<bool>,
    #[serde(default)]
    pub nightly_price: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub weekly_discount_bps: Option<Option<i32>>,
    #[serde(default)]
    pub weekly_threshold_nights: Option<i32>,
    #[serde(default)]
    pub min_nights: Option<i32>,
    #[serde(default)]
    pub max_guests: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_distinguishes_absent_from_null() {
        let patch: UpdatePeriodRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(patch.weekly_discount_bps.is_none());

        let patch: UpdatePeriodRequest =
            serde_json::from_str(r#"{"weekly_discount_bps": null}"#).unwrap();
        assert_eq!(patch.weekly_discount_bps, Some(None));

        let patch: UpdatePeriodRequest =
            serde_json::from_str(r#"{"weekly_discount_bps": 1000}"#).unwrap();
        assert_eq!(patch.weekly_discount_bps, Some(Some(1000)));
    }

    #[test]
    fn test_create_defaults() {
        let req: CreatePeriodRequest = serde_json::from_str(
            r#"{"start_date":"2026-02-01","end_date":"2026-02-10","nightly_price":100,"max_guests":4}"#,
        )
        .unwrap();
        assert!(req.is_open);
        assert_eq!(req.weekly_threshold_nights, 7);
        assert_eq!(req.min_nights, 1);
        assert!(req.weekly_discount_bps.is_none());
    }
}
