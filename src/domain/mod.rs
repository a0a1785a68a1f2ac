/// Domain models for the application
mod centre;
mod collection;
mod county;
mod credit;
mod sorting;
mod stats;
mod views;

pub use centre::{
    appointment_ordering, has_fast_track_eligibility, sorted_by_appointment, AppointmentSchedule,
    CentreId, GeoPoint, Location, Metadata, VaccinationCentre, CHRONODOSE_SCHEDULE,
    UNAVAILABLE_NAME,
};
pub use collection::{aggregate, dedup_by_id, AggregatedCentres, VaccinationCentres};
pub use county::County;
pub use credit::{unique_credits, Credit, CreditLink, CreditView, Credits};
pub use sorting::{sort_centres, SortOption};
pub use stats::CentreStats;
pub use views::{CentreListing, CentreView, Health, ViewContext};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode an optional field, treating a malformed value as absent
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Decode a list, dropping the elements that do not decode
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Decode an identifier that upstream sends either as a string or a number
pub(crate) fn lenient_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "lenient")]
        count: Option<i64>,
        #[serde(default, deserialize_with = "lenient_vec")]
        names: Vec<String>,
        #[serde(default, deserialize_with = "lenient_key")]
        key: Option<String>,
    }

    #[test]
    fn test_lenient_field_degrades_to_none() {
        let fields: Fields = serde_json::from_str(r#"{"count": "many"}"#).unwrap();
        assert_eq!(fields.count, None);
        assert!(fields.names.is_empty());
        assert_eq!(fields.key, None);
    }

    #[test]
    fn test_lenient_vec_drops_bad_items() {
        let fields: Fields = serde_json::from_str(r#"{"names": ["a", 3, "b", null]}"#).unwrap();
        assert_eq!(fields.names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_lenient_key_accepts_numbers() {
        let fields: Fields = serde_json::from_str(r#"{"key": 1234}"#).unwrap();
        assert_eq!(fields.key.as_deref(), Some("1234"));

        let fields: Fields = serde_json::from_str(r#"{"key": ""}"#).unwrap();
        assert_eq!(fields.key, None);
    }
}
