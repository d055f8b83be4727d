//! Wire models for the two synchronized collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product/application that licenses are issued under.
///
/// Created through [`crate::Commands::register_system`], never mutated or
/// deleted client-side; instances live until the next synchronization
/// replaces the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSystem {
    pub id: i64,
    pub system_name: String,
}

/// A backend-issued license key.
///
/// `ip_limit` is the only client-mutable field. `None` (absent or JSON
/// null on the wire) means the key is not capped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub license_key: String,
    /// Display name of the linked system; keys can be unlinked.
    pub active_system: Option<String>,
    #[serde(with = "backend_timestamp")]
    pub create_at: DateTime<Utc>,
    #[serde(default)]
    pub ip_limit: Option<u32>,
}

/// The two authoritative collections, always replaced together.
///
/// Holding them in one struct behind one `Arc` is what makes the
/// replacement atomic: a reader either sees the old pair or the new pair,
/// never a mix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncedState {
    pub systems: Vec<ActiveSystem>,
    pub licenses: Vec<License>,
}

/// The backend emits naive timestamps (`2024-05-01T10:00:00`) while most
/// tooling emits RFC 3339. Accept both; naive values are taken as UTC.
mod backend_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(de)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn license_ip_limit_absent_means_unlimited() {
        let lic: License = serde_json::from_str(
            r#"{"license_key":"ABC-1","active_system":"Alpha","create_at":"2024-05-01T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(lic.ip_limit, None);
    }

    #[test]
    fn license_ip_limit_null_means_unlimited() {
        let lic: License = serde_json::from_str(
            r#"{"license_key":"ABC-1","active_system":null,"create_at":"2024-05-01T10:00:00","ip_limit":null}"#,
        )
        .unwrap();
        assert_eq!(lic.ip_limit, None);
        assert_eq!(lic.active_system, None);
    }

    #[test]
    fn license_ip_limit_value() {
        let lic: License = serde_json::from_str(
            r#"{"license_key":"ABC-1","active_system":"Alpha","create_at":"2024-05-01T10:00:00","ip_limit":5}"#,
        )
        .unwrap();
        assert_eq!(lic.ip_limit, Some(5));
    }

    #[test]
    fn create_at_accepts_naive_backend_form() {
        let lic: License = serde_json::from_str(
            r#"{"license_key":"K","active_system":null,"create_at":"2024-05-01T10:30:00.500"}"#,
        )
        .unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
            + chrono::Duration::milliseconds(500);
        assert_eq!(lic.create_at, expected);
    }

    #[test]
    fn create_at_accepts_rfc3339() {
        let lic: License = serde_json::from_str(
            r#"{"license_key":"K","active_system":null,"create_at":"2024-05-01T10:30:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(
            lic.create_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn create_at_garbage_is_an_error_not_a_panic() {
        let res: Result<License, _> = serde_json::from_str(
            r#"{"license_key":"K","active_system":null,"create_at":"yesterday"}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn license_serializes_round_trip() {
        let lic = License {
            license_key: "XYZ-2".into(),
            active_system: Some("Beta".into()),
            create_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            ip_limit: Some(3),
        };
        let json = serde_json::to_string(&lic).unwrap();
        let back: License = serde_json::from_str(&json).unwrap();
        assert_eq!(back, lic);
    }
}
