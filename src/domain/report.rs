//! Location report: payload validation and message composition
//!
//! The share payload is loosely typed JSON coming from a browser, so it is
//! inspected as a `serde_json::Value` rather than deserialized into a struct.
//! That keeps the rules explicit: `consent` must be the JSON literal `true`,
//! and coordinates may arrive as numbers or numeric strings but must be finite.

use serde_json::{Map, Value};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    format_coordinate, map_search_url, TIMESTAMP_FORMAT, UNKNOWN_ACCURACY,
};

/// Parse a request body, treating absence or garbage as an empty object
pub fn parse_payload(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Local wall-clock time in the message format
pub fn local_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A consented location share, built per request and never stored
#[derive(Debug, Clone, PartialEq)]
pub struct LocationReport {
    pub consent: bool,
    pub latitude: f64,
    pub longitude: f64,
    /// Free-form accuracy ("15 m") or "unknown"
    pub accuracy: String,
    pub map_url: String,
    pub timestamp: String,
}

impl LocationReport {
    /// Validate a payload in order: consent, then coordinates.
    pub fn from_payload(payload: &Map<String, Value>, timestamp: String) -> AppResult<Self> {
        if payload.get("consent") != Some(&Value::Bool(true)) {
            return Err(AppError::consent_required());
        }

        let latitude = coordinate(payload.get("lat")).ok_or_else(AppError::invalid_coordinates)?;
        let longitude = coordinate(payload.get("lng")).ok_or_else(AppError::invalid_coordinates)?;

        let accuracy = optional_text(payload.get("acc")).unwrap_or_else(|| UNKNOWN_ACCURACY.to_string());
        let map_url =
            optional_text(payload.get("map")).unwrap_or_else(|| map_search_url(latitude, longitude));

        Ok(Self {
            consent: true,
            latitude,
            longitude,
            accuracy,
            map_url,
            timestamp,
        })
    }

    /// Plain-text body, one line per field, fixed order
    pub fn message_body(&self, app_name: &str) -> String {
        format!(
            "{} — User Shared Location (with consent)\n\
             Time: {}\n\
             Latitude: {}\n\
             Longitude: {}\n\
             Accuracy: {}\n\
             Map: {}\n",
            app_name,
            self.timestamp,
            format_coordinate(self.latitude),
            format_coordinate(self.longitude),
            self.accuracy,
            self.map_url
        )
    }
}

/// Email subject for a location share
pub fn subject_line(app_name: &str) -> String {
    format!("{} — Location Share (with consent)", app_name)
}

/// Finite float from a JSON number or numeric string
fn coordinate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Non-empty string (or number rendered as text); anything else is "absent"
fn optional_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    fn ts() -> String {
        "2024-05-01 12:30:00".to_string()
    }

    #[test]
    fn test_parse_payload_tolerates_garbage() {
        assert!(parse_payload(b"").is_empty());
        assert!(parse_payload(b"not json").is_empty());
        assert!(parse_payload(b"[1,2,3]").is_empty());
        assert_eq!(parse_payload(br#"{"consent":true}"#).len(), 1);
    }

    #[test]
    fn test_consent_must_be_literal_true() {
        for consent in [json!("true"), json!(1), json!(false), json!(null)] {
            let p = payload(json!({"consent": consent, "lat": 1.0, "lng": 2.0}));
            let err = LocationReport::from_payload(&p, ts()).unwrap_err();
            assert_eq!(err.message, "Consent is required");
        }

        let p = payload(json!({"lat": 1.0, "lng": 2.0}));
        assert!(LocationReport::from_payload(&p, ts()).is_err());
    }

    #[test]
    fn test_consent_checked_before_coordinates() {
        let p = payload(json!({"consent": false}));
        let err = LocationReport::from_payload(&p, ts()).unwrap_err();
        assert_eq!(err.message, "Consent is required");
    }

    #[test]
    fn test_invalid_coordinates() {
        for (lat, lng) in [
            (json!(null), json!(1.0)),
            (json!("north"), json!(1.0)),
            (json!(1.0), json!(true)),
            (json!("NaN"), json!(1.0)),
            (json!(1.0), json!("inf")),
            (json!([1.0]), json!(1.0)),
        ] {
            let p = payload(json!({"consent": true, "lat": lat, "lng": lng}));
            let err = LocationReport::from_payload(&p, ts()).unwrap_err();
            assert_eq!(err.message, "Missing or invalid coordinates");
        }

        let p = payload(json!({"consent": true, "lat": 1.0}));
        assert!(LocationReport::from_payload(&p, ts()).is_err());
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let p = payload(json!({"consent": true, "lat": " 37.422 ", "lng": "-122.084"}));
        let report = LocationReport::from_payload(&p, ts()).unwrap();
        assert_eq!(report.latitude, 37.422);
        assert_eq!(report.longitude, -122.084);
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let p = payload(json!({"consent": true, "lat": 37.422, "lng": -122.084, "acc": ""}));
        let report = LocationReport::from_payload(&p, ts()).unwrap();
        assert_eq!(report.accuracy, "unknown");
        assert_eq!(
            report.map_url,
            "https://www.google.com/maps/search/?api=1&query=37.422,-122.084"
        );
    }

    #[test]
    fn test_client_values_kept() {
        let p = payload(json!({
            "consent": true,
            "lat": 1.5,
            "lng": 2.5,
            "acc": "15 m",
            "map": "https://maps.example/1.5,2.5"
        }));
        let report = LocationReport::from_payload(&p, ts()).unwrap();
        assert_eq!(report.accuracy, "15 m");
        assert_eq!(report.map_url, "https://maps.example/1.5,2.5");
    }

    #[test]
    fn test_message_body_format() {
        let p = payload(json!({"consent": true, "lat": 37.422, "lng": -122.084, "acc": "15 m"}));
        let report = LocationReport::from_payload(&p, ts()).unwrap();

        let expected = "Campus Connect — User Shared Location (with consent)\n\
                        Time: 2024-05-01 12:30:00\n\
                        Latitude: 37.422\n\
                        Longitude: -122.084\n\
                        Accuracy: 15 m\n\
                        Map: https://www.google.com/maps/search/?api=1&query=37.422,-122.084\n";
        assert_eq!(report.message_body("Campus Connect"), expected);
        assert_eq!(
            subject_line("Campus Connect"),
            "Campus Connect — Location Share (with consent)"
        );
    }

    #[test]
    fn test_whole_and_tiny_coordinates_render_as_floats() {
        let p = payload(json!({"consent": true, "lat": 37, "lng": 0.0000001}));
        let report = LocationReport::from_payload(&p, ts()).unwrap();
        let body = report.message_body("Campus Connect");

        assert!(body.contains("Latitude: 37.0\n"));
        assert!(body.contains("Longitude: 1e-07\n"));
        assert!(body.contains("Map: https://www.google.com/maps/search/?api=1&query=37.0,1e-07\n"));
    }

    #[test]
    fn test_local_timestamp_shape() {
        let stamp = local_timestamp();
        assert_eq!(stamp.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).is_ok());
    }
}
