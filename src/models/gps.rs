use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coordinate as delivered by the backend: a JSON number or a numeric-looking string
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    /// Finite numeric value, or `None` when the raw value does not parse
    pub fn value(&self) -> Option<f64> {
        let parsed = match self {
            Coordinate::Number(n) => Some(*n),
            Coordinate::Text(s) => s.trim().parse::<f64>().ok(),
        };
        parsed.filter(|v| v.is_finite())
    }
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        Coordinate::Number(value)
    }
}

impl From<&str> for Coordinate {
    fn from(value: &str) -> Self {
        Coordinate::Text(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsLocation {
    pub location_id: i64,
    pub vehicle_id: i64,
    #[serde(default)]
    pub latitude: Option<Coordinate>,
    #[serde(default)]
    pub longitude: Option<Coordinate>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
}

impl GpsLocation {
    /// Both coordinates, when both parse
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.as_ref()?.value()?;
        let lon = self.longitude.as_ref()?.value()?;
        Some((lat, lon))
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }
}

/// Accepts the backend's `YYYY-MM-DD HH:MM:SS` (UTC) as well as RFC 3339
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
