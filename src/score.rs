use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::util::accuracy_percent;

/// One finished game as stored on the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "date")]
    pub timestamp: String,
    pub hits: u32,
    #[serde(rename = "percentage", with = "percentage")]
    pub accuracy_percent: f64,
}

impl ScoreRecord {
    pub fn new(timestamp: impl Into<String>, hits: u32, accuracy_percent: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            hits,
            accuracy_percent,
        }
    }

    /// Stamp a result with the local wall-clock time
    pub fn now(hits: u32, typed: u32) -> Self {
        Self::new(
            Local::now().format("%c").to_string(),
            hits,
            accuracy_percent(hits, typed),
        )
    }
}

/// Percentages are written as fixed two-decimal strings ("66.67") and read back
/// from either a string or a bare number.
mod percentage {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.2}", value))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(s) => s.trim().parse::<f64>().map_err(de::Error::custom)?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(de::Error::custom("percentage must be a finite number"))
        }
    }
}
