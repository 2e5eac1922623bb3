//! Specialist response time, stored as whole minutes.
//!
//! The wire form stays the free-text `"NN min"` string older clients send,
//! but parsing happens once at the boundary. Anything without a leading
//! number is kept as "unknown" and excluded from statistics.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

static LEADING_MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,6})").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseTime(Option<u32>);

impl ResponseTime {
    pub fn minutes(minutes: u32) -> Self {
        Self(Some(minutes))
    }

    pub fn unknown() -> Self {
        Self(None)
    }

    pub fn as_minutes(&self) -> Option<u32> {
        self.0
    }

    pub fn is_known(&self) -> bool {
        self.0.is_some()
    }

    /// Parse free text such as `"15 min"`, `"15"` or `"15min"`.
    pub fn parse(text: &str) -> Self {
        let minutes = LEADING_MINUTES
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());
        Self(minutes)
    }
}

impl std::fmt::Display for ResponseTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(m) => write!(f, "{m} min"),
            None => Ok(()),
        }
    }
}

impl Serialize for ResponseTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(m) => serializer.collect_str(&format_args!("{m} min")),
            None => serializer.serialize_none(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawResponseTime {
    Minutes(u32),
    Text(String),
}

impl<'de> Deserialize<'de> for ResponseTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawResponseTime>::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawResponseTime::Minutes(m)) => Self::minutes(m),
            Some(RawResponseTime::Text(text)) => Self::parse(&text),
            None => Self::unknown(),
        })
    }
}
