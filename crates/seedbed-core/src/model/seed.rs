use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where a batch of import data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedOrigin {
    /// Uploaded files
    File,
    /// Text pasted into the import form
    Post,
    /// Schema files shipped with a bundle
    Bundle,
}

impl SeedOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedOrigin::File => "file",
            SeedOrigin::Post => "post",
            SeedOrigin::Bundle => "bundle",
        }
    }
}

impl std::fmt::Display for SeedOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeedOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SeedOrigin::File),
            "post" => Ok(SeedOrigin::Post),
            "bundle" => Ok(SeedOrigin::Bundle),
            other => Err(format!("unknown seed origin: {}", other)),
        }
    }
}

/// Seeding metadata shared by every job of one preparation call
///
/// Immutable once built: jobs receive clones, never a handle to mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedContext {
    origin: SeedOrigin,
    enabled: bool,
    details: Option<String>,
    submitted_at: DateTime<Utc>,
}

impl SeedContext {
    /// Build a context stamped with the current time
    pub fn new(origin: SeedOrigin, enabled: bool) -> Self {
        Self {
            origin,
            enabled,
            details: None,
            submitted_at: Utc::now(),
        }
    }

    /// Attach free-form details (e.g. a bundle name)
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn origin(&self) -> SeedOrigin {
        self.origin
    }

    /// Whether items created under this context should be tracked
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_round_trips_through_str() {
        for origin in [SeedOrigin::File, SeedOrigin::Post, SeedOrigin::Bundle] {
            assert_eq!(origin.as_str().parse::<SeedOrigin>(), Ok(origin));
        }
        assert!("seed".parse::<SeedOrigin>().is_err());
    }

    #[test]
    fn test_context_serializes_origin_lowercase() {
        let ctx = SeedContext::new(SeedOrigin::Bundle, true).with_details("Starter blog");
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["origin"], "bundle");
        assert_eq!(json["enabled"], true);
        assert_eq!(json["details"], "Starter blog");
    }
}
