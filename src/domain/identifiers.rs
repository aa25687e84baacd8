// Typed keys for programs and representatives
use super::error::{AnalyticsError, AnalyticsResult, KeyKind};
use serde::Serialize;
use std::fmt;

/// Sentinel accepted by the representative filter to mean "every representative"
pub const ALL_REPS: &str = "all";

fn validate(kind: KeyKind, raw: &str) -> AnalyticsResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_control) {
        return Err(AnalyticsError::KeyNotFound {
            kind,
            key: raw.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProgramId(String);

impl ProgramId {
    pub fn parse(raw: &str) -> AnalyticsResult<Self> {
        validate(KeyKind::Program, raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RepId(String);

impl RepId {
    pub fn parse(raw: &str) -> AnalyticsResult<Self> {
        let key = validate(KeyKind::Representative, raw)?;
        // "all" is reserved for the filter sentinel
        if key == ALL_REPS {
            return Err(AnalyticsError::rep_not_found(key));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepFilter {
    All,
    Rep(RepId),
}

impl RepFilter {
    pub fn parse(raw: &str) -> AnalyticsResult<Self> {
        if raw.trim() == ALL_REPS {
            Ok(Self::All)
        } else {
            RepId::parse(raw).map(Self::Rep)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rep_filter_parse() {
        assert_eq!(RepFilter::parse("all").unwrap(), RepFilter::All);
        assert_eq!(
            RepFilter::parse(" Sue ").unwrap(),
            RepFilter::Rep(RepId::parse("Sue").unwrap())
        );
    }

    #[test]
    fn blank_keys_are_rejected_at_the_boundary() {
        let err = ProgramId::parse("   ").unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::KeyNotFound {
                kind: KeyKind::Program,
                ..
            }
        ));
        assert!(RepId::parse("bad\u{0}key").is_err());
        assert!(RepId::parse("all").is_err());
    }
}
