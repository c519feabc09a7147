use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Credibility label shared by the classifier, the reference corpus and the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Real,
    Fake,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Real => "real",
            Label::Fake => "fake",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the spellings found in public fake-news corpora:
/// `real`/`fake`, `true`/`false` and `1`/`0` (1 = real).
impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "real" | "true" | "1" => Ok(Label::Real),
            "fake" | "false" | "0" => Ok(Label::Fake),
            other => Err(format!("unknown label '{other}'")),
        }
    }
}

/// Coarse confidence band used to pick recommendation text.
///
/// `Low` is below 0.5, `High` is above 0.8, everything in between
/// (both ends inclusive) is `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBucket {
    Low,
    Medium,
    High,
}

impl ConfidenceBucket {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.8 {
            ConfidenceBucket::High
        } else if confidence >= 0.5 {
            ConfidenceBucket::Medium
        } else {
            ConfidenceBucket::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBucket::Low => "low",
            ConfidenceBucket::Medium => "medium",
            ConfidenceBucket::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parses_corpus_aliases() {
        assert_eq!("REAL".parse::<Label>().unwrap(), Label::Real);
        assert_eq!(" fake ".parse::<Label>().unwrap(), Label::Fake);
        assert_eq!("true".parse::<Label>().unwrap(), Label::Real);
        assert_eq!("0".parse::<Label>().unwrap(), Label::Fake);
        assert!("satire".parse::<Label>().is_err());
    }

    #[test]
    fn test_label_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Label::Fake).unwrap(), "\"fake\"");
        let parsed: Label = serde_json::from_str("\"real\"").unwrap();
        assert_eq!(parsed, Label::Real);
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(ConfidenceBucket::from_confidence(0.0), ConfidenceBucket::Low);
        assert_eq!(ConfidenceBucket::from_confidence(0.4999), ConfidenceBucket::Low);
        assert_eq!(ConfidenceBucket::from_confidence(0.5), ConfidenceBucket::Medium);
        assert_eq!(ConfidenceBucket::from_confidence(0.8), ConfidenceBucket::Medium);
        assert_eq!(ConfidenceBucket::from_confidence(0.8001), ConfidenceBucket::High);
        assert_eq!(ConfidenceBucket::from_confidence(1.0), ConfidenceBucket::High);
    }
}
