//! Reference corpus file format.
//!
//! One JSON object per line:
//!
//! ```text
//! {"text": "Scientists confirm ...", "label": "real"}
//! {"id": "7b5c24ab-...", "text": "Celebrity claims ...", "label": "fake"}
//! ```
//!
//! `label` accepts `real`/`fake`, `true`/`false` or `1`/`0` (1 = real), as
//! strings or numbers. `id` is optional; when absent it is derived from the
//! label and text, so loading the same file twice yields the same ids.
//! Blank lines are skipped.

use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use uuid::Uuid;

use crate::error::VerityError;
use crate::models::{Label, ReferenceRecord};

/// Namespace for ids derived from corpus content.
const CORPUS_NAMESPACE: Uuid = Uuid::from_u128(0x5f0c_9a3e_6d1b_4c27_a8e4_1b2f_7c90_d364);

/// Stable id for a record that carries none.
pub fn content_id(label: Label, text: &str) -> Uuid {
    Uuid::new_v5(&CORPUS_NAMESPACE, format!("{label}\n{text}").as_bytes())
}

#[derive(Debug, Deserialize)]
struct CorpusLine {
    id: Option<Uuid>,
    text: String,
    label: serde_json::Value,
}

/// Parse a single corpus line. `line_no` is 1-based and only used in errors.
pub fn parse_corpus_line(line: &str, line_no: usize) -> Result<ReferenceRecord, VerityError> {
    let raw: CorpusLine = serde_json::from_str(line)
        .map_err(|e| VerityError::Corpus(format!("line {line_no}: {e}")))?;

    let label_text = match &raw.label {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => {
            return Err(VerityError::Corpus(format!(
                "line {line_no}: unsupported label {other}"
            )))
        }
    };
    let label: Label = label_text
        .parse()
        .map_err(|e| VerityError::Corpus(format!("line {line_no}: {e}")))?;

    let text = raw.text.trim();
    if text.is_empty() {
        return Err(VerityError::Corpus(format!("line {line_no}: empty text")));
    }

    Ok(ReferenceRecord {
        id: raw.id.unwrap_or_else(|| content_id(label, text)),
        text: text.to_string(),
        label,
    })
}

/// Read every record from a JSON Lines corpus file.
///
/// Stops at the first malformed line; a partially loaded corpus would skew
/// similarity results without anyone noticing.
pub fn load_corpus(path: &Path) -> Result<Vec<ReferenceRecord>, VerityError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_corpus_line(&line, idx + 1)?);
    }

    tracing::info!(
        path = %path.display(),
        records = records.len(),
        "Loaded reference corpus"
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_line_with_string_label() {
        let record =
            parse_corpus_line(r#"{"text": " Markets rallied today ", "label": "REAL"}"#, 1)
                .unwrap();
        assert_eq!(record.label, Label::Real);
        assert_eq!(record.text, "Markets rallied today");
    }

    #[test]
    fn test_parse_line_with_numeric_label_and_id() {
        let record = parse_corpus_line(
            r#"{"id": "7b5c24ab-1234-5678-9abc-def012345678", "text": "Aliens built the pyramids", "label": 0}"#,
            3,
        )
        .unwrap();
        assert_eq!(record.label, Label::Fake);
        assert_eq!(
            record.id.to_string(),
            "7b5c24ab-1234-5678-9abc-def012345678"
        );
    }

    #[test]
    fn test_missing_id_is_stable_across_loads() {
        let line = r#"{"text": "Moon landing staged in a studio", "label": "fake"}"#;
        let first = parse_corpus_line(line, 1).unwrap();
        let second = parse_corpus_line(line, 7).unwrap();
        assert_eq!(first.id, second.id);

        // Same text under the other label is a different article.
        let relabeled =
            parse_corpus_line(r#"{"text": "Moon landing staged in a studio", "label": "real"}"#, 1)
                .unwrap();
        assert_ne!(first.id, relabeled.id);
    }

    #[test]
    fn test_derived_id_ignores_surrounding_whitespace() {
        let a = parse_corpus_line(r#"{"text": "Rates unchanged", "label": "real"}"#, 1).unwrap();
        let b = parse_corpus_line(r#"{"text": "  Rates unchanged ", "label": 1}"#, 2).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, content_id(Label::Real, "Rates unchanged"));
    }

    #[test]
    fn test_parse_line_reports_line_number() {
        let err = parse_corpus_line(r#"{"text": "x", "label": "satire"}"#, 42).unwrap_err();
        assert!(err.to_string().contains("line 42"), "got: {err}");
    }

    #[test]
    fn test_parse_line_rejects_empty_text() {
        assert!(parse_corpus_line(r#"{"text": "   ", "label": "fake"}"#, 1).is_err());
    }

    #[test]
    fn test_load_corpus_skips_blank_lines() {
        let path = std::env::temp_dir().join(format!("verity-corpus-{}.jsonl", Uuid::new_v4()));
        {
            let mut f = File::create(&path).unwrap();
            writeln!(f, r#"{{"text": "first", "label": "real"}}"#).unwrap();
            writeln!(f).unwrap();
            writeln!(f, r#"{{"text": "second", "label": "fake"}}"#).unwrap();
        }

        let records = load_corpus(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].label, Label::Fake);
    }

    #[test]
    fn test_load_corpus_missing_file() {
        assert!(matches!(
            load_corpus(Path::new("/nonexistent/corpus.jsonl")),
            Err(VerityError::Io(_))
        ));
    }
}
