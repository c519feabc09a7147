use thiserror::Error;

/// Failures while reading the reference corpus from disk.
#[derive(Error, Debug)]
pub enum VerityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corpus error: {0}")]
    Corpus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts_with_question_mark() {
        fn open_missing() -> Result<(), VerityError> {
            std::fs::File::open("/nonexistent/verity/corpus.jsonl")?;
            Ok(())
        }
        let err = open_missing().unwrap_err();
        assert!(matches!(err, VerityError::Io(_)));
        assert!(err.to_string().starts_with("IO error: "));
    }

    #[test]
    fn test_corpus_error_display() {
        let err = VerityError::Corpus("line 4: empty text".into());
        assert_eq!(err.to_string(), "Corpus error: line 4: empty text");
    }
}
