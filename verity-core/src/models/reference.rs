use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Label;

/// One labeled article in the reference corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub id: Uuid,
    pub text: String,
    pub label: Label,
}

impl ReferenceRecord {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            label,
        }
    }
}
