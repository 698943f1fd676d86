//! Extraction scratch values produced per post

use serde::{Deserialize, Serialize};

/// Placeholder the model emits for a field it could not determine
pub const UNKNOWN: &str = "Unknown";

/// A single job transition mentioned in a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Full name of the person who changed jobs
    pub person_name: String,

    /// Organization they joined or were promoted within
    pub organization: String,

    /// Title or role after the change
    pub new_role: String,
}

impl ChangeRecord {
    /// Create a new change record
    pub fn new(
        person_name: impl Into<String>,
        organization: impl Into<String>,
        new_role: impl Into<String>,
    ) -> Self {
        Self {
            person_name: person_name.into(),
            organization: organization.into(),
            new_role: new_role.into(),
        }
    }

    /// Whether any field carries the `"Unknown"` sentinel
    pub fn has_unknown(&self) -> bool {
        self.person_name == UNKNOWN || self.organization == UNKNOWN || self.new_role == UNKNOWN
    }
}

/// What the model said about one post, after post-processing
///
/// Created fresh for every call and folded into output records; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Poster name as returned by the model
    pub poster_name: Option<String>,

    /// Category code "1".."5" requested from the model, not validated
    pub post_category: String,

    /// Number of surviving change records
    pub change_count: usize,

    /// Whether the post is relevant (`change_count > 0`)
    pub relevant: bool,

    /// Surviving change records, in model order
    pub extracted_info: Vec<ChangeRecord>,
}

impl ExtractionResult {
    /// Build a result whose count and relevance follow from `extracted_info`
    pub fn from_changes(
        poster_name: Option<String>,
        post_category: impl Into<String>,
        extracted_info: Vec<ChangeRecord>,
    ) -> Self {
        let change_count = extracted_info.len();
        Self {
            poster_name,
            post_category: post_category.into(),
            change_count,
            relevant: change_count > 0,
            extracted_info,
        }
    }
}
