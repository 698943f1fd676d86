//! Input and output records - the pipeline's external surface

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scraped post as supplied by the caller
///
/// Every text field defaults to an empty string so that sparse scraper
/// output still deserializes. Duplicates are allowed; nothing here is keyed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    /// Name of the person who published the post
    #[serde(default)]
    pub name: String,

    /// Short "about" blurb of the poster
    #[serde(default)]
    pub about: String,

    /// Post body, the text the model actually reads
    #[serde(default)]
    pub description: String,

    /// Where the record was scraped from
    #[serde(default)]
    pub source: String,

    /// Company page links attached to the post, in scrape order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_links: Option<Vec<String>>,

    /// Profile URL of the poster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile_url: Option<String>,

    /// Job title used as the scraper's search term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_job_title: Option<String>,

    /// Company the scraper associated with the post, used when the model
    /// names no organization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// Relevance verdict attached to a successfully processed post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// The post announces at least one job change
    Relevant,
    /// The post announces nothing we extract
    Irrelevant,
}

impl Classification {
    /// Derive the verdict from the post-processed relevance flag
    pub fn from_relevant(relevant: bool) -> Self {
        if relevant {
            Classification::Relevant
        } else {
            Classification::Irrelevant
        }
    }

    /// Get the wire name of the classification
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Relevant => "Relevant",
            Classification::Irrelevant => "Irrelevant",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One externally visible result row
///
/// Carries all input fields plus the extraction overlay. Optional fields
/// are omitted from JSON when absent.
///
/// Invariants upheld by the constructors in the extractor crate:
/// - a record with `error` set and no `classification` carries no
///   extraction fields
/// - an `Irrelevant` record carries no change fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    /// Poster name, copied from input
    pub name: String,
    /// About blurb, copied from input
    pub about: String,
    /// Post body, copied from input
    pub description: String,
    /// Source, copied from input
    pub source: String,

    /// Profile URL, copied from input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile_url: Option<String>,

    /// Search term, copied from input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_job_title: Option<String>,

    /// Company links, copied from input (empty when the input had none)
    #[serde(default)]
    pub company_links: Vec<String>,

    /// Poster name as returned by the model, honorifics stripped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_poster_name: Option<String>,

    /// Person who changed jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_starter_name: Option<String>,

    /// Organization the person moved to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    /// New title or role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_role: Option<String>,

    /// Relevance verdict, absent when processing failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,

    /// Diagnostic message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutputRecord {
    /// Create a base record that mirrors the input and carries no overlay
    pub fn from_input(input: &InputRecord) -> Self {
        Self {
            name: input.name.clone(),
            about: input.about.clone(),
            description: input.description.clone(),
            source: input.source.clone(),
            user_profile_url: input.user_profile_url.clone(),
            search_job_title: input.search_job_title.clone(),
            company_links: input.company_links.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Create a record that reports a failure for the given input
    pub fn failed(input: &InputRecord, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::from_input(input)
        }
    }

    /// Set the classification
    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    /// Set the diagnostic message
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Whether this record reports a processing failure
    ///
    /// Irrelevant posts carry an explanatory `error` too, but they were
    /// classified, so they are not failures.
    pub fn is_failure(&self) -> bool {
        self.error.is_some() && self.classification.is_none()
    }

    /// Whether any change field is populated
    pub fn has_change_fields(&self) -> bool {
        self.job_starter_name.is_some()
            || self.company_name.is_some()
            || self.current_role.is_some()
    }
}
