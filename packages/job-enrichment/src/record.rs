//! Listing summary records.

use serde::{Deserialize, Serialize};

/// One row of the listings page.
///
/// Created by the listings parser with `skills: None`. The enrichment pass
/// writes `skills` exactly once per selected record and touches nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Posting title as shown on the listings page
    pub title: String,

    /// Absolute URL of the detail page; doubles as the cache key
    pub detail_url: String,

    /// Posting ID column
    pub posting_id: Option<String>,

    /// Department column
    pub department: Option<String>,

    /// Primary campus column
    pub campus: Option<String>,

    /// Reg/Temp column
    pub employment_type: Option<String>,

    /// Review Begins column
    pub review_begins: Option<String>,

    /// `staff`, `faculty` or `students`, taken from the detail URL path
    pub category: Option<String>,

    /// Matched skills; `None` until the record has been enriched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

impl SummaryRecord {
    /// Create a record with only the required fields.
    pub fn new(title: impl Into<String>, detail_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail_url: detail_url.into(),
            posting_id: None,
            department: None,
            campus: None,
            employment_type: None,
            review_begins: None,
            category: None,
            skills: None,
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Whether an enrichment pass has written this record.
    pub fn is_enriched(&self) -> bool {
        self.skills.is_some()
    }

    /// Matched skills, or an empty slice before enrichment.
    pub fn skills(&self) -> &[String] {
        self.skills.as_deref().unwrap_or(&[])
    }
}
