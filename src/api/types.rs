//! Wire schema for the Codacy API v3 endpoints the toggler touches.
//!
//! Every response is wrapped in a `data` envelope; repository listings add a
//! `pagination` envelope.
use serde::{Deserialize, Serialize};

/// Single-value response envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct DataEnvelope<T> {
    pub(crate) data: T,
}

/// Cursor-paginated list response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub(crate) data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) pagination: Option<Pagination>,
}

impl<T> Page<T> {
    /// Cursor for the following page; `None` on the final page.
    pub(crate) fn next_cursor(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|pagination| pagination.cursor.as_deref())
            .filter(|cursor| !cursor.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) cursor: Option<String>,
    #[serde(default)]
    pub(crate) limit: u32,
    #[serde(default)]
    pub(crate) total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CodingStandardMeta {
    #[serde(default)]
    pub(crate) enabled_tools_count: u32,
    #[serde(default)]
    pub(crate) enabled_patterns_count: u32,
    #[serde(default)]
    pub(crate) linked_repositories_count: u32,
}

/// An organisation coding standard, draft or effective.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CodingStandard {
    pub(crate) id: i64,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) is_draft: bool,
    #[serde(default)]
    pub(crate) is_default: bool,
    #[serde(default)]
    pub(crate) languages: Vec<String>,
    #[serde(default)]
    pub(crate) meta: CodingStandardMeta,
}

/// Tool entry inside a coding standard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CodingStandardTool {
    pub(crate) coding_standard_id: i64,
    pub(crate) uuid: String,
    #[serde(default)]
    pub(crate) is_enabled: bool,
}

/// Lightweight reference to a coding standard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct CodingStandardRef {
    pub(crate) id: i64,
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct Repository {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) standards: Vec<CodingStandardRef>,
}

impl Repository {
    /// A repository following no coding standard is configured directly.
    pub(crate) fn is_detached(&self) -> bool {
        self.standards.is_empty()
    }
}

/// One item of the repositories-with-analysis listing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct RepositoryWithAnalysis {
    pub(crate) repository: Repository,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RepositoryToolSettings {
    #[serde(default)]
    pub(crate) is_enabled: bool,
    #[serde(default)]
    pub(crate) follows_standard: bool,
    #[serde(default)]
    pub(crate) enabled_by: Vec<CodingStandardRef>,
}

/// Tool entry in a repository context.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct RepositoryTool {
    pub(crate) uuid: String,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) settings: RepositoryToolSettings,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateCodingStandardBody<'a> {
    pub(crate) name: &'a str,
    pub(crate) languages: &'a [String],
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdatePatternsBody {
    pub(crate) enabled: bool,
}

/// Outcome of promoting a draft: repositories it was applied to, and not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct PromotionResult {
    #[serde(default)]
    pub(crate) successful: Vec<String>,
    #[serde(default)]
    pub(crate) failed: Vec<String>,
}

/// Promotion response; the service may omit `data` or the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PromotionEnvelope {
    #[serde(default)]
    pub(crate) data: Option<PromotionResult>,
}
