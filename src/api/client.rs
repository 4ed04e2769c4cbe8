//! Typed Codacy endpoints for one organisation.
//!
//! Each method maps to exactly one request and attaches the operation and
//! entity identifiers to any failure.
use super::error::ApiError;
use super::transport::{Method, Transport};
use super::types::{
    CodingStandard, CodingStandardTool, CreateCodingStandardBody, DataEnvelope, Page,
    PromotionEnvelope, PromotionResult, RepositoryTool, RepositoryWithAnalysis,
    UpdatePatternsBody,
};
use crate::config::Provider;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Pattern category toggled by every bulk update.
pub(crate) const SECURITY_CATEGORY: &str = "Security";

pub(crate) struct CodacyClient<T> {
    transport: T,
    org_path: String,
}

impl<T: Transport> CodacyClient<T> {
    pub(crate) fn new(transport: T, provider: Provider, organization: &str) -> Self {
        Self {
            transport,
            org_path: format!("{}/{}", provider.as_str(), organization),
        }
    }

    pub(crate) fn list_coding_standards(&self) -> Result<Vec<CodingStandard>> {
        let path = self.standards_path();
        let envelope: DataEnvelope<Vec<CodingStandard>> = self
            .fetch(Method::Get, &path, &[], None)
            .context("list coding standards")?;
        Ok(envelope.data)
    }

    pub(crate) fn get_coding_standard(&self, id: i64) -> Result<CodingStandard> {
        let path = format!("{}/{id}", self.standards_path());
        let envelope: DataEnvelope<CodingStandard> = self
            .fetch(Method::Get, &path, &[], None)
            .map_err(|err| match err.status() {
                Some(404) => ApiError::NotFound(format!("coding standard {id}")),
                _ => err,
            })
            .with_context(|| format!("fetch coding standard {id}"))?;
        Ok(envelope.data)
    }

    /// Create a draft copying `source`; the service carries over the source's
    /// repositories and default flag.
    pub(crate) fn create_draft_from(&self, source: &CodingStandard) -> Result<CodingStandard> {
        let path = self.standards_path();
        let source_id = source.id.to_string();
        let body = encode(&CreateCodingStandardBody {
            name: &source.name,
            languages: &source.languages,
        })?;
        let envelope: DataEnvelope<CodingStandard> = self
            .fetch(
                Method::Post,
                &path,
                &[("sourceCodingStandard", source_id.as_str())],
                Some(&body),
            )
            .with_context(|| format!("create draft from coding standard {}", source.id))?;
        Ok(envelope.data)
    }

    pub(crate) fn list_standard_tools(&self, standard_id: i64) -> Result<Vec<CodingStandardTool>> {
        let path = format!("{}/{standard_id}/tools", self.standards_path());
        let envelope: DataEnvelope<Vec<CodingStandardTool>> = self
            .fetch(Method::Get, &path, &[], None)
            .with_context(|| format!("list tools of coding standard {standard_id}"))?;
        Ok(envelope.data)
    }

    /// Bulk enable or disable the Security patterns of one tool in a draft.
    pub(crate) fn update_standard_security_patterns(
        &self,
        standard_id: i64,
        tool_uuid: &str,
        enable: bool,
    ) -> Result<()> {
        let path = format!(
            "{}/{standard_id}/tools/{tool_uuid}/patterns/update",
            self.standards_path()
        );
        let body = encode(&UpdatePatternsBody { enabled: enable })?;
        self.transport
            .execute(
                Method::Post,
                &path,
                &[("categories", SECURITY_CATEGORY)],
                Some(&body),
            )
            .with_context(|| {
                format!("update security patterns (standard {standard_id}, tool {tool_uuid})")
            })?;
        Ok(())
    }

    /// Promote a draft. An empty body is an accepted promotion with no
    /// repository lists.
    pub(crate) fn promote_draft(&self, standard_id: i64) -> Result<PromotionResult> {
        let path = format!("{}/{standard_id}/promote", self.standards_path());
        let envelope = self
            .transport
            .execute(Method::Post, &path, &[], None)
            .and_then(|body| match body {
                Some(value) => Ok(serde_json::from_value::<PromotionEnvelope>(value)?),
                None => Ok(PromotionEnvelope::default()),
            })
            .with_context(|| format!("promote coding standard {standard_id}"))?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub(crate) fn list_repositories_page(
        &self,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<RepositoryWithAnalysis>> {
        let path = self.repositories_path();
        let limit = limit.to_string();
        let mut query = vec![("limit", limit.as_str())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }
        self.fetch(Method::Get, &path, &query, None)
            .with_context(|| match cursor {
                Some(cursor) => format!("list repositories (cursor {cursor})"),
                None => "list repositories".to_string(),
            })
    }

    pub(crate) fn list_repository_tools(&self, repository: &str) -> Result<Vec<RepositoryTool>> {
        let path = format!("{}/{repository}/tools", self.repositories_path());
        let envelope: DataEnvelope<Vec<RepositoryTool>> = self
            .fetch(Method::Get, &path, &[], None)
            .with_context(|| format!("list tools of repository {repository}"))?;
        Ok(envelope.data)
    }

    /// Bulk enable or disable the Security patterns of one tool in a repository.
    pub(crate) fn update_repository_security_patterns(
        &self,
        repository: &str,
        tool_uuid: &str,
        enable: bool,
    ) -> Result<()> {
        let path = format!(
            "{}/{repository}/tools/{tool_uuid}/patterns",
            self.repositories_path()
        );
        let body = encode(&UpdatePatternsBody { enabled: enable })?;
        self.transport
            .execute(
                Method::Patch,
                &path,
                &[("categories", SECURITY_CATEGORY)],
                Some(&body),
            )
            .with_context(|| {
                format!("update security patterns (repository {repository}, tool {tool_uuid})")
            })?;
        Ok(())
    }

    fn standards_path(&self) -> String {
        format!("/organizations/{}/coding-standards", self.org_path)
    }

    fn repositories_path(&self) -> String {
        format!("/analysis/organizations/{}/repositories", self.org_path)
    }

    fn fetch<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<R, ApiError> {
        let value = self
            .transport
            .execute(method, path, query, body)?
            .ok_or(ApiError::EmptyBody)?;
        Ok(serde_json::from_value(value)?)
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Value> {
    let value = serde_json::to_value(body).map_err(ApiError::Encode)?;
    Ok(value)
}
