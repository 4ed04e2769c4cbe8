//! In-memory Codacy service for workflow tests.
//!
//! Implements [`Transport`] by routing method + path the way the real API
//! does, keeps just enough state to answer follow-up calls consistently,
//! and records every request for assertions.

use super::error::ApiError;
use super::transport::{Method, Transport};
use super::types::{
    CodingStandard, CodingStandardMeta, CodingStandardRef, PromotionResult, Repository,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// One request seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<Value>,
}

/// Build a standard snapshot with empty meta and no languages.
pub(crate) fn standard(id: i64, name: &str, is_draft: bool, is_default: bool) -> CodingStandard {
    CodingStandard {
        id,
        name: name.to_string(),
        is_draft,
        is_default,
        languages: Vec::new(),
        meta: CodingStandardMeta::default(),
    }
}

#[derive(Default)]
struct FakeState {
    standards: Vec<CodingStandard>,
    standard_tools: BTreeMap<i64, Vec<String>>,
    repositories: Vec<Repository>,
    repository_tools: BTreeMap<String, Vec<(String, String)>>,
    /// Security-pattern state per (context, tool).
    security_enabled: BTreeMap<(String, String), bool>,
    promotions: BTreeMap<i64, PromotionResult>,
    promoted: BTreeSet<i64>,
    /// Standards whose promotion answers 2xx with no body.
    empty_promotions: BTreeSet<i64>,
    failing_tools: BTreeSet<String>,
    failing_paths: BTreeSet<String>,
    /// Cursor returned by every repository page, when set.
    stuck_cursor: Option<String>,
    calls: Vec<RecordedCall>,
}

pub(crate) struct FakeCodacy {
    state: RefCell<FakeState>,
}

impl FakeCodacy {
    pub(crate) fn new() -> Self {
        Self {
            state: RefCell::new(FakeState::default()),
        }
    }

    /// Register a coding standard and the tool uuids it lists.
    pub(crate) fn with_standard(self, standard: CodingStandard, tools: &[&str]) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state
                .standard_tools
                .insert(standard.id, tools.iter().map(|t| t.to_string()).collect());
            state.standards.push(standard);
        }
        self
    }

    /// Register a repository following `standards` and exposing `tools`.
    pub(crate) fn with_repository(self, name: &str, standards: &[i64], tools: &[&str]) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let refs = standards
                .iter()
                .map(|id| CodingStandardRef {
                    id: *id,
                    name: format!("standard-{id}"),
                })
                .collect();
            state.repositories.push(Repository {
                name: name.to_string(),
                standards: refs,
            });
            state.repository_tools.insert(
                name.to_string(),
                tools
                    .iter()
                    .map(|t| (t.to_string(), format!("Tool {t}")))
                    .collect(),
            );
        }
        self
    }

    pub(crate) fn with_promotion(self, standard_id: i64, result: PromotionResult) -> Self {
        self.state
            .borrow_mut()
            .promotions
            .insert(standard_id, result);
        self
    }

    pub(crate) fn with_empty_promotion_body(self, standard_id: i64) -> Self {
        self.state
            .borrow_mut()
            .empty_promotions
            .insert(standard_id);
        self
    }

    /// Make every pattern update for `tool_uuid` answer 500.
    pub(crate) fn failing_tool(self, tool_uuid: &str) -> Self {
        self.state
            .borrow_mut()
            .failing_tools
            .insert(tool_uuid.to_string());
        self
    }

    /// Make any request to exactly `path` answer 500.
    pub(crate) fn failing_path(self, path: &str) -> Self {
        self.state
            .borrow_mut()
            .failing_paths
            .insert(path.to_string());
        self
    }

    /// Return the same non-empty cursor on every repository page.
    pub(crate) fn with_stuck_cursor(self, cursor: &str) -> Self {
        self.state.borrow_mut().stuck_cursor = Some(cursor.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }

    pub(crate) fn mutating_calls(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method.is_mutating())
            .collect()
    }

    pub(crate) fn calls_ending_with(&self, suffix: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.path.ends_with(suffix))
            .collect()
    }

    pub(crate) fn standard_security_enabled(&self, standard_id: i64, tool: &str) -> Option<bool> {
        self.state
            .borrow()
            .security_enabled
            .get(&(format!("standard:{standard_id}"), tool.to_string()))
            .copied()
    }

    pub(crate) fn repository_security_enabled(&self, repository: &str, tool: &str) -> Option<bool> {
        self.state
            .borrow()
            .security_enabled
            .get(&(format!("repository:{repository}"), tool.to_string()))
            .copied()
    }

    pub(crate) fn is_promoted(&self, standard_id: i64) -> bool {
        self.state.borrow().promoted.contains(&standard_id)
    }

    pub(crate) fn standard_by_id(&self, standard_id: i64) -> Option<CodingStandard> {
        self.state
            .borrow()
            .standards
            .iter()
            .find(|standard| standard.id == standard_id)
            .cloned()
    }
}

fn server_error(message: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        snippet: message.to_string(),
    }
}

fn not_found(path: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        snippet: format!("no route for {path}"),
    }
}

fn parse_id(raw: &str, path: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| not_found(path))
}

fn query_value<'a>(query: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, value)| *value)
}

fn body_enabled(body: Option<&Value>) -> bool {
    body.and_then(|body| body.get("enabled"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

impl FakeState {
    fn route(
        &mut self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        if self.failing_paths.contains(path) {
            return Err(server_error("injected failure"));
        }
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        match segments.as_slice() {
            ["organizations", _, _, rest @ ..] => self.route_standards(method, rest, query, body, path),
            ["analysis", "organizations", _, _, rest @ ..] => {
                self.route_repositories(method, rest, query, body, path)
            }
            _ => Err(not_found(path)),
        }
    }

    fn route_standards(
        &mut self,
        method: Method,
        rest: &[&str],
        query: &[(&str, &str)],
        body: Option<&Value>,
        path: &str,
    ) -> Result<Option<Value>, ApiError> {
        match (method, rest) {
            (Method::Get, ["coding-standards"]) => Ok(Some(json!({ "data": self.standards }))),
            (Method::Post, ["coding-standards"]) => {
                let source_id = query_value(query, "sourceCodingStandard")
                    .map(|raw| parse_id(raw, path))
                    .transpose()?;
                let body = body.ok_or_else(|| server_error("missing body"))?;
                let name = body
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let languages = body
                    .get("languages")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                let id = self.standards.iter().map(|s| s.id).max().unwrap_or(0) + 1;
                let tools = source_id
                    .and_then(|source| self.standard_tools.get(&source).cloned())
                    .unwrap_or_default();
                let draft = CodingStandard {
                    id,
                    name,
                    is_draft: true,
                    is_default: false,
                    languages,
                    meta: CodingStandardMeta::default(),
                };
                self.standard_tools.insert(id, tools);
                self.standards.push(draft.clone());
                Ok(Some(json!({ "data": draft })))
            }
            (Method::Get, ["coding-standards", id]) => {
                let id = parse_id(id, path)?;
                let standard = self
                    .standards
                    .iter()
                    .find(|standard| standard.id == id)
                    .ok_or_else(|| not_found(path))?;
                Ok(Some(json!({ "data": standard })))
            }
            (Method::Get, ["coding-standards", id, "tools"]) => {
                let id = parse_id(id, path)?;
                let tools = self.standard_tools.get(&id).ok_or_else(|| not_found(path))?;
                let data: Vec<Value> = tools
                    .iter()
                    .map(|uuid| json!({ "codingStandardId": id, "uuid": uuid, "isEnabled": true }))
                    .collect();
                Ok(Some(json!({ "data": data })))
            }
            (Method::Post, ["coding-standards", id, "tools", tool, "patterns", "update"]) => {
                let id = parse_id(id, path)?;
                if self.failing_tools.contains(*tool) {
                    return Err(server_error("tool update rejected"));
                }
                self.security_enabled
                    .insert((format!("standard:{id}"), tool.to_string()), body_enabled(body));
                Ok(None)
            }
            (Method::Post, ["coding-standards", id, "promote"]) => {
                let id = parse_id(id, path)?;
                self.promoted.insert(id);
                if let Some(standard) = self.standards.iter_mut().find(|s| s.id == id) {
                    standard.is_draft = false;
                }
                if self.empty_promotions.contains(&id) {
                    return Ok(None);
                }
                let result = self.promotions.get(&id).cloned().unwrap_or_default();
                Ok(Some(json!({ "data": result })))
            }
            _ => Err(not_found(path)),
        }
    }

    fn route_repositories(
        &mut self,
        method: Method,
        rest: &[&str],
        query: &[(&str, &str)],
        body: Option<&Value>,
        path: &str,
    ) -> Result<Option<Value>, ApiError> {
        match (method, rest) {
            (Method::Get, ["repositories"]) => {
                let limit: usize = query_value(query, "limit")
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or(100);
                let offset: usize = query_value(query, "cursor")
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or(0);
                let total = self.repositories.len();
                let data: Vec<Value> = self
                    .repositories
                    .iter()
                    .skip(offset)
                    .take(limit)
                    .map(|repository| json!({ "repository": repository }))
                    .collect();
                let cursor = match &self.stuck_cursor {
                    Some(stuck) => Some(stuck.clone()),
                    None if offset + limit < total => Some((offset + limit).to_string()),
                    None => None,
                };
                let mut pagination = json!({ "limit": limit, "total": total });
                if let Some(cursor) = cursor {
                    pagination["cursor"] = json!(cursor);
                }
                Ok(Some(json!({ "data": data, "pagination": pagination })))
            }
            (Method::Get, ["repositories", name, "tools"]) => {
                let tools = self
                    .repository_tools
                    .get(*name)
                    .ok_or_else(|| not_found(path))?;
                let data: Vec<Value> = tools
                    .iter()
                    .map(|(uuid, tool_name)| {
                        json!({
                            "uuid": uuid,
                            "name": tool_name,
                            "settings": {
                                "isEnabled": true,
                                "followsStandard": false,
                                "enabledBy": []
                            }
                        })
                    })
                    .collect();
                Ok(Some(json!({ "data": data })))
            }
            (Method::Patch, ["repositories", name, "tools", tool, "patterns"]) => {
                if self.failing_tools.contains(*tool) {
                    return Err(server_error("tool update rejected"));
                }
                self.security_enabled.insert(
                    (format!("repository:{name}"), tool.to_string()),
                    body_enabled(body),
                );
                Ok(None)
            }
            _ => Err(not_found(path)),
        }
    }
}

impl Transport for FakeCodacy {
    fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(RecordedCall {
            method,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            body: body.cloned(),
        });
        state.route(method, path, query, body)
    }
}
