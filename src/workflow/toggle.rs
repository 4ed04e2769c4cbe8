//! Bulk Security-pattern toggle for every tool of a draft standard or a
//! repository.
//!
//! Tool updates are independent. A failed update is recorded in the outcome
//! and the batch moves on to the next tool; only a failure to list the tools
//! aborts the batch.
use super::events::RunObserver;
use crate::api::{CodacyClient, Transport};
use crate::config::RunOptions;
use anyhow::Result;
use std::fmt;

/// Context whose tools are toggled. Each kind has its own endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ToggleTarget {
    Standard(i64),
    Repository(String),
}

impl fmt::Display for ToggleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(id) => write!(f, "coding standard {id}"),
            Self::Repository(name) => write!(f, "repository {name}"),
        }
    }
}

/// A tool as listed in either context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ToolRef {
    pub(crate) uuid: String,
    /// Display name; only repository listings carry one.
    pub(crate) name: Option<String>,
    /// Standards that forced the tool on, in repository context.
    pub(crate) enabled_by: Vec<String>,
}

impl ToolRef {
    pub(crate) fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => format!("{name} ({})", self.uuid),
            _ => self.uuid.clone(),
        }
    }
}

/// Result of one toggle batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ToggleOutcome {
    pub(crate) total: usize,
    pub(crate) updated: usize,
    /// Uuids of tools whose update call failed, in listing order.
    pub(crate) failed: Vec<String>,
    /// No update call was issued; `updated` counts tools that would change.
    pub(crate) simulated: bool,
}

impl ToggleOutcome {
    fn start(total: usize) -> Self {
        Self {
            total,
            updated: 0,
            failed: Vec::new(),
            simulated: false,
        }
    }

    fn simulated(total: usize) -> Self {
        Self {
            total,
            updated: total,
            failed: Vec::new(),
            simulated: true,
        }
    }

    fn with_success(self) -> Self {
        Self {
            updated: self.updated + 1,
            ..self
        }
    }

    fn with_failure(mut self, tool_uuid: &str) -> Self {
        self.failed.push(tool_uuid.to_string());
        self
    }
}

/// List the tools configured for `target`.
pub(crate) fn list_tools<T: Transport>(
    client: &CodacyClient<T>,
    target: &ToggleTarget,
) -> Result<Vec<ToolRef>> {
    let tools = match target {
        ToggleTarget::Standard(id) => client
            .list_standard_tools(*id)?
            .into_iter()
            .map(|tool| ToolRef {
                uuid: tool.uuid,
                name: None,
                enabled_by: Vec::new(),
            })
            .collect(),
        ToggleTarget::Repository(name) => client
            .list_repository_tools(name)?
            .into_iter()
            .map(|tool| ToolRef {
                uuid: tool.uuid,
                name: Some(tool.name),
                enabled_by: tool
                    .settings
                    .enabled_by
                    .into_iter()
                    .map(|standard| standard.name)
                    .collect(),
            })
            .collect(),
    };
    Ok(tools)
}

fn update_tool<T: Transport>(
    client: &CodacyClient<T>,
    target: &ToggleTarget,
    tool: &ToolRef,
    enable: bool,
) -> Result<()> {
    match target {
        ToggleTarget::Standard(id) => {
            client.update_standard_security_patterns(*id, &tool.uuid, enable)
        }
        ToggleTarget::Repository(name) => {
            client.update_repository_security_patterns(name, &tool.uuid, enable)
        }
    }
}

/// Enable or disable Security patterns on every tool of `target`.
///
/// In dry-run mode only the listing call is made.
pub(crate) fn toggle_security_patterns<T: Transport>(
    client: &CodacyClient<T>,
    target: &ToggleTarget,
    options: &RunOptions,
    observer: &mut dyn RunObserver,
) -> Result<ToggleOutcome> {
    let tools = list_tools(client, target)?;
    observer.on_tools_listed(target, tools.len());

    let outcome = if options.dry_run {
        for tool in &tools {
            observer.on_tool_toggle(target, tool, options);
        }
        ToggleOutcome::simulated(tools.len())
    } else {
        tools
            .iter()
            .fold(ToggleOutcome::start(tools.len()), |outcome, tool| {
                observer.on_tool_toggle(target, tool, options);
                match update_tool(client, target, tool, options.enable) {
                    Ok(()) => outcome.with_success(),
                    Err(err) => {
                        let error = format!("{err:#}");
                        tracing::warn!(%target, tool = %tool.uuid, %error, "tool update failed");
                        observer.on_tool_failed(target, tool, &err);
                        outcome.with_failure(&tool.uuid)
                    }
                }
            })
    };

    observer.on_toggle_complete(target, &outcome, options);
    Ok(outcome)
}
