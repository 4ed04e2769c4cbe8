//! Progress events emitted by the run controller.
//!
//! The workflow never prints. It reports through [`RunObserver`], and the
//! console output is one implementation of it.
use super::detached::DetachedPhase;
use super::draft::DraftDecision;
use super::promote::PromotionStep;
use super::run::{RunSummary, StandardOutcome, StandardReport};
use super::toggle::{ToggleOutcome, ToggleTarget, ToolRef};
use crate::api::types::{CodingStandard, Repository};
use crate::config::{Config, RunOptions};

/// Receives workflow progress. Every hook defaults to a no-op.
pub(crate) trait RunObserver {
    fn on_standards_resolved(&mut self, _standards: &[CodingStandard]) {}
    fn on_resolution_failed(&mut self, _error: &anyhow::Error) {}
    fn on_standard_start(&mut self, _standard: &CodingStandard) {}
    fn on_draft_decision(&mut self, _standard: &CodingStandard, _decision: &DraftDecision) {}
    fn on_tools_listed(&mut self, _target: &ToggleTarget, _count: usize) {}
    fn on_tool_toggle(&mut self, _target: &ToggleTarget, _tool: &ToolRef, _options: &RunOptions) {}
    fn on_tool_failed(&mut self, _target: &ToggleTarget, _tool: &ToolRef, _error: &anyhow::Error) {}
    fn on_toggle_complete(
        &mut self,
        _target: &ToggleTarget,
        _outcome: &ToggleOutcome,
        _options: &RunOptions,
    ) {
    }
    fn on_promotion(&mut self, _draft_id: i64, _step: &PromotionStep) {}
    fn on_standard_finished(&mut self, _report: &StandardReport) {}
    fn on_detached_phase_start(&mut self) {}
    fn on_detached_scan_failed(&mut self, _error: &anyhow::Error) {}
    fn on_detached_found(&mut self, _repositories: &[Repository]) {}
    fn on_repository_start(&mut self, _repository: &Repository) {}
    fn on_repository_failed(&mut self, _repository: &Repository, _error: &anyhow::Error) {}
    fn on_run_finished(&mut self, _summary: &RunSummary) {}
}

/// Human-readable progress on stdout, problems on stderr.
pub(crate) struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub(crate) fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub(crate) fn print_banner(&self, config: &Config) {
        let action = config.options.action();
        println!("Codacy Security Pattern Toggler");
        println!("  Provider:     {}", config.provider.as_str());
        println!("  Organisation: {}", config.organization);
        println!("  Action:       {action} security patterns");
        println!("  Promote:      {}", config.options.promote);
        if config.options.dry_run {
            println!("  Mode:         DRY RUN (no changes will be made)");
        }
        println!();
    }
}

impl RunObserver for ConsoleReporter {
    fn on_standards_resolved(&mut self, standards: &[CodingStandard]) {
        if standards.is_empty() {
            println!("No coding standards found.");
            println!();
            return;
        }
        println!("Found {} coding standard(s) to process:", standards.len());
        for standard in standards {
            println!(
                "  [{}] {}  (draft={}  default={}  tools={}  patterns={}  repos={})",
                standard.id,
                standard.name,
                standard.is_draft,
                standard.is_default,
                standard.meta.enabled_tools_count,
                standard.meta.enabled_patterns_count,
                standard.meta.linked_repositories_count
            );
        }
        println!();
    }

    fn on_resolution_failed(&mut self, error: &anyhow::Error) {
        eprintln!("error: {error:#}");
    }

    fn on_standard_start(&mut self, standard: &CodingStandard) {
        println!("==> {:?} (ID {})", standard.name, standard.id);
    }

    fn on_draft_decision(&mut self, standard: &CodingStandard, decision: &DraftDecision) {
        match decision {
            DraftDecision::AlreadyDraft => {}
            DraftDecision::Skipped => {
                println!("    Skipping: standard is not a draft and --skip-live is set");
            }
            DraftDecision::Created(draft) => {
                println!("    Standard is not a draft, created a draft from it");
                println!("    Draft created: {:?} (ID {})", draft.name, draft.id);
            }
            DraftDecision::WouldCreate => {
                println!("    Standard is not a draft");
                println!(
                    "    [dry-run] would create a draft from standard {}",
                    standard.id
                );
            }
        }
    }

    fn on_tools_listed(&mut self, _target: &ToggleTarget, count: usize) {
        println!("    Tools found: {count}");
    }

    fn on_tool_toggle(&mut self, _target: &ToggleTarget, tool: &ToolRef, options: &RunOptions) {
        if options.dry_run {
            println!(
                "    [dry-run] would {} security patterns for tool {}",
                options.action(),
                tool.label()
            );
        } else if self.verbose {
            println!(
                "    {} security patterns for tool {}",
                options.action_verb(),
                tool.label()
            );
            if !tool.enabled_by.is_empty() {
                println!("      enabled by: {}", tool.enabled_by.join(", "));
            }
        }
    }

    fn on_tool_failed(&mut self, _target: &ToggleTarget, tool: &ToolRef, error: &anyhow::Error) {
        eprintln!("    warning: could not update tool {}: {error:#}", tool.uuid);
    }

    fn on_toggle_complete(
        &mut self,
        _target: &ToggleTarget,
        outcome: &ToggleOutcome,
        options: &RunOptions,
    ) {
        let verb = if outcome.simulated {
            "would be updated"
        } else {
            "updated"
        };
        println!(
            "    {} security patterns: {}/{} tool(s) {verb}",
            options.action_verb(),
            outcome.updated,
            outcome.total
        );
        if !outcome.failed.is_empty() {
            println!("    Failed tools: {}", outcome.failed.join(", "));
        }
    }

    fn on_promotion(&mut self, draft_id: i64, step: &PromotionStep) {
        match step {
            PromotionStep::NotRequested => {}
            PromotionStep::Simulated => {
                println!("    [dry-run] would promote draft standard {draft_id}");
            }
            PromotionStep::Promoted(result) => {
                println!("    Promoted draft {draft_id} successfully");
                if !result.successful.is_empty() {
                    println!(
                        "    Applied to {} repo(s): {}",
                        result.successful.len(),
                        result.successful.join(", ")
                    );
                }
                if !result.failed.is_empty() {
                    println!(
                        "    Failed for {} repo(s): {}",
                        result.failed.len(),
                        result.failed.join(", ")
                    );
                }
            }
        }
    }

    fn on_standard_finished(&mut self, report: &StandardReport) {
        if let StandardOutcome::Failed(error) = &report.outcome {
            eprintln!(
                "error processing {:?} (ID {}): {error:#}",
                report.name, report.id
            );
        }
        println!();
    }

    fn on_detached_phase_start(&mut self) {
        println!("--- Detached repositories (not following any coding standard) ---");
        println!();
    }

    fn on_detached_scan_failed(&mut self, error: &anyhow::Error) {
        eprintln!("error processing detached repositories: {error:#}");
    }

    fn on_detached_found(&mut self, repositories: &[Repository]) {
        if repositories.is_empty() {
            println!("No detached repositories found.");
            println!();
            return;
        }
        println!("Found {} detached repository(ies):", repositories.len());
        for repository in repositories {
            println!("  - {}", repository.name);
        }
        println!();
    }

    fn on_repository_start(&mut self, repository: &Repository) {
        println!("==> {}", repository.name);
    }

    fn on_repository_failed(&mut self, repository: &Repository, error: &anyhow::Error) {
        eprintln!(
            "    error listing tools for {}: {error:#}",
            repository.name
        );
        println!();
    }

    fn on_run_finished(&mut self, summary: &RunSummary) {
        if summary.resolution_error.is_some() {
            return;
        }
        let counts = summary.counts();
        let detached = summary
            .detached
            .as_ref()
            .map(DetachedPhase::updated_repositories)
            .unwrap_or(0);
        println!(
            "Summary: {} standard(s) processed ({} promoted, {} left as draft, {} skipped, {} failed); {} detached repository(ies) processed",
            summary.standards.len(),
            counts.promoted,
            counts.promotion_skipped,
            counts.skipped,
            counts.failed,
            detached
        );
        let failed_repositories: Vec<&str> = summary
            .detached
            .iter()
            .flat_map(|phase| &phase.repositories)
            .filter(|report| report.outcome.is_err())
            .map(|report| report.name.as_str())
            .collect();
        if !failed_repositories.is_empty() {
            println!("Failed repositories: {}", failed_repositories.join(", "));
        }
        if counts.tool_failures > 0 {
            println!(
                "{} tool update(s) failed; see warnings above",
                counts.tool_failures
            );
        }
    }
}

/// Observer that records a compact trace of events, for tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingObserver {
    pub(crate) events: Vec<String>,
}

#[cfg(test)]
impl RunObserver for RecordingObserver {
    fn on_standards_resolved(&mut self, standards: &[CodingStandard]) {
        self.events.push(format!("resolved:{}", standards.len()));
    }

    fn on_resolution_failed(&mut self, _error: &anyhow::Error) {
        self.events.push("resolution-failed".to_string());
    }

    fn on_standard_start(&mut self, standard: &CodingStandard) {
        self.events.push(format!("standard:{}", standard.id));
    }

    fn on_draft_decision(&mut self, _standard: &CodingStandard, decision: &DraftDecision) {
        let label = match decision {
            DraftDecision::AlreadyDraft => "draft:existing".to_string(),
            DraftDecision::Created(draft) => format!("draft:created:{}", draft.id),
            DraftDecision::WouldCreate => "draft:would-create".to_string(),
            DraftDecision::Skipped => "draft:skipped".to_string(),
        };
        self.events.push(label);
    }

    fn on_tool_failed(&mut self, target: &ToggleTarget, tool: &ToolRef, _error: &anyhow::Error) {
        self.events.push(format!("tool-failed:{target}:{}", tool.uuid));
    }

    fn on_toggle_complete(
        &mut self,
        target: &ToggleTarget,
        outcome: &ToggleOutcome,
        _options: &RunOptions,
    ) {
        self.events.push(format!(
            "toggled:{target}:{}/{}",
            outcome.updated, outcome.total
        ));
    }

    fn on_promotion(&mut self, draft_id: i64, step: &PromotionStep) {
        let label = match step {
            PromotionStep::Promoted(_) => "promoted",
            PromotionStep::Simulated => "would-promote",
            PromotionStep::NotRequested => "not-promoted",
        };
        self.events.push(format!("{label}:{draft_id}"));
    }

    fn on_detached_phase_start(&mut self) {
        self.events.push("detached".to_string());
    }

    fn on_detached_scan_failed(&mut self, _error: &anyhow::Error) {
        self.events.push("detached-scan-failed".to_string());
    }

    fn on_repository_start(&mut self, repository: &Repository) {
        self.events.push(format!("repository:{}", repository.name));
    }

    fn on_repository_failed(&mut self, repository: &Repository, _error: &anyhow::Error) {
        self.events
            .push(format!("repository-failed:{}", repository.name));
    }
}
