//! Run controller: the standards phase followed by the detached phase.
//!
//! Each standard moves through a small state machine. A failure in any step
//! finishes that standard as failed and the run moves on to the next one.
//! The detached phase always runs once standards were resolved.
use super::detached::{run_detached_phase, DetachedPhase};
use super::draft::materialize_draft;
use super::events::RunObserver;
use super::promote::{promote_draft, PromotionStep};
use super::resolve::resolve_standards;
use super::toggle::{toggle_security_patterns, ToggleOutcome, ToggleTarget};
use crate::api::types::CodingStandard;
use crate::api::{CodacyClient, Transport};
use crate::config::RunOptions;
use std::time::Instant;

/// Terminal state of one standard.
#[derive(Debug)]
pub(crate) enum StandardOutcome {
    /// Live standard left alone because of `--skip-live`.
    Skipped,
    /// Tools toggled and the draft promoted (or, in a dry run, would be).
    Promoted {
        draft_id: i64,
        toggle: ToggleOutcome,
        promotion: PromotionStep,
    },
    /// Tools toggled, draft left for review.
    PromotionSkipped { draft_id: i64, toggle: ToggleOutcome },
    Failed(anyhow::Error),
}

impl StandardOutcome {
    fn toggle(&self) -> Option<&ToggleOutcome> {
        match self {
            Self::Promoted { toggle, .. } | Self::PromotionSkipped { toggle, .. } => Some(toggle),
            Self::Skipped | Self::Failed(_) => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct StandardReport {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) outcome: StandardOutcome,
}

/// Tallies for the closing summary line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunCounts {
    pub(crate) promoted: usize,
    pub(crate) promotion_skipped: usize,
    pub(crate) skipped: usize,
    pub(crate) failed: usize,
    /// Individual tool updates that failed, across both phases.
    pub(crate) tool_failures: usize,
}

#[derive(Debug, Default)]
pub(crate) struct RunSummary {
    /// Set when standards could not be resolved; nothing else ran.
    pub(crate) resolution_error: Option<anyhow::Error>,
    pub(crate) standards: Vec<StandardReport>,
    pub(crate) detached: Option<DetachedPhase>,
}

impl RunSummary {
    /// Tool-level failures alone do not fail the run.
    pub(crate) fn is_failure(&self) -> bool {
        self.resolution_error.is_some()
            || self
                .standards
                .iter()
                .any(|report| matches!(report.outcome, StandardOutcome::Failed(_)))
            || self
                .detached
                .as_ref()
                .is_some_and(DetachedPhase::is_failure)
    }

    pub(crate) fn counts(&self) -> RunCounts {
        let mut counts = self
            .standards
            .iter()
            .fold(RunCounts::default(), |mut counts, report| {
                match &report.outcome {
                    StandardOutcome::Skipped => counts.skipped += 1,
                    StandardOutcome::Promoted { .. } => counts.promoted += 1,
                    StandardOutcome::PromotionSkipped { .. } => counts.promotion_skipped += 1,
                    StandardOutcome::Failed(_) => counts.failed += 1,
                }
                counts.tool_failures += report
                    .outcome
                    .toggle()
                    .map_or(0, |toggle| toggle.failed.len());
                counts
            });
        counts.tool_failures += self
            .detached
            .as_ref()
            .map_or(0, DetachedPhase::tool_failures);
        counts
    }
}

enum StandardState {
    Resolved,
    DraftReady {
        target_id: i64,
    },
    ToolsToggled {
        target_id: i64,
        toggle: ToggleOutcome,
    },
    Finished(StandardOutcome),
}

struct StandardStep<'a, T> {
    client: &'a CodacyClient<T>,
    standard: &'a CodingStandard,
    options: &'a RunOptions,
}

impl<T: Transport> StandardStep<'_, T> {
    fn advance(&self, state: StandardState, observer: &mut dyn RunObserver) -> StandardState {
        match state {
            StandardState::Resolved => {
                match materialize_draft(self.client, self.standard, self.options) {
                    Ok(decision) => {
                        observer.on_draft_decision(self.standard, &decision);
                        match decision.target_id(self.standard) {
                            Some(target_id) => StandardState::DraftReady { target_id },
                            None => StandardState::Finished(StandardOutcome::Skipped),
                        }
                    }
                    Err(err) => StandardState::Finished(StandardOutcome::Failed(err)),
                }
            }
            StandardState::DraftReady { target_id } => {
                let target = ToggleTarget::Standard(target_id);
                match toggle_security_patterns(self.client, &target, self.options, observer) {
                    Ok(toggle) => StandardState::ToolsToggled { target_id, toggle },
                    Err(err) => StandardState::Finished(StandardOutcome::Failed(err)),
                }
            }
            StandardState::ToolsToggled { target_id, toggle } => {
                match promote_draft(self.client, target_id, self.options) {
                    Ok(PromotionStep::NotRequested) => {
                        observer.on_promotion(target_id, &PromotionStep::NotRequested);
                        StandardState::Finished(StandardOutcome::PromotionSkipped {
                            draft_id: target_id,
                            toggle,
                        })
                    }
                    Ok(promotion) => {
                        observer.on_promotion(target_id, &promotion);
                        StandardState::Finished(StandardOutcome::Promoted {
                            draft_id: target_id,
                            toggle,
                            promotion,
                        })
                    }
                    Err(err) => StandardState::Finished(StandardOutcome::Failed(err)),
                }
            }
            finished @ StandardState::Finished(_) => finished,
        }
    }
}

fn process_standard<T: Transport>(
    client: &CodacyClient<T>,
    standard: &CodingStandard,
    options: &RunOptions,
    observer: &mut dyn RunObserver,
) -> StandardReport {
    observer.on_standard_start(standard);
    let step = StandardStep {
        client,
        standard,
        options,
    };
    let mut state = StandardState::Resolved;
    let outcome = loop {
        state = match step.advance(state, observer) {
            StandardState::Finished(outcome) => break outcome,
            next => next,
        };
    };
    if let StandardOutcome::Failed(err) = &outcome {
        let error = format!("{err:#}");
        tracing::warn!(standard = standard.id, %error, "coding standard failed");
    }
    let report = StandardReport {
        id: standard.id,
        name: standard.name.clone(),
        outcome,
    };
    observer.on_standard_finished(&report);
    report
}

/// Process each resolved standard in order.
pub(crate) fn run_standards_phase<T: Transport>(
    client: &CodacyClient<T>,
    standards: &[CodingStandard],
    options: &RunOptions,
    observer: &mut dyn RunObserver,
) -> Vec<StandardReport> {
    standards
        .iter()
        .map(|standard| process_standard(client, standard, options, observer))
        .collect()
}

/// Execute a whole run against `client`.
///
/// `standard_id` restricts phase one to a single standard. Failures are
/// captured in the returned summary rather than returned as errors.
pub(crate) fn run<T: Transport>(
    client: &CodacyClient<T>,
    standard_id: Option<i64>,
    options: &RunOptions,
    observer: &mut dyn RunObserver,
) -> RunSummary {
    let started = Instant::now();
    let standards = match resolve_standards(client, standard_id) {
        Ok(standards) => standards,
        Err(err) => {
            observer.on_resolution_failed(&err);
            let summary = RunSummary {
                resolution_error: Some(err),
                ..RunSummary::default()
            };
            observer.on_run_finished(&summary);
            return summary;
        }
    };
    observer.on_standards_resolved(&standards);

    let reports = run_standards_phase(client, &standards, options, observer);
    tracing::info!(
        standards = reports.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "standards phase complete"
    );

    let detached = run_detached_phase(client, options, observer);
    tracing::info!(
        repositories = detached.repositories.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "detached phase complete"
    );

    let summary = RunSummary {
        resolution_error: None,
        standards: reports,
        detached: Some(detached),
    };
    observer.on_run_finished(&summary);
    summary
}
