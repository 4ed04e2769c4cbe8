//! Promotion of an edited draft to the effective coding standard.
use crate::api::types::PromotionResult;
use crate::api::{CodacyClient, Transport};
use crate::config::RunOptions;
use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PromotionStep {
    /// The service applied the draft; the lists are informational.
    Promoted(PromotionResult),
    /// Dry run: the draft would have been promoted.
    Simulated,
    /// `--promote false`: the draft is left for review.
    NotRequested,
}

/// Promote `draft_id` when requested. A failed call is returned as an error
/// for the caller to attach to the standard.
pub(crate) fn promote_draft<T: Transport>(
    client: &CodacyClient<T>,
    draft_id: i64,
    options: &RunOptions,
) -> Result<PromotionStep> {
    if !options.promote {
        return Ok(PromotionStep::NotRequested);
    }
    if options.dry_run {
        return Ok(PromotionStep::Simulated);
    }
    let result = client.promote_draft(draft_id)?;
    tracing::info!(
        draft = draft_id,
        applied = result.successful.len(),
        failed = result.failed.len(),
        "promoted coding standard"
    );
    Ok(PromotionStep::Promoted(result))
}
