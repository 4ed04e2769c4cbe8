//! Make sure a coding standard can be edited before its tools are touched.
//!
//! Only drafts accept pattern changes. A live standard is either skipped or
//! copied into a fresh draft, which then becomes the processing target.
use crate::api::types::CodingStandard;
use crate::api::{CodacyClient, Transport};
use crate::config::RunOptions;
use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DraftDecision {
    /// The standard is already a draft and is edited in place.
    AlreadyDraft,
    /// A draft copied from the live standard was created.
    Created(CodingStandard),
    /// Dry run: a draft would have been created.
    WouldCreate,
    /// Live standard left untouched because of `--skip-live`.
    Skipped,
}

impl DraftDecision {
    /// Standard whose tools are toggled next, or `None` when processing stops.
    ///
    /// For [`DraftDecision::WouldCreate`] the live source is returned; dry
    /// runs only read from it.
    pub(crate) fn target_id(&self, source: &CodingStandard) -> Option<i64> {
        match self {
            Self::AlreadyDraft | Self::WouldCreate => Some(source.id),
            Self::Created(draft) => Some(draft.id),
            Self::Skipped => None,
        }
    }
}

pub(crate) fn materialize_draft<T: Transport>(
    client: &CodacyClient<T>,
    standard: &CodingStandard,
    options: &RunOptions,
) -> Result<DraftDecision> {
    if standard.is_draft {
        return Ok(DraftDecision::AlreadyDraft);
    }
    if options.skip_live {
        tracing::info!(standard = standard.id, "skipping live coding standard");
        return Ok(DraftDecision::Skipped);
    }
    if options.dry_run {
        return Ok(DraftDecision::WouldCreate);
    }
    let draft = client.create_draft_from(standard)?;
    tracing::info!(
        source = standard.id,
        draft = draft.id,
        "created draft from live coding standard"
    );
    Ok(DraftDecision::Created(draft))
}
