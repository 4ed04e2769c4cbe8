//! Decide which coding standards a run processes.
use crate::api::types::CodingStandard;
use crate::api::{CodacyClient, Transport};
use anyhow::Result;

/// Either the single standard named by `standard_id`, or every standard of
/// the organisation in service order.
pub(crate) fn resolve_standards<T: Transport>(
    client: &CodacyClient<T>,
    standard_id: Option<i64>,
) -> Result<Vec<CodingStandard>> {
    match standard_id {
        Some(id) => Ok(vec![client.get_coding_standard(id)?]),
        None => client.list_coding_standards(),
    }
}
