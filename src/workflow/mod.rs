//! The toggle workflow.
//!
//! A run resolves the coding standards to process, turns each into an
//! editable draft, toggles the Security patterns of every tool, and promotes
//! the draft. Repositories that follow no standard are handled afterwards.
//! All remote access goes through [`crate::api::CodacyClient`]; progress is
//! reported through [`RunObserver`].
mod detached;
mod draft;
pub(crate) mod events;
mod promote;
mod resolve;
mod run;
mod toggle;

pub(crate) use events::ConsoleReporter;
pub(crate) use run::{run, RunSummary};
