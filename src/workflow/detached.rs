//! Repositories that follow no coding standard.
//!
//! Promoting a standard never reaches these repositories, so their tools are
//! toggled one by one after the standards phase.
use super::events::RunObserver;
use super::toggle::{toggle_security_patterns, ToggleOutcome, ToggleTarget};
use crate::api::types::Repository;
use crate::api::{CodacyClient, Transport};
use crate::config::RunOptions;
use anyhow::{anyhow, Result};
use std::collections::BTreeSet;

pub(crate) const REPOSITORY_PAGE_SIZE: u32 = 100;

/// Upper bound on listing pages; a service that keeps returning cursors past
/// this point is treated as broken.
pub(crate) const MAX_REPOSITORY_PAGES: usize = 10_000;

#[derive(Debug)]
pub(crate) struct RepositoryReport {
    pub(crate) name: String,
    pub(crate) outcome: Result<ToggleOutcome>,
}

/// Result of the detached-repositories phase.
#[derive(Debug, Default)]
pub(crate) struct DetachedPhase {
    /// Set when the repository listing itself failed.
    pub(crate) scan_error: Option<anyhow::Error>,
    pub(crate) repositories: Vec<RepositoryReport>,
}

impl DetachedPhase {
    pub(crate) fn is_failure(&self) -> bool {
        self.scan_error.is_some()
            || self
                .repositories
                .iter()
                .any(|report| report.outcome.is_err())
    }

    /// Repositories whose tools were listed and toggled.
    pub(crate) fn updated_repositories(&self) -> usize {
        self.repositories
            .iter()
            .filter(|report| report.outcome.is_ok())
            .count()
    }

    pub(crate) fn tool_failures(&self) -> usize {
        self.repositories
            .iter()
            .filter_map(|report| report.outcome.as_ref().ok())
            .map(|outcome| outcome.failed.len())
            .sum()
    }
}

/// Walk the cursor-paginated repository listing to the end.
pub(crate) fn list_all_repositories<T: Transport>(
    client: &CodacyClient<T>,
    page_size: u32,
    max_pages: usize,
) -> Result<Vec<Repository>> {
    let mut repositories = Vec::new();
    let mut seen_cursors = BTreeSet::new();
    let mut cursor: Option<String> = None;

    for page_index in 0..max_pages {
        let page = client.list_repositories_page(cursor.as_deref(), page_size)?;
        let next = page.next_cursor().map(str::to_string);
        let total = page.pagination.as_ref().map_or(0, |pagination| pagination.total);
        repositories.extend(page.data.into_iter().map(|item| item.repository));
        tracing::debug!(
            page = page_index + 1,
            fetched = repositories.len(),
            total,
            "repository page listed"
        );

        match next {
            None => return Ok(repositories),
            Some(next) => {
                if !seen_cursors.insert(next.clone()) {
                    return Err(anyhow!(
                        "repository listing returned cursor {next:?} twice"
                    ));
                }
                cursor = Some(next);
            }
        }
    }
    Err(anyhow!(
        "repository listing did not finish within {max_pages} pages"
    ))
}

/// Every repository of the organisation that follows no coding standard.
pub(crate) fn scan_detached<T: Transport>(client: &CodacyClient<T>) -> Result<Vec<Repository>> {
    let detached: Vec<Repository> =
        list_all_repositories(client, REPOSITORY_PAGE_SIZE, MAX_REPOSITORY_PAGES)?
            .into_iter()
            .filter(Repository::is_detached)
            .collect();
    Ok(detached)
}

/// Scan and toggle detached repositories. Failures are recorded in the
/// returned phase; one repository failing does not stop the others.
pub(crate) fn run_detached_phase<T: Transport>(
    client: &CodacyClient<T>,
    options: &RunOptions,
    observer: &mut dyn RunObserver,
) -> DetachedPhase {
    observer.on_detached_phase_start();

    let repositories = match scan_detached(client) {
        Ok(repositories) => repositories,
        Err(err) => {
            let error = format!("{err:#}");
            tracing::warn!(%error, "detached repository scan failed");
            observer.on_detached_scan_failed(&err);
            return DetachedPhase {
                scan_error: Some(err),
                repositories: Vec::new(),
            };
        }
    };
    observer.on_detached_found(&repositories);

    let reports = repositories
        .iter()
        .map(|repository| {
            observer.on_repository_start(repository);
            let target = ToggleTarget::Repository(repository.name.clone());
            let outcome = toggle_security_patterns(client, &target, options, observer);
            if let Err(err) = &outcome {
                observer.on_repository_failed(repository, err);
            }
            RepositoryReport {
                name: repository.name.clone(),
                outcome,
            }
        })
        .collect();

    DetachedPhase {
        scan_error: None,
        repositories: reports,
    }
}
