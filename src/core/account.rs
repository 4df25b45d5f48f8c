//! Account deletion.
//!
//! Removes a user's data from every store, then the credential itself:
//! 1. Relational rows, all tables in parallel. Per-table failures are
//!    recorded and tolerated.
//! 2. Activity and legacy review documents, in pages of `batch_size`.
//! 3. The profile document.
//! 4. The identity credential. It goes last because the earlier phases are
//!    authorized with it.
//!
//! A failure in phases 2-4 aborts the run. Nothing is rolled back; every
//! phase is a no-op when repeated against already-cleared data, so the
//! whole operation can simply be retried.

use crate::models::account::{
    AuthUser, CleanupFailure, DeletionReport, DeletionTarget, Phase, PhaseReport, DELETION_TARGET,
};
use crate::services::backend::{DocumentStore, IdentityError, IdentityProvider, RelationalStore};
use crate::{Error, Result};
use futures::future::join_all;
use std::sync::Arc;

/// Outcome of a single phase.
#[derive(Debug)]
pub enum PhaseOutcome {
    Completed { deleted: u64 },
    Partial { deleted: u64, failures: Vec<CleanupFailure> },
    Failed(Error),
}

/// Runs the deletion pipeline against the configured stores.
pub struct AccountDeletion {
    relational: Arc<dyn RelationalStore>,
    documents: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    target: DeletionTarget,
}

impl AccountDeletion {
    /// Create a pipeline for the current deletion target.
    pub fn new(
        relational: Arc<dyn RelationalStore>,
        documents: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self::with_target(relational, documents, identity, DELETION_TARGET)
    }

    /// Create a pipeline for a specific deletion target.
    pub fn with_target(
        relational: Arc<dyn RelationalStore>,
        documents: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        target: DeletionTarget,
    ) -> Self {
        Self {
            relational,
            documents,
            identity,
            target,
        }
    }

    pub fn target(&self) -> &DeletionTarget {
        &self.target
    }

    /// Delete the signed-in user's account and all associated data.
    pub async fn delete_account(&self, user: Option<&AuthUser>) -> Result<DeletionReport> {
        let user = user
            .filter(|u| !u.uid.trim().is_empty())
            .ok_or(Error::Unauthenticated)?;

        tracing::info!("Starting account deletion for {}", user.uid);

        let mut report = DeletionReport {
            user_id: user.uid.clone(),
            target_version: self.target.version,
            phases: Vec::with_capacity(Phase::ALL.len()),
        };

        for phase in Phase::ALL {
            let outcome = self.run_phase(phase, user).await;
            let phase_report = match outcome {
                PhaseOutcome::Completed { deleted } => {
                    tracing::info!("Finished {} ({} removed)", phase, deleted);
                    PhaseReport {
                        phase,
                        deleted,
                        failures: Vec::new(),
                    }
                }
                PhaseOutcome::Partial { deleted, failures } => {
                    tracing::warn!(
                        "Finished {} with {} failure(s) ({} removed)",
                        phase,
                        failures.len(),
                        deleted
                    );
                    PhaseReport {
                        phase,
                        deleted,
                        failures,
                    }
                }
                PhaseOutcome::Failed(err) if phase.aborts_on_failure() => {
                    tracing::error!("Account deletion aborted during {}: {}", phase, err);
                    return Err(err);
                }
                PhaseOutcome::Failed(err) => {
                    tracing::warn!("Continuing past failed {}: {}", phase, err);
                    PhaseReport {
                        phase,
                        deleted: 0,
                        failures: vec![CleanupFailure {
                            target: phase.to_string(),
                            message: err.to_string(),
                        }],
                    }
                }
            };
            report.phases.push(phase_report);
        }

        tracing::info!("Account {} deleted", user.uid);
        Ok(report)
    }

    /// Run one phase for `user`.
    pub async fn run_phase(&self, phase: Phase, user: &AuthUser) -> PhaseOutcome {
        match phase {
            Phase::RelationalCleanup => self.clear_tables(&user.uid).await,
            Phase::ActivityCleanup => self.clear_collections(&user.uid).await,
            Phase::ProfileDeletion => self.delete_profile(&user.uid).await,
            Phase::CredentialDeletion => self.delete_credential(user).await,
        }
    }

    /// Delete the user's rows from every table, concurrently.
    async fn clear_tables(&self, user_id: &str) -> PhaseOutcome {
        let deletes = self.target.tables.iter().map(|table| async move {
            let result = self
                .relational
                .delete_where(table, self.target.owner_column, user_id)
                .await;
            (*table, result)
        });

        let mut deleted = 0;
        let mut failures = Vec::new();
        for (table, result) in join_all(deletes).await {
            match result {
                Ok(rows) => {
                    tracing::debug!("Cleared {} row(s) from {}", rows, table);
                    deleted += rows;
                }
                Err(e) => {
                    tracing::warn!("Failed to clear table {}: {}", table, e);
                    failures.push(CleanupFailure {
                        target: table.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if failures.is_empty() {
            PhaseOutcome::Completed { deleted }
        } else {
            PhaseOutcome::Partial { deleted, failures }
        }
    }

    /// Delete the user's documents from each owned collection, page by page.
    async fn clear_collections(&self, user_id: &str) -> PhaseOutcome {
        let mut deleted = 0;
        for collection in self.target.collections {
            match self
                .clear_collection(collection.name, collection.owner_field, user_id)
                .await
            {
                Ok(count) => deleted += count,
                Err(e) => return PhaseOutcome::Failed(e),
            }
        }
        PhaseOutcome::Completed { deleted }
    }

    /// Query and delete one page at a time until a query comes back empty.
    /// Each page is committed before the next query.
    async fn clear_collection(&self, collection: &str, field: &str, user_id: &str) -> Result<u64> {
        let batch_size = self.target.batch_size.max(1);
        let mut total = 0u64;

        loop {
            let ids = self
                .documents
                .query_ids(collection, field, user_id, batch_size)
                .await
                .map_err(|e| Error::store(collection, e.to_string()))?;
            if ids.is_empty() {
                break;
            }

            self.documents
                .delete_batch(collection, &ids)
                .await
                .map_err(|e| Error::store(collection, e.to_string()))?;
            total += ids.len() as u64;
        }

        tracing::info!("Deleted {} document(s) from {}", total, collection);
        Ok(total)
    }

    async fn delete_profile(&self, user_id: &str) -> PhaseOutcome {
        let collection = self.target.profile_collection;
        match self.documents.delete_document(collection, user_id).await {
            Ok(existed) => PhaseOutcome::Completed {
                deleted: u64::from(existed),
            },
            Err(e) => PhaseOutcome::Failed(Error::store(collection, e.to_string())),
        }
    }

    async fn delete_credential(&self, user: &AuthUser) -> PhaseOutcome {
        match self.identity.delete_credential(user).await {
            Ok(()) => PhaseOutcome::Completed { deleted: 1 },
            Err(IdentityError::RequiresRecentLogin) => PhaseOutcome::Failed(Error::RequiresRecentLogin),
            Err(IdentityError::Other(message)) => PhaseOutcome::Failed(Error::Identity(message)),
        }
    }
}
