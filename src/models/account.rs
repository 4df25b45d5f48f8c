//! Account deletion model.

use serde::Serialize;
use std::fmt;

/// Signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
}

impl AuthUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// Document collection holding user-owned documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedCollection {
    pub name: &'static str,
    /// Field holding the owner's uid.
    pub owner_field: &'static str,
}

/// Everything that references a user, per schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionTarget {
    pub version: u32,
    /// Column holding the owner's uid in every table.
    pub owner_column: &'static str,
    pub tables: &'static [&'static str],
    /// Cleared page by page, in this order.
    pub collections: &'static [OwnedCollection],
    /// Collection holding the profile document, keyed by uid.
    pub profile_collection: &'static str,
    /// Documents deleted per query/delete cycle.
    pub batch_size: usize,
}

/// Current deletion target.
pub const DELETION_TARGET: DeletionTarget = DeletionTarget {
    version: 1,
    owner_column: "user_id",
    tables: &[
        "watchlist",
        "likes",
        "episode_ratings",
        "season_ratings",
        "episode_reviews",
        "season_reviews",
        "diary_entries",
        "user_posters",
    ],
    collections: &[
        OwnedCollection {
            name: "user_activity",
            owner_field: "userId",
        },
        OwnedCollection {
            name: "reviews",
            owner_field: "userId",
        },
    ],
    profile_collection: "users",
    batch_size: 500,
};

/// Deletion pipeline phase, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    RelationalCleanup,
    ActivityCleanup,
    ProfileDeletion,
    CredentialDeletion,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::RelationalCleanup,
        Phase::ActivityCleanup,
        Phase::ProfileDeletion,
        Phase::CredentialDeletion,
    ];

    /// Whether a hard failure in this phase stops the pipeline.
    pub fn aborts_on_failure(&self) -> bool {
        !matches!(self, Phase::RelationalCleanup)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::RelationalCleanup => "relational cleanup",
            Phase::ActivityCleanup => "activity cleanup",
            Phase::ProfileDeletion => "profile deletion",
            Phase::CredentialDeletion => "credential deletion",
        };
        f.write_str(name)
    }
}

/// A table or collection that could not be cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupFailure {
    pub target: String,
    pub message: String,
}

/// Result of one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Rows or documents removed.
    pub deleted: u64,
    /// Tolerated failures; empty when the phase fully succeeded.
    pub failures: Vec<CleanupFailure>,
}

impl PhaseReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Result of a completed deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub user_id: String,
    pub target_version: u32,
    pub phases: Vec<PhaseReport>,
}

impl DeletionReport {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    /// Whether every phase completed without tolerated failures.
    pub fn is_clean(&self) -> bool {
        self.phases.iter().all(|p| !p.is_partial())
    }
}
