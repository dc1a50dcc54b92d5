/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Write operations a `before_change` hook runs for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
}
