use thiserror::Error;

use crate::community::storage::StorageError;

/// Failures of the poll and feedback widgets.
#[derive(Debug, Error)]
pub enum CommunityError {
    #[error("'{0}' is not a poll option")]
    UnknownOption(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
