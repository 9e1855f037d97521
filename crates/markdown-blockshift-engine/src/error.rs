use thiserror::Error;

use crate::document::EditError;
use crate::policy::RejectReason;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to apply edit: {0}")]
    Edit(#[from] EditError),

    #[error("drop was not allowed: {0}")]
    Rejected(RejectReason),

    #[error("source block at line {0} no longer matches the document")]
    NoSource(usize),
}
