//! Controller Errors

use crate::commands::RemoteError;
use crate::forms::ValidationError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected before any remote call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Remote call failed; local state kept its last confirmed value
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("no active travel list")]
    NoActiveList,

    /// Another change to this item has not been answered yet
    #[error("item {0} has a change in flight")]
    ItemPending(String),
}
