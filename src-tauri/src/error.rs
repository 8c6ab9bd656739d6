use thiserror::Error;

use crate::pages::PageStatus;

/// Errors surfaced by the page registry, the window controller and the
/// frame adapter. Backend failures never show up here: they are folded
/// into the page's `status`/`error` fields instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error("page '{0}' not found")]
    NotFound(String),

    #[error("duplicate page id '{0}'")]
    DuplicatePage(String),

    #[error("page '{0}' is not opened in an external window")]
    NotExternal(String),

    #[error("page '{0}' is not an embedded frame")]
    NotEmbedded(String),

    #[error("page '{0}' already has a window command in flight")]
    Busy(String),

    #[error("cannot {action} page '{id}' while it is {status}")]
    InvalidTransition {
        id: String,
        action: &'static str,
        status: PageStatus,
    },
}

pub type Result<T, E = ShellError> = std::result::Result<T, E>;
