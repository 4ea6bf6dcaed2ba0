//! Chat-platform collaborator: announcements and participant display lookup.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use hangout_core::model::UserId;
use thiserror::Error;

pub mod discord;
pub mod log_only;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Chat platform request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat platform returned {status}: {body}")]
    Api { status: u16, body: String },
}

pub type NotifyResult<T> = std::result::Result<T, NotifyError>;
pub type NotifyFuture<'a, T> = Pin<Box<dyn Future<Output = NotifyResult<T>> + Send + 'a>>;

/// How a participant is shown next to a candidate time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayIdentity {
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
}

pub trait Notifier: Send + Sync {
    /// ## Errors
    /// Returns an error if the message could not be delivered.
    fn post_message<'a>(&'a self, channel_id: &'a str, text: &'a str) -> NotifyFuture<'a, ()>;

    /// ## Summary
    /// Best-effort display lookup for members of `group_id`. Users that cannot be resolved
    /// are left out of the returned map.
    ///
    /// ## Errors
    /// Returns an error if the group itself could not be read.
    fn lookup_display_names<'a>(
        &'a self,
        group_id: &'a str,
        user_ids: &'a [UserId],
    ) -> NotifyFuture<'a, HashMap<UserId, DisplayIdentity>>;
}
