use hangout_core::model::{EventId, UserId};
use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Event not found: {0}")]
    NotFound(EventId),

    #[error("Event id already exists: {0}")]
    DuplicateId(EventId),

    #[error("Event already populated: {0}")]
    AlreadyPopulated(EventId),

    #[error("User {requester} is not the creator of event {event}")]
    NotCreator { event: EventId, requester: UserId },

    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Stored document could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    CoreError(#[from] hangout_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
