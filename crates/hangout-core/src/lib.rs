//! Shared configuration, errors and domain model for the hangout scheduler.

pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod util;
