//! Scheduling logic for group hangouts.
//!
//! The pure pieces ([`aggregate`], [`tally`]) turn participant input into candidates and
//! winners. [`coordinator`] drives one event through its phases, [`runtime`] keeps at most
//! one coordinator per event alive, and [`recovery`] re-attaches coordinators after a restart.

pub mod aggregate;
pub mod announce;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod notify;
pub mod places;
pub mod recovery;
pub mod runtime;
pub mod tally;

#[cfg(test)]
mod coordinator_tests;
#[cfg(test)]
mod event_tests;
#[cfg(test)]
mod testing;
