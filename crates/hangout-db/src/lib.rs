//! Persistence for hangout events.
//!
//! The [`store::EventStore`] trait is the seam the service layer talks to. Two
//! implementations are provided: [`store::postgres::PgEventStore`] on top of a
//! diesel-async bb8 pool, and [`store::memory::MemoryEventStore`] for tests and
//! single-process deployments.

pub mod db;
pub mod error;
pub mod model;
pub mod store;
