//! HTTP adapter and process bootstrap for the hangout scheduler.

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod runtime_handler;
