//! Shared library for the Pawdentify backend
//!
//! Provides the common error type, configuration loading, data models for the
//! persisted collections, and database initialization (schema + indexes).
//! Service binaries construct their own pool and state from these pieces;
//! nothing in here holds global mutable state.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use error::{Error, Result};
