//! Database layer shared across the workspace

pub mod init;

pub use init::init_database;
