//! Library error type
//!
//! Covers the failures the shared library itself can produce: storage,
//! filesystem, and configuration problems, plus corrupt persisted data
//! (a guid, timestamp, or JSON column that no longer parses surfaces as
//! `Internal`). The service crate maps these onto HTTP responses with
//! its own error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite query or connection failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data-folder or config-file filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed, or a resolved value is unusable
    #[error("configuration error: {0}")]
    Config(String),

    /// A stored value failed to parse back into its model type
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_via_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing folder");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().starts_with("io error:"));
    }

    #[test]
    fn display_includes_the_detail_message() {
        let err = Error::Config("bind_addr is not a socket address".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: bind_addr is not a socket address"
        );

        let err = Error::Internal("bad guid in scan_history".to_string());
        assert_eq!(err.to_string(), "internal error: bad guid in scan_history");
    }
}
