// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InotoolsError {
    #[error("inotools is not initialized")]
    NotInitialized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("inotify reported end-of-file; the event queue probably overflowed")]
    StreamClosed,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown event name: {0}")]
    UnknownEvent(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InotoolsError {
    /// Underlying OS error code, if this error came from a system call.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            InotoolsError::IoError(e) => e.raw_os_error(),
            _ => None,
        }
    }

    /// errno-style code recorded as the session's last error.
    pub fn code(&self) -> i32 {
        match self {
            InotoolsError::IoError(e) => e.raw_os_error().unwrap_or(libc::EIO),
            InotoolsError::NotInitialized => libc::EBADF,
            InotoolsError::StreamClosed => libc::EIO,
            InotoolsError::NotFound(_) => libc::ENOENT,
            InotoolsError::InvalidArgument(_)
            | InotoolsError::UnknownEvent(_)
            | InotoolsError::ConfigError(_)
            | InotoolsError::TomlError(_) => libc::EINVAL,
            InotoolsError::Other(_) => libc::EIO,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, InotoolsError>;
