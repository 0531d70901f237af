use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Session errors
    #[error("Device busy: a session is already open")]
    Busy,

    #[error("Invalid write length: expected 4 bytes, got {len}")]
    InvalidLength { len: usize },

    #[error("Session closed")]
    SessionClosed,

    #[error("Device has been shut down")]
    ShutDown,

    // Command assembly errors
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    // Hardware errors
    #[error("Hardware operation failed: {0}")]
    Hardware(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
