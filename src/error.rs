use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaygroundError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("Invalid {0} syntax")]
    MalformedTarget(&'static str),

    #[error("multiple statements are not supported")]
    MultipleStatements,
}
