use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("source folder {} is missing or unreadable: {source}", .path.display())]
    SourceRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source folder {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid exclude pattern: {0}")]
    InvalidExclude(#[from] regex::Error),

    #[error("failed to walk source folder: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("file not found or unreadable: {}: {source}", .path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write output file {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
