use std::path::PathBuf;
use thiserror::Error;

use crate::model::BarId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("no bar with id {0} is open for voting")]
    UnknownBar(BarId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BreedError {
    #[error("cannot breed from an empty population")]
    EmptyParentSet,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not seed identity generator: {0}")]
    Identity(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Breed(#[from] BreedError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
