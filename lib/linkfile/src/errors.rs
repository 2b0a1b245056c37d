use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not read input: {0}")]
    Io(#[from] io::Error),

    #[error("don't know how to handle '{0}' files")]
    UnknownFormat(String),

    #[error("bad area '{arg}': {reason}")]
    ManualArea { arg: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
