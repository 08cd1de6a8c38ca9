//! Local byte sources and sinks
//!
//! A transfer reads from or writes to either a named local file or one of the
//! process's standard streams. The choice is made once, from the command
//! line, and the opened stream is handed to the transfer engine.

use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::traits::{ObjectReader, ObjectWriter};

/// Where upload data comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteSource {
    File(PathBuf),
    Stdin,
}

impl ByteSource {
    /// A named file if `arg` is present and non-empty, standard input otherwise
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some(name) if !name.is_empty() => ByteSource::File(PathBuf::from(name)),
            _ => ByteSource::Stdin,
        }
    }

    /// Open the source for reading
    pub async fn open(&self) -> Result<ObjectReader> {
        match self {
            ByteSource::File(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|e| io_context(e, "Unable to open input file", path))?;
                tracing::debug!(path = %path.display(), "reading object from input file");
                Ok(Box::new(file))
            }
            ByteSource::Stdin => Ok(Box::new(tokio::io::stdin())),
        }
    }
}

impl fmt::Display for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteSource::File(path) => write!(f, "{}", path.display()),
            ByteSource::Stdin => write!(f, "<stdin>"),
        }
    }
}

/// Where download data goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteSink {
    File(PathBuf),
    Stdout,
}

impl ByteSink {
    /// A named file if `arg` is present and non-empty, standard output otherwise
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some(name) if !name.is_empty() => ByteSink::File(PathBuf::from(name)),
            _ => ByteSink::Stdout,
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, ByteSink::Stdout)
    }

    /// Open the sink for writing, creating or truncating a named file
    pub async fn open(&self) -> Result<ObjectWriter> {
        match self {
            ByteSink::File(path) => {
                let file = tokio::fs::File::create(path)
                    .await
                    .map_err(|e| io_context(e, "Unable to open output file", path))?;
                tracing::debug!(path = %path.display(), "writing object to output file");
                Ok(Box::new(file))
            }
            ByteSink::Stdout => Ok(Box::new(tokio::io::stdout())),
        }
    }
}

impl fmt::Display for ByteSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteSink::File(path) => write!(f, "{}", path.display()),
            ByteSink::Stdout => write!(f, "<stdout>"),
        }
    }
}

fn io_context(err: std::io::Error, what: &str, path: &std::path::Path) -> Error {
    Error::Io(std::io::Error::new(
        err.kind(),
        format!("{what} {}: {err}", path.display()),
    ))
}
