//! Error type shared by all stages of building a binary taxonomy tree.
//!
//! Non-fatal conditions (merged identifiers, unresolvable path elements)
//! are logged instead, see [crate::model::count_tree].

use std::io;
use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

// =#========================================================================#=
// ERROR
// =#========================================================================#=
/// Errors that can occur while reading inputs, converting trees, or
/// reading/writing the serialized tree format.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O failure on a named file.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A line of the identifier list is not a non-negative integer.
    #[error("Invalid taxid {content:?} in {source_name} at line {line}")]
    InvalidTaxid {
        source_name: String,
        line: usize,
        content: String,
    },

    /// A line of an input could not be read (I/O failure or invalid UTF-8).
    #[error("Cannot read line {line} of {source_name}: {source}")]
    UnreadableLine {
        source_name: String,
        line: usize,
        #[source]
        source: io::Error,
    },

    /// A record of an NCBI dump file could not be parsed.
    #[error("Invalid record in {source_name} at line {line} - {msg}")]
    InvalidDumpRecord {
        source_name: String,
        line: usize,
        msg: String,
    },

    /// `nodes.dmp` did not contain a record that is its own parent.
    #[error("No root found in {0} (no record is its own parent)")]
    MissingTaxonomyRoot(String),

    /// Nothing to build a tree from.
    #[error("No taxids to build a tree from")]
    EmptyInput,

    /// The balanced split produced an empty side; internal consistency error.
    #[error("Balanced split of {num_members} members (total count {total}) left a group empty")]
    EmptySplitGroup { num_members: usize, total: u64 },

    /// A serialized tree file is not well-formed.
    #[error("Malformed tree file at line {line} - {msg}")]
    MalformedTree { line: usize, msg: String },
}

impl Error {
    /// Wraps an [io::Error] together with the path it occurred on.
    pub fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Convenience constructor for [Error::MalformedTree].
    pub(crate) fn malformed_tree<S: Into<String>>(line: usize, msg: S) -> Self {
        Error::MalformedTree {
            line,
            msg: msg.into(),
        }
    }
}
