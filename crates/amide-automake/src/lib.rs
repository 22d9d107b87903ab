//! Autotools project recovery without running `make`
//!
//! This crate parses a project's `Makefile.am`, follows `SUBDIRS` into child
//! directories, and aggregates everything an editor needs to present the
//! project and configure a C/C++ code model: source and header files, the
//! project files themselves, include paths, preprocessor defines, and
//! compiler flags. A secondary pass over the sibling generated `Makefile`
//! (when one exists) recovers `DEFS`/`*INCLUDES`/`*CFLAGS`/`*CXXFLAGS`
//! values that only exist after `configure` has run.
//!
//! Parsing is deliberately forgiving: a broken or partially-resolvable
//! project still yields whatever could be recovered, and the overall outcome
//! is a plain `bool` plus a list of [`ParseIssue`] diagnostics.
//!
//! # Example
//!
//! ```no_run
//! use amide_automake::AutomakeParser;
//!
//! let mut parser = AutomakeParser::new("project/Makefile.am");
//! let complete = parser.parse();
//! for source in parser.sources() {
//!     println!("{source}");
//! }
//! if !complete {
//!     for issue in parser.issues() {
//!         eprintln!("warning: {issue}");
//!     }
//! }
//! ```

mod flags;
mod info;
mod parser;
mod progress;
mod scan;

pub use info::{Define, ProjectInfo};
pub use parser::AutomakeParser;
pub use progress::{CancelToken, ParseStatus};

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Problems recorded while parsing.
///
/// None of these abort the traversal; the parser keeps whatever partial
/// results it has accumulated and reports the overall outcome as a boolean.
#[derive(Debug, Error)]
pub enum ParseIssue {
    #[error("cannot read {path:?}: {source}")]
    RootFileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed {keyword} assignment in {path:?}")]
    MalformedAssignment { keyword: String, path: PathBuf },
    #[error("SUBDIRS in {path:?} resolved to no directories")]
    SubdirsEmpty { path: PathBuf },
    #[error("failed to parse sub-directory {directory:?}")]
    SubdirFailed { directory: PathBuf },
    #[error("parse canceled")]
    Canceled,
}
