use crate::flags;
use crate::info::{file_name_of, push_unique, Define, ProjectInfo};
use crate::progress::{CancelToken, ParseStatus, StatusSink};
use crate::scan;
use crate::ParseIssue;
use crossbeam_channel::Sender;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIGURE_AC: &str = "configure.ac";

/// Recursive `Makefile.am` parser.
///
/// A parser is bound to exactly one `Makefile.am`, run once through
/// [`parse`](Self::parse), and then queried for its result; it is not
/// reusable for a second file. Every `SUBDIRS` entry is handled by a fresh
/// parser instance whose result is merged into this one, so failures
/// anywhere in the tree leave the rest of the results intact.
///
/// Apart from the cancellation token, parser state must not be touched from
/// another thread while `parse()` is running.
pub struct AutomakeParser {
    makefile: PathBuf,
    directory: PathBuf,
    file_name: String,
    info: ProjectInfo,
    issues: Vec<ParseIssue>,
    cancel: CancelToken,
    status: StatusSink,
    ignored_directories: Vec<String>,
    success: bool,
    canceled_seen: bool,
    subdirs_declared: bool,
    subdirs_parsed: usize,
}

impl AutomakeParser {
    /// Bind a parser to a `Makefile.am` path.
    pub fn new(makefile: impl AsRef<Path>) -> Self {
        let makefile = makefile.as_ref().to_path_buf();
        let directory = match makefile.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = makefile
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.to_string())
            .unwrap_or_else(|| "Makefile.am".to_string());

        Self {
            makefile,
            directory,
            file_name,
            info: ProjectInfo::default(),
            issues: Vec::new(),
            cancel: CancelToken::new(),
            status: StatusSink::default(),
            ignored_directories: Vec::new(),
            success: true,
            canceled_seen: false,
            subdirs_declared: false,
            subdirs_parsed: 0,
        }
    }

    /// Register a channel that receives progress events during the parse.
    pub fn set_status_sender(&mut self, sender: Sender<ParseStatus>) {
        self.status.attach(sender);
    }

    /// Extra directory names the directory scans should skip.
    pub fn set_ignored_directories(&mut self, ignored: Vec<String>) {
        self.ignored_directories = ignored;
    }

    /// Handle for requesting cancellation, safe to use from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Request cancellation; the parse fails at its next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }

    /// Run the full parse: the bound file, recursive `SUBDIRS` descent, and
    /// the generated-`Makefile` flag pass.
    ///
    /// Returns `false` when anything along the way failed; the accessors
    /// still expose whatever was recovered.
    pub fn parse(&mut self) -> bool {
        self.status.emit(ParseStatus::File {
            file: self.makefile.clone(),
            directory: self.directory.clone(),
        });
        tracing::debug!(makefile = %self.makefile.display(), "parsing");

        let contents = match fs::read_to_string(&self.makefile) {
            Ok(contents) => contents,
            Err(source) => {
                self.issues.push(ParseIssue::RootFileUnreadable {
                    path: self.makefile.clone(),
                    source,
                });
                self.success = false;
                return false;
            }
        };

        self.info.push_makefile(self.file_name.clone());
        if self.directory.join(CONFIGURE_AC).is_file() {
            self.info.push_makefile(CONFIGURE_AC.to_string());
        }

        for line in logical_lines(&contents) {
            if line.starts_with('\t') || line.trim_start().starts_with('#') {
                continue;
            }
            match split_assignment(&line) {
                Some((key, raw_values)) => self.handle_assignment(key, raw_values),
                None => {
                    if let Some(keyword) = required_keyword(&line) {
                        self.record_malformed(keyword);
                    }
                }
            }
        }

        // Entries reaching above the project root are never resolvable
        // against it.
        self.info.sources.retain(|entry| !entry.starts_with(".."));

        if self.subdirs_declared && self.subdirs_parsed == 0 && !self.check_canceled() {
            self.issues.push(ParseIssue::SubdirsEmpty {
                path: self.makefile.clone(),
            });
            self.success = false;
        }

        // Runs even after failures so the code model still gets best-effort
        // include and define information.
        flags::harvest_generated_makefile(&self.directory, &mut self.info);

        self.check_canceled();
        self.success
    }

    pub fn makefile(&self) -> &Path {
        &self.makefile
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Aggregate result; valid once `parse()` has returned.
    pub fn info(&self) -> &ProjectInfo {
        &self.info
    }

    pub fn into_info(self) -> ProjectInfo {
        self.info
    }

    /// Diagnostics recorded along the way, in discovery order.
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    pub fn executable(&self) -> Option<&str> {
        self.info.executable.as_deref()
    }

    pub fn sources(&self) -> &[String] {
        &self.info.sources
    }

    pub fn makefiles(&self) -> &[String] {
        &self.info.makefiles
    }

    pub fn include_paths(&self) -> &[String] {
        &self.info.include_paths
    }

    pub fn defines(&self) -> &BTreeSet<Define> {
        &self.info.defines
    }

    pub fn c_flags(&self) -> &[String] {
        &self.info.c_flags
    }

    /// C++ flags; falls back to the C flags when none were collected.
    pub fn cxx_flags(&self) -> &[String] {
        self.info.cxx_flags_or_c()
    }

    fn handle_assignment(&mut self, key: &str, raw_values: &str) {
        let list = extract_values(raw_values);
        match key {
            "AM_DEFAULT_SOURCE_EXT" => self.parse_default_extensions(list),
            "bin_PROGRAMS" => {
                if list.values.len() == 1 {
                    self.info.executable = file_name_of(&list.values[0]);
                }
            }
            // Recognized but reserved; contributes nothing yet.
            "BUILT_SOURCES" => {}
            "SUBDIRS" | "DIST_SUBDIRS" => self.parse_subdirs(list),
            _ if key.ends_with("_SOURCES") || key.ends_with("_HEADERS") => {
                self.parse_source_list(list)
            }
            _ => {}
        }
    }

    fn parse_default_extensions(&mut self, list: ValueList) {
        if list.values.is_empty() {
            self.record_malformed("AM_DEFAULT_SOURCE_EXT");
            return;
        }
        self.scan_into_sources(&list.values);
    }

    fn parse_source_list(&mut self, list: ValueList) {
        if list.saw_variable {
            self.fallback_source_scan();
            return;
        }
        for value in list.values {
            self.info.push_source(value);
        }
    }

    fn parse_subdirs(&mut self, list: ValueList) {
        if list.saw_variable {
            // Same escape hatch as unresolvable source lists; no further
            // SUBDIRS handling for this assignment.
            self.fallback_source_scan();
            return;
        }
        self.subdirs_declared = true;

        let mut subdirs: Vec<String> = Vec::new();
        for value in list.values {
            if value == "." {
                // A literal `.` asks for every actual sub-directory.
                for name in scan::immediate_subdirectories(&self.directory) {
                    push_unique(&mut subdirs, name);
                }
            } else {
                push_unique(&mut subdirs, value);
            }
        }

        for subdir in subdirs {
            if self.check_canceled() {
                return;
            }
            let child_makefile = self.directory.join(&subdir).join(&self.file_name);
            if !child_makefile.is_file() {
                continue;
            }

            let mut child = AutomakeParser::new(&child_makefile);
            child.cancel = self.cancel.clone();
            child.status = self.status.clone();
            child.ignored_directories = self.ignored_directories.clone();
            if !child.parse() {
                tracing::warn!(directory = %child.directory.display(), "sub-directory parse failed");
                self.issues.push(ParseIssue::SubdirFailed {
                    directory: child.directory.clone(),
                });
                self.success = false;
            }
            self.info.merge_child(&subdir, &child.info);
            self.subdirs_parsed += 1;
        }
    }

    /// Explicit lists referencing build variables cannot be resolved
    /// statically; harvest every source file in the tree instead.
    fn fallback_source_scan(&mut self) {
        let suffixes: Vec<String> = scan::SOURCE_SUFFIXES
            .iter()
            .map(|suffix| suffix.to_string())
            .collect();
        self.scan_into_sources(&suffixes);
    }

    fn scan_into_sources(&mut self, suffixes: &[String]) {
        if self.check_canceled() {
            return;
        }
        let found = scan::directory_sources(
            &self.directory,
            suffixes,
            &self.ignored_directories,
            &self.cancel,
            &self.status,
        );
        for entry in found {
            self.info.push_source(entry);
        }
        self.check_canceled();
    }

    fn record_malformed(&mut self, keyword: &str) {
        self.issues.push(ParseIssue::MalformedAssignment {
            keyword: keyword.to_string(),
            path: self.makefile.clone(),
        });
        self.success = false;
    }

    /// Poll the cancellation flag; the first observation records the issue
    /// and marks the parse failed.
    fn check_canceled(&mut self) -> bool {
        if !self.cancel.is_canceled() {
            return false;
        }
        if !self.canceled_seen {
            self.canceled_seen = true;
            self.issues.push(ParseIssue::Canceled);
            self.success = false;
        }
        true
    }
}

struct ValueList {
    values: Vec<String>,
    saw_variable: bool,
}

/// Whitespace-split the right-hand side of an assignment, dropping tokens
/// that reference a build variable and remembering that one was seen.
fn extract_values(raw: &str) -> ValueList {
    let mut values = Vec::new();
    let mut saw_variable = false;
    for token in raw.split_whitespace() {
        if token.starts_with("$(") {
            saw_variable = true;
            continue;
        }
        values.push(token.to_string());
    }
    ValueList {
        values,
        saw_variable,
    }
}

/// Split `KEY = values` / `KEY += values` into the identifier and the raw
/// right-hand side. Identifiers are `[A-Za-z0-9_]` only.
pub(crate) fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (left, right) = line.split_once('=')?;
    let mut key = left.trim();
    if let Some(stripped) = key.strip_suffix('+') {
        key = stripped.trim_end();
    }
    if key.is_empty()
        || !key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        return None;
    }
    Some((key, right))
}

/// Keywords whose assignment must parse; anything else on a line that does
/// not look like an assignment is ignored.
fn required_keyword(line: &str) -> Option<&'static str> {
    match line.split_whitespace().next()? {
        "SUBDIRS" => Some("SUBDIRS"),
        "DIST_SUBDIRS" => Some("DIST_SUBDIRS"),
        "AM_DEFAULT_SOURCE_EXT" => Some("AM_DEFAULT_SOURCE_EXT"),
        _ => None,
    }
}

/// Fold backslash-continued physical lines into logical lines.
pub(crate) fn logical_lines(contents: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for raw_line in contents.lines() {
        let mut line = raw_line.trim_end_matches('\r');
        let mut continued = false;

        if line.trim_end().ends_with('\\') {
            continued = true;
            line = line.trim_end().trim_end_matches('\\').trim_end();
        }

        if current.is_empty() {
            current.push_str(line);
        } else {
            current.push(' ');
            current.push_str(line.trim_start());
        }

        if !continued && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    lines
}
