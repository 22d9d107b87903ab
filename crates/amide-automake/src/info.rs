use std::collections::BTreeSet;
use std::path::Path;

/// A preprocessor definition recovered from a `-D` token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Define {
    pub name: String,
    pub value: Option<String>,
}

impl Define {
    /// Parse the body of a `-D` token (`NAME` or `NAME=VALUE`).
    ///
    /// Bodies that are empty or still contain an unresolved `$(...)`
    /// reference yield nothing.
    pub fn from_token(body: &str) -> Option<Self> {
        let body = body.trim();
        if body.is_empty() || body.contains("$(") {
            return None;
        }
        match body.split_once('=') {
            Some((name, value)) => Some(Self {
                name: name.to_string(),
                value: Some(value.to_string()),
            }),
            None => Some(Self {
                name: body.to_string(),
                value: None,
            }),
        }
    }
}

/// Aggregate result of one `Makefile.am` parse, including everything merged
/// up from `SUBDIRS` children.
///
/// `sources` and `makefiles` hold paths relative to the directory of the
/// `Makefile.am` the parse was bound to; `include_paths` are absolute.
/// All list fields keep first-occurrence order with duplicates removed.
#[derive(Debug, Clone, Default)]
pub struct ProjectInfo {
    pub executable: Option<String>,
    pub sources: Vec<String>,
    pub makefiles: Vec<String>,
    pub include_paths: Vec<String>,
    pub defines: BTreeSet<Define>,
    pub c_flags: Vec<String>,
    pub cxx_flags: Vec<String>,
}

impl ProjectInfo {
    /// C++ flags, falling back to the C flags when none were collected.
    pub fn cxx_flags_or_c(&self) -> &[String] {
        if self.cxx_flags.is_empty() {
            &self.c_flags
        } else {
            &self.cxx_flags
        }
    }

    pub(crate) fn push_source(&mut self, entry: String) {
        push_unique(&mut self.sources, entry);
    }

    pub(crate) fn push_makefile(&mut self, entry: String) {
        push_unique(&mut self.makefiles, entry);
    }

    pub(crate) fn push_include_path(&mut self, entry: String) {
        push_unique(&mut self.include_paths, entry);
    }

    pub(crate) fn push_c_flag(&mut self, entry: String) {
        push_unique(&mut self.c_flags, entry);
    }

    pub(crate) fn push_cxx_flag(&mut self, entry: String) {
        push_unique(&mut self.cxx_flags, entry);
    }

    /// Merge a finished child parse into this record, prefixing the child's
    /// relative paths with its sub-directory name.
    ///
    /// The child's executable (if any) is not propagated; only the top-level
    /// `bin_PROGRAMS` names the project's executable.
    pub(crate) fn merge_child(&mut self, subdir: &str, child: &ProjectInfo) {
        for source in &child.sources {
            self.push_source(format!("{subdir}/{source}"));
        }
        for makefile in &child.makefiles {
            self.push_makefile(format!("{subdir}/{makefile}"));
        }
        for path in &child.include_paths {
            self.push_include_path(path.clone());
        }
        self.defines.extend(child.defines.iter().cloned());
        for flag in &child.c_flags {
            self.push_c_flag(flag.clone());
        }
        for flag in child.cxx_flags_or_c() {
            self.push_cxx_flag(flag.to_string());
        }
    }
}

pub(crate) fn push_unique(list: &mut Vec<String>, entry: String) {
    if !list.contains(&entry) {
        list.push(entry);
    }
}

/// Base file name of a target value (`tools/frobnicate` yields `frobnicate`).
pub(crate) fn file_name_of(value: &str) -> Option<String> {
    Path::new(value)
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_without_value() {
        let define = Define::from_token("HAVE_CONFIG_H").unwrap();
        assert_eq!(define.name, "HAVE_CONFIG_H");
        assert_eq!(define.value, None);
    }

    #[test]
    fn define_with_value() {
        let define = Define::from_token("VERSION=\"1.2\"").unwrap();
        assert_eq!(define.name, "VERSION");
        assert_eq!(define.value.as_deref(), Some("\"1.2\""));
    }

    #[test]
    fn define_rejects_empty_and_unresolved() {
        assert!(Define::from_token("").is_none());
        assert!(Define::from_token("  ").is_none());
        assert!(Define::from_token("$(DEFS)").is_none());
    }

    #[test]
    fn push_source_deduplicates() {
        let mut info = ProjectInfo::default();
        info.push_source("main.cpp".to_string());
        info.push_source("helper.cpp".to_string());
        info.push_source("main.cpp".to_string());
        assert_eq!(info.sources, vec!["main.cpp", "helper.cpp"]);
    }

    #[test]
    fn merge_child_prefixes_relative_paths() {
        let mut child = ProjectInfo::default();
        child.push_source("a.cpp".to_string());
        child.push_makefile("Makefile.am".to_string());
        child.push_include_path("/opt/include".to_string());
        child.defines.insert(Define {
            name: "CHILD".to_string(),
            value: None,
        });
        child.executable = Some("ignored".to_string());

        let mut parent = ProjectInfo::default();
        parent.push_makefile("Makefile.am".to_string());
        parent.merge_child("sub", &child);

        assert_eq!(parent.sources, vec!["sub/a.cpp"]);
        assert_eq!(parent.makefiles, vec!["Makefile.am", "sub/Makefile.am"]);
        assert_eq!(parent.include_paths, vec!["/opt/include"]);
        assert!(parent.defines.iter().any(|define| define.name == "CHILD"));
        assert_eq!(parent.executable, None);
    }

    #[test]
    fn merge_child_applies_cxx_fallback() {
        let mut child = ProjectInfo::default();
        child.push_c_flag("-Wall".to_string());

        let mut parent = ProjectInfo::default();
        parent.merge_child("sub", &child);

        assert_eq!(parent.c_flags, vec!["-Wall"]);
        assert_eq!(parent.cxx_flags, vec!["-Wall"]);
    }

    #[test]
    fn cxx_fallback_accessor() {
        let mut info = ProjectInfo::default();
        info.push_c_flag("-O2".to_string());
        assert_eq!(info.cxx_flags_or_c(), ["-O2".to_string()]);

        info.push_cxx_flag("-std=c++17".to_string());
        assert_eq!(info.cxx_flags_or_c(), ["-std=c++17".to_string()]);
    }

    #[test]
    fn file_name_of_strips_directories() {
        assert_eq!(file_name_of("tools/frobnicate").as_deref(), Some("frobnicate"));
        assert_eq!(file_name_of("frobnicate").as_deref(), Some("frobnicate"));
    }
}
