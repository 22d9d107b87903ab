//! Wiring between parsed Automake data and its editor-side consumers
//!
//! [`AutotoolsProject`] runs an [`AutomakeParser`] over a project's root
//! `Makefile.am` and repackages the result for the two callers an editor
//! has: a project tree ([`FileNode`] hierarchy plus the files worth
//! watching) and a C/C++ code model ([`CodeModelConfig`]).
//!
//! A project that parsed incompletely is still usable: whatever was
//! recovered is exposed, and [`AutotoolsProject::is_fully_parsed`] tells the
//! caller to surface a warning.

mod tree;

pub use tree::{build_tree, FileNode};

use amide_automake::{AutomakeParser, Define, ProjectInfo};
use amide_config::ScanConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("no Makefile.am at {path:?}")]
    MissingMakefile { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, ProjectError>;

/// An Autotools project rooted at a `Makefile.am`.
#[derive(Debug)]
pub struct AutotoolsProject {
    name: String,
    root_dir: PathBuf,
    makefile: PathBuf,
    info: ProjectInfo,
    fully_parsed: bool,
}

impl AutotoolsProject {
    /// Load a project from its root `Makefile.am`, applying the scan
    /// configuration found in the project directory (if any).
    pub fn load(makefile: impl AsRef<Path>) -> Result<Self> {
        let makefile = makefile.as_ref();
        let root = match makefile.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let config = ScanConfig::load_or_default(root).unwrap_or_default();
        Self::load_with_config(makefile, &config)
    }

    pub fn load_with_config(makefile: impl AsRef<Path>, config: &ScanConfig) -> Result<Self> {
        let makefile = makefile.as_ref();
        if !makefile.is_file() {
            return Err(ProjectError::MissingMakefile {
                path: makefile.to_path_buf(),
            });
        }
        let root_dir = match makefile.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut parser = AutomakeParser::new(makefile);
        parser.set_ignored_directories(
            config.ignored_directories().map(str::to_string).collect(),
        );
        let fully_parsed = parser.parse();
        if !fully_parsed {
            tracing::warn!(makefile = %makefile.display(), "project parsed incompletely");
        }

        let name = config
            .name
            .clone()
            .or_else(|| {
                root_dir
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.to_string())
            })
            .unwrap_or_else(|| "autotools project".to_string());

        Ok(Self {
            name,
            root_dir,
            makefile: makefile.to_path_buf(),
            info: parser.into_info(),
            fully_parsed,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn makefile(&self) -> &Path {
        &self.makefile
    }

    /// Parsed data; possibly partial when [`is_fully_parsed`](Self::is_fully_parsed)
    /// reports `false`.
    pub fn info(&self) -> &ProjectInfo {
        &self.info
    }

    pub fn is_fully_parsed(&self) -> bool {
        self.fully_parsed
    }

    /// Displayable hierarchy of the project's files and sources.
    pub fn file_tree(&self) -> Vec<FileNode> {
        let mut paths = self.info.makefiles.clone();
        for source in &self.info.sources {
            if !paths.contains(source) {
                paths.push(source.clone());
            }
        }
        build_tree(&paths)
    }

    /// Absolute paths a caller should keep file-system watches on: every
    /// `Makefile.am` in the tree plus `configure.ac` when present.
    pub fn watch_files(&self) -> Vec<PathBuf> {
        self.info
            .makefiles
            .iter()
            .map(|relative| self.root_dir.join(relative))
            .collect()
    }

    /// Configuration for a C/C++ code-model collaborator.
    ///
    /// The project root itself is always the first include path.
    pub fn code_model(&self) -> CodeModelConfig {
        let mut include_paths = vec![self.root_dir.clone()];
        for path in &self.info.include_paths {
            let path = PathBuf::from(path);
            if !include_paths.contains(&path) {
                include_paths.push(path);
            }
        }

        let source_files = self
            .info
            .sources
            .iter()
            .filter(|relative| is_c_family(relative))
            .map(|relative| self.root_dir.join(relative))
            .collect();

        CodeModelConfig {
            include_paths,
            defines: self.info.defines.iter().cloned().collect(),
            c_flags: self.info.c_flags.clone(),
            cxx_flags: self.info.cxx_flags_or_c().to_vec(),
            source_files,
        }
    }
}

/// Everything a C/C++ indexer needs to configure parsing of the project.
#[derive(Debug, Clone)]
pub struct CodeModelConfig {
    pub include_paths: Vec<PathBuf>,
    pub defines: Vec<Define>,
    pub c_flags: Vec<String>,
    pub cxx_flags: Vec<String>,
    pub source_files: Vec<PathBuf>,
}

fn is_c_family(path: &str) -> bool {
    const EXTENSIONS: &[&str] = &[
        "c", "cc", "cpp", "cxx", "ccg", "h", "hh", "hg", "hxx", "hpp",
    ];
    Path::new(path)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn fixture(root: &Path) {
        write(
            &root.join("Makefile.am"),
            "bin_PROGRAMS = demo\nSUBDIRS = sub\ndemo_SOURCES = main.cpp notes.txt\n",
        );
        write(&root.join("sub/Makefile.am"), "a_SOURCES = a.cpp\n");
        write(&root.join("Makefile"), "CXXFLAGS = -DDEMO=1 -Wall\n");
        write(&root.join("configure.ac"), "AC_INIT([demo], [1.0])\n");
    }

    #[test]
    fn load_fails_without_a_makefile() {
        let dir = tempdir().unwrap();
        let err = AutotoolsProject::load(dir.path().join("Makefile.am")).unwrap_err();
        assert!(matches!(err, ProjectError::MissingMakefile { .. }));
    }

    #[test]
    fn load_names_the_project_after_its_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("demo-project");
        fs::create_dir_all(&root).unwrap();
        fixture(&root);

        let project = AutotoolsProject::load(root.join("Makefile.am")).unwrap();
        assert_eq!(project.name(), "demo-project");
        assert!(project.is_fully_parsed());
    }

    #[test]
    fn configured_name_wins_over_the_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fixture(root);
        let mut config = ScanConfig::default();
        config.name = Some("renamed".to_string());
        config.save(root).unwrap();

        let project = AutotoolsProject::load(root.join("Makefile.am")).unwrap();
        assert_eq!(project.name(), "renamed");
    }

    #[test]
    fn watch_files_are_absolute() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fixture(root);

        let project = AutotoolsProject::load(root.join("Makefile.am")).unwrap();
        let watched = project.watch_files();
        assert!(watched.contains(&root.join("Makefile.am")));
        assert!(watched.contains(&root.join("configure.ac")));
        assert!(watched.contains(&root.join("sub/Makefile.am")));
        assert!(watched.iter().all(|path| path.is_absolute()));
    }

    #[test]
    fn file_tree_groups_subdirectories() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fixture(root);

        let project = AutotoolsProject::load(root.join("Makefile.am")).unwrap();
        let tree = project.file_tree();
        let sub = tree
            .iter()
            .find(|node| node.name == "sub")
            .expect("sub directory node");
        assert!(sub.is_directory);
        assert!(sub.children.iter().any(|node| node.name == "a.cpp"));
        assert!(tree.iter().any(|node| node.name == "main.cpp"));
    }

    #[test]
    fn code_model_starts_with_the_project_root_and_filters_sources() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fixture(root);

        let project = AutotoolsProject::load(root.join("Makefile.am")).unwrap();
        let model = project.code_model();
        assert_eq!(model.include_paths[0], root.to_path_buf());
        assert!(model.defines.iter().any(|define| define.name == "DEMO"));
        assert_eq!(model.cxx_flags, vec!["-Wall"]);
        assert!(model.source_files.contains(&root.join("main.cpp")));
        assert!(model.source_files.contains(&root.join("sub/a.cpp")));
        assert!(!model
            .source_files
            .iter()
            .any(|path| path.ends_with("notes.txt")));
    }

    #[test]
    fn partial_projects_keep_what_was_recovered() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("Makefile.am"),
            "SUBDIRS = missing\napp_SOURCES = app.cpp\n",
        );

        let project = AutotoolsProject::load(root.join("Makefile.am")).unwrap();
        assert!(!project.is_fully_parsed());
        assert!(project.info().sources.contains(&"app.cpp".to_string()));
    }
}
