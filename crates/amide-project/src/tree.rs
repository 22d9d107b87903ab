use std::cmp::Ordering;

/// Node of a project file tree built from parsed relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub name: String,
    /// Path relative to the project root.
    pub path: String,
    pub is_directory: bool,
    pub children: Vec<FileNode>,
}

/// Group a flat list of relative paths into a displayable hierarchy,
/// directories first, then files, both name-ordered.
pub fn build_tree(paths: &[String]) -> Vec<FileNode> {
    let components: Vec<Vec<&str>> = paths
        .iter()
        .map(|path| {
            path.split('/')
                .filter(|part| !part.is_empty())
                .collect::<Vec<&str>>()
        })
        .filter(|parts| !parts.is_empty())
        .collect();
    build_level(&components, "")
}

fn build_level(entries: &[Vec<&str>], prefix: &str) -> Vec<FileNode> {
    let mut groups: Vec<(String, bool, Vec<Vec<&str>>)> = Vec::new();
    for parts in entries {
        let name = parts[0];
        let is_directory = parts.len() > 1;
        match groups.iter_mut().find(|group| group.0 == name) {
            Some(group) => {
                group.1 |= is_directory;
                if is_directory {
                    group.2.push(parts[1..].to_vec());
                }
            }
            None => {
                let mut tails = Vec::new();
                if is_directory {
                    tails.push(parts[1..].to_vec());
                }
                groups.push((name.to_string(), is_directory, tails));
            }
        }
    }

    let mut nodes: Vec<FileNode> = Vec::new();
    for (name, is_directory, tails) in groups {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        let children = if is_directory {
            build_level(&tails, &path)
        } else {
            Vec::new()
        };
        nodes.push(FileNode {
            name,
            path,
            is_directory,
            children,
        });
    }

    nodes.sort_by(|a, b| match (a.is_directory, b.is_directory) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|entry| entry.to_string()).collect()
    }

    #[test]
    fn flat_paths_become_leaf_nodes() {
        let tree = build_tree(&paths(&["main.cpp", "Makefile.am"]));
        let names: Vec<&str> = tree.iter().map(|node| node.name.as_str()).collect();
        assert_eq!(names, vec!["Makefile.am", "main.cpp"]);
        assert!(tree.iter().all(|node| !node.is_directory));
    }

    #[test]
    fn nested_paths_share_directory_nodes() {
        let tree = build_tree(&paths(&[
            "sub/a.cpp",
            "sub/b.cpp",
            "sub/inner/c.cpp",
            "main.cpp",
        ]));

        assert_eq!(tree.len(), 2);
        let sub = &tree[0];
        assert_eq!(sub.name, "sub");
        assert!(sub.is_directory);
        assert_eq!(sub.path, "sub");
        assert_eq!(sub.children.len(), 3);
        assert_eq!(sub.children[0].name, "inner");
        assert_eq!(sub.children[0].children[0].path, "sub/inner/c.cpp");
        assert_eq!(tree[1].name, "main.cpp");
    }

    #[test]
    fn directories_sort_before_files() {
        let tree = build_tree(&paths(&["zz.cpp", "aa/b.cpp"]));
        assert!(tree[0].is_directory);
        assert_eq!(tree[0].name, "aa");
        assert_eq!(tree[1].name, "zz.cpp");
    }

    #[test]
    fn empty_input_yields_empty_tree() {
        assert!(build_tree(&[]).is_empty());
    }
}
