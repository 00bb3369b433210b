use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::ir::{DependencyGraph, NodeId, NodeNaming};

static INCLUDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*#\s*include\s*["<]([^"<>]+)[">]"#).unwrap());

pub const DEFAULT_EXTENSIONS: [&str; 3] = ["cpp", "hpp", "h"];

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    /// Allowed extensions, without the leading dot.
    pub extensions: Vec<String>,
    pub exclude: Option<Regex>,
    /// Drop includes that do not name one of the scanned files.
    pub ignore_external: bool,
    /// Drop includes without a file extension (`<vector>`, `<cstdio>`).
    pub ignore_std: bool,
    pub naming: NodeNaming,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            exclude: None,
            ignore_external: false,
            ignore_std: false,
            naming: NodeNaming::Stem,
        }
    }

    /// An empty pattern disables exclusion.
    pub fn with_exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude = compile_exclude(pattern)?;
        Ok(self)
    }

    fn is_excluded(&self, text: &str) -> bool {
        self.exclude.as_ref().is_some_and(|re| re.is_match(text))
    }

    fn has_valid_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }
}

pub fn compile_exclude(pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Ok(Some(Regex::new(pattern)?))
}

struct SourceFile {
    path: PathBuf,
    id: NodeId,
}

/// Walk `options.root` and collect the include graph of every matching file.
///
/// Fails before reading anything when the root is missing or not a
/// directory, and aborts on the first unreadable source file.
pub fn scan_sources(options: &ScanOptions) -> Result<DependencyGraph> {
    let root = resolve_root(&options.root)?;
    let mut graph = DependencyGraph::new();
    let mut sources = Vec::new();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !options.has_valid_extension(path) {
            continue;
        }
        let absolute = path.to_string_lossy();
        if options.is_excluded(&absolute) {
            debug!(path = %absolute, "excluded");
            continue;
        }
        let id = file_id(path, &root, options.naming);
        let folder = path.parent().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
        graph.add_file(folder, &id);
        sources.push(SourceFile {
            path: path.to_path_buf(),
            id,
        });
    }

    sources.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(files = sources.len(), root = %root.display(), "collected source files");

    for source in &sources {
        let bytes = std::fs::read(&source.path).map_err(|err| Error::ReadSource {
            path: source.path.clone(),
            source: err,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        for included in parse_includes(&content) {
            let Some(target) = filter_include(included, &source.id, &graph, options) else {
                continue;
            };
            graph.add_edge(&source.id, &target);
        }
    }

    Ok(graph)
}

/// Paths captured by include directives, in line order.
pub fn parse_includes(content: &str) -> Vec<&str> {
    content
        .lines()
        .filter_map(|line| INCLUDE_RE.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|path| !path.is_empty())
        .collect()
}

fn filter_include(
    included: &str,
    including: &str,
    graph: &DependencyGraph,
    options: &ScanOptions,
) -> Option<NodeId> {
    let id = resolve_include(included, including, graph, options.naming);
    if options.ignore_std && Path::new(included).extension().is_none() {
        return None;
    }
    if options.ignore_external && !graph.is_own(&id) {
        return None;
    }
    if options.is_excluded(&id) || options.is_excluded(included) {
        return None;
    }
    Some(id)
}

fn resolve_root(root: &Path) -> Result<PathBuf> {
    let canonical = root.canonicalize().map_err(|err| Error::SourceRoot {
        path: root.to_path_buf(),
        source: err,
    })?;
    if !canonical.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    std::fs::read_dir(&canonical).map_err(|err| Error::SourceRoot {
        path: root.to_path_buf(),
        source: err,
    })?;
    Ok(canonical)
}

pub fn file_id(path: &Path, root: &Path, naming: NodeNaming) -> NodeId {
    match naming {
        NodeNaming::Stem => stem(path),
        NodeNaming::FileName => path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        NodeNaming::RelativePath => {
            let rel = path.strip_prefix(root).unwrap_or(path);
            rel.components()
                .map(|part| part.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        }
    }
}

pub fn include_id(included: &str, naming: NodeNaming) -> NodeId {
    let normalized = included.replace('\\', "/");
    match naming {
        NodeNaming::Stem => stem(Path::new(&normalized)),
        NodeNaming::FileName => normalized
            .rsplit('/')
            .next()
            .unwrap_or(normalized.as_str())
            .to_string(),
        NodeNaming::RelativePath => normalized,
    }
}

/// Id of the file named by `included` inside `including`.
///
/// With relative-path naming the include is looked up next to the including
/// file first, then from the source root, the way a compiler searches quoted
/// includes. An include naming no scanned file keeps its own text.
pub fn resolve_include(
    included: &str,
    including: &str,
    graph: &DependencyGraph,
    naming: NodeNaming,
) -> NodeId {
    let id = include_id(included, naming);
    if naming != NodeNaming::RelativePath {
        return id;
    }
    let sibling = including
        .rsplit_once('/')
        .map(|(folder, _)| format!("{folder}/{id}"))
        .unwrap_or_else(|| id.clone());
    let found = [sibling.as_str(), id.as_str()]
        .into_iter()
        .filter_map(normalize_relative)
        .find(|candidate| graph.is_own(candidate));
    found.unwrap_or(id)
}

/// Collapse `.` and `..` segments of a `/`-separated path. `None` when the
/// path climbs above its start.
fn normalize_relative(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            _ => parts.push(part),
        }
    }
    Some(parts.join("/"))
}

fn stem(path: &Path) -> NodeId {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn parses_quoted_and_angled_includes() {
        let src = "#include \"a.hpp\"\n  #  include <vector>\n// #include \"no.hpp\"\n#include\"b/c.h\"\nint x;\n#include <>\n";
        assert_eq!(parse_includes(src), vec!["a.hpp", "vector", "b/c.h"]);
    }

    #[test]
    fn include_ids_follow_naming() {
        assert_eq!(include_id("dir/foo.hpp", NodeNaming::Stem), "foo");
        assert_eq!(include_id("dir\\foo.hpp", NodeNaming::FileName), "foo.hpp");
        assert_eq!(include_id("dir/foo.hpp", NodeNaming::RelativePath), "dir/foo.hpp");
        assert_eq!(include_id("vector", NodeNaming::Stem), "vector");
    }

    #[test]
    fn file_ids_follow_naming() {
        let root = Path::new("/proj");
        let path = Path::new("/proj/src/foo.cpp");
        assert_eq!(file_id(path, root, NodeNaming::Stem), "foo");
        assert_eq!(file_id(path, root, NodeNaming::FileName), "foo.cpp");
        assert_eq!(file_id(path, root, NodeNaming::RelativePath), "src/foo.cpp");
    }

    #[test]
    fn empty_exclude_disables_filtering() {
        assert!(compile_exclude("").unwrap().is_none());
        assert!(compile_exclude("(").is_err());
    }

    #[test]
    fn scans_tree_and_filters_extensions() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.hpp", "#include \"b.hpp\"\n#include <vector>\n");
        write(dir.path(), "b.hpp", "int b;\n");
        write(dir.path(), "notes.txt", "#include \"a.hpp\"\n");
        let graph = scan_sources(&ScanOptions::new(dir.path())).unwrap();
        let nodes: Vec<&str> = graph.nodes.iter().map(String::as_str).collect();
        assert_eq!(nodes, vec!["a", "b", "vector"]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.folders.len(), 1);
    }

    #[test]
    fn ignore_std_drops_extensionless_includes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.cpp", "#include <vector>\n#include <stdio.h>\n");
        let mut options = ScanOptions::new(dir.path());
        options.ignore_std = true;
        let graph = scan_sources(&options).unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].to, "stdio");
    }

    #[test]
    fn duplicate_includes_produce_duplicate_edges() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.cpp", "#include \"b.h\"\n#include \"b.h\"\n");
        write(dir.path(), "b.h", "");
        let graph = scan_sources(&ScanOptions::new(dir.path())).unwrap();
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = scan_sources(&ScanOptions::new(dir.path().join("missing"))).unwrap_err();
        assert!(matches!(err, Error::SourceRoot { .. }));
    }

    #[test]
    fn relative_includes_resolve_against_including_folder() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/a.cpp", "#include \"a.hpp\"\n#include \"../lib/util.h\"\n");
        write(dir.path(), "src/a.hpp", "#include \"lib/util.h\"\n#include <vector>\n");
        write(dir.path(), "lib/util.h", "");
        let mut options = ScanOptions::new(dir.path());
        options.naming = NodeNaming::RelativePath;

        let graph = scan_sources(&options).unwrap();
        let nodes: Vec<&str> = graph.nodes.iter().map(String::as_str).collect();
        assert_eq!(nodes, vec!["lib/util.h", "src/a.cpp", "src/a.hpp", "vector"]);
        let edges: Vec<(&str, &str)> = graph
            .edges
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("src/a.cpp", "src/a.hpp"),
                ("src/a.cpp", "lib/util.h"),
                ("src/a.hpp", "lib/util.h"),
                ("src/a.hpp", "vector"),
            ]
        );

        options.ignore_external = true;
        let graph = scan_sources(&options).unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert!(!graph.nodes.contains("vector"));
    }

    #[test]
    fn relative_paths_normalize_dot_segments() {
        assert_eq!(normalize_relative("src/./../lib/a.h").as_deref(), Some("lib/a.h"));
        assert_eq!(normalize_relative("../a.h"), None);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_source_aborts_the_scan() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.hpp", "#include \"b.hpp\"\n");
        write(dir.path(), "b.hpp", "");
        let locked = dir.path().join("b.hpp");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Privileged users read through the mode bits.
        if fs::read(&locked).is_ok() {
            return;
        }

        let result = scan_sources(&ScanOptions::new(dir.path()));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        match result {
            Err(Error::ReadSource { path, .. }) => assert!(path.ends_with("b.hpp")),
            other => panic!("expected ReadSource, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_root_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "tree/a.hpp", "");
        let root = dir.path().join("tree");
        fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&root).is_ok() {
            fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = scan_sources(&ScanOptions::new(&root));
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(matches!(result, Err(Error::SourceRoot { .. })));
    }

    #[test]
    fn file_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.cpp", "");
        let err = scan_sources(&ScanOptions::new(dir.path().join("a.cpp"))).unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
    }
}
