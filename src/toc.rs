//! Table-of-contents tree and its flattened form for the drawer list.
//!
//! The EPUB parser hands back a tree of navigation points. The drawer wants a
//! flat list, so the tree is walked once in pre-order when the book is opened
//! and every entry keeps its depth for indentation.

use epub::doc::NavPoint;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A node in the table-of-contents tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocNode {
    pub title: String,
    /// Resource path inside the archive, without any `#fragment`.
    pub target: PathBuf,
    pub fragment: Option<String>,
    pub children: Vec<TocNode>,
}

impl TocNode {
    pub fn new(title: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            target: target.into(),
            fragment: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TocNode>) -> Self {
        self.children = children;
        self
    }

    /// Convert the parser's navigation tree, splitting anchors off the content path.
    pub fn from_nav_points(points: &[NavPoint]) -> Vec<TocNode> {
        points
            .iter()
            .map(|point| {
                let (target, fragment) = split_fragment(&point.content);
                let mut node = TocNode::new(point.label.trim(), target)
                    .with_children(TocNode::from_nav_points(&point.children));
                node.fragment = fragment;
                node
            })
            .collect()
    }
}

/// One row of the flattened table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub target: PathBuf,
    pub fragment: Option<String>,
    pub depth: usize,
    pub spine_position: Option<usize>,
}

/// Flatten the tree in pre-order. A missing tree yields no entries.
pub fn flatten(nodes: Option<&[TocNode]>) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    if let Some(nodes) = nodes {
        push_entries(nodes, 0, &mut entries);
    }
    entries
}

fn push_entries(nodes: &[TocNode], depth: usize, out: &mut Vec<TocEntry>) {
    for node in nodes {
        out.push(TocEntry {
            title: node.title.clone(),
            target: node.target.clone(),
            fragment: node.fragment.clone(),
            depth,
            spine_position: None,
        });
        push_entries(&node.children, depth + 1, out);
    }
}

/// Attach the spine index of each entry's target resource.
pub fn resolve_positions(entries: &mut [TocEntry], spine_paths: &[PathBuf]) {
    for entry in entries.iter_mut() {
        entry.spine_position = spine_paths.iter().position(|path| path == &entry.target);
        if entry.spine_position.is_none() {
            debug!(
                title = %entry.title,
                target = %entry.target.display(),
                "TOC entry does not point at a spine resource"
            );
        }
    }
}

fn split_fragment(content: &Path) -> (PathBuf, Option<String>) {
    let raw = content.to_string_lossy();
    match raw.split_once('#') {
        Some((path, fragment)) if !fragment.is_empty() => {
            (PathBuf::from(path), Some(fragment.to_string()))
        }
        Some((path, _)) => (PathBuf::from(path), None),
        None => (content.to_path_buf(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Vec<TocNode> {
        vec![
            TocNode::new("Part One", "OEBPS/part1.xhtml").with_children(vec![
                TocNode::new("Chapter 1", "OEBPS/ch1.xhtml"),
                TocNode::new("Chapter 2", "OEBPS/ch2.xhtml")
                    .with_children(vec![TocNode::new("Interlude", "OEBPS/ch2b.xhtml")]),
            ]),
            TocNode::new("Part Two", "OEBPS/part2.xhtml"),
        ]
    }

    #[test]
    fn flattens_in_pre_order_with_depth() {
        let tree = sample_tree();
        let flat = flatten(Some(tree.as_slice()));
        let titles: Vec<_> = flat.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Part One", "Chapter 1", "Chapter 2", "Interlude", "Part Two"]
        );
        let depths: Vec<_> = flat.iter().map(|e| e.depth).collect();
        assert_eq!(depths, [0, 1, 1, 2, 0]);
    }

    #[test]
    fn missing_tree_is_empty() {
        assert!(flatten(None).is_empty());
        let empty: Vec<TocNode> = Vec::new();
        assert!(flatten(Some(empty.as_slice())).is_empty());
    }

    #[test]
    fn flattening_is_deterministic() {
        let tree = sample_tree();
        assert_eq!(flatten(Some(tree.as_slice())), flatten(Some(tree.as_slice())));
    }

    #[test]
    fn resolves_spine_positions_by_target() {
        let tree = sample_tree();
        let mut flat = flatten(Some(tree.as_slice()));
        let spine = vec![
            PathBuf::from("OEBPS/ch1.xhtml"),
            PathBuf::from("OEBPS/ch2.xhtml"),
            PathBuf::from("OEBPS/part2.xhtml"),
        ];
        resolve_positions(&mut flat, &spine);
        let positions: Vec<_> = flat.iter().map(|e| e.spine_position).collect();
        assert_eq!(positions, [None, Some(0), Some(1), None, Some(2)]);
    }

    #[test]
    fn splits_anchor_from_content_path() {
        let (path, fragment) = split_fragment(Path::new("OEBPS/ch1.xhtml#sec-2"));
        assert_eq!(path, PathBuf::from("OEBPS/ch1.xhtml"));
        assert_eq!(fragment.as_deref(), Some("sec-2"));

        let (path, fragment) = split_fragment(Path::new("OEBPS/ch1.xhtml#"));
        assert_eq!(path, PathBuf::from("OEBPS/ch1.xhtml"));
        assert!(fragment.is_none());
    }
}
