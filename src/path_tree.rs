use log::warn;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// A node in a directory tree built from relative paths.
///
/// Serializes the way the frontend expects: a file is `null`, a directory is
/// a JSON object keyed by child name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
    Leaf,
    Directory(BTreeMap<String, PathNode>),
}

impl PathNode {
    pub fn is_dir(&self) -> bool {
        matches!(self, PathNode::Directory(_))
    }
}

impl Serialize for PathNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PathNode::Leaf => serializer.serialize_unit(),
            PathNode::Directory(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (name, child) in children {
                    map.serialize_entry(name, child)?;
                }
                map.end()
            }
        }
    }
}

/// Builds a nested directory tree from forward-slash relative paths, as
/// reported by a browser directory picker (`webkitRelativePath`).
///
/// Intermediate segments become directories, the final segment a file. The
/// first occurrence of a segment wins: later paths reuse the existing node
/// and never change its kind. Paths are taken as-is, with no `.`/`..` or
/// leading-slash normalization.
pub fn build_path_tree<'a, I>(paths: I) -> BTreeMap<String, PathNode>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut root = BTreeMap::new();
    'paths: for path in paths {
        let segments: Vec<&str> = path.split('/').collect();
        let (last, dirs) = match segments.split_last() {
            Some(parts) => parts,
            None => continue,
        };
        let mut node = &mut root;
        for segment in dirs {
            let child = node
                .entry((*segment).to_string())
                .or_insert_with(|| PathNode::Directory(BTreeMap::new()));
            match child {
                PathNode::Directory(children) => node = children,
                PathNode::Leaf => {
                    // A file with this name already exists; descending through
                    // it would corrupt the tree, so the path is dropped.
                    warn!("Path '{}' conflicts with an existing file entry '{}'", path, segment);
                    continue 'paths;
                }
            }
        }
        node.entry((*last).to_string()).or_insert(PathNode::Leaf);
    }
    root
}
