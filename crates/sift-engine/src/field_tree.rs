use bson::{Bson, Document};

use crate::error::EngineError;
use crate::path::{self, Path};

/// A pre-built tree of field-list projection paths.
///
/// Given `["address.city", "address.zip", "name"]`, builds:
/// ```text
/// [ ("address", Branch([ ("city", Leaf(address.city)), ("zip", Leaf(address.zip)) ])),
///   ("name", Leaf(name)) ]
/// ```
///
/// Built once per query, reused across all documents. Order follows the
/// first appearance of each key. Each Leaf carries the full parsed path so
/// its value is always resolved from the document root.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldTree {
    /// Copy the resolved value. Carries the full path.
    Leaf(Path),
    /// Build a nested document from the children.
    Branch(Vec<(String, FieldTree)>),
}

pub(crate) type FieldForest = Vec<(String, FieldTree)>;

impl FieldTree {
    /// Build a tree from a list of dotted paths.
    pub(crate) fn from_paths(paths: &[String]) -> Result<FieldForest, EngineError> {
        let mut root = FieldForest::new();
        for raw in paths {
            let parsed = Path::parse(raw).map_err(|e| EngineError::path(raw, e))?;
            let parts = path::split_dotted(raw);
            if parts.is_empty() {
                continue;
            }
            insert_path(&mut root, &parsed, &parts);
        }
        Ok(root)
    }
}

fn insert_path(nodes: &mut FieldForest, full: &Path, parts: &[&str]) {
    let Some((top, rest)) = parts.split_first() else {
        return;
    };
    let slot = nodes.iter().position(|(key, _)| key == top);

    if rest.is_empty() {
        // Leaf takes the whole field. Overrides any existing Branch
        // (if both "foo" and "foo.bar" are requested, "foo" wins).
        let leaf = FieldTree::Leaf(full.clone());
        match slot {
            Some(i) => nodes[i].1 = leaf,
            None => nodes.push((top.to_string(), leaf)),
        }
        return;
    }

    let i = match slot {
        Some(i) => i,
        None => {
            nodes.push((top.to_string(), FieldTree::Branch(Vec::new())));
            nodes.len() - 1
        }
    };
    if let FieldTree::Branch(children) = &mut nodes[i].1 {
        insert_path(children, full, rest);
    }
}

/// Build the projected document for `doc`. Absent leaves are omitted;
/// branches are always emitted.
pub(crate) fn project(doc: &Document, forest: &[(String, FieldTree)]) -> Document {
    let mut out = Document::new();
    for (key, node) in forest {
        match node {
            FieldTree::Leaf(full) => {
                if let Some(value) = path::resolve(doc, full) {
                    out.insert(key.clone(), value.clone());
                }
            }
            FieldTree::Branch(children) => {
                out.insert(key.clone(), Bson::Document(project(doc, children)));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    fn leaf(raw: &str) -> FieldTree {
        FieldTree::Leaf(Path::parse(raw).unwrap())
    }

    fn tree(paths: &[&str]) -> FieldForest {
        let paths: Vec<String> = paths.iter().map(|s| s.to_string()).collect();
        FieldTree::from_paths(&paths).unwrap()
    }

    #[test]
    fn flat_fields() {
        assert_eq!(
            tree(&["name", "status"]),
            vec![
                ("name".to_string(), leaf("name")),
                ("status".to_string(), leaf("status")),
            ]
        );
    }

    #[test]
    fn nested_fields_share_branch() {
        assert_eq!(
            tree(&["address.city", "name", "address.zip"]),
            vec![
                (
                    "address".to_string(),
                    FieldTree::Branch(vec![
                        ("city".to_string(), leaf("address.city")),
                        ("zip".to_string(), leaf("address.zip")),
                    ])
                ),
                ("name".to_string(), leaf("name")),
            ]
        );
    }

    #[test]
    fn leaf_overrides_branch() {
        assert_eq!(
            tree(&["foo.bar", "foo"]),
            vec![("foo".to_string(), leaf("foo"))]
        );
    }

    #[test]
    fn branch_does_not_override_leaf() {
        assert_eq!(
            tree(&["foo", "foo.bar"]),
            vec![("foo".to_string(), leaf("foo"))]
        );
    }

    #[test]
    fn bad_path_is_rejected() {
        let err = FieldTree::from_paths(&["a[".to_string()]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPath { .. }));
    }

    #[test]
    fn project_mirrors_structure() {
        let doc = doc! { "name": "A", "address": { "city": "X", "country": "Y" } };
        let out = project(&doc, &tree(&["address.city"]));
        assert_eq!(out, doc! { "address": { "city": "X" } });
    }

    #[test]
    fn project_omits_absent_leaves() {
        let doc = doc! { "name": "A" };
        let out = project(&doc, &tree(&["name", "age", "address.city"]));
        assert_eq!(out, doc! { "name": "A", "address": {} });
    }

    #[test]
    fn project_indexed_path() {
        let doc = doc! { "posts": [{ "title": "a" }, { "title": "b" }] };
        let out = project(&doc, &tree(&["posts[1].title"]));
        assert_eq!(out, doc! { "posts[1]": { "title": "b" } });
    }
}
