//! An unbalanced binary search tree keyed by string, with two kinds of label per node.
use std::cmp::Ordering;

use limb::{
    BoxError, Either, Embed, FieldDecl, Fields, Layer, LayerError, Project, Shape, Slot,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    Leaf,
    Node {
        left: Box<Tree>,
        key: String,
        value: u64,
        right: Box<Tree>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeTag {
    Leaf,
    Node,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Key(String),
    Value(u64),
}

const NODE: &[FieldDecl] = &[
    FieldDecl::child("left"),
    FieldDecl::label("key"),
    FieldDecl::label("value"),
    FieldDecl::child("right"),
];

impl Shape for Tree {
    type Tag = TreeTag;
    type Label = Entry;

    fn fields(tag: TreeTag) -> &'static [FieldDecl] {
        match tag {
            TreeTag::Leaf => &[],
            TreeTag::Node => NODE,
        }
    }
}

impl<'a> Project for &'a Tree {
    type Shape = Tree;

    fn tag(&self) -> TreeTag {
        match self {
            Tree::Leaf => TreeTag::Leaf,
            Tree::Node { .. } => TreeTag::Node,
        }
    }

    fn into_slots(self) -> Vec<Slot<Entry, Self>> {
        match self {
            Tree::Leaf => vec![],
            Tree::Node {
                left,
                key,
                value,
                right,
            } => vec![
                Slot::Child(left.as_ref()),
                Slot::Label(Entry::Key(key.clone())),
                Slot::Label(Entry::Value(*value)),
                Slot::Child(right.as_ref()),
            ],
        }
    }
}

impl Embed for Tree {
    type Shape = Tree;

    fn from_fields(tag: TreeTag, mut fields: Fields<Entry, Self>) -> Result<Self, BoxError> {
        let tree = match tag {
            TreeTag::Leaf => Tree::Leaf,
            TreeTag::Node => {
                let left = fields.child()?;
                let key = match fields.label()? {
                    Entry::Key(k) => k,
                    other => return Err(format!("expected key, found {:?}", other).into()),
                };
                let value = match fields.label()? {
                    Entry::Value(v) => v,
                    other => return Err(format!("expected value, found {:?}", other).into()),
                };
                Tree::node(left, key, value, fields.child()?)
            }
        };
        fields.finish()?;
        Ok(tree)
    }
}

impl Tree {
    pub fn node(left: Tree, key: impl Into<String>, value: u64, right: Tree) -> Self {
        Tree::Node {
            left: Box::new(left),
            key: key.into(),
            value,
            right: Box::new(right),
        }
    }
}

/// A fold found a label of the wrong kind in a named field.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("field '{field}' holds {found:?}")]
    WrongEntry { field: &'static str, found: Entry },
    #[error(transparent)]
    Layer(#[from] LayerError),
}

fn key_of<A>(layer: &Layer<Tree, A>) -> Result<String, TreeError> {
    match layer.label("key")? {
        Entry::Key(k) => Ok(k.clone()),
        found => Err(TreeError::WrongEntry {
            field: "key",
            found: found.clone(),
        }),
    }
}

fn value_of<A>(layer: &Layer<Tree, A>) -> Result<u64, TreeError> {
    match layer.label("value")? {
        Entry::Value(v) => Ok(*v),
        found => Err(TreeError::WrongEntry {
            field: "value",
            found: found.clone(),
        }),
    }
}

/// Where `insert` is in its unfold: still walking the search path, or copying a subtree as-is.
enum Step<'a> {
    Search(&'a Tree),
    Keep(&'a Tree),
}

/// Persistent insert: returns a new tree, rebuilding only the nodes along the search path.
/// Subtrees off the path are handed back whole through `Either::Right` and never unfolded.
pub fn insert(tree: &Tree, key: &str, value: u64) -> Result<Tree, LayerError> {
    insert_counting(tree, key, value).map(|(tree, _)| tree)
}

/// [`insert`], also reporting how many times the coalgebra ran.
pub fn insert_counting(tree: &Tree, key: &str, value: u64) -> Result<(Tree, usize), LayerError> {
    let mut steps = 0;
    let tree = Tree::try_apo(Step::Search(tree), |step| {
        steps += 1;
        match step {
            Step::Keep(subtree) => Ok(Either::Right(subtree.clone())),
            Step::Search(Tree::Leaf) => Ok(Either::Right(Tree::node(
                Tree::Leaf,
                key,
                value,
                Tree::Leaf,
            ))),
            Step::Search(Tree::Node {
                left,
                key: here,
                value: old,
                right,
            }) => {
                let (value, left, right) = match key.cmp(here.as_str()) {
                    Ordering::Less => (*old, Step::Search(left.as_ref()), Step::Keep(right.as_ref())),
                    Ordering::Greater => (*old, Step::Keep(left.as_ref()), Step::Search(right.as_ref())),
                    Ordering::Equal => (value, Step::Keep(left.as_ref()), Step::Keep(right.as_ref())),
                };
                Layer::of(
                    TreeTag::Node,
                    vec![Entry::Key(here.clone()), Entry::Value(value)],
                    vec![left, right],
                )
                .map(Either::Left)
            }
        }
    })?;
    Ok((tree, steps))
}

pub fn from_entries<'k>(entries: impl IntoIterator<Item = (&'k str, u64)>) -> Result<Tree, LayerError> {
    entries
        .into_iter()
        .try_fold(Tree::Leaf, |tree, (key, value)| insert(&tree, key, value))
}

/// Key/value pairs in key order.
pub fn entries(tree: &Tree) -> Result<Vec<(String, u64)>, TreeError> {
    tree.try_cata(entries_layer)
}

fn entries_layer(layer: Layer<Tree, Vec<(String, u64)>>) -> Result<Vec<(String, u64)>, TreeError> {
    if layer.tag() == TreeTag::Leaf {
        return Ok(Vec::new());
    }
    let entry = (key_of(&layer)?, value_of(&layer)?);
    let mut children = layer.into_children().into_iter();
    let mut out = children.next().unwrap_or_default();
    out.push(entry);
    out.extend(children.flatten());
    Ok(out)
}

pub fn height(tree: &Tree) -> Result<usize, LayerError> {
    tree.cata(|layer| match layer.tag() {
        TreeTag::Leaf => 0,
        TreeTag::Node => 1 + layer.into_children().into_iter().max().unwrap_or(0),
    })
}

/// Keys of nodes whose left subtree holds more keys than their right one.
pub fn left_heavy(tree: &Tree) -> Result<Vec<String>, TreeError> {
    tree.try_para(|layer: Layer<Tree, (&Tree, Vec<String>)>| -> Result<_, TreeError> {
        if layer.tag() == TreeTag::Leaf {
            return Ok(Vec::new());
        }
        let (left, below_left) = layer.child("left")?;
        let (right, below_right) = layer.child("right")?;
        let mut out = Vec::new();
        if entries(left)?.len() > entries(right)?.len() {
            out.push(key_of(&layer)?);
        }
        out.extend(below_left.iter().cloned());
        out.extend(below_right.iter().cloned());
        Ok(out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        from_entries([("m", 1), ("f", 2), ("t", 3), ("c", 4), ("h", 5), ("a", 6)]).unwrap()
    }

    #[test]
    fn entries_come_out_sorted() {
        crate::init_tracing();
        let keys: Vec<String> = entries(&sample())
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["a", "c", "f", "h", "m", "t"]);
    }

    #[test]
    fn insert_replaces_existing_value() {
        let tree = insert(&sample(), "h", 50).unwrap();
        assert!(entries(&tree).unwrap().contains(&("h".to_string(), 50)));
        assert_eq!(entries(&tree).unwrap().len(), 6);
    }

    #[test]
    fn insert_only_unfolds_the_search_path() {
        let tree = sample();
        // m -> f -> c -> a: four nodes on the path, each with one sibling subtree kept whole,
        // plus the leaf where "b" lands
        let (updated, steps) = insert_counting(&tree, "b", 7).unwrap();
        assert_eq!(steps, 4 + 4 + 1);
        assert_eq!(entries(&updated).unwrap().len(), 7);
        assert_eq!(height(&updated).unwrap(), 5);
        // the original is untouched
        assert_eq!(entries(&tree).unwrap().len(), 6);
    }

    #[test]
    fn para_sees_original_subtrees() {
        assert_eq!(left_heavy(&sample()).unwrap(), vec!["m", "f", "c"]);
    }

    /// Projects nodes with their key and value labels swapped.
    struct Swapped<'a>(&'a Tree);

    impl<'a> Project for Swapped<'a> {
        type Shape = Tree;

        fn tag(&self) -> TreeTag {
            match self.0 {
                Tree::Leaf => TreeTag::Leaf,
                Tree::Node { .. } => TreeTag::Node,
            }
        }

        fn into_slots(self) -> Vec<Slot<Entry, Self>> {
            match self.0 {
                Tree::Leaf => vec![],
                Tree::Node {
                    left,
                    key,
                    value,
                    right,
                } => vec![
                    Slot::Child(Swapped(left.as_ref())),
                    Slot::Label(Entry::Value(*value)),
                    Slot::Label(Entry::Key(key.clone())),
                    Slot::Child(Swapped(right.as_ref())),
                ],
            }
        }
    }

    #[test]
    fn fold_rejects_mislabeled_entries() {
        let tree = sample();
        let res = Swapped(&tree).try_cata(entries_layer);
        assert!(matches!(
            res,
            Err(TreeError::WrongEntry {
                field: "key",
                found: Entry::Value(_)
            })
        ));
    }

    #[test]
    fn embed_rejects_swapped_labels() {
        let layer: Layer<Tree, Tree> = Layer::of(
            TreeTag::Node,
            vec![Entry::Value(1), Entry::Key("k".to_string())],
            vec![Tree::Leaf, Tree::Leaf],
        )
        .unwrap();
        assert!(matches!(
            layer.embed(),
            Err(LayerError::Reconstruction { .. })
        ));
    }
}
