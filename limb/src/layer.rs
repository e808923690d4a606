use std::fmt;

use tracing::{debug, trace};

use crate::error::{LayerError, SlotError};
use crate::frame::{MappableFrame, PartiallyApplied};
use crate::recursive::{Embed, Project, Shape};

/// Whether a declared field holds non-recursive data or a recursive position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Label,
    Child,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Label => f.write_str("label"),
            FieldKind::Child => f.write_str("child"),
        }
    }
}

/// One entry in a variant's declared field signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDecl {
    pub const fn label(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Label,
        }
    }

    pub const fn child(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Child,
        }
    }
}

/// The contents of a single field: either a label `L` or a child `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<L, A> {
    Label(L),
    Child(A),
}

impl<L, A> Slot<L, A> {
    pub fn kind(&self) -> FieldKind {
        match self {
            Slot::Label(_) => FieldKind::Label,
            Slot::Child(_) => FieldKind::Child,
        }
    }

    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> Slot<L, B> {
        match self {
            Slot::Label(l) => Slot::Label(l),
            Slot::Child(a) => Slot::Child(f(a)),
        }
    }
}

/// A named slot inside a [`Layer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<L, A> {
    name: &'static str,
    slot: Slot<L, A>,
}

impl<L, A> Field<L, A> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn slot(&self) -> &Slot<L, A> {
        &self.slot
    }

    pub fn into_slot(self) -> Slot<L, A> {
        self.slot
    }
}

/// One unrolled level of the recursive type described by `T`, with child positions of type `A`.
///
/// With `A = T` (or whatever `Project` type produced it) a layer holds real subtrees; while
/// folding, `A` is the result type of the fold; while unfolding, `A` is the seed type.
/// A layer always lists every declared field of its variant exactly once, in declared order.
pub struct Layer<T: Shape, A> {
    tag: T::Tag,
    fields: Vec<Field<T::Label, A>>,
}

impl<T: Shape, A> Layer<T, A> {
    /// Build a layer for `tag` by handing out `labels` and `children`, in order, to the
    /// variant's declared label and child fields.
    ///
    /// Both lists must match the declared counts exactly.
    pub fn of(tag: T::Tag, labels: Vec<T::Label>, children: Vec<A>) -> Result<Self, LayerError> {
        let decls = declared::<T>(tag)?;
        let expected_labels = decls
            .iter()
            .filter(|decl| decl.kind == FieldKind::Label)
            .count();
        let expected_children = decls.len() - expected_labels;
        let (got_labels, got_children) = (labels.len(), children.len());

        let mismatch = || {
            let err = LayerError::ShapeMismatch {
                tag: format!("{:?}", tag),
                expected_labels,
                got_labels,
                expected_children,
                got_children,
            };
            debug!(%err, "rejected layer");
            err
        };

        if got_labels != expected_labels || got_children != expected_children {
            return Err(mismatch());
        }

        let mut labels = labels.into_iter();
        let mut children = children.into_iter();
        let fields = decls
            .iter()
            .map(|decl| {
                let slot = match decl.kind {
                    FieldKind::Label => labels.next().map(Slot::Label),
                    FieldKind::Child => children.next().map(Slot::Child),
                }?;
                Some(Field {
                    name: decl.name,
                    slot,
                })
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(mismatch)?;

        Ok(Self { tag, fields })
    }

    pub fn tag(&self) -> T::Tag {
        self.tag
    }

    /// The variant tag rendered for humans, eg in error messages.
    pub fn tag_name(&self) -> String {
        format!("{:?}", self.tag)
    }

    pub fn fields(&self) -> &[Field<T::Label, A>] {
        &self.fields
    }

    /// Label fields in declared order.
    pub fn labels(&self) -> impl Iterator<Item = (&'static str, &T::Label)> + '_ {
        self.fields.iter().filter_map(|field| match &field.slot {
            Slot::Label(l) => Some((field.name, l)),
            Slot::Child(_) => None,
        })
    }

    /// Child fields in declared order.
    pub fn children(&self) -> impl Iterator<Item = (&'static str, &A)> + '_ {
        self.fields.iter().filter_map(|field| match &field.slot {
            Slot::Child(a) => Some((field.name, a)),
            Slot::Label(_) => None,
        })
    }

    pub fn is_leaf(&self) -> bool {
        self.children().next().is_none()
    }

    pub fn label(&self, name: &str) -> Result<&T::Label, LayerError> {
        self.labels()
            .find(|(n, _)| *n == name)
            .map(|(_, l)| l)
            .ok_or_else(|| self.not_found(name, FieldKind::Label))
    }

    pub fn child(&self, name: &str) -> Result<&A, LayerError> {
        self.children()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| a)
            .ok_or_else(|| self.not_found(name, FieldKind::Child))
    }

    fn not_found(&self, name: &str, kind: FieldKind) -> LayerError {
        LayerError::NotFound {
            tag: self.tag_name(),
            name: name.to_string(),
            kind,
        }
    }

    /// Apply `f` to every child, in declared order, leaving the tag and labels untouched.
    pub fn map<B>(self, mut f: impl FnMut(A) -> B) -> Layer<T, B> {
        Layer {
            tag: self.tag,
            fields: self
                .fields
                .into_iter()
                .map(|Field { name, slot }| Field {
                    name,
                    slot: slot.map(&mut f),
                })
                .collect(),
        }
    }

    /// Consume the layer, keeping only its children in declared order.
    pub fn into_children(self) -> Vec<A> {
        self.fields
            .into_iter()
            .filter_map(|field| match field.slot {
                Slot::Child(a) => Some(a),
                Slot::Label(_) => None,
            })
            .collect()
    }

    /// Consume the layer as a cursor over its fields, as handed to [`Embed::from_fields`].
    pub fn into_fields(self) -> Fields<T::Label, A> {
        Fields {
            fields: self.fields.into_iter(),
        }
    }
}

impl<P: Project> Layer<P::Shape, P> {
    /// Split `value` into its variant tag, its labels, and its direct subtrees.
    pub fn project(value: P) -> Result<Self, LayerError> {
        let tag = value.tag();
        let decls = declared::<P::Shape>(tag)?;
        let slots = value.into_slots();

        let access = |reason: String| {
            let err = LayerError::Access {
                tag: format!("{:?}", tag),
                reason,
            };
            debug!(%err, "projection disagrees with declared shape");
            err
        };

        if slots.len() != decls.len() {
            return Err(access(format!(
                "projected {} fields, {} declared",
                slots.len(),
                decls.len()
            )));
        }

        let fields = decls
            .iter()
            .zip(slots)
            .map(|(decl, slot)| {
                if slot.kind() == decl.kind {
                    Ok(Field {
                        name: decl.name,
                        slot,
                    })
                } else {
                    Err(access(format!(
                        "field '{}' declared as {} but projected as {}",
                        decl.name,
                        decl.kind,
                        slot.kind()
                    )))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        trace!(?tag, fields = fields.len(), "projected layer");
        Ok(Self { tag, fields })
    }
}

// field signature of `tag`, with every name distinct
fn declared<T: Shape>(tag: T::Tag) -> Result<&'static [FieldDecl], LayerError> {
    let decls = T::fields(tag);
    for (i, decl) in decls.iter().enumerate() {
        if decls[..i].iter().any(|earlier| earlier.name == decl.name) {
            let err = LayerError::DuplicateField {
                tag: format!("{:?}", tag),
                name: decl.name,
            };
            debug!(%err, "rejected field signature");
            return Err(err);
        }
    }
    Ok(decls)
}

impl<E: Embed> Layer<E::Shape, E> {
    /// Rebuild a concrete value from a layer whose children are already concrete values.
    pub fn embed(self) -> Result<E, LayerError> {
        let tag = self.tag;
        trace!(?tag, fields = self.fields.len(), "embedding layer");
        E::from_fields(tag, self.into_fields()).map_err(|source| {
            let err = LayerError::Reconstruction {
                tag: format!("{:?}", tag),
                source,
            };
            debug!(err = %err, "embed failed");
            err
        })
    }
}

impl<T: Shape> MappableFrame for Layer<T, PartiallyApplied> {
    type Frame<X> = Layer<T, X>;

    #[inline(always)]
    fn map_frame<A, B>(input: Self::Frame<A>, f: impl FnMut(A) -> B) -> Self::Frame<B> {
        input.map(f)
    }
}

/// A layer annotated with a value that is carried through `map_frame` untouched.
impl<P, T: Shape> MappableFrame for (P, Layer<T, PartiallyApplied>) {
    type Frame<X> = (P, Layer<T, X>);

    #[inline(always)]
    fn map_frame<A, B>(input: Self::Frame<A>, f: impl FnMut(A) -> B) -> Self::Frame<B> {
        (input.0, input.1.map(f))
    }
}

impl<T: Shape, A: Clone> Clone for Layer<T, A>
where
    T::Label: Clone,
{
    fn clone(&self) -> Self {
        Self {
            tag: self.tag,
            fields: self.fields.clone(),
        }
    }
}

impl<T: Shape, A: fmt::Debug> fmt::Debug for Layer<T, A>
where
    T::Label: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("tag", &self.tag)
            .field("fields", &self.fields)
            .finish()
    }
}

impl<T: Shape, A: PartialEq> PartialEq for Layer<T, A>
where
    T::Label: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.fields == other.fields
    }
}

impl<T: Shape, A: Eq> Eq for Layer<T, A> where T::Label: Eq {}

/// Cursor over a layer's fields in declared order, used to call a variant's constructor.
///
/// ```rust
/// # use limb::{BoxError, FieldDecl, Fields, Layer, Shape, Embed};
/// # #[derive(Debug, PartialEq)]
/// # enum List { Cons(char, Box<List>), Nil }
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// # enum ListTag { Cons, Nil }
/// # impl Shape for List {
/// #     type Tag = ListTag;
/// #     type Label = char;
/// #     fn fields(tag: ListTag) -> &'static [FieldDecl] {
/// #         const CONS: &[FieldDecl] = &[FieldDecl::label("head"), FieldDecl::child("tail")];
/// #         match tag {
/// #             ListTag::Cons => CONS,
/// #             ListTag::Nil => &[],
/// #         }
/// #     }
/// # }
/// impl Embed for List {
///     type Shape = List;
///
///     fn from_fields(tag: ListTag, mut fields: Fields<char, List>) -> Result<Self, BoxError> {
///         let list = match tag {
///             ListTag::Cons => List::Cons(fields.label()?, Box::new(fields.child()?)),
///             ListTag::Nil => List::Nil,
///         };
///         fields.finish()?;
///         Ok(list)
///     }
/// }
///
/// let nil = Layer::<List, List>::of(ListTag::Nil, vec![], vec![]).unwrap();
/// let one = Layer::<List, List>::of(ListTag::Cons, vec!['a'], vec![nil.embed().unwrap()]).unwrap();
/// assert_eq!(one.embed().unwrap(), List::Cons('a', Box::new(List::Nil)));
/// ```
#[derive(Debug)]
pub struct Fields<L, A> {
    fields: std::vec::IntoIter<Field<L, A>>,
}

impl<L, A> Fields<L, A> {
    /// Take the next field, which must be a label.
    pub fn label(&mut self) -> Result<L, SlotError> {
        let Field { name, slot } = self.next(FieldKind::Label)?;
        match slot {
            Slot::Label(l) => Ok(l),
            Slot::Child(_) => Err(kind_mismatch(name, FieldKind::Label, FieldKind::Child)),
        }
    }

    /// Take the next field, which must be a child.
    pub fn child(&mut self) -> Result<A, SlotError> {
        let Field { name, slot } = self.next(FieldKind::Child)?;
        match slot {
            Slot::Child(a) => Ok(a),
            Slot::Label(_) => Err(kind_mismatch(name, FieldKind::Child, FieldKind::Label)),
        }
    }

    /// Number of fields not yet taken.
    pub fn remaining(&self) -> usize {
        self.fields.len()
    }

    /// Fails if any field was left untaken.
    pub fn finish(self) -> Result<(), SlotError> {
        match self.fields.as_slice().first() {
            None => Ok(()),
            Some(next) => Err(SlotError::Unconsumed {
                next: next.name,
                remaining: self.fields.len(),
            }),
        }
    }

    fn next(&mut self, wanted: FieldKind) -> Result<Field<L, A>, SlotError> {
        self.fields.next().ok_or(SlotError::Exhausted { wanted })
    }
}

fn kind_mismatch(name: &'static str, wanted: FieldKind, found: FieldKind) -> SlotError {
    SlotError::KindMismatch {
        name,
        wanted,
        found,
    }
}
