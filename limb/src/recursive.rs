//! Support for collapsing and expanding recursive structures by
//! repeatedly expanding or collapsing them one [`Layer`] at a time.
//!
//! A recursive type opts in by describing its variants once ([`Shape`]) and then
//! implementing [`Project`] (to be folded), [`Embed`] (to be unfolded), or both.
use std::fmt;

use tracing::trace_span;

use crate::error::{BoxError, LayerError};
use crate::frame::{try_expand_and_collapse, PartiallyApplied};
use crate::layer::{FieldDecl, Fields, Layer, Slot};
use crate::schemes::Either;

/// The declared variants of a recursive type and the ordered fields of each.
///
/// Which fields are recursive positions is stated here, per field, rather than
/// worked out from the field's type.
pub trait Shape {
    /// Identifies a variant.
    type Tag: Copy + Eq + fmt::Debug;
    /// The non-recursive payload. Types with several kinds of payload use an enum.
    type Label;

    /// Field signature of `tag`, in declaration order. Names must be unique per variant;
    /// building a layer for a variant that repeats a name fails with
    /// [`LayerError::DuplicateField`].
    fn fields(tag: Self::Tag) -> &'static [FieldDecl];
}

/// The ability to split a value into one layer: its tag, its labels, and its direct subtrees.
///
/// Often implemented for a reference, eg `&'a Expr`, so that folds borrow instead of consume.
///
/// ```rust
/// use limb::{FieldDecl, Project, Shape, Slot};
///
/// enum Chain {
///     Link(u8, Box<Chain>),
///     End,
/// }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum ChainTag {
///     Link,
///     End,
/// }
///
/// impl Shape for Chain {
///     type Tag = ChainTag;
///     type Label = u8;
///
///     fn fields(tag: ChainTag) -> &'static [FieldDecl] {
///         const LINK: &[FieldDecl] = &[FieldDecl::label("value"), FieldDecl::child("next")];
///         match tag {
///             ChainTag::Link => LINK,
///             ChainTag::End => &[],
///         }
///     }
/// }
///
/// impl<'a> Project for &'a Chain {
///     type Shape = Chain;
///
///     fn tag(&self) -> ChainTag {
///         match self {
///             Chain::Link(..) => ChainTag::Link,
///             Chain::End => ChainTag::End,
///         }
///     }
///
///     fn into_slots(self) -> Vec<Slot<u8, Self>> {
///         match self {
///             Chain::Link(x, next) => vec![Slot::Label(*x), Slot::Child(next.as_ref())],
///             Chain::End => vec![],
///         }
///     }
/// }
///
/// let chain = Chain::Link(1, Box::new(Chain::Link(2, Box::new(Chain::End))));
/// let sum = (&chain)
///     .cata(|layer| layer.labels().map(|(_, x)| *x as u32).sum::<u32>()
///         + layer.into_children().into_iter().sum::<u32>())
///     .unwrap();
///
/// assert_eq!(sum, 3);
/// ```
pub trait Project
where
    Self: Sized,
{
    type Shape: Shape;

    fn tag(&self) -> <Self::Shape as Shape>::Tag;

    /// Every declared field of this value's variant, in declared order.
    fn into_slots(self) -> Vec<Slot<<Self::Shape as Shape>::Label, Self>>;

    /// Catamorphism: fold `self` bottom-up, combining each layer once its children are folded.
    fn cata<Out>(
        self,
        mut algebra: impl FnMut(Layer<Self::Shape, Out>) -> Out,
    ) -> Result<Out, LayerError> {
        let _span = trace_span!("cata").entered();
        try_expand_and_collapse::<Layer<Self::Shape, PartiallyApplied>, Self, Out, LayerError>(
            self,
            Layer::<Self::Shape, Self>::project,
            |layer| Ok(algebra(layer)),
        )
    }

    /// Fallible catamorphism. The first error, from the algebra or from projection, is returned.
    fn try_cata<Out, E: From<LayerError>>(
        self,
        algebra: impl FnMut(Layer<Self::Shape, Out>) -> Result<Out, E>,
    ) -> Result<Out, E> {
        let _span = trace_span!("try_cata").entered();
        try_expand_and_collapse::<Layer<Self::Shape, PartiallyApplied>, Self, Out, E>(
            self,
            |node| Layer::<Self::Shape, Self>::project(node).map_err(E::from),
            algebra,
        )
    }

    /// Paramorphism: like [`Project::cata`], but each child arrives as
    /// `(original subtree, folded result)`.
    fn para<Out>(
        self,
        mut algebra: impl FnMut(Layer<Self::Shape, (Self, Out)>) -> Out,
    ) -> Result<Out, LayerError>
    where
        Self: Clone,
    {
        self.try_para(|layer| Ok::<_, LayerError>(algebra(layer)))
    }

    /// Fallible paramorphism. The first error, from the algebra or from projection, is returned.
    fn try_para<Out, E: From<LayerError>>(
        self,
        mut algebra: impl FnMut(Layer<Self::Shape, (Self, Out)>) -> Result<Out, E>,
    ) -> Result<Out, E>
    where
        Self: Clone,
    {
        let _span = trace_span!("para").entered();
        try_expand_and_collapse::<(Self, Layer<Self::Shape, PartiallyApplied>), Self, (Self, Out), E>(
            self,
            |node| {
                let original = node.clone();
                Ok((original, Layer::<Self::Shape, Self>::project(node)?))
            },
            |(original, layer)| Ok((original, algebra(layer)?)),
        )
        .map(|(_, out)| out)
    }
}

/// The ability to build a value from one layer whose children are already built.
pub trait Embed
where
    Self: Sized,
{
    type Shape: Shape;

    /// Call the constructor of variant `tag`, taking its fields from `fields` in declared order.
    fn from_fields(
        tag: <Self::Shape as Shape>::Tag,
        fields: Fields<<Self::Shape as Shape>::Label, Self>,
    ) -> Result<Self, BoxError>;

    /// Anamorphism: unfold `seed` top-down, one layer of seeds at a time.
    fn ana<Seed>(
        seed: Seed,
        mut coalgebra: impl FnMut(Seed) -> Layer<Self::Shape, Seed>,
    ) -> Result<Self, LayerError> {
        let _span = trace_span!("ana").entered();
        try_expand_and_collapse::<Layer<Self::Shape, PartiallyApplied>, Seed, Self, LayerError>(
            seed,
            |seed| Ok(coalgebra(seed)),
            Layer::<Self::Shape, Self>::embed,
        )
    }

    /// Fallible anamorphism, convenient when the coalgebra builds layers with [`Layer::of`].
    fn try_ana<Seed, E: From<LayerError>>(
        seed: Seed,
        coalgebra: impl FnMut(Seed) -> Result<Layer<Self::Shape, Seed>, E>,
    ) -> Result<Self, E> {
        let _span = trace_span!("try_ana").entered();
        try_expand_and_collapse::<Layer<Self::Shape, PartiallyApplied>, Seed, Self, E>(
            seed,
            coalgebra,
            |layer| layer.embed().map_err(E::from),
        )
    }

    /// Apomorphism: like [`Embed::ana`], but the coalgebra may return a finished
    /// value (`Either::Right`) instead of another layer, ending the unfold there.
    fn apo<Seed>(
        seed: Seed,
        mut coalgebra: impl FnMut(Seed) -> Either<Layer<Self::Shape, Seed>, Self>,
    ) -> Result<Self, LayerError> {
        let _span = trace_span!("apo").entered();
        try_expand_and_collapse::<
            Either<Layer<Self::Shape, PartiallyApplied>, Self>,
            Seed,
            Self,
            LayerError,
        >(
            seed,
            |seed| Ok(coalgebra(seed)),
            |step| match step {
                Either::Left(layer) => layer.embed(),
                Either::Right(done) => Ok(done),
            },
        )
    }

    /// Fallible apomorphism. The first error, from the coalgebra or from embedding, is returned.
    fn try_apo<Seed, E: From<LayerError>>(
        seed: Seed,
        coalgebra: impl FnMut(Seed) -> Result<Either<Layer<Self::Shape, Seed>, Self>, E>,
    ) -> Result<Self, E> {
        let _span = trace_span!("try_apo").entered();
        try_expand_and_collapse::<Either<Layer<Self::Shape, PartiallyApplied>, Self>, Seed, Self, E>(
            seed,
            coalgebra,
            |step| match step {
                Either::Left(layer) => layer.embed().map_err(E::from),
                Either::Right(done) => Ok(done),
            },
        )
    }
}
