//! The recursion schemes as standalone functions.
//!
//! Each of `cata`, `para`, `ana`, `apo` (and their fallible `try_` variants) takes the per-layer
//! function and returns a reusable function from whole values (or seeds) to results.
//! They are thin wrappers over the methods on [`Project`] and [`Embed`].
use crate::error::LayerError;
use crate::frame::{expand_and_collapse, MappableFrame, PartiallyApplied};
use crate::layer::Layer;
use crate::recursive::{Embed, Project, Shape};

/// One step of an apomorphism: keep unfolding (`Left`) or stop with a finished value (`Right`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<T: Shape, Done> MappableFrame for Either<Layer<T, PartiallyApplied>, Done> {
    type Frame<X> = Either<Layer<T, X>, Done>;

    #[inline(always)]
    fn map_frame<A, B>(input: Self::Frame<A>, f: impl FnMut(A) -> B) -> Self::Frame<B> {
        match input {
            Either::Left(layer) => Either::Left(layer.map(f)),
            Either::Right(done) => Either::Right(done),
        }
    }
}

pub fn cata<P: Project, Out>(
    mut algebra: impl FnMut(Layer<P::Shape, Out>) -> Out,
) -> impl FnMut(P) -> Result<Out, LayerError> {
    move |value| value.cata(&mut algebra)
}

pub fn try_cata<P: Project, Out, E: From<LayerError>>(
    mut algebra: impl FnMut(Layer<P::Shape, Out>) -> Result<Out, E>,
) -> impl FnMut(P) -> Result<Out, E> {
    move |value| value.try_cata(&mut algebra)
}

pub fn para<P: Project + Clone, Out>(
    mut algebra: impl FnMut(Layer<P::Shape, (P, Out)>) -> Out,
) -> impl FnMut(P) -> Result<Out, LayerError> {
    move |value| value.para(&mut algebra)
}

pub fn try_para<P: Project + Clone, Out, E: From<LayerError>>(
    mut algebra: impl FnMut(Layer<P::Shape, (P, Out)>) -> Result<Out, E>,
) -> impl FnMut(P) -> Result<Out, E> {
    move |value| value.try_para(&mut algebra)
}

pub fn ana<E: Embed, Seed>(
    mut coalgebra: impl FnMut(Seed) -> Layer<E::Shape, Seed>,
) -> impl FnMut(Seed) -> Result<E, LayerError> {
    move |seed| E::ana(seed, &mut coalgebra)
}

pub fn try_ana<E: Embed, Seed, Error: From<LayerError>>(
    mut coalgebra: impl FnMut(Seed) -> Result<Layer<E::Shape, Seed>, Error>,
) -> impl FnMut(Seed) -> Result<E, Error> {
    move |seed| E::try_ana(seed, &mut coalgebra)
}

pub fn apo<E: Embed, Seed>(
    mut coalgebra: impl FnMut(Seed) -> Either<Layer<E::Shape, Seed>, E>,
) -> impl FnMut(Seed) -> Result<E, LayerError> {
    move |seed| E::apo(seed, &mut coalgebra)
}

pub fn try_apo<E: Embed, Seed, Error: From<LayerError>>(
    mut coalgebra: impl FnMut(Seed) -> Result<Either<Layer<E::Shape, Seed>, E>, Error>,
) -> impl FnMut(Seed) -> Result<E, Error> {
    move |seed| E::try_apo(seed, &mut coalgebra)
}

/// Hylomorphism: unfold `seed` with `coalgebra` and fold the result with `algebra`,
/// without ever building the intermediate structure.
///
/// ```rust
/// # use limb::{FieldDecl, Layer, Shape};
/// # enum Nat {}
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// # enum NatTag { Succ, Zero }
/// # impl Shape for Nat {
/// #     type Tag = NatTag;
/// #     type Label = u64;
/// #     fn fields(tag: NatTag) -> &'static [FieldDecl] {
/// #         const SUCC: &[FieldDecl] = &[FieldDecl::label("n"), FieldDecl::child("pred")];
/// #         match tag {
/// #             NatTag::Succ => SUCC,
/// #             NatTag::Zero => &[],
/// #         }
/// #     }
/// # }
/// let factorial = limb::schemes::hylo(
///     5u64,
///     |n| match n {
///         0 => Layer::<Nat, u64>::of(NatTag::Zero, vec![], vec![]).unwrap(),
///         n => Layer::of(NatTag::Succ, vec![n], vec![n - 1]).unwrap(),
///     },
///     |layer: Layer<Nat, u64>| match layer.label("n").ok().copied() {
///         Some(n) => n * layer.into_children()[0],
///         None => 1,
///     },
/// );
/// assert_eq!(factorial, 120);
/// ```
pub fn hylo<T: Shape, Seed, Out>(
    seed: Seed,
    coalgebra: impl FnMut(Seed) -> Layer<T, Seed>,
    algebra: impl FnMut(Layer<T, Out>) -> Out,
) -> Out {
    let _span = tracing::trace_span!("hylo").entered();
    expand_and_collapse::<Layer<T, PartiallyApplied>, Seed, Out>(seed, coalgebra, algebra)
}
