use std::convert::Infallible;

/// A single 'frame' containing values that can be mapped over via `map_frame`.
///
/// # Motivation
///
/// Generally speaking, you won't use this trait yourself. [`crate::Layer`] implements it, and
/// the schemes in [`crate::schemes`] drive it through the stack machines below. It is public
/// so that callers can run [`expand_and_collapse`] over frame types of their own.
///
/// # Implementing this trait
///
/// Rust does not allow implementing a trait for a partially applied type: we can implement
/// a trait for `Option<usize>` but not for just `Option`. The convention is to implement it for
/// the type applied to the uninhabited [`PartiallyApplied`] marker, eg
///
/// ```rust
/// # use limb::{MappableFrame, PartiallyApplied};
/// #[derive(Debug, PartialEq, Eq)]
/// enum Peano<A> {
///     Succ(A),
///     Zero,
/// }
///
/// impl MappableFrame for Peano<PartiallyApplied> {
///     type Frame<X> = Peano<X>;
///
///     fn map_frame<A, B>(input: Self::Frame<A>, mut f: impl FnMut(A) -> B) -> Self::Frame<B> {
///         match input {
///             Peano::Succ(x) => Peano::Succ(f(x)),
///             Peano::Zero => Peano::Zero,
///         }
///     }
/// }
///
/// let n: usize = limb::expand_and_collapse::<Peano<PartiallyApplied>, _, _>(
///     3usize,
///     |n| if n == 0 { Peano::Zero } else { Peano::Succ(n - 1) },
///     |frame| match frame {
///         Peano::Succ(acc) => acc + 10,
///         Peano::Zero => 0,
///     },
/// );
///
/// assert_eq!(n, 30);
/// ```
pub trait MappableFrame {
    /// the frame type that is mapped over by `map_frame`
    type Frame<X>;

    /// Apply some function `f` to each element inside a frame.
    ///
    /// `f` must be applied strictly and in the same order every time for frames that
    /// differ only in their element type; the stack machines rely on it.
    fn map_frame<A, B>(input: Self::Frame<A>, f: impl FnMut(A) -> B) -> Self::Frame<B>;
}

/// An uninhabited type used to define [`MappableFrame`] instances for partially-applied types.
///
/// For example: the MappableFrame instance for `Layer<T, A>` cannot be written over the
/// partially-applied type `Layer<T, _>`, so instead we write it over `Layer<T, PartiallyApplied>`
#[derive(Clone, Debug)]
pub enum PartiallyApplied {}

/// Runs a stack machine for the frame type `F::Frame`: seeds are expanded into frames with
/// `expand_frame`, and frames whose elements have all been collapsed are folded with
/// `collapse_frame`.
///
/// Traversal is depth-first. Sibling seeds are expanded in the order `map_frame` visits them,
/// and a frame is collapsed only after every one of its children.
///
/// No recursion happens on the call stack; pending work lives in a heap-allocated `Vec`,
/// so depth is bounded by memory.
pub fn expand_and_collapse<F: MappableFrame, Seed, Out>(
    seed: Seed,
    mut expand_frame: impl FnMut(Seed) -> F::Frame<Seed>,
    mut collapse_frame: impl FnMut(F::Frame<Out>) -> Out,
) -> Out {
    let res = try_expand_and_collapse::<F, Seed, Out, Infallible>(
        seed,
        |seed| Ok(expand_frame(seed)),
        |frame| Ok(collapse_frame(frame)),
    );
    match res {
        Ok(out) => out,
        Err(never) => match never {},
    }
}

/// Fallible [`expand_and_collapse`]. The first error returned by either function aborts the
/// traversal; no further expand or collapse calls are made after it.
pub fn try_expand_and_collapse<F: MappableFrame, Seed, Out, E>(
    seed: Seed,
    mut expand_frame: impl FnMut(Seed) -> Result<F::Frame<Seed>, E>,
    mut collapse_frame: impl FnMut(F::Frame<Out>) -> Result<Out, E>,
) -> Result<Out, E> {
    enum Work<Seed, Pending> {
        Unfold(usize, Seed),
        Fold(usize, Pending),
    }

    // one slot per node, filled when that node is folded
    let mut results: Vec<Option<Out>> = vec![None];
    let mut work = vec![Work::Unfold(0, seed)];

    while let Some(next) = work.pop() {
        match next {
            Work::Unfold(slot, seed) => {
                let mut pending_children = Vec::new();
                let frame = F::map_frame(expand_frame(seed)?, |child| {
                    results.push(None);
                    let child_slot = results.len() - 1;
                    pending_children.push(Work::Unfold(child_slot, child));
                    child_slot
                });

                work.push(Work::Fold(slot, frame));
                work.extend(pending_children.into_iter().rev());
            }
            Work::Fold(slot, frame) => {
                let frame = F::map_frame(frame, |child_slot| take_folded(&mut results, child_slot));
                results[slot] = Some(collapse_frame(frame)?);
            }
        }
    }
    Ok(take_folded(&mut results, 0))
}

// children are always folded (and their slot filled) before the parent's Fold is popped
fn take_folded<Out>(results: &mut [Option<Out>], slot: usize) -> Out {
    results[slot]
        .take()
        .expect("stack machine folded a frame before its children")
}

#[cfg(test)]
mod tests {
    use super::*;

    enum TreeFrame<A> {
        Node(u32, Vec<A>),
    }

    impl MappableFrame for TreeFrame<PartiallyApplied> {
        type Frame<X> = TreeFrame<X>;

        fn map_frame<A, B>(input: Self::Frame<A>, f: impl FnMut(A) -> B) -> Self::Frame<B> {
            match input {
                TreeFrame::Node(v, xs) => TreeFrame::Node(v, xs.into_iter().map(f).collect()),
            }
        }
    }

    // seed n expands into children n-1 .. 0 style binary counter
    fn expand(n: u32) -> TreeFrame<u32> {
        if n == 0 {
            TreeFrame::Node(n, Vec::new())
        } else {
            TreeFrame::Node(n, vec![n - 1, n - 1])
        }
    }

    #[test]
    fn collapse_counts_nodes() {
        let count: usize = expand_and_collapse::<TreeFrame<PartiallyApplied>, _, _>(
            4,
            expand,
            |TreeFrame::Node(_, xs)| 1 + xs.iter().sum::<usize>(),
        );
        assert_eq!(count, 31);
    }

    #[test]
    fn expands_siblings_left_to_right() {
        let mut visited = Vec::new();
        let _: () = expand_and_collapse::<TreeFrame<PartiallyApplied>, _, _>(
            (0u32, 2u32),
            |(id, depth)| {
                visited.push(id);
                if depth == 0 {
                    TreeFrame::Node(id, Vec::new())
                } else {
                    TreeFrame::Node(id, vec![(id * 2 + 1, depth - 1), (id * 2 + 2, depth - 1)])
                }
            },
            |_| (),
        );
        assert_eq!(visited, vec![0, 1, 3, 4, 2, 5, 6]);
    }

    #[test]
    fn first_error_aborts() {
        let mut expanded = 0;
        let res: Result<u32, &str> = try_expand_and_collapse::<TreeFrame<PartiallyApplied>, _, _, _>(
            3,
            |n| {
                expanded += 1;
                if n == 1 {
                    Err("bad seed")
                } else {
                    Ok(expand(n))
                }
            },
            |TreeFrame::Node(v, xs)| Ok(v + xs.iter().sum::<u32>()),
        );
        assert_eq!(res, Err("bad seed"));
        // 3 -> 2 -> 1 (fails) stops before any sibling is visited
        assert_eq!(expanded, 3);
    }

    #[test]
    fn deep_chains_do_not_use_the_call_stack() {
        let depth: usize = expand_and_collapse::<Option<PartiallyApplied>, _, _>(
            1_000_000usize,
            |n| if n == 0 { None } else { Some(n - 1) },
            |frame| frame.map_or(0, |d| d + 1),
        );
        assert_eq!(depth, 1_000_000);
    }

    impl MappableFrame for Option<PartiallyApplied> {
        type Frame<X> = Option<X>;

        fn map_frame<A, B>(input: Self::Frame<A>, f: impl FnMut(A) -> B) -> Self::Frame<B> {
            input.map(f)
        }
    }
}
