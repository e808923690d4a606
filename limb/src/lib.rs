//! Generic recursion schemes (`cata`, `ana`, `para`, `apo`) over any tree-shaped type.
//!
//! A recursive type describes its variants once via [`Shape`], then implements
//! [`Project`] and/or [`Embed`]. From there it can be split into one [`Layer`] at a time
//! (labels plus child positions), transformed, and rebuilt, and all traversal is driven
//! by a heap-allocated stack machine instead of the call stack.
mod error;
mod frame;
mod layer;
mod recursive;
pub mod schemes;

pub use error::{BoxError, LayerError, SlotError};
pub use frame::{expand_and_collapse, try_expand_and_collapse, MappableFrame, PartiallyApplied};
pub use layer::{Field, FieldDecl, FieldKind, Fields, Layer, Slot};
pub use recursive::{Embed, Project, Shape};
pub use schemes::Either;
