use crate::layer::FieldKind;

/// Boxed error returned by [`crate::Embed::from_fields`] implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures raised while decomposing, looking up, or rebuilding a [`crate::Layer`].
///
/// None of these are recoverable mid-traversal: they all mean a recursive type's
/// declared shape and its actual `Project`/`Embed` impls disagree, or a caller
/// built a layer by hand with the wrong number of fields.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    /// `Project::into_slots` produced something other than the declared signature.
    #[error("cannot read {tag} as declared: {reason}")]
    Access { tag: String, reason: String },

    /// `Embed::from_fields` rejected a layer.
    #[error("failed to rebuild {tag} from layer")]
    Reconstruction {
        tag: String,
        #[source]
        source: BoxError,
    },

    /// `Shape::fields` declared the same name twice for one variant.
    #[error("{tag} declares field '{name}' more than once")]
    DuplicateField { tag: String, name: &'static str },

    #[error("{tag} has no {kind} field named '{name}'")]
    NotFound {
        tag: String,
        name: String,
        kind: FieldKind,
    },

    #[error(
        "{tag} declares {expected_labels} labels and {expected_children} children, \
         got {got_labels} labels and {got_children} children"
    )]
    ShapeMismatch {
        tag: String,
        expected_labels: usize,
        got_labels: usize,
        expected_children: usize,
        got_children: usize,
    },
}

/// Misuse of the [`crate::Fields`] cursor inside an `Embed` impl.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("asked for a {wanted} but all fields were consumed")]
    Exhausted { wanted: FieldKind },

    #[error("field '{name}' is a {found}, not a {wanted}")]
    KindMismatch {
        name: &'static str,
        wanted: FieldKind,
        found: FieldKind,
    },

    #[error("{remaining} field(s) left unconsumed, starting at '{next}'")]
    Unconsumed { next: &'static str, remaining: usize },
}
