use crate::attribute::AttributeKind;
use crate::comparison::Comparison;

// ---------------------------------------------------------------------------
// Attribute errors
// ---------------------------------------------------------------------------

/// Errors raised while converting, extracting or constraining attribute values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttributeError {
    /// A raw token could not be parsed into the attribute's native type.
    #[error("attribute '{attribute}': cannot convert '{token}': {reason}")]
    Format {
        attribute: String,
        token: String,
        reason: String,
    },

    /// The instance does not store a value of the expected type at this id.
    /// Means the dataset and the attribute set disagree on the schema.
    #[error("attribute '{attribute}' (id {id}): instance holds {found}")]
    TypeMismatch {
        attribute: String,
        id: usize,
        found: String,
    },

    /// The comparison is not declared by the attribute's `comparisons()`.
    #[error("attribute '{attribute}' ({kind}) does not support '{comparison}'")]
    UnsupportedComparison {
        attribute: String,
        kind: AttributeKind,
        comparison: Comparison,
    },

    /// A condition was built against the missing-value token.
    #[error("attribute '{attribute}': conditions need a present value")]
    MissingConditionValue { attribute: String },

    #[error("attribute names must not be empty (id {id})")]
    EmptyName { id: usize },
}

// ---------------------------------------------------------------------------
// Quality errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QualityError {
    #[error("unknown quality measure '{name}' (available: {available})")]
    UnknownMeasure { name: String, available: String },

    /// Counts violate `0 <= p <= P`, `0 <= n <= N` or `P + N > 0`.
    #[error("invalid confusion table p={p} n={n} P={big_p} N={big_n}")]
    InvalidConfusionTable {
        p: f64,
        n: f64,
        big_p: f64,
        big_n: f64,
    },
}
