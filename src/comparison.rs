use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Relational operator usable in a subgroup condition.
///
/// Which operators are legal for a column is decided by the attribute
/// (`Attribute::comparisons`), not by this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Comparison {
    Eq,
    Neq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

impl Comparison {
    pub const ALL: [Comparison; 6] = [
        Comparison::Eq,
        Comparison::Neq,
        Comparison::Lt,
        Comparison::Gt,
        Comparison::LtEq,
        Comparison::GtEq,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Neq => "!=",
            Comparison::Lt => "<",
            Comparison::Gt => ">",
            Comparison::LtEq => "<=",
            Comparison::GtEq => ">=",
        }
    }

    /// Whether `left <op> right` holds, given `left.cmp(right)`.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Neq => ordering != Ordering::Equal,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::LtEq => ordering != Ordering::Greater,
            Comparison::GtEq => ordering != Ordering::Less,
        }
    }

    /// Split `"attr<=value"` into its three parts.
    ///
    /// Two-character operators are tried first so `<=` is not read as `<`.
    pub fn split_condition(text: &str) -> Option<(&str, Comparison, &str)> {
        let mut ops = Comparison::ALL;
        ops.sort_by_key(|op| std::cmp::Reverse(op.symbol().len()));

        // Leftmost operator wins; longer symbols break ties at the same index.
        let mut best: Option<(usize, Comparison)> = None;
        for op in ops {
            if let Some(idx) = text.find(op.symbol()) {
                match best {
                    Some((b, _)) if b <= idx => {}
                    _ => best = Some((idx, op)),
                }
            }
        }
        let (idx, op) = best?;
        let left = text[..idx].trim();
        let right = text[idx + op.symbol().len()..].trim();
        if left.is_empty() || right.is_empty() {
            return None;
        }
        Some((left, op, right))
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Comparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Comparison::ALL
            .into_iter()
            .find(|op| op.symbol() == s.trim())
            .ok_or_else(|| format!("unknown comparison operator '{s}'"))
    }
}
