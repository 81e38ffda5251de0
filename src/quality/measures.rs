//! Rule-learning heuristics from J. Fürnkranz, P.A. Flach, "ROC 'n' Rule
//! Learning - Towards a Better Understanding of Covering Algorithms",
//! Machine Learning 58(1):39-77, 2005.

use super::QualityMeasure;

/// Declares a measure type holding only its acceptance threshold.
macro_rules! quality_measure {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $formula:literal, |$p:ident, $n:ident, $big_p:ident, $big_n:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $ty {
            minimum_value: f64,
        }

        impl $ty {
            pub const NAME: &'static str = $name;
            pub const FORMULA: &'static str = $formula;

            pub fn new(minimum_value: f64) -> Self {
                Self { minimum_value }
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new(f64::NEG_INFINITY)
            }
        }

        impl QualityMeasure for $ty {
            #[allow(non_snake_case, unused_variables)]
            fn evaluate(&self, $p: f64, $n: f64, $big_p: f64, $big_n: f64) -> f64 {
                $body
            }

            fn formula(&self) -> &str {
                Self::FORMULA
            }

            fn name(&self) -> &str {
                Self::NAME
            }

            fn minimum_value(&self) -> f64 {
                self.minimum_value
            }
        }
    };
}

quality_measure!(
    /// Coverage times the gain in precision over the dataset's base rate
    /// (page 49 of the paper).
    WeightedRelativeAccuracy,
    "Weighted Relative Accuracy",
    "((p + n) / (P + N)) * (p / (p + n) - P / (P + N))",
    |p, n, P, N| ((p + n) / (P + N)) * (p / (p + n) - P / (P + N))
);

quality_measure!(
    /// Recall of the positive class.
    Sensitivity,
    "Sensitivity",
    "p / P",
    |p, n, P, N| p / P
);

quality_measure!(
    Precision,
    "Precision",
    "p / (p + n)",
    |p, n, P, N| p / (p + n)
);

quality_measure!(
    /// Share of negatives left uncovered.
    Specificity,
    "Specificity",
    "(N - n) / N",
    |p, n, P, N| (N - n) / N
);

quality_measure!(
    Accuracy,
    "Accuracy",
    "(p + N - n) / (P + N)",
    |p, n, P, N| (p + N - n) / (P + N)
);

quality_measure!(
    /// Precision with a Laplace correction for two classes; finite even on
    /// an empty subgroup.
    Laplace,
    "Laplace",
    "(p + 1) / (p + n + 2)",
    |p, n, P, N| (p + 1.0) / (p + n + 2.0)
);
