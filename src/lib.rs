//! Attribute abstraction and quality measures for subgroup discovery.
//!
//! ```text
//!   data::loader ──► data::model::Dataset ──► data::filter (conditions)
//!                          │                          │
//!                     attribute::*               quality::ConfusionTable
//!                                                     │
//!                                          quality::QualityMeasure
//! ```
//!
//! The search that enumerates candidate subgroups lives outside this crate;
//! [`session::Session`] only scores the subgroups it is handed.

pub mod attribute;
pub mod comparison;
pub mod data;
pub mod error;
pub mod quality;
pub mod session;

pub use attribute::{Attribute, AttributeKind, NominalAttribute, NumericAttribute, TypedAttribute};
pub use comparison::Comparison;
pub use data::filter::{covered_indices, Condition};
pub use data::loader::{load_file, LoadOptions};
pub use data::model::{Cell, Dataset, Instance, Value};
pub use error::{AttributeError, QualityError};
pub use quality::{measure_by_name, ConfusionTable, MeasureConfig, QualityMeasure};
pub use session::{Evaluation, Session};
