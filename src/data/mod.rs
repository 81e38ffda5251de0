//! Data layer: schema, rows, loading and condition coverage.
//!
//! Architecture:
//! ```text
//!  .arff / .csv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  header → attributes, tokens → Attribute::convert_cell
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset   │  Vec<Box<dyn Attribute>>, Vec<Instance>, class column
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  conjunction of conditions → covered indices
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
