//! Data layer: core types, loading, column resolution and filtering.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → GrainTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────┐
//!   │ GrainTable │  named columns aligned by row, row index
//!   └────────────┘
//!        │
//!        ▼
//!   ┌──────────┐      ┌─────────┐
//!   │  filter  │ ◀─── │ resolve │  isotope pair → column header
//!   └──────────┘      └─────────┘
//!        │
//!        ▼
//!   selected row indices
//! ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod resolve;
