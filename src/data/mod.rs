/// Data layer: rules, extraction, and export.
///
/// Architecture:
/// ```text
///   molecule + band
///        │
///        ▼
///   ┌──────────┐
///   │ registry  │  look up Rule (rules: fields, span, criteria)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  stream .par lines → tokens
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  band key ∈ criteria? → build LineRecord
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ LineTable │  rows in file order → export (csv / json / parquet)
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod registry;
pub mod rules;
