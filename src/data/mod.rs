//! Data layer: schema, event batch, filtering, graph building, persistence.
//!
//! Architecture:
//! ```text
//!  .parquet / .json / .csv ntuple
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  flat branch columns → EventBatch
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  pt mask → multiplicity mask → match-index rewrites
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  graph    │  per event: edges, pair features, match labels
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  writer   │  Vec<GraphRecord> → one parquet artifact
//!   └──────────┘
//! ```

pub mod filter;
pub mod graph;
pub mod loader;
pub mod model;
pub mod schema;
pub mod writer;
