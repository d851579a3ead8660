//! Converts flat per-event collision ntuples into per-event jet graphs for
//! edge-classification training: which jet pairs came from the same Higgs.
//!
//! Pipeline: load flat columns → strip padded jets / thin events → build one
//! fully-connected (minus self-loops) graph per surviving event → write a
//! single indexable parquet artifact.

pub mod config;
pub mod data;
pub mod kinematics;
pub mod pipeline;
