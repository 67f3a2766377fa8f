//! Reciprocal best hit (RBH) ortholog detection between proteomes.
//!
//! The pipeline runs an external protein aligner in both directions
//! (query against subject, subject against query), parses and filters the
//! tabular hits, keeps the best hit per sequence, and reports the pairs
//! that are each other's best match.

pub mod libs;

pub use crate::libs::io::{reader, writer};
