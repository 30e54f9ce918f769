//! Core data types for the Tandem pipeline

pub mod message;
pub mod metadata;
pub mod result;
pub mod usage;
