//! Shared helpers that are not specific to one stage of the pipeline.

pub mod validation;
