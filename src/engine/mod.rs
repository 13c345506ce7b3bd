//! Core engine — compose the message and run the fetch → advise → send pipeline.

pub mod composer;
pub mod pipeline;
