//! Per-tool event handlers

pub(crate) mod ortho;
pub(crate) mod select;
pub(crate) mod shape;
pub(crate) mod text;
