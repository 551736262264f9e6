//! Core types shared by the selection engine.

pub mod errors;
pub mod model;
