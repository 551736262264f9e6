//! Application layer: the selection engine and its facade.

pub mod collection;
pub mod condition;
pub mod extract;
pub mod helper;
pub mod keys;
pub mod options;
pub mod publish;
pub mod render;
