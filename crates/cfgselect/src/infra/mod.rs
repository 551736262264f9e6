//! Infrastructure adapters for config sources, localization, escaping, and logging.

pub mod config;
pub mod escape;
pub mod i18n;
pub mod logging;
pub mod source;
