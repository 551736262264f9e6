pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

pub use app::collection::{OptionCollection, OptionNode};
pub use app::condition::ConditionSpec;
pub use app::helper::{ConfigHelper, Data};
pub use app::options::BuildOptions;
pub use domain::errors::SelectError;
pub use domain::model::{Entries, Entry, Mapping, OptionItem, OptionValue};

pub fn init() {
    infra::logging::init();
}
