pub mod config_storage;
pub mod paths;
pub mod revision;

pub use config_storage::{load_config, load_user_config};
pub use paths::{AiviPaths, PathError};
pub use revision::RevisionManager;
