pub mod config_service;
pub mod file_key_value_store;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_key_value_store::FileKeyValueStore;
pub use crate::paths::CorpoPaths;
