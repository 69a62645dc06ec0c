//! Persistence adapters

pub mod file_store;
pub mod local_directory;

pub use file_store::JsonFileStore;
pub use local_directory::LocalDirectory;
