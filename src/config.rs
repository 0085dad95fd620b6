//! Configuration for the recommendation engine
//!
//! Unlike a network service, this engine takes no environment-variable or
//! file-based configuration surface: the caller constructs an [`EngineConfig`]
//! programmatically and passes it to [`crate::Engine::open`].

use std::path::{Path, PathBuf};

/// Configuration for opening an [`Engine`](crate::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the embedded store file. Created if it does not exist.
    pub store_path: PathBuf,
    /// Optional override of the underlying store's in-memory page cache size,
    /// in bytes. `None` uses the store's own default.
    pub cache_size_bytes: Option<usize>,
}

impl EngineConfig {
    /// Build a config pointing at the given store file path, using default
    /// cache sizing.
    pub fn new(store_path: impl AsRef<Path>) -> Self {
        Self {
            store_path: store_path.as_ref().to_path_buf(),
            cache_size_bytes: None,
        }
    }

    /// Override the store's page cache size.
    pub fn with_cache_size_bytes(mut self, bytes: usize) -> Self {
        self.cache_size_bytes = Some(bytes);
        self
    }
}
