//! Two-tier (memory + disk) response cache
//!
//! Bodies live in an in-process map for the lifetime of the run and in files
//! under a cache directory across runs. Both tiers share one freshness
//! window; disk freshness is judged by file modification time. Concurrent
//! writers race last-writer-wins, which is fine since bodies for the same
//! URL within the window are expected to be identical.

use crate::cache::ResponseCache;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default freshness window: 24 hours
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct CachedBody {
    body: String,
    stored_at: Instant,
}

/// Memory + disk response cache with a fixed freshness window
pub struct HttpCache {
    memory: Mutex<HashMap<String, CachedBody>>,
    dir: PathBuf,
    ttl: Duration,
}

impl HttpCache {
    /// Creates a cache rooted at `dir`, creating the directory if needed
    pub fn new(dir: &Path, ttl: Duration) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            memory: Mutex::new(HashMap::new()),
            dir: dir.to_path_buf(),
            ttl,
        })
    }

    /// Opens the cache at the platform cache directory
    /// (e.g. `~/.cache/stardeps`) with the default 24h window
    pub fn open_default() -> std::io::Result<Self> {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(env!("CARGO_PKG_NAME"));
        Self::new(&dir, DEFAULT_TTL)
    }

    /// Removes all cached bodies, memory and disk
    pub fn clear(&self) -> std::io::Result<()> {
        if let Ok(mut memory) = self.memory.lock() {
            memory.clear();
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "html") {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn cache_key(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.html"))
    }
}

impl ResponseCache for HttpCache {
    fn get(&self, url: &str) -> Option<String> {
        let key = Self::cache_key(url);

        // Memory tier first
        if let Ok(memory) = self.memory.lock() {
            if let Some(cached) = memory.get(&key) {
                if cached.stored_at.elapsed() < self.ttl {
                    return Some(cached.body.clone());
                }
            }
        }

        // Disk tier; freshness from file mtime
        let path = self.file_path(&key);
        let modified = std::fs::metadata(&path).ok()?.modified().ok()?;
        let age = modified.elapsed().ok()?;
        if age >= self.ttl {
            return None;
        }
        let body = std::fs::read_to_string(&path).ok()?;

        // Promote to memory for faster repeat access
        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(
                key,
                CachedBody {
                    body: body.clone(),
                    stored_at: Instant::now(),
                },
            );
        }

        Some(body)
    }

    fn set(&self, url: &str, body: &str) {
        let key = Self::cache_key(url);

        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(
                key.clone(),
                CachedBody {
                    body: body.to_string(),
                    stored_at: Instant::now(),
                },
            );
        }

        if let Err(e) = std::fs::write(self.file_path(&key), body) {
            tracing::warn!("Failed to write cache file for {}: {}", url, e);
        }
    }
}
