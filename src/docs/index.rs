//! The aggregate docs index, a single cached document.

use super::{
    ApiError, CacheStatus, Lookup,
    ttl::{Clock, TtlCache},
};
use serde_json::Value;
use std::{fs, io, path::PathBuf, sync::Arc, time::Duration};

pub struct IndexStore {
    path: PathBuf,
    cache: TtlCache<(), Arc<Value>>,
    clock: Arc<dyn Clock>,
}

impl IndexStore {
    pub fn new(path: PathBuf, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            path,
            cache: TtlCache::new(ttl),
            clock,
        }
    }

    pub fn get(&self) -> Result<Lookup, ApiError> {
        if let Some(value) = self.cache.get(&(), self.clock.now()) {
            return Ok(Lookup {
                value,
                cache: CacheStatus::Hit,
            });
        }

        let content = fs::read_to_string(&self.path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ApiError::Unavailable(self.path.clone()),
            _ => ApiError::Io {
                path: self.path.clone(),
                source,
            },
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|source| ApiError::Parse {
            path: self.path.clone(),
            source,
        })?;
        if !(value.is_object() || value.is_array()) {
            return Err(ApiError::Shape(self.path.clone()));
        }

        let value = Arc::new(value);
        self.cache.insert((), Arc::clone(&value), self.clock.now());
        Ok(Lookup {
            value,
            cache: CacheStatus::Miss,
        })
    }
}
