//! Per-topic JSON documents under the data directory.

use super::{
    ApiError, CacheStatus, Lookup,
    ttl::{Clock, TtlCache},
};
use regex::Regex;
use serde_json::Value;
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
    sync::{Arc, LazyLock},
    time::Duration,
};

pub const MAX_TOPIC_LEN: usize = 100;

static TOPIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.-]+$").unwrap());

/// Reject anything that could name a path other than `{base}/{topic}.json`.
pub fn validate_topic(topic: &str) -> Result<(), ApiError> {
    let reject = |reason: &str| Err(ApiError::Validation(reason.to_owned()));

    if topic.is_empty() {
        return reject("topic is required");
    }
    if topic.len() > MAX_TOPIC_LEN {
        return reject("topic is too long");
    }
    if topic.contains("..") || topic.contains(['/', '\\']) {
        return reject("topic must not contain path separators");
    }
    if !TOPIC_RE.is_match(topic) {
        return reject("topic may only contain letters, digits, '-' and '.'");
    }
    Ok(())
}

pub struct TopicStore {
    base: PathBuf,
    cache: TtlCache<String, Arc<Value>>,
    clock: Arc<dyn Clock>,
}

impl TopicStore {
    /// `base` must be absolute; it is the resolved data directory.
    pub fn new(base: PathBuf, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            base: lexical_normalize(&base),
            cache: TtlCache::new(ttl),
            clock,
        }
    }

    pub fn get(&self, topic: &str) -> Result<Lookup, ApiError> {
        validate_topic(topic)?;
        let path = self.resolve(topic)?;

        if let Some(value) = self.cache.get(topic, self.clock.now()) {
            return Ok(Lookup {
                value,
                cache: CacheStatus::Hit,
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ApiError::NotFound(topic.to_owned()),
            _ => ApiError::Io {
                path: path.clone(),
                source,
            },
        })?;
        let value: Arc<Value> = serde_json::from_str::<Value>(&content)
            .map_err(|source| ApiError::Parse { path, source })?
            .into();

        self.cache
            .insert(topic.to_owned(), Arc::clone(&value), self.clock.now());
        Ok(Lookup {
            value,
            cache: CacheStatus::Miss,
        })
    }

    /// `{base}/{topic}.json`, refused unless it stays under `base`.
    fn resolve(&self, topic: &str) -> Result<PathBuf, ApiError> {
        let path = lexical_normalize(&self.base.join(format!("{topic}.json")));
        if path.starts_with(&self.base) && path != self.base {
            Ok(path)
        } else {
            Err(ApiError::Validation("topic escapes the data directory".into()))
        }
    }
}

/// Resolve `.` and `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
