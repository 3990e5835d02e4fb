//! Which data directory this process serves from.

use crate::{config::DataConfig, log};
use std::path::{Path, PathBuf};

/// The data directory chosen at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRoot {
    pub dir: PathBuf,
    pub index: PathBuf,
}

impl DataRoot {
    /// Use the production bundle when it carries the index, otherwise the
    /// development tree. Relative candidates are taken from `root`.
    pub fn resolve(root: &Path, data: &DataConfig) -> Self {
        let production = root.join(&data.production);
        let dir = if production.join(&data.index).is_file() {
            production
        } else {
            let development = root.join(&data.development);
            log!(
                "serve";
                "no index in {}, using {}",
                production.display(),
                development.display()
            );
            development
        };
        Self {
            index: dir.join(&data.index),
            dir,
        }
    }
}
