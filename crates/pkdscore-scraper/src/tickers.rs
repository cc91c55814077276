//! On-disk cache of resolved Yahoo symbols (`tickers_cache.json`).
//!
//! The file is a sorted JSON array of strings. Resolving tickers means one
//! page fetch per listed company, so known symbols are kept between runs and
//! only new ones are added.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::ScraperError;

#[derive(Debug, Clone, Default)]
pub struct TickerCache {
    path: PathBuf,
    symbols: BTreeSet<String>,
}

impl TickerCache {
    /// Load the cache at `path`. A missing file is an empty cache; a file
    /// that does not parse is logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Io`] if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self, ScraperError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::empty(path));
            }
            Err(e) => {
                return Err(ScraperError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let symbols = match serde_json::from_str::<Vec<Option<String>>>(&content) {
            Ok(entries) => entries
                .into_iter()
                .flatten()
                .filter(|s| is_valid_symbol(s))
                .collect(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ticker cache unreadable, starting empty");
                BTreeSet::new()
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            symbols,
        })
    }

    #[must_use]
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            symbols: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// Add `symbols`, returning how many were new. Blank and `nan` entries
    /// are ignored.
    pub fn merge<I, S>(&mut self, symbols: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        symbols
            .into_iter()
            .map(Into::into)
            .filter(|s| is_valid_symbol(s))
            .filter(|s| self.symbols.insert(s.clone()))
            .count()
    }

    /// Symbols in sorted order.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        self.symbols.iter().cloned().collect()
    }

    /// Write the cache as a sorted JSON array, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Io`] if the file cannot be written.
    pub fn save(&self) -> Result<(), ScraperError> {
        let io_err = |e: std::io::Error| ScraperError::Io {
            path: self.path.clone(),
            source: e,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string(&self.symbols()).map_err(|e| ScraperError::Deserialize {
            context: format!("ticker cache {}", self.path.display()),
            source: e,
        })?;
        std::fs::write(&self.path, json).map_err(io_err)
    }
}

fn is_valid_symbol(symbol: &str) -> bool {
    let trimmed = symbol.trim();
    !trimmed.is_empty() && !trimmed.contains("nan")
}
