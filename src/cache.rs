// Memoized base-table loads.
//
// A `TableCache` is created by the caller and handed to whatever needs the
// base table. Entries are keyed by both files' canonical path, size and
// modification time; there is no invalidation beyond `clear`.
use crate::config::SourceConfig;
use crate::error::{ReportError, Result};
use crate::loader::{self, LoadReport, LOCATION_SOURCE, WASTE_SOURCE};
use crate::types::FactTable;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceKey {
    pub fn of(source_name: &'static str, source: &SourceConfig) -> Result<SourceKey> {
        let path = source
            .path
            .canonicalize()
            .map_err(|e| ReportError::load(source_name, &source.path, e))?;
        let meta =
            std::fs::metadata(&path).map_err(|e| ReportError::load(source_name, &path, e))?;
        Ok(SourceKey {
            path,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }

    pub fn modified_utc(&self) -> Option<DateTime<Utc>> {
        self.modified.map(DateTime::<Utc>::from)
    }
}

/// A loaded base table together with how it was produced.
#[derive(Debug)]
pub struct Dataset {
    pub table: FactTable,
    pub report: LoadReport,
    pub waste_key: SourceKey,
    pub location_key: SourceKey,
    pub loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// One line naming both source files, their modification times and when
    /// the table was built, e.g. for a console banner.
    pub fn provenance(&self) -> String {
        format!(
            "{} ({}) + {} ({}), loaded {}",
            file_name(&self.waste_key),
            stamp(self.waste_key.modified_utc()),
            file_name(&self.location_key),
            stamp(self.location_key.modified_utc()),
            stamp(Some(self.loaded_at)),
        )
    }
}

fn file_name(key: &SourceKey) -> String {
    key.path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| key.path.display().to_string())
}

fn stamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[derive(Debug, Default)]
pub struct TableCache {
    entries: Mutex<HashMap<(SourceKey, SourceKey), Arc<Dataset>>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for these two sources, loading it on a miss.
    /// A failed load leaves the cache untouched.
    pub fn get_or_load(
        &self,
        waste: &SourceConfig,
        location: &SourceConfig,
    ) -> Result<Arc<Dataset>> {
        let key = (
            SourceKey::of(WASTE_SOURCE, waste)?,
            SourceKey::of(LOCATION_SOURCE, location)?,
        );
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = entries.get(&key) {
            debug!(waste = %key.0.path.display(), "base table cache hit");
            return Ok(Arc::clone(hit));
        }

        debug!(waste = %key.0.path.display(), "base table cache miss");
        let (table, report) = loader::load(waste, location)?;
        let dataset = Arc::new(Dataset {
            table,
            report,
            waste_key: key.0.clone(),
            location_key: key.1.clone(),
            loaded_at: Utc::now(),
        });
        entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
