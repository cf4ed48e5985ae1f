//! Periodic JSON snapshots of the engine's read surface
//!
//! The writer only consumes the public query API. Files are overwritten in place
//! on every pass; a failed pass is not retried.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::engine::Engine;
use crate::error::Result;
use crate::models::{AlarmQuery, EventQuery, KpiQuery};

pub const STATUS_FILE: &str = "platform_status.json";
pub const ALARMS_FILE: &str = "alarms.json";
pub const KPI_SUMMARY_FILE: &str = "kpi_summary.json";
pub const EVENTS_FILE: &str = "events.json";

/// Writes status, alarms, KPI summaries and events into one directory
pub struct SnapshotWriter {
    engine: Engine,
    directory: PathBuf,
}

impl SnapshotWriter {
    pub fn new(engine: Engine, directory: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write every snapshot file once
    pub fn write_all(&self) -> Result<()> {
        fs::create_dir_all(&self.directory)?;

        self.write(STATUS_FILE, &self.engine.status())?;
        self.write(ALARMS_FILE, &self.engine.alarms(&AlarmQuery::default()))?;
        self.write(
            KPI_SUMMARY_FILE,
            &self.engine.kpi_summary(&KpiQuery::default()),
        )?;
        self.write(EVENTS_FILE, &self.engine.events(&EventQuery::default()))?;

        debug!(directory = %self.directory.display(), "Wrote snapshots");
        Ok(())
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let body = serde_json::to_vec_pretty(value)?;
        fs::write(self.directory.join(name), body)?;
        Ok(())
    }
}
