//! One fetch-extract-resolve cycle

use crate::{FetchResult, TelemetrySource};
use chrono::Utc;
use ecowitt_core::{extract, resolve, AssignmentModel, CycleReport, RawReading, SensorSnapshot};
use tracing::debug;

/// Drives a telemetry source through refresh cycles.
///
/// Holds no reading state of its own: every cycle starts from a fresh payload.
pub struct RefreshEngine {
    source: Box<dyn TelemetrySource>,
}

impl RefreshEngine {
    pub fn new(source: Box<dyn TelemetrySource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch and extract without resolving, for building an assignment
    pub async fn scan(&mut self) -> FetchResult<Vec<RawReading>> {
        let payload = self.source.fetch().await?;
        Ok(extract(&payload))
    }

    /// A fetch failure fails the whole cycle; there are no partial snapshots.
    pub async fn refresh(&mut self, assignment: &AssignmentModel) -> FetchResult<SensorSnapshot> {
        let readings = self.scan().await?;
        debug!(
            source = self.source.name(),
            readings = readings.len(),
            "Extracted readings"
        );
        Ok(resolve(&readings, assignment, Utc::now()))
    }

    pub async fn cycle(&mut self, assignment: &AssignmentModel) -> CycleReport {
        match self.refresh(assignment).await {
            Ok(snapshot) => CycleReport::Snapshot(snapshot),
            Err(e) => CycleReport::failed(e.to_string()),
        }
    }
}
