//! Log-based presentation of cycle reports

use anyhow::Result;
use ecowitt_core::display::{render_sensor, render_soil, status_line};
use ecowitt_core::{CycleReport, ReportSink, SensorSnapshot};
use tracing::{debug, info, warn};

/// Logs snapshot rows when they change and fetch errors when they start or change
#[derive(Debug, Default)]
pub struct LogSink {
    last_rows: Vec<String>,
    last_error: Option<String>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

fn rows(snapshot: &SensorSnapshot) -> Vec<String> {
    snapshot
        .sensors
        .iter()
        .map(render_sensor)
        .chain(snapshot.soil.iter().map(render_soil))
        .collect()
}

#[async_trait::async_trait]
impl ReportSink for LogSink {
    async fn publish(&mut self, report: &CycleReport) -> Result<()> {
        match report {
            CycleReport::Snapshot(snapshot) => {
                if self.last_error.take().is_some() {
                    info!("Gateway reachable again");
                }
                let rows = rows(snapshot);
                if rows != self.last_rows {
                    for row in &rows {
                        info!("{row}");
                    }
                    self.last_rows = rows;
                }
                if !snapshot.missing.is_empty() {
                    debug!(missing = ?snapshot.missing, "Bound channels absent from payload");
                }
                debug!("{}", status_line(report));
            }
            CycleReport::Failed { message, .. } => {
                if self.last_error.as_deref() != Some(message.as_str()) {
                    warn!("{}", status_line(report));
                    self.last_error = Some(message.clone());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecowitt_core::{extract, resolve, AssignmentModel, LogicalSensor, SemanticType};
    use serde_json::json;

    fn snapshot(temp: &str) -> SensorSnapshot {
        let model = AssignmentModel {
            sensors: vec![LogicalSensor::new("Yard").bind(SemanticType::Temp, "0x02")],
            soil: vec![],
        };
        let readings = extract(&json!({
            "common_list": [{"id": "0x02", "val": temp, "unit": "F"}]
        }));
        resolve(&readings, &model, Default::default())
    }

    #[tokio::test]
    async fn test_tracks_changes() {
        let mut sink = LogSink::new();

        sink.publish(&CycleReport::Snapshot(snapshot("60.0")))
            .await
            .unwrap();
        assert_eq!(sink.last_rows, vec!["Yard: Temperature 60.00 F"]);

        sink.publish(&CycleReport::failed("Timed out waiting for gateway"))
            .await
            .unwrap();
        assert_eq!(
            sink.last_error.as_deref(),
            Some("Timed out waiting for gateway")
        );
        assert_eq!(sink.last_rows.len(), 1);

        sink.publish(&CycleReport::Snapshot(snapshot("61.5")))
            .await
            .unwrap();
        assert!(sink.last_error.is_none());
        assert_eq!(sink.last_rows, vec!["Yard: Temperature 61.50 F"]);
    }
}
