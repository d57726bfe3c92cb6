use anyhow::Result;

use crate::CycleReport;

/// Receives the outcome of every refresh cycle
#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    async fn publish(&mut self, report: &CycleReport) -> Result<()>;
}
