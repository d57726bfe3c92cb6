//! Periodic refresh scheduler

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use ecowitt_core::{AssignmentModel, CycleReport, ReportSink};
use ecowitt_ingest::RefreshEngine;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Scheduler runs one refresh cycle per tick and hands each report to the sinks.
///
/// Cycles never overlap: a tick that comes due while a cycle is still running
/// is delayed until it finishes.
pub struct Scheduler {
    engine: RefreshEngine,
    assignment: watch::Receiver<Arc<AssignmentModel>>,
    sinks: Vec<Box<dyn ReportSink>>,
    period: Duration,
}

impl Scheduler {
    pub fn new(
        engine: RefreshEngine,
        assignment: watch::Receiver<Arc<AssignmentModel>>,
        period: Duration,
    ) -> Self {
        Self {
            engine,
            assignment,
            sinks: Vec::new(),
            period,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    /// Run until the future is dropped
    pub async fn run(&mut self) -> Result<()> {
        info!(
            source = self.engine.source_name(),
            period_ms = self.period.as_millis() as u64,
            "Scheduler started"
        );

        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// One fetch-resolve-publish cycle against the assignment current at its start
    pub async fn run_cycle(&mut self) -> CycleReport {
        let assignment = self.assignment.borrow_and_update().clone();
        let started = Instant::now();

        let report = self.engine.cycle(&assignment).await;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            failed = report.is_failure(),
            "Cycle complete"
        );

        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.publish(&report).await {
                warn!("Error publishing report: {}", e);
            }
        }
        report
    }
}
