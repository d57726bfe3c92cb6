//! Canned payload source for tests and offline runs

use crate::{FetchError, FetchResult, TelemetrySource};
use serde_json::Value;
use std::collections::VecDeque;

/// Replays queued fetch outcomes in order. In repeating mode the last
/// payload is served forever once the queue drains.
pub struct FixtureSource {
    queue: VecDeque<FetchResult<Value>>,
    repeat: Option<Value>,
}

impl FixtureSource {
    pub fn sequence<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = FetchResult<Value>>,
    {
        Self {
            queue: outcomes.into_iter().collect(),
            repeat: None,
        }
    }

    pub fn payloads<I>(payloads: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::sequence(payloads.into_iter().map(Ok))
    }

    pub fn repeating(payload: Value) -> Self {
        Self {
            queue: VecDeque::new(),
            repeat: Some(payload),
        }
    }

    pub fn push(&mut self, outcome: FetchResult<Value>) {
        self.queue.push_back(outcome);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait::async_trait]
impl TelemetrySource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch(&mut self) -> FetchResult<Value> {
        match self.queue.pop_front() {
            Some(outcome) => outcome,
            None => self.repeat.clone().ok_or(FetchError::Exhausted),
        }
    }
}
