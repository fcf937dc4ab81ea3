//! Deterministic `CalendarSource` for tests and demos.
//!
//! `MockCalendarSource` plays a script of behaviors, one per fetch, and keeps
//! repeating the last one once the script is exhausted.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use tempo_core::{CalendarSource, FetchWindow, RawTempoEntry, TempoColor, TempoError};

/// Fixture builders for raw calendar entries.
pub mod fixtures;

/// What one fetch does.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return these entries regardless of the window.
    Return(Vec<RawTempoEntry>),
    /// Return the days of this calendar that fall inside the requested window.
    Calendar(BTreeMap<NaiveDate, TempoColor>),
    /// Fail with the provided error.
    Fail(TempoError),
    /// Never complete (simulate a stalled request).
    Hang,
}

/// Scripted calendar source.
#[derive(Debug)]
pub struct MockCalendarSource {
    name: &'static str,
    script: Mutex<VecDeque<MockBehavior>>,
    windows: Mutex<Vec<FetchWindow>>,
    calls: AtomicUsize,
}

impl MockCalendarSource {
    /// Source playing `script` in order. An empty script fails every fetch.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = MockBehavior>) -> Self {
        Self {
            name: "tempo-mock",
            script: Mutex::new(script.into_iter().collect()),
            windows: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Source always serving `days`.
    #[must_use]
    pub fn serving(days: impl IntoIterator<Item = (NaiveDate, TempoColor)>) -> Self {
        Self::new([MockBehavior::Calendar(days.into_iter().collect())])
    }

    /// Override the name reported in logs.
    #[must_use]
    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Append a behavior to the script.
    pub fn push(&self, behavior: MockBehavior) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(behavior);
    }

    /// Number of fetches started so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Windows requested so far, in call order.
    #[must_use]
    pub fn windows(&self) -> Vec<FetchWindow> {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_behavior(&self) -> Option<MockBehavior> {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }
}

#[async_trait]
impl CalendarSource for MockCalendarSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_calendar(&self, window: &FetchWindow) -> Result<Vec<RawTempoEntry>, TempoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(window.clone());

        match self.next_behavior() {
            Some(MockBehavior::Return(entries)) => Ok(entries),
            Some(MockBehavior::Calendar(days)) => {
                let tz = window.start.timezone();
                Ok(days
                    .range(window.start_date()..window.end_date())
                    .map(|(date, color)| fixtures::entry(&tz, *date, *color))
                    .collect())
            }
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Err(TempoError::network("mock script is empty")),
        }
    }
}
