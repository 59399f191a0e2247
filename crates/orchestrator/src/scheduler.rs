// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic maintenance job timers with wall-clock next-run computation,
//! per spec.md §4.9. Grounded on the teacher's `engine::Scheduler`
//! (a named-timer map with `fired_timers`/`next_deadline`), generalized
//! from `Instant`-relative timers to wall-clock `chrono` targets since
//! this scheduler's first-run times are calendar-relative ("today at
//! 06:00"), not purely interval-relative.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Weekday};
use oc_core::{Clock, ScheduledJobName, ScheduledJobState};
use oc_storage::{AtomicStore, VersionedList};
use parking_lot::Mutex;
use std::path::PathBuf;

use crate::error::OrchestratorError;

/// Computes the first-run wall-clock target (in ms since epoch) for a job,
/// given the current instant.
pub fn first_run_at_ms(name: ScheduledJobName, now_ms: i64) -> i64 {
    let now = millis_to_local(now_ms);
    let target = match name {
        ScheduledJobName::QualityScan => next_full_hour(now),
        ScheduledJobName::ArchitectureSweep => next_daily_at(now, 6, 0),
        ScheduledJobName::DocGardening => next_daily_at(now, 7, 0),
        ScheduledJobName::GcSweep => next_weekday_at(now, Weekday::Sun, 3, 0),
    };
    target.timestamp_millis()
}

fn millis_to_local(now_ms: i64) -> DateTime<Local> {
    Local
        .timestamp_millis_opt(now_ms)
        .single()
        .unwrap_or_else(Local::now)
}

fn next_full_hour(now: DateTime<Local>) -> DateTime<Local> {
    let base = now
        .with_minute(0)
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(now);
    if base > now {
        base
    } else {
        base + chrono::Duration::hours(1)
    }
}

fn next_daily_at(now: DateTime<Local>, hour: u32, minute: u32) -> DateTime<Local> {
    let today = now
        .with_hour(hour)
        .and_then(|d| d.with_minute(minute))
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(now);
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

fn next_weekday_at(now: DateTime<Local>, weekday: Weekday, hour: u32, minute: u32) -> DateTime<Local> {
    let mut candidate = now
        .with_hour(hour)
        .and_then(|d| d.with_minute(minute))
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(now);
    while candidate.weekday() != weekday || candidate <= now {
        candidate += chrono::Duration::days(1);
    }
    candidate
}

/// Named periodic jobs with computed next-run timestamps. A job cannot run
/// concurrently with itself (`running` guard per name).
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    store: AtomicStore<VersionedList<ScheduledJobState>>,
    states: Mutex<HashMap<ScheduledJobName, ScheduledJobState>>,
    running: Mutex<HashMap<ScheduledJobName, bool>>,
}

impl Scheduler {
    pub fn load(path: PathBuf, clock: Arc<dyn Clock>) -> Result<Self, OrchestratorError> {
        let store = AtomicStore::new(path);
        let loaded = store.load()?.items;
        let now_ms = clock.now_ms();
        let mut states: HashMap<ScheduledJobName, ScheduledJobState> = loaded
            .into_iter()
            .map(|state| (state.name, state))
            .collect();

        for name in ScheduledJobName::ALL {
            states.entry(name).or_insert_with(|| {
                let mut state = ScheduledJobState::new(name);
                state.next_run_ms = Some(first_run_at_ms(name, now_ms));
                state
            });
        }

        Ok(Self {
            clock,
            store,
            states: Mutex::new(states),
            running: Mutex::new(HashMap::new()),
        })
    }

    fn persist(&self) -> Result<(), OrchestratorError> {
        let items: Vec<ScheduledJobState> = self.states.lock().values().cloned().collect();
        self.store.save(VersionedList::new(items))?;
        Ok(())
    }

    pub fn state(&self, name: ScheduledJobName) -> Option<ScheduledJobState> {
        self.states.lock().get(&name).cloned()
    }

    pub fn all_states(&self) -> Vec<ScheduledJobState> {
        self.states.lock().values().cloned().collect()
    }

    /// Jobs whose `next_run_ms` has arrived and are not already running.
    pub fn due_jobs(&self) -> Vec<ScheduledJobName> {
        let now_ms = self.clock.now_ms();
        let states = self.states.lock();
        let running = self.running.lock();
        states
            .values()
            .filter(|s| s.enabled && s.next_run_ms.is_some_and(|t| t <= now_ms))
            .filter(|s| !running.get(&s.name).copied().unwrap_or(false))
            .map(|s| s.name)
            .collect()
    }

    /// Runs `name` immediately via `executor`, regardless of schedule.
    /// Skipped (returns `Ok(false)`) if the job is already running.
    pub async fn trigger_job<F, Fut>(
        &self,
        name: ScheduledJobName,
        executor: F,
    ) -> Result<bool, OrchestratorError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<(), String>>,
    {
        {
            let mut running = self.running.lock();
            if running.get(&name).copied().unwrap_or(false) {
                return Ok(false);
            }
            running.insert(name, true);
        }

        let result = executor().await;
        let now_ms = self.clock.now_ms();
        {
            let mut states = self.states.lock();
            if let Some(state) = states.get_mut(&name) {
                match result {
                    Ok(()) => state.record_success(now_ms),
                    Err(error) => state.record_failure(now_ms, error),
                }
            }
            self.running.lock().insert(name, false);
        }
        self.persist()?;
        Ok(true)
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
