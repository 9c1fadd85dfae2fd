//! Daily reminder and summary jobs, and the cron loop that fires them.

use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use expense_core::{ChartKind, Clock, CoreError};
use expense_domain::{AggregationQuery, AggregationWindow, Contact};
use tracing::{info, warn};

use crate::{assistant::Assistant, errors::SchedulerError};

/// Upper bound on one sleep so a stop request is noticed promptly.
const STOP_POLL: Duration = Duration::from_millis(500);

/// The two jobs the assistant runs every day for its contacts.
pub struct DailyJobs {
    assistant: Arc<Assistant>,
    contacts: Vec<Contact>,
}

impl DailyJobs {
    pub fn new(assistant: Arc<Assistant>, contacts: Vec<Contact>) -> Self {
        Self {
            assistant,
            contacts,
        }
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Sends every contact the evening reminder. Returns how many deliveries succeeded.
    pub fn send_reminders(&self) -> usize {
        let today = self.assistant.today();
        info!(contacts = self.contacts.len(), %today, "sending daily reminders");
        let mut delivered = 0;
        for contact in &self.contacts {
            let text = self
                .assistant
                .formatter()
                .reminder_text(&contact.name, today);
            if self.assistant.deliver(contact.chat_id, &text) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Sends today's totals to every contact. Nothing is sent when nothing was spent.
    pub fn send_daily_summary(&self) -> Result<usize, CoreError> {
        let today = self.assistant.today();
        let query = AggregationQuery::new(today).with_window(AggregationWindow::Today);
        let result = self.assistant.summarize(&query)?;
        if !result.total.is_positive() {
            info!(%today, "no expenses today, daily summary skipped");
            return Ok(0);
        }
        let title = self.assistant.formatter().daily_summary_title(today);
        let report = self.assistant.formatter().render(&result, &title);
        info!(%today, total = %result.total, contacts = self.contacts.len(), "sending daily summary");
        let mut delivered = 0;
        for contact in &self.contacts {
            if self.assistant.deliver(contact.chat_id, &report.summary_text) {
                delivered += 1;
                self.assistant
                    .send_chart(contact.chat_id, ChartKind::Pie, &title, &report.series);
            }
        }
        Ok(delivered)
    }
}

/// Accepts 5-field (minute-first) or 6/7-field (second-first) cron expressions.
pub fn parse_schedule(expression: &str) -> Result<Schedule, SchedulerError> {
    let trimmed = expression.trim();
    let normalized = if trimmed.split_whitespace().count() == 5 {
        format!("0 {} *", trimmed)
    } else {
        trimmed.to_string()
    };
    Schedule::from_str(&normalized).map_err(|err| SchedulerError::InvalidExpression {
        expression: expression.to_string(),
        reason: err.to_string(),
    })
}

/// Next firing strictly after `after`, evaluated on the wall clock of `zone`.
pub fn next_fire(schedule: &Schedule, zone: Tz, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule
        .after(&after.with_timezone(&zone))
        .next()
        .map(|at| at.with_timezone(&Utc))
}

/// Runs jobs on background threads until [`CronScheduler::shutdown`] or the stop flag is set.
pub struct CronScheduler {
    zone: Tz,
    clock: Arc<dyn Clock>,
    stop: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl CronScheduler {
    pub fn new(zone: Tz, clock: Arc<dyn Clock>) -> Self {
        Self {
            zone,
            clock,
            stop: Arc::new(AtomicBool::new(false)),
            handles: Vec::new(),
        }
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn schedule<F>(&mut self, name: &str, expression: &str, job: F) -> Result<(), SchedulerError>
    where
        F: Fn() + Send + 'static,
    {
        let schedule = parse_schedule(expression)?;
        let zone = self.zone;
        let clock = Arc::clone(&self.clock);
        let stop = Arc::clone(&self.stop);
        let job_name = name.to_string();
        let handle = thread::Builder::new()
            .name(format!("cron-{}", name))
            .spawn(move || run_loop(&job_name, &schedule, zone, clock.as_ref(), &stop, job))
            .map_err(SchedulerError::Spawn)?;
        info!(job = name, expression, zone = %zone, "job scheduled");
        self.handles.push(handle);
        Ok(())
    }

    pub fn shutdown(self) {
        self.stop.store(true, Ordering::SeqCst);
        for handle in self.handles {
            if handle.join().is_err() {
                warn!("scheduler thread panicked");
            }
        }
    }
}

fn run_loop<F: Fn()>(
    name: &str,
    schedule: &Schedule,
    zone: Tz,
    clock: &dyn Clock,
    stop: &AtomicBool,
    job: F,
) {
    while !stop.load(Ordering::SeqCst) {
        let Some(next) = next_fire(schedule, zone, clock.now()) else {
            warn!(job = name, "schedule has no upcoming firing");
            return;
        };
        loop {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            let remaining = match (next - clock.now()).to_std() {
                Ok(remaining) if !remaining.is_zero() => remaining,
                _ => break,
            };
            thread::sleep(remaining.min(STOP_POLL));
        }
        info!(job = name, at = %next.with_timezone(&zone), "scheduled job firing");
        job();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use expense_core::FixedClock;

    #[test]
    fn five_field_expressions_are_normalized() {
        let schedule = parse_schedule("0 20 * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let next = next_fire(&schedule, chrono_tz::America::Sao_Paulo, after).unwrap();
        // 20:00 in São Paulo is 23:00 UTC.
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 10, 23, 0, 0).unwrap());
    }

    #[test]
    fn next_fire_rolls_over_to_tomorrow() {
        let schedule = parse_schedule("0 0 22 * * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2024, 5, 11, 2, 0, 0).unwrap();
        let next = next_fire(&schedule, chrono_tz::America::Sao_Paulo, after).unwrap();
        assert_eq!(next.with_timezone(&chrono_tz::America::Sao_Paulo).hour(), 22);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 12, 1, 0, 0).unwrap());
    }

    #[test]
    fn invalid_expressions_are_rejected() {
        assert!(matches!(
            parse_schedule("every evening"),
            Err(SchedulerError::InvalidExpression { .. })
        ));
    }

    #[test]
    fn stopped_scheduler_joins_without_firing() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()));
        let mut scheduler = CronScheduler::new(chrono_tz::America::Sao_Paulo, clock);
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        scheduler
            .schedule("reminder", "0 0 20 * * * *", move || flag.store(true, Ordering::SeqCst))
            .unwrap();
        scheduler.shutdown();
        assert!(!fired.load(Ordering::SeqCst));
    }
}
