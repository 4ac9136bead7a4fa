//! Cron triggers.
//!
//! [`CronSchedule`] pairs a parsed cron expression with the timezone it is
//! evaluated in. [`CronTrigger`] drives a callback on every occurrence of a
//! schedule from a background tokio task until it is cancelled or dropped.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{SchedulerError, SchedulerResult};

/// Callback fired on every trigger occurrence.
pub type TriggerCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Normalize a cron expression to the 6/7-field form the evaluator expects.
///
/// Classic 5-field expressions (`minute hour day month weekday`) get a
/// leading `0` seconds field, and their numeric weekdays (`0`-`7`, with both
/// `0` and `7` meaning Sunday) are rewritten as day names, since the
/// evaluator numbers weekdays from `1` = Sunday.
pub fn normalize_cron(expr: &str) -> String {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.as_slice() {
        [minute, hour, day, month, weekday] => format!(
            "0 {} {} {} {} {}",
            minute,
            hour,
            day,
            month,
            weekday_names(weekday)
        ),
        _ => expr.trim().to_string(),
    }
}

const WEEKDAY_NAMES: [&str; 8] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

/// Rewrite every numeric item of a classic weekday field as day names.
///
/// Numeric ranges are expanded into lists so that ranges ending on `7`
/// (Sunday) keep working. Items that are not purely numeric (`*`, names,
/// out-of-range values) are left for the evaluator to accept or reject.
fn weekday_names(field: &str) -> String {
    field
        .split(',')
        .map(|item| expand_weekday_item(item).unwrap_or_else(|| item.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

fn expand_weekday_item(item: &str) -> Option<String> {
    let (base, step) = match item.split_once('/') {
        Some((base, step)) => (base, Some(step.parse::<usize>().ok().filter(|s| *s > 0)?)),
        None => (item, None),
    };

    let (start, end) = match base.split_once('-') {
        Some((start, end)) => (weekday_number(start)?, weekday_number(end)?),
        None if step.is_some() => (weekday_number(base)?, 7),
        None => {
            let day = weekday_number(base)?;
            return Some(WEEKDAY_NAMES[day].to_string());
        }
    };
    if start > end {
        return None;
    }

    let mut names: Vec<&str> = Vec::new();
    for day in (start..=end).step_by(step.unwrap_or(1)) {
        let name = WEEKDAY_NAMES[day];
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Some(names.join(","))
}

fn weekday_number(value: &str) -> Option<usize> {
    value.parse::<usize>().ok().filter(|day| *day <= 7)
}

/// Check whether a cron expression is valid.
pub fn validate_cron(expr: &str) -> bool {
    parse_cron(expr).is_ok()
}

fn parse_cron(expr: &str) -> SchedulerResult<Schedule> {
    Schedule::from_str(&normalize_cron(expr)).map_err(|e| SchedulerError::InvalidCron {
        expression: expr.to_string(),
        reason: e.to_string(),
    })
}

/// Parse an IANA timezone name.
pub fn parse_timezone(timezone: &str) -> SchedulerResult<Tz> {
    timezone
        .parse::<Tz>()
        .map_err(|_| SchedulerError::InvalidTimezone(timezone.to_string()))
}

/// A validated cron expression bound to a timezone.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    schedule: Schedule,
    timezone: Tz,
}

impl CronSchedule {
    /// Parse an expression and timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression or the timezone is invalid.
    pub fn parse(expression: &str, timezone: &str) -> SchedulerResult<Self> {
        Ok(Self {
            expression: expression.to_string(),
            schedule: parse_cron(expression)?,
            timezone: parse_timezone(timezone)?,
        })
    }

    /// The expression as originally given.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// First occurrence strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&after.with_timezone(&self.timezone))
            .next()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Next occurrence from now.
    pub fn next_fire_time(&self) -> Option<DateTime<Utc>> {
        self.next_after(Utc::now())
    }

    /// The next `count` occurrences from now.
    pub fn upcoming(&self, count: usize) -> Vec<DateTime<Utc>> {
        self.schedule
            .upcoming(self.timezone)
            .take(count)
            .map(|dt| dt.with_timezone(&Utc))
            .collect()
    }
}

/// Live trigger driving a callback on a cron schedule.
///
/// Each occurrence spawns the callback as its own task, so a slow callback
/// never delays the next occurrence. Dropping the trigger cancels it.
pub struct CronTrigger {
    id: String,
    schedule: Arc<CronSchedule>,
    cancel: CancellationToken,
    fire_count: Arc<AtomicU64>,
}

impl CronTrigger {
    /// Start a trigger. Must be called from within a tokio runtime.
    pub fn start(
        id: impl Into<String>,
        schedule: Arc<CronSchedule>,
        callback: TriggerCallback,
    ) -> Self {
        let trigger = Self {
            id: id.into(),
            schedule,
            cancel: CancellationToken::new(),
            fire_count: Arc::new(AtomicU64::new(0)),
        };

        tokio::spawn(Self::drive(
            trigger.id.clone(),
            trigger.schedule.clone(),
            callback,
            trigger.cancel.clone(),
            trigger.fire_count.clone(),
        ));

        trigger
    }

    async fn drive(
        id: String,
        schedule: Arc<CronSchedule>,
        callback: TriggerCallback,
        cancel: CancellationToken,
        fire_count: Arc<AtomicU64>,
    ) {
        let mut after = Utc::now();

        loop {
            let Some(next) = schedule.next_after(after) else {
                debug!("CronTrigger {} has no upcoming occurrence", id);
                break;
            };

            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            debug!("CronTrigger {} scheduled for {}", id, next.to_rfc3339());

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            fire_count.fetch_add(1, Ordering::Relaxed);
            tokio::spawn((callback)());

            // Waking a little early must not fire the same occurrence twice;
            // waking late skips the occurrences that were missed.
            after = next.max(Utc::now());
        }

        debug!("CronTrigger {} stopped", id);
    }

    /// Get the cron expression.
    pub fn cron_expr(&self) -> &str {
        self.schedule.expression()
    }

    /// Check if the trigger is still active (not cancelled).
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Number of occurrences fired so far.
    pub fn fire_count(&self) -> u64 {
        self.fire_count.load(Ordering::Relaxed)
    }

    /// Get the next scheduled time.
    pub fn next_fire_time(&self) -> Option<DateTime<Utc>> {
        if !self.is_active() {
            return None;
        }
        self.schedule.next_fire_time()
    }

    /// Cancel the trigger. In-flight callbacks are not affected.
    pub fn cancel(&self) {
        self.cancel.cancel();
        debug!("CronTrigger {} cancelled", self.id);
    }
}

impl Drop for CronTrigger {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Common cron schedule presets (5-field form).
pub mod schedules {
    /// Every minute.
    pub const EVERY_MINUTE: &str = "* * * * *";

    /// Every 5 minutes.
    pub const EVERY_5_MINUTES: &str = "*/5 * * * *";

    /// Every 15 minutes.
    pub const EVERY_15_MINUTES: &str = "*/15 * * * *";

    /// Every hour.
    pub const EVERY_HOUR: &str = "0 * * * *";

    /// Every day at midnight.
    pub const DAILY_MIDNIGHT: &str = "0 0 * * *";

    /// Every Monday at 9 AM.
    pub const WEEKLY_MONDAY_9AM: &str = "0 9 * * MON";

    /// First day of each month at midnight.
    pub const MONTHLY_FIRST: &str = "0 0 1 * *";

    /// Every N seconds (6-field form).
    pub fn every_seconds(seconds: u32) -> String {
        format!("*/{} * * * * *", seconds)
    }

    /// Daily at a specific hour and minute.
    pub fn daily_at(hour: u32, minute: u32) -> String {
        format!("{} {} * * *", minute, hour)
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
