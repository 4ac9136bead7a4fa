//! `cadence next`: preview a cron expression.

use cadence_scheduler::{CronScheduler, parse_timezone};

/// Print the next `count` fire times of `expression` in `timezone`.
pub(crate) fn next(expression: &str, timezone: &str, count: usize) -> anyhow::Result<()> {
    let tz = parse_timezone(timezone)?;
    let runs = CronScheduler::next_runs(expression, timezone, count)?;

    if runs.is_empty() {
        println!("'{}' never fires.", expression);
        return Ok(());
    }

    for run in runs {
        println!(
            "{}  ({} UTC)",
            run.with_timezone(&tz).to_rfc3339(),
            run.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}
