//! Configuration validation.

use std::collections::HashSet;

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
///
/// Cron expressions and timezones are checked by the scheduler itself;
/// this only covers structural problems.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_scheduler(config, &mut result);
        Self::validate_publisher(config, &mut result);
        Self::validate_jobs(config, &mut result);

        result
    }

    fn validate_scheduler(config: &Config, result: &mut ValidationResult) {
        if config.scheduler.timezone.trim().is_empty() {
            result.add_error(ValidationError::new(
                "scheduler.timezone",
                "Timezone cannot be empty",
            ));
        }
    }

    fn validate_publisher(config: &Config, result: &mut ValidationResult) {
        let publisher = &config.publisher;

        if publisher.service_name.trim().is_empty() {
            result.add_error(ValidationError::new(
                "publisher.service_name",
                "Service name cannot be empty",
            ));
        }

        if publisher.history_max_len == 0 {
            result.add_error(ValidationError::new(
                "publisher.history_max_len",
                "history_max_len must be greater than 0",
            ));
        }

        if publisher.history_ttl_secs == 0 {
            result.add_error(ValidationError::new(
                "publisher.history_ttl_secs",
                "history_ttl_secs must be greater than 0",
            ));
        }

        if publisher.retries > 10 {
            result.add_warning(ValidationWarning::new(
                "publisher.retries",
                "retries is very high (>10), linear backoff makes the last attempts slow",
            ));
        }
    }

    fn validate_jobs(config: &Config, result: &mut ValidationResult) {
        let mut seen = HashSet::new();

        for (idx, job) in config.jobs.iter().enumerate() {
            let path = format!("jobs[{}]", idx);

            if job.name.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.name", path),
                    "Job name cannot be empty",
                ));
            } else if !seen.insert(job.name.as_str()) {
                result.add_error(ValidationError::new(
                    format!("{}.name", path),
                    format!("Duplicate job name '{}'", job.name),
                ));
            }

            if job.schedule.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.schedule", path),
                    "Schedule cannot be empty",
                ));
            }

            if !job.enabled {
                result.add_warning(ValidationWarning::new(
                    format!("{}.enabled", path),
                    format!("Job '{}' is disabled and will not be scheduled", job.name),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
