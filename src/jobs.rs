//! Turns configured jobs into scheduler job definitions.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use cadence_config::{JobAction, JobConfig};
use cadence_events::EventPublisher;
use cadence_scheduler::{JobDefinition, JobMetadata, JobRegistry};

/// Build the job definition for one configured job.
pub(crate) fn build_job(job: &JobConfig, publisher: &Arc<EventPublisher>) -> JobDefinition {
    let definition = match &job.action {
        JobAction::Log { message } => {
            let name = job.name.clone();
            let message = message.clone();
            JobDefinition::new(job.name.clone(), job.schedule.clone(), move || {
                let name = name.clone();
                let message = message.clone();
                async move {
                    info!(job = %name, "{}", message);
                    Ok::<_, anyhow::Error>(None)
                }
            })
        }
        JobAction::Publish {
            topic,
            event_type,
            payload,
        } => {
            let publisher = publisher.clone();
            let topic = topic.clone();
            let event_type = event_type.clone();
            let payload = payload.clone();
            JobDefinition::new(job.name.clone(), job.schedule.clone(), move || {
                let publisher = publisher.clone();
                let topic = topic.clone();
                let event_type = event_type.clone();
                let payload = payload.clone();
                async move {
                    let meta = publisher.publish(&topic, &event_type, payload).await?;
                    let metadata: JobMetadata = HashMap::from([
                        ("event_id".to_string(), Value::String(meta.event_id)),
                        ("topic".to_string(), Value::String(topic)),
                    ]);
                    Ok::<_, anyhow::Error>(Some(metadata))
                }
            })
        }
    };

    let definition = definition.with_enabled(job.enabled);
    let definition = match &job.timezone {
        Some(timezone) => definition.with_timezone(timezone),
        None => definition,
    };
    match &job.description {
        Some(description) => definition.with_description(description),
        None => definition,
    }
}

/// Register every configured job. Returns how many were registered.
pub(crate) fn register_jobs(
    registry: &JobRegistry,
    jobs: &[JobConfig],
    publisher: &Arc<EventPublisher>,
) -> usize {
    for job in jobs {
        registry.register(build_job(job, publisher));
    }
    jobs.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    use cadence_config::PublisherConfig;
    use cadence_events::MemoryBroker;
    use serde_json::json;

    fn publisher() -> (Arc<EventPublisher>, Arc<MemoryBroker>) {
        let broker = Arc::new(MemoryBroker::new());
        let publisher = EventPublisher::from_broker(broker.clone(), PublisherConfig::default());
        (Arc::new(publisher), broker)
    }

    fn job(name: &str, action: JobAction) -> JobConfig {
        JobConfig {
            name: name.to_string(),
            schedule: "*/5 * * * *".to_string(),
            timezone: None,
            enabled: true,
            description: None,
            action,
        }
    }

    #[tokio::test]
    async fn test_log_job_succeeds_without_metadata() {
        let (publisher, _) = publisher();
        let config = job(
            "heartbeat",
            JobAction::Log {
                message: "still alive".to_string(),
            },
        );

        let definition = build_job(&config, &publisher);
        assert_eq!(definition.name, "heartbeat");
        assert_eq!(definition.schedule, "*/5 * * * *");

        let result = definition.handler().run().await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_publish_job_publishes_configured_event() {
        let (publisher, broker) = publisher();
        let mut rx = broker.subscribe("reports:report.due");
        let config = job(
            "daily-report",
            JobAction::Publish {
                topic: "reports".to_string(),
                event_type: "report.due".to_string(),
                payload: json!({"report": "sales"}),
            },
        );

        let definition = build_job(&config, &publisher);
        let metadata = definition.handler().run().await.unwrap().unwrap();

        assert_eq!(metadata["topic"], "reports");
        let message = rx.try_recv().unwrap();
        assert!(message.contains(metadata["event_id"].as_str().unwrap()));
        assert_eq!(publisher.get_event_stats("reports").await.total_events, 1);
    }

    #[test]
    fn test_job_options_are_carried_over() {
        let (publisher, _) = publisher();
        let mut config = job(
            "nightly",
            JobAction::Log {
                message: "nightly".to_string(),
            },
        );
        config.enabled = false;
        config.timezone = Some("Asia/Tokyo".to_string());
        config.description = Some("Nightly maintenance".to_string());

        let definition = build_job(&config, &publisher);
        assert!(!definition.enabled);
        assert_eq!(definition.timezone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(definition.description.as_deref(), Some("Nightly maintenance"));
    }

    #[test]
    fn test_register_jobs() {
        let (publisher, _) = publisher();
        let registry = JobRegistry::new();
        let jobs = vec![
            job("a", JobAction::Log { message: "a".to_string() }),
            job("b", JobAction::Log { message: "b".to_string() }),
        ];

        assert_eq!(register_jobs(&registry, &jobs, &publisher), 2);
        assert!(registry.has("a"));
        assert!(registry.has("b"));
    }
}
