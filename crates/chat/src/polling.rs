use std::sync::Arc;
use std::time::Duration;

use mockchat_core::{BoxFuture, ScheduledTask};
use mockchat_names::NameGenerator;

pub const NAME_REFRESH_TASK: &str = "name-refresh";
pub const DEFAULT_NAME_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Keeps the contact-name suggestions warm while the profile screen is open.
pub struct NameRefreshTask {
    generator: Arc<NameGenerator>,
    interval: Duration,
}

impl NameRefreshTask {
    pub fn new(generator: Arc<NameGenerator>) -> Self {
        Self {
            generator,
            interval: DEFAULT_NAME_REFRESH_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl ScheduledTask for NameRefreshTask {
    fn name(&self) -> &'static str {
        NAME_REFRESH_TASK
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn tick(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let catalog = self.generator.refresh().await;
            if let Some(warning) = catalog.warning.as_deref() {
                tracing::warn!(
                    source = ?catalog.source,
                    warning,
                    "background name refresh degraded"
                );
            } else {
                tracing::debug!(name_count = catalog.names.len(), "background name refresh");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use mockchat_core::{ManualClock, ManualScheduler, spawn_task};
    use mockchat_names::StaticNameSource;

    use super::*;

    fn generator() -> (Arc<NameGenerator>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::from_millis(1_700_000_000_000));
        let source = Arc::new(StaticNameSource::new(vec!["Ana".to_string()]));
        (Arc::new(NameGenerator::new(source, clock.clone())), clock)
    }

    #[tokio::test]
    async fn manual_ticks_refresh_the_cache() {
        let (generator, clock) = generator();
        let mut scheduler = ManualScheduler::new();
        scheduler.register(Box::new(
            NameRefreshTask::new(generator.clone()).with_interval(Duration::from_secs(60)),
        ));
        scheduler.start();

        assert_eq!(scheduler.advance(Duration::from_secs(59)).await, 0);
        assert!(generator.cached_entry().await.is_none());

        assert_eq!(scheduler.advance(Duration::from_secs(1)).await, 1);
        let first = generator.cached_entry().await.expect("cached");

        clock.advance(TimeDelta::minutes(5));
        scheduler.advance(Duration::from_secs(60)).await;
        let second = generator.cached_entry().await.expect("cached");
        assert!(second.fetched_at > first.fetched_at);

        scheduler.stop();
        assert_eq!(scheduler.advance(Duration::from_secs(600)).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn runtime_task_stops_with_its_handle() {
        let (generator, _clock) = generator();
        let handle = spawn_task(Box::new(
            NameRefreshTask::new(generator.clone()).with_interval(Duration::from_secs(10)),
        ));
        assert_eq!(handle.name(), NAME_REFRESH_TASK);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(generator.cached_entry().await.is_some());

        handle.stop();
        generator.clear().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(generator.cached_entry().await.is_none());
    }
}
