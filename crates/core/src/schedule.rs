use std::time::Duration;

pub use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Shortest period a runner will honour; zero would spin.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A periodic background check tied to a screen's lifetime.
pub trait ScheduledTask: Send {
    fn name(&self) -> &'static str;
    fn interval(&self) -> Duration;
    fn tick(&mut self) -> BoxFuture<'_, ()>;
}

/// Handle to a task running on the tokio runtime.
///
/// Dropping the handle stops the task, so a screen only has to hold it for as
/// long as it is mounted.
pub struct TaskHandle {
    name: &'static str,
    join_handle: JoinHandle<()>,
}

impl TaskHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        !self.join_handle.is_finished()
    }

    pub fn stop(self) {
        tracing::debug!(task = self.name, "stopping scheduled task");
        // Drop aborts.
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.join_handle.abort();
    }
}

/// Starts ticking `task` every `interval()`; the first tick fires one period
/// after start.
pub fn spawn_task(mut task: Box<dyn ScheduledTask>) -> TaskHandle {
    let name = task.name();
    let period = task.interval().max(MIN_INTERVAL);
    tracing::debug!(task = name, period_ms = period.as_millis() as u64, "starting scheduled task");

    let join_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            tracing::trace!(task = name, "scheduled tick");
            task.tick().await;
        }
    });

    TaskHandle { name, join_handle }
}

struct ManualEntry {
    task: Box<dyn ScheduledTask>,
    elapsed: Duration,
}

/// Drives scheduled tasks from explicit time advances instead of real timers.
#[derive(Default)]
pub struct ManualScheduler {
    entries: Vec<ManualEntry>,
    running: bool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task: Box<dyn ScheduledTask>) {
        self.entries.push(ManualEntry {
            task,
            elapsed: Duration::ZERO,
        });
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stops ticking and forgets partial progress toward the next tick.
    pub fn stop(&mut self) {
        self.running = false;
        for entry in &mut self.entries {
            entry.elapsed = Duration::ZERO;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.task.name()).collect()
    }

    /// Moves virtual time forward and runs every tick that came due, in
    /// registration order. Returns the number of ticks run.
    pub async fn advance(&mut self, by: Duration) -> usize {
        if !self.running {
            return 0;
        }

        let mut ticks = 0;
        for entry in &mut self.entries {
            let period = entry.task.interval().max(MIN_INTERVAL);
            entry.elapsed += by;
            while entry.elapsed >= period {
                entry.elapsed -= period;
                entry.task.tick().await;
                ticks += 1;
            }
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingTask {
        name: &'static str,
        interval: Duration,
        ticks: Arc<AtomicUsize>,
    }

    impl ScheduledTask for CountingTask {
        fn name(&self) -> &'static str {
            self.name
        }

        fn interval(&self) -> Duration {
            self.interval
        }

        fn tick(&mut self) -> BoxFuture<'_, ()> {
            let ticks = self.ticks.clone();
            Box::pin(async move {
                ticks.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    fn counting(name: &'static str, secs: u64) -> (Box<dyn ScheduledTask>, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let task = CountingTask {
            name,
            interval: Duration::from_secs(secs),
            ticks: ticks.clone(),
        };
        (Box::new(task), ticks)
    }

    #[tokio::test]
    async fn manual_scheduler_runs_only_due_ticks() {
        let (status, status_ticks) = counting("status", 30);
        let (session, session_ticks) = counting("session", 60);
        let mut scheduler = ManualScheduler::new();
        scheduler.register(status);
        scheduler.register(session);

        assert_eq!(scheduler.advance(Duration::from_secs(120)).await, 0);

        scheduler.start();
        assert_eq!(scheduler.advance(Duration::from_secs(29)).await, 0);
        assert_eq!(scheduler.advance(Duration::from_secs(1)).await, 1);
        assert_eq!(scheduler.advance(Duration::from_secs(90)).await, 5);
        assert_eq!(status_ticks.load(Ordering::SeqCst), 4);
        assert_eq!(session_ticks.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.task_names(), vec!["status", "session"]);
    }

    #[tokio::test]
    async fn manual_scheduler_stop_discards_partial_progress() {
        let (task, ticks) = counting("notifications", 10);
        let mut scheduler = ManualScheduler::new();
        scheduler.register(task);
        scheduler.start();

        scheduler.advance(Duration::from_secs(9)).await;
        scheduler.stop();
        assert!(!scheduler.is_running());
        scheduler.start();
        scheduler.advance(Duration::from_secs(9)).await;

        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_task_ticks_until_stopped() {
        let (task, ticks) = counting("status", 10);
        let handle = spawn_task(task);
        assert_eq!(handle.name(), "status");

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert!(handle.is_running());

        handle.stop();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }
}
