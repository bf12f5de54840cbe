use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use leptos::leptos_dom::helpers::IntervalHandle;
use tracing::warn;

pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Where the dashboard runs its fetches and its refresh timer.
pub trait Executor {
    type Timer: ScheduledTimer;

    fn spawn(&self, task: LocalTask);

    fn every(&self, period: Duration, tick: Box<dyn Fn()>) -> Self::Timer;
}

pub trait ScheduledTimer {
    fn cancel(self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserExecutor;

pub struct BrowserTimer(Option<IntervalHandle>);

impl Executor for BrowserExecutor {
    type Timer = BrowserTimer;

    fn spawn(&self, task: LocalTask) {
        leptos::spawn_local(task);
    }

    fn every(&self, period: Duration, tick: Box<dyn Fn()>) -> BrowserTimer {
        match leptos::set_interval_with_handle(tick, period) {
            Ok(handle) => BrowserTimer(Some(handle)),
            Err(err) => {
                warn!("failed to schedule refresh timer: {err:?}");
                BrowserTimer(None)
            }
        }
    }
}

impl ScheduledTimer for BrowserTimer {
    fn cancel(self) {
        if let Some(handle) = self.0 {
            handle.clear();
        }
    }
}
