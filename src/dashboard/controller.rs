use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use tracing::{debug, error};

use crate::executor::{Executor, ScheduledTimer};
use crate::request::DocumentSource;

use super::state::{DashboardEvent, DashboardState, FetchOrigin, RefreshInterval};

type Observer = Box<dyn Fn(&DashboardState)>;

struct Shared<S, E> {
    source: S,
    executor: E,
    state: RefCell<DashboardState>,
    observer: RefCell<Option<Observer>>,
}

impl<S, E> Shared<S, E> {
    fn dispatch(&self, event: DashboardEvent) {
        let next = self.state.take().reduce(event);
        *self.state.borrow_mut() = next;

        if let Some(observer) = self.observer.borrow().as_ref() {
            observer(&self.state.borrow());
        }
    }
}

/// Owns the dashboard state and the auto-refresh timer.
///
/// Fetches are never deduplicated: when several are in flight, whichever
/// response arrives last overwrites the state.
pub struct DashboardController<S, E: Executor> {
    shared: Rc<Shared<S, E>>,
    timer: Option<E::Timer>,
}

impl<S, E> DashboardController<S, E>
where
    S: DocumentSource + 'static,
    E: Executor + 'static,
{
    pub fn new(source: S, executor: E) -> Self {
        Self {
            shared: Rc::new(Shared {
                source,
                executor,
                state: RefCell::default(),
                observer: RefCell::new(None),
            }),
            timer: None,
        }
    }

    pub fn subscribe(&self, observer: impl Fn(&DashboardState) + 'static) {
        *self.shared.observer.borrow_mut() = Some(Box::new(observer));
    }

    #[cfg(test)]
    pub fn state(&self) -> DashboardState {
        self.shared.state.borrow().clone()
    }

    pub fn mount(&mut self) {
        spawn_fetch(&self.shared, FetchOrigin::Mount);
        self.rearm();
    }

    pub fn refresh(&self) {
        spawn_fetch(&self.shared, FetchOrigin::Manual);
    }

    pub fn toggle_auto_refresh(&mut self) {
        self.shared.dispatch(DashboardEvent::AutoRefreshToggled);
        self.rearm();
    }

    pub fn set_refresh_interval(&mut self, interval: RefreshInterval) {
        if self.shared.state.borrow().refresh_interval() == interval {
            return;
        }

        self.shared.dispatch(DashboardEvent::IntervalChanged(interval));
        self.rearm();
    }

    fn rearm(&mut self) {
        self.cancel_timer();

        let Some(period) = self.shared.state.borrow().refresh_period() else {
            debug!("auto-refresh disabled");
            return;
        };

        debug!("auto-refresh every {period:?}");
        let shared = Rc::downgrade(&self.shared);
        let tick = move || {
            if let Some(shared) = shared.upgrade() {
                spawn_fetch(&shared, FetchOrigin::Timer);
            }
        };

        self.timer = Some(self.shared.executor.every(period, Box::new(tick)));
    }
}

impl<S, E: Executor> DashboardController<S, E> {
    /// Stops the timer and detaches the view. Fetches already in flight
    /// still complete, nothing observes them anymore.
    pub fn teardown(&mut self) {
        self.cancel_timer();
        self.shared.observer.borrow_mut().take();
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

impl<S, E: Executor> Drop for DashboardController<S, E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn spawn_fetch<S, E>(shared: &Rc<Shared<S, E>>, origin: FetchOrigin)
where
    S: DocumentSource + 'static,
    E: Executor + 'static,
{
    debug!("fetch started: origin={origin:?}");
    shared.dispatch(DashboardEvent::FetchStarted(origin));

    let task = Rc::clone(shared);
    shared.executor.spawn(Box::pin(async move {
        let event = match task.source.fetch_latest().await {
            Ok(document) => DashboardEvent::FetchSucceeded {
                document,
                fetched_at: Utc::now(),
            },
            Err(err) => {
                error!(status = ?err.status(), "error fetching latest document: {err}");
                DashboardEvent::FetchFailed(err.to_string())
            }
        };

        task.dispatch(event);
    }));
}
