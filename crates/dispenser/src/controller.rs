//! Async driver for a [`Session`]: owns the pour timer and publishes a
//! snapshot to subscribers after every change.

use std::sync::{Arc, Mutex as StdMutex};

use shared::domain::Beverage;
use tokio::{
    sync::{broadcast, Mutex},
    task::AbortHandle,
    time::{self, Instant},
};
use tracing::{debug, info};

use crate::{
    placement::{RandomSource, ThreadRandom},
    session::{Session, TickOutcome},
    timing::PourTiming,
};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 256;

struct ControllerState {
    session: Session,
    random: Box<dyn RandomSource + Send>,
    /// Bumped on every selection and reset; a pour task only touches the
    /// session while its own generation is current.
    generation: u64,
}

pub struct DispenserController {
    inner: Arc<Mutex<ControllerState>>,
    events: broadcast::Sender<Session>,
    timing: PourTiming,
    /// Lives outside `inner`: drop has to reach it without the session lock.
    pour_task: StdMutex<Option<AbortHandle>>,
}

impl DispenserController {
    pub fn new(timing: PourTiming) -> Self {
        Self::with_random_source(timing, ThreadRandom)
    }

    pub fn with_random_source(
        timing: PourTiming,
        random: impl RandomSource + Send + 'static,
    ) -> Self {
        let (events, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(ControllerState {
                session: Session::default(),
                random: Box::new(random),
                generation: 0,
            })),
            events,
            timing,
            pour_task: StdMutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Session> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.lock().await.session.clone()
    }

    pub async fn select_beverage(&self, beverage: Beverage) -> bool {
        let mut state = self.inner.lock().await;
        if !state.session.select_beverage(beverage) {
            debug!(%beverage, phase = ?state.session.phase(), "ignored beverage selection");
            return false;
        }

        state.generation += 1;
        let generation = state.generation;
        let _ = self.events.send(state.session.clone());
        let task = self.spawn_pour(generation);
        if let Some(previous) = self.replace_pour_task(Some(task)) {
            previous.abort();
        }
        info!(%beverage, "pour started");
        true
    }

    pub async fn toggle_ice(&self) -> bool {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        let applied = state.session.toggle_ice(state.random.as_mut());
        self.publish_if(applied, &state.session, "toggle_ice");
        applied
    }

    pub async fn toggle_lemon(&self) -> bool {
        let mut state = self.inner.lock().await;
        let applied = state.session.toggle_lemon();
        self.publish_if(applied, &state.session, "toggle_lemon");
        applied
    }

    pub async fn open_soda_menu(&self) -> bool {
        let mut state = self.inner.lock().await;
        let applied = state.session.open_soda_menu();
        self.publish_if(applied, &state.session, "open_soda_menu");
        applied
    }

    pub async fn close_soda_menu(&self) -> bool {
        let mut state = self.inner.lock().await;
        let applied = state.session.close_soda_menu();
        self.publish_if(applied, &state.session, "close_soda_menu");
        applied
    }

    pub async fn reset_for_new_cup(&self) -> bool {
        let mut state = self.inner.lock().await;
        state.generation += 1;
        if let Some(task) = self.replace_pour_task(None) {
            task.abort();
        }
        let applied = state.session.reset_for_new_cup();
        self.publish_if(applied, &state.session, "reset_for_new_cup");
        if applied {
            info!("ready for a new cup");
        }
        applied
    }

    fn publish_if(&self, applied: bool, session: &Session, action: &'static str) {
        if applied {
            let _ = self.events.send(session.clone());
        } else {
            debug!(action, phase = ?session.phase(), "ignored dispenser control");
        }
    }

    fn replace_pour_task(&self, task: Option<AbortHandle>) -> Option<AbortHandle> {
        let mut slot = self
            .pour_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *slot, task)
    }

    fn spawn_pour(&self, generation: u64) -> AbortHandle {
        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();
        let timing = self.timing;

        tokio::spawn(async move {
            let period = timing.tick_interval();
            let mut ticker = time::interval_at(Instant::now() + period, period);

            loop {
                ticker.tick().await;
                let mut guard = inner.lock().await;
                let state = &mut *guard;
                if state.generation != generation {
                    return;
                }
                match state.session.tick(&timing) {
                    TickOutcome::Ignored => return,
                    TickOutcome::Filling => {
                        let _ = events.send(state.session.clone());
                    }
                    TickOutcome::ToppedOff => {
                        let _ = events.send(state.session.clone());
                        break;
                    }
                }
            }

            time::sleep(timing.settle_delay()).await;

            let mut guard = inner.lock().await;
            let state = &mut *guard;
            if state.generation != generation {
                return;
            }
            if state.session.complete_pour() {
                let _ = events.send(state.session.clone());
                info!(beverage = ?state.session.beverage(), "cup is full");
            }
        })
        .abort_handle()
    }
}

impl Drop for DispenserController {
    fn drop(&mut self) {
        let slot = self
            .pour_task
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
