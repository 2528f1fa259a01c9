use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use vault_core::{update, IncrementBand, ProgressEffect, ProgressMsg, ProgressState};
use vault_logging::vault_warn;

use crate::ExportEvent;

pub trait ExportSink: Send + Sync {
    fn emit(&self, event: ExportEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ExportSink for NullSink {
    fn emit(&self, _event: ExportEvent) {}
}

pub struct ChannelSink {
    tx: mpsc::Sender<ExportEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<ExportEvent>) -> Self {
        Self { tx }
    }
}

impl ExportSink for ChannelSink {
    fn emit(&self, event: ExportEvent) {
        let _ = self.tx.send(event);
    }
}

struct Timer {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Timer {
    fn stop(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Job-scoped driver of the cosmetic progress percentage.
///
/// Owns the periodic tick task; every state change is published to the sink as
/// [`ExportEvent::Progress`].
pub struct ProgressSimulator {
    state: Arc<Mutex<ProgressState>>,
    sink: Arc<dyn ExportSink>,
    interval: Duration,
    timer: Mutex<Option<Timer>>,
}

impl ProgressSimulator {
    pub fn new(ceiling: f64, interval: Duration, sink: Arc<dyn ExportSink>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ProgressState::with_ceiling(ceiling))),
            sink,
            interval,
            timer: Mutex::new(None),
        }
    }

    pub fn start(&self, label: impl Into<String>, size_hint: Option<u64>) {
        self.dispatch(ProgressMsg::Start {
            label: label.into(),
            size_hint,
        });
    }

    pub fn update_label(&self, label: impl Into<String>) {
        self.dispatch(ProgressMsg::UpdateLabel(label.into()));
    }

    pub fn update_stats(&self, current: usize, total: usize) {
        self.dispatch(ProgressMsg::UpdateStats { current, total });
    }

    pub fn complete(&self) {
        self.dispatch(ProgressMsg::Complete);
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.dispatch(ProgressMsg::Fail(message.into()));
    }

    pub fn reset(&self) {
        self.dispatch(ProgressMsg::Reset);
    }

    pub fn snapshot(&self) -> ProgressState {
        lock(&self.state).clone()
    }

    pub fn is_ticking(&self) -> bool {
        lock(&self.timer).is_some()
    }

    fn dispatch(&self, msg: ProgressMsg) {
        let effects = apply(&self.state, self.sink.as_ref(), msg);
        for effect in effects {
            match effect {
                ProgressEffect::StartTimer { band } => self.start_timer(band),
                ProgressEffect::StopTimer => self.stop_timer(),
            }
        }
    }

    fn start_timer(&self, band: IncrementBand) {
        self.stop_timer();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            vault_warn!("No async runtime; progress will only move on discrete updates");
            return;
        };

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let state = Arc::clone(&self.state);
        let sink = Arc::clone(&self.sink);
        let period = self.interval;
        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let increment = band.sample(rand::thread_rng().gen::<f64>());
                        if !token.is_cancelled() {
                            apply(&state, sink.as_ref(), ProgressMsg::Tick { increment });
                        }
                    }
                }
            }
        });
        *lock(&self.timer) = Some(Timer { cancel, task });
    }

    fn stop_timer(&self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.stop();
        }
    }
}

impl Drop for ProgressSimulator {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

/// Applies `msg` and publishes the resulting state.
///
/// The emit happens under the state lock so the sink observes snapshots in the
/// same order the state changed.
fn apply(state: &Mutex<ProgressState>, sink: &dyn ExportSink, msg: ProgressMsg) -> Vec<ProgressEffect> {
    let mut guard = lock(state);
    let (next, effects) = update(std::mem::take(&mut *guard), msg);
    *guard = next;
    sink.emit(ExportEvent::Progress(guard.clone()));
    effects
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
