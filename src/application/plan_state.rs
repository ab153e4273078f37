//! PlanStateHolder - the observable plan state owned by the coordinator.
//!
//! Observers read snapshots or register a listener; only the coordinator's
//! handlers write. Listeners are invoked after the write lock is released,
//! so a listener may call `snapshot()` without deadlocking.
//!
//! Every change gets a version under the write lock. Delivery is serialized
//! and skips any snapshot older than the last one delivered, so the final
//! state a listener sees is always the newest.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::domain::foundation::StateMachine;
use crate::domain::subscription::{LoadState, PlanState, ReconciliationResult};

/// Receives changes to the plan state, in order.
///
/// Called with the holder's delivery lock held: implementations may read
/// `snapshot()` but must not block on another plan-state change.
pub trait PlanStateListener: Send + Sync {
    fn on_plan_state_changed(&self, state: &PlanState);
}

/// Token returned by [`PlanStateHolder::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct PlanStateHolder {
    state: RwLock<Inner>,
    listeners: RwLock<BTreeMap<ListenerId, Arc<dyn PlanStateListener>>>,
    next_listener: AtomicU64,
    /// Version of the last snapshot handed to listeners.
    delivered: Mutex<u64>,
}

#[derive(Default)]
struct Inner {
    public: PlanState,
    in_flight: usize,
    version: u64,
}

impl PlanStateHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> PlanState {
        self.read_state().public.clone()
    }

    pub fn current_plan(&self) -> ReconciliationResult {
        self.read_state().public.current
    }

    pub fn subscribe(&self, listener: Arc<dyn PlanStateListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.write_listeners().insert(id, listener);
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.write_listeners().remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn set_plan(&self, result: ReconciliationResult) {
        self.update(|inner| {
            inner.public.current = result;
        });
    }

    /// Marks a store operation as in flight until the guard is dropped.
    ///
    /// Overlapping operations are counted, so `is_loading` only drops back to
    /// false when the last one finishes.
    pub(crate) fn begin_loading(self: &Arc<Self>) -> LoadingGuard {
        self.update(|inner| {
            inner.in_flight += 1;
            inner.public.is_loading = true;
        });
        LoadingGuard {
            holder: Arc::clone(self),
        }
    }

    fn end_loading(&self) {
        self.update(|inner| {
            inner.in_flight = inner.in_flight.saturating_sub(1);
            inner.public.is_loading = inner.in_flight > 0;
        });
    }

    pub(crate) fn set_offerings(&self, next: LoadState) {
        self.update(|inner| {
            let current = inner.public.offerings;
            match current.transition_to(next) {
                Ok(state) => inner.public.offerings = state,
                Err(e) => {
                    // Two overlapping fetches can both leave Loading; keep the latest.
                    debug!(error = %e, "Offerings state transition out of order");
                    inner.public.offerings = next;
                }
            }
        });
    }

    pub(crate) fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|inner| {
            inner.public.last_error = Some(message);
        });
    }

    pub(crate) fn clear_error(&self) {
        self.update(|inner| {
            inner.public.last_error = None;
        });
    }

    fn update(&self, apply: impl FnOnce(&mut Inner)) {
        let (version, snapshot) = {
            let mut inner = self
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let before = inner.public.clone();
            apply(&mut inner);
            if inner.public == before {
                return;
            }
            inner.version += 1;
            (inner.version, inner.public.clone())
        };
        self.notify(version, &snapshot);
    }

    fn notify(&self, version: u64, snapshot: &PlanState) {
        let mut delivered = self
            .delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if version <= *delivered {
            debug!(version, delivered = *delivered, "Skipping superseded plan state");
            return;
        }
        *delivered = version;

        let listeners: Vec<Arc<dyn PlanStateListener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for listener in listeners {
            listener.on_plan_state_changed(snapshot);
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Inner> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("Plan state lock poisoned; continuing with last written state");
            poisoned.into_inner()
        })
    }

    fn write_listeners(
        &self,
    ) -> RwLockWriteGuard<'_, BTreeMap<ListenerId, Arc<dyn PlanStateListener>>> {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears one unit of `is_loading` when dropped.
pub(crate) struct LoadingGuard {
    holder: Arc<PlanStateHolder>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.holder.end_loading();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::PlanTier;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<PlanState>>,
    }

    impl PlanStateListener for Recorder {
        fn on_plan_state_changed(&self, state: &PlanState) {
            self.seen.lock().unwrap().push(state.clone());
        }
    }

    impl Recorder {
        fn seen(&self) -> Vec<PlanState> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[test]
    fn set_plan_updates_snapshot_and_notifies() {
        let holder = PlanStateHolder::new();
        let recorder = Arc::new(Recorder::default());
        holder.subscribe(recorder.clone());

        holder.set_plan(ReconciliationResult::for_tier(PlanTier::Tier2));

        assert_eq!(holder.current_plan().limit, 2);
        let seen = recorder.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].tier(), PlanTier::Tier2);
    }

    #[test]
    fn unchanged_state_does_not_notify() {
        let holder = PlanStateHolder::new();
        let recorder = Arc::new(Recorder::default());
        holder.subscribe(recorder.clone());

        holder.set_plan(ReconciliationResult::none());

        assert!(recorder.seen().is_empty());
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let holder = PlanStateHolder::new();
        let recorder = Arc::new(Recorder::default());
        let id = holder.subscribe(recorder.clone());

        assert!(holder.unsubscribe(id));
        assert!(!holder.unsubscribe(id));
        holder.set_plan(ReconciliationResult::for_tier(PlanTier::Tier5));

        assert!(recorder.seen().is_empty());
        assert_eq!(holder.listener_count(), 0);
    }

    #[test]
    fn overlapping_loads_keep_flag_until_last_finishes() {
        let holder = Arc::new(PlanStateHolder::new());

        let first = holder.begin_loading();
        let second = holder.begin_loading();
        assert!(holder.snapshot().is_loading);

        drop(first);
        assert!(holder.snapshot().is_loading);

        drop(second);
        assert!(!holder.snapshot().is_loading);
    }

    #[test]
    fn offerings_state_follows_fetch_cycle() {
        let holder = PlanStateHolder::new();
        holder.set_offerings(LoadState::Loading);
        assert_eq!(holder.snapshot().offerings, LoadState::Loading);
        holder.set_offerings(LoadState::Failed);
        assert_eq!(holder.snapshot().offerings, LoadState::Failed);
    }

    #[test]
    fn errors_are_recorded_and_cleared() {
        let holder = PlanStateHolder::new();
        holder.record_error("store offline");
        assert_eq!(holder.snapshot().last_error.as_deref(), Some("store offline"));
        holder.clear_error();
        assert!(holder.snapshot().last_error.is_none());
    }

    #[test]
    fn listener_may_read_snapshot_during_notification() {
        struct Reader {
            holder: Arc<PlanStateHolder>,
            limits: Mutex<Vec<u32>>,
        }

        impl PlanStateListener for Reader {
            fn on_plan_state_changed(&self, _state: &PlanState) {
                let limit = self.holder.snapshot().room_limit();
                self.limits.lock().unwrap().push(limit);
            }
        }

        let holder = Arc::new(PlanStateHolder::new());
        let reader = Arc::new(Reader {
            holder: Arc::clone(&holder),
            limits: Mutex::new(Vec::new()),
        });
        holder.subscribe(reader.clone());

        holder.set_plan(ReconciliationResult::for_tier(PlanTier::Tier3));

        assert_eq!(*reader.limits.lock().unwrap(), vec![3]);
    }

    /// Blocks inside its first notification until released.
    struct Gate {
        entered: Mutex<Option<mpsc::Sender<()>>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl PlanStateListener for Gate {
        fn on_plan_state_changed(&self, _state: &PlanState) {
            if let Some(entered) = self.entered.lock().unwrap().take() {
                entered.send(()).unwrap();
                self.release.lock().unwrap().recv().unwrap();
            }
        }
    }

    #[test]
    fn overlapping_updates_leave_listeners_on_newest_plan() {
        let holder = Arc::new(PlanStateHolder::new());
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        holder.subscribe(Arc::new(Gate {
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(release_rx),
        }));
        let recorder = Arc::new(Recorder::default());
        holder.subscribe(recorder.clone());

        let slow = {
            let holder = Arc::clone(&holder);
            thread::spawn(move || {
                holder.set_plan(ReconciliationResult::for_tier(PlanTier::Tier1));
            })
        };
        entered_rx.recv().unwrap();

        let fast = {
            let holder = Arc::clone(&holder);
            thread::spawn(move || {
                holder.set_plan(ReconciliationResult::for_tier(PlanTier::Tier5));
            })
        };
        thread::sleep(Duration::from_millis(50));
        release_tx.send(()).unwrap();

        slow.join().unwrap();
        fast.join().unwrap();

        let limits: Vec<u32> = recorder.seen().iter().map(PlanState::room_limit).collect();
        assert_eq!(holder.current_plan().limit, 5);
        assert_eq!(limits, vec![1, 5]);
    }
}
