use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap, new_key_type};

new_key_type! {
    pub struct SignalId;
    pub struct ObserverId;
}

thread_local! {
    static CURRENT_OBSERVER: RefCell<Option<ObserverId>> = const { RefCell::new(None) };
    static GRAPH: RefCell<DepGraph> = RefCell::new(DepGraph::default());
    static BATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PENDING: RefCell<Vec<ObserverId>> = const { RefCell::new(Vec::new()) };
}

#[derive(Default)]
struct DepGraph {
    signals: SlotMap<SignalId, ()>,
    // recompute closures
    observers: SlotMap<ObserverId, Rc<dyn Fn()>>,
    // signal_id -> observers that depend on it
    edges: SecondaryMap<SignalId, HashSet<ObserverId>>,
    // observer_id -> signals it depends on
    back: SecondaryMap<ObserverId, HashSet<SignalId>>,
    running: HashSet<ObserverId>,
}

impl DepGraph {
    fn remove_all_edges_for(&mut self, obs: ObserverId) {
        if let Some(signals) = self.back.remove(obs) {
            for s in signals {
                if let Some(set) = self.edges.get_mut(s) {
                    set.remove(&obs);
                }
            }
        }
    }

    fn remove_observer(&mut self, obs: ObserverId) -> Option<Rc<dyn Fn()>> {
        self.remove_all_edges_for(obs);
        self.running.remove(&obs);
        self.observers.remove(obs)
    }

    fn remove_signal(&mut self, sig: SignalId) {
        if let Some(observers) = self.edges.remove(sig) {
            for obs in observers {
                if let Some(set) = self.back.get_mut(obs) {
                    set.remove(&sig);
                }
            }
        }
        self.signals.remove(sig);
    }
}

pub(crate) fn new_signal() -> SignalId {
    GRAPH.with(|g| g.borrow_mut().signals.insert(()))
}

pub(crate) fn drop_signal(sig: SignalId) {
    // The graph may already be gone during thread teardown.
    let _ = GRAPH.try_with(|g| match g.try_borrow_mut() {
        Ok(mut g) => g.remove_signal(sig),
        Err(_) => log::debug!("signal {sig:?} dropped while the graph is borrowed; edges kept"),
    });
}

/// Records that the current observer (if any) read `sig`.
pub fn register_signal_read(sig: SignalId) {
    CURRENT_OBSERVER.with(|co| {
        if let Some(obs) = *co.borrow() {
            GRAPH.with(|g| {
                let mut g = g.borrow_mut();
                if !g.observers.contains_key(obs) {
                    return;
                }
                if let Some(set) = g.edges.entry(sig) {
                    set.or_default().insert(obs);
                }
                if let Some(set) = g.back.entry(obs) {
                    set.or_default().insert(sig);
                }
            });
        }
    });
}

/// Re-runs every observer that read `sig` during its last run.
///
/// Observers run synchronously, in no particular order. An observer that is
/// already running is skipped, so an effect that writes a signal it also
/// reads does not recurse. Inside [`batch`] the observers are queued instead
/// and run once when the outermost batch ends.
pub fn signal_changed(sig: SignalId) {
    let queue: Vec<ObserverId> = GRAPH.with(|g| {
        g.borrow()
            .edges
            .get(sig)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    });
    if BATCH_DEPTH.with(Cell::get) > 0 {
        PENDING.with(|p| {
            let mut p = p.borrow_mut();
            for obs in queue {
                if !p.contains(&obs) {
                    p.push(obs);
                }
            }
        });
        return;
    }
    run_all(queue);
}

fn run_all(queue: Vec<ObserverId>) {
    for obs in queue {
        let skip = GRAPH.with(|g| {
            let g = g.borrow();
            g.running.contains(&obs) || !g.observers.contains_key(obs)
        });
        if skip {
            log::trace!("observer {obs:?} skipped: running or disposed");
            continue;
        }
        run_observer_now(obs);
    }
}

struct BatchGuard;

impl Drop for BatchGuard {
    fn drop(&mut self) {
        BATCH_DEPTH.with(|d| d.set(d.get() - 1));
    }
}

/// Runs `f` with change propagation deferred.
///
/// Observers notified inside `f` run once, after `f` returns, in the order
/// they were first notified. Nested batches flush with the outermost one.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    BATCH_DEPTH.with(|d| d.set(d.get() + 1));
    let result = {
        let _guard = BatchGuard;
        f()
    };
    if BATCH_DEPTH.with(Cell::get) == 0 {
        flush_pending();
    }
    result
}

fn flush_pending() {
    loop {
        let queue = PENDING.with(|p| std::mem::take(&mut *p.borrow_mut()));
        if queue.is_empty() {
            break;
        }
        log::trace!("flushing {} deferred observer(s)", queue.len());
        run_all(queue);
    }
}

pub fn new_observer(f: impl Fn() + 'static) -> ObserverId {
    GRAPH.with(|g| g.borrow_mut().observers.insert(Rc::new(f)))
}

/// Remove an observer and all of its dependency edges.
pub fn remove_observer(id: ObserverId) {
    // The closure may own signals; drop it after the graph borrow ends so
    // their own cleanup can reach the graph.
    let removed = GRAPH
        .try_with(|g| match g.try_borrow_mut() {
            Ok(mut g) => g.remove_observer(id),
            Err(_) => {
                log::debug!("observer {id:?} not removed: graph is borrowed");
                None
            }
        })
        .ok()
        .flatten();
    drop(removed);
}

/// Restores the previous observer and clears the running mark, even when the
/// observer panics.
struct RunGuard {
    id: ObserverId,
    prev: Option<ObserverId>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let prev = self.prev.take();
        let _ = CURRENT_OBSERVER.try_with(|co| *co.borrow_mut() = prev);
        let _ = GRAPH.try_with(|g| {
            if let Ok(mut g) = g.try_borrow_mut() {
                g.running.remove(&self.id);
            }
        });
    }
}

/// Runs an observer under tracking, replacing its previous dependencies.
pub fn run_observer_now(id: ObserverId) {
    let f = GRAPH.with(|gcell| {
        let mut g = gcell.borrow_mut();
        g.remove_all_edges_for(id);
        let f = g.observers.get(id).cloned();
        if f.is_some() {
            g.running.insert(id);
        }
        f
    });
    let Some(f) = f else {
        return;
    };

    let prev = CURRENT_OBSERVER.with(|co| co.borrow_mut().replace(id));
    let _guard = RunGuard { id, prev };
    f();
}

/// Runs `f` without registering any signal reads on the current observer.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let prev = CURRENT_OBSERVER.with(|co| co.borrow_mut().take());
    let result = f();
    CURRENT_OBSERVER.with(|co| *co.borrow_mut() = prev);
    result
}

#[cfg(test)]
pub(crate) fn observer_count() -> usize {
    GRAPH.with(|g| g.borrow().observers.len())
}

#[cfg(test)]
pub(crate) fn current_observer() -> Option<ObserverId> {
    CURRENT_OBSERVER.with(|co| *co.borrow())
}

#[cfg(test)]
pub(crate) fn running_count() -> usize {
    GRAPH.with(|g| g.borrow().running.len())
}
