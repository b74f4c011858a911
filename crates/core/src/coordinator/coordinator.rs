//! Account snapshot coordinator.
//!
//! The coordinator owns the single in-memory snapshot of accounts keyed by
//! upstream id. The snapshot is refreshed on a fixed interval or on manual
//! trigger, replaced wholesale on every successful fetch, and left
//! untouched on failure - a failed poll only flips the success flag that
//! gates sensor availability.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::task::JoinHandle;

use akahu_client::{Account, AccountMap, AkahuApi, ApiError};

type Listener = Box<dyn Fn() + Send + Sync>;

struct CoordinatorState {
    /// Current snapshot, `None` until the first successful fetch.
    snapshot: Option<Arc<AccountMap>>,
    /// Whether the most recent fetch succeeded.
    last_update_success: bool,
    /// When the snapshot was last replaced.
    last_updated: Option<DateTime<Utc>>,
}

/// Coordinates account polling for one bridge instance.
///
/// The polling task is the sole writer of the snapshot; sensors are
/// readers only. Writes replace the shared `Arc` under a short write
/// lock, so a reader observes either the old snapshot or the new one,
/// never a mix.
pub struct AccountCoordinator {
    api: Arc<dyn AkahuApi>,
    scan_interval: Duration,
    state: RwLock<CoordinatorState>,
    listeners: Mutex<HashMap<u64, Listener>>,
    next_listener_id: AtomicU64,
    /// Serializes fetches: a manual refresh and a scheduled tick must not
    /// race, and at most one fetch is in flight per instance.
    fetch_lock: tokio::sync::Mutex<()>,
}

impl AccountCoordinator {
    /// Create a coordinator polling at the given cadence.
    ///
    /// No fetch happens here; call [`first_refresh`](Self::first_refresh)
    /// before materializing sensors, then [`start`](Self::start) to begin
    /// scheduled polling.
    pub fn new(api: Arc<dyn AkahuApi>, scan_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            api,
            scan_interval,
            state: RwLock::new(CoordinatorState {
                snapshot: None,
                last_update_success: false,
                last_updated: None,
            }),
            listeners: Mutex::new(HashMap::new()),
            next_listener_id: AtomicU64::new(0),
            fetch_lock: tokio::sync::Mutex::new(()),
        })
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CoordinatorState> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("Coordinator state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CoordinatorState> {
        self.state.write().unwrap_or_else(|poisoned| {
            warn!("Coordinator state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_listeners(&self) -> MutexGuard<'_, HashMap<u64, Listener>> {
        self.listeners.lock().unwrap_or_else(|poisoned| {
            warn!("Coordinator listener lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Perform the initial fetch.
    ///
    /// Setup must not create sensors without an initial snapshot, so a
    /// failure here is returned to the caller and aborts setup as a whole.
    pub async fn first_refresh(&self) -> Result<(), ApiError> {
        let _guard = self.fetch_lock.lock().await;
        match self.api.fetch_accounts().await {
            Ok(accounts) => {
                self.apply_success(accounts);
                Ok(())
            }
            Err(err) => {
                self.mark_failure();
                Err(err)
            }
        }
    }

    /// Fetch now and apply the result.
    ///
    /// On success the snapshot is replaced wholesale and every listener is
    /// notified. On failure the previous snapshot stays visible, the
    /// success flag flips, and listeners are not notified - sensors become
    /// unavailable by querying the flag, not by data mutation.
    pub async fn refresh(&self) {
        let _guard = self.fetch_lock.lock().await;
        match self.api.fetch_accounts().await {
            Ok(accounts) => {
                debug!("Refresh succeeded with {} accounts", accounts.len());
                self.apply_success(accounts);
            }
            Err(err) => {
                warn!("Accounts fetch failed: {}", err);
                self.mark_failure();
            }
        }
    }

    /// Ask the upstream API to recompute, then fetch if accepted.
    ///
    /// The recompute request commonly hits the provider-side cooldown; a
    /// rejection is logged by the client and leaves the snapshot and
    /// success flag untouched.
    pub async fn request_refresh(&self) {
        if self.api.request_refresh().await.is_accepted() {
            debug!("Upstream accepted the refresh request, fetching updated accounts");
            self.refresh().await;
        } else {
            debug!("Upstream rejected the refresh request, keeping the current snapshot");
        }
    }

    fn apply_success(&self, accounts: AccountMap) {
        {
            let mut state = self.write_state();
            state.snapshot = Some(Arc::new(accounts));
            state.last_update_success = true;
            state.last_updated = Some(Utc::now());
        }
        self.notify_listeners();
    }

    fn mark_failure(&self) {
        self.write_state().last_update_success = false;
    }

    /// Current snapshot, if the first fetch has succeeded.
    pub fn snapshot(&self) -> Option<Arc<AccountMap>> {
        self.read_state().snapshot.clone()
    }

    /// One account from the current snapshot.
    pub fn account(&self, account_id: &str) -> Option<Account> {
        self.snapshot()
            .and_then(|snapshot| snapshot.get(account_id).cloned())
    }

    /// Whether the most recent fetch succeeded.
    pub fn last_update_success(&self) -> bool {
        self.read_state().last_update_success
    }

    /// When the snapshot was last replaced.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.read_state().last_updated
    }

    /// Register a listener invoked after every successful refresh.
    ///
    /// The callback runs synchronously on the refreshing task and must be
    /// fast; it must not register or remove listeners. The subscription is
    /// released when the returned handle is dropped.
    pub fn add_listener(
        self: &Arc<Self>,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> ListenerHandle {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.lock_listeners().insert(id, Box::new(listener));
        ListenerHandle {
            coordinator: Arc::downgrade(self),
            id,
        }
    }

    fn notify_listeners(&self) {
        let listeners = self.lock_listeners();
        for listener in listeners.values() {
            listener();
        }
    }

    /// Start the scheduled polling loop.
    ///
    /// The first tick fires one full interval after start - the initial
    /// data came from [`first_refresh`](Self::first_refresh). Dropping or
    /// stopping the returned handle cancels the loop; no further fetches
    /// are issued after that.
    pub fn start(self: &Arc<Self>) -> PollHandle {
        let coordinator = Arc::clone(self);
        let period = self.scan_interval;
        let task = tokio::spawn(async move {
            info!(
                "Account polling started ({}s interval)",
                period.as_secs()
            );
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                coordinator.refresh().await;
            }
        });
        PollHandle { task }
    }
}

/// Subscription handle for coordinator update notifications.
///
/// Dropping the handle removes the listener; a dropped listener is never
/// invoked again.
pub struct ListenerHandle {
    coordinator: Weak<AccountCoordinator>,
    id: u64,
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(coordinator) = self.coordinator.upgrade() {
            coordinator.lock_listeners().remove(&self.id);
        }
    }
}

/// Handle to the background polling task.
///
/// The task is aborted when the handle is stopped or dropped.
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Cancel the polling task.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
