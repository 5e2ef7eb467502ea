//! One cached upstream connection and the downstream channels bound to it.

use crate::data_plane::shared_get::SharedGet;
use crate::data_plane::subscription_multiplexer::SubscriptionMultiplexer;
use crate::observability::events;
use crate::protocol::{ChannelControl, UpstreamClient, UpstreamConnector};
use crate::runtime::locking::lock;
use crate::runtime::task_guard::TaskGuard;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::debug;

const COMPONENT: &str = "upstream_connection";

/// Identity of a downstream channel control, by allocation address.
pub(crate) fn channel_key(control: &Arc<dyn ChannelControl>) -> usize {
    Arc::as_ptr(control) as *const () as usize
}

/// Shared upstream work published for reuse by later downstream operations.
///
/// Both references are weak: the cache never keeps shared work alive on its own.
#[derive(Default)]
pub(crate) struct SharedOperations {
    pub(crate) subscription: Weak<SubscriptionMultiplexer>,
    pub(crate) get: Weak<SharedGet>,
}

impl SharedOperations {
    pub(crate) fn forget_subscription(&mut self, multiplexer: &Arc<SubscriptionMultiplexer>) {
        if Weak::ptr_eq(&self.subscription, &Arc::downgrade(multiplexer)) {
            self.subscription = Weak::new();
        }
    }

    pub(crate) fn forget_get(&mut self, get: &Arc<SharedGet>) {
        if Weak::ptr_eq(&self.get, &Arc::downgrade(get)) {
            self.get = Weak::new();
        }
    }
}

/// The upstream side of one channel name, shared by every downstream channel bound to it.
pub struct UpstreamConnection {
    name: String,
    client: Arc<dyn UpstreamClient>,
    runtime: Handle,
    connector: Arc<dyn UpstreamConnector>,
    bound: Mutex<HashMap<usize, Weak<dyn ChannelControl>>>,
    shared: Mutex<SharedOperations>,
    get_holdoff_ms: AtomicU32,
    _disconnect_watch: TaskGuard,
}

impl UpstreamConnection {
    /// Opens the upstream connection for `name` and starts watching for disconnects.
    pub(crate) fn open(name: &str, client: Arc<dyn UpstreamClient>, runtime: &Handle) -> Arc<Self> {
        let connector = client.connect(name);
        let state = connector.state();

        Arc::new_cyclic(|weak_self| Self {
            name: name.to_string(),
            client,
            runtime: runtime.clone(),
            connector,
            bound: Mutex::new(HashMap::new()),
            shared: Mutex::new(SharedOperations::default()),
            get_holdoff_ms: AtomicU32::new(0),
            _disconnect_watch: TaskGuard::spawn(
                runtime,
                watch_disconnect(name.to_string(), state, weak_self.clone()),
            ),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connected(&self) -> bool {
        self.connector.connected()
    }

    /// Number of downstream channels currently bound.
    pub fn bound_channels(&self) -> usize {
        lock(&self.bound).len()
    }

    /// Advisory GET hold-off in milliseconds. Reserved for rate limiting, not enforced.
    pub fn get_holdoff(&self) -> u32 {
        self.get_holdoff_ms.load(Ordering::Relaxed)
    }

    pub fn set_get_holdoff(&self, holdoff_ms: u32) {
        self.get_holdoff_ms.store(holdoff_ms, Ordering::Relaxed);
    }

    pub(crate) fn client(&self) -> Arc<dyn UpstreamClient> {
        self.client.clone()
    }

    /// Runs `future` in the upstream context. The task lives as long as the guard.
    pub(crate) fn spawn<F>(&self, future: F) -> TaskGuard
    where
        F: Future<Output = ()> + Send + 'static,
    {
        TaskGuard::spawn(&self.runtime, future)
    }

    pub(crate) fn shared_operations(&self) -> MutexGuard<'_, SharedOperations> {
        lock(&self.shared)
    }

    pub(crate) fn has_live_subscription(&self) -> bool {
        self.shared_operations().subscription.strong_count() > 0
    }

    pub(crate) fn has_live_get(&self) -> bool {
        self.shared_operations().get.strong_count() > 0
    }

    pub(crate) fn bind(&self, control: &Arc<dyn ChannelControl>) {
        lock(&self.bound).insert(channel_key(control), Arc::downgrade(control));
    }

    pub(crate) fn unbind(&self, key: usize) {
        lock(&self.bound).remove(&key);
    }

    /// Closes every bound downstream channel. Controls are closed after the
    /// bound-channel lock is released, since closing may drop channels which unbind.
    pub(crate) fn close_bound_channels(&self) -> usize {
        let controls: Vec<Arc<dyn ChannelControl>> = lock(&self.bound)
            .values()
            .filter_map(Weak::upgrade)
            .collect();

        for control in &controls {
            control.close();
        }
        controls.len()
    }
}

async fn watch_disconnect(
    name: String,
    mut state: watch::Receiver<bool>,
    upstream: Weak<UpstreamConnection>,
) {
    let mut was_connected = *state.borrow_and_update();

    while state.changed().await.is_ok() {
        let connected = *state.borrow_and_update();

        if was_connected && !connected {
            let Some(upstream) = upstream.upgrade() else {
                break;
            };
            let closed = upstream.close_bound_channels();
            debug!(
                event = events::UPSTREAM_DISCONNECT,
                component = COMPONENT,
                upstream = name.as_str(),
                closed,
                "upstream disconnected; closed bound channels"
            );
        }
        was_connected = connected;
    }
}
