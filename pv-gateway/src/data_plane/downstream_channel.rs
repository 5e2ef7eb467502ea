//! Downstream channels and their per-channel permissions.

use crate::data_plane::upstream_connection::channel_key;
use crate::data_plane::UpstreamConnection;
use crate::observability::events;
use crate::protocol::ChannelControl;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

const COMPONENT: &str = "downstream_channel";

/// Permissions granted to one downstream channel. All default to denied.
///
/// Policies set these after the channel is built. Flags are read on every
/// operation, so later changes apply to subsequent requests.
#[derive(Debug, Default)]
pub struct ChannelPermissions {
    allow_put: AtomicBool,
    allow_rpc: AtomicBool,
    allow_uncached: AtomicBool,
    audit: AtomicBool,
}

impl ChannelPermissions {
    pub fn allow_put(&self) -> bool {
        self.allow_put.load(Ordering::Relaxed)
    }

    pub fn set_allow_put(&self, allow: bool) {
        self.allow_put.store(allow, Ordering::Relaxed);
    }

    pub fn allow_rpc(&self) -> bool {
        self.allow_rpc.load(Ordering::Relaxed)
    }

    pub fn set_allow_rpc(&self, allow: bool) {
        self.allow_rpc.store(allow, Ordering::Relaxed);
    }

    /// Whether GET and MONITOR requests declining cache participation are served.
    pub fn allow_uncached(&self) -> bool {
        self.allow_uncached.load(Ordering::Relaxed)
    }

    pub fn set_allow_uncached(&self, allow: bool) {
        self.allow_uncached.store(allow, Ordering::Relaxed);
    }

    /// Whether accepted PUTs are written to the audit log.
    pub fn audit(&self) -> bool {
        self.audit.load(Ordering::Relaxed)
    }

    pub fn set_audit(&self, audit: bool) {
        self.audit.store(audit, Ordering::Relaxed);
    }
}

/// One accepted downstream channel, bound to its upstream connection while alive.
pub struct DownstreamChannel {
    name: String,
    peer: String,
    account: String,
    control_key: usize,
    upstream: Arc<UpstreamConnection>,
    permissions: ChannelPermissions,
}

impl DownstreamChannel {
    pub(crate) fn bind(
        name: &str,
        upstream: Arc<UpstreamConnection>,
        control: &Arc<dyn ChannelControl>,
    ) -> Arc<Self> {
        upstream.bind(control);
        debug!(
            event = events::CHANNEL_BIND,
            component = COMPONENT,
            channel = name,
            upstream = upstream.name(),
            peer = control.peer(),
            "bound downstream channel"
        );

        Arc::new(Self {
            name: name.to_string(),
            peer: control.peer().to_string(),
            account: control.account().to_string(),
            control_key: channel_key(control),
            upstream,
            permissions: ChannelPermissions::default(),
        })
    }

    /// Name requested by the downstream client.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn upstream(&self) -> &Arc<UpstreamConnection> {
        &self.upstream
    }

    pub fn permissions(&self) -> &ChannelPermissions {
        &self.permissions
    }
}

impl Drop for DownstreamChannel {
    fn drop(&mut self) {
        self.upstream.unbind(self.control_key);
        debug!(
            event = events::CHANNEL_UNBIND,
            component = COMPONENT,
            channel = self.name.as_str(),
            upstream = self.upstream.name(),
            "unbound downstream channel"
        );
    }
}

impl Debug for DownstreamChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownstreamChannel")
            .field("name", &self.name)
            .field("upstream", &self.upstream.name())
            .field("peer", &self.peer)
            .field("permissions", &self.permissions)
            .finish()
    }
}
