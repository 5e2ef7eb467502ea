//! Point-in-time gateway counters.

use serde::Serialize;

/// Sizes of the gateway caches and ban sets.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct GatewayStats {
    /// Cached upstream connections.
    pub channel_cache: usize,
    /// Upstream connections with a live shared monitor.
    pub monitor_cache: usize,
    /// Upstream connections with a live shared GET.
    pub get_cache: usize,
    pub banned_hosts: usize,
    pub banned_names: usize,
    pub banned_host_names: usize,
}
