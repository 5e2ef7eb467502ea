/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! The gateway source: search filtering, channel creation and the admin surface.

use crate::config::{ConfigError, GatewayConfig};
use crate::control_plane::ban_registry::{BanMatch, BanRegistry};
use crate::control_plane::channel_cache::UpstreamChannelCache;
use crate::data_plane::DownstreamChannel;
use crate::observability::events;
use crate::policy::{GatewayPolicy, SearchDecision, StaticPolicy};
use crate::protocol::{ChannelControl, Search, UpstreamClient};
use crate::runtime::locking::lock;
use crate::runtime::sweep_loop::{spawn_sweep_loop, SweepLoopHandle};
use crate::stats::GatewayStats;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info};

const COMPONENT: &str = "gateway_source";

struct SourceRegistry {
    bans: BanRegistry,
    channels: UpstreamChannelCache,
}

/// Serves downstream searches and channels from cached upstream connections.
///
/// Entry points are synchronous and never wait on upstream work. Upstream work
/// runs on the runtime the source was built with.
pub struct GatewaySource {
    name: String,
    runtime: Handle,
    policy: Arc<dyn GatewayPolicy>,
    registry: Mutex<SourceRegistry>,
}

impl GatewaySource {
    pub fn new(
        name: &str,
        upstream: Arc<dyn UpstreamClient>,
        policy: Arc<dyn GatewayPolicy>,
        runtime: Handle,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            runtime: runtime.clone(),
            policy,
            registry: Mutex::new(SourceRegistry {
                bans: BanRegistry::default(),
                channels: UpstreamChannelCache::new(upstream, runtime),
            }),
        })
    }

    /// Builds a source governed by a [`StaticPolicy`] from `config`, with the
    /// configured bans already applied.
    pub fn from_config(
        config: &GatewayConfig,
        upstream: Arc<dyn UpstreamClient>,
        runtime: Handle,
    ) -> Result<Arc<Self>, ConfigError> {
        let policy = Arc::new(StaticPolicy::from_config(config)?);
        let source = Self::new(&config.name, upstream, policy, runtime);
        source.apply_config(config);
        Ok(source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Claims the searched names the policy accepts. Banned keys are skipped
    /// without consulting the policy; bans returned by the policy are recorded.
    pub fn on_search(&self, search: &mut Search) {
        let host = search.source().to_string();

        if lock(&self.registry).bans.is_host_banned(&host) {
            debug!(
                event = events::SEARCH_BANNED_HOST,
                component = COMPONENT,
                host = host.as_str(),
                "ignoring search from banned host"
            );
            return;
        }

        for item in search.items_mut() {
            let name = item.name().to_string();

            if let Some(matched) = lock(&self.registry).bans.check(&host, &name) {
                let event = match matched {
                    BanMatch::Host => events::SEARCH_BANNED_HOST,
                    BanMatch::Name => events::SEARCH_BANNED_NAME,
                    BanMatch::HostName => events::SEARCH_BANNED_HOST_NAME,
                };
                debug!(
                    event,
                    component = COMPONENT,
                    host = host.as_str(),
                    channel = name.as_str(),
                    ban = %matched,
                    "ignoring banned search"
                );
                continue;
            }

            let decision = self.policy.test_channel(self, &name, &host);
            debug!(
                event = events::SEARCH_POLICY_RESULT,
                component = COMPONENT,
                host = host.as_str(),
                channel = name.as_str(),
                decision = %decision,
                "policy tested search"
            );

            let mut registry = lock(&self.registry);
            let recorded = match decision {
                SearchDecision::Claim => {
                    item.claim();
                    false
                }
                SearchDecision::Ignore => false,
                SearchDecision::BanHost => registry.bans.ban_host(&host),
                SearchDecision::BanPv => registry.bans.ban_name(&name),
                SearchDecision::BanHostPv => registry.bans.ban_host_name(&host, &name),
            };
            if recorded {
                info!(
                    event = events::BAN_RECORDED,
                    component = COMPONENT,
                    host = host.as_str(),
                    channel = name.as_str(),
                    decision = %decision,
                    "recorded search ban"
                );
            }
        }
    }

    /// Accepts or closes a downstream channel. Accepted channels get the RPC,
    /// operation and subscribe handlers registered.
    pub fn on_create(&self, control: Arc<dyn ChannelControl>) {
        let channel = self
            .policy
            .make_channel(self, &control)
            .filter(|channel| channel.upstream().connected());

        let Some(channel) = channel else {
            debug!(
                event = events::CHANNEL_CREATE_REJECTED,
                component = COMPONENT,
                channel = control.name(),
                peer = control.peer(),
                "closing refused or disconnected channel"
            );
            control.close();
            return;
        };

        let rpc_channel = channel.clone();
        control.on_rpc(Box::new(move |op, argument| rpc_channel.on_rpc(op, argument)));
        let op_channel = channel.clone();
        control.on_op(Box::new(move |op| op_channel.on_op(op)));
        control.on_subscribe(Box::new(move |setup| channel.on_subscribe(setup)));
    }

    /// Looks up (or opens) the upstream connection for `upstream_name` and claims
    /// it when connected.
    pub fn test(&self, upstream_name: &str) -> SearchDecision {
        let connected = lock(&self.registry).channels.test(upstream_name);
        debug!(
            event = events::CACHE_TEST,
            component = COMPONENT,
            upstream = upstream_name,
            connected,
            "tested upstream"
        );
        if connected {
            SearchDecision::Claim
        } else {
            SearchDecision::Ignore
        }
    }

    /// Binds a downstream channel to the cached, connected upstream
    /// `upstream_name`. `None` when the name is not cached or not connected.
    pub fn connect(
        &self,
        downstream_name: &str,
        upstream_name: &str,
        control: &Arc<dyn ChannelControl>,
    ) -> Option<Arc<DownstreamChannel>> {
        let upstream = lock(&self.registry).channels.connected(upstream_name);
        debug!(
            event = events::CACHE_CONNECT,
            component = COMPONENT,
            channel = downstream_name,
            upstream = upstream_name,
            found = upstream.is_some(),
            "connecting downstream channel"
        );
        upstream.map(|upstream| DownstreamChannel::bind(downstream_name, upstream, control))
    }

    /// One mark-and-sweep pass over the upstream cache. Evicted connections are
    /// released after the registry lock.
    pub fn sweep(&self) {
        let evicted = lock(&self.registry).channels.sweep();
        debug!(
            event = events::CACHE_SWEEP,
            component = COMPONENT,
            evicted = evicted.len(),
            "swept upstream cache"
        );
        drop(evicted);
    }

    /// Bans future searches. A host alone bans the host, a name alone bans the
    /// name, and both ban the pair. Existing channels are not affected.
    pub fn force_ban(&self, host: Option<&str>, name: Option<&str>) -> bool {
        let mut registry = lock(&self.registry);
        let recorded = match (host, name) {
            (Some(host), Some(name)) => registry.bans.ban_host_name(host, name),
            (Some(host), None) => registry.bans.ban_host(host),
            (None, Some(name)) => registry.bans.ban_name(name),
            (None, None) => false,
        };
        if recorded {
            info!(
                event = events::BAN_RECORDED,
                component = COMPONENT,
                host = host.unwrap_or_default(),
                channel = name.unwrap_or_default(),
                "forced ban"
            );
        }
        recorded
    }

    pub fn clear_bans(&self) {
        lock(&self.registry).bans.clear();
        info!(
            event = events::BAN_CLEARED,
            component = COMPONENT,
            "cleared all bans"
        );
    }

    /// Drops `upstream_name` from the cache and closes every downstream channel
    /// bound to it. Returns whether the name was cached.
    pub fn disconnect(&self, upstream_name: &str) -> bool {
        let removed = lock(&self.registry).channels.remove(upstream_name);
        let Some(upstream) = removed else {
            return false;
        };

        let closed = upstream.close_bound_channels();
        info!(
            event = events::CACHE_DISCONNECT,
            component = COMPONENT,
            upstream = upstream_name,
            closed,
            "disconnected upstream"
        );
        true
    }

    /// Names currently in the upstream cache.
    pub fn cache_peek(&self) -> BTreeSet<String> {
        lock(&self.registry).channels.names()
    }

    pub fn stats(&self) -> GatewayStats {
        let registry = lock(&self.registry);
        let mut stats = GatewayStats {
            channel_cache: registry.channels.len(),
            banned_hosts: registry.bans.banned_hosts(),
            banned_names: registry.bans.banned_names(),
            banned_host_names: registry.bans.banned_host_names(),
            ..GatewayStats::default()
        };
        for upstream in registry.channels.connections() {
            if upstream.has_live_subscription() {
                stats.monitor_cache += 1;
            }
            if upstream.has_live_get() {
                stats.get_cache += 1;
            }
        }
        stats
    }

    /// Applies the configured bans.
    pub fn apply_config(&self, config: &GatewayConfig) {
        for host in &config.ban.hosts {
            self.force_ban(Some(host), None);
        }
        for name in &config.ban.names {
            self.force_ban(None, Some(name));
        }
    }

    /// Sweeps every `interval` until the handle is dropped or the source is gone.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> SweepLoopHandle {
        spawn_sweep_loop(&self.runtime, Arc::downgrade(self), interval)
    }
}
