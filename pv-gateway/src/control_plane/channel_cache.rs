//! Name-keyed cache of upstream connections with two-pass mark-and-sweep eviction.

use crate::data_plane::UpstreamConnection;
use crate::observability::events;
use crate::protocol::UpstreamClient;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

const COMPONENT: &str = "channel_cache";

struct CacheEntry {
    connection: Arc<UpstreamConnection>,
    marked: bool,
}

pub(crate) struct UpstreamChannelCache {
    client: Arc<dyn UpstreamClient>,
    runtime: Handle,
    entries: HashMap<String, CacheEntry>,
}

impl UpstreamChannelCache {
    pub(crate) fn new(client: Arc<dyn UpstreamClient>, runtime: Handle) -> Self {
        Self {
            client,
            runtime,
            entries: HashMap::new(),
        }
    }

    /// Looks up `name`, opening a connection on a miss, and reports whether it is
    /// connected. Any lookup clears the eviction mark.
    pub(crate) fn test(&mut self, name: &str) -> bool {
        let entry = match self.entries.entry(name.to_string()) {
            Entry::Occupied(occupied) => {
                debug!(
                    event = events::CACHE_HIT,
                    component = COMPONENT,
                    upstream = name,
                    "upstream cache hit"
                );
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => {
                debug!(
                    event = events::CACHE_MISS,
                    component = COMPONENT,
                    upstream = name,
                    "upstream cache miss; opening connection"
                );
                vacant.insert(CacheEntry {
                    connection: UpstreamConnection::open(name, self.client.clone(), &self.runtime),
                    marked: false,
                })
            }
        };
        entry.marked = false;
        entry.connection.connected()
    }

    /// Returns the connection for `name` only when it is cached and connected.
    pub(crate) fn connected(&self, name: &str) -> Option<Arc<UpstreamConnection>> {
        self.entries
            .get(name)
            .filter(|entry| entry.connection.connected())
            .map(|entry| entry.connection.clone())
    }

    /// Marks unmarked entries and evicts marked entries no longer referenced
    /// outside the cache. Evicted connections are returned so the caller can drop
    /// them after releasing its lock.
    pub(crate) fn sweep(&mut self) -> Vec<Arc<UpstreamConnection>> {
        let mut trash = Vec::new();

        self.entries.retain(|name, entry| {
            if !entry.marked {
                entry.marked = true;
                return true;
            }
            if Arc::strong_count(&entry.connection) > 1 {
                return true;
            }
            debug!(
                event = events::CACHE_EVICT,
                component = COMPONENT,
                upstream = name.as_str(),
                "evicting unused upstream connection"
            );
            trash.push(entry.connection.clone());
            false
        });

        trash
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Arc<UpstreamConnection>> {
        self.entries.remove(name).map(|entry| entry.connection)
    }

    pub(crate) fn names(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn connections(&self) -> impl Iterator<Item = &Arc<UpstreamConnection>> {
        self.entries.values().map(|entry| &entry.connection)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
