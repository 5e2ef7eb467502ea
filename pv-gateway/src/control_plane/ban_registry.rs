//! Search-time ban sets consulted before any policy callback.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// Which ban set matched a search item.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BanMatch {
    Host,
    Name,
    HostName,
}

impl Display for BanMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BanMatch::Host => write!(f, "host"),
            BanMatch::Name => write!(f, "name"),
            BanMatch::HostName => write!(f, "host+name"),
        }
    }
}

/// Banned hosts, banned channel names and banned (host, name) pairs.
///
/// Entries never expire; only an explicit [`BanRegistry::clear`] removes them.
#[derive(Debug, Default)]
pub(crate) struct BanRegistry {
    hosts: HashSet<String>,
    names: HashSet<String>,
    host_names: HashSet<(String, String)>,
}

impl BanRegistry {
    pub(crate) fn is_host_banned(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    /// Returns the first ban set matching `(host, name)`, checked name, host, then pair.
    pub(crate) fn check(&self, host: &str, name: &str) -> Option<BanMatch> {
        if self.names.contains(name) {
            Some(BanMatch::Name)
        } else if self.hosts.contains(host) {
            Some(BanMatch::Host)
        } else if self
            .host_names
            .contains(&(host.to_string(), name.to_string()))
        {
            Some(BanMatch::HostName)
        } else {
            None
        }
    }

    pub(crate) fn ban_host(&mut self, host: &str) -> bool {
        self.hosts.insert(host.to_string())
    }

    pub(crate) fn ban_name(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    pub(crate) fn ban_host_name(&mut self, host: &str, name: &str) -> bool {
        self.host_names.insert((host.to_string(), name.to_string()))
    }

    pub(crate) fn clear(&mut self) {
        self.hosts.clear();
        self.names.clear();
        self.host_names.clear();
    }

    pub(crate) fn banned_hosts(&self) -> usize {
        self.hosts.len()
    }

    pub(crate) fn banned_names(&self) -> usize {
        self.names.len()
    }

    pub(crate) fn banned_host_names(&self) -> usize {
        self.host_names.len()
    }
}
