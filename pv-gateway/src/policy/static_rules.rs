//! Rule-table policy built from [`GatewayConfig`].

use crate::config::{ConfigError, GatewayConfig, PermissionConfig};
use crate::data_plane::DownstreamChannel;
use crate::gateway_source::GatewaySource;
use crate::policy::{GatewayPolicy, SearchDecision};
use crate::protocol::ChannelControl;
use regex::Regex;
use std::sync::Arc;

struct Rule {
    pattern: Regex,
    upstream: Option<String>,
    hosts: Vec<String>,
    deny: bool,
    permissions: PermissionConfig,
}

#[derive(Debug, Eq, PartialEq)]
struct Resolution {
    upstream_name: String,
    permissions: PermissionConfig,
}

/// Ordered rule table. Names matching no rule, or a deny rule, are banned for the
/// requesting host.
pub struct StaticPolicy {
    rules: Vec<Rule>,
    read_only: bool,
}

impl StaticPolicy {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let rules = config
            .rules
            .iter()
            .map(|rule| {
                let pattern = Regex::new(&format!("^(?:{})$", rule.pattern)).map_err(|err| {
                    ConfigError::InvalidPattern {
                        pattern: rule.pattern.clone(),
                        reason: err.to_string(),
                    }
                })?;
                Ok(Rule {
                    pattern,
                    upstream: rule.upstream.clone(),
                    hosts: rule.hosts.clone(),
                    deny: rule.deny,
                    permissions: rule.permissions,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            rules,
            read_only: config.read_only,
        })
    }

    fn resolve(&self, name: &str, host: &str) -> Option<Resolution> {
        let rule = self.rules.iter().find(|rule| {
            rule.pattern.is_match(name)
                && (rule.hosts.is_empty() || rule.hosts.iter().any(|allowed| allowed == host))
        })?;
        if rule.deny {
            return None;
        }

        let upstream_name = match &rule.upstream {
            Some(template) => {
                let captures = rule.pattern.captures(name)?;
                let mut expanded = String::new();
                captures.expand(template, &mut expanded);
                expanded
            }
            None => name.to_string(),
        };

        let mut permissions = rule.permissions;
        if self.read_only {
            permissions.put = false;
            permissions.rpc = false;
        }
        Some(Resolution {
            upstream_name,
            permissions,
        })
    }
}

/// Strips a trailing `:port` from a peer address.
fn host_of(peer: &str) -> &str {
    if let Some((host, _)) = peer.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
        return host;
    }
    match peer.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            host
        }
        _ => peer,
    }
}

impl GatewayPolicy for StaticPolicy {
    fn test_channel(&self, source: &GatewaySource, name: &str, host: &str) -> SearchDecision {
        match self.resolve(name, host_of(host)) {
            Some(resolution) => source.test(&resolution.upstream_name),
            None => SearchDecision::BanHostPv,
        }
    }

    fn make_channel(
        &self,
        source: &GatewaySource,
        control: &Arc<dyn ChannelControl>,
    ) -> Option<Arc<DownstreamChannel>> {
        let resolution = self.resolve(control.name(), host_of(control.peer()))?;
        let channel = source.connect(control.name(), &resolution.upstream_name, control)?;

        let permissions = channel.permissions();
        permissions.set_allow_put(resolution.permissions.put);
        permissions.set_allow_rpc(resolution.permissions.rpc);
        permissions.set_allow_uncached(resolution.permissions.uncached);
        permissions.set_audit(resolution.permissions.audit);
        Some(channel)
    }
}
