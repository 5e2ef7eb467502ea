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

//! JSON5 gateway configuration.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub name: String,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Forces PUT and RPC off for every channel, whatever the rules grant.
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub ban: BanConfig,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Bans applied when the configuration is loaded.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct BanConfig {
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
}

/// One access rule. Rules are tried in order and the first matching one decides.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Regular expression matched against the whole requested name.
    pub pattern: String,
    /// Upstream name template; `$1`, `${name}` refer to pattern captures.
    /// Defaults to the requested name.
    #[serde(default)]
    pub upstream: Option<String>,
    /// Hosts the rule applies to. Empty means any host.
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub deny: bool,
    #[serde(default)]
    pub permissions: PermissionConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PermissionConfig {
    #[serde(default)]
    pub put: bool,
    #[serde(default)]
    pub rpc: bool,
    #[serde(default)]
    pub uncached: bool,
    #[serde(default)]
    pub audit: bool,
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    InvalidPattern { pattern: String, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "unable to read config file: {err}"),
            ConfigError::Parse(reason) => write!(f, "unable to parse config file: {reason}"),
            ConfigError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid rule pattern '{pattern}': {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl GatewayConfig {
    pub fn from_json5(contents: &str) -> Result<Self, ConfigError> {
        json5::from_str(contents).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json5(&contents)
    }
}
