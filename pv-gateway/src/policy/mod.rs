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

//! Policy decisions consulted by the gateway.
//!
//! The gateway only enforces what a [`GatewayPolicy`] returns. Policies are called
//! without any gateway lock held and may call back into [`GatewaySource`].

mod static_rules;

pub use static_rules::StaticPolicy;

use crate::data_plane::DownstreamChannel;
use crate::gateway_source::GatewaySource;
use crate::protocol::ChannelControl;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Outcome of testing one searched name from one host.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SearchDecision {
    Ignore,
    Claim,
    /// Ignore, and ignore every later search from this host.
    BanHost,
    /// Ignore, and ignore every later search for this name.
    BanPv,
    /// Ignore, and ignore every later search for this name from this host.
    BanHostPv,
}

impl Display for SearchDecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SearchDecision::Ignore => "ignore",
            SearchDecision::Claim => "claim",
            SearchDecision::BanHost => "ban-host",
            SearchDecision::BanPv => "ban-pv",
            SearchDecision::BanHostPv => "ban-host-pv",
        };
        write!(f, "{label}")
    }
}

/// Host-provided decision callbacks.
pub trait GatewayPolicy: Send + Sync {
    /// Decides whether a search for `name` from `host` is claimed.
    ///
    /// Implementations usually map `name` to an upstream name and finish with
    /// [`GatewaySource::test`].
    fn test_channel(&self, source: &GatewaySource, name: &str, host: &str) -> SearchDecision;

    /// Builds the channel for an accepted downstream create request, usually via
    /// [`GatewaySource::connect`], and sets its permissions. `None` refuses it.
    fn make_channel(
        &self,
        source: &GatewaySource,
        control: &Arc<dyn ChannelControl>,
    ) -> Option<Arc<DownstreamChannel>>;
}
