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

//! Data-plane layer.
//!
//! Owns per-name upstream connections, the downstream channels bound to them, and
//! the forwarding of every operation kind. Shared upstream work (cached GETs and
//! monitors) is referenced weakly from its [`UpstreamConnection`] and strongly from
//! the close hooks of the downstream operations using it, so it lives exactly as
//! long as downstream demand.
//!
//! Lock order: the per-upstream shared-operation lock is taken before the lock of
//! any individual shared GET or multiplexer. The bound-channel lock is never held
//! while calling into a downstream handle.

pub(crate) mod downstream_channel;
pub(crate) mod forwarding;
pub(crate) mod shared_get;
pub(crate) mod subscription_multiplexer;
pub(crate) mod upstream_connection;

pub use downstream_channel::{ChannelPermissions, DownstreamChannel};
pub use upstream_connection::UpstreamConnection;
