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

//! Control-plane layer.
//!
//! Owns the search-time ban sets and the upstream channel cache. Both live behind
//! the single registry lock of [`GatewaySource`](crate::GatewaySource); nothing in
//! this layer calls out to policy code or downstream handles while that lock is held.

pub(crate) mod ban_registry;
pub(crate) mod channel_cache;
