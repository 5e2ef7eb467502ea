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

//! Runtime integration layer.
//!
//! Keeps task ownership and the periodic sweep loop in one place so the rest of
//! the crate only deals with guards and handles, never with raw join handles.

pub(crate) mod locking;
pub(crate) mod sweep_loop;
pub(crate) mod task_guard;
