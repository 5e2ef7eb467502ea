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

//! Structured PV values, request options and incremental update merging.

pub use serde_json::Value;

const CACHE_OPTION_PATH: [&str; 3] = ["record", "_options", "cache"];

/// Reads the cache-participation option (`record._options.cache`) from a request.
///
/// A missing path, or a value which can not be interpreted as a boolean, leaves the
/// default of `true` in place.
pub fn cache_participation(pv_request: &Value) -> bool {
    let option = CACHE_OPTION_PATH
        .iter()
        .try_fold(pv_request, |node, key| node.get(key));

    match option {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map_or(true, |n| n != 0.0),
        Some(Value::String(text)) if text.eq_ignore_ascii_case("true") => true,
        Some(Value::String(text)) if text.eq_ignore_ascii_case("false") => false,
        _ => true,
    }
}

/// Applies an incremental update onto an accumulated snapshot.
///
/// Object members are merged recursively, every other kind of value replaces the
/// existing one.
pub fn assign_delta(snapshot: &mut Value, delta: &Value) {
    match (snapshot, delta) {
        (Value::Object(current), Value::Object(changes)) => {
            for (key, change) in changes {
                match current.get_mut(key) {
                    Some(existing) => assign_delta(existing, change),
                    None => {
                        current.insert(key.clone(), change.clone());
                    }
                }
            }
        }
        (snapshot, delta) => *snapshot = delta.clone(),
    }
}
