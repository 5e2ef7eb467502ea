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

//! Periodic cache sweeping.

use crate::gateway_source::GatewaySource;
use crate::observability::events;
use crate::runtime::task_guard::TaskGuard;
use std::sync::Weak;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

const COMPONENT: &str = "sweep_loop";
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Keeps the sweep loop running. Dropping it stops the loop.
#[derive(Debug)]
pub struct SweepLoopHandle {
    _task: TaskGuard,
}

pub(crate) fn spawn_sweep_loop(
    runtime: &Handle,
    source: Weak<GatewaySource>,
    interval: Duration,
) -> SweepLoopHandle {
    let period = interval.max(MIN_SWEEP_INTERVAL);

    SweepLoopHandle {
        _task: TaskGuard::spawn(runtime, async move {
            info!(
                event = events::SWEEP_LOOP_START,
                component = COMPONENT,
                period_ms = period.as_millis() as u64,
                "starting sweep loop"
            );
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(source) = source.upgrade() else {
                    break;
                };
                source.sweep();
            }
            debug!(
                event = events::SWEEP_LOOP_STOP,
                component = COMPONENT,
                "source dropped; sweep loop stopped"
            );
        }),
    }
}
