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

//! Upstream (client side) primitives consumed by the gateway.

use crate::value::Value;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::watch;

/// Failure reported for an upstream operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UpstreamError {
    /// The remote server answered with an error.
    Remote(String),
    /// The operation failed locally, before or while talking to the server.
    Transport(String),
}

impl Display for UpstreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::Remote(message) | UpstreamError::Transport(message) => {
                write!(f, "{message}")
            }
        }
    }
}

impl Error for UpstreamError {}

/// Connection handle for one upstream channel name.
pub trait UpstreamConnector: Send + Sync {
    /// Observes the connected state. Every transition is published.
    fn state(&self) -> watch::Receiver<bool>;

    fn connected(&self) -> bool {
        *self.state().borrow()
    }
}

/// A type-negotiated GET or PUT which may be executed any number of times.
#[async_trait]
pub trait UpstreamOperation: Send + Sync {
    async fn re_exec_get(&self) -> Result<Value, UpstreamError>;

    async fn re_exec_put(&self, value: Value) -> Result<(), UpstreamError>;
}

/// Reasons a monitor queue can not yield a value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MonitorPopError {
    /// The upstream stream ended normally.
    Finished,
    /// Processing of a single queued value failed. Later values may still succeed.
    Failed(UpstreamError),
}

/// A running upstream monitor whose queue is drained by the gateway.
#[async_trait]
pub trait UpstreamSubscription: Send {
    /// Waits until queued events may be available. Returns `false` once the
    /// subscription can never produce anything again.
    async fn wakeup(&mut self) -> bool;

    /// Pops one queued value without waiting. `Ok(None)` means the queue is empty.
    fn pop(&mut self) -> Result<Option<Value>, MonitorPopError>;
}

/// The upstream protocol client shared by every cached channel.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Opens (or reuses) the upstream connection for `name`.
    fn connect(&self, name: &str) -> Arc<dyn UpstreamConnector>;

    async fn info(&self, name: &str) -> Result<Value, UpstreamError>;

    async fn rpc(&self, name: &str, argument: Value) -> Result<Value, UpstreamError>;

    /// Initiates a GET without executing it. Resolves once the type is known.
    ///
    /// `raw_request` is `None` for the cached path, otherwise the downstream
    /// request is passed through unchanged.
    async fn get(
        &self,
        name: &str,
        raw_request: Option<Value>,
    ) -> Result<(Value, Arc<dyn UpstreamOperation>), UpstreamError>;

    /// Initiates a PUT without executing it. Resolves once the type is known.
    async fn put(
        &self,
        name: &str,
        raw_request: Value,
    ) -> Result<(Value, Arc<dyn UpstreamOperation>), UpstreamError>;

    /// Starts a monitor. Resolves once the type is known, or with the setup error.
    async fn monitor(
        &self,
        name: &str,
    ) -> Result<(Value, Box<dyn UpstreamSubscription>), UpstreamError>;
}
