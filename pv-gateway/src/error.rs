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

//! Downstream-facing gateway failures.

use crate::protocol::{OperationKind, UpstreamError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures reported to downstream operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GatewayError {
    RpcDenied,
    PutDenied,
    UncachedGetDenied,
    UncachedMonitorDenied,
    UnsupportedOperation(OperationKind),
    OperationNotReady,
    Upstream(UpstreamError),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::RpcDenied => write!(f, "RPC permission denied by gateway"),
            GatewayError::PutDenied => write!(f, "Put permission denied by gateway"),
            GatewayError::UncachedGetDenied => write!(f, "Gateway disallows uncachable get"),
            GatewayError::UncachedMonitorDenied => {
                write!(f, "Gateway disallows uncachable monitor")
            }
            GatewayError::UnsupportedOperation(kind) => {
                write!(f, "unsupported operation {kind}")
            }
            GatewayError::OperationNotReady => {
                write!(f, "upstream operation has not completed type negotiation")
            }
            GatewayError::Upstream(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GatewayError::Upstream(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        GatewayError::Upstream(err)
    }
}
