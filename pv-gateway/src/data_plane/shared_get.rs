//! One upstream GET negotiation shared by every cached downstream GET on a name.

use crate::data_plane::UpstreamConnection;
use crate::error::GatewayError;
use crate::observability::events;
use crate::protocol::{ConnectOp, UpstreamClient, UpstreamError, UpstreamOperation};
use crate::runtime::locking::lock;
use crate::runtime::task_guard::TaskGuard;
use crate::value::Value;
use std::sync::{Arc, Mutex, OnceLock, Weak};
use tracing::{debug, warn};

const COMPONENT: &str = "shared_get";

/// Slot receiving the negotiated upstream operation of one downstream GET or PUT.
pub(crate) type OperationSlot = OnceLock<Arc<dyn UpstreamOperation>>;

struct Waiter {
    op: Arc<dyn ConnectOp>,
    slot: Arc<OperationSlot>,
}

enum Phase {
    Connecting(Vec<Waiter>),
    Ready {
        prototype: Value,
        operation: Arc<dyn UpstreamOperation>,
    },
    Error,
}

pub(crate) struct SharedGet {
    name: String,
    phase: Mutex<Phase>,
    negotiation: OnceLock<TaskGuard>,
}

impl SharedGet {
    /// Attaches `op` to the live shared GET of `upstream`, starting one if none is
    /// live or the live one failed. The returned handle keeps the shared GET alive.
    pub(crate) fn attach(
        upstream: &Arc<UpstreamConnection>,
        op: Arc<dyn ConnectOp>,
        slot: Arc<OperationSlot>,
    ) -> Arc<Self> {
        let mut shared = upstream.shared_operations();

        let waiter = Waiter { op, slot };
        let waiter = match shared.get.upgrade() {
            Some(existing) => match existing.join(waiter) {
                Ok(()) => return existing,
                Err(waiter) => waiter,
            },
            None => waiter,
        };

        debug!(
            event = events::SHARED_GET_NEW,
            component = COMPONENT,
            upstream = upstream.name(),
            "starting shared upstream get"
        );
        let fresh = Arc::new(Self {
            name: upstream.name().to_string(),
            phase: Mutex::new(Phase::Connecting(vec![waiter])),
            negotiation: OnceLock::new(),
        });
        let guard = upstream.spawn(negotiate(
            upstream.client(),
            upstream.name().to_string(),
            Arc::downgrade(&fresh),
            Arc::downgrade(upstream),
        ));
        let _ = fresh.negotiation.set(guard);
        shared.get = Arc::downgrade(&fresh);
        fresh
    }

    /// Joins a connecting or ready GET. A failed GET hands the waiter back.
    fn join(&self, waiter: Waiter) -> Result<(), Waiter> {
        let mut phase = lock(&self.phase);
        match &mut *phase {
            Phase::Connecting(waiters) => {
                debug!(
                    event = events::SHARED_GET_JOIN_CONNECTING,
                    component = COMPONENT,
                    upstream = self.name.as_str(),
                    "queued on connecting shared get"
                );
                waiters.push(waiter);
                Ok(())
            }
            Phase::Ready {
                prototype,
                operation,
            } => {
                debug!(
                    event = events::SHARED_GET_JOIN_READY,
                    component = COMPONENT,
                    upstream = self.name.as_str(),
                    "joined ready shared get"
                );
                let _ = waiter.slot.set(operation.clone());
                waiter.op.connect(prototype);
                Ok(())
            }
            Phase::Error => Err(waiter),
        }
    }

    fn ready(&self, prototype: Value, operation: Arc<dyn UpstreamOperation>) {
        let mut phase = lock(&self.phase);
        let waiters = match std::mem::replace(&mut *phase, Phase::Error) {
            Phase::Connecting(waiters) => waiters,
            other => {
                *phase = other;
                return;
            }
        };

        for waiter in waiters {
            let _ = waiter.slot.set(operation.clone());
            waiter.op.connect(&prototype);
        }
        *phase = Phase::Ready {
            prototype,
            operation,
        };
    }

    fn fail(&self, error: UpstreamError) {
        let waiters = match std::mem::replace(&mut *lock(&self.phase), Phase::Error) {
            Phase::Connecting(waiters) => waiters,
            _ => Vec::new(),
        };

        let message = GatewayError::from(error).to_string();
        for waiter in waiters {
            waiter.op.error(&message);
        }
    }
}

async fn negotiate(
    client: Arc<dyn UpstreamClient>,
    name: String,
    get: Weak<SharedGet>,
    upstream: Weak<UpstreamConnection>,
) {
    let result = client.get(&name, None).await;
    let Some(get) = get.upgrade() else {
        return;
    };

    match result {
        Ok((prototype, operation)) => {
            debug!(
                event = events::OP_TYPED,
                component = COMPONENT,
                upstream = name.as_str(),
                "shared get typed"
            );
            get.ready(prototype, operation);
        }
        Err(error) => {
            warn!(
                event = events::OP_INIT_FAILED,
                component = COMPONENT,
                upstream = name.as_str(),
                err = %error,
                "shared get initiation failed"
            );
            match upstream.upgrade() {
                Some(upstream) => {
                    let mut shared = upstream.shared_operations();
                    shared.forget_get(&get);
                    get.fail(error);
                }
                None => get.fail(error),
            }
        }
    }
}
