//! RPC, INFO, GET and PUT forwarding for downstream channels.

use crate::data_plane::shared_get::{OperationSlot, SharedGet};
use crate::data_plane::DownstreamChannel;
use crate::error::GatewayError;
use crate::observability::events;
use crate::protocol::{CloseHook, ConnectOp, ExecOp, OperationKind, UpstreamError};
use crate::runtime::task_guard::TaskGuard;
use crate::value::{cache_participation, Value};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "forwarding";
const AUDIT_TARGET: &str = "pv_gateway::audit";

impl DownstreamChannel {
    /// Forwards a downstream RPC call upstream and relays the outcome.
    pub(crate) fn on_rpc(&self, op: Arc<dyn ExecOp>, argument: Value) {
        if !self.permissions().allow_rpc() {
            debug!(
                event = events::RPC_DENIED,
                component = COMPONENT,
                channel = self.name(),
                peer = self.peer(),
                "rpc denied"
            );
            op.error(&GatewayError::RpcDenied.to_string());
            return;
        }

        debug!(
            event = events::RPC_BEGIN,
            component = COMPONENT,
            channel = self.name(),
            "forwarding rpc"
        );
        let client = self.upstream().client();
        let name = self.upstream().name().to_string();
        let replier = op.clone();
        let call = self.upstream().spawn(async move {
            match client.rpc(&name, argument).await {
                Ok(result) => {
                    debug!(
                        event = events::RPC_COMPLETE,
                        component = COMPONENT,
                        upstream = name.as_str(),
                        "rpc complete"
                    );
                    replier.reply(Some(result));
                }
                Err(remote @ UpstreamError::Remote(_)) => {
                    replier.error(&GatewayError::from(remote).to_string());
                }
                Err(UpstreamError::Transport(message)) => {
                    error!(
                        event = events::RPC_FAILED,
                        component = COMPONENT,
                        upstream = name.as_str(),
                        err = message.as_str(),
                        "rpc failed locally"
                    );
                    replier.error(&format!("Error: {message}"));
                }
            }
        });

        op.on_cancel(Box::new(move || drop(call)));
    }

    /// Dispatches a downstream INFO, GET or PUT operation.
    pub(crate) fn on_op(self: &Arc<Self>, op: Arc<dyn ConnectOp>) {
        match op.kind() {
            OperationKind::Info => self.forward_info(op),
            OperationKind::Get => self.forward_get(op),
            OperationKind::Put => self.forward_put(op),
            kind => {
                debug!(
                    event = events::OP_UNSUPPORTED,
                    component = COMPONENT,
                    channel = self.name(),
                    kind = %kind,
                    "unsupported operation"
                );
                op.error(&GatewayError::UnsupportedOperation(kind).to_string());
            }
        }
    }

    fn forward_info(&self, op: Arc<dyn ConnectOp>) {
        debug!(
            event = events::INFO_BEGIN,
            component = COMPONENT,
            channel = self.name(),
            "forwarding info"
        );
        let client = self.upstream().client();
        let name = self.upstream().name().to_string();
        let target = op.clone();
        let request = self.upstream().spawn(async move {
            match client.info(&name).await {
                Ok(prototype) => {
                    debug!(
                        event = events::INFO_COMPLETE,
                        component = COMPONENT,
                        upstream = name.as_str(),
                        "info complete"
                    );
                    target.connect(&prototype);
                }
                Err(error) => target.error(&GatewayError::from(error).to_string()),
            }
        });

        op.on_close(Box::new(move || drop(request)));
    }

    fn forward_get(self: &Arc<Self>, op: Arc<dyn ConnectOp>) {
        let raw_request = op.pv_request();
        let cached = cache_participation(&raw_request);
        if !cached && !self.permissions().allow_uncached() {
            debug!(
                event = events::OP_UNCACHED_DENIED,
                component = COMPONENT,
                channel = self.name(),
                "uncached get denied"
            );
            op.error(&GatewayError::UncachedGetDenied.to_string());
            return;
        }

        let slot: Arc<OperationSlot> = Arc::new(OnceLock::new());
        self.register_executors(&op, &slot);

        let keepalive: CloseHook = if cached {
            let shared = SharedGet::attach(self.upstream(), op.clone(), slot);
            Box::new(move || drop(shared))
        } else {
            let initiation = self.initiate(op.clone(), OperationKind::Get, raw_request, slot);
            Box::new(move || drop(initiation))
        };
        op.on_close(keepalive);
    }

    fn forward_put(self: &Arc<Self>, op: Arc<dyn ConnectOp>) {
        let slot: Arc<OperationSlot> = Arc::new(OnceLock::new());
        self.register_executors(&op, &slot);

        let initiation = self.initiate(op.clone(), OperationKind::Put, op.pv_request(), slot);
        op.on_close(Box::new(move || drop(initiation)));
    }

    /// Starts a pass-through upstream GET or PUT owned by one downstream operation.
    fn initiate(
        &self,
        op: Arc<dyn ConnectOp>,
        kind: OperationKind,
        raw_request: Value,
        slot: Arc<OperationSlot>,
    ) -> TaskGuard {
        debug!(
            event = events::OP_INIT,
            component = COMPONENT,
            channel = self.name(),
            kind = %kind,
            "initiating upstream operation"
        );
        let client = self.upstream().client();
        let name = self.upstream().name().to_string();

        self.upstream().spawn(async move {
            let negotiated = match kind {
                OperationKind::Put => client.put(&name, raw_request).await,
                _ => client.get(&name, Some(raw_request)).await,
            };
            match negotiated {
                Ok((prototype, operation)) => {
                    debug!(
                        event = events::OP_TYPED,
                        component = COMPONENT,
                        upstream = name.as_str(),
                        kind = %kind,
                        "upstream operation typed"
                    );
                    let _ = slot.set(operation);
                    op.connect(&prototype);
                }
                Err(error) => {
                    warn!(
                        event = events::OP_INIT_FAILED,
                        component = COMPONENT,
                        upstream = name.as_str(),
                        kind = %kind,
                        err = %error,
                        "upstream operation initiation failed"
                    );
                    op.error(&GatewayError::from(error).to_string());
                }
            }
        })
    }

    /// Registers the GET and PUT execution handlers. Each execution runs its own
    /// upstream re-execute through the operation negotiated into `slot`.
    fn register_executors(self: &Arc<Self>, op: &Arc<dyn ConnectOp>, slot: &Arc<OperationSlot>) {
        let get_channel = self.clone();
        let get_slot = slot.clone();
        op.on_get(Box::new(move |exec: Arc<dyn ExecOp>| {
            get_channel.execute_get(exec, &get_slot);
        }));

        let put_channel = self.clone();
        let put_slot = slot.clone();
        op.on_put(Box::new(move |exec: Arc<dyn ExecOp>, value: Value| {
            put_channel.execute_put(exec, value, &put_slot);
        }));
    }

    fn execute_get(&self, exec: Arc<dyn ExecOp>, slot: &OperationSlot) {
        debug!(
            event = events::GET_EXEC,
            component = COMPONENT,
            channel = self.name(),
            "get execution"
        );
        let Some(operation) = slot.get().cloned() else {
            exec.error(&GatewayError::OperationNotReady.to_string());
            return;
        };

        let name = self.upstream().name().to_string();
        let replier = exec.clone();
        let execution = self.upstream().spawn(async move {
            let result = operation.re_exec_get().await;
            debug!(
                event = events::GET_EXEC_DONE,
                component = COMPONENT,
                upstream = name.as_str(),
                ok = result.is_ok(),
                "get execution complete"
            );
            match result {
                Ok(value) => replier.reply(Some(value)),
                Err(error) => replier.error(&GatewayError::from(error).to_string()),
            }
        });

        exec.on_cancel(Box::new(move || drop(execution)));
    }

    fn execute_put(&self, exec: Arc<dyn ExecOp>, value: Value, slot: &OperationSlot) {
        if !self.permissions().allow_put() {
            debug!(
                event = events::PUT_DENIED,
                component = COMPONENT,
                channel = self.name(),
                peer = self.peer(),
                "put denied"
            );
            exec.error(&GatewayError::PutDenied.to_string());
            return;
        }

        let Some(operation) = slot.get().cloned() else {
            exec.error(&GatewayError::OperationNotReady.to_string());
            return;
        };

        if self.permissions().audit() {
            info!(
                target: AUDIT_TARGET,
                event = events::PUT_AUDIT,
                component = COMPONENT,
                channel = self.name(),
                peer = self.peer(),
                account = self.account(),
                value = %value,
                "put"
            );
        }
        debug!(
            event = events::PUT_EXEC,
            component = COMPONENT,
            channel = self.name(),
            "put execution"
        );

        let name = self.upstream().name().to_string();
        let replier = exec.clone();
        let execution = self.upstream().spawn(async move {
            let result = operation.re_exec_put(value).await;
            debug!(
                event = events::PUT_EXEC_DONE,
                component = COMPONENT,
                upstream = name.as_str(),
                ok = result.is_ok(),
                "put execution complete"
            );
            match result {
                Ok(()) => replier.reply(None),
                Err(error) => replier.error(&GatewayError::from(error).to_string()),
            }
        });

        exec.on_cancel(Box::new(move || drop(execution)));
    }
}
