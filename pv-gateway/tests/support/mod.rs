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

#![allow(dead_code)]

use async_trait::async_trait;
use pv_gateway::{
    ChannelControl, CloseHook, ConnectOp, DownstreamChannel, ExecHandler, ExecOp,
    GatewayPolicy, GatewaySource, MonitorControlOp, MonitorPopError, MonitorSetupOp,
    OpHandler, OperationKind, PermissionConfig, PutHandler, RpcHandler, SearchDecision,
    SubscribeHandler, UpstreamClient, UpstreamConnector, UpstreamError, UpstreamOperation,
    UpstreamSubscription,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Polls `condition` until it holds, failing the test after two seconds.
pub(crate) async fn eventually<F>(what: &str, mut condition: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}

/// Lets spawned upstream tasks run for a while.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

pub(crate) fn uncached_request() -> Value {
    json!({"record": {"_options": {"cache": false}}})
}

// ---------------------------------------------------------------------------
// Upstream mock
// ---------------------------------------------------------------------------

pub(crate) struct MockConnector {
    state: watch::Sender<bool>,
}

impl UpstreamConnector for MockConnector {
    fn state(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

/// Items fed into a running mock monitor.
pub(crate) enum MonitorFeed {
    Update(Value),
    Fail(String),
    Finish,
}

pub(crate) fn hits(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

#[derive(Default)]
pub(crate) struct Counters {
    pub(crate) connects: AtomicUsize,
    pub(crate) info: AtomicUsize,
    pub(crate) rpc: AtomicUsize,
    pub(crate) get_inits: AtomicUsize,
    pub(crate) put_inits: AtomicUsize,
    pub(crate) monitor_inits: AtomicUsize,
    pub(crate) get_execs: AtomicUsize,
    pub(crate) put_execs: AtomicUsize,
}

pub(crate) struct MockState {
    pub(crate) counters: Counters,
    connectors: Mutex<HashMap<String, Arc<MockConnector>>>,
    offline: Mutex<Vec<String>>,
    negotiation_gate: watch::Sender<bool>,
    rpc_result: Mutex<Result<Value, UpstreamError>>,
    init_failure: Mutex<Option<UpstreamError>>,
    monitor_failure: Mutex<Option<UpstreamError>>,
    value: Mutex<Value>,
    pub(crate) get_requests: Mutex<Vec<Option<Value>>>,
    pub(crate) put_requests: Mutex<Vec<Value>>,
    pub(crate) written: Mutex<Vec<Value>>,
    monitor_feeds: Mutex<Vec<mpsc::UnboundedSender<MonitorFeed>>>,
}

/// Scripted upstream client. Negotiations (GET, PUT and MONITOR initiation) can be
/// held open to exercise the connecting state.
pub(crate) struct MockUpstream {
    pub(crate) state: Arc<MockState>,
}

pub(crate) fn prototype() -> Value {
    json!({"value": 0.0, "alarm": {"severity": 0}})
}

impl MockUpstream {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(MockState {
                counters: Counters::default(),
                connectors: Mutex::new(HashMap::new()),
                offline: Mutex::new(Vec::new()),
                negotiation_gate: watch::channel(true).0,
                rpc_result: Mutex::new(Ok(json!({"result": "ok"}))),
                init_failure: Mutex::new(None),
                monitor_failure: Mutex::new(None),
                value: Mutex::new(json!({"value": 1.5})),
                get_requests: Mutex::new(Vec::new()),
                put_requests: Mutex::new(Vec::new()),
                written: Mutex::new(Vec::new()),
                monitor_feeds: Mutex::new(Vec::new()),
            }),
        })
    }

    pub(crate) fn counters(&self) -> &Counters {
        &self.state.counters
    }

    /// Names connected later start disconnected.
    pub(crate) fn set_offline(&self, name: &str) {
        self.state.offline.lock().unwrap().push(name.to_string());
    }

    pub(crate) fn set_connected(&self, name: &str, connected: bool) {
        if let Some(connector) = self.state.connectors.lock().unwrap().get(name) {
            connector.state.send_replace(connected);
        }
    }

    pub(crate) fn hold_negotiations(&self) {
        self.state.negotiation_gate.send_replace(false);
    }

    pub(crate) fn release_negotiations(&self) {
        self.state.negotiation_gate.send_replace(true);
    }

    pub(crate) fn set_rpc_result(&self, result: Result<Value, UpstreamError>) {
        *self.state.rpc_result.lock().unwrap() = result;
    }

    pub(crate) fn fail_initiations(&self, error: Option<UpstreamError>) {
        *self.state.init_failure.lock().unwrap() = error;
    }

    pub(crate) fn fail_monitors(&self, error: Option<UpstreamError>) {
        *self.state.monitor_failure.lock().unwrap() = error;
    }

    pub(crate) fn set_value(&self, value: Value) {
        *self.state.value.lock().unwrap() = value;
    }

    /// Feeds the `index`-th upstream monitor started so far.
    pub(crate) fn feed(&self, index: usize, item: MonitorFeed) {
        let feeds = self.state.monitor_feeds.lock().unwrap();
        let _ = feeds[index].send(item);
    }

    /// Drops the feed of the `index`-th upstream monitor, so its subscription can
    /// never wake up again.
    pub(crate) fn end_feed(&self, index: usize) {
        let mut feeds = self.state.monitor_feeds.lock().unwrap();
        feeds[index] = mpsc::unbounded_channel().0;
    }

    pub(crate) fn live_monitor_feeds(&self) -> usize {
        self.state
            .monitor_feeds
            .lock()
            .unwrap()
            .iter()
            .filter(|feed| !feed.is_closed())
            .count()
    }
}

impl MockState {
    async fn negotiate(&self) {
        let mut gate = self.negotiation_gate.subscribe();
        loop {
            if *gate.borrow_and_update() {
                return;
            }
            if gate.changed().await.is_err() {
                return;
            }
        }
    }
}

struct MockOperation {
    state: Arc<MockState>,
}

#[async_trait]
impl UpstreamOperation for MockOperation {
    async fn re_exec_get(&self) -> Result<Value, UpstreamError> {
        self.state.counters.get_execs.fetch_add(1, Ordering::SeqCst);
        let value = self.state.value.lock().unwrap().clone();
        Ok(value)
    }

    async fn re_exec_put(&self, value: Value) -> Result<(), UpstreamError> {
        self.state.counters.put_execs.fetch_add(1, Ordering::SeqCst);
        if value.get("reject").is_some() {
            return Err(UpstreamError::Remote("put rejected by server".into()));
        }
        self.state.written.lock().unwrap().push(value);
        Ok(())
    }
}

struct MockSubscription {
    feed: mpsc::UnboundedReceiver<MonitorFeed>,
    queue: VecDeque<Result<Value, MonitorPopError>>,
}

impl MockSubscription {
    fn enqueue(&mut self, item: MonitorFeed) {
        self.queue.push_back(match item {
            MonitorFeed::Update(value) => Ok(value),
            MonitorFeed::Fail(message) => Err(MonitorPopError::Failed(UpstreamError::Transport(
                message,
            ))),
            MonitorFeed::Finish => Err(MonitorPopError::Finished),
        });
    }
}

#[async_trait]
impl UpstreamSubscription for MockSubscription {
    async fn wakeup(&mut self) -> bool {
        if !self.queue.is_empty() {
            return true;
        }
        match self.feed.recv().await {
            Some(item) => {
                self.enqueue(item);
                while let Ok(item) = self.feed.try_recv() {
                    self.enqueue(item);
                }
                true
            }
            None => false,
        }
    }

    fn pop(&mut self) -> Result<Option<Value>, MonitorPopError> {
        match self.queue.pop_front() {
            Some(Ok(value)) => Ok(Some(value)),
            Some(Err(error)) => Err(error),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UpstreamClient for MockUpstream {
    fn connect(&self, name: &str) -> Arc<dyn UpstreamConnector> {
        self.state.counters.connects.fetch_add(1, Ordering::SeqCst);
        let online = !self.state.offline.lock().unwrap().iter().any(|n| n == name);
        let connector = Arc::new(MockConnector {
            state: watch::channel(online).0,
        });
        self.state
            .connectors
            .lock()
            .unwrap()
            .insert(name.to_string(), connector.clone());
        connector
    }

    async fn info(&self, _name: &str) -> Result<Value, UpstreamError> {
        self.state.counters.info.fetch_add(1, Ordering::SeqCst);
        Ok(prototype())
    }

    async fn rpc(&self, _name: &str, _argument: Value) -> Result<Value, UpstreamError> {
        self.state.counters.rpc.fetch_add(1, Ordering::SeqCst);
        let result = self.state.rpc_result.lock().unwrap().clone();
        result
    }

    async fn get(
        &self,
        _name: &str,
        raw_request: Option<Value>,
    ) -> Result<(Value, Arc<dyn UpstreamOperation>), UpstreamError> {
        self.state.counters.get_inits.fetch_add(1, Ordering::SeqCst);
        self.state.get_requests.lock().unwrap().push(raw_request);
        self.state.negotiate().await;
        let failure = self.state.init_failure.lock().unwrap().clone();
        match failure {
            Some(error) => Err(error),
            None => Ok((
                prototype(),
                Arc::new(MockOperation {
                    state: self.state.clone(),
                }),
            )),
        }
    }

    async fn put(
        &self,
        _name: &str,
        raw_request: Value,
    ) -> Result<(Value, Arc<dyn UpstreamOperation>), UpstreamError> {
        self.state.counters.put_inits.fetch_add(1, Ordering::SeqCst);
        self.state.put_requests.lock().unwrap().push(raw_request);
        self.state.negotiate().await;
        Ok((
            prototype(),
            Arc::new(MockOperation {
                state: self.state.clone(),
            }),
        ))
    }

    async fn monitor(
        &self,
        _name: &str,
    ) -> Result<(Value, Box<dyn UpstreamSubscription>), UpstreamError> {
        self.state.counters.monitor_inits.fetch_add(1, Ordering::SeqCst);
        self.state.negotiate().await;
        let failure = self.state.monitor_failure.lock().unwrap().clone();
        if let Some(error) = failure {
            return Err(error);
        }

        let (sender, feed) = mpsc::unbounded_channel();
        self.state.monitor_feeds.lock().unwrap().push(sender);
        Ok((
            prototype(),
            Box::new(MockSubscription {
                feed,
                queue: VecDeque::new(),
            }),
        ))
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Claims every connected name under its own name unless scripted otherwise.
#[derive(Default)]
pub(crate) struct ScriptedPolicy {
    pub(crate) test_calls: AtomicUsize,
    decisions: Mutex<HashMap<String, SearchDecision>>,
    permissions: Mutex<PermissionConfig>,
    refuse: AtomicBool,
}

impl ScriptedPolicy {
    pub(crate) fn new(permissions: PermissionConfig) -> Arc<Self> {
        let policy = Self::default();
        *policy.permissions.lock().unwrap() = permissions;
        Arc::new(policy)
    }

    pub(crate) fn decide(&self, name: &str, decision: SearchDecision) {
        self.decisions
            .lock()
            .unwrap()
            .insert(name.to_string(), decision);
    }

    pub(crate) fn refuse_channels(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    pub(crate) fn test_calls(&self) -> usize {
        self.test_calls.load(Ordering::SeqCst)
    }
}

impl GatewayPolicy for ScriptedPolicy {
    fn test_channel(&self, source: &GatewaySource, name: &str, _host: &str) -> SearchDecision {
        self.test_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.decisions.lock().unwrap().get(name).copied();
        match scripted {
            Some(decision) => decision,
            None => source.test(name),
        }
    }

    fn make_channel(
        &self,
        source: &GatewaySource,
        control: &Arc<dyn ChannelControl>,
    ) -> Option<Arc<DownstreamChannel>> {
        if self.refuse.load(Ordering::SeqCst) {
            return None;
        }
        let channel = source.connect(control.name(), control.name(), control)?;
        let permissions = *self.permissions.lock().unwrap();
        channel.permissions().set_allow_put(permissions.put);
        channel.permissions().set_allow_rpc(permissions.rpc);
        channel.permissions().set_allow_uncached(permissions.uncached);
        channel.permissions().set_audit(permissions.audit);
        Some(channel)
    }
}

pub(crate) struct Gateway {
    pub(crate) upstream: Arc<MockUpstream>,
    pub(crate) policy: Arc<ScriptedPolicy>,
    pub(crate) source: Arc<GatewaySource>,
}

pub(crate) fn gateway(permissions: PermissionConfig) -> Gateway {
    init_logging();
    let upstream = MockUpstream::new();
    let policy = ScriptedPolicy::new(permissions);
    let source = GatewaySource::new("test-gw", upstream.clone(), policy.clone(), Handle::current());
    Gateway {
        upstream,
        policy,
        source,
    }
}

pub(crate) fn all_permissions() -> PermissionConfig {
    PermissionConfig {
        put: true,
        rpc: true,
        uncached: true,
        audit: true,
    }
}

impl Gateway {
    /// Searches for `name`, then opens a downstream channel for it.
    pub(crate) fn open(&self, name: &str) -> Arc<MockChannel> {
        self.source.test(name);
        let channel = MockChannel::new(name, "10.0.0.7:41000");
        let control: Arc<dyn ChannelControl> = channel.clone();
        self.source.on_create(control);
        channel
    }
}

// ---------------------------------------------------------------------------
// Downstream mocks
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Handlers {
    rpc: Option<RpcHandler>,
    op: Option<OpHandler>,
    subscribe: Option<SubscribeHandler>,
}

/// A downstream channel. Closing it releases the registered handlers.
pub(crate) struct MockChannel {
    name: String,
    peer: String,
    closed: AtomicBool,
    handlers: Mutex<Handlers>,
}

impl MockChannel {
    pub(crate) fn new(name: &str, peer: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            peer: peer.to_string(),
            closed: AtomicBool::new(false),
            handlers: Mutex::new(Handlers::default()),
        })
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn has_handlers(&self) -> bool {
        let handlers = self.handlers.lock().unwrap();
        handlers.rpc.is_some() && handlers.op.is_some() && handlers.subscribe.is_some()
    }

    pub(crate) fn rpc(&self, argument: Value) -> Arc<MockExec> {
        let exec = MockExec::new(&self.name);
        let handlers = self.handlers.lock().unwrap();
        let handler = handlers.rpc.as_ref().expect("rpc handler registered");
        let handle: Arc<dyn ExecOp> = exec.clone();
        handler(handle, argument);
        exec
    }

    pub(crate) fn operation(&self, kind: OperationKind, pv_request: Value) -> Arc<MockConnect> {
        let op = MockConnect::new(&self.name, kind, pv_request);
        let handlers = self.handlers.lock().unwrap();
        let handler = handlers.op.as_ref().expect("op handler registered");
        let handle: Arc<dyn ConnectOp> = op.clone();
        handler(handle);
        op
    }

    pub(crate) fn subscribe(&self, pv_request: Value) -> Arc<MockSetup> {
        let setup = MockSetup::new(&self.name, pv_request);
        let handlers = self.handlers.lock().unwrap();
        let handler = handlers
            .subscribe
            .as_ref()
            .expect("subscribe handler registered");
        let handle: Arc<dyn MonitorSetupOp> = setup.clone();
        handler(handle);
        setup
    }
}

impl ChannelControl for MockChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn peer(&self) -> &str {
        &self.peer
    }

    fn account(&self) -> &str {
        "operator"
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let released = std::mem::take(&mut *self.handlers.lock().unwrap());
        drop(released);
    }

    fn on_rpc(&self, handler: RpcHandler) {
        self.handlers.lock().unwrap().rpc = Some(handler);
    }

    fn on_op(&self, handler: OpHandler) {
        self.handlers.lock().unwrap().op = Some(handler);
    }

    fn on_subscribe(&self, handler: SubscribeHandler) {
        self.handlers.lock().unwrap().subscribe = Some(handler);
    }
}

/// Outcome of a downstream execution or operation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Outcome {
    Pending,
    Reply(Option<Value>),
    Error(String),
}

pub(crate) struct MockExec {
    name: String,
    outcome: Mutex<Outcome>,
    cancel_hooks: Mutex<Vec<CloseHook>>,
}

impl MockExec {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            outcome: Mutex::new(Outcome::Pending),
            cancel_hooks: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn outcome(&self) -> Outcome {
        self.outcome.lock().unwrap().clone()
    }

    pub(crate) fn is_done(&self) -> bool {
        self.outcome() != Outcome::Pending
    }

    pub(crate) fn cancel(&self) {
        let hooks = std::mem::take(&mut *self.cancel_hooks.lock().unwrap());
        for hook in hooks {
            hook();
        }
    }
}

impl ExecOp for MockExec {
    fn name(&self) -> &str {
        &self.name
    }

    fn reply(&self, value: Option<Value>) {
        *self.outcome.lock().unwrap() = Outcome::Reply(value);
    }

    fn error(&self, message: &str) {
        *self.outcome.lock().unwrap() = Outcome::Error(message.to_string());
    }

    fn on_cancel(&self, hook: CloseHook) {
        self.cancel_hooks.lock().unwrap().push(hook);
    }
}

pub(crate) struct MockConnect {
    name: String,
    kind: OperationKind,
    pv_request: Value,
    outcome: Mutex<Outcome>,
    get_handler: Mutex<Option<ExecHandler>>,
    put_handler: Mutex<Option<PutHandler>>,
    close_hooks: Mutex<Vec<CloseHook>>,
}

impl MockConnect {
    fn new(name: &str, kind: OperationKind, pv_request: Value) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            kind,
            pv_request,
            outcome: Mutex::new(Outcome::Pending),
            get_handler: Mutex::new(None),
            put_handler: Mutex::new(None),
            close_hooks: Mutex::new(Vec::new()),
        })
    }

    /// `Reply(Some(prototype))` once connected.
    pub(crate) fn outcome(&self) -> Outcome {
        self.outcome.lock().unwrap().clone()
    }

    pub(crate) fn is_connected(&self) -> bool {
        matches!(self.outcome(), Outcome::Reply(_))
    }

    pub(crate) fn exec_get(&self) -> Arc<MockExec> {
        let exec = MockExec::new(&self.name);
        let handler = self.get_handler.lock().unwrap();
        let handle: Arc<dyn ExecOp> = exec.clone();
        (handler.as_ref().expect("get handler registered"))(handle);
        exec
    }

    pub(crate) fn exec_put(&self, value: Value) -> Arc<MockExec> {
        let exec = MockExec::new(&self.name);
        let handler = self.put_handler.lock().unwrap();
        let handle: Arc<dyn ExecOp> = exec.clone();
        (handler.as_ref().expect("put handler registered"))(handle, value);
        exec
    }

    pub(crate) fn close(&self) {
        let hooks = std::mem::take(&mut *self.close_hooks.lock().unwrap());
        for hook in hooks {
            hook();
        }
        self.get_handler.lock().unwrap().take();
        self.put_handler.lock().unwrap().take();
    }
}

impl ConnectOp for MockConnect {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> OperationKind {
        self.kind
    }

    fn pv_request(&self) -> Value {
        self.pv_request.clone()
    }

    fn connect(&self, prototype: &Value) {
        *self.outcome.lock().unwrap() = Outcome::Reply(Some(prototype.clone()));
    }

    fn error(&self, message: &str) {
        *self.outcome.lock().unwrap() = Outcome::Error(message.to_string());
    }

    fn on_get(&self, handler: ExecHandler) {
        *self.get_handler.lock().unwrap() = Some(handler);
    }

    fn on_put(&self, handler: PutHandler) {
        *self.put_handler.lock().unwrap() = Some(handler);
    }

    fn on_close(&self, hook: CloseHook) {
        self.close_hooks.lock().unwrap().push(hook);
    }
}

/// A running downstream monitor recording what it was sent.
#[derive(Default)]
pub(crate) struct MockMonitor {
    posts: Mutex<Vec<Value>>,
    finished: AtomicBool,
    closed: AtomicBool,
}

impl MockMonitor {
    pub(crate) fn posts(&self) -> Vec<Value> {
        self.posts.lock().unwrap().clone()
    }

    pub(crate) fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl MonitorControlOp for MockMonitor {
    fn post(&self, value: &Value) {
        self.posts.lock().unwrap().push(value.clone());
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockSetup {
    name: String,
    pv_request: Value,
    monitor: Arc<MockMonitor>,
    prototype: Mutex<Option<Value>>,
    error: Mutex<Option<String>>,
    close_hooks: Mutex<Vec<CloseHook>>,
}

impl MockSetup {
    fn new(name: &str, pv_request: Value) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            pv_request,
            monitor: Arc::new(MockMonitor::default()),
            prototype: Mutex::new(None),
            error: Mutex::new(None),
            close_hooks: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn monitor(&self) -> &Arc<MockMonitor> {
        &self.monitor
    }

    pub(crate) fn prototype(&self) -> Option<Value> {
        self.prototype.lock().unwrap().clone()
    }

    pub(crate) fn error_message(&self) -> Option<String> {
        self.error.lock().unwrap().clone()
    }

    /// Unsubscribes: the monitor stops accepting posts and close hooks run.
    pub(crate) fn close(&self) {
        self.monitor.closed.store(true, Ordering::SeqCst);
        let hooks = std::mem::take(&mut *self.close_hooks.lock().unwrap());
        for hook in hooks {
            hook();
        }
    }
}

impl MonitorSetupOp for MockSetup {
    fn name(&self) -> &str {
        &self.name
    }

    fn pv_request(&self) -> Value {
        self.pv_request.clone()
    }

    fn connect(&self, prototype: &Value) -> Arc<dyn MonitorControlOp> {
        *self.prototype.lock().unwrap() = Some(prototype.clone());
        self.monitor.clone()
    }

    fn error(&self, message: &str) {
        *self.error.lock().unwrap() = Some(message.to_string());
    }

    fn on_close(&self, hook: CloseHook) {
        self.close_hooks.lock().unwrap().push(hook);
    }
}

pub(crate) async fn with_timeout<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("timed out")
}
