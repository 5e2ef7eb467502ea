//! Fan-out of one upstream monitor to many downstream subscribers.
//!
//! A multiplexer moves Connecting -> Running on type negotiation, or
//! Connecting -> Error when the upstream rejects the monitor. Subscribers arriving
//! while connecting are queued and connected in arrival order. Late subscribers
//! of a running multiplexer receive the accumulated snapshot before any newer
//! update. A failed or finished multiplexer is never joined again. Uncached
//! subscribers join a live multiplexer like any other, but a multiplexer they
//! start is not published for reuse.

use crate::data_plane::{DownstreamChannel, UpstreamConnection};
use crate::error::GatewayError;
use crate::observability::events;
use crate::protocol::{
    MonitorControlOp, MonitorPopError, MonitorSetupOp, UpstreamClient, UpstreamError,
    UpstreamSubscription,
};
use crate::runtime::locking::lock;
use crate::runtime::task_guard::TaskGuard;
use crate::value::{assign_delta, cache_participation, Value};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use tracing::{debug, warn};

const COMPONENT: &str = "subscription_multiplexer";

/// Observable lifecycle state of a multiplexer.
#[cfg(test)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MultiplexerState {
    Connecting,
    Running,
    Error,
}

enum Phase {
    Connecting(Vec<Arc<dyn MonitorSetupOp>>),
    Running { prototype: Value },
    Error,
}

struct MultiplexerInner {
    phase: Phase,
    current: Option<Value>,
    controls: Vec<Arc<dyn MonitorControlOp>>,
}

pub(crate) struct SubscriptionMultiplexer {
    name: String,
    inner: Mutex<MultiplexerInner>,
    pump: OnceLock<TaskGuard>,
}

impl DownstreamChannel {
    /// Serves a downstream MONITOR request through the shared upstream subscription.
    pub(crate) fn on_subscribe(&self, setup: Arc<dyn MonitorSetupOp>) {
        let cached = cache_participation(&setup.pv_request());
        if !cached && !self.permissions().allow_uncached() {
            debug!(
                event = events::MONITOR_UNCACHED_DENIED,
                component = COMPONENT,
                channel = self.name(),
                "uncached monitor denied"
            );
            setup.error(&GatewayError::UncachedMonitorDenied.to_string());
            return;
        }

        let multiplexer = SubscriptionMultiplexer::attach(self.upstream(), setup.clone(), cached);
        setup.on_close(Box::new(move || drop(multiplexer)));
    }
}

impl SubscriptionMultiplexer {
    /// Joins the live multiplexer of `upstream` when one is usable, otherwise
    /// starts a new upstream subscription. A new multiplexer is published for
    /// reuse only when `cached`.
    fn attach(
        upstream: &Arc<UpstreamConnection>,
        setup: Arc<dyn MonitorSetupOp>,
        cached: bool,
    ) -> Arc<Self> {
        let mut shared = upstream.shared_operations();

        if let Some(existing) = shared.subscription.upgrade() {
            if existing.join(&setup) {
                return existing;
            }
        }

        debug!(
            event = events::MONITOR_NEW,
            component = COMPONENT,
            upstream = upstream.name(),
            cached,
            "starting upstream monitor"
        );
        let multiplexer = Arc::new(Self {
            name: upstream.name().to_string(),
            inner: Mutex::new(MultiplexerInner {
                phase: Phase::Connecting(vec![setup.clone()]),
                current: None,
                controls: Vec::new(),
            }),
            pump: OnceLock::new(),
        });
        let guard = upstream.spawn(pump(
            upstream.client(),
            upstream.name().to_string(),
            Arc::downgrade(&multiplexer),
            Arc::downgrade(upstream),
        ));
        let _ = multiplexer.pump.set(guard);

        if cached {
            shared.subscription = Arc::downgrade(&multiplexer);
        }
        multiplexer
    }

    #[cfg(test)]
    fn state(&self) -> MultiplexerState {
        match lock(&self.inner).phase {
            Phase::Connecting(_) => MultiplexerState::Connecting,
            Phase::Running { .. } => MultiplexerState::Running,
            Phase::Error => MultiplexerState::Error,
        }
    }

    fn join(&self, setup: &Arc<dyn MonitorSetupOp>) -> bool {
        let mut inner = lock(&self.inner);
        let MultiplexerInner {
            phase,
            current,
            controls,
        } = &mut *inner;

        match phase {
            Phase::Connecting(setups) => {
                debug!(
                    event = events::MONITOR_JOIN_CONNECTING,
                    component = COMPONENT,
                    upstream = self.name.as_str(),
                    "queued on connecting monitor"
                );
                setups.push(setup.clone());
                true
            }
            Phase::Running { prototype } => {
                debug!(
                    event = events::MONITOR_JOIN_RUNNING,
                    component = COMPONENT,
                    upstream = self.name.as_str(),
                    "joined running monitor"
                );
                let control = setup.connect(prototype);
                if let Some(snapshot) = current {
                    control.post(snapshot);
                }
                controls.push(control);
                true
            }
            Phase::Error => false,
        }
    }

    fn start_running(&self, prototype: Value) {
        let mut inner = lock(&self.inner);
        let setups = match std::mem::replace(
            &mut inner.phase,
            Phase::Running {
                prototype: prototype.clone(),
            },
        ) {
            Phase::Connecting(setups) => setups,
            _ => Vec::new(),
        };

        for setup in setups {
            let control = setup.connect(&prototype);
            inner.controls.push(control);
        }
    }

    fn fail(&self, error: UpstreamError) {
        let setups = match std::mem::replace(&mut lock(&self.inner).phase, Phase::Error) {
            Phase::Connecting(setups) => setups,
            _ => Vec::new(),
        };

        let message = GatewayError::from(error).to_string();
        for setup in setups {
            setup.error(&message);
        }
    }

    fn deliver(&self, update: &Value) {
        let mut inner = lock(&self.inner);
        let MultiplexerInner {
            current, controls, ..
        } = &mut *inner;

        match current {
            Some(snapshot) => assign_delta(snapshot, update),
            None => *current = Some(update.clone()),
        }

        controls.retain(|control| control.is_open());
        for control in controls.iter() {
            control.post(update);
        }
    }

    /// Ends the stream for every subscriber. The multiplexer refuses joins
    /// afterwards.
    fn finish(&self) {
        let controls = {
            let mut inner = lock(&self.inner);
            inner.phase = Phase::Error;
            std::mem::take(&mut inner.controls)
        };
        for control in controls {
            control.finish();
        }
    }
}

async fn pump(
    client: Arc<dyn UpstreamClient>,
    name: String,
    multiplexer: Weak<SubscriptionMultiplexer>,
    upstream: Weak<UpstreamConnection>,
) {
    let negotiated = client.monitor(&name).await;
    let Some(live) = multiplexer.upgrade() else {
        return;
    };

    let mut subscription: Box<dyn UpstreamSubscription> = match negotiated {
        Ok((prototype, subscription)) => {
            debug!(
                event = events::MONITOR_TYPED,
                component = COMPONENT,
                upstream = name.as_str(),
                "upstream monitor typed"
            );
            live.start_running(prototype);
            subscription
        }
        Err(error) => {
            warn!(
                event = events::MONITOR_SETUP_FAILED,
                component = COMPONENT,
                upstream = name.as_str(),
                err = %error,
                "upstream monitor setup failed"
            );
            match upstream.upgrade() {
                Some(upstream) => {
                    let mut shared = upstream.shared_operations();
                    shared.forget_subscription(&live);
                    live.fail(error);
                }
                None => live.fail(error),
            }
            return;
        }
    };
    drop(live);

    while subscription.wakeup().await {
        let Some(live) = multiplexer.upgrade() else {
            return;
        };

        loop {
            match subscription.pop() {
                Ok(Some(update)) => {
                    debug!(
                        event = events::MONITOR_EVENT,
                        component = COMPONENT,
                        upstream = name.as_str(),
                        "monitor update"
                    );
                    live.deliver(&update);
                }
                Ok(None) => break,
                Err(MonitorPopError::Finished) => {
                    end_of_stream(&name, &live, &upstream);
                    return;
                }
                Err(MonitorPopError::Failed(error)) => {
                    warn!(
                        event = events::MONITOR_EVENT_FAILED,
                        component = COMPONENT,
                        upstream = name.as_str(),
                        err = %error,
                        "monitor update failed"
                    );
                }
            }
        }
    }

    // The subscription can not produce anything more.
    if let Some(live) = multiplexer.upgrade() {
        end_of_stream(&name, &live, &upstream);
    }
}

fn end_of_stream(
    name: &str,
    live: &Arc<SubscriptionMultiplexer>,
    upstream: &Weak<UpstreamConnection>,
) {
    debug!(
        event = events::MONITOR_FINISH,
        component = COMPONENT,
        upstream = name,
        "upstream monitor finished"
    );
    if let Some(upstream) = upstream.upgrade() {
        upstream.shared_operations().forget_subscription(live);
    }
    live.finish();
}
