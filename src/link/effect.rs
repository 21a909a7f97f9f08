//! START → service call → END/ERR, one task per link.

use std::future;

use serde_json::Value;

use crate::action::{Action, ActionChannel, ActionReceiver, AsyncTypeTriple};
use crate::link::config::{ServiceFn, ServiceFuture, ValidLink};

/// Effect driving one link's service.
///
/// At most one call is in flight. A new START drops the pending future, so
/// only the latest call can produce an END or ERR.
pub struct LinkEffect {
    key: String,
    triple: AsyncTypeTriple,
    service: ServiceFn,
    actions: ActionReceiver,
    channel: ActionChannel,
}

impl LinkEffect {
    /// `actions` must be subscribed before any START this effect should see
    /// is dispatched.
    pub fn new(link: &ValidLink, actions: ActionReceiver, channel: ActionChannel) -> Self {
        Self {
            key: link.slice.key.clone(),
            triple: link.slice.triple.clone(),
            service: link.service.clone(),
            actions,
            channel,
        }
    }

    pub async fn run(mut self) {
        let mut in_flight: Option<ServiceFuture> = None;

        loop {
            tokio::select! {
                // Actions first: a START already queued must replace the
                // pending call before its outcome is looked at.
                biased;

                received = self.actions.recv() => {
                    let Some(action) = received else { break };
                    if action.kind != self.triple.start {
                        continue;
                    }
                    if in_flight.is_some() {
                        tracing::debug!(link = %self.key, "Pending service call superseded");
                    }
                    in_flight = Some((self.service)(action.payload));
                }

                outcome = pending_outcome(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    self.finish(outcome);
                }
            }
        }

        tracing::debug!(link = %self.key, "Link effect stopped");
    }

    fn finish(&self, outcome: Result<Value, Value>) {
        match outcome {
            Ok(data) => {
                self.channel
                    .dispatch(Action::with_payload(self.triple.end.clone(), data));
            }
            Err(err) => {
                tracing::debug!(link = %self.key, error = %err, "Service call failed");
                self.channel
                    .dispatch(Action::with_payload(self.triple.err.clone(), err));
            }
        }
    }
}

async fn pending_outcome(slot: &mut Option<ServiceFuture>) -> Result<Value, Value> {
    match slot {
        Some(call) => call.await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::link::config::LinkServiceConfig;
    use crate::state::{AsyncState, StoreState};
    use serde_json::json;
    use std::time::Duration;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct State {
        load: AsyncState,
    }

    impl StoreState for State {
        fn async_slice(&self, key: &str) -> Option<&AsyncState> {
            (key == "load").then_some(&self.load)
        }

        fn async_slice_mut(&mut self, key: &str) -> Option<&mut AsyncState> {
            (key == "load").then_some(&mut self.load)
        }
    }

    fn wire(config: LinkServiceConfig) -> ValidLink {
        config
            .validate(&State::default(), &StoreConfig::resolve(None).link_service, &[])
            .unwrap()
    }

    #[tokio::test]
    async fn success_dispatches_end_with_raw_value() {
        let triple = AsyncTypeTriple::new("load");
        let link = wire(LinkServiceConfig::new("load", &triple, |p: Value| async move {
            Ok::<_, Value>(json!({ "echo": p }))
        }));
        let channel = ActionChannel::default();
        let mut observer = channel.subscribe();
        let task = tokio::spawn(LinkEffect::new(&link, channel.subscribe(), channel.clone()).run());

        channel.dispatch(Action::with_payload(triple.start.clone(), json!(5)));

        assert!(observer.recv().await.unwrap().is(&triple.start));
        let end = observer.recv().await.unwrap();
        assert!(end.is(&triple.end));
        assert_eq!(end.payload, json!({"echo": 5}));
        task.abort();
    }

    #[tokio::test]
    async fn failure_dispatches_err_and_keeps_listening() {
        let triple = AsyncTypeTriple::new("load");
        let link = wire(LinkServiceConfig::new("load", &triple, |p: Value| async move {
            if p == json!("bad") {
                Err(json!("nope"))
            } else {
                Ok(p)
            }
        }));
        let channel = ActionChannel::default();
        let mut observer = channel.subscribe();
        let task = tokio::spawn(LinkEffect::new(&link, channel.subscribe(), channel.clone()).run());

        channel.dispatch(Action::with_payload(triple.start.clone(), json!("bad")));
        observer.recv().await.unwrap();
        let err = observer.recv().await.unwrap();
        assert!(err.is(&triple.err));
        assert_eq!(err.payload, json!("nope"));

        channel.dispatch(Action::with_payload(triple.start.clone(), json!("good")));
        observer.recv().await.unwrap();
        let end = observer.recv().await.unwrap();
        assert!(end.is(&triple.end));
        assert_eq!(end.payload, json!("good"));
        task.abort();
    }

    #[tokio::test]
    async fn newer_start_supersedes_pending_call() {
        let triple = AsyncTypeTriple::new("load");
        let link = wire(LinkServiceConfig::new("load", &triple, |p: Value| async move {
            let delay = p["delay_ms"].as_u64().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<_, Value>(p["call"].clone())
        }));
        let channel = ActionChannel::default();
        let mut observer = channel.subscribe();
        let task = tokio::spawn(LinkEffect::new(&link, channel.subscribe(), channel.clone()).run());

        channel.dispatch(Action::with_payload(
            triple.start.clone(),
            json!({"call": 1, "delay_ms": 80}),
        ));
        channel.dispatch(Action::with_payload(
            triple.start.clone(),
            json!({"call": 2, "delay_ms": 0}),
        ));

        let mut ends = Vec::new();
        let _ = tokio::time::timeout(Duration::from_millis(250), async {
            while let Some(action) = observer.recv().await {
                if action.is(&triple.end) {
                    ends.push(action.payload);
                }
            }
        })
        .await;

        assert_eq!(ends, vec![json!(2)]);
        task.abort();
    }
}
