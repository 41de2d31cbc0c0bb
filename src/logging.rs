//! Injected log sink.
//!
//! Editing components never install a global subscriber. Each owner holds a
//! [`LogSink`] that scopes its `tracing` events to an injected
//! [`tracing::Dispatch`]. The default sink discards everything.

use tracing::Dispatch;

#[derive(Clone)]
pub struct LogSink {
    dispatch: Dispatch,
}

impl LogSink {
    /// Route events to `dispatch`.
    pub const fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// A sink that drops every event.
    pub fn discard() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Run `f` with this sink as the current dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::discard()
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Captured {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            self.0
                .lock()
                .unwrap()
                .push(event.metadata().target().to_string());
        }
    }

    #[test]
    fn test_injected_sink_receives_events() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(captured.clone());
        let sink = LogSink::new(Dispatch::new(subscriber));
        sink.in_scope(|| tracing::info!("hello"));
        assert_eq!(captured.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_discard_sink_runs_closure() {
        let sink = LogSink::default();
        assert_eq!(sink.in_scope(|| 7), 7);
    }
}
