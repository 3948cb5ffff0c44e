use crate::event::{EventSink, InputEvent};
use tracing::debug;

/// A simple sink that logs all events at `debug` level.
#[derive(Debug, Default)]
pub struct LoggingSink;

impl LoggingSink {
    pub fn new() -> Self {
        LoggingSink
    }
}

impl EventSink for LoggingSink {
    fn on_event(&mut self, event: InputEvent) {
        debug!(target: "dsinput::events", ?event, "input");
    }
}
