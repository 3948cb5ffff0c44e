use crate::event::{EventSink, InputEvent};

/// Wraps a sink and filters events based on a user-supplied predicate.
pub struct FilteredSink {
    predicate: Box<dyn Fn(&InputEvent) -> bool + Send + Sync>,
    inner: Box<dyn EventSink + Send>,
}

impl FilteredSink {
    pub fn new(
        predicate: impl Fn(&InputEvent) -> bool + Send + Sync + 'static,
        inner: impl EventSink + Send + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner: Box::new(inner),
        }
    }
}

impl EventSink for FilteredSink {
    fn on_event(&mut self, event: InputEvent) {
        if (self.predicate)(&event) {
            self.inner.on_event(event);
        }
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
