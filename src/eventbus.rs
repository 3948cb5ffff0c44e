use crate::event::{EventSink, InputEvent};
use std::collections::BTreeMap;

/// Determines which kinds of events a listener wants to receive.
#[derive(Debug, Clone, Copy)]
pub enum EventFilter {
    All,
    AnalogOnly,
    ButtonsOnly,
    DevicesOnly,
    Custom(fn(&InputEvent) -> bool),
}

impl EventFilter {
    fn accepts(&self, event: &InputEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::AnalogOnly => event.is_analog(),
            EventFilter::ButtonsOnly => event.is_button(),
            EventFilter::DevicesOnly => event.is_device(),
            EventFilter::Custom(f) => f(event),
        }
    }
}

/// Metadata-wrapped listener with filters and control flags.
struct ListenerEntry {
    listener: Box<dyn EventSink + Send>,
    enabled: bool,
    filter: EventFilter,
    slot: Option<usize>, // only events from this slot; pointer motion always passes
}

/// Fan-out sink: forwards each event to every enabled, matching listener.
///
/// Listeners are visited in registration order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: BTreeMap<u64, ListenerEntry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener with a filter and an optional slot tag.
    pub fn add_listener(
        &mut self,
        listener: impl EventSink + Send + 'static,
        filter: EventFilter,
        slot: Option<usize>,
    ) -> u64 {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
                slot,
            },
        );
        self.next_id += 1;
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Disables (mutes) a listener without removing it.
    pub fn disable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    /// Unregisters a listener entirely.
    pub fn remove_listener(&mut self, id: u64) {
        self.listeners.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl EventSink for EventBus {
    fn on_event(&mut self, event: InputEvent) {
        for entry in self.listeners.values_mut() {
            if !entry.enabled {
                continue;
            }

            // If tagged, ensure this listener wants this event's slot
            if let (Some(wanted), Some(slot)) = (entry.slot, event.slot()) {
                if wanted != slot {
                    continue;
                }
            }

            if entry.filter.accepts(&event) {
                entry.listener.on_event(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::{AxisId, ButtonId};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<InputEvent>>>);

    impl EventSink for Shared {
        fn on_event(&mut self, event: InputEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn press(slot: usize) -> InputEvent {
        InputEvent::ButtonPressed {
            button: ButtonId::FaceButtonBottom,
            slot,
            repeat: false,
        }
    }

    fn analog(slot: usize) -> InputEvent {
        InputEvent::Analog {
            axis: AxisId::LeftStickX,
            slot,
            value: 1.0,
        }
    }

    #[test]
    fn filters_route_events_by_kind() {
        let analog_seen = Shared::default();
        let buttons_seen = Shared::default();
        let mut bus = EventBus::new();
        bus.add_listener(analog_seen.clone(), EventFilter::AnalogOnly, None);
        bus.add_listener(buttons_seen.clone(), EventFilter::ButtonsOnly, None);

        bus.on_event(analog(0));
        bus.on_event(press(0));
        bus.on_event(InputEvent::DeviceConnected { slot: 0 });

        assert_eq!(*analog_seen.0.lock().unwrap(), vec![analog(0)]);
        assert_eq!(*buttons_seen.0.lock().unwrap(), vec![press(0)]);
    }

    #[test]
    fn slot_tag_limits_delivery_but_passes_pointer_motion() {
        let seen = Shared::default();
        let mut bus = EventBus::new();
        bus.add_listener(seen.clone(), EventFilter::All, Some(1));

        bus.on_event(press(0));
        bus.on_event(press(1));
        bus.pointer_moved(2, 2);

        assert_eq!(
            *seen.0.lock().unwrap(),
            vec![press(1), InputEvent::PointerMoved { dx: 2, dy: 2 }]
        );
    }

    #[test]
    fn disabled_and_removed_listeners_are_skipped() {
        let seen = Shared::default();
        let mut bus = EventBus::new();
        let id = bus.add_listener(seen.clone(), EventFilter::All, None);

        bus.disable(id);
        bus.on_event(press(0));
        assert!(seen.0.lock().unwrap().is_empty());

        bus.enable(id);
        bus.on_event(press(0));
        assert_eq!(seen.0.lock().unwrap().len(), 1);

        bus.remove_listener(id);
        bus.on_event(press(0));
        assert_eq!(seen.0.lock().unwrap().len(), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn bus_can_move_to_another_thread() {
        let seen = Shared::default();
        let mut bus = EventBus::new();
        bus.add_listener(seen.clone(), EventFilter::All, None);

        std::thread::spawn(move || bus.on_event(press(0)))
            .join()
            .unwrap();

        assert_eq!(*seen.0.lock().unwrap(), vec![press(0)]);
    }

    #[test]
    fn custom_filter_is_applied() {
        fn only_repeats(event: &InputEvent) -> bool {
            matches!(event, InputEvent::ButtonPressed { repeat: true, .. })
        }

        let seen = Shared::default();
        let mut bus = EventBus::new();
        bus.add_listener(seen.clone(), EventFilter::Custom(only_repeats), None);

        bus.button_pressed(ButtonId::Mute, 0, false);
        bus.button_pressed(ButtonId::Mute, 0, true);

        assert_eq!(seen.0.lock().unwrap().len(), 1);
    }
}
