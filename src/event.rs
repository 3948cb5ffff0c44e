//! Events and the sink they are delivered to.
//!
//! The engine reports every discrete change as one [`InputEvent`], delivered
//! immediately (never batched) to an [`EventSink`].
//!
//! ## Value conventions
//! - **Sticks:** normalized to `[-1.0, 1.0]` with asymmetric scaling so both
//!   endpoints are reachable from the signed 8-bit range.
//! - **Triggers:** normalized to `[0.0, 1.0]`.
//! - **Gyroscope:** raw components scaled by [`GYRO_SCALE`](crate::constants::GYRO_SCALE).
//! - **Touch axes:** raw positional deltas, **not** normalized.
//! - **Buttons:** press/release edges; held buttons emit repeat presses.

use crate::buttons::{AxisId, ButtonId};

/// One discrete change reported by the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// An analog channel changed (or is held outside its dead zone).
    Analog { axis: AxisId, slot: usize, value: f32 },

    /// A button went down, or is being held long enough to repeat.
    ButtonPressed {
        button: ButtonId,
        slot: usize,
        repeat: bool,
    },

    /// A button went up.
    ButtonReleased { button: ButtonId, slot: usize },

    /// Relative pointer motion derived from the first touch point.
    PointerMoved { dx: i32, dy: i32 },

    /// A device now occupies `slot`.
    DeviceConnected { slot: usize },

    /// The device in `slot` is gone.
    DeviceDisconnected { slot: usize },
}

impl InputEvent {
    /// Slot the event originates from. Pointer motion is device-agnostic.
    pub fn slot(&self) -> Option<usize> {
        match *self {
            InputEvent::Analog { slot, .. }
            | InputEvent::ButtonPressed { slot, .. }
            | InputEvent::ButtonReleased { slot, .. }
            | InputEvent::DeviceConnected { slot }
            | InputEvent::DeviceDisconnected { slot } => Some(slot),
            InputEvent::PointerMoved { .. } => None,
        }
    }

    pub fn is_analog(&self) -> bool {
        matches!(self, InputEvent::Analog { .. })
    }

    pub fn is_button(&self) -> bool {
        matches!(
            self,
            InputEvent::ButtonPressed { .. } | InputEvent::ButtonReleased { .. }
        )
    }

    pub fn is_device(&self) -> bool {
        matches!(
            self,
            InputEvent::DeviceConnected { .. } | InputEvent::DeviceDisconnected { .. }
        )
    }
}

/// Receiver for engine output.
///
/// Implementors only need [`on_event`](EventSink::on_event); the named
/// methods are what the engine calls and forward to it by default.
pub trait EventSink {
    fn on_event(&mut self, event: InputEvent);

    /// Whether the sink can currently accept input events.
    ///
    /// When this returns `false`, disconnect cleanup skips the release events
    /// but still releases the device and reports the disconnection.
    fn is_available(&self) -> bool {
        true
    }

    fn analog_changed(&mut self, axis: AxisId, slot: usize, value: f32) {
        self.on_event(InputEvent::Analog { axis, slot, value });
    }

    fn button_pressed(&mut self, button: ButtonId, slot: usize, repeat: bool) {
        self.on_event(InputEvent::ButtonPressed {
            button,
            slot,
            repeat,
        });
    }

    fn button_released(&mut self, button: ButtonId, slot: usize) {
        self.on_event(InputEvent::ButtonReleased { button, slot });
    }

    fn pointer_moved(&mut self, dx: i32, dy: i32) {
        self.on_event(InputEvent::PointerMoved { dx, dy });
    }

    fn device_connected(&mut self, slot: usize) {
        self.on_event(InputEvent::DeviceConnected { slot });
    }

    fn device_disconnected(&mut self, slot: usize) {
        self.on_event(InputEvent::DeviceDisconnected { slot });
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn on_event(&mut self, event: InputEvent) {
        (**self).on_event(event);
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Sink that records events in arrival order.
///
/// Useful when ticks run on one thread and events are consumed on another:
/// the tick thread owns the buffer and hands out the drained events.
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Vec<InputEvent>,
    unavailable: bool,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all recorded events, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Simulate a host whose input layer is not ready.
    pub fn set_available(&mut self, available: bool) {
        self.unavailable = !available;
    }
}

impl EventSink for EventBuffer {
    fn on_event(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    fn is_available(&self) -> bool {
        !self.unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_calls_forward_to_on_event() {
        let mut buffer = EventBuffer::new();
        buffer.analog_changed(AxisId::LeftTrigger, 1, 0.5);
        buffer.button_pressed(ButtonId::Logo, 2, true);
        buffer.button_released(ButtonId::Logo, 2);
        buffer.pointer_moved(3, -4);
        buffer.device_connected(0);
        buffer.device_disconnected(0);

        assert_eq!(
            buffer.drain(),
            vec![
                InputEvent::Analog {
                    axis: AxisId::LeftTrigger,
                    slot: 1,
                    value: 0.5
                },
                InputEvent::ButtonPressed {
                    button: ButtonId::Logo,
                    slot: 2,
                    repeat: true
                },
                InputEvent::ButtonReleased {
                    button: ButtonId::Logo,
                    slot: 2
                },
                InputEvent::PointerMoved { dx: 3, dy: -4 },
                InputEvent::DeviceConnected { slot: 0 },
                InputEvent::DeviceDisconnected { slot: 0 },
            ]
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn pointer_motion_has_no_slot() {
        assert_eq!(InputEvent::PointerMoved { dx: 1, dy: 1 }.slot(), None);
        assert_eq!(InputEvent::DeviceConnected { slot: 3 }.slot(), Some(3));
    }

    #[test]
    fn boxed_sink_forwards_availability() {
        let mut inner = EventBuffer::new();
        inner.set_available(false);
        let boxed: Box<dyn EventSink> = Box::new(inner);
        assert!(!boxed.is_available());
    }
}
