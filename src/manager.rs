//! Slot-based device manager and poll cycle.
//!
//! [`DeviceManager`] owns the transport, the event sink and a fixed array of
//! [`MAX_DEVICES`] slots. A host calls [`tick`](DeviceManager::tick) once per
//! frame; everything happens synchronously on the calling thread:
//!
//! 1. [`refresh`](DeviceManager::refresh) reconciles a fresh enumeration
//!    against the slots and connects newly seen devices.
//! 2. [`send_controller_events`](DeviceManager::send_controller_events) reads
//!    every connected slot, emits the resulting events and flushes pending
//!    output when it is dirty.
//!
//! A failing read or write disconnects only the affected slot. Before a slot
//! lets go of its handle, every input that was active is released on the sink.
//!
//! Output requests (`set_channel_value`, `set_device_property`, ...) may come
//! at any time between ticks; they are coalesced and written at most once per
//! slot per tick.
//!
//! # Example
//! ```
//! use dsinput::backends::virtual_input::VirtualTransport;
//! use dsinput::{DeviceManager, EventBuffer, InputEvent, Settings};
//!
//! let mut transport = VirtualTransport::new();
//! transport.plug(7);
//!
//! let manager = DeviceManager::new(transport, EventBuffer::new(), Settings::default());
//! assert!(manager.is_gamepad_attached());
//! assert_eq!(manager.sink().events(), &[InputEvent::DeviceConnected { slot: 0 }]);
//! ```

use crate::clock::{Clock, MonotonicClock};
use crate::config::Settings;
use crate::constants::MAX_DEVICES;
use crate::diff::{release_active, InputDiffer};
use crate::error::TransportError;
use crate::event::EventSink;
use crate::output::{
    apply_channel_value, apply_channel_values, apply_property, DeviceProperty,
    ForceFeedbackChannel, ForceFeedbackValues, PropertyOutcome,
};
use crate::registry::{plan, AssignmentKind, SlotView};
use crate::slot::Slot;
use crate::snapshot::{SlotSnapshot, Snapshot};
use crate::transport::{DeviceDescriptor, Transport};
use tracing::{debug, info, trace, warn};

/// Owns every slot and drives the per-frame poll cycle.
pub struct DeviceManager<T: Transport, S: EventSink> {
    transport: T,
    sink: S,
    settings: Settings,
    differ: InputDiffer,
    clock: Box<dyn Clock + Send>,
    slots: [Slot<T::Handle>; MAX_DEVICES],
    enumeration: Vec<DeviceDescriptor>,
}

impl<T: Transport, S: EventSink> DeviceManager<T, S> {
    /// Build a manager on the wall clock and run an initial refresh.
    pub fn new(transport: T, sink: S, settings: Settings) -> Self {
        Self::with_clock(transport, sink, settings, MonotonicClock::new())
    }

    /// Build a manager on a caller-supplied clock and run an initial refresh.
    pub fn with_clock(
        transport: T,
        sink: S,
        settings: Settings,
        clock: impl Clock + Send + 'static,
    ) -> Self {
        let mut manager = Self {
            transport,
            sink,
            differ: InputDiffer::new(&settings),
            settings,
            clock: Box::new(clock),
            slots: std::array::from_fn(|_| Slot::default()),
            enumeration: Vec::with_capacity(MAX_DEVICES),
        };
        manager.refresh();
        manager
    }

    /// One frame: reconcile devices, then poll and flush every connected slot.
    pub fn tick(&mut self) {
        self.refresh();
        self.send_controller_events();
    }

    /// Reconcile the slot array against a fresh enumeration.
    ///
    /// Enumeration failures abort this refresh without touching any slot; the
    /// next call simply tries again.
    pub fn refresh(&mut self) {
        let mut discovered = std::mem::take(&mut self.enumeration);
        discovered.clear();

        match self.transport.enumerate(&mut discovered, MAX_DEVICES) {
            Ok(()) => {}
            Err(TransportError::InsufficientBuffer) => {
                debug!(
                    capacity = MAX_DEVICES,
                    "more devices present than slots; enumeration truncated"
                );
            }
            Err(err) => {
                warn!(error = %err, "failed to enumerate devices");
                self.enumeration = discovered;
                return;
            }
        }
        discovered.truncate(MAX_DEVICES);

        let views: Vec<SlotView> = self
            .slots
            .iter()
            .map(|s| SlotView {
                connected: s.is_connected(),
                last_unique_id: s.last_unique_id(),
                ever_used: s.ever_used(),
            })
            .collect();
        let ids: Vec<u32> = discovered.iter().map(|d| d.unique_id).collect();

        for assignment in plan(&views, &ids) {
            let descriptor = discovered[assignment.device].clone();
            if assignment.kind == AssignmentKind::Reacquire {
                debug!(slot = assignment.slot, id = descriptor.unique_id, "device returned");
            }
            self.connect_slot(assignment.slot, descriptor);
        }

        self.enumeration = discovered;
    }

    fn connect_slot(&mut self, index: usize, descriptor: DeviceDescriptor) {
        info!(
            path = %descriptor.path,
            connection = %descriptor.connection,
            "new device found"
        );

        match self.transport.connect(&descriptor) {
            Ok(handle) => {
                info!(slot = index, path = %descriptor.path, "device connected");
                self.slots[index].attach(handle, descriptor);
                self.sink.device_connected(index);
            }
            Err(err) => {
                warn!(
                    error = %err,
                    path = %descriptor.path,
                    "failed to initialize device context"
                );
                self.slots[index].clear_transient();
            }
        }
    }

    /// Read, diff and flush every connected slot.
    pub fn send_controller_events(&mut self) {
        let now = self.clock.now();
        for index in 0..MAX_DEVICES {
            if self.slots[index].is_connected() {
                self.poll_slot(index, now);
            }
        }
    }

    fn poll_slot(&mut self, index: usize, now: f64) {
        let slot = &mut self.slots[index];
        let Some(handle) = slot.connection.as_mut() else {
            return;
        };

        let input = match self.transport.read_input(handle) {
            Ok(input) => input,
            Err(err) => {
                warn!(slot = index, error = %err, "failed to read device input state");
                self.disconnect_slot(index);
                return;
            }
        };
        slot.previous_input = slot.current_input;
        slot.current_input = input;
        trace!(slot = index, ?input, "input");

        self.differ.process(
            index,
            &slot.previous_input,
            &slot.current_input,
            &mut slot.extra.repeat,
            now,
            &mut self.sink,
        );

        if !slot.extra.dirty {
            return;
        }
        let Some(handle) = slot.connection.as_mut() else {
            return;
        };
        match self.transport.write_output(handle, &slot.pending_output) {
            Ok(()) => slot.extra.dirty = false,
            Err(err) => {
                warn!(slot = index, error = %err, "failed to write device output state");
                self.disconnect_slot(index);
            }
        }
    }

    /// Release active inputs, give the handle back and report the disconnect.
    fn disconnect_slot(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        if !slot.is_connected() {
            return;
        }
        let path = slot
            .descriptor
            .as_ref()
            .map(|d| d.path.clone())
            .unwrap_or_default();
        info!(slot = index, path = %path, "device disconnected");

        if self.sink.is_available() {
            release_active(index, &slot.current_input, &mut self.sink);
        } else {
            debug!(slot = index, "event sink unavailable; skipping input release");
        }

        if let Some(handle) = slot.detach() {
            self.transport.disconnect(handle);
        }
        self.sink.device_disconnected(index);
    }

    /// Disconnect every slot. Also runs on drop.
    pub fn shutdown(&mut self) {
        for index in 0..MAX_DEVICES {
            self.disconnect_slot(index);
        }
    }

    fn connected_slot_mut(&mut self, index: usize) -> Option<&mut Slot<T::Handle>> {
        self.slots.get_mut(index).filter(|s| s.is_connected())
    }

    /// Set one force-feedback channel (`value` in `[0, 1]`).
    pub fn set_channel_value(
        &mut self,
        slot: usize,
        channel: ForceFeedbackChannel,
        value: f32,
    ) -> PropertyOutcome {
        let Some(s) = self.connected_slot_mut(slot) else {
            return PropertyOutcome::Ignored;
        };
        let changed = apply_channel_value(
            &mut s.pending_output,
            &mut s.extra.force_feedback,
            channel,
            value,
        );
        s.extra.dirty |= changed;
        PropertyOutcome::Applied { changed }
    }

    /// Set all four force-feedback channels at once.
    pub fn set_channel_values(&mut self, slot: usize, values: &ForceFeedbackValues) -> PropertyOutcome {
        let Some(s) = self.connected_slot_mut(slot) else {
            return PropertyOutcome::Ignored;
        };
        let changed = apply_channel_values(&mut s.pending_output, &mut s.extra.force_feedback, values);
        s.extra.dirty |= changed;
        PropertyOutcome::Applied { changed }
    }

    /// Merge a lighting or trigger-effect request into the slot's pending output.
    pub fn set_device_property(&mut self, slot: usize, property: &DeviceProperty) -> PropertyOutcome {
        let limits = self.settings.trigger_limits;
        let Some(s) = self.connected_slot_mut(slot) else {
            return PropertyOutcome::Ignored;
        };
        let outcome = apply_property(&mut s.pending_output, property, &limits);
        s.extra.dirty |= outcome.changed();
        outcome
    }

    pub fn is_gamepad_attached(&self) -> bool {
        self.slots.iter().any(Slot::is_connected)
    }

    /// Connected slots and the devices in them.
    pub fn devices(&self) -> Vec<(usize, &DeviceDescriptor)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.descriptor().filter(|_| s.is_connected()).map(|d| (i, d)))
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(
            self.slots
                .iter()
                .enumerate()
                .map(|(i, s)| SlotSnapshot {
                    slot: i,
                    connected: s.is_connected(),
                    unique_id: s.unique_id(),
                    device: s.descriptor().cloned(),
                    input: *s.current_input(),
                    output: *s.pending_output(),
                    dirty: s.is_dirty(),
                })
                .collect(),
        )
    }

    pub fn slot(&self, index: usize) -> Option<&Slot<T::Handle>> {
        self.slots.get(index)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Swap the event sink, returning the previous one.
    pub fn set_sink(&mut self, sink: S) -> S {
        std::mem::replace(&mut self.sink, sink)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: Transport, S: EventSink> Drop for DeviceManager<T, S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualTransport;
    use crate::buttons::{AxisId, ButtonId, BTN_CROSS};
    use crate::clock::ManualClock;
    use crate::event::{EventBuffer, InputEvent};
    use crate::state::{Color, InputSnapshot};

    fn manager_with(ids: &[u32]) -> (DeviceManager<VirtualTransport, EventBuffer>, ManualClock) {
        let mut transport = VirtualTransport::new();
        for &id in ids {
            transport.plug(id);
        }
        let clock = ManualClock::new(0.0);
        let manager =
            DeviceManager::with_clock(transport, EventBuffer::new(), Settings::default(), clock.clone());
        (manager, clock)
    }

    #[test]
    fn construction_connects_present_devices() {
        let (manager, _) = manager_with(&[7, 8]);
        assert_eq!(
            manager.sink().events(),
            &[
                InputEvent::DeviceConnected { slot: 0 },
                InputEvent::DeviceConnected { slot: 1 }
            ]
        );
        assert_eq!(manager.devices().len(), 2);
        assert_eq!(manager.slot(0).map(Slot::unique_id), Some(7));
    }

    #[test]
    fn first_tick_flushes_initial_output_and_emits_nothing_for_zero_input() {
        let (mut manager, _) = manager_with(&[7]);
        manager.sink_mut().drain();

        manager.tick();
        assert!(manager.sink().is_empty());
        assert_eq!(manager.transport().writes().len(), 1);
        assert!(!manager.slot(0).map(Slot::is_dirty).unwrap_or(true));

        manager.tick();
        assert_eq!(manager.transport().writes().len(), 1);
    }

    #[test]
    fn read_failure_releases_inputs_then_disconnects() {
        let (mut manager, _) = manager_with(&[7]);
        let mut input = InputSnapshot::default();
        input.left_stick.x = 100;
        manager.transport_mut().set_input(7, input);
        manager.tick();
        manager.sink_mut().drain();

        manager.transport_mut().fail_next_read(7);
        manager.send_controller_events();

        assert_eq!(
            manager.sink_mut().drain(),
            vec![
                InputEvent::Analog {
                    axis: AxisId::LeftStickX,
                    slot: 0,
                    value: 0.0
                },
                InputEvent::ButtonReleased {
                    button: ButtonId::LeftStickRight,
                    slot: 0
                },
                InputEvent::DeviceDisconnected { slot: 0 },
            ]
        );
        assert!(!manager.is_gamepad_attached());
        assert_eq!(manager.transport().released(), &[7]);
        let slot = manager.slot(0).unwrap();
        assert_eq!(slot.unique_id(), 0);
        assert!(slot.extra().repeat.is_reset());
    }

    #[test]
    fn unavailable_sink_still_gets_disconnect_notice() {
        let (mut manager, _) = manager_with(&[7]);
        let input = InputSnapshot {
            buttons: BTN_CROSS,
            ..InputSnapshot::default()
        };
        manager.transport_mut().set_input(7, input);
        manager.tick();
        manager.sink_mut().drain();
        manager.sink_mut().set_available(false);

        manager.transport_mut().unplug(7);
        manager.send_controller_events();

        assert_eq!(
            manager.sink_mut().drain(),
            vec![InputEvent::DeviceDisconnected { slot: 0 }]
        );
        assert_eq!(manager.transport().released(), &[7]);
    }

    #[test]
    fn write_failure_disconnects_the_slot() {
        let (mut manager, _) = manager_with(&[7, 8]);
        manager.transport_mut().set_fail_writes(true);
        manager.tick();

        assert!(!manager.is_gamepad_attached());
        let events = manager.sink_mut().drain();
        assert!(events.contains(&InputEvent::DeviceDisconnected { slot: 0 }));
        assert!(events.contains(&InputEvent::DeviceDisconnected { slot: 1 }));
    }

    #[test]
    fn requests_on_empty_slots_are_ignored() {
        let (mut manager, _) = manager_with(&[7]);
        assert_eq!(
            manager.set_channel_value(1, ForceFeedbackChannel::LeftLarge, 1.0),
            PropertyOutcome::Ignored
        );
        assert_eq!(
            manager.set_device_property(
                MAX_DEVICES,
                &DeviceProperty::LightColor {
                    enable: true,
                    color: Color::new(1, 1, 1)
                }
            ),
            PropertyOutcome::Ignored
        );
    }

    #[test]
    fn unchanged_property_does_not_trigger_a_write() {
        let (mut manager, _) = manager_with(&[7]);
        manager.tick();
        let writes = manager.transport().writes().len();

        let off = DeviceProperty::LightColor {
            enable: false,
            color: Color::new(9, 9, 9),
        };
        assert_eq!(
            manager.set_device_property(0, &off),
            PropertyOutcome::Applied { changed: false }
        );
        manager.tick();
        assert_eq!(manager.transport().writes().len(), writes);
    }

    #[test]
    fn enumeration_failure_leaves_slots_untouched() {
        let (mut manager, _) = manager_with(&[7]);
        manager.transport_mut().plug(8);
        manager
            .transport_mut()
            .fail_next_enumeration(TransportError::IoFailed);
        manager.refresh();
        assert_eq!(manager.devices().len(), 1);

        manager.refresh();
        assert_eq!(manager.devices().len(), 2);
    }

    #[test]
    fn drop_tears_down_every_slot() {
        let (mut manager, _) = manager_with(&[7, 8]);
        manager.shutdown();
        assert_eq!(manager.transport().released(), &[7, 8]);
        assert!(!manager.is_gamepad_attached());
    }

    #[test]
    fn snapshot_reflects_slots() {
        let (manager, _) = manager_with(&[7]);
        let snap = manager.snapshot();
        assert_eq!(snap.0.len(), MAX_DEVICES);
        let first = snap.get(0).unwrap();
        assert!(first.connected);
        assert_eq!(first.unique_id, 7);
        assert!(first.dirty);
        assert_eq!(snap.connected().count(), 1);
    }
}
