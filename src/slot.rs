//! Fixed-capacity per-device storage.
//!
//! A [`Slot`] is connected exactly when it holds a transport handle. Identity
//! bookkeeping (`last_unique_id`, `ever_used`) outlives a connection so the
//! registry can hand a returning device its old slot back.

use crate::output::ForceFeedbackChannels;
use crate::repeat::RepeatTimers;
use crate::state::{InputSnapshot, OutputState};
use crate::transport::DeviceDescriptor;

/// Per-slot bookkeeping that is not part of the hardware state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtraState {
    pub repeat: RepeatTimers,
    pub force_feedback: ForceFeedbackChannels,
    /// Pending output differs from what the hardware last accepted.
    pub dirty: bool,
}

/// One device slot, parameterized over the transport's handle type.
#[derive(Debug)]
pub struct Slot<H> {
    pub(crate) connection: Option<H>,
    pub(crate) descriptor: Option<DeviceDescriptor>,
    pub(crate) unique_id: u32,
    pub(crate) last_unique_id: u32,
    pub(crate) ever_used: bool,
    pub(crate) previous_input: InputSnapshot,
    pub(crate) current_input: InputSnapshot,
    pub(crate) pending_output: OutputState,
    pub(crate) extra: ExtraState,
}

impl<H> Default for Slot<H> {
    fn default() -> Self {
        Self {
            connection: None,
            descriptor: None,
            unique_id: 0,
            last_unique_id: 0,
            ever_used: false,
            previous_input: InputSnapshot::default(),
            current_input: InputSnapshot::default(),
            pending_output: OutputState::default(),
            extra: ExtraState::default(),
        }
    }
}

impl<H> Slot<H> {
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Id of the current occupant, `0` when empty.
    pub fn unique_id(&self) -> u32 {
        self.unique_id
    }

    /// Id of the most recent occupant, retained across disconnects.
    pub fn last_unique_id(&self) -> u32 {
        self.last_unique_id
    }

    /// Whether any device has occupied this slot during the session.
    pub fn ever_used(&self) -> bool {
        self.ever_used
    }

    pub fn descriptor(&self) -> Option<&DeviceDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn previous_input(&self) -> &InputSnapshot {
        &self.previous_input
    }

    pub fn current_input(&self) -> &InputSnapshot {
        &self.current_input
    }

    pub fn pending_output(&self) -> &OutputState {
        &self.pending_output
    }

    pub fn extra(&self) -> &ExtraState {
        &self.extra
    }

    pub fn is_dirty(&self) -> bool {
        self.extra.dirty
    }

    /// Take ownership of a freshly opened handle.
    ///
    /// All transient state starts from zero and the output is marked dirty so
    /// the first flush pushes a known state to the hardware.
    pub(crate) fn attach(&mut self, handle: H, descriptor: DeviceDescriptor) {
        self.clear_transient();
        self.unique_id = descriptor.unique_id;
        self.last_unique_id = descriptor.unique_id;
        self.ever_used = true;
        self.descriptor = Some(descriptor);
        self.connection = Some(handle);
        self.extra.dirty = true;
    }

    /// Give up the handle and zero every transient field.
    ///
    /// The caller is responsible for releasing the returned handle.
    pub(crate) fn detach(&mut self) -> Option<H> {
        let handle = self.connection.take();
        self.unique_id = 0;
        self.descriptor = None;
        self.clear_transient();
        handle
    }

    pub(crate) fn clear_transient(&mut self) {
        self.previous_input = InputSnapshot::default();
        self.current_input = InputSnapshot::default();
        self.pending_output = OutputState::default();
        self.extra.repeat.reset();
        self.extra.force_feedback = ForceFeedbackChannels::default();
        self.extra.dirty = false;
    }
}
