//! In-memory, scripted transport.
//!
//! [`VirtualTransport`] stands in for real hardware in tests and demos. Devices
//! are plugged and unplugged by id, their input is set directly, and failures
//! can be injected per call. Every write and every released handle is recorded
//! for inspection.

use crate::error::TransportError;
use crate::metadata::{DeviceMeta, DUALSENSE_PID};
use crate::state::{InputSnapshot, OutputState};
use crate::transport::{ConnectionKind, DeviceDescriptor, Transport};

/// Handle to an opened virtual device.
#[derive(Debug, PartialEq, Eq)]
pub struct VirtualHandle {
    unique_id: u32,
}

impl VirtualHandle {
    pub fn unique_id(&self) -> u32 {
        self.unique_id
    }
}

#[derive(Debug)]
struct VirtualDevice {
    descriptor: DeviceDescriptor,
    plugged: bool,
    input: InputSnapshot,
    failing_reads: usize,
    fail_connect: bool,
}

/// Scripted [`Transport`] backed by plain data.
#[derive(Debug, Default)]
pub struct VirtualTransport {
    devices: Vec<VirtualDevice>,
    enumeration_error: Option<TransportError>,
    fail_writes: bool,
    writes: Vec<(u32, OutputState)>,
    released: Vec<u32>,
}

impl VirtualTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a USB device with the given id.
    pub fn plug(&mut self, unique_id: u32) {
        self.plug_descriptor(DeviceDescriptor {
            unique_id,
            path: format!("virtual://{unique_id}"),
            connection: ConnectionKind::Usb,
            meta: DeviceMeta {
                pid: Some(DUALSENSE_PID),
                product_string: Some("Virtual DualSense".to_string()),
                ..DeviceMeta::default()
            },
        });
    }

    /// Attach a device with a fully specified descriptor. Re-plugging a known id
    /// keeps its scripted input.
    pub fn plug_descriptor(&mut self, descriptor: DeviceDescriptor) {
        match self.device_mut(descriptor.unique_id) {
            Some(device) => {
                device.descriptor = descriptor;
                device.plugged = true;
            }
            None => self.devices.push(VirtualDevice {
                descriptor,
                plugged: true,
                input: InputSnapshot::default(),
                failing_reads: 0,
                fail_connect: false,
            }),
        }
    }

    /// Detach a device; open handles start failing.
    pub fn unplug(&mut self, unique_id: u32) {
        if let Some(device) = self.device_mut(unique_id) {
            device.plugged = false;
        }
    }

    /// Input returned by every subsequent read of this device.
    pub fn set_input(&mut self, unique_id: u32, input: InputSnapshot) {
        if let Some(device) = self.device_mut(unique_id) {
            device.input = input;
        }
    }

    pub fn fail_next_read(&mut self, unique_id: u32) {
        if let Some(device) = self.device_mut(unique_id) {
            device.failing_reads += 1;
        }
    }

    pub fn set_fail_connect(&mut self, unique_id: u32, fail: bool) {
        if let Some(device) = self.device_mut(unique_id) {
            device.fail_connect = fail;
        }
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make the next enumeration fail with `error`.
    pub fn fail_next_enumeration(&mut self, error: TransportError) {
        self.enumeration_error = Some(error);
    }

    /// Every successful write as `(unique_id, output)`, oldest first.
    pub fn writes(&self) -> &[(u32, OutputState)] {
        &self.writes
    }

    pub fn last_write(&self, unique_id: u32) -> Option<&OutputState> {
        self.writes
            .iter()
            .rev()
            .find(|(id, _)| *id == unique_id)
            .map(|(_, output)| output)
    }

    /// Ids of released handles, in release order.
    pub fn released(&self) -> &[u32] {
        &self.released
    }

    fn device(&self, unique_id: u32) -> Option<&VirtualDevice> {
        self.devices
            .iter()
            .find(|d| d.descriptor.unique_id == unique_id)
    }

    fn device_mut(&mut self, unique_id: u32) -> Option<&mut VirtualDevice> {
        self.devices
            .iter_mut()
            .find(|d| d.descriptor.unique_id == unique_id)
    }

    fn plugged_mut(&mut self, unique_id: u32) -> Result<&mut VirtualDevice, TransportError> {
        self.device_mut(unique_id)
            .filter(|d| d.plugged)
            .ok_or(TransportError::DeviceRemoved)
    }
}

impl Transport for VirtualTransport {
    type Handle = VirtualHandle;

    fn enumerate(
        &mut self,
        devices: &mut Vec<DeviceDescriptor>,
        capacity: usize,
    ) -> Result<(), TransportError> {
        if let Some(err) = self.enumeration_error.take() {
            return Err(err);
        }

        let mut present = self.devices.iter().filter(|d| d.plugged);
        devices.extend(present.by_ref().take(capacity).map(|d| d.descriptor.clone()));
        if present.next().is_some() {
            return Err(TransportError::InsufficientBuffer);
        }
        Ok(())
    }

    fn connect(&mut self, descriptor: &DeviceDescriptor) -> Result<VirtualHandle, TransportError> {
        let device = self.plugged_mut(descriptor.unique_id)?;
        if device.fail_connect {
            return Err(TransportError::IoFailed);
        }
        Ok(VirtualHandle {
            unique_id: descriptor.unique_id,
        })
    }

    fn disconnect(&mut self, handle: VirtualHandle) {
        self.released.push(handle.unique_id);
    }

    fn read_input(&mut self, handle: &mut VirtualHandle) -> Result<InputSnapshot, TransportError> {
        let device = self.plugged_mut(handle.unique_id)?;
        if device.failing_reads > 0 {
            device.failing_reads -= 1;
            return Err(TransportError::IoFailed);
        }
        Ok(device.input)
    }

    fn write_output(
        &mut self,
        handle: &mut VirtualHandle,
        output: &OutputState,
    ) -> Result<(), TransportError> {
        if self.fail_writes {
            return Err(TransportError::IoFailed);
        }
        if self.device(handle.unique_id).map_or(true, |d| !d.plugged) {
            return Err(TransportError::DeviceRemoved);
        }
        self.writes.push((handle.unique_id, *output));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_is_capped_and_reports_truncation() {
        let mut transport = VirtualTransport::new();
        for id in 1..=5 {
            transport.plug(id);
        }
        transport.unplug(2);

        let mut found = Vec::new();
        assert_eq!(
            transport.enumerate(&mut found, 3),
            Err(TransportError::InsufficientBuffer)
        );
        let ids: Vec<u32> = found.iter().map(|d| d.unique_id).collect();
        assert_eq!(ids, vec![1, 3, 4]);

        found.clear();
        assert_eq!(transport.enumerate(&mut found, 4), Ok(()));
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn injected_failures_fire_once() {
        let mut transport = VirtualTransport::new();
        transport.plug(1);
        let descriptor = transport.device(1).unwrap().descriptor.clone();
        let mut handle = transport.connect(&descriptor).unwrap();

        transport.fail_next_read(1);
        assert_eq!(transport.read_input(&mut handle), Err(TransportError::IoFailed));
        assert!(transport.read_input(&mut handle).is_ok());

        transport.fail_next_enumeration(TransportError::Unknown);
        let mut found = Vec::new();
        assert_eq!(transport.enumerate(&mut found, 4), Err(TransportError::Unknown));
        assert_eq!(transport.enumerate(&mut found, 4), Ok(()));
    }

    #[test]
    fn unplugged_device_fails_io_and_connect() {
        let mut transport = VirtualTransport::new();
        transport.plug(1);
        let descriptor = transport.device(1).unwrap().descriptor.clone();
        let mut handle = transport.connect(&descriptor).unwrap();
        transport.unplug(1);

        assert_eq!(
            transport.read_input(&mut handle),
            Err(TransportError::DeviceRemoved)
        );
        assert_eq!(
            transport.write_output(&mut handle, &OutputState::default()),
            Err(TransportError::DeviceRemoved)
        );
        assert_eq!(
            transport.connect(&descriptor).unwrap_err(),
            TransportError::DeviceRemoved
        );

        transport.disconnect(handle);
        assert_eq!(transport.released(), &[1]);
    }
}
