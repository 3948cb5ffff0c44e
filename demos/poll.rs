use std::time::Duration;

use dsinput::backends::hid::HidTransport;
use dsinput::{
    Color, DeviceManager, DeviceProperty, EventBus, EventFilter, FilteredSink, InputEvent,
    LoggingSink, Settings, TriggerMask,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dsinput=info")),
        )
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(&path).expect("load settings"),
        None => Settings::default(),
    };

    let transport = HidTransport::new().expect("init hidapi");

    // Log everything, and print button edges and device changes to stdout.
    let mut bus = EventBus::new();
    bus.add_listener(LoggingSink::new(), EventFilter::All, None);
    bus.add_listener(
        FilteredSink::new(|e| !e.is_analog(), Printer),
        EventFilter::All,
        None,
    );

    let mut manager = DeviceManager::new(transport, bus, settings);
    let mut lit = [false; dsinput::MAX_DEVICES];

    loop {
        manager.tick();

        for (slot, device) in manager.devices() {
            if !lit[slot] {
                println!(
                    "slot {slot}: {} via {} ({})",
                    device.meta.model(),
                    device.connection,
                    device.path
                );
                lit[slot] = true;
            }
        }
        for slot in 0..dsinput::MAX_DEVICES {
            if lit[slot] && manager.slot(slot).is_some_and(|s| !s.is_connected()) {
                lit[slot] = false;
            }
        }
        for slot in 0..dsinput::MAX_DEVICES {
            manager.set_device_property(
                slot,
                &DeviceProperty::LightColor {
                    enable: true,
                    color: Color::new(0, 64, 255),
                },
            );
            manager.set_device_property(
                slot,
                &DeviceProperty::TriggerFeedback {
                    affected: TriggerMask::BOTH,
                    position: 3,
                    strength: 4,
                },
            );
        }

        std::thread::sleep(Duration::from_millis(4));
    }
}

struct Printer;

impl dsinput::EventSink for Printer {
    fn on_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::ButtonPressed {
                button,
                slot,
                repeat,
            } => println!("[{slot}] +{button:?}{}", if repeat { " (repeat)" } else { "" }),
            InputEvent::ButtonReleased { button, slot } => println!("[{slot}] -{button:?}"),
            InputEvent::PointerMoved { dx, dy } => println!("pointer {dx:+} {dy:+}"),
            InputEvent::DeviceConnected { slot } => println!("[{slot}] connected"),
            InputEvent::DeviceDisconnected { slot } => println!("[{slot}] disconnected"),
            InputEvent::Analog { .. } => {}
        }
    }
}
