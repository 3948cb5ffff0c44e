use dsinput::backends::virtual_input::VirtualTransport;
use dsinput::buttons::BTN_CROSS;
use dsinput::{
    DeviceManager, EventBuffer, ForceFeedbackChannel, InputSnapshot, ManualClock, Settings,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("dsinput=debug"))
        .init();

    // A scripted controller with id 7.
    let mut transport = VirtualTransport::new();
    transport.plug(7);

    let clock = ManualClock::new(0.0);
    let mut manager = DeviceManager::with_clock(
        transport,
        EventBuffer::new(),
        Settings::default(),
        clock.clone(),
    );

    // Hold cross and push the left stick right for half a second.
    let mut input = InputSnapshot::default();
    input.buttons = BTN_CROSS;
    input.left_stick.x = 100;
    manager.transport_mut().set_input(7, input);
    manager.set_channel_value(0, ForceFeedbackChannel::LeftLarge, 0.5);

    for _ in 0..=5 {
        manager.tick();
        clock.advance(0.1);
    }

    // Pull the plug: everything held gets released.
    manager.transport_mut().unplug(7);
    manager.tick();

    for event in manager.sink_mut().drain() {
        println!("(Virtual) {event:?}");
    }
    println!(
        "(Virtual) {} output report(s) written",
        manager.transport().writes().len()
    );
}
