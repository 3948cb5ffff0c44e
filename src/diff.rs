//! Input differencing: previous/current snapshot pairs in, events out.
//!
//! [`InputDiffer::process`] walks one slot's frame in a fixed order:
//!
//! 1. stick axes (left X/Y, right X/Y)
//! 2. triggers (left, right)
//! 3. gyroscope (pitch, yaw, roll)
//! 4. regular buttons, virtual stick-direction buttons, touch-down buttons,
//!    all through the press/release protocol of [`crate::repeat`]
//! 5. touch axes (point 1 X/Y, point 2 X/Y)
//! 6. pointer motion from touch point 1, when enabled
//!
//! [`release_active`] produces the events that return every active input of a
//! snapshot to neutral, used when a device goes away.

use crate::buttons::{AxisId, Direction, Stick, REGULAR_BUTTONS, TOUCH_BUTTONS, VIRTUAL_BUTTONS};
use crate::config::Settings;
use crate::constants::{GYRO_SCALE, STICK_DEAD_ZONE, TRIGGER_DEAD_ZONE};
use crate::event::EventSink;
use crate::repeat::{ButtonEdge, RepeatDelays, RepeatTimers};
use crate::state::{AnalogStick, InputSnapshot, TouchPoint};

/// Map a signed 8-bit stick value onto `[-1, 1]`.
///
/// Non-positive values divide by 128 and positive ones by 127, so `-128`
/// lands on exactly `-1.0` and `127` on exactly `1.0`.
#[inline]
pub fn normalize_stick(value: i8) -> f32 {
    if value <= 0 {
        f32::from(value) / 128.0
    } else {
        f32::from(value) / 127.0
    }
}

/// Map an unsigned 8-bit trigger value onto `[0, 1]`.
#[inline]
pub fn normalize_trigger(value: u8) -> f32 {
    f32::from(value) / 255.0
}

#[inline]
fn stick_outside_dead_zone(value: i8) -> bool {
    value.unsigned_abs() > STICK_DEAD_ZONE.unsigned_abs()
}

/// Logical down-state of a virtual stick-direction button.
pub fn stick_direction_down(stick: AnalogStick, direction: Direction) -> bool {
    match direction {
        Direction::Up => stick.y > STICK_DEAD_ZONE,
        Direction::Down => stick.y < -STICK_DEAD_ZONE,
        Direction::Left => stick.x < -STICK_DEAD_ZONE,
        Direction::Right => stick.x > STICK_DEAD_ZONE,
    }
}

fn stick_of(snapshot: &InputSnapshot, stick: Stick) -> AnalogStick {
    match stick {
        Stick::Left => snapshot.left_stick,
        Stick::Right => snapshot.right_stick,
    }
}

fn stick_axes(snapshot: &InputSnapshot) -> [(AxisId, i8); 4] {
    [
        (AxisId::LeftStickX, snapshot.left_stick.x),
        (AxisId::LeftStickY, snapshot.left_stick.y),
        (AxisId::RightStickX, snapshot.right_stick.x),
        (AxisId::RightStickY, snapshot.right_stick.y),
    ]
}

fn trigger_axes(snapshot: &InputSnapshot) -> [(AxisId, u8); 2] {
    [
        (AxisId::LeftTrigger, snapshot.left_trigger),
        (AxisId::RightTrigger, snapshot.right_trigger),
    ]
}

fn touch_points(snapshot: &InputSnapshot) -> [TouchPoint; 2] {
    [snapshot.touch_point1, snapshot.touch_point2]
}

/// Down-state of every button-like control, in repeat-timer index order.
pub fn button_states(snapshot: &InputSnapshot) -> impl Iterator<Item = bool> + '_ {
    let regular = REGULAR_BUTTONS
        .iter()
        .map(move |(_, mask)| snapshot.is_down(*mask));
    let virtual_buttons = VIRTUAL_BUTTONS
        .iter()
        .map(move |(_, stick, dir)| stick_direction_down(stick_of(snapshot, *stick), *dir));
    let touch = touch_points(snapshot).into_iter().map(|p| p.down);
    regular.chain(virtual_buttons).chain(touch)
}

fn button_ids() -> impl Iterator<Item = crate::buttons::ButtonId> {
    REGULAR_BUTTONS
        .iter()
        .map(|(id, _)| *id)
        .chain(VIRTUAL_BUTTONS.iter().map(|(id, _, _)| *id))
        .chain(TOUCH_BUTTONS)
}

/// Raw coordinate difference between two frames of the same touch point.
#[inline]
fn touch_delta(previous: u32, current: u32) -> i32 {
    current.wrapping_sub(previous) as i32
}

/// Stateless event generator configured once from [`Settings`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputDiffer {
    delays: RepeatDelays,
    emit_pointer_events: bool,
}

impl Default for InputDiffer {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl InputDiffer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            delays: RepeatDelays::from(settings),
            emit_pointer_events: settings.emit_pointer_events_from_touch,
        }
    }

    pub fn delays(&self) -> RepeatDelays {
        self.delays
    }

    /// Emit every event implied by moving `slot` from `previous` to `current`
    /// at time `now` (seconds).
    pub fn process<S: EventSink + ?Sized>(
        &self,
        slot: usize,
        previous: &InputSnapshot,
        current: &InputSnapshot,
        timers: &mut RepeatTimers,
        now: f64,
        sink: &mut S,
    ) {
        for ((axis, prev), (_, cur)) in stick_axes(previous).into_iter().zip(stick_axes(current)) {
            if prev != cur || stick_outside_dead_zone(cur) {
                sink.analog_changed(axis, slot, normalize_stick(cur));
            }
        }

        for ((axis, prev), (_, cur)) in trigger_axes(previous)
            .into_iter()
            .zip(trigger_axes(current))
        {
            if prev != cur || cur > TRIGGER_DEAD_ZONE {
                sink.analog_changed(axis, slot, normalize_trigger(cur));
            }
        }

        let gyro = [
            (AxisId::GyroPitch, previous.gyroscope.x, current.gyroscope.x),
            (AxisId::GyroYaw, previous.gyroscope.y, current.gyroscope.y),
            (AxisId::GyroRoll, previous.gyroscope.z, current.gyroscope.z),
        ];
        for (axis, prev, cur) in gyro {
            if prev != cur {
                sink.analog_changed(axis, slot, cur as f32 * GYRO_SCALE);
            }
        }

        let states = button_states(previous).zip(button_states(current));
        for (index, (button, (was_down, is_down))) in button_ids().zip(states).enumerate() {
            match timers.update(index, was_down, is_down, now, self.delays) {
                Some(ButtonEdge::Pressed { repeat }) => sink.button_pressed(button, slot, repeat),
                Some(ButtonEdge::Released) => sink.button_released(button, slot),
                None => {}
            }
        }

        let touch_axes = [
            (AxisId::Touch1X, AxisId::Touch1Y),
            (AxisId::Touch2X, AxisId::Touch2Y),
        ];
        for ((x_axis, y_axis), (prev, cur)) in touch_axes
            .into_iter()
            .zip(touch_points(previous).into_iter().zip(touch_points(current)))
        {
            if !(prev.down && cur.down) {
                continue;
            }
            let dx = touch_delta(prev.x, cur.x);
            if dx != 0 {
                sink.analog_changed(x_axis, slot, dx as f32);
            }
            let dy = touch_delta(prev.y, cur.y);
            if dy != 0 {
                sink.analog_changed(y_axis, slot, dy as f32);
            }
        }

        if self.emit_pointer_events {
            let (prev, cur) = (previous.touch_point1, current.touch_point1);
            if prev.down && cur.down {
                let dx = touch_delta(prev.x, cur.x);
                let dy = touch_delta(prev.y, cur.y);
                if dx != 0 || dy != 0 {
                    sink.pointer_moved(dx, dy);
                }
            }
        }
    }
}

/// Emit zero/release events for everything active in `current`.
///
/// Non-zero stick axes and triggers are reported as `0.0`; every held
/// regular, virtual and touch-down button gets exactly one release. Gyroscope
/// and touch axes carry no resting state and are left alone.
pub fn release_active<S: EventSink + ?Sized>(slot: usize, current: &InputSnapshot, sink: &mut S) {
    for (axis, value) in stick_axes(current) {
        if value != 0 {
            sink.analog_changed(axis, slot, 0.0);
        }
    }
    for (axis, value) in trigger_axes(current) {
        if value != 0 {
            sink.analog_changed(axis, slot, 0.0);
        }
    }
    for (button, down) in button_ids().zip(button_states(current)) {
        if down {
            sink.button_released(button, slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::{ButtonId, BTN_CROSS, BTN_DPAD_UP};
    use crate::constants::BUTTON_COUNT;
    use crate::event::{EventBuffer, InputEvent};
    use proptest::prelude::*;

    fn run(differ: &InputDiffer, prev: &InputSnapshot, cur: &InputSnapshot) -> Vec<InputEvent> {
        let mut timers = RepeatTimers::default();
        let mut sink = EventBuffer::new();
        differ.process(0, prev, cur, &mut timers, 0.0, &mut sink);
        sink.drain()
    }

    fn timers_delay() -> f64 {
        InputDiffer::default().delays().initial
    }

    fn analog(axis: AxisId, value: f32) -> InputEvent {
        InputEvent::Analog {
            axis,
            slot: 0,
            value,
        }
    }

    #[test]
    fn stick_endpoints_are_exact() {
        assert_eq!(normalize_stick(-128), -1.0);
        assert_eq!(normalize_stick(127), 1.0);
        assert_eq!(normalize_stick(0), 0.0);
        assert_eq!(normalize_trigger(255), 1.0);
        assert_eq!(normalize_trigger(0), 0.0);
    }

    #[test]
    fn zeroed_frames_produce_nothing() {
        let zero = InputSnapshot::default();
        assert!(run(&InputDiffer::default(), &zero, &zero).is_empty());
    }

    #[test]
    fn small_unchanged_stick_is_quiet_but_large_one_repeats() {
        let mut snap = InputSnapshot::default();
        snap.left_stick.x = 30;
        snap.right_stick.y = -31;

        let analog_events: Vec<InputEvent> = run(&InputDiffer::default(), &snap, &snap)
            .into_iter()
            .filter(InputEvent::is_analog)
            .collect();
        assert_eq!(analog_events, vec![analog(AxisId::RightStickY, -31.0 / 128.0)]);
    }

    #[test]
    fn trigger_changes_and_dead_zone() {
        let prev = InputSnapshot::default();
        let mut cur = InputSnapshot::default();
        cur.left_trigger = 10;
        cur.right_trigger = 200;

        let events = run(&InputDiffer::default(), &prev, &cur);
        assert_eq!(
            events,
            vec![
                analog(AxisId::LeftTrigger, 10.0 / 255.0),
                analog(AxisId::RightTrigger, 200.0 / 255.0),
            ]
        );

        let held = run(&InputDiffer::default(), &cur, &cur);
        assert_eq!(held, vec![analog(AxisId::RightTrigger, 200.0 / 255.0)]);
    }

    #[test]
    fn gyro_reports_scaled_changes_only() {
        let prev = InputSnapshot::default();
        let mut cur = InputSnapshot::default();
        cur.gyroscope.y = 1000;

        let events = run(&InputDiffer::default(), &prev, &cur);
        assert_eq!(events, vec![analog(AxisId::GyroYaw, 1000.0 * GYRO_SCALE)]);
        assert!(run(&InputDiffer::default(), &cur, &cur).is_empty());
    }

    #[test]
    fn regular_and_virtual_buttons_share_the_timer_table() {
        let prev = InputSnapshot::default();
        let mut cur = InputSnapshot::default();
        cur.buttons = BTN_CROSS | BTN_DPAD_UP;
        cur.left_stick.y = 100;

        let mut timers = RepeatTimers::default();
        let mut sink = EventBuffer::new();
        InputDiffer::default().process(2, &prev, &cur, &mut timers, 1.0, &mut sink);

        let presses: Vec<ButtonId> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                InputEvent::ButtonPressed {
                    button,
                    slot: 2,
                    repeat: false,
                } => Some(*button),
                _ => None,
            })
            .collect();
        assert_eq!(
            presses,
            vec![ButtonId::DPadUp, ButtonId::FaceButtonBottom, ButtonId::LeftStickUp]
        );

        // DPadUp is index 0, FaceButtonBottom 5, LeftStickUp 19.
        let expected = 1.0 + timers_delay();
        for index in [0, 5, 19] {
            let next = timers.next_repeat_time(index).unwrap();
            assert!((next - expected).abs() < 1e-9, "index {index}: {next}");
        }
        assert_eq!(timers.next_repeat_time(1), Some(0.0));
    }

    #[test]
    fn touch_axes_need_contact_in_both_frames() {
        let mut prev = InputSnapshot::default();
        let mut cur = InputSnapshot::default();
        prev.touch_point1 = TouchPoint {
            x: 100,
            y: 50,
            down: true,
            id: 1,
        };
        cur.touch_point1 = TouchPoint {
            x: 90,
            y: 50,
            down: true,
            id: 1,
        };
        cur.touch_point2 = TouchPoint {
            x: 500,
            y: 500,
            down: true,
            id: 2,
        };

        // Touch 1 went down a frame earlier; its first repeat is not yet due.
        let differ = InputDiffer::default();
        let mut timers = RepeatTimers::default();
        let mut sink = EventBuffer::new();
        differ.process(0, &InputSnapshot::default(), &prev, &mut timers, 0.0, &mut sink);
        sink.drain();
        differ.process(0, &prev, &cur, &mut timers, 0.1, &mut sink);

        assert_eq!(
            sink.drain(),
            vec![
                InputEvent::ButtonPressed {
                    button: ButtonId::Touch2,
                    slot: 0,
                    repeat: false
                },
                analog(AxisId::Touch1X, -10.0),
            ]
        );
    }

    #[test]
    fn pointer_motion_follows_setting() {
        let mut prev = InputSnapshot::default();
        prev.touch_point1 = TouchPoint {
            x: 10,
            y: 10,
            down: true,
            id: 0,
        };
        let mut cur = prev;
        cur.touch_point1.x = 15;
        cur.touch_point1.y = 7;

        let quiet = run(&InputDiffer::default(), &prev, &cur);
        assert!(!quiet
            .iter()
            .any(|e| matches!(e, InputEvent::PointerMoved { .. })));

        let settings = Settings {
            emit_pointer_events_from_touch: true,
            ..Settings::default()
        };
        let events = run(&InputDiffer::new(&settings), &prev, &cur);
        assert_eq!(
            events.last(),
            Some(&InputEvent::PointerMoved { dx: 5, dy: -3 })
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, InputEvent::PointerMoved { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn release_active_zeroes_axes_and_releases_held_buttons() {
        let mut snap = InputSnapshot::default();
        snap.left_stick.x = 100;
        snap.right_trigger = 3;
        snap.buttons = BTN_CROSS;
        snap.touch_point2.down = true;
        snap.gyroscope.x = 55;

        let mut sink = EventBuffer::new();
        release_active(1, &snap, &mut sink);

        assert_eq!(
            sink.drain(),
            vec![
                InputEvent::Analog {
                    axis: AxisId::LeftStickX,
                    slot: 1,
                    value: 0.0
                },
                InputEvent::Analog {
                    axis: AxisId::RightTrigger,
                    slot: 1,
                    value: 0.0
                },
                InputEvent::ButtonReleased {
                    button: ButtonId::FaceButtonBottom,
                    slot: 1
                },
                InputEvent::ButtonReleased {
                    button: ButtonId::LeftStickRight,
                    slot: 1
                },
                InputEvent::ButtonReleased {
                    button: ButtonId::Touch2,
                    slot: 1
                },
            ]
        );
    }

    #[test]
    fn button_state_iterator_covers_every_index() {
        assert_eq!(button_states(&InputSnapshot::default()).count(), BUTTON_COUNT);
        assert_eq!(button_ids().count(), BUTTON_COUNT);
    }

    proptest! {
        #[test]
        fn stick_normalization_stays_in_range(raw in any::<i8>()) {
            let v = normalize_stick(raw);
            prop_assert!((-1.0..=1.0).contains(&v));
            prop_assert_eq!(v < 0.0, raw < 0);
        }

        #[test]
        fn trigger_normalization_stays_in_range(raw in any::<u8>()) {
            let v = normalize_trigger(raw);
            prop_assert!((0.0..=1.0).contains(&v));
        }

        #[test]
        fn button_edges_match_bit_transitions(prev_bits in any::<u32>(), cur_bits in any::<u32>()) {
            let prev = InputSnapshot { buttons: prev_bits, ..InputSnapshot::default() };
            let cur = InputSnapshot { buttons: cur_bits, ..InputSnapshot::default() };
            let events = run(&InputDiffer::default(), &prev, &cur);

            for (button, mask) in REGULAR_BUTTONS {
                let was = prev_bits & mask != 0;
                let is = cur_bits & mask != 0;
                let presses = events.iter().filter(|e| matches!(e,
                    InputEvent::ButtonPressed { button: b, repeat: false, .. } if *b == button)).count();
                let releases = events.iter().filter(|e| matches!(e,
                    InputEvent::ButtonReleased { button: b, .. } if *b == button)).count();
                prop_assert_eq!(presses, usize::from(!was && is));
                prop_assert_eq!(releases, usize::from(was && !is));
            }
        }
    }
}
