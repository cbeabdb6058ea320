//! Gamepad events from gilrs, fed into the pad entry points of `InputState`.
//!
//! Face buttons map onto the numbered pad buttons the default bindings use
//! (south 0, east 1, west 2, north 3, select 6, start 7). The d-pad arrives
//! as four buttons and is folded into one hat position.

use gilrs::{Axis, Button as PadButton, EventType, Gilrs};
use psm_core::input::InputState;

/// Where a gilrs button lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PadInput {
    Button(u8),
    /// Hat component this d-pad button sets while held.
    Hat(i8, i8),
}

fn pad_input(button: PadButton) -> Option<PadInput> {
    let input = match button {
        PadButton::South => PadInput::Button(0),
        PadButton::East => PadInput::Button(1),
        PadButton::West => PadInput::Button(2),
        PadButton::North => PadInput::Button(3),
        PadButton::LeftTrigger => PadInput::Button(4),
        PadButton::RightTrigger => PadInput::Button(5),
        PadButton::Select => PadInput::Button(6),
        PadButton::Start => PadInput::Button(7),
        PadButton::DPadUp => PadInput::Hat(0, 1),
        PadButton::DPadDown => PadInput::Hat(0, -1),
        PadButton::DPadLeft => PadInput::Hat(-1, 0),
        PadButton::DPadRight => PadInput::Hat(1, 0),
        _ => return None,
    };
    Some(input)
}

/// Hat position after one d-pad button changes. Releasing a direction only
/// clears its own axis when it is still the one held.
fn next_hat(hat: (i8, i8), component: (i8, i8), pressed: bool) -> (i8, i8) {
    let (x, y) = hat;
    match (component, pressed) {
        ((cx, 0), true) => (cx, y),
        ((0, cy), true) => (x, cy),
        ((cx, 0), false) if cx == x => (0, y),
        ((0, cy), false) if cy == y => (x, 0),
        _ => hat,
    }
}

/// Left stick only. gilrs reports y positive up; the input state wants
/// negative up.
fn stick_axis(axis: Axis, value: f32) -> Option<(usize, f32)> {
    match axis {
        Axis::LeftStickX => Some((0, value)),
        Axis::LeftStickY => Some((1, -value)),
        _ => None,
    }
}

pub struct Gamepads {
    gilrs: Gilrs,
    hat: (i8, i8),
}

impl Gamepads {
    /// `None` when the platform has no gamepad backend; play continues on
    /// the keyboard.
    pub fn new(input: &mut InputState) -> Option<Self> {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => gilrs,
            Err(e) => {
                log::warn!("Gamepad support unavailable: {e}");
                return None;
            }
        };
        if let Some((_, pad)) = gilrs.gamepads().next() {
            input.connect_gamepad(pad.name());
        }
        if !input.has_gamepad() {
            log::info!("No gamepad connected");
        }
        Some(Self { gilrs, hat: (0, 0) })
    }

    /// Drain pending gamepad events into `input`.
    pub fn poll(&mut self, input: &mut InputState) {
        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                EventType::Connected => {
                    input.connect_gamepad(self.gilrs.gamepad(event.id).name());
                }
                EventType::Disconnected => {
                    self.hat = (0, 0);
                    input.disconnect_gamepad();
                }
                EventType::ButtonPressed(button, _) => self.button(button, true, input),
                EventType::ButtonReleased(button, _) => self.button(button, false, input),
                EventType::AxisChanged(axis, value, _) => {
                    if let Some((index, value)) = stick_axis(axis, value) {
                        input.axis_motion(index, value);
                    }
                }
                _ => {}
            }
        }
    }

    fn button(&mut self, button: PadButton, pressed: bool, input: &mut InputState) {
        match pad_input(button) {
            Some(PadInput::Button(index)) if pressed => input.pad_button_down(index),
            Some(PadInput::Button(index)) => input.pad_button_up(index),
            Some(PadInput::Hat(x, y)) => {
                self.hat = next_hat(self.hat, (x, y), pressed);
                input.hat_motion(self.hat.0, self.hat.1);
            }
            None => log::trace!("Unmapped gamepad button {button:?}"),
        }
    }
}
