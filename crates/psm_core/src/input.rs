//! Input state tracking over logical buttons.
//!
//! Raw keyboard and gamepad events are recorded per physical category (keys,
//! pad buttons, hat, stick). Game code never looks at them directly; it asks
//! about the ten logical buttons, which are resolved through the active
//! binding table.
//!
//! - **Level-triggered (held):** `is_held(button)` is true every tick a bound
//!   input is physically down.
//! - **Edge-triggered (pressed):** `is_pressed(button)` is true only until
//!   `end_frame()`, which the loop calls after at least one fixed step has
//!   consumed it. A press on a frame with zero steps is therefore not lost.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    X,
    Y,
    Start,
    Select,
}

impl Button {
    pub const ALL: [Button; 10] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::Start,
        Button::Select,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Button::Up => "UP",
            Button::Down => "DOWN",
            Button::Left => "LEFT",
            Button::Right => "RIGHT",
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
            Button::Start => "START",
            Button::Select => "SELECT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Return,
    Escape,
    Space,
    Quote,
    Backspace,
    Tab,
    Shift,
    Control,
    F11,
    /// Letters (lowercase) and digits.
    Char(char),
}

/// Anything a logical button can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalInput {
    Key(Key),
    PadButton(u8),
    /// Hat value, x then y. Positive y is up.
    Hat(i8, i8),
    Stick(Direction),
}

const STICK_THRESHOLD: f32 = 0.5;

const DIAGONALS: [PhysicalInput; 4] = [
    PhysicalInput::Hat(-1, 1),
    PhysicalInput::Hat(1, 1),
    PhysicalInput::Hat(1, -1),
    PhysicalInput::Hat(-1, -1),
];

/// One binding list per logical button, indexed by `Button::index`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings {
    table: [Vec<PhysicalInput>; 10],
}

impl Bindings {
    pub fn empty() -> Self {
        Self {
            table: Default::default(),
        }
    }

    pub fn get(&self, button: Button) -> &[PhysicalInput] {
        &self.table[button.index()]
    }

    pub fn bind(&mut self, button: Button, input: PhysicalInput) {
        self.table[button.index()].push(input);
    }

    pub fn is_complete(&self) -> bool {
        self.table.iter().all(|list| !list.is_empty())
    }
}

impl Default for Bindings {
    fn default() -> Self {
        use PhysicalInput::{Hat, PadButton, Stick};
        let mut bindings = Self::empty();
        let mut set = |button: Button, inputs: &[PhysicalInput]| {
            bindings.table[button.index()] = inputs.to_vec();
        };
        set(Button::Right, &[PhysicalInput::Key(Key::Right), Hat(1, 0), Stick(Direction::Right)]);
        set(Button::Left, &[PhysicalInput::Key(Key::Left), Hat(-1, 0), Stick(Direction::Left)]);
        set(Button::Up, &[PhysicalInput::Key(Key::Up), Hat(0, 1), Stick(Direction::Up)]);
        set(Button::Down, &[PhysicalInput::Key(Key::Down), Hat(0, -1), Stick(Direction::Down)]);
        set(Button::Select, &[PhysicalInput::Key(Key::Quote), PadButton(6)]);
        set(Button::Start, &[PhysicalInput::Key(Key::Return), PadButton(7)]);
        set(Button::B, &[PhysicalInput::Key(Key::Char('z')), PadButton(0)]);
        set(Button::A, &[PhysicalInput::Key(Key::Char('x')), PadButton(1)]);
        set(Button::Y, &[PhysicalInput::Key(Key::Char('a')), PadButton(2)]);
        set(Button::X, &[PhysicalInput::Key(Key::Char('s')), PadButton(3)]);
        bindings
    }
}

/// Raw inputs currently recorded for one of the held / pressed views.
#[derive(Debug, Clone, Default)]
struct RawInputs {
    keys: HashSet<Key>,
    buttons: HashSet<u8>,
    hat: HashSet<(i8, i8)>,
    stick: HashSet<Direction>,
}

impl RawInputs {
    fn contains(&self, input: &PhysicalInput) -> bool {
        match *input {
            PhysicalInput::Key(key) => self.keys.contains(&key),
            PhysicalInput::PadButton(button) => self.buttons.contains(&button),
            PhysicalInput::Hat(x, y) => self.hat.contains(&(x, y)),
            PhysicalInput::Stick(direction) => self.stick.contains(&direction),
        }
    }

    fn clear(&mut self) {
        self.keys.clear();
        self.buttons.clear();
        self.hat.clear();
        self.stick.clear();
    }
}

pub struct InputState {
    held: RawInputs,
    pressed: RawInputs,
    axes: [f32; 2],

    default_bindings: Bindings,
    user_bindings: Bindings,
    use_user: bool,

    rebinding: bool,
    used: HashSet<PhysicalInput>,
    captured: Option<PhysicalInput>,

    gamepad: Option<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: RawInputs::default(),
            pressed: RawInputs::default(),
            axes: [0.0; 2],
            default_bindings: Bindings::default(),
            user_bindings: Bindings::empty(),
            use_user: false,
            rebinding: false,
            used: DIAGONALS.into_iter().collect(),
            captured: None,
            gamepad: None,
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.rebinding {
            self.captured = Some(PhysicalInput::Key(key));
            return;
        }
        if self.held.keys.insert(key) {
            self.pressed.keys.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.keys.remove(&key);
    }

    pub fn pad_button_down(&mut self, button: u8) {
        if self.rebinding {
            self.captured = Some(PhysicalInput::PadButton(button));
            return;
        }
        if self.held.buttons.insert(button) {
            self.pressed.buttons.insert(button);
        }
    }

    pub fn pad_button_up(&mut self, button: u8) {
        self.held.buttons.remove(&button);
    }

    /// New d-pad position. The held set is replaced by the cardinal
    /// components of `(x, y)`, each of which also counts as a press.
    pub fn hat_motion(&mut self, x: i8, y: i8) {
        let (x, y) = (x.signum(), y.signum());
        if self.rebinding {
            if (x, y) != (0, 0) {
                self.captured = Some(PhysicalInput::Hat(x, y));
            }
            return;
        }
        self.held.hat.clear();
        let components = [(x, 0), (0, y)];
        for component in components.into_iter().filter(|&c| c != (0, 0)) {
            self.held.hat.insert(component);
            self.pressed.hat.insert(component);
        }
    }

    /// Analog stick motion on axis 0 (x) or 1 (y, negative is up).
    pub fn axis_motion(&mut self, axis: usize, value: f32) {
        let Some(slot) = self.axes.get_mut(axis) else {
            return;
        };
        *slot = value;
        if self.rebinding {
            return;
        }
        self.held.stick.clear();
        let [x, y] = self.axes;
        if x < -STICK_THRESHOLD {
            self.held.stick.insert(Direction::Left);
        } else if x > STICK_THRESHOLD {
            self.held.stick.insert(Direction::Right);
        }
        if y < -STICK_THRESHOLD {
            self.held.stick.insert(Direction::Up);
        } else if y > STICK_THRESHOLD {
            self.held.stick.insert(Direction::Down);
        }
    }

    pub fn connect_gamepad(&mut self, name: &str) {
        log::info!("Gamepad connected: {name}");
        self.gamepad = Some(name.to_string());
    }

    pub fn disconnect_gamepad(&mut self) {
        if let Some(name) = self.gamepad.take() {
            log::info!("Gamepad disconnected: {name}");
        }
        self.held.buttons.clear();
        self.held.hat.clear();
        self.held.stick.clear();
        self.axes = [0.0; 2];
    }

    pub fn has_gamepad(&self) -> bool {
        self.gamepad.is_some()
    }

    pub fn gamepad_name(&self) -> Option<&str> {
        self.gamepad.as_deref()
    }

    pub fn bindings(&self) -> &Bindings {
        if self.use_user {
            &self.user_bindings
        } else {
            &self.default_bindings
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.bindings()
            .get(button)
            .iter()
            .any(|input| self.pressed.contains(input))
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.bindings()
            .get(button)
            .iter()
            .any(|input| self.held.contains(input))
    }

    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }

    /// Forget everything that is down. Used on state changes so a press that
    /// closed one screen does not leak into the next.
    pub fn clear(&mut self) {
        self.held.clear();
        self.pressed.clear();
        self.axes = [0.0; 2];
    }

    /// Enter config mode: raw events are captured instead of applied, and the
    /// user table starts over.
    pub fn begin_rebind(&mut self) {
        self.rebinding = true;
        self.user_bindings = Bindings::empty();
        self.used = DIAGONALS.into_iter().collect();
        self.captured = None;
        self.clear();
    }

    pub fn is_rebinding(&self) -> bool {
        self.rebinding
    }

    /// The last raw input seen in config mode, if any.
    pub fn take_captured(&mut self) -> Option<PhysicalInput> {
        self.captured.take()
    }

    /// Append `input` to the user bindings of `button`. Refused when the input
    /// is already bound to something (or is a diagonal).
    pub fn redefine(&mut self, button: Button, input: PhysicalInput) -> bool {
        if !self.used.insert(input) {
            log::warn!("{input:?} is already bound, not assigning it to {}", button.name());
            return false;
        }
        self.user_bindings.bind(button, input);
        true
    }

    pub fn end_rebind(&mut self) {
        self.rebinding = false;
        self.captured = None;
    }

    pub fn use_user_bindings(&mut self) {
        self.use_user = true;
    }

    pub fn use_default_bindings(&mut self) {
        self.use_user = false;
    }

    pub fn uses_user_bindings(&self) -> bool {
        self.use_user
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
