//! Game state lifecycle and the state stack.
//!
//! States never reach into the stack. They return a `StateCommand` from
//! `handle_input` / `update` and the stack applies it once the call returns,
//! so the stack is never mutated while a state is running.

use crate::input::InputState;
use crate::surface::Surface;
use crate::transition::Transition;

/// What a state needs from the surrounding game while it runs.
pub trait LoopContext {
    /// Simulation clock in milliseconds.
    fn now_ms(&self) -> u64;
    fn set_now_ms(&mut self, now_ms: u64);
    fn is_paused(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotActivated,
    Active,
    TransitioningIn,
    TransitioningOut,
    Done,
}

/// Lifecycle bookkeeping shared by every state.
pub struct StateCore {
    phase: Phase,
    transition: Option<Box<dyn Transition>>,
    is_exiting: bool,
    done_exiting: bool,
}

impl StateCore {
    pub fn new() -> Self {
        Self {
            phase: Phase::NotActivated,
            transition: None,
            is_exiting: false,
            done_exiting: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Input is withheld from a state while this is true.
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    pub fn done_exiting(&self) -> bool {
        self.done_exiting
    }

    /// (Re)activation, with or without an entry transition.
    pub fn start(&mut self, transition: Option<Box<dyn Transition>>) {
        self.is_exiting = false;
        self.done_exiting = false;
        self.phase = if transition.is_some() {
            Phase::TransitioningIn
        } else {
            Phase::Active
        };
        self.transition = transition;
    }

    /// Begin leaving. `done_exiting` turns true once `transition` (if any)
    /// has finished.
    pub fn transition_off(&mut self, transition: Option<Box<dyn Transition>>) {
        self.is_exiting = true;
        self.phase = Phase::TransitioningOut;
        self.transition = transition;
    }

    /// Progress the running transition. Called by the stack once per tick,
    /// right before the state's own update.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(transition) = self.transition.as_mut() {
            if !transition.update(now_ms) {
                self.transition = None;
                if !self.is_exiting {
                    self.phase = Phase::Active;
                }
            }
        }
        if self.transition.is_none() && self.is_exiting {
            self.done_exiting = true;
            self.phase = Phase::Done;
        }
    }

    pub fn draw_transition(&self, surface: &mut dyn Surface) {
        if let Some(transition) = &self.transition {
            transition.draw(surface);
        }
    }
}

impl Default for StateCore {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame render parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawFrame {
    /// Interpolation fraction between the last two ticks, in [0, 1).
    pub alpha: f64,
    pub paused: bool,
}

pub enum StateCommand<C> {
    None,
    Push(Box<dyn GameState<C>>, Option<Box<dyn Transition>>),
    Pop(Option<Box<dyn Transition>>),
    /// Unload and drop every state, then install this one alone.
    Replace(Box<dyn GameState<C>>, Option<Box<dyn Transition>>),
    Quit,
}

pub trait GameState<C> {
    fn name(&self) -> &str;
    fn core(&self) -> &StateCore;
    fn core_mut(&mut self) -> &mut StateCore;

    fn load_content(&mut self, _ctx: &mut C) -> Result<(), String> {
        Ok(())
    }

    fn unload_content(&mut self, _ctx: &mut C) {}

    /// First time on the stack.
    fn activate(&mut self, transition: Option<Box<dyn Transition>>, _ctx: &mut C) {
        self.core_mut().start(transition);
    }

    /// Back on top after the state above it was popped.
    fn reactivate(&mut self, transition: Option<Box<dyn Transition>>, _ctx: &mut C) {
        self.core_mut().start(transition);
    }

    fn handle_input(&mut self, _input: &mut InputState, _ctx: &mut C) -> StateCommand<C> {
        StateCommand::None
    }

    fn update(&mut self, ctx: &mut C) -> StateCommand<C>;

    fn draw(&self, surface: &mut dyn Surface, ctx: &C, frame: DrawFrame);
}

pub struct StateStack<C> {
    states: Vec<Box<dyn GameState<C>>>,
    quit: bool,
}

impl<C: LoopContext> StateStack<C> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            quit: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_running(&self) -> bool {
        !self.quit && !self.states.is_empty()
    }

    pub fn top(&self) -> Option<&dyn GameState<C>> {
        self.states.last().map(|s| s.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.states.iter().map(|s| s.name()).collect()
    }

    pub fn push(
        &mut self,
        mut state: Box<dyn GameState<C>>,
        transition: Option<Box<dyn Transition>>,
        ctx: &mut C,
    ) -> Result<(), String> {
        state
            .load_content(ctx)
            .map_err(|e| format!("Failed to load state '{}': {e}", state.name()))?;
        log::info!("Push state '{}'", state.name());
        state.activate(transition, ctx);
        self.states.push(state);
        Ok(())
    }

    pub fn pop(&mut self, transition: Option<Box<dyn Transition>>, ctx: &mut C) {
        if let Some(mut state) = self.states.pop() {
            log::info!("Pop state '{}'", state.name());
            state.unload_content(ctx);
        }
        if let Some(top) = self.states.last_mut() {
            top.reactivate(transition, ctx);
        }
    }

    pub fn replace(
        &mut self,
        state: Box<dyn GameState<C>>,
        transition: Option<Box<dyn Transition>>,
        ctx: &mut C,
    ) -> Result<(), String> {
        while let Some(mut old) = self.states.pop() {
            old.unload_content(ctx);
        }
        self.push(state, transition, ctx)
    }

    pub fn apply(&mut self, command: StateCommand<C>, ctx: &mut C) -> Result<(), String> {
        match command {
            StateCommand::None => Ok(()),
            StateCommand::Push(state, transition) => self.push(state, transition, ctx),
            StateCommand::Pop(transition) => {
                self.pop(transition, ctx);
                Ok(())
            }
            StateCommand::Replace(state, transition) => self.replace(state, transition, ctx),
            StateCommand::Quit => {
                log::info!("Quit requested");
                self.quit = true;
                Ok(())
            }
        }
    }

    /// Deliver input to the top state unless it is mid-transition.
    pub fn handle_input(&mut self, input: &mut InputState, ctx: &mut C) -> Result<(), String> {
        let command = match self.states.last_mut() {
            Some(top) if !top.core().is_transitioning() => top.handle_input(input, ctx),
            _ => return Ok(()),
        };
        self.apply(command, ctx)
    }

    /// One simulation tick of the top state.
    pub fn update(&mut self, ctx: &mut C) -> Result<(), String> {
        let command = match self.states.last_mut() {
            Some(top) => {
                top.core_mut().tick(ctx.now_ms());
                top.update(ctx)
            }
            None => return Ok(()),
        };
        self.apply(command, ctx)
    }

    /// Draw every state bottom to top, each followed by its transition.
    pub fn draw(&self, surface: &mut dyn Surface, ctx: &C, frame: DrawFrame) {
        for state in &self.states {
            state.draw(surface, ctx, frame);
            state.core().draw_transition(surface);
        }
    }
}

impl<C: LoopContext> Default for StateStack<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::input::Button;
    use crate::surface::Region;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    pub(crate) struct TestCtx {
        pub now: u64,
        pub paused: bool,
        pub log: Rc<RefCell<Vec<String>>>,
    }

    impl LoopContext for TestCtx {
        fn now_ms(&self) -> u64 {
            self.now
        }

        fn set_now_ms(&mut self, now_ms: u64) {
            self.now = now_ms;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }
    }

    /// Finishes after a fixed number of updates.
    pub(crate) struct CountdownTransition(pub u32);

    impl Transition for CountdownTransition {
        fn update(&mut self, _now_ms: u64) -> bool {
            self.0 = self.0.saturating_sub(1);
            self.0 > 0
        }

        fn draw(&self, surface: &mut dyn Surface) {
            surface.fill([0, 0, 0], 128);
        }
    }

    /// Records lifecycle calls; START pushes another recorder, SELECT pops.
    pub(crate) struct Recorder {
        pub name: String,
        pub core: StateCore,
        pub inputs: u32,
    }

    impl Recorder {
        pub fn boxed(name: &str) -> Box<dyn GameState<TestCtx>> {
            Box::new(Self {
                name: name.to_string(),
                core: StateCore::new(),
                inputs: 0,
            })
        }

        fn record(&self, ctx: &TestCtx, event: &str) {
            ctx.log.borrow_mut().push(format!("{}:{event}", self.name));
        }
    }

    impl GameState<TestCtx> for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn core(&self) -> &StateCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut StateCore {
            &mut self.core
        }

        fn load_content(&mut self, ctx: &mut TestCtx) -> Result<(), String> {
            self.record(ctx, "load");
            Ok(())
        }

        fn unload_content(&mut self, ctx: &mut TestCtx) {
            self.record(ctx, "unload");
        }

        fn activate(&mut self, transition: Option<Box<dyn Transition>>, ctx: &mut TestCtx) {
            self.record(ctx, "activate");
            self.core.start(transition);
        }

        fn reactivate(&mut self, transition: Option<Box<dyn Transition>>, ctx: &mut TestCtx) {
            self.record(ctx, "reactivate");
            self.core.start(transition);
        }

        fn handle_input(&mut self, input: &mut InputState, ctx: &mut TestCtx) -> StateCommand<TestCtx> {
            self.inputs += 1;
            if input.is_pressed(Button::Start) {
                self.record(ctx, "start");
                return StateCommand::Push(Recorder::boxed("child"), None);
            }
            if input.is_pressed(Button::Select) {
                return StateCommand::Pop(None);
            }
            StateCommand::None
        }

        fn update(&mut self, ctx: &mut TestCtx) -> StateCommand<TestCtx> {
            self.record(ctx, "update");
            StateCommand::None
        }

        fn draw(&self, _surface: &mut dyn Surface, ctx: &TestCtx, _frame: DrawFrame) {
            self.record(ctx, "draw");
        }
    }

    pub(crate) struct NullSurface;

    impl Surface for NullSurface {
        fn size(&self) -> (u32, u32) {
            (320, 240)
        }

        fn blit(&mut self, _src: Region<'_>, _x: i32, _y: i32, _opacity: u8) {}

        fn fill(&mut self, _color: [u8; 3], _opacity: u8) {}
    }

    fn events(ctx: &TestCtx) -> Vec<String> {
        ctx.log.borrow_mut().drain(..).collect()
    }

    #[test]
    fn core_without_transition_is_active() {
        let mut core = StateCore::new();
        assert_eq!(core.phase(), Phase::NotActivated);
        core.start(None);
        assert_eq!(core.phase(), Phase::Active);
        assert!(!core.is_transitioning());
    }

    #[test]
    fn core_transition_in_then_active() {
        let mut core = StateCore::new();
        core.start(Some(Box::new(CountdownTransition(2))));
        assert_eq!(core.phase(), Phase::TransitioningIn);
        core.tick(0);
        assert!(core.is_transitioning());
        core.tick(0);
        assert_eq!(core.phase(), Phase::Active);
        assert!(!core.done_exiting());
    }

    #[test]
    fn core_exit_completes_after_transition() {
        let mut core = StateCore::new();
        core.start(None);
        core.transition_off(Some(Box::new(CountdownTransition(2))));
        assert!(core.is_exiting());
        core.tick(0);
        assert!(!core.done_exiting());
        core.tick(0);
        assert!(core.done_exiting());
        assert_eq!(core.phase(), Phase::Done);
    }

    #[test]
    fn core_exit_without_transition_is_done_next_tick() {
        let mut core = StateCore::new();
        core.start(None);
        core.transition_off(None);
        core.tick(0);
        assert!(core.done_exiting());
    }

    #[test]
    fn push_pop_replace_lifecycle() {
        let mut ctx = TestCtx::default();
        let mut stack = StateStack::new();
        stack.push(Recorder::boxed("a"), None, &mut ctx).expect("push a");
        stack.push(Recorder::boxed("b"), None, &mut ctx).expect("push b");
        assert_eq!(stack.names(), vec!["a", "b"]);
        assert_eq!(events(&ctx), ["a:load", "a:activate", "b:load", "b:activate"]);

        stack.pop(None, &mut ctx);
        assert_eq!(stack.names(), vec!["a"]);
        assert_eq!(events(&ctx), ["b:unload", "a:reactivate"]);

        stack.push(Recorder::boxed("b"), None, &mut ctx).expect("push b");
        events(&ctx);
        stack.replace(Recorder::boxed("c"), None, &mut ctx).expect("replace");
        assert_eq!(stack.names(), vec!["c"]);
        assert_eq!(events(&ctx), ["b:unload", "a:unload", "c:load", "c:activate"]);
    }

    #[test]
    fn transitioning_state_gets_no_input_but_updates() {
        let mut ctx = TestCtx::default();
        let mut input = InputState::new();
        let mut stack = StateStack::new();
        stack
            .push(Recorder::boxed("a"), Some(Box::new(CountdownTransition(3))), &mut ctx)
            .expect("push");
        input.key_down(crate::input::Key::Return);

        stack.handle_input(&mut input, &mut ctx).expect("input");
        assert_eq!(stack.len(), 1);
        stack.update(&mut ctx).expect("update");
        stack.update(&mut ctx).expect("update");
        stack.update(&mut ctx).expect("update");
        assert!(!stack.top().expect("top").core().is_transitioning());

        stack.handle_input(&mut input, &mut ctx).expect("input");
        assert_eq!(stack.names(), vec!["a", "child"]);
    }

    #[test]
    fn commands_from_input_are_applied() {
        let mut ctx = TestCtx::default();
        let mut input = InputState::new();
        let mut stack = StateStack::new();
        stack.push(Recorder::boxed("a"), None, &mut ctx).expect("push");

        input.key_down(crate::input::Key::Return);
        stack.handle_input(&mut input, &mut ctx).expect("input");
        input.end_frame();
        assert_eq!(stack.len(), 2);

        input.key_down(crate::input::Key::Quote);
        stack.handle_input(&mut input, &mut ctx).expect("input");
        assert_eq!(stack.names(), vec!["a"]);
    }

    #[test]
    fn draw_visits_every_state_bottom_up() {
        let mut ctx = TestCtx::default();
        let mut stack = StateStack::new();
        stack.push(Recorder::boxed("a"), None, &mut ctx).expect("push");
        stack.push(Recorder::boxed("b"), None, &mut ctx).expect("push");
        events(&ctx);
        stack.draw(&mut NullSurface, &ctx, DrawFrame { alpha: 0.0, paused: false });
        assert_eq!(events(&ctx), ["a:draw", "b:draw"]);
    }

    #[test]
    fn covered_state_is_drawn_but_not_updated() {
        let mut ctx = TestCtx::default();
        let mut stack = StateStack::new();
        stack.push(Recorder::boxed("game"), None, &mut ctx).expect("push");
        stack.push(Recorder::boxed("pause"), None, &mut ctx).expect("push");
        events(&ctx);
        for _ in 0..3 {
            stack.update(&mut ctx).expect("update");
            stack.draw(&mut NullSurface, &ctx, DrawFrame { alpha: 0.0, paused: true });
        }
        let log = events(&ctx);
        let seen = |event: &str| log.iter().filter(|e| e.as_str() == event).count();
        assert_eq!(seen("game:update"), 0);
        assert_eq!(seen("pause:update"), 3);
        assert_eq!(seen("game:draw"), 3);
        assert_eq!(seen("pause:draw"), 3);
    }

    #[test]
    fn quit_stops_the_stack() {
        let mut ctx = TestCtx::default();
        let mut stack = StateStack::new();
        stack.push(Recorder::boxed("a"), None, &mut ctx).expect("push");
        assert!(stack.is_running());
        stack.apply(StateCommand::Quit, &mut ctx).expect("quit");
        assert!(!stack.is_running());
    }
}
