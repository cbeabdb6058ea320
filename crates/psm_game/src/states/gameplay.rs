use psm_core::input::{Button, InputState};
use psm_core::state::{DrawFrame, GameState, Phase, StateCommand, StateCore};
use psm_core::surface::Surface;
use psm_core::transition::Transition;

use super::{fade_in, fade_out, start_level, text_card, Command, GameOverState, PauseState, TitleState};
use crate::audio::{Music, MusicAction, Sound};
use crate::context::GameContext;
use crate::level::load_level;
use crate::player::{Player, PlayerControls};
use crate::world::{LevelStatus, World};

const CONGRATULATIONS: &str = "CONGRATULATIONS";

pub struct GameplayState {
    core: StateCore,
    level: usize,
    /// Ship carried over from the previous level, until the world is built.
    carried: Option<Player>,
    world: Option<World>,
    controls: PlayerControls,
    ending: Option<LevelStatus>,
}

impl GameplayState {
    pub fn new(level: usize, player: Option<Player>) -> Self {
        Self {
            core: StateCore::new(),
            level,
            carried: player,
            world: None,
            controls: PlayerControls::default(),
            ending: None,
        }
    }

    pub fn boxed(level: usize, player: Option<Player>) -> Box<dyn GameState<GameContext>> {
        Box::new(Self::new(level, player))
    }

    fn is_boss_level(&self, ctx: &GameContext) -> bool {
        ctx.config.levels.get(self.level).is_some_and(|l| l.boss)
    }

    /// What comes after this level once the exit fade is over.
    fn next_state(&mut self, ctx: &mut GameContext) -> Command {
        let Some(world) = self.world.take() else {
            return StateCommand::Replace(TitleState::boxed(), fade_in(ctx));
        };
        let mut player = world.into_player();
        match self.ending {
            Some(LevelStatus::Lost) => {
                StateCommand::Replace(GameOverState::boxed(player.score), fade_in(ctx))
            }
            _ if self.level + 1 < ctx.config.levels.len() => {
                player.reset_position();
                start_level(ctx, self.level + 1, Some(player))
            }
            _ => {
                log::info!("All levels cleared, final score {}", player.score);
                ctx.record_score(player.score);
                StateCommand::Replace(TitleState::boxed(), text_card(ctx, CONGRATULATIONS))
            }
        }
    }
}

impl GameState<GameContext> for GameplayState {
    fn name(&self) -> &str {
        "gameplay"
    }

    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn load_content(&mut self, ctx: &mut GameContext) -> Result<(), String> {
        let level = ctx
            .config
            .levels
            .get(self.level)
            .ok_or_else(|| format!("No level {}", self.level + 1))?;
        let records = load_level(&ctx.resource(&level.file))?;
        let background = ctx
            .assets
            .background(&level.background)
            .ok_or_else(|| format!("Missing background '{}'", level.background))?;
        let player = self
            .carried
            .take()
            .unwrap_or_else(|| Player::new(&ctx.config.player));
        let world = World::new(&ctx.config, level.boss, records, background, player);
        log::info!("Level {} loaded ({} enemies)", self.level + 1, world.pending_spawns());
        self.world = Some(world);
        Ok(())
    }

    fn unload_content(&mut self, _ctx: &mut GameContext) {
        self.world = None;
    }

    fn activate(&mut self, transition: Option<Box<dyn Transition>>, ctx: &mut GameContext) {
        let music = if self.is_boss_level(ctx) {
            Music::Boss
        } else {
            Music::Level
        };
        ctx.audio.music(MusicAction::Play(music));
        self.core.start(transition);
    }

    fn reactivate(&mut self, transition: Option<Box<dyn Transition>>, _ctx: &mut GameContext) {
        self.controls = PlayerControls::default();
        self.core.start(transition);
    }

    fn handle_input(&mut self, input: &mut InputState, ctx: &mut GameContext) -> Command {
        if input.is_pressed(Button::Start) {
            ctx.audio.play(Sound::Pause);
            input.clear();
            return StateCommand::Push(PauseState::boxed(), None);
        }
        self.controls = PlayerControls::read(input);
        StateCommand::None
    }

    fn update(&mut self, ctx: &mut GameContext) -> Command {
        if self.core.done_exiting() {
            return self.next_state(ctx);
        }
        if self.core.phase() != Phase::Active {
            return StateCommand::None;
        }
        let Some(world) = self.world.as_mut() else {
            return StateCommand::None;
        };

        world.step(self.controls, ctx.audio.as_mut());
        // A weapon switch is one press, not one per tick.
        self.controls.switch_weapon = false;

        let status = world.status();
        if status != LevelStatus::Playing {
            log::info!("Level {} ended: {status:?}", self.level + 1);
            if status == LevelStatus::Cleared {
                ctx.audio.music(MusicAction::FadeOut { ms: 1000 });
            }
            self.ending = Some(status);
            self.core.transition_off(fade_out(ctx));
        }
        StateCommand::None
    }

    fn draw(&self, surface: &mut dyn Surface, ctx: &GameContext, frame: DrawFrame) {
        let Some(world) = &self.world else {
            return;
        };
        world.draw(surface, &ctx.assets, frame.alpha, frame.paused);

        let font = ctx.assets.font();
        let player = world.player();
        font.draw(surface, &format!("SCORE {:07}", player.score), 4, 4, 255);
        font.draw(surface, &format!("SHIPS {}", player.lives), 4, 228, 255);
        let weapon = player.weapon().name();
        let right = surface.size().0 as i32 - font.text_width(weapon) - 4;
        font.draw(surface, weapon, right, 228, 255);
    }
}
