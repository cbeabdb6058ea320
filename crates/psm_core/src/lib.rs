pub mod animation;
pub mod config;
pub mod game_loop;
pub mod geom;
pub mod input;
pub mod state;
pub mod surface;
pub mod time;
pub mod transition;
pub mod viewport;
