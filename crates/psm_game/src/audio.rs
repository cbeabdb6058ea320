//! Audio boundary. The game only names sounds and music requests; mixing is
//! left to whatever `AudioSink` is installed.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Cursor,
    Select,
    Blip,
    Pause,
    EnemyExplosion,
    PlayerExplosion,
    Laser,
    Hit,
    Spreader,
    LaserBeam,
    PowerUp,
    ChangeWeapon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Music {
    Title,
    Level,
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicAction {
    Play(Music),
    Stop,
    FadeOut { ms: u32 },
}

pub trait AudioSink {
    fn play(&mut self, sound: Sound);
    fn music(&mut self, action: MusicAction);
}

/// Sink that only reports what would be played.
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, sound: Sound) {
        log::debug!("play {sound:?}");
    }

    fn music(&mut self, action: MusicAction) {
        log::debug!("music {action:?}");
    }
}

/// Keeps every request, for assertions in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub sounds: Vec<Sound>,
    pub music: Vec<MusicAction>,
}

#[cfg(test)]
impl AudioSink for RecordingAudio {
    fn play(&mut self, sound: Sound) {
        self.sounds.push(sound);
    }

    fn music(&mut self, action: MusicAction) {
        self.music.push(action);
    }
}
