//! Level files and the spawn queue.
//!
//! A level is a stream of whitespace separated `key value` pairs, one enemy
//! per record, each record closed by `end_enemy`:
//!
//! ```text
//! type enemy_01 x 340 y 40 has_powerup False end_enemy
//! type boss x 0 y 88 has_powerup False end_enemy
//! ```
//!
//! A record missing any of the four keys (or naming an unknown type) is
//! dropped without error when its `end_enemy` is reached. That leniency
//! hides typos in level files, so dropped records are logged at debug level.

use std::fs;
use std::path::Path;

use crate::enemy::EnemyKind;

const END_RECORD: &str = "end_enemy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRecord {
    pub kind: EnemyKind,
    /// Trigger line in level coordinates.
    pub x: i32,
    pub y: i32,
    pub has_powerup: bool,
}

#[derive(Debug, Default)]
struct PartialRecord<'a> {
    tag: Option<&'a str>,
    x: Option<i32>,
    y: Option<i32>,
    has_powerup: Option<bool>,
}

impl PartialRecord<'_> {
    fn finish(&self) -> Option<SpawnRecord> {
        Some(SpawnRecord {
            kind: EnemyKind::from_tag(self.tag?)?,
            x: self.x?,
            y: self.y?,
            has_powerup: self.has_powerup?,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "True" | "true" => Some(true),
        "False" | "false" => Some(false),
        _ => None,
    }
}

pub fn parse_level(text: &str) -> Vec<SpawnRecord> {
    let mut records = Vec::new();
    let mut current = PartialRecord::default();
    let mut tokens = text.split_whitespace();

    while let Some(token) = tokens.next() {
        if token == END_RECORD {
            match current.finish() {
                Some(record) => records.push(record),
                None => log::debug!("Dropping incomplete level record {current:?}"),
            }
            current = PartialRecord::default();
            continue;
        }
        let Some(value) = tokens.next() else {
            log::debug!("Level key '{token}' has no value");
            break;
        };
        if value == END_RECORD {
            log::debug!("Level key '{token}' has no value, dropping record {current:?}");
            current = PartialRecord::default();
            continue;
        }
        match token {
            "type" => current.tag = Some(value),
            "x" => current.x = value.parse().ok(),
            "y" => current.y = value.parse().ok(),
            "has_powerup" => current.has_powerup = parse_bool(value),
            other => log::debug!("Unknown level key '{other}'"),
        }
    }
    records
}

pub fn load_level(path: &Path) -> Result<Vec<SpawnRecord>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level file {}: {e}", path.display()))?;
    let records = parse_level(&text);
    log::info!("Loaded {} enemies from {}", records.len(), path.display());
    Ok(records)
}

/// Enemies waiting for the viewport to reach them.
#[derive(Debug, Clone, Default)]
pub struct SpawnScheduler {
    queue: Vec<SpawnRecord>,
}

impl SpawnScheduler {
    pub fn new(records: Vec<SpawnRecord>) -> Self {
        Self { queue: records }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Remove and return, in queue order, every record whose trigger line is
    /// inside the visible window. Boss records ignore the window and leave
    /// on `boss_signal` instead.
    pub fn release(&mut self, level_pos: f64, width: i32, boss_signal: bool) -> Vec<SpawnRecord> {
        let window_right = level_pos + width as f64;
        let (ready, waiting) = std::mem::take(&mut self.queue)
            .into_iter()
            .partition(|record: &SpawnRecord| {
                if record.kind.is_boss() {
                    boss_signal
                } else {
                    window_right >= record.x as f64
                }
            });
        self.queue = waiting;
        ready
    }
}
