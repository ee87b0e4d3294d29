use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Countdown,
    Playing,
    Ended,
}

/// Seconds as a signed countdown value; anything past `i32::MAX` saturates.
pub fn secs_i32(secs: u32) -> i32 {
    i32::try_from(secs).unwrap_or(i32::MAX)
}

/// Counters and timers of a single game
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub phase: Phase,
    pub remaining_countdown_secs: i32,
    pub remaining_game_secs: i32,
    pub current_word: Option<String>,
    pub correct_hits: u32,
    pub total_words_typed: u32,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            phase: Phase::Idle,
            remaining_countdown_secs: secs_i32(config.countdown_secs),
            remaining_game_secs: secs_i32(config.session_duration_secs),
            current_word: None,
            correct_hits: 0,
            total_words_typed: 0,
        }
    }

    /// Back to configured defaults, keeping the current phase
    pub fn reset(&mut self, config: &GameConfig) {
        let phase = self.phase;
        *self = Self::new(config);
        self.phase = phase;
    }

    pub fn register_hit(&mut self) {
        self.correct_hits += 1;
        self.total_words_typed += 1;
    }
}
