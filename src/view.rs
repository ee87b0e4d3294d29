use crate::score::ScoreRecord;
use crate::session::Phase;

pub const PLAYING_PLACEHOLDER: &str = "Go on, type.";
pub const GAME_OVER_PLACEHOLDER: &str = "GAME OVER!!";

/// Fire-and-forget audio signals; the core never waits on playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Beginning,
    Theme { looping: bool },
    Hit,
    StopTheme,
    TimesUp,
}

/// Notification drained by the presenter after each command or tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    StateChanged(Snapshot),
    Cue(Cue),
}

/// Immutable view of everything the presenter needs to draw a frame
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    /// Pre-game number; `None` outside the countdown
    pub countdown: Option<u32>,
    pub remaining_secs: u32,
    pub time_display: String,
    pub current_word: Option<String>,
    pub hits: u32,
    pub words_typed: u32,
    pub input: String,
    pub input_enabled: bool,
    pub placeholder: String,
    /// Result of the game just finished
    pub result: Option<ScoreRecord>,
    /// Leaderboard at the end of the game
    pub leaderboard: Option<Vec<ScoreRecord>>,
}

impl Snapshot {
    pub fn is_over(&self) -> bool {
        self.phase == Phase::Ended
    }
}
