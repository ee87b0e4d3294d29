use std::time::Instant;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::GameConfig;
use crate::input_matcher::InputMatcher;
use crate::score::ScoreRecord;
use crate::score_store::{KeyValueStore, ScoreStore};
use crate::session::{secs_i32, Phase, Session};
use crate::view::{Cue, GameEvent, Snapshot, GAME_OVER_PLACEHOLDER, PLAYING_PLACEHOLDER};
use crate::word_bank::WordBank;

/// What an input change amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Input is disabled in the current phase
    Ignored,
    /// Buffer updated, no match yet
    Typing,
    /// Current word matched and counted
    Hit,
}

/// Drives one player's game: Idle -> Countdown -> Playing -> Ended.
///
/// Every command and every clock tick settles all state before returning, and
/// queues the resulting notifications for [`SessionMachine::drain_events`].
#[derive(Debug)]
pub struct SessionMachine<S: KeyValueStore> {
    config: GameConfig,
    session: Session,
    bank: WordBank,
    matcher: InputMatcher,
    countdown_clock: Clock,
    game_clock: Clock,
    scores: ScoreStore<S>,
    input: String,
    last_result: Option<ScoreRecord>,
    events: Vec<GameEvent>,
}

impl<S: KeyValueStore> SessionMachine<S> {
    pub fn new(config: GameConfig, scores: ScoreStore<S>) -> Self {
        Self::with_word_bank(config, scores, WordBank::new())
    }

    pub fn with_word_bank(config: GameConfig, scores: ScoreStore<S>, mut bank: WordBank) -> Self {
        bank.reset(&config.dictionary);
        Self {
            session: Session::new(&config),
            matcher: InputMatcher::new(config.normalize_case),
            countdown_clock: Clock::default(),
            game_clock: Clock::default(),
            config,
            bank,
            scores,
            input: String::new(),
            last_result: None,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn word_bank(&self) -> &WordBank {
        &self.bank
    }

    pub fn scores(&self) -> &ScoreStore<S> {
        &self.scores
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn on_start_requested(&mut self, now: Instant) {
        if self.session.phase != Phase::Idle {
            debug!(phase = %self.session.phase, "start ignored");
            return;
        }
        self.begin_countdown(now);
    }

    /// Valid while playing or after the game ended; always goes back through
    /// the countdown.
    pub fn on_restart_requested(&mut self, now: Instant) {
        let was_playing = match self.session.phase {
            Phase::Playing => true,
            Phase::Ended => false,
            phase => {
                debug!(%phase, "restart ignored");
                return;
            }
        };

        self.countdown_clock.stop();
        self.game_clock.stop();
        self.session.reset(&self.config);
        self.input.clear();
        self.last_result = None;
        self.bank.reset(&self.config.dictionary);
        if was_playing {
            self.cue(Cue::StopTheme);
        }
        info!(words = self.bank.remaining(), "restarting");
        self.begin_countdown(now);
    }

    pub fn on_input_changed(&mut self, raw: &str) -> InputOutcome {
        if self.session.phase != Phase::Playing {
            debug!(phase = %self.session.phase, "input ignored");
            return InputOutcome::Ignored;
        }
        self.input = raw.to_string();

        let matched = self
            .session
            .current_word
            .as_deref()
            .is_some_and(|word| self.matcher.is_exact_match(&self.input, word));
        if !matched {
            self.publish();
            return InputOutcome::Typing;
        }

        self.session.register_hit();
        self.input.clear();
        self.cue(Cue::Hit);
        debug!(hits = self.session.correct_hits, "hit");

        match self.bank.draw() {
            Some(next) => {
                self.session.current_word = Some(next);
                self.publish();
            }
            None => {
                info!("word bank exhausted");
                self.end_game();
            }
        }
        InputOutcome::Hit
    }

    /// Whether a delete keystroke may edit the input. Deletion is held back
    /// while the input is still a correct prefix of the current word.
    pub fn on_backspace_attempted(&self) -> bool {
        match (self.session.phase, self.session.current_word.as_deref()) {
            (Phase::Playing, Some(word)) => self.matcher.allows_deletion(&self.input, word),
            _ => false,
        }
    }

    /// Deliver every clock tick that has come due by `now`.
    pub fn advance(&mut self, now: Instant) {
        loop {
            match self.session.phase {
                Phase::Countdown => match self.countdown_clock.take_due(now) {
                    Some(at) => self.on_countdown_tick(at),
                    None => break,
                },
                Phase::Playing => match self.game_clock.take_due(now) {
                    Some(_) => self.on_game_tick(),
                    None => break,
                },
                Phase::Idle | Phase::Ended => break,
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let phase = self.session.phase;
        let remaining_secs = self.session.remaining_game_secs.max(0) as u32;
        let countdown = match phase {
            Phase::Countdown if self.session.remaining_countdown_secs >= 0 => {
                Some(self.session.remaining_countdown_secs as u32)
            }
            _ => None,
        };
        let placeholder = match phase {
            Phase::Playing => PLAYING_PLACEHOLDER,
            Phase::Ended => GAME_OVER_PLACEHOLDER,
            Phase::Idle | Phase::Countdown => "",
        };
        let leaderboard = match phase {
            Phase::Ended => Some(self.scores.all().to_vec()),
            _ => None,
        };

        Snapshot {
            phase,
            countdown,
            remaining_secs,
            time_display: self.config.time_format.format(remaining_secs),
            current_word: self.session.current_word.clone(),
            hits: self.session.correct_hits,
            words_typed: self.session.total_words_typed,
            input: self.input.clone(),
            input_enabled: phase == Phase::Playing,
            placeholder: placeholder.to_string(),
            result: self.last_result.clone(),
            leaderboard,
        }
    }

    fn begin_countdown(&mut self, now: Instant) {
        self.session.phase = Phase::Countdown;
        self.session.remaining_countdown_secs = secs_i32(self.config.countdown_secs);
        self.countdown_clock.start(now);
        info!(secs = self.config.countdown_secs, "countdown started");
        self.cue(Cue::Beginning);
        self.publish();
    }

    fn on_countdown_tick(&mut self, at: Instant) {
        self.session.remaining_countdown_secs -= 1;
        if self.session.remaining_countdown_secs >= 0 {
            self.publish();
        } else {
            self.countdown_clock.stop();
            self.enter_playing(at);
        }
    }

    fn enter_playing(&mut self, at: Instant) {
        self.session.phase = Phase::Playing;
        self.session.current_word = self.bank.draw();
        if self.session.current_word.is_none() {
            warn!("no words to play, ending immediately");
            self.end_game();
            return;
        }

        self.session.remaining_game_secs = secs_i32(self.config.session_duration_secs);
        self.game_clock.start(at);
        info!(
            secs = self.config.session_duration_secs,
            words = self.bank.remaining() + 1,
            "playing"
        );
        self.cue(Cue::Theme { looping: true });
        self.publish();
    }

    fn on_game_tick(&mut self) {
        self.session.remaining_game_secs -= 1;
        if self.session.remaining_game_secs <= 0 {
            self.game_clock.stop();
            info!("time is up");
            self.end_game();
        } else {
            self.publish();
        }
    }

    fn end_game(&mut self) {
        if self.session.phase == Phase::Ended {
            return;
        }
        self.session.phase = Phase::Ended;
        self.game_clock.stop();
        self.countdown_clock.stop();
        self.session.current_word = None;
        self.input.clear();

        let record = ScoreRecord::now(self.session.correct_hits, self.session.total_words_typed);
        info!(
            hits = record.hits,
            accuracy = record.accuracy_percent,
            "game over"
        );
        if let Err(e) = self.scores.record(record.clone()) {
            warn!(error = %e, "failed to persist leaderboard");
        }
        self.last_result = Some(record);

        self.cue(Cue::StopTheme);
        self.cue(Cue::TimesUp);
        self.publish();
    }

    fn cue(&mut self, cue: Cue) {
        self.events.push(GameEvent::Cue(cue));
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        self.events.push(GameEvent::StateChanged(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score_store::MemoryStore;
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn machine(words: &[&str], duration: u32) -> SessionMachine<MemoryStore> {
        let config = GameConfig {
            session_duration_secs: duration,
            dictionary: words.iter().map(|w| w.to_string()).collect(),
            ..GameConfig::default()
        };
        SessionMachine::with_word_bank(
            config,
            ScoreStore::open(MemoryStore::new(), 10),
            WordBank::seeded(3),
        )
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn snapshots(events: &[GameEvent]) -> Vec<&Snapshot> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::StateChanged(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    fn cues(events: &[GameEvent]) -> Vec<Cue> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Cue(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_starts_idle_with_full_bank() {
        let m = machine(&["cat", "dog", "cow"], 40);
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.word_bank().remaining(), 3);
        let snap = m.snapshot();
        assert!(!snap.input_enabled);
        assert_eq!(snap.current_word, None);
        assert_eq!(snap.countdown, None);
    }

    #[test]
    fn test_countdown_shows_three_to_zero_then_plays() {
        let t0 = Instant::now();
        let mut m = machine(&["cat", "dog"], 40);
        m.on_start_requested(t0);
        assert_eq!(m.phase(), Phase::Countdown);

        let mut shown = vec![m.snapshot().countdown];
        for n in 1..=3 {
            m.advance(t0 + secs(n));
            shown.push(m.snapshot().countdown);
        }
        assert_eq!(shown, vec![Some(3), Some(2), Some(1), Some(0)]);
        assert_eq!(m.phase(), Phase::Countdown);

        m.advance(t0 + secs(4));
        assert_eq!(m.phase(), Phase::Playing);
        let snap = m.snapshot();
        assert_eq!(snap.countdown, None);
        assert!(snap.input_enabled);
        assert_eq!(snap.placeholder, PLAYING_PLACEHOLDER);
        assert!(snap.current_word.is_some());
        assert_eq!(snap.remaining_secs, 40);
    }

    #[test]
    fn test_start_emits_beginning_and_theme_cues() {
        let t0 = Instant::now();
        let mut m = machine(&["cat"], 40);
        m.on_start_requested(t0);
        assert_eq!(cues(&m.drain_events()), vec![Cue::Beginning]);

        m.advance(t0 + secs(4));
        assert_eq!(cues(&m.drain_events()), vec![Cue::Theme { looping: true }]);
    }

    #[test]
    fn test_start_twice_is_ignored() {
        let t0 = Instant::now();
        let mut m = machine(&["cat"], 40);
        m.on_start_requested(t0);
        m.advance(t0 + secs(2));
        m.on_start_requested(t0 + secs(2));
        assert_eq!(m.session().remaining_countdown_secs, 1);
    }

    #[test]
    fn test_late_poll_catches_up_through_countdown_into_game() {
        let t0 = Instant::now();
        let mut m = machine(&["cat", "dog"], 40);
        m.on_start_requested(t0);

        // Playing starts at t0+4s, so by t0+10s six game ticks have elapsed
        m.advance(t0 + secs(10));
        assert_eq!(m.phase(), Phase::Playing);
        assert_eq!(m.session().remaining_game_secs, 34);
    }

    #[test]
    fn test_hit_advances_to_next_word() {
        let t0 = Instant::now();
        let mut m = machine(&["cat", "dog", "cow"], 40);
        m.on_start_requested(t0);
        m.advance(t0 + secs(4));
        m.drain_events();

        let word = m.session().current_word.clone().unwrap();
        assert_eq!(m.on_input_changed(&word), InputOutcome::Hit);

        let snap = m.snapshot();
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.words_typed, 1);
        assert_eq!(snap.input, "");
        assert_ne!(snap.current_word.as_deref(), Some(word.as_str()));
        assert!(cues(&m.drain_events()).contains(&Cue::Hit));
    }

    #[test]
    fn test_partial_input_is_buffered() {
        let t0 = Instant::now();
        let mut m = machine(&["pineapple"], 40);
        m.on_start_requested(t0);
        m.advance(t0 + secs(4));

        assert_eq!(m.on_input_changed("pine"), InputOutcome::Typing);
        assert_eq!(m.input(), "pine");
        assert_eq!(m.session().correct_hits, 0);
        assert!(!m.on_backspace_attempted());

        m.on_input_changed("pinx");
        assert!(m.on_backspace_attempted());
    }

    #[test]
    fn test_input_ignored_outside_playing() {
        let t0 = Instant::now();
        let mut m = machine(&["cat"], 40);
        assert_eq!(m.on_input_changed("cat"), InputOutcome::Ignored);
        m.on_start_requested(t0);
        assert_eq!(m.on_input_changed("cat"), InputOutcome::Ignored);
        assert!(!m.on_backspace_attempted());
        assert_eq!(m.input(), "");
    }

    #[test]
    fn test_exhaustion_ends_before_timer() {
        let t0 = Instant::now();
        let mut m = machine(&["cat", "dog"], 40);
        m.on_start_requested(t0);
        m.advance(t0 + secs(4));

        for _ in 0..2 {
            let word = m.session().current_word.clone().unwrap();
            m.on_input_changed(&word);
        }

        assert_eq!(m.phase(), Phase::Ended);
        assert_eq!(m.session().remaining_game_secs, 40);
        let snap = m.snapshot();
        assert_eq!(snap.hits, 2);
        assert_eq!(snap.words_typed, 2);
        assert_matches!(snap.result, Some(ref r) if r.accuracy_percent == 100.0 && r.hits == 2);
        assert_eq!(snap.placeholder, GAME_OVER_PLACEHOLDER);
        assert!(!snap.input_enabled);
        assert_eq!(m.scores().all().len(), 1);
    }

    #[test]
    fn test_timeout_with_no_hits_scores_zero() {
        let t0 = Instant::now();
        let mut m = machine(&["cat", "dog"], 5);
        m.on_start_requested(t0);
        m.advance(t0 + secs(4));
        m.advance(t0 + secs(8));
        assert_eq!(m.phase(), Phase::Playing);
        assert_eq!(m.snapshot().time_display, "0:01");

        m.advance(t0 + secs(9));
        assert_eq!(m.phase(), Phase::Ended);
        let result = m.snapshot().result.unwrap();
        assert_eq!(result.hits, 0);
        assert_eq!(result.accuracy_percent, 0.0);
        assert!(!result.accuracy_percent.is_nan());
    }

    #[test]
    fn test_huge_duration_does_not_end_on_first_tick() {
        let t0 = Instant::now();
        let mut m = machine(&["cat", "dog"], u32::MAX);
        m.on_start_requested(t0);
        m.advance(t0 + secs(4));
        assert_eq!(m.phase(), Phase::Playing);
        assert_eq!(m.session().remaining_game_secs, i32::MAX);

        m.advance(t0 + secs(5));
        assert_eq!(m.phase(), Phase::Playing);
        assert_eq!(m.session().remaining_game_secs, i32::MAX - 1);
    }

    #[test]
    fn test_end_runs_once() {
        let t0 = Instant::now();
        let mut m = machine(&["cat"], 2);
        m.on_start_requested(t0);
        m.advance(t0 + secs(4));
        m.advance(t0 + secs(60));
        m.advance(t0 + secs(120));
        m.on_input_changed("cat");

        assert_eq!(m.scores().all().len(), 1);
        let ended = m
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::Cue(Cue::TimesUp))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_ended_snapshot_carries_leaderboard() {
        let t0 = Instant::now();
        let mut m = machine(&["cat"], 40);
        m.on_start_requested(t0);
        m.advance(t0 + secs(4));
        m.drain_events();
        m.on_input_changed("cat");

        let events = m.drain_events();
        let last = snapshots(&events).pop().cloned().unwrap();
        assert!(last.is_over());
        assert_eq!(last.leaderboard.map(|b| b.len()), Some(1));
        assert_eq!(
            cues(&events),
            vec![Cue::Hit, Cue::StopTheme, Cue::TimesUp]
        );
    }

    #[test]
    fn test_restart_from_ended_refills_and_counts_down() {
        let t0 = Instant::now();
        let mut m = machine(&["cat", "dog"], 40);
        m.on_start_requested(t0);
        m.advance(t0 + secs(4));
        let word = m.session().current_word.clone().unwrap();
        m.on_input_changed(&word);
        let word = m.session().current_word.clone().unwrap();
        m.on_input_changed(&word);
        assert_eq!(m.phase(), Phase::Ended);

        m.on_restart_requested(t0 + secs(20));
        assert_eq!(m.phase(), Phase::Countdown);
        assert_eq!(m.session().correct_hits, 0);
        assert_eq!(m.session().total_words_typed, 0);
        assert_eq!(m.word_bank().remaining(), 2);
        assert_eq!(m.snapshot().countdown, Some(3));
        assert_eq!(m.snapshot().result, None);
    }

    #[test]
    fn test_restart_mid_game_stops_old_timer() {
        let t0 = Instant::now();
        let mut m = machine(&["cat", "dog", "cow"], 10);
        m.on_start_requested(t0);
        m.advance(t0 + secs(7));
        assert_eq!(m.session().remaining_game_secs, 7);

        m.on_restart_requested(t0 + secs(7));
        assert!(cues(&m.drain_events()).contains(&Cue::StopTheme));

        // New countdown from t0+7s, game from t0+11s; only one timer runs
        m.advance(t0 + secs(11));
        assert_eq!(m.phase(), Phase::Playing);
        assert_eq!(m.session().remaining_game_secs, 10);
        m.advance(t0 + secs(14));
        assert_eq!(m.session().remaining_game_secs, 7);
    }

    #[test]
    fn test_restart_ignored_when_idle_or_counting_down() {
        let t0 = Instant::now();
        let mut m = machine(&["cat"], 40);
        m.on_restart_requested(t0);
        assert_eq!(m.phase(), Phase::Idle);

        m.on_start_requested(t0);
        m.advance(t0 + secs(1));
        m.on_restart_requested(t0 + secs(1));
        assert_eq!(m.session().remaining_countdown_secs, 2);
    }

    #[test]
    fn test_empty_dictionary_ends_on_entry() {
        let t0 = Instant::now();
        let mut m = machine(&[], 40);
        m.on_start_requested(t0);
        m.advance(t0 + secs(4));
        assert_eq!(m.phase(), Phase::Ended);
        assert_eq!(m.snapshot().result.unwrap().accuracy_percent, 0.0);
    }

    #[test]
    fn test_seconds_time_format() {
        let t0 = Instant::now();
        let config = GameConfig {
            time_format: crate::config::TimeFormat::Seconds,
            dictionary: vec!["cat".into()],
            ..GameConfig::default()
        };
        let mut m = SessionMachine::with_word_bank(
            config,
            ScoreStore::open(MemoryStore::new(), 10),
            WordBank::seeded(1),
        );
        m.on_start_requested(t0);
        m.advance(t0 + secs(4));
        assert_eq!(m.snapshot().time_display, "32");
    }

    #[test]
    fn test_hits_never_exceed_typed() {
        let t0 = Instant::now();
        let words = ["dinosaur", "love", "robot", "dream", "money"];
        let mut m = machine(&words, 40);
        m.on_start_requested(t0);
        m.advance(t0 + secs(4));

        for step in 0..20 {
            let word = match m.session().current_word.clone() {
                Some(w) => w,
                None => break,
            };
            if step % 3 == 0 {
                m.on_input_changed("zz");
            } else {
                m.on_input_changed(&word);
            }
            let s = m.session();
            assert!(s.correct_hits <= s.total_words_typed);
        }
    }
}
