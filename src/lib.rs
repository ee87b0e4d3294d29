// Library surface for headless/integration tests and reuse.
// The terminal presenter lives in main.rs and only talks to the core through
// SessionMachine commands, snapshots and events.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod dictionary;
pub mod input_matcher;
pub mod logging;
pub mod runtime;
pub mod score;
pub mod score_store;
pub mod session;
pub mod state_machine;
pub mod util;
pub mod view;
pub mod word_bank;

pub use config::{GameConfig, TimeFormat};
pub use score::ScoreRecord;
pub use score_store::{FileStore, KeyValueStore, MemoryStore, ScoreStore};
pub use session::{Phase, Session};
pub use state_machine::{InputOutcome, SessionMachine};
pub use view::{Cue, GameEvent, Snapshot};
