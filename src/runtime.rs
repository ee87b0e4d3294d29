use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// How often the terminal loop wakes to poll the game clocks. The game itself
/// counts whole seconds; this only bounds how late a second is noticed.
pub const TICK_RATE_MS: u64 = 100;

#[derive(Clone, Debug)]
pub enum TermEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// Every producer has gone away; the loop should stop
    Closed,
}

pub trait TermEventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError>;
}

/// Feeds `Tick` into `tx` every `interval` until the receiver is dropped.
pub fn spawn_ticker(tx: Sender<TermEvent>, interval: Duration) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        thread::sleep(interval);
        if tx.send(TermEvent::Tick).is_err() {
            break;
        }
    })
}

/// Keyboard and resize events from crossterm, interleaved with ticks from a
/// separate thread so a held-down key can never starve the game clock.
pub struct CrosstermEventSource {
    rx: Receiver<TermEvent>,
}

impl CrosstermEventSource {
    pub fn new<T: Ticker>(ticker: &T) -> Self {
        let (tx, rx) = mpsc::channel();
        spawn_ticker(tx.clone(), ticker.interval());

        thread::spawn(move || loop {
            let forwarded = match event::read() {
                // Windows reports both press and release; only presses type
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    Some(TermEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => Some(TermEvent::Resize),
                Ok(_) => None,
                Err(e) => {
                    tracing::error!(error = %e, "terminal input failed");
                    let _ = tx.send(TermEvent::Closed);
                    break;
                }
            };
            if let Some(ev) = forwarded {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl TermEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-backed source for headless tests
pub struct TestEventSource {
    rx: Receiver<TermEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TermEvent>) -> Self {
        Self { rx }
    }
}

impl TermEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub struct Runner<E: TermEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: TermEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Next event; a quiet interval yields `Tick`, a dead channel `Closed`.
    pub fn step(&self) -> TermEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => TermEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => TermEvent::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );
        assert_matches!(runner.step(), TermEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(TermEvent::Resize).unwrap();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(10)),
        );
        assert_matches!(runner.step(), TermEvent::Resize);
    }

    #[test]
    fn step_reports_closed_after_sender_dropped() {
        let (tx, rx) = mpsc::channel::<TermEvent>();
        drop(tx);
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::default());
        assert_matches!(runner.step(), TermEvent::Closed);
    }

    #[test]
    fn ticker_thread_interleaves_with_busy_input() {
        let (tx, rx) = mpsc::channel();
        spawn_ticker(tx.clone(), Duration::from_millis(5));
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_secs(5)));

        // A producer that never pauses still lets ticks through
        let typist = thread::spawn(move || {
            for _ in 0..200 {
                if tx.send(TermEvent::Resize).is_err() {
                    break;
                }
                thread::sleep(Duration::from_millis(1));
            }
        });

        let ticks = (0..200)
            .filter(|_| matches!(runner.step(), TermEvent::Tick))
            .count();
        typist.join().unwrap();
        assert!(ticks > 0, "ticks should arrive while input is flowing");
    }

    #[test]
    fn default_ticker_uses_tick_rate() {
        assert_eq!(
            FixedTicker::default().interval(),
            Duration::from_millis(TICK_RATE_MS)
        );
    }
}
