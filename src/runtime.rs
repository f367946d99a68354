use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Default cadence of snapshot polling while a workout runs.
pub const POLL_INTERVAL_MS: u64 = 500;

/// Smallest accepted poll period; tokio rejects a zero interval.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// The periodic synchronization handle. At most one interval exists at a
/// time; cancelling an inactive timer is a no-op.
#[derive(Debug)]
pub struct PollTimer {
    period: Duration,
    interval: Option<Interval>,
}

impl PollTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// (Re)arms the timer. Any previous interval is dropped first. The first
    /// tick fires one period from now.
    pub fn start(&mut self) {
        self.cancel();
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        // A slow poll delays the next one rather than bursting to catch up.
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
    }

    /// Returns whether a timer was active.
    pub fn cancel(&mut self) -> bool {
        self.interval.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    /// Resolves at the next tick; never resolves while cancelled.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

/// Terminal input consumed by the binary's loop.
#[derive(Clone, Debug)]
pub enum TerminalEvent {
    Key(KeyEvent),
    Resize,
}

/// Reads crossterm events on a dedicated thread and hands them to the async
/// loop.
pub struct CrosstermEventSource {
    rx: UnboundedReceiver<TerminalEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => tx.send(TerminalEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => tx.send(TerminalEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }

    pub fn from_receiver(rx: UnboundedReceiver<TerminalEvent>) -> Self {
        Self { rx }
    }

    /// `None` once the reader thread has gone away.
    pub async fn next(&mut self) -> Option<TerminalEvent> {
        self.rx.recv().await
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let mut timer = PollTimer::new(Duration::from_millis(500));
        let started = Instant::now();
        timer.start();
        timer.tick().await;
        assert_eq!(started.elapsed(), Duration::from_millis(500));
        timer.tick().await;
        assert_eq!(started.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_ticks() {
        let mut timer = PollTimer::new(Duration::from_millis(10));
        assert!(!timer.cancel());
        timer.start();
        assert!(timer.is_active());
        assert!(timer.cancel());
        assert!(!timer.is_active());

        let fired = tokio::time::timeout(Duration::from_secs(5), timer.tick()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_interval() {
        let mut timer = PollTimer::new(Duration::from_millis(500));
        timer.start();
        tokio::time::sleep(Duration::from_millis(400)).await;
        timer.start();
        let restarted = Instant::now();
        timer.tick().await;
        assert_eq!(restarted.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_clamped() {
        let mut timer = PollTimer::new(Duration::ZERO);
        assert_eq!(timer.period(), Duration::from_millis(1));
        let started = Instant::now();
        timer.start();
        timer.tick().await;
        assert_eq!(started.elapsed(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn event_source_passes_through_events() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut source = CrosstermEventSource::from_receiver(rx);
        tx.send(TerminalEvent::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )))
        .unwrap();
        drop(tx);

        match source.next().await {
            Some(TerminalEvent::Key(key)) => assert_eq!(key.code, KeyCode::Enter),
            other => panic!("expected key event, got {other:?}"),
        }
        assert!(source.next().await.is_none());
    }
}
