//! Timeline playback: step through the dataset's years on a fixed interval.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Stopped,
}

struct Ticker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct TimelinePlayer {
    years: Vec<i32>,
    interval: Duration,
    position: Arc<AtomicUsize>,
    ticker: Option<Ticker>,
}

impl TimelinePlayer {
    pub fn new(years: Vec<i32>, interval: Duration) -> Self {
        TimelinePlayer {
            years,
            interval,
            position: Arc::new(AtomicUsize::new(0)),
            ticker: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn current_year(&self) -> Option<i32> {
        self.years.get(self.position.load(Ordering::SeqCst)).copied()
    }

    /// Start from the first year, or stop if already playing. The first
    /// frame is delivered before this returns; later frames arrive on the
    /// ticker thread, wrapping around after the last year.
    pub fn toggle<F>(&mut self, mut on_frame: F) -> PlayState
    where
        F: FnMut(i32) + Send + 'static,
    {
        if self.is_playing() {
            self.stop();
            return PlayState::Stopped;
        }
        let Some(&first) = self.years.first() else {
            return PlayState::Stopped;
        };

        self.position.store(0, Ordering::SeqCst);
        on_frame(first);

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let years = self.years.clone();
        let position = Arc::clone(&self.position);
        let interval = self.interval;
        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    on_frame(years[advance(&position, years.len())]);
                }
                // stop requested or the player went away
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        debug!(years = self.years.len(), interval_ms = interval.as_millis() as u64, "Playback started");
        self.ticker = Some(Ticker { stop_tx, handle });
        PlayState::Playing
    }

    /// Stop the ticker. Calling it when nothing is playing does nothing.
    pub fn stop(&mut self) {
        if let Some(t) = self.ticker.take() {
            let _ = t.stop_tx.send(());
            let _ = t.handle.join();
            debug!("Playback stopped");
        }
    }

    /// Rewind to the first year and report it. Playback, if running, carries
    /// on from there.
    pub fn reset(&mut self, on_frame: impl FnOnce(i32)) {
        self.position.store(0, Ordering::SeqCst);
        if let Some(&first) = self.years.first() {
            on_frame(first);
        }
    }
}

/// Step the shared position by one, wrapping at `len`, in a single atomic
/// update so a concurrent `reset` is never overwritten. Returns the new index.
fn advance(position: &AtomicUsize, len: usize) -> usize {
    let step = |p: usize| (p + 1) % len;
    match position.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |p| Some(step(p))) {
        Ok(prev) | Err(prev) => step(prev),
    }
}

impl Drop for TimelinePlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(5);
    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn plays_in_order_and_wraps() {
        let (tx, rx) = mpsc::channel();
        let mut player = TimelinePlayer::new(vec![2017, 2018, 2019], TICK);
        assert_eq!(player.toggle(move |y| { let _ = tx.send(y); }), PlayState::Playing);
        let frames: Vec<i32> = (0..4).map(|_| rx.recv_timeout(WAIT).unwrap()).collect();
        assert_eq!(frames, vec![2017, 2018, 2019, 2017]);
        player.stop();
        assert!(!player.is_playing());
    }

    #[test]
    fn toggle_while_playing_stops_instead_of_doubling() {
        let (tx, rx) = mpsc::channel();
        let tx2 = tx.clone();
        let mut player = TimelinePlayer::new(vec![2023, 2024], TICK);
        player.toggle(move |y| { let _ = tx.send(y); });
        assert_eq!(player.toggle(move |y| { let _ = tx2.send(y); }), PlayState::Stopped);
        assert!(!player.is_playing());
        // the ticker thread has been joined, so nothing arrives after the drain
        while rx.try_recv().is_ok() {}
        thread::sleep(TICK * 4);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut player = TimelinePlayer::new(vec![2024], TICK);
        player.stop();
        player.toggle(|_| {});
        player.stop();
        player.stop();
        assert!(!player.is_playing());
    }

    #[test]
    fn empty_timeline_never_starts() {
        let mut player = TimelinePlayer::new(Vec::new(), TICK);
        assert_eq!(player.toggle(|_| panic!("no frames expected")), PlayState::Stopped);
        assert_eq!(player.current_year(), None);
    }

    #[test]
    fn advance_wraps_and_follows_reset() {
        let position = AtomicUsize::new(0);
        assert_eq!(advance(&position, 3), 1);
        assert_eq!(advance(&position, 3), 2);
        assert_eq!(advance(&position, 3), 0);
        position.store(2, Ordering::SeqCst);
        // a reset lands between ticks
        position.store(0, Ordering::SeqCst);
        assert_eq!(advance(&position, 3), 1);
        assert_eq!(position.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn advance_is_atomic_across_threads() {
        let position = Arc::new(AtomicUsize::new(0));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let p = Arc::clone(&position);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        advance(&p, 7);
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        // 4000 steps mod 7, none lost
        assert_eq!(position.load(Ordering::SeqCst), 4000 % 7);
    }

    #[test]
    fn reset_reports_first_year() {
        let mut player = TimelinePlayer::new(vec![2020, 2021], Duration::from_secs(60));
        let mut seen = None;
        player.reset(|y| seen = Some(y));
        assert_eq!(seen, Some(2020));
        assert_eq!(player.current_year(), Some(2020));
    }
}
