//! Simulated streaming disclosure of answer text.
//!
//! No true network streaming happens anywhere in the client: an answer
//! arrives whole and a timer discloses it one character per tick. The state
//! machine lives in [`Reveal`] and is fully synchronous; [`spawn_reveal`]
//! wraps it in a cancellable tokio task that publishes progress frames
//! through a watch channel.

use std::time::Duration;

use askdoc_core::RevealState;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Timing profile for a reveal.
#[derive(Debug, Clone, Copy)]
pub struct RevealConfig {
    /// Delay between character emissions.
    pub tick: Duration,
    /// Restart from empty after completing (welcome banners only, never
    /// real answers).
    pub looping: bool,
    /// Pause before a looping reveal restarts.
    pub restart_pause: Duration,
}

impl RevealConfig {
    /// Profile for live answers.
    #[must_use]
    pub const fn live() -> Self {
        Self {
            tick: Duration::from_millis(30),
            looping: false,
            restart_pause: Duration::ZERO,
        }
    }

    /// Slower, looping profile for idle banner text.
    #[must_use]
    pub const fn banner() -> Self {
        Self {
            tick: Duration::from_millis(70),
            looping: true,
            restart_pause: Duration::from_millis(3000),
        }
    }

    #[must_use]
    pub const fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    #[must_use]
    pub const fn without_loop(mut self) -> Self {
        self.looping = false;
        self
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self::live()
    }
}

/// Per-message reveal state machine: `Pending -> Revealing -> Revealed`.
///
/// Text of N characters reaches `Revealed` after exactly N calls to
/// [`tick`](Self::tick). The transition to `Revealed` happens exactly once
/// per pass and is what unlocks attachment rendering for the owning
/// message.
#[derive(Debug, Clone)]
pub struct Reveal {
    chars: Vec<char>,
    visible: usize,
    state: RevealState,
}

impl Reveal {
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            visible: 0,
            state: RevealState::Pending,
        }
    }

    /// Start emitting. Empty text completes immediately.
    pub fn begin(&mut self) {
        if self.state != RevealState::Pending {
            return;
        }
        self.state = if self.chars.is_empty() {
            RevealState::Revealed
        } else {
            RevealState::Revealing
        };
    }

    /// Disclose the next character, returning it, or `None` once the text
    /// is fully revealed (or emission has not begun).
    pub fn tick(&mut self) -> Option<char> {
        if self.state != RevealState::Revealing {
            return None;
        }
        let ch = self.chars.get(self.visible).copied()?;
        self.visible += 1;
        if self.visible == self.chars.len() {
            self.state = RevealState::Revealed;
        }
        Some(ch)
    }

    /// Replace the underlying text, resetting to `Pending`/empty so partial
    /// old text can never mix with new text.
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.visible = 0;
        self.state = RevealState::Pending;
    }

    /// Restart the same text from empty (looping banner behavior).
    pub fn restart(&mut self) {
        self.visible = 0;
        self.state = RevealState::Pending;
    }

    #[must_use]
    pub fn visible_text(&self) -> String {
        self.chars[..self.visible].iter().collect()
    }

    #[must_use]
    pub const fn state(&self) -> RevealState {
        self.state
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.state, RevealState::Revealed)
    }
}

/// One published step of a running reveal.
#[derive(Debug, Clone)]
pub struct RevealFrame {
    pub visible: String,
    pub state: RevealState,
}

/// Handle to a timer-driven reveal task.
///
/// Each handle owns exactly one timer; dropping or cancelling the handle
/// aborts the task, so a discarded message can never be mutated by an
/// orphaned ticker.
pub struct RevealHandle {
    task: JoinHandle<()>,
    rx: watch::Receiver<RevealFrame>,
}

impl RevealHandle {
    /// Subscribe to reveal progress.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RevealFrame> {
        self.rx.clone()
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Drive a reveal on a timer, publishing a frame per disclosed character.
///
/// Non-looping reveals end the task once `Revealed` is published; looping
/// ones wait `restart_pause` and start over from empty, indefinitely.
#[must_use]
pub fn spawn_reveal(text: String, config: RevealConfig) -> RevealHandle {
    let mut reveal = Reveal::new(&text);
    let (tx, rx) = watch::channel(RevealFrame {
        visible: String::new(),
        state: reveal.state(),
    });

    let task = tokio::spawn(async move {
        loop {
            reveal.begin();
            if tx
                .send(RevealFrame {
                    visible: reveal.visible_text(),
                    state: reveal.state(),
                })
                .is_err()
            {
                return;
            }

            while !reveal.is_complete() {
                tokio::time::sleep(config.tick).await;
                reveal.tick();
                let sent = tx.send(RevealFrame {
                    visible: reveal.visible_text(),
                    state: reveal.state(),
                });
                if sent.is_err() {
                    // Every subscriber is gone; stop ticking.
                    return;
                }
            }

            if !config.looping {
                return;
            }
            tokio::time::sleep(config.restart_pause).await;
            reveal.restart();
        }
    });

    RevealHandle { task, rx }
}
