//! Poll scheduler
//!
//! Runs one incremental fetch per interval for the active conversation. The
//! timer lives in a spawned task owned by a [`PollHandle`]; dropping or
//! stopping the handle cancels the task, so a closed conversation can never
//! leave a timer behind.

use std::future::Future;
use std::time::Duration;

use convo_core::ConversationId;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::backoff::BackoffPolicy;

/// Result of one poll attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The fetch succeeded; `new` messages entered the list
    Applied { new: usize },
    /// A fetch for this conversation was already outstanding
    Skipped,
    /// The conversation was switched away from; nothing was applied
    Stale,
    /// The fetch failed; `consecutive` failures so far
    Failed { consecutive: u32 },
}

impl PollOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// Interval and back-off settings for a poll loop
#[derive(Debug, Clone, Copy)]
pub struct PollScheduler {
    interval: Duration,
    backoff: Option<BackoffPolicy>,
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            backoff: None,
        }
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: Option<BackoffPolicy>) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start ticking for `conversation`.
    ///
    /// The first tick fires one interval from now. `tick` runs one poll and
    /// reports its outcome; the loop ends on its own once a tick reports the
    /// conversation stale. Ticks that come due while `tick` is still running
    /// are skipped rather than queued.
    pub fn start<F, Fut>(self, conversation: ConversationId, mut tick: F) -> PollHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = PollOutcome> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let outcome = tick().await;
                trace!(conversation_id = %conversation, ?outcome, "Poll tick");

                match outcome {
                    PollOutcome::Stale => break,
                    PollOutcome::Failed { consecutive } => {
                        if let Some(policy) = self.backoff {
                            let delay = policy.delay_for_failures(consecutive);
                            debug!(
                                conversation_id = %conversation,
                                consecutive,
                                delay_ms = delay.as_millis() as u64,
                                "Backing off polling"
                            );
                            time::sleep(delay.saturating_sub(self.interval)).await;
                            ticker.reset();
                        }
                    }
                    PollOutcome::Applied { .. } | PollOutcome::Skipped => {}
                }
            }

            debug!(conversation_id = %conversation, "Poll loop finished");
        });

        PollHandle { conversation, task }
    }
}

/// Owned handle to a running poll loop; aborts the loop on drop
#[derive(Debug)]
pub struct PollHandle {
    conversation: ConversationId,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn conversation(&self) -> ConversationId {
        self.conversation
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop now
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
