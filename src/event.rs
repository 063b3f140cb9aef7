use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::feed::{FeedClient, FeedError};
use crate::models::Job;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifies one scheduled auto-close so stale firings can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket(u64);

impl TimerTicket {
    pub fn next() -> Self {
        Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }
}

/// Events produced off the UI thread and delivered back to the screens.
#[derive(Debug)]
pub enum AppEvent {
    FeedLoaded(Result<Vec<Job>, FeedError>),
    AutoCloseElapsed(TimerTicket),
}

pub type EventSender = mpsc::UnboundedSender<AppEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Runs one feed fetch in the background and reports the outcome as `FeedLoaded`.
pub fn spawn_fetch(client: Arc<FeedClient>, events: EventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = client.fetch_jobs().await;
        // Receiver gone means the screen was torn down; nothing left to update.
        let _ = events.send(AppEvent::FeedLoaded(result));
    })
}
