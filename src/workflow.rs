use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::event::{AppEvent, EventSender, TimerTicket};
use crate::form::{validate, ApplicationDraft, Field, FieldErrors};
use crate::models::Job;
use crate::saved::SavedJobs;

pub const SUCCESS_MESSAGE: &str = "Application submitted successfully!";
pub const DEFAULT_AUTO_CLOSE: Duration = Duration::from_millis(2000);

/// A fire-once delayed `AutoCloseElapsed`. Dropping it cancels the pending fire.
#[derive(Debug)]
pub struct AutoCloseTimer {
    ticket: TimerTicket,
    handle: JoinHandle<()>,
}

impl AutoCloseTimer {
    pub fn schedule(delay: Duration, events: EventSender) -> Self {
        let ticket = TimerTicket::next();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(AppEvent::AutoCloseElapsed(ticket));
        });
        Self { ticket, handle }
    }

    pub fn ticket(&self) -> TimerTicket {
        self.ticket
    }
}

impl Drop for AutoCloseTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Closed,
    /// Form shown for the job, accepting edits and submits.
    Open(Job),
    /// Submitted successfully; feedback is shown until the auto-close fires or the user closes.
    Submitting(Job),
}

/// Drives one apply form: open, edit, validate, submit, auto-close.
#[derive(Debug)]
pub struct ApplicationWorkflow {
    state: WorkflowState,
    draft: ApplicationDraft,
    errors: FieldErrors,
    feedback: String,
    pending_close: Option<AutoCloseTimer>,
    auto_close_delay: Duration,
    events: EventSender,
}

impl ApplicationWorkflow {
    pub fn new(events: EventSender, auto_close_delay: Duration) -> Self {
        Self {
            state: WorkflowState::Closed,
            draft: ApplicationDraft::default(),
            errors: FieldErrors::default(),
            feedback: String::new(),
            pending_close: None,
            auto_close_delay,
            events,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, WorkflowState::Closed)
    }

    pub fn selected_job(&self) -> Option<&Job> {
        match &self.state {
            WorkflowState::Closed => None,
            WorkflowState::Open(job) | WorkflowState::Submitting(job) => Some(job),
        }
    }

    #[cfg(test)]
    pub fn has_pending_close(&self) -> bool {
        self.pending_close.is_some()
    }

    pub fn apply(&mut self, job: Job) {
        info!(id = %job.id, title = %job.title, "opening application form");
        self.reset();
        self.state = WorkflowState::Open(job);
    }

    pub fn edit_field(&mut self, field: Field, value: String) {
        if let WorkflowState::Open(_) = self.state {
            self.draft.set(field, value);
        } else {
            debug!(%field, "ignoring edit outside an open form");
        }
    }

    /// Validates the draft; on success shows feedback and schedules the auto-close.
    pub fn submit(&mut self) -> bool {
        let WorkflowState::Open(job) = &self.state else {
            debug!("ignoring submit outside an open form");
            return false;
        };

        let errors = validate(&self.draft);
        if !errors.is_valid() {
            debug!(id = %job.id, "application failed validation");
            self.errors = errors;
            self.feedback.clear();
            return false;
        }

        let job = job.clone();
        info!(id = %job.id, "application submitted");
        self.draft.clear();
        self.errors.clear();
        self.feedback = SUCCESS_MESSAGE.to_string();

        let timer = AutoCloseTimer::schedule(self.auto_close_delay, self.events.clone());
        debug!(
            ticket = ?timer.ticket(),
            delay_ms = self.auto_close_delay.as_millis() as u64,
            "auto-close scheduled"
        );
        self.pending_close = Some(timer);
        self.state = WorkflowState::Submitting(job);
        true
    }

    pub fn close(&mut self) {
        if let Some(timer) = &self.pending_close {
            debug!(ticket = ?timer.ticket(), "auto-close cancelled by manual close");
        }
        self.reset();
        self.state = WorkflowState::Closed;
    }

    /// Applies a fired auto-close. Returns false for tickets that are no longer pending.
    pub fn handle_auto_close(&mut self, ticket: TimerTicket) -> bool {
        match &self.pending_close {
            Some(timer) if timer.ticket() == ticket => {
                info!("application form auto-closed");
                self.reset();
                self.state = WorkflowState::Closed;
                true
            }
            _ => {
                debug!(?ticket, "ignoring stale auto-close");
                false
            }
        }
    }

    fn reset(&mut self) {
        self.pending_close = None;
        self.draft.clear();
        self.errors.clear();
        self.feedback.clear();
    }
}

/// Confirm-before-remove step of the saved screen.
#[derive(Debug, Default)]
pub struct RemovalFlow {
    pending: Option<Job>,
}

pub const REMOVE_PROMPT: &str = "Are you sure you want to remove this job from your saved list?";

impl RemovalFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&Job> {
        self.pending.as_ref()
    }

    pub fn request(&mut self, job: Job) {
        debug!(id = %job.id, "removal requested");
        self.pending = Some(job);
    }

    pub fn confirm(&mut self, saved: &SavedJobs) -> Option<Job> {
        let job = self.pending.take()?;
        saved.remove(&job);
        info!(id = %job.id, "removal confirmed");
        Some(job)
    }

    pub fn cancel(&mut self) {
        if let Some(job) = self.pending.take() {
            debug!(id = %job.id, "removal cancelled");
        }
    }
}
