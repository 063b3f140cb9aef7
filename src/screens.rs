use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::catalog::JobCatalog;
use crate::event::{self, AppEvent, EventSender};
use crate::feed::FeedClient;
use crate::form::Field;
use crate::models::Job;
use crate::saved::SavedJobs;
use crate::workflow::{ApplicationWorkflow, RemovalFlow};

/// User intents emitted by the presentation layer.
#[derive(Debug, Clone)]
pub enum Intent {
    SearchTextChanged(String),
    ApplyPressed(Job),
    SavePressed(Job),
    RemovePressed(Job),
    FieldChanged(Field, String),
    SubmitPressed,
    ClosePressed,
    ConfirmRemovalPressed,
    CancelRemovalPressed,
}

/// "Available Jobs": the searchable catalog with bookmark toggles and an apply form.
pub struct CatalogScreen {
    catalog: JobCatalog,
    search_term: String,
    saved: SavedJobs,
    workflow: ApplicationWorkflow,
    events: EventSender,
    auto_close_delay: Duration,
    mounted: bool,
}

impl CatalogScreen {
    pub fn new(saved: SavedJobs, events: EventSender, auto_close_delay: Duration) -> Self {
        Self {
            catalog: JobCatalog::new(),
            search_term: String::new(),
            saved,
            workflow: ApplicationWorkflow::new(events.clone(), auto_close_delay),
            events,
            auto_close_delay,
            mounted: false,
        }
    }

    /// Starts the one feed fetch for this screen. Later calls do nothing.
    pub fn mount(&mut self, client: Arc<FeedClient>) {
        if self.mounted {
            debug!("catalog already mounted, not refetching");
            return;
        }
        self.mounted = true;
        self.catalog.begin_fetch();
        event::spawn_fetch(client, self.events.clone());
    }

    pub fn catalog(&self) -> &JobCatalog {
        &self.catalog
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_loading(&self) -> bool {
        self.catalog.is_loading()
    }

    /// The filtered view, recomputed from the catalog on every call.
    pub fn visible_jobs(&self) -> Vec<Job> {
        self.catalog.filter(&self.search_term)
    }

    pub fn is_saved(&self, job: &Job) -> bool {
        self.saved.contains(job)
    }

    pub fn saved(&self) -> &SavedJobs {
        &self.saved
    }

    pub fn workflow(&self) -> &ApplicationWorkflow {
        &self.workflow
    }

    /// Builds the saved screen on the same shared set.
    pub fn open_saved_screen(&self) -> SavedScreen {
        SavedScreen::new(self.saved.clone(), self.events.clone(), self.auto_close_delay)
    }

    pub fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::SearchTextChanged(text) => self.search_term = text,
            Intent::SavePressed(job) => {
                self.saved.toggle(&job);
            }
            Intent::ApplyPressed(job) => self.workflow.apply(job),
            Intent::FieldChanged(field, value) => self.workflow.edit_field(field, value),
            Intent::SubmitPressed => {
                self.workflow.submit();
            }
            Intent::ClosePressed => self.workflow.close(),
            other => debug!(intent = ?other, "intent not handled by catalog screen"),
        }
    }

    /// Applies an event addressed to this screen. Returns the event when it belongs elsewhere.
    pub fn handle_event(&mut self, event: AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::FeedLoaded(result) => {
                // A fresh catalog starts unfiltered.
                if result.is_ok() {
                    self.search_term.clear();
                }
                self.catalog.finish_fetch(result);
                None
            }
            AppEvent::AutoCloseElapsed(ticket) if self.workflow.handle_auto_close(ticket) => None,
            other => Some(other),
        }
    }
}

/// "Saved Jobs": the shared saved set with apply and confirm-to-remove.
pub struct SavedScreen {
    saved: SavedJobs,
    workflow: ApplicationWorkflow,
    removal: RemovalFlow,
}

pub const EMPTY_SAVED_NOTICE: &str = "No saved jobs yet.";

impl SavedScreen {
    pub fn new(saved: SavedJobs, events: EventSender, auto_close_delay: Duration) -> Self {
        Self {
            saved,
            workflow: ApplicationWorkflow::new(events, auto_close_delay),
            removal: RemovalFlow::new(),
        }
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.saved.snapshot()
    }

    pub fn saved(&self) -> &SavedJobs {
        &self.saved
    }

    pub fn workflow(&self) -> &ApplicationWorkflow {
        &self.workflow
    }

    pub fn pending_removal(&self) -> Option<&Job> {
        self.removal.pending()
    }

    pub fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::RemovePressed(job) => self.removal.request(job),
            Intent::ConfirmRemovalPressed => {
                self.removal.confirm(&self.saved);
            }
            Intent::CancelRemovalPressed => self.removal.cancel(),
            Intent::ApplyPressed(job) => self.workflow.apply(job),
            Intent::FieldChanged(field, value) => self.workflow.edit_field(field, value),
            Intent::SubmitPressed => {
                self.workflow.submit();
            }
            Intent::ClosePressed => self.workflow.close(),
            other => debug!(intent = ?other, "intent not handled by saved screen"),
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::AutoCloseElapsed(ticket) if self.workflow.handle_auto_close(ticket) => None,
            other => Some(other),
        }
    }
}
