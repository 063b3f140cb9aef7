use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::info;

use crate::models::{Job, JobId};

/// Saved jobs in the order they were saved, indexed by id.
#[derive(Debug, Default, Clone)]
pub struct SavedJobSet {
    jobs: Vec<Job>,
    index: HashSet<JobId>,
}

impl SavedJobSet {
    pub fn contains(&self, job: &Job) -> bool {
        self.index.contains(&job.id)
    }

    /// Removes the job if it is saved, otherwise appends it.
    /// Returns whether it is saved afterwards.
    pub fn toggle(&mut self, job: &Job) -> bool {
        if self.remove(job) {
            false
        } else {
            self.index.insert(job.id.clone());
            self.jobs.push(job.clone());
            true
        }
    }

    /// Returns whether the job was present.
    pub fn remove(&mut self, job: &Job) -> bool {
        if !self.index.remove(&job.id) {
            return false;
        }
        self.jobs.retain(|saved| saved.id != job.id);
        true
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Shared handle to the session's saved-job set.
///
/// Cloning the handle shares the set; both screens hold one and see each other's mutations.
#[derive(Debug, Clone, Default)]
pub struct SavedJobs {
    inner: Rc<RefCell<SavedJobSet>>,
}

impl SavedJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&self, job: &Job) -> bool {
        let saved = self.inner.borrow_mut().toggle(job);
        info!(id = %job.id, saved, "toggled saved job");
        saved
    }

    pub fn remove(&self, job: &Job) -> bool {
        let removed = self.inner.borrow_mut().remove(job);
        if removed {
            info!(id = %job.id, "removed saved job");
        }
        removed
    }

    pub fn contains(&self, job: &Job) -> bool {
        self.inner.borrow().contains(job)
    }

    pub fn snapshot(&self) -> Vec<Job> {
        self.inner.borrow().jobs().to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    #[cfg(test)]
    pub fn shares_with(&self, other: &SavedJobs) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_job;

    fn ids(set: &SavedJobSet) -> Vec<&str> {
        set.jobs().iter().map(|j| j.id.as_str()).collect()
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut set = SavedJobSet::default();
        let job = sample_job("1", "Rust Engineer", "Acme");

        assert!(set.toggle(&job));
        assert!(set.contains(&job));
        assert!(!set.toggle(&job));
        assert!(!set.contains(&job));
        assert!(set.is_empty());
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let a = sample_job("a", "A", "X");
        let b = sample_job("b", "B", "Y");
        let c = sample_job("c", "C", "Z");

        let mut set = SavedJobSet::default();
        set.toggle(&a);
        set.toggle(&b);
        let before = ids(&set).into_iter().map(String::from).collect::<Vec<_>>();

        for job in [&a, &c] {
            let mut copy = set.clone();
            copy.toggle(job);
            copy.toggle(job);
            assert_eq!(copy.len(), before.len());
            for id in &before {
                assert!(copy.jobs().iter().any(|j| j.id.as_str() == id.as_str()));
            }
        }
    }

    #[test]
    fn test_membership_is_by_id_not_content() {
        let mut set = SavedJobSet::default();
        set.toggle(&sample_job("1", "Rust Engineer", "Acme"));

        assert!(set.contains(&sample_job("1", "Something else", "Other")));
        assert!(!set.contains(&sample_job("2", "Rust Engineer", "Acme")));
    }

    #[test]
    fn test_listing_keeps_insertion_order() {
        let mut set = SavedJobSet::default();
        for id in ["3", "1", "2"] {
            set.toggle(&sample_job(id, "Job", "Co"));
        }
        assert_eq!(ids(&set), vec!["3", "1", "2"]);

        set.remove(&sample_job("1", "Job", "Co"));
        assert_eq!(ids(&set), vec!["3", "2"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut set = SavedJobSet::default();
        set.toggle(&sample_job("1", "Job", "Co"));
        assert!(!set.remove(&sample_job("2", "Job", "Co")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_handles_share_one_set() {
        let catalog_side = SavedJobs::new();
        let saved_side = catalog_side.clone();
        let job = sample_job("1", "Rust Engineer", "Acme");

        catalog_side.toggle(&job);
        assert!(saved_side.contains(&job));
        assert_eq!(saved_side.snapshot().len(), 1);

        saved_side.remove(&job);
        assert!(!catalog_side.contains(&job));
        assert!(catalog_side.shares_with(&saved_side));
        assert!(!catalog_side.shares_with(&SavedJobs::new()));
    }
}
