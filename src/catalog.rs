use tracing::{info, warn};

use crate::feed::FeedError;
use crate::models::Job;

/// The full job list for the session plus the fetch-in-flight flag.
#[derive(Debug, Default)]
pub struct JobCatalog {
    jobs: Vec<Job>,
    loading: bool,
    notice: Option<&'static str>,
}

impl JobCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, jobs: Vec<Job>) {
        info!(count = jobs.len(), "catalog loaded");
        self.jobs = jobs;
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// User-facing notice left by the last failed fetch, if any.
    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.notice = None;
    }

    /// Leaves the fetch-in-flight state and applies the outcome.
    ///
    /// A malformed feed empties the catalog; a network failure keeps whatever was loaded before.
    pub fn finish_fetch(&mut self, result: Result<Vec<Job>, FeedError>) {
        self.loading = false;
        match result {
            Ok(jobs) => self.load(jobs),
            Err(err) => {
                warn!(error = %err, "job fetch failed");
                if matches!(err, FeedError::Shape(_)) {
                    self.jobs.clear();
                }
                self.notice = Some(err.notice());
            }
        }
    }

    /// Jobs whose title or company contains `term`, case-insensitively, in catalog order.
    pub fn filter(&self, term: &str) -> Vec<Job> {
        filter_jobs(&self.jobs, term)
    }
}

pub fn filter_jobs(jobs: &[Job], term: &str) -> Vec<Job> {
    if term.is_empty() {
        return jobs.to_vec();
    }
    let needle = term.to_lowercase();
    jobs.iter()
        .filter(|job| {
            job.title.to_lowercase().contains(&needle)
                || job.company_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_job;

    fn catalog() -> JobCatalog {
        let mut catalog = JobCatalog::new();
        catalog.load(vec![
            sample_job("1", "Senior Rust Engineer", "Acme"),
            sample_job("2", "Product Designer", "Rustic Labs"),
            sample_job("3", "Data Analyst", "Globex"),
            sample_job("4", "Backend Engineer", "Initech"),
        ]);
        catalog
    }

    fn ids(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(|j| j.id.as_str()).collect()
    }

    #[test]
    fn test_empty_term_returns_full_catalog() {
        let catalog = catalog();
        assert_eq!(catalog.filter(""), catalog.jobs().to_vec());
    }

    #[test]
    fn test_filter_matches_title_or_company_case_insensitive() {
        let catalog = catalog();
        assert_eq!(ids(&catalog.filter("RUST")), vec!["1", "2"]);
        assert_eq!(ids(&catalog.filter("engineer")), vec!["1", "4"]);
        assert_eq!(ids(&catalog.filter("globex")), vec!["3"]);
        assert!(catalog.filter("plumber").is_empty());
    }

    #[test]
    fn test_refiltering_never_widens() {
        let catalog = catalog();
        for term in ["e", "eng", "rust", "zzz", ""] {
            let once = catalog.filter(term);
            let twice = filter_jobs(&once, term);
            assert_eq!(ids(&once), ids(&twice));
        }
    }

    #[test]
    fn test_filter_does_not_mutate_catalog() {
        let catalog = catalog();
        let _ = catalog.filter("designer");
        assert_eq!(catalog.jobs().len(), 4);
    }

    #[test]
    fn test_load_replaces_catalog() {
        let mut catalog = catalog();
        catalog.load(vec![sample_job("9", "Chef", "Diner")]);
        assert_eq!(ids(&catalog.filter("")), vec!["9"]);
    }

    #[test]
    fn test_fetch_lifecycle_and_loading_flag() {
        let mut catalog = JobCatalog::new();
        assert!(!catalog.is_loading());

        catalog.begin_fetch();
        assert!(catalog.is_loading());
        assert!(catalog.jobs().is_empty());

        catalog.finish_fetch(Ok(vec![sample_job("1", "Rust Engineer", "Acme")]));
        assert!(!catalog.is_loading());
        assert_eq!(catalog.jobs().len(), 1);
        assert!(catalog.notice().is_none());
    }

    #[test]
    fn test_network_error_keeps_prior_jobs() {
        let mut catalog = catalog();
        catalog.begin_fetch();
        catalog.finish_fetch(Err(FeedError::Network("timeout".into())));
        assert_eq!(catalog.jobs().len(), 4);
        assert_eq!(catalog.notice(), Some("Failed to fetch jobs."));
        assert!(!catalog.is_loading());
    }

    #[test]
    fn test_shape_error_leaves_catalog_empty() {
        let mut catalog = catalog();
        catalog.begin_fetch();
        catalog.finish_fetch(Err(FeedError::Shape("missing `jobs` field".into())));
        assert!(catalog.jobs().is_empty());
        assert_eq!(catalog.notice(), Some("No jobs found in the response."));
    }
}
