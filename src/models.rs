use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job posting after normalization. Identity is the `id` alone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company_name: String,
    pub main_category: String,
    pub job_type: String,
    pub work_model: String,
    pub seniority_level: String,
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Job {}

/// One entry of the feed's `jobs` array, as sent over the wire.
///
/// Attributes that are absent or `null` read as empty strings. The upstream `id`
/// is kept raw so a numeric or otherwise unusable id can be replaced later.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedEntry {
    pub id: Option<Value>,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub company_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub main_category: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub job_type: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub work_model: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub seniority_level: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl FeedEntry {
    /// The upstream id when it is a non-blank string.
    pub fn usable_id(&self) -> Option<&str> {
        self.id
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn into_job(self, id: JobId) -> Job {
        Job {
            id,
            title: self.title,
            company_name: self.company_name,
            main_category: self.main_category,
            job_type: self.job_type,
            work_model: self.work_model,
            seniority_level: self.seniority_level,
        }
    }
}

#[cfg(test)]
pub fn sample_job(id: &str, title: &str, company: &str) -> Job {
    Job {
        id: JobId::new(id),
        title: title.to_string(),
        company_name: company.to_string(),
        main_category: "Engineering".to_string(),
        job_type: "Full-time".to_string(),
        work_model: "Remote".to_string(),
        seniority_level: "Senior".to_string(),
    }
}
