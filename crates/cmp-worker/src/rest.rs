use crate::job::{ElementJob, Job, MessageJob};
use anyhow::Context;
use url::Url;

/// Platform is the external REST collaborator consumed by the pipeline:
/// a source of comparison jobs and a sink for aggregate statistics.
#[async_trait::async_trait]
pub trait Platform: Send + Sync {
    /// Fetch the next ordered batch of comparison jobs, possibly empty.
    async fn retrieve_jobs(&self) -> anyhow::Result<Vec<Box<dyn Job>>>;

    /// Publish a rendered statistics report.
    async fn post_stats(&self, report: &str) -> anyhow::Result<()>;
}

/// JobDescriptor is the JSON shape served by the job-source endpoint.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum JobDescriptor {
    Elements(ElementJob),
    Message(MessageJob),
}

impl JobDescriptor {
    pub fn into_job(self) -> Box<dyn Job> {
        match self {
            JobDescriptor::Elements(job) => Box::new(job),
            JobDescriptor::Message(job) => Box::new(job),
        }
    }
}

/// ApiClient is the reqwest-backed [`Platform`] implementation.
///
/// No retries here: transient failures surface to the caller, and the
/// collector and reporter loops log and carry on.
pub struct ApiClient {
    http: reqwest::Client,
    api_url: Url,
}

impl ApiClient {
    pub fn new(api_url: Url) -> ApiClient {
        ApiClient {
            http: reqwest::Client::new(),
            api_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url.as_str().trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl Platform for ApiClient {
    async fn retrieve_jobs(&self) -> anyhow::Result<Vec<Box<dyn Job>>> {
        let descriptors: Vec<JobDescriptor> = self
            .http
            .get(self.endpoint("cmp/jobs"))
            .send()
            .await
            .context("failed to reach the job source")?
            .error_for_status()?
            .json()
            .await
            .context("job source returned a malformed batch")?;

        Ok(descriptors
            .into_iter()
            .map(JobDescriptor::into_job)
            .collect())
    }

    async fn post_stats(&self, report: &str) -> anyhow::Result<()> {
        self.http
            .post(self.endpoint("cmp/stats"))
            .json(&report)
            .send()
            .await
            .context("failed to reach the stats sink")?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::JobDescriptor;

    #[test]
    fn test_message_descriptor() {
        let descriptor: JobDescriptor = serde_json::from_str(
            r#"{"id": "case-1", "src": "/a/head.bin", "dst": "/a/base.bin", "out": "/a/report.json"}"#,
        )
        .unwrap();
        assert!(matches!(descriptor, JobDescriptor::Message(_)));
        assert_eq!(descriptor.into_job().describe(), "message case-1");
    }

    #[test]
    fn test_batch_descriptor() {
        let descriptor: JobDescriptor = serde_json::from_str(
            r#"{
                "id": "batch-1",
                "elements": [
                    {"name": "first", "src": "/a/1-head.bin", "dst": "/a/1-base.bin"},
                    {"name": "second", "src": "/a/2-head.bin", "dst": "/a/2-base.bin"}
                ],
                "out": "/a/batch.json"
            }"#,
        )
        .unwrap();
        assert!(matches!(descriptor, JobDescriptor::Elements(_)));
        assert_eq!(descriptor.into_job().describe(), "batch batch-1 (2 elements)");
    }

    #[test]
    fn test_endpoints_tolerate_trailing_slashes() {
        let client = super::ApiClient::new("http://localhost:8081/api/".parse().unwrap());
        assert_eq!(client.endpoint("cmp/jobs"), "http://localhost:8081/api/cmp/jobs");
        let client = super::ApiClient::new("http://localhost:8081/api".parse().unwrap());
        assert_eq!(client.endpoint("cmp/stats"), "http://localhost:8081/api/cmp/stats");
    }
}
