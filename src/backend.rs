use crate::config::ClientConfig;
use crate::error::BackendError;
use crate::models::{QuizEnvelope, SubmissionPayload, SubmissionReceipt};
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::debug;

/// Remote collaborator that serves quizzes and accepts results.
pub trait QuizBackend: Send + Sync {
    fn fetch_quiz(&self, quiz_id: &str) -> BoxFuture<'static, Result<QuizEnvelope, BackendError>>;

    fn submit_score(
        &self,
        payload: SubmissionPayload,
    ) -> BoxFuture<'static, Result<SubmissionReceipt, BackendError>>;
}

#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, bearer: Option<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: bearer.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, BackendError> {
        Self::new(
            config.base_url.clone(),
            config.auth_token.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, BackendError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

impl QuizBackend for HttpBackend {
    fn fetch_quiz(&self, quiz_id: &str) -> BoxFuture<'static, Result<QuizEnvelope, BackendError>> {
        let url = format!("{}/quiz/{}", self.base_url, quiz_id);
        let req = self.authorize(self.client.get(&url));
        Box::pin(async move {
            debug!("GET {}", url);
            let resp = req.send().await?;
            read_json(resp).await
        })
    }

    fn submit_score(
        &self,
        payload: SubmissionPayload,
    ) -> BoxFuture<'static, Result<SubmissionReceipt, BackendError>> {
        let url = format!("{}/score/submit", self.base_url);
        let req = self.authorize(self.client.post(&url)).json(&payload);
        Box::pin(async move {
            debug!("POST {} quiz={}", url, payload.quiz_id);
            let resp = req.send().await?;
            let receipt: SubmissionReceipt = read_json(resp).await?;
            if !receipt.success {
                return Err(BackendError::Rejected(
                    receipt.message.unwrap_or_else(|| "submission not accepted".to_string()),
                ));
            }
            Ok(receipt)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_trimmed_and_blank_token_dropped() {
        let backend = HttpBackend::new("http://localhost:3600/api/", Some("  ".into()), Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:3600/api");
        assert!(backend.bearer.is_none());
    }

    #[test]
    fn from_config_carries_token() {
        let config = ClientConfig {
            auth_token: Some("opaque".into()),
            ..ClientConfig::default()
        };
        let backend = HttpBackend::from_config(&config).unwrap();
        assert_eq!(backend.base_url(), crate::config::DEFAULT_API_BASE_URL);
        assert_eq!(backend.bearer.as_deref(), Some("opaque"));
    }
}
