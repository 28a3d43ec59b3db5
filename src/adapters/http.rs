use crate::domain::model::{Assessment, AssessmentUpdate};
use crate::domain::ports::{AssessmentService, ConfigProvider};
use crate::utils::error::{BuilderError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use std::time::Duration;
use url::Url;

/// REST client for the tenant assessment API.
///
/// Routes are `{base}/tenants/{tenant}/assessments/{id}` with `GET` to load,
/// `PATCH` to update, and `POST .../publish` or `.../unpublish` for status
/// transitions.
#[derive(Debug, Clone)]
pub struct RestAssessmentService {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl RestAssessmentService {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| BuilderError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BuilderError::InvalidConfigValueError {
                field: "api.base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url,
            auth_token: None,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .build()?;
        let service = Self::with_client(client, config.api_base_url())?;
        Ok(match config.auth_token() {
            Some(token) => service.with_auth_token(token),
            None => service,
        })
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn assessment_url(&self, tenant_id: &str, assessment_id: &str, action: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["tenants", tenant_id, "assessments", assessment_id]);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(BuilderError::ApiStatusError {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AssessmentService for RestAssessmentService {
    async fn get(&self, tenant_id: &str, assessment_id: &str) -> Result<Assessment> {
        let url = self.assessment_url(tenant_id, assessment_id, None);
        tracing::debug!("Loading assessment from: {}", url);

        let response = self.send(self.request(Method::GET, url)).await?;
        Ok(response.json().await?)
    }

    async fn update(
        &self,
        tenant_id: &str,
        assessment_id: &str,
        update: AssessmentUpdate,
    ) -> Result<Assessment> {
        let url = self.assessment_url(tenant_id, assessment_id, None);
        tracing::debug!("Updating assessment at: {}", url);

        let response = self
            .send(self.request(Method::PATCH, url).json(&update))
            .await?;
        Ok(response.json().await?)
    }

    async fn publish(&self, tenant_id: &str, assessment_id: &str) -> Result<()> {
        let url = self.assessment_url(tenant_id, assessment_id, Some("publish"));
        self.send(self.request(Method::POST, url)).await?;
        Ok(())
    }

    async fn unpublish(&self, tenant_id: &str, assessment_id: &str) -> Result<()> {
        let url = self.assessment_url(tenant_id, assessment_id, Some("unpublish"));
        self.send(self.request(Method::POST, url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessment_url_joins_segments() {
        let service = RestAssessmentService::new("https://api.example.com/v1/").unwrap();

        let url = service.assessment_url("acme", "a 1", Some("publish"));
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/tenants/acme/assessments/a%201/publish"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(RestAssessmentService::new("not a url").is_err());
        assert!(RestAssessmentService::new("mailto:ops@example.com").is_err());
    }
}
