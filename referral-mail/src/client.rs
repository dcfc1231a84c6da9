//! HTTP client for a running referral-mail server
//!
//! [`ApiClient`] implements both [`TemplateStore`] and [`Mailer`], so the CLI
//! drives the same session and composer code against a remote server as the
//! library does against a local database.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::handlers::{ApiError, SuccessResponse};
use crate::error::{ReferralError, Result};
use crate::mailer::{Mailer, OutboundEmail};
use crate::templates::{NewTemplate, Template, TemplateStore};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a success body, or turn the server's `{ "error": .. }` into an error
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&text)
            .map(|e| e.error)
            .unwrap_or(text);

        warn!("Request failed with status {}: {}", status, message);

        if status == StatusCode::NOT_FOUND {
            return Err(ReferralError::NotFound(message));
        }

        Err(ReferralError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TemplateStore for ApiClient {
    async fn list(&self) -> Result<Vec<Template>> {
        debug!("Listing templates from {}", self.base_url);
        let response = self.client.get(self.url("/templates")).send().await?;
        Self::decode(response).await
    }

    async fn get(&self, id: &str) -> Result<Option<Template>> {
        let response = self
            .client
            .get(self.url(&format!("/templates/{}", id)))
            .send()
            .await?;

        match Self::decode(response).await {
            Ok(template) => Ok(Some(template)),
            Err(ReferralError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create(&self, template: NewTemplate) -> Result<Template> {
        template.validate()?;
        let response = self
            .client
            .post(self.url("/templates"))
            .json(&template)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn replace(&self, id: &str, template: NewTemplate) -> Result<Template> {
        template.validate()?;
        let response = self
            .client
            .put(self.url(&format!("/templates/{}", id)))
            .json(&template)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/templates/{}", id)))
            .send()
            .await?;
        let _: SuccessResponse = Self::decode(response).await?;
        Ok(())
    }
}

#[async_trait]
impl Mailer for ApiClient {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let mut form = Form::new()
            .text("subject", email.subject.clone())
            .text("content", email.body_html.clone())
            .text("recipient", email.recipient.clone());

        if let Some(attachment) = &email.attachment {
            let part = Part::bytes(attachment.data.clone())
                .file_name(attachment.filename.clone())
                .mime_str(attachment.content_type_or_default())?;
            form = form.part("attachment", part);
        }

        debug!("Posting email for {} to {}", email.recipient, self.base_url);

        let response = self
            .client
            .post(self.url("/email/send"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ReferralError::Dispatch(e.to_string()))?;

        match Self::decode::<SuccessResponse>(response).await {
            Ok(_) => Ok(()),
            Err(e @ ReferralError::Api { status: 400, .. }) => Err(e),
            Err(e) => Err(ReferralError::Dispatch(e.to_string())),
        }
    }
}
