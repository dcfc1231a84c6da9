//! Transactional send endpoint

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::handlers::{api_error, bad_request, ApiError, ApiResult, AppState, SuccessResponse};
use crate::error::ReferralError;
use crate::mailer::{Attachment, OutboundEmail};

/// POST /email/send - Dispatch one resolved message
///
/// Multipart fields: `subject`, `content` (HTML), `recipient` and an optional
/// single `attachment` file.
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<SuccessResponse>> {
    let mut subject = String::new();
    let mut content = String::new();
    let mut recipient = String::new();
    let mut attachment: Option<Attachment> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(bad_request(&format!("Invalid form data: {}", e))),
        };

        let name = field.name().map(|s| s.to_string());

        match name.as_deref() {
            Some("subject") => {
                subject = field.text().await.map_err(|e| bad_request(&e.to_string()))?;
            }
            Some("content") => {
                content = field.text().await.map_err(|e| bad_request(&e.to_string()))?;
            }
            Some("recipient") => {
                recipient = field.text().await.map_err(|e| bad_request(&e.to_string()))?;
            }
            Some("attachment") => {
                if attachment.is_some() {
                    warn!("Ignoring extra attachment, only one is supported");
                    continue;
                }

                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| bad_request(&e.to_string()))?;

                // an untouched file input still posts an empty part
                if filename.is_empty() && data.is_empty() {
                    continue;
                }

                attachment = Some(Attachment::new(filename, content_type, data.to_vec()));
            }
            _ => {}
        }
    }

    if recipient.trim().is_empty() {
        return Err(bad_request("Recipient email is required"));
    }

    let email = OutboundEmail {
        recipient: recipient.trim().to_string(),
        subject,
        body_html: content,
        attachment,
    };

    match state.mailer.send(&email).await {
        Ok(()) => {
            info!(
                recipient = %email.recipient,
                has_attachment = email.attachment.is_some(),
                "Email sent"
            );
            Ok(Json(SuccessResponse::ok()))
        }
        Err(e @ ReferralError::Validation(_)) => Err(api_error(e, "Failed to send email")),
        Err(e) => {
            warn!(recipient = %email.recipient, error = %e, "Error sending email");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Failed to send email")),
            ))
        }
    }
}
