use serde::Serialize;
use tracing::{error, info};

/// JSON payload posted to the webhook after both catalogs are processed.
#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub project: String,
    pub date: String,
    pub message: String,
}

/// Posts a run summary to a webhook URL.
///
/// Failures are logged and swallowed: notification never changes the
/// outcome of a run.
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }

    pub async fn notify(&self, payload: &WebhookPayload) {
        info!(url = %self.url, message = %payload.message, "sending webhook notification");
        match self.http.post(&self.url).json(payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!("webhook notification sent");
            }
            Ok(response) => {
                error!(status = %response.status(), "webhook endpoint rejected the notification");
            }
            Err(err) => {
                error!(error = %err, "failed to send webhook notification");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn payload_serializes_the_expected_fields() -> Result<()> {
        let payload = WebhookPayload {
            project: "/srv/projects/site".to_string(),
            date: "2024-03-15".to_string(),
            message: "BackupSuccessful".to_string(),
        };
        let value = serde_json::to_value(&payload)?;
        assert_eq!(value["project"], "/srv/projects/site");
        assert_eq!(value["date"], "2024-03-15");
        assert_eq!(value["message"], "BackupSuccessful");
        Ok(())
    }
}
