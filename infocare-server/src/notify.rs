//! Notification sink: delivers rendered e-mails to family members.

use async_trait::async_trait;
use infocare_core::Notification;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::config::NotificationSettings;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay responded with status {0}")]
    Rejected(reqwest::StatusCode),

    #[error("{0}")]
    Other(String),
}

/// Anything that can deliver a [`Notification`]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Posts each message as JSON to an HTTP mail relay
pub struct MailRelaySink {
    client: reqwest::Client,
    url: String,
    from: String,
    api_key: Option<String>,
}

impl MailRelaySink {
    pub fn new(url: String, settings: &NotificationSettings) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url,
            from: settings.from.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl NotificationSink for MailRelaySink {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut request = self.client.post(&self.url).json(&json!({
            "from": self.from,
            "to": notification.to,
            "subject": notification.subject,
            "html": notification.html,
        }));
        if let Some(ref key) = self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected(response.status()))
        }
    }
}

/// Used when no relay is configured: messages are logged and dropped
pub struct DisabledSink;

#[async_trait]
impl NotificationSink for DisabledSink {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::warn!(
            event = notification.event.as_str(),
            to = %notification.to,
            "Notifications disabled; message not sent"
        );
        Ok(())
    }
}

/// Front for the configured sink
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub fn from_settings(settings: &NotificationSettings) -> Result<Self, NotifyError> {
        match (settings.enabled, &settings.relay_url) {
            (true, Some(url)) => Ok(Self::new(Arc::new(MailRelaySink::new(url.clone(), settings)?))),
            (true, None) => Err(NotifyError::Other(
                "notifications are enabled but no relay_url is set".to_string(),
            )),
            (false, _) => Ok(Self::new(Arc::new(DisabledSink))),
        }
    }

    /// Send and wait for the outcome. No retry.
    pub async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        match self.sink.send(notification).await {
            Ok(()) => {
                tracing::info!(
                    event = notification.event.as_str(),
                    to = %notification.to,
                    "Notification sent"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    event = notification.event.as_str(),
                    to = %notification.to,
                    error = %e,
                    "Failed to send notification"
                );
                Err(e)
            }
        }
    }

    /// Send in the background; the outcome is only logged
    pub fn dispatch_detached(&self, notification: Notification) {
        let notifier = self.clone();
        tokio::spawn(async move {
            let _ = notifier.deliver(&notification).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infocare_core::NotificationEvent;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
            self.sent.lock().await.push(notification.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        async fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Other("relay down".to_string()))
        }
    }

    fn message() -> Notification {
        Notification {
            event: NotificationEvent::AssociationApproved,
            to: "ana@example.com".to_string(),
            subject: "[InfoCare] Access request approved".to_string(),
            html: "approved".to_string(),
        }
    }

    #[tokio::test]
    async fn test_deliver_records() {
        let sink = Arc::new(RecordingSink::default());
        let notifier = Notifier::new(sink.clone());
        notifier.deliver(&message()).await.unwrap();
        assert_eq!(sink.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_deliver_surfaces_failure() {
        let notifier = Notifier::new(Arc::new(FailingSink));
        assert!(notifier.deliver(&message()).await.is_err());
    }

    #[tokio::test]
    async fn test_detached_failure_does_not_panic() {
        let notifier = Notifier::new(Arc::new(FailingSink));
        notifier.dispatch_detached(message());
        tokio::task::yield_now().await;
    }

    #[test]
    fn test_settings_selection() {
        let disabled = NotificationSettings::default();
        assert!(Notifier::from_settings(&disabled).is_ok());

        let missing_url = NotificationSettings {
            enabled: true,
            ..Default::default()
        };
        assert!(Notifier::from_settings(&missing_url).is_err());
    }

    #[tokio::test]
    async fn test_relay_unreachable() {
        let settings = NotificationSettings {
            enabled: true,
            relay_url: Some("http://127.0.0.1:9/send".to_string()),
            timeout_secs: 1,
            ..Default::default()
        };
        let notifier = Notifier::from_settings(&settings).unwrap();
        let err = notifier.deliver(&message()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
    }
}
