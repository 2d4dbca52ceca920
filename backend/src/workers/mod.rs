use std::{sync::Arc, time::Duration};

use chrono::Utc;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    config::EmailSettings,
    models::{EmailTemplate, Notification},
    store::{DeliveryOutcome, DocumentStore, StoreError},
};

pub mod email;

pub use email::{EmailSender, HttpEmailSender, OutgoingEmail};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("notification {id} has a malformed email template: {source}")]
    Template {
        id: Uuid,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
}

pub struct NotificationDispatcher {
    store: Arc<dyn DocumentStore>,
    sender: Arc<dyn EmailSender>,
    poll_interval: Duration,
    max_attempts: i32,
    batch_size: i64,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        sender: Arc<dyn EmailSender>,
        settings: &EmailSettings,
    ) -> Self {
        Self {
            store,
            sender,
            poll_interval: settings.poll_interval,
            max_attempts: settings.max_attempts,
            batch_size: settings.batch_size,
        }
    }

    pub async fn run(&self) {
        info!("notification dispatcher started");
        loop {
            match self.tick().await {
                Ok(summary) if summary.sent > 0 && summary.failed == 0 => {}
                Ok(_) => sleep(self.poll_interval).await,
                Err(err) => {
                    error!(error = %err, "notification dispatch tick failed");
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    pub async fn tick(&self) -> Result<DispatchSummary, DispatchError> {
        let pending = self
            .store
            .pending_notifications(self.max_attempts, self.batch_size)
            .await?;

        let mut summary = DispatchSummary::default();
        for notification in pending {
            let outcome = match self.deliver(&notification).await {
                Ok(()) => {
                    summary.sent += 1;
                    info!(
                        notification_id = %notification.id,
                        tenant_id = %notification.tenant_id,
                        "sent notification email"
                    );
                    DeliveryOutcome::Sent { at: Utc::now() }
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(
                        notification_id = %notification.id,
                        tenant_id = %notification.tenant_id,
                        attempt = notification.email_attempts + 1,
                        error = %err,
                        "notification email failed"
                    );
                    DeliveryOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            };
            self.store
                .record_email_delivery(notification.id, outcome)
                .await?;
        }

        Ok(summary)
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), DispatchError> {
        let email = outgoing_email(notification)?;
        self.sender.send(&email).await
    }
}

pub fn outgoing_email(notification: &Notification) -> Result<OutgoingEmail, DispatchError> {
    let template: EmailTemplate = serde_json::from_value(notification.email_template.clone())
        .map_err(|source| DispatchError::Template {
            id: notification.id,
            source,
        })?;
    Ok(OutgoingEmail {
        to: notification.recipient.clone(),
        subject: template.title,
        html: template.body,
    })
}
