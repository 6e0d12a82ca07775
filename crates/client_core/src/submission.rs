//! Order submission: the intake-endpoint seam, the HTTP implementation, and the failure policy.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde_json::Value;
use shared::protocol::{OrderPayload, OrderReceipt};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    config::ClientSettings,
    wizard::{WizardController, WizardStep},
};

const ORDER_NUMBER_MIN: u32 = 100_000;
const ORDER_NUMBER_MAX: u32 = 999_999;

/// Six-digit local order number, independent of anything the server assigns.
pub fn generate_order_number(rng: &mut impl Rng) -> u32 {
    rng.gen_range(ORDER_NUMBER_MIN..=ORDER_NUMBER_MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionPolicy {
    /// When set, a failed submission still completes the session with the local order number.
    pub mask_submission_errors: bool,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            mask_submission_errors: true,
        }
    }
}

impl SubmissionPolicy {
    pub fn strict() -> Self {
        Self {
            mask_submission_errors: false,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            mask_submission_errors: settings.mask_submission_errors,
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("orders can only be confirmed from the review step (currently at {0:?})")]
    NotAtReview(WizardStep),
    #[error("an order submission is already in flight")]
    InFlight,
    #[error("this order has already been submitted")]
    AlreadyCompleted,
    #[error("no submission is in flight for this order")]
    NotInFlight,
    #[error("order submission failed: {0:#}")]
    Rejected(anyhow::Error),
}

/// Claimed submission slot: the payload to send and the locally generated number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub order_number: u32,
    pub payload: OrderPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_number: u32,
    pub server_order_id: Option<String>,
    /// What the success screen shows: the server id if one came back, else the local number.
    pub display_number: String,
    /// False when the intake call failed and the failure was masked.
    pub delivered: bool,
}

impl OrderConfirmation {
    pub fn accepted(order_number: u32, receipt: OrderReceipt) -> Self {
        let display_number = receipt
            .order_id
            .clone()
            .unwrap_or_else(|| order_number.to_string());
        Self {
            order_number,
            server_order_id: receipt.order_id,
            display_number,
            delivered: true,
        }
    }

    pub fn local_only(order_number: u32) -> Self {
        Self {
            order_number,
            server_order_id: None,
            display_number: order_number.to_string(),
            delivered: false,
        }
    }
}

#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    async fn submit(&self, payload: &OrderPayload) -> Result<OrderReceipt>;
}

/// Submitter used when no intake endpoint is configured; every call fails.
pub struct MissingOrderSubmitter;

#[async_trait]
impl OrderSubmitter for MissingOrderSubmitter {
    async fn submit(&self, payload: &OrderPayload) -> Result<OrderReceipt> {
        Err(anyhow!(
            "order intake unavailable for order {}",
            payload.order_number
        ))
    }
}

/// POSTs the payload as JSON to the order-intake endpoint.
pub struct HttpOrderSubmitter {
    http: Client,
    endpoint: String,
}

impl HttpOrderSubmitter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build order intake HTTP client")?;
        Ok(Self {
            http,
            endpoint: settings.order_endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OrderSubmitter for HttpOrderSubmitter {
    async fn submit(&self, payload: &OrderPayload) -> Result<OrderReceipt> {
        debug!(endpoint = %self.endpoint, order_number = payload.order_number, "posting order");
        let response = self
            .http
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("failed to reach order endpoint {}", self.endpoint))?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                %status,
                endpoint = %self.endpoint,
                "order endpoint answered with a non-success status"
            );
        }
        let body: Value = response
            .json()
            .await
            .context("order endpoint returned a non-JSON response")?;
        info!(response = %body, "order intake response");
        Ok(OrderReceipt::from_response(&body))
    }
}

/// Submits through a controller shared between tasks, holding the lock only around the
/// state transitions so a second confirm during the network call is rejected instead of queued.
pub async fn submit_shared(
    controller: &Mutex<WizardController>,
    submitter: &dyn OrderSubmitter,
) -> Result<OrderConfirmation, SubmitError> {
    let pending = controller.lock().await.begin_submission()?;
    let outcome = submitter.submit(&pending.payload).await;
    controller.lock().await.complete_submission(pending, outcome)
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
