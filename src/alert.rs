//! Client for the external alert decision endpoint.
//!
//! The endpoint decides whether a guideline was exceeded; this side only
//! fetches and decodes its verdict. Any failure means "no verdict this
//! time" and is only visible in the logs.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::models::{AlertNotice, AlertVerdict};
use crate::Result;

/// Result of one evaluation, as handed to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertOutcome {
    // ---
    pub show_alert: bool,
    pub verdict: Option<AlertVerdict>,
    #[serde(flatten)]
    pub notice: Option<AlertNotice>,
}

#[derive(Debug, Clone)]
pub struct AlertClient {
    client: Client,
    url: String,
}

impl AlertClient {
    // ---
    pub fn new(url: impl Into<String>) -> Self {
        AlertClient {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current verdict, or `None` after logging why not.
    pub async fn fetch_verdict(&self) -> Option<AlertVerdict> {
        // ---
        match self.request().await {
            Ok(verdict) => {
                debug!("Alert verdict: {:?}", verdict);
                Some(verdict)
            }
            Err(e) => {
                error!("Alert request to {} failed: {}", self.url, e);
                None
            }
        }
    }

    /// Fetch a verdict and decide whether the caller should show an alert.
    pub async fn evaluate(&self) -> AlertOutcome {
        // ---
        let Some(verdict) = self.fetch_verdict().await else {
            return AlertOutcome::default();
        };

        let notice = verdict.to_notice();
        if let Some(notice) = &notice {
            info!("{}: {}", notice.title, notice.message);
        }

        AlertOutcome {
            show_alert: notice.is_some(),
            verdict: Some(verdict),
            notice,
        }
    }

    async fn request(&self) -> Result<AlertVerdict> {
        // ---
        let verdict = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<AlertVerdict>()
            .await?;

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint_gives_no_verdict() {
        // ---
        // Port 9 (discard) on localhost is closed in test environments.
        let client = AlertClient::new("http://127.0.0.1:9/");
        let outcome = client.evaluate().await;

        assert_eq!(outcome, AlertOutcome::default());
        assert!(!outcome.show_alert);
    }

    #[test]
    fn test_outcome_serialization() {
        // ---
        let verdict = AlertVerdict {
            alert: true,
            pollutant: "PM10".to_string(),
            time: "Nov 6".to_string(),
            value: 16.0,
        };
        let outcome = AlertOutcome {
            show_alert: true,
            notice: verdict.to_notice(),
            verdict: Some(verdict),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["show_alert"], true);
        assert_eq!(json["verdict"]["pollutant"], "PM10");
        assert_eq!(json["title"], "Air Quality has exceeded WHO guidelines");

        let quiet = serde_json::to_value(AlertOutcome::default()).unwrap();
        assert_eq!(quiet["verdict"], serde_json::Value::Null);
        assert!(quiet.get("title").is_none());
    }
}
