// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fire-and-forget analytics sink.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An explorer interaction to record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_name: Option<String>,
}

/// Body posted to the sink.
#[derive(Serialize)]
struct TrackPayload<'a> {
    #[serde(flatten)]
    event: &'a AnalyticsEvent,
    timestamp: String,
}

/// Client for the analytics endpoint. Without a URL every event is dropped.
#[derive(Clone, Default)]
pub struct AnalyticsClient {
    http: reqwest::Client,
    url: Option<String>,
}

impl AnalyticsClient {
    pub fn new(url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.filter(|u| !u.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Send `event` in the background. No response is awaited; failures
    /// are logged and otherwise ignored. Must be called within a tokio runtime.
    pub fn track(&self, event: AnalyticsEvent) {
        let Some(url) = self.url.clone() else {
            tracing::debug!(event = %event.event, "Analytics disabled; dropping event");
            return;
        };
        let http = self.http.clone();

        tokio::spawn(async move {
            let payload = TrackPayload {
                event: &event,
                timestamp: chrono::Utc::now().to_rfc3339(),
            };
            match http.post(&url).json(&payload).send().await {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(
                        event = %event.event,
                        status = response.status().as_u16(),
                        "Analytics sink rejected event"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(event = %event.event, error = %e, "Failed to send analytics event");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_disables_sink() {
        assert!(!AnalyticsClient::new(Some(String::new())).is_enabled());
        assert!(!AnalyticsClient::new(None).is_enabled());
        assert!(AnalyticsClient::new(Some("https://example.org/track".into())).is_enabled());
    }

    #[test]
    fn test_payload_flattens_event() {
        let event = AnalyticsEvent {
            event: "preserve_selected".to_string(),
            data: serde_json::json!({ "source": "map" }),
            preserve_name: Some("Mink River".to_string()),
        };
        let payload = TrackPayload {
            event: &event,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["event"], "preserve_selected");
        assert_eq!(value["preserve_name"], "Mink River");
        assert_eq!(value["data"]["source"], "map");
    }

    #[test]
    fn test_disabled_track_does_not_need_runtime() {
        AnalyticsClient::new(None).track(AnalyticsEvent {
            event: "noop".to_string(),
            data: Value::Null,
            preserve_name: None,
        });
    }
}
