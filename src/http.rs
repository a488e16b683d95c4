//! Shared outbound HTTP session.
//!
//! One pooled agent is reused for every source call of a pass. Each request
//! carries the configured timeout; any failure maps onto [`SourceError`].

use std::time::Duration;

use serde_json::Value as Json;

use crate::config::HttpConfig;
use crate::source::SourceError;

#[derive(Clone)]
pub struct HttpSession {
    agent: ureq::Agent,
    user_agent: String,
    locale: String,
}

impl HttpSession {
    pub fn new(config: &HttpConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout(timeout)
            .build();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
            locale: config.locale.clone(),
        }
    }

    /// GET `url` with query parameters and decode the JSON body.
    pub fn get_json(&self, label: &str, url: &str, params: &[(&str, &str)]) -> Result<Json, SourceError> {
        let mut request = self
            .agent
            .get(url)
            .set("User-Agent", &self.user_agent)
            .set("client-locale", &self.locale);
        for (name, value) in params {
            request = request.query(name, value);
        }
        let response = request.call().map_err(|e| classify(label, e))?;
        decode(label, response)
    }

    /// POST a form body to `url` and decode the JSON body.
    pub fn post_form_json(&self, label: &str, url: &str, form: &[(&str, &str)]) -> Result<Json, SourceError> {
        let response = self
            .agent
            .post(url)
            .set("User-Agent", &self.user_agent)
            .set("client-locale", &self.locale)
            .send_form(form)
            .map_err(|e| classify(label, e))?;
        decode(label, response)
    }
}

fn classify(label: &str, error: ureq::Error) -> SourceError {
    match error {
        ureq::Error::Status(status, _) => SourceError::Status {
            source_label: label.to_string(),
            status,
        },
        ureq::Error::Transport(transport) => SourceError::Transient {
            source_label: label.to_string(),
            message: transport.to_string(),
        },
    }
}

fn decode(label: &str, response: ureq::Response) -> Result<Json, SourceError> {
    let body = response.into_string().map_err(|e| SourceError::Transient {
        source_label: label.to_string(),
        message: format!("failed to read response: {e}"),
    })?;
    serde_json::from_str(&body).map_err(|e| SourceError::Decode {
        source_label: label.to_string(),
        message: e.to_string(),
    })
}
