//! Conduit transport.
//!
//! Every method is a form `POST {forge}/api/{method}` whose `params` field
//! carries the JSON arguments plus the API token under `__conduit__`. The
//! reply is an envelope `{result, error_code, error_info}`; HTTP 200 with a
//! non-null `error_code` is still a failure.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use mirror_core::{Config, MirrorError, Secret};

/// Error codes Conduit uses for a bad or expired token.
const AUTH_ERROR_CODES: &[&str] = &["ERR-INVALID-AUTH", "ERR-INVALID-SESSION", "ERR-NEED-AUTH"];

/// One Conduit method call. Implemented by [`ConduitClient`] and by the
/// scripted endpoint the unit tests use.
pub trait ConduitCall {
    fn call(&self, method: &str, params: Value) -> Result<Value, MirrorError>;
}

/// Blocking Conduit client with a bounded per-request timeout.
pub struct ConduitClient {
    agent: ureq::Agent,
    base_url: String,
    token: Secret,
}

impl ConduitClient {
    pub fn new(base_url: &str, token: Secret, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.forge_url, config.forge.clone(), config.timeout)
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/api/{method}", self.base_url)
    }
}

impl ConduitCall for ConduitClient {
    fn call(&self, method: &str, params: Value) -> Result<Value, MirrorError> {
        let params = with_token(params, &self.token);
        tracing::debug!(method, "conduit call");

        let response = self
            .agent
            .post(&self.endpoint(method))
            .send_form(&[
                ("params", params.to_string().as_str()),
                ("output", "json"),
                ("__conduit__", "1"),
            ])
            .map_err(|err| classify_transport(method, err))?;

        let envelope: Envelope = response.into_json().map_err(|err| {
            MirrorError::Protocol(format!("{method}: response is not Conduit JSON: {err}"))
        })?;
        envelope.into_result(method)
    }
}

// ---------------------------------------------------------------------------
// Envelope and error classification
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    result: Value,
    error_code: Option<String>,
    error_info: Option<String>,
}

impl Envelope {
    pub(crate) fn into_result(self, method: &str) -> Result<Value, MirrorError> {
        let Some(code) = self.error_code else {
            return Ok(self.result);
        };
        let info = self.error_info.unwrap_or_default();
        let message = format!("{method}: {code}: {info}");
        if AUTH_ERROR_CODES.contains(&code.as_str()) {
            Err(MirrorError::Auth(message))
        } else {
            Err(MirrorError::Rejected(message))
        }
    }
}

/// Attach the API token the way Conduit expects it.
pub(crate) fn with_token(params: Value, token: &Secret) -> Value {
    let mut params = match params {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    params.insert("__conduit__".into(), json!({ "token": token.expose() }));
    Value::Object(params)
}

pub(crate) fn classify_status(method: &str, status: u16) -> MirrorError {
    let message = format!("{method}: forge answered HTTP {status}");
    match status {
        401 | 403 => MirrorError::Auth(message),
        429 | 500..=599 => MirrorError::Transient(message),
        _ => MirrorError::Rejected(message),
    }
}

fn classify_transport(method: &str, err: ureq::Error) -> MirrorError {
    match err {
        ureq::Error::Status(status, _) => classify_status(method, status),
        ureq::Error::Transport(transport) => {
            MirrorError::Transient(format!("{method}: {transport}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use mirror_core::ErrorKind;
    use rstest::rstest;

    use super::*;

    fn envelope(value: Value) -> Envelope {
        serde_json::from_value(value).expect("envelope")
    }

    #[test]
    fn successful_envelope_yields_result() {
        let result = envelope(json!({
            "result": { "data": [] },
            "error_code": null,
            "error_info": null
        }))
        .into_result("diffusion.repository.search")
        .expect("ok");
        assert_eq!(result, json!({ "data": [] }));
    }

    #[rstest]
    #[case("ERR-INVALID-AUTH")]
    #[case("ERR-INVALID-SESSION")]
    #[case("ERR-NEED-AUTH")]
    fn invalid_token_maps_to_auth(#[case] code: &str) {
        let err = envelope(json!({
            "result": null,
            "error_code": code,
            "error_info": "API token \"api-xyz\" has the wrong length."
        }))
        .into_result("passphrase.query")
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(err.to_string().contains("passphrase.query"));
    }

    #[test]
    fn other_error_codes_are_rejections() {
        let err = envelope(json!({
            "result": null,
            "error_code": "ERR-CONDUIT-CORE",
            "error_info": "Unknown constraint \"bogus\"."
        }))
        .into_result("diffusion.repository.search")
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
    }

    #[rstest]
    #[case(401, ErrorKind::Auth)]
    #[case(403, ErrorKind::Auth)]
    #[case(429, ErrorKind::Transient)]
    #[case(502, ErrorKind::Transient)]
    #[case(404, ErrorKind::Rejected)]
    fn http_status_classification(#[case] status: u16, #[case] kind: ErrorKind) {
        assert_eq!(classify_status("diffusion.uri.edit", status).kind(), kind);
    }

    #[test]
    fn token_is_injected_under_conduit_key() {
        let params = with_token(json!({ "ids": [3] }), &Secret::new("api-abc"));
        assert_eq!(params["__conduit__"]["token"], "api-abc");
        assert_eq!(params["ids"], json!([3]));
    }
}
