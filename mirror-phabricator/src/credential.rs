//! Passphrase credential lookup via `passphrase.query`.

use serde_json::{json, Value};

use mirror_core::{Credential, CredentialKeyId, MirrorError, Secret};

use crate::client::ConduitCall;

const METHOD: &str = "passphrase.query";

/// Resolve `key_id` to the credential the forge pushes with.
///
/// The material is the credential PHID: the forge keeps the key itself and
/// only needs the reference in the mirror registration.
pub fn resolve(
    conduit: &impl ConduitCall,
    key_id: CredentialKeyId,
) -> Result<Credential, MirrorError> {
    let result = conduit.call(METHOD, json!({ "ids": [key_id.0] }))?;
    let phid = credential_phid(&result)
        .ok_or_else(|| MirrorError::NotFound(format!("credential {key_id}")))?;
    tracing::debug!(credential = %key_id, "credential resolved");
    Ok(Credential {
        key_id,
        material: Secret::new(phid),
    })
}

/// `data` is an object keyed by PHID, or an empty list when nothing matched.
fn credential_phid(result: &Value) -> Option<String> {
    let entries = result.get("data")?.as_object()?;
    entries.iter().next().map(|(key, entry)| {
        entry
            .get("phid")
            .and_then(Value::as_str)
            .unwrap_or(key)
            .to_string()
    })
}
