//! Mirror registration via `diffusion.uri.edit`.

use serde_json::{json, Value};

use mirror_core::{Credential, MirrorError, RepositoryRecord};

use crate::client::ConduitCall;

const METHOD: &str = "diffusion.uri.edit";

/// Transactions creating a push-only, hidden mirror URI.
pub fn mirror_transactions(repository: &RepositoryRecord, uri: &str, credential: &Credential) -> Value {
    json!([
        { "type": "repository", "value": repository.identifier },
        { "type": "uri", "value": uri },
        { "type": "io", "value": "mirror" },
        { "type": "display", "value": "never" },
        { "type": "disable", "value": false },
        { "type": "credential", "value": credential.material.expose() },
    ])
}

pub fn register_mirror(
    conduit: &impl ConduitCall,
    repository: &RepositoryRecord,
    uri: &str,
    credential: &Credential,
) -> Result<(), MirrorError> {
    let params = json!({ "transactions": mirror_transactions(repository, uri, credential) });
    let result = conduit.call(METHOD, params)?;
    let object = result
        .get("object")
        .and_then(|o| o.get("phid"))
        .and_then(Value::as_str)
        .unwrap_or("?");
    tracing::info!(repository = %repository.identifier, uri, object, "mirror URI registered");
    Ok(())
}
