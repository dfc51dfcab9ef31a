//! Repository lookup via `diffusion.repository.search`.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use mirror_core::{IdentifierToken, MirrorError, RepositoryRecord};

use crate::client::ConduitCall;

pub(crate) const SEARCH_METHOD: &str = "diffusion.repository.search";

/// Search constraint matching exactly one identifier shape.
pub fn constraints_for(token: &IdentifierToken) -> Value {
    match token {
        IdentifierToken::Numeric(id) => json!({ "ids": [id] }),
        IdentifierToken::Global(phid) => json!({ "phids": [phid] }),
        IdentifierToken::Callsign(callsign) => json!({ "callsigns": [callsign] }),
    }
}

pub fn lookup(
    conduit: &impl ConduitCall,
    forge_url: &str,
    token: &IdentifierToken,
) -> Result<RepositoryRecord, MirrorError> {
    let params = json!({
        "constraints": constraints_for(token),
        "attachments": { "uris": true },
        "limit": 1,
    });
    let page: SearchPage = parse(SEARCH_METHOD, conduit.call(SEARCH_METHOD, params)?)?;
    let item = page
        .data
        .into_iter()
        .next()
        .ok_or_else(|| MirrorError::NotFound(format!("repository {token}")))?;
    tracing::debug!(repository = %item.phid, "resolved {token}");
    Ok(item.into_record(forge_url))
}

pub(crate) fn parse<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, MirrorError> {
    serde_json::from_value(value)
        .map_err(|err| MirrorError::Protocol(format!("{method}: unexpected result shape: {err}")))
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SearchPage {
    #[serde(default)]
    pub data: Vec<RepositoryItem>,
    #[serde(default)]
    pub cursor: Cursor,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Cursor {
    pub after: Option<Value>,
}

impl Cursor {
    /// Conduit sends the cursor as a string or a number depending on order.
    pub fn after_token(&self) -> Option<String> {
        match self.after.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryItem {
    pub id: u64,
    pub phid: String,
    pub fields: RepositoryFields,
    #[serde(default)]
    pub attachments: Attachments,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryFields {
    pub name: String,
    pub callsign: Option<String>,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    pub description: Option<Description>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Description {
    #[serde(default)]
    pub raw: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Attachments {
    pub uris: Option<UriAttachment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UriAttachment {
    #[serde(default)]
    pub uris: Vec<UriItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UriItem {
    pub fields: UriFields,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UriFields {
    pub uri: UriValue,
    pub io: IoValue,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UriValue {
    pub raw: String,
    pub effective: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IoValue {
    pub effective: String,
}

impl RepositoryItem {
    pub fn into_record(self, forge_url: &str) -> RepositoryRecord {
        let forge_url = browse_url(forge_url, self.id, &self.fields);
        let existing_mirror_uris = self
            .attachments
            .uris
            .map(|a| mirror_uris(a.uris))
            .unwrap_or_default();

        RepositoryRecord {
            identifier: self.phid,
            callsign: self.fields.callsign,
            name: self.fields.name,
            description: self.fields.description.map(|d| d.raw).unwrap_or_default(),
            forge_url,
            existing_mirror_uris,
        }
    }
}

/// Public page of a repository: short name first, then callsign, then id.
fn browse_url(forge_url: &str, id: u64, fields: &RepositoryFields) -> String {
    let base = forge_url.trim_end_matches('/');
    match (&fields.short_name, &fields.callsign) {
        (Some(short), _) if !short.is_empty() => format!("{base}/source/{short}/"),
        (_, Some(callsign)) if !callsign.is_empty() => format!("{base}/diffusion/{callsign}/"),
        _ => format!("{base}/diffusion/{id}/"),
    }
}

/// Enabled URIs whose effective I/O mode is `mirror`.
fn mirror_uris(uris: Vec<UriItem>) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for item in uris {
        let fields = item.fields;
        if fields.disabled || fields.io.effective != "mirror" {
            continue;
        }
        if let Some(effective) = fields.uri.effective {
            out.insert(effective);
        }
        out.insert(fields.uri.raw);
    }
    out
}
