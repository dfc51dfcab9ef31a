//! Saved-query execution.
//!
//! Runs `diffusion.repository.search` with a `queryKey` and follows the
//! `cursor.after` chain. Results keep the forge's order: it may reflect
//! curation and is never re-sorted here.

use std::collections::HashSet;

use serde_json::json;

use mirror_core::{IdentifierToken, MirrorError};

use crate::client::ConduitCall;
use crate::repository::{parse, SearchPage, SEARCH_METHOD};

pub const PAGE_SIZE: u32 = 100;

pub fn execute(
    conduit: &impl ConduitCall,
    query_key: &str,
) -> Result<Vec<IdentifierToken>, MirrorError> {
    let mut tokens = Vec::new();
    let mut seen_cursors = HashSet::new();
    let mut after: Option<String> = None;

    loop {
        let mut params = json!({ "queryKey": query_key, "limit": PAGE_SIZE });
        if let Some(cursor) = &after {
            params["after"] = json!(cursor);
        }
        let page: SearchPage = parse(SEARCH_METHOD, conduit.call(SEARCH_METHOD, params)?)?;
        tokens.extend(
            page.data
                .iter()
                .map(|item| IdentifierToken::Global(item.phid.clone())),
        );

        match page.cursor.after_token() {
            Some(next) if page.data.is_empty() => {
                tracing::debug!(cursor = %next, "empty page with a cursor; stopping");
                break;
            }
            Some(next) => {
                if !seen_cursors.insert(next.clone()) {
                    return Err(MirrorError::Protocol(format!(
                        "{SEARCH_METHOD}: cursor {next} repeated for query {query_key}"
                    )));
                }
                after = Some(next);
            }
            None => break,
        }
    }

    tracing::debug!(query = query_key, count = tokens.len(), "saved query resolved");
    Ok(tokens)
}
