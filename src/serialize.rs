//! Rendering run configurations as JSON documents.
//!
//! Every function here is total: a resolved document is plain JSON with
//! string keys, so rendering cannot fail. Object members keep the order they
//! had in the specification content.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::templating::RunConfiguration;

/// The document of a run configuration.
pub fn serialize(run: &RunConfiguration) -> Value {
    run.document.clone()
}

/// Render a document as compact JSON (no insignificant whitespace).
pub fn to_compact_string(document: &Value) -> String {
    document.to_string()
}

/// Render a document as indented JSON.
pub fn to_pretty_string(document: &Value) -> String {
    format!("{document:#}")
}

/// Render a whole run sequence as one compact JSON array.
pub fn sequence_to_compact_string(documents: &[Value]) -> String {
    Value::Array(documents.to_vec()).to_string()
}

/// SHA-256 checksum of a document's compact form.
///
/// Returns a string in the format "`sha256:hexadecimal_hash`". Equal
/// documents (same members in the same order) always share a checksum.
pub fn checksum(document: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(to_compact_string(document).as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
