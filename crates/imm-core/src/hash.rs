//! SHA-256 digests of exported payloads.
//!
//! The container trailer and the `imm hash` command both use these, so two
//! exports of the same tree compare equal without decoding either file.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::document::Document;
use crate::error::ImmResult;

/// SHA-256 digest of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        self.0.iter().fold(String::with_capacity(64), |mut out, b| {
            out.push_str(&format!("{:02x}", b));
            out
        })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

pub fn hash_bytes(data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    ContentHash(hasher.finalize().into())
}

/// Digest of the JSON payload the container stores for `document`.
pub fn hash_document(document: &Document) -> ImmResult<ContentHash> {
    Ok(hash_bytes(&serde_json::to_vec(document)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SequenceSettings;
    use crate::types::{ResourceBudget, SequenceType};

    fn blank(id: &str, sequence_type: SequenceType) -> Document {
        Document {
            id: id.into(),
            sequence: SequenceSettings {
                sequence_type,
                ..SequenceSettings::default()
            },
            budget: ResourceBudget::unlimited(),
            layers: Vec::new(),
        }
    }

    #[test]
    fn test_same_document_same_digest() {
        let doc = blank("doc", SequenceType::Still);
        assert_eq!(
            hash_document(&doc).unwrap(),
            hash_document(&doc.clone()).unwrap()
        );
    }

    #[test]
    fn test_any_field_changes_digest() {
        let base = hash_document(&blank("doc", SequenceType::Still)).unwrap();
        assert_ne!(base, hash_document(&blank("other", SequenceType::Still)).unwrap());
        assert_ne!(base, hash_document(&blank("doc", SequenceType::Comic)).unwrap());
    }

    #[test]
    fn test_known_digest() {
        let empty = hash_bytes(b"");
        assert_eq!(
            empty.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(empty.as_bytes()[0], 0xe3);
    }
}
