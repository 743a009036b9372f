//! Operation record, its at-rest document shape, and the arguments codec.

use serde::{Deserialize, Serialize};

use crate::types::{Flavor, Operand, RecordId};

/// Immutable unit of persistence: one successful arithmetic evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Sequential id assigned by the relational store.
    pub id: RecordId,
    /// Call path that produced the record.
    pub flavor: Flavor,
    /// Lower-cased operation name as invoked.
    pub operation: String,
    /// Computed result.
    pub result: Operand,
    /// Operands consumed, in order.
    pub arguments: Vec<Operand>,
}

impl OperationRecord {
    /// Builds the at-rest document for the mirror store.
    pub fn to_document(&self) -> Result<OperationDocument, serde_json::Error> {
        Ok(OperationDocument {
            rawid: self.id,
            flavor: self.flavor.as_str().to_string(),
            operation: self.operation.clone(),
            result: self.result,
            arguments: encode_arguments(&self.arguments)?,
        })
    }
}

/// Document shape stored in the mirror store.
///
/// The public `id` lives in `rawid` so it never collides with the store's
/// native identity field, which is excluded from every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDocument {
    /// Internal copy of the record id.
    pub rawid: RecordId,
    /// Flavor token.
    pub flavor: String,
    /// Operation name.
    pub operation: String,
    /// Computed result.
    pub result: Operand,
    /// JSON-encoded operand array.
    pub arguments: String,
}

/// Error raised when an at-rest record cannot be mapped back.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Stored flavor token is not recognized.
    #[error("unknown flavor token: {0}")]
    Flavor(String),
    /// Stored arguments are not a JSON integer array.
    #[error("malformed arguments: {0}")]
    Arguments(#[from] serde_json::Error),
}

impl TryFrom<OperationDocument> for OperationRecord {
    type Error = DecodeError;

    fn try_from(doc: OperationDocument) -> Result<Self, Self::Error> {
        let flavor = Flavor::parse(&doc.flavor).ok_or(DecodeError::Flavor(doc.flavor))?;
        Ok(Self {
            id: doc.rawid,
            flavor,
            operation: doc.operation,
            result: doc.result,
            arguments: decode_arguments(&doc.arguments)?,
        })
    }
}

/// Encodes operands as a JSON array string.
pub fn encode_arguments(arguments: &[Operand]) -> Result<String, serde_json::Error> {
    serde_json::to_string(arguments)
}

/// Decodes a JSON array string back into operands.
pub fn decode_arguments(raw: &str) -> Result<Vec<Operand>, serde_json::Error> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_codec_keeps_order_and_sign() {
        let raw = encode_arguments(&[7, -3]).expect("encode");
        assert_eq!(raw, "[7,-3]");
        assert_eq!(decode_arguments(&raw).expect("decode"), vec![7, -3]);
        assert_eq!(decode_arguments("[]").expect("decode"), Vec::<Operand>::new());
    }

    #[test]
    fn document_maps_rawid_back_to_id() {
        let rec = OperationRecord {
            id: 4,
            flavor: Flavor::Stack,
            operation: "minus".to_string(),
            result: 2,
            arguments: vec![5, 3],
        };
        let doc = rec.to_document().expect("document");
        assert_eq!(doc.rawid, 4);
        assert_eq!(doc.flavor, "STACK");
        assert_eq!(OperationRecord::try_from(doc).expect("decode"), rec);
    }

    #[test]
    fn unknown_flavor_is_rejected() {
        let doc = OperationDocument {
            rawid: 1,
            flavor: "BATCH".to_string(),
            operation: "plus".to_string(),
            result: 0,
            arguments: "[]".to_string(),
        };
        assert!(matches!(
            OperationRecord::try_from(doc),
            Err(DecodeError::Flavor(_))
        ));
    }
}
