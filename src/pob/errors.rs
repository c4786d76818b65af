//! Path of Building import errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PobError {
    /// The build string is not valid base64 in either alphabet.
    #[error("invalid base64-encoded PoB string: {reason}")]
    InvalidBase64 { reason: String },

    /// The decoded payload is not a zlib stream.
    #[error("unable to decompress PoB data: {reason}")]
    Decompress { reason: String },

    /// The inflated payload is not well-formed XML.
    #[error("unable to parse PoB XML data: {reason}")]
    Xml { reason: String },
}

impl From<quick_xml::Error> for PobError {
    fn from(e: quick_xml::Error) -> Self {
        PobError::Xml {
            reason: e.to_string(),
        }
    }
}
