//! Parsing of the delimited argument string handed to the entry point.
//!
//! The format is `assemblyPath*typeName*methodName*payload`. The string is
//! split as raw UTF-16 and fields are kept verbatim, unpaired surrogates
//! included. Anything after the fourth field is ignored.

use crate::{ARGUMENT_DELIMITER, Error, Result};
use std::fmt;
use std::str::FromStr;

/// One managed method call: where to find it and what to pass it.
///
/// Fields are UTF-16 without a terminating null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// Path to the managed assembly.
    pub assembly_path: Vec<u16>,
    /// Fully qualified type name.
    pub type_name: Vec<u16>,
    /// Static method taking a single string and returning an int.
    pub method_name: Vec<u16>,
    /// Opaque argument forwarded to the method.
    pub payload: Vec<u16>,
}

impl InvocationRequest {
    /// Build a request from the UTF-16 argument string (no terminating null).
    pub fn from_wide(input: &[u16]) -> Result<Self> {
        let fields = split_fields(input, ARGUMENT_DELIMITER);
        match fields.as_slice() {
            [assembly_path, type_name, method_name, payload, ..] => Ok(Self {
                assembly_path: assembly_path.to_vec(),
                type_name: type_name.to_vec(),
                method_name: method_name.to_vec(),
                payload: payload.to_vec(),
            }),
            _ => Err(Error::MalformedArguments {
                found: fields.len(),
            }),
        }
    }

    /// Parse a request out of a delimited argument string.
    pub fn parse(input: &str) -> Result<Self> {
        let units: Vec<u16> = input.encode_utf16().collect();
        Self::from_wide(&units)
    }
}

impl FromStr for InvocationRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for InvocationRequest {
    /// Lossy rendering for log output only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{} from {}",
            String::from_utf16_lossy(&self.type_name),
            String::from_utf16_lossy(&self.method_name),
            String::from_utf16_lossy(&self.assembly_path)
        )
    }
}

/// Split `input` on every occurrence of `delimiter`.
///
/// Empty fields are kept, including ones produced by a leading or trailing
/// delimiter. An empty input yields one empty field.
pub fn split_fields(input: &[u16], delimiter: u16) -> Vec<&[u16]> {
    input.split(|&unit| unit == delimiter).collect()
}
