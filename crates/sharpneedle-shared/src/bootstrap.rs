//! The full parse → acquire → invoke chain behind the exported entry point.

use crate::runtime::{MetaHost, invoke, start_runtime};
use crate::{InvocationRequest, Result};

/// Parse the UTF-16 `input`, bring up runtime `version` and run the
/// requested method.
///
/// Returns the managed method's exit code. Nothing is acquired when the
/// input is malformed, and nothing is invoked when acquisition fails.
pub fn bootstrap<M, F>(input: &[u16], version: &str, create_meta_host: F) -> Result<u32>
where
    M: MetaHost,
    F: FnOnce() -> Result<M>,
{
    let request = InvocationRequest::from_wide(input)?;
    let host = start_runtime(create_meta_host, version)?;
    invoke(&host, &request)
}
