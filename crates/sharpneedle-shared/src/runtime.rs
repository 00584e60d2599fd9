//! Runtime acquisition and invocation over an abstract hosting API.
//!
//! The traits mirror the three CLR hosting interfaces the bootstrapper
//! walks through: meta host, runtime info and runtime host. Implementors
//! own one native reference each and release it on drop.

use crate::{Error, InvocationRequest, Result};
use log::{debug, warn};

/// Runtime discovery (`ICLRMetaHost`).
pub trait MetaHost {
    type Info: RuntimeInfo;

    /// Look up an installed runtime by version tag, e.g. `v4.0.30319`.
    fn runtime(&self, version: &str) -> Result<Self::Info>;
}

/// A single installed runtime (`ICLRRuntimeInfo`).
pub trait RuntimeInfo {
    type Host: RuntimeHost;

    /// Whether this runtime can be loaded side-by-side with whatever is
    /// already loaded in the process.
    fn is_loadable(&self) -> Result<bool>;

    /// Load the runtime and hand back its host interface.
    fn runtime_host(&self) -> Result<Self::Host>;
}

/// A loaded runtime (`ICLRRuntimeHost`).
pub trait RuntimeHost {
    /// Start the runtime. Must succeed if it is already running.
    fn start(&self) -> Result<()>;

    /// Run `request` in the default AppDomain and return the method's result.
    fn execute_in_default_app_domain(&self, request: &InvocationRequest) -> Result<u32>;
}

/// Host type produced by a given meta host.
pub type HostOf<M> = <<M as MetaHost>::Info as RuntimeInfo>::Host;

/// Find, load and start the runtime matching `version`.
///
/// Handles acquired along the way are dropped in reverse order on every
/// return path; only the runtime host outlives this call.
pub fn start_runtime<M, F>(create_meta_host: F, version: &str) -> Result<HostOf<M>>
where
    M: MetaHost,
    F: FnOnce() -> Result<M>,
{
    let meta_host = create_meta_host()?;
    debug!("Acquired CLR meta host");

    let runtime_info = meta_host.runtime(version)?;
    debug!("Found runtime {}", version);

    if !runtime_info.is_loadable()? {
        return Err(Error::RuntimeNotLoadable {
            version: version.to_owned(),
        });
    }

    let host = runtime_info.runtime_host()?;
    debug!("Obtained runtime host for {}", version);

    // A failed start is not fatal here; ExecuteInDefaultAppDomain reports it.
    if let Err(e) = host.start() {
        warn!("Runtime {} failed to start: {}", version, e);
    }

    Ok(host)
}

/// Execute `request` on `host`, blocking until the managed method returns.
pub fn invoke<H: RuntimeHost>(host: &H, request: &InvocationRequest) -> Result<u32> {
    debug!("Executing {}", request);

    let code = host.execute_in_default_app_domain(request)?;
    debug!("{} returned {}", request, code);

    Ok(code)
}
