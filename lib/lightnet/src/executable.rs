//! Resolving declared operations into calls.

use crate::{Arg, Call, HttpManager, Operation, Result, resolve};

/// Binds declared [`Operation`]s to a manager and an optional base URL.
///
/// Generated `#[network_api]` clients hold one; it can also be used
/// directly with hand-built operations:
///
/// ```ignore
/// use lightnet::{NetworkExecutable, Operation, ParamRole, ToArg, VerbMarker};
///
/// static GET_ITEM: Operation = Operation::new(
///     "item",
///     &[VerbMarker::get("/items/{id}")],
///     &[ParamRole::Path("id")],
/// );
///
/// let executable = NetworkExecutable::with_base_url(manager, "https://api.example.com");
/// let response = executable.request(&GET_ITEM, vec![42_u64.to_arg()])?.send().await?;
/// ```
#[derive(Debug, Clone)]
pub struct NetworkExecutable {
    manager: HttpManager,
    base_url: Option<String>,
}

impl NetworkExecutable {
    /// Executable without a global base URL: verb paths must be absolute.
    #[must_use]
    pub const fn new(manager: HttpManager) -> Self {
        Self {
            manager,
            base_url: None,
        }
    }

    /// Executable prefixing every verb path with `base_url`.
    #[must_use]
    pub fn with_base_url(manager: HttpManager, base_url: impl Into<String>) -> Self {
        Self {
            manager,
            base_url: Some(base_url.into()),
        }
    }

    /// The global base URL, if any.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// The manager executing resolved calls.
    #[must_use]
    pub const fn manager(&self) -> &HttpManager {
        &self.manager
    }

    /// Resolve `operation` with `args` into a call.
    ///
    /// # Errors
    ///
    /// Returns configuration or resolution errors synchronously; nothing is
    /// sent until the call is dispatched.
    pub fn request(&self, operation: &Operation, args: Vec<Arg>) -> Result<Call> {
        let descriptor = resolve(self.base_url.as_deref(), operation, args)?;
        Ok(self.manager.call(descriptor))
    }
}
