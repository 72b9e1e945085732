//! ## Architecture
//!
//! The exported C functions in [`export`] operate on a [`binding::fmi3Instance`], which is an
//! opaque pointer to a [`ModelInstance`]. Each call is routed through
//! [`ModelInstance::invoke`], which enforces the FMI state machine, contains panics and turns
//! the crate [`Error`](crate::Error) into a status code.
//!
//! The model itself sits behind the [`SlaveInstance`] trait. [`PySlaveInstance`] is the
//! implementation that loads a Python class from the FMU resources and drives it through the
//! embedded interpreter managed by [`runtime`].

pub mod export;
mod instance;
pub mod logger;
mod macros;
mod python;
pub mod runtime;
mod slave;
#[cfg(feature = "unload-hook")]
mod unload;

pub use fmi::fmi3::{Fmi3Error, Fmi3Res, Fmi3Status};
pub use fmi_sys::fmi3 as binding;
pub use instance::ModelInstance;
pub use logger::{LogRecord, Logger, LoggerSettings};
pub use python::PySlaveInstance;
pub use slave::{DiscreteStates, FmuState, SlaveInstance, StepResult};

/// Represents the current state of the model instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Instantiated,
    ConfigurationMode,
    InitializationMode,
    EventMode,
    StepMode,
    ReconfigurationMode,
    Terminated,
    /// A fatal error was reported; only `fmi3FreeInstance` remains meaningful.
    Fatal,
}

/// Parse a status code reported by a model, rejecting values outside the FMI range.
pub fn status_from_code(code: i64) -> Option<binding::fmi3Status> {
    [
        binding::fmi3Status_fmi3OK,
        binding::fmi3Status_fmi3Warning,
        binding::fmi3Status_fmi3Discard,
        binding::fmi3Status_fmi3Error,
        binding::fmi3Status_fmi3Fatal,
    ]
    .into_iter()
    .find(|status| i64::from(*status) == code)
}

/// The raw code of an FMI outcome.
pub fn status_code(status: impl Into<Fmi3Status>) -> binding::fmi3Status {
    let status: Fmi3Status = status.into();
    status.into()
}

pub fn is_fatal(status: binding::fmi3Status) -> bool {
    matches!(Fmi3Status::from(status).ok(), Err(Fmi3Error::Fatal))
}
