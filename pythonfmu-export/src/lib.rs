#![doc=include_str!( "../README.md")]
//! ## Feature flags
#![doc = document_features::document_features!()]
#![deny(clippy::all)]
#![deny(deref_nullptr)]
#![deny(invalid_value)]
#![deny(invalid_from_utf8)]
#![deny(static_mut_refs)]

pub mod config;
pub mod fmi3;

// Re-export paste for use in macros
#[doc(hidden)]
pub use paste;

/// Errors raised while serving an FMI call.
///
/// Every variant maps onto an FMI status in exactly one place, the instance call wrapper, so no
/// embedded-runtime error type ever reaches the exported functions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The call failed but the instance remains usable.
    #[error("{0}")]
    Model(String),

    /// The instance can no longer be trusted. Any failure inside the embedded Python runtime is
    /// reported this way.
    #[error("{0}")]
    Fatal(String),

    /// The entry point is deliberately not implemented.
    #[error("FMI function not supported: {0}")]
    Unsupported(&'static str),

    /// `function` is not allowed in the current state of the instance. The message leaves out
    /// the function name since every reported error is already prefixed with it.
    #[error("not allowed in state {state:?}")]
    IllegalState {
        function: &'static str,
        state: fmi3::ModelState,
    },

    #[error("Unsupported FMU instance type requested (only co-simulation is supported)")]
    UnsupportedInstanceType,

    /// A Rust panic was caught at the ABI boundary.
    #[error("internal error: {0}")]
    Panic(String),
}

impl Error {
    /// The FMI severity this error is reported with.
    pub fn severity(&self) -> fmi3::Fmi3Error {
        match self {
            Error::Fatal(_) => fmi3::Fmi3Error::Fatal,
            _ => fmi3::Fmi3Error::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_severity() {
        let illegal = Error::IllegalState {
            function: "fmi3DoStep",
            state: fmi3::ModelState::Instantiated,
        };
        assert_eq!(illegal.to_string(), "not allowed in state Instantiated");
        assert!(matches!(illegal.severity(), fmi3::Fmi3Error::Error));
        assert!(matches!(
            Error::Unsupported("fmi3GetClock").severity(),
            fmi3::Fmi3Error::Error
        ));
        assert!(matches!(
            Error::Fatal("gone".to_owned()).severity(),
            fmi3::Fmi3Error::Fatal
        ));
    }
}
