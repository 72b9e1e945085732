use std::{
    any::Any,
    ffi::CString,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use super::{
    binding, is_fatal,
    logger::{status_category, Logger},
    status_code, Fmi3Res, Fmi3Status, ModelState, SlaveInstance,
};
use crate::Error;

mod co_simulation;
mod common;
mod fmu_state;
mod get_set;

/// An exported FMU instance: the state machine around one [`SlaveInstance`].
pub struct ModelInstance {
    instance_name: String,
    logger: Arc<Logger>,
    state: ModelState,
    event_mode_used: bool,
    last_successful_time: f64,
    /// Keeps the strings handed out by the last `fmi3GetString` alive.
    strings: Vec<CString>,
    slave: Box<dyn SlaveInstance>,
}

impl std::fmt::Debug for ModelInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelInstance")
            .field("instance_name", &self.instance_name)
            .field("state", &self.state)
            .field("last_successful_time", &self.last_successful_time)
            .finish_non_exhaustive()
    }
}

impl ModelInstance {
    pub fn new(
        instance_name: String,
        logger: Arc<Logger>,
        event_mode_used: bool,
        slave: Box<dyn SlaveInstance>,
    ) -> Self {
        Self {
            instance_name,
            logger,
            state: ModelState::Instantiated,
            event_mode_used,
            last_successful_time: 0.0,
            strings: Vec::new(),
            slave,
        }
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// End of the last communication step, as reported to the host.
    pub fn last_successful_time(&self) -> f64 {
        self.last_successful_time
    }

    /// Run `op` against this instance and translate the outcome into an FMI status.
    ///
    /// Messages queued by the model are forwarded after the call, followed by the error message
    /// if there is one. A fatal outcome, returned or reported, poisons the instance: every later
    /// call fails with `fmi3Fatal`.
    pub fn invoke<R, F>(&mut self, function: &'static str, op: F) -> binding::fmi3Status
    where
        R: Into<Fmi3Status>,
        F: FnOnce(&mut Self) -> Result<R, Error>,
    {
        let result = if self.state == ModelState::Fatal {
            Err(Error::Fatal(format!(
                "{} is in an unrecoverable state",
                self.instance_name
            )))
        } else {
            panic::catch_unwind(AssertUnwindSafe(|| op(self)))
                .unwrap_or_else(|payload| Err(Error::Panic(panic_message(&*payload))))
        };

        self.logger.flush();

        let status = match result {
            Ok(res) => status_code(res),
            Err(err) => {
                let status = status_code(err.severity());
                self.logger
                    .log(status, status_category(status), &format!("{function}: {err}"));
                status
            }
        };

        if is_fatal(status) {
            self.state = ModelState::Fatal;
        }
        status
    }

    /// Like [`Self::invoke`], but only legal in the given states.
    pub fn invoke_in<R, F>(
        &mut self,
        function: &'static str,
        allowed: &[ModelState],
        op: F,
    ) -> binding::fmi3Status
    where
        R: Into<Fmi3Status>,
        F: FnOnce(&mut Self) -> Result<R, Error>,
    {
        self.invoke(function, |this| {
            if !allowed.contains(&this.state) {
                return Err(Error::IllegalState {
                    function,
                    state: this.state,
                });
            }
            op(this)
        })
    }

    /// Report an entry point that is not implemented.
    pub fn unsupported(&self, function: &'static str) -> binding::fmi3Status {
        let err = Error::Unsupported(function);
        let status = status_code(err.severity());
        self.logger
            .log(status, status_category(status), &err.to_string());
        status
    }

    /// Reject a call whose arguments cannot be read.
    pub fn invalid_argument(&mut self, function: &'static str, reason: &str) -> binding::fmi3Status {
        self.invoke(function, |_| {
            Err::<Fmi3Res, _>(Error::Model(format!("invalid argument: {reason}")))
        })
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
