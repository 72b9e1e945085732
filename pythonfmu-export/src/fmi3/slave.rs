//! The operations a co-simulation model must provide.

use std::{any::Any, ffi::CString};

use super::binding;
use crate::Error;

/// Outputs of a communication step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub status: binding::fmi3Status,
    pub event_handling_needed: bool,
    pub terminate_simulation: bool,
    pub early_return: bool,
    /// End of the step as reported by the model when it did not complete the full step.
    pub last_successful_time: Option<f64>,
}

impl StepResult {
    pub fn completed() -> Self {
        Self::with_status(binding::fmi3Status_fmi3OK)
    }

    pub fn with_status(status: binding::fmi3Status) -> Self {
        Self {
            status,
            event_handling_needed: false,
            terminate_simulation: false,
            early_return: false,
            last_successful_time: None,
        }
    }
}

/// Outputs of `fmi3UpdateDiscreteStates`
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DiscreteStates {
    pub discrete_states_need_update: bool,
    pub terminate_simulation: bool,
    pub nominals_of_continuous_states_changed: bool,
    pub values_of_continuous_states_changed: bool,
    pub next_event_time: Option<f64>,
}

/// An opaque snapshot of a model's state.
///
/// The host receives it as a [`binding::fmi3FMUState`] pointing at a boxed `FmuState`. Only the
/// model that produced a snapshot knows how to read it.
pub struct FmuState(Box<dyn Any + Send>);

impl std::fmt::Debug for FmuState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FmuState").finish_non_exhaustive()
    }
}

impl FmuState {
    pub fn new<T: Any + Send>(state: T) -> Self {
        Self(Box::new(state))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Hand ownership to the host
    pub fn into_raw(self) -> binding::fmi3FMUState {
        Box::into_raw(Box::new(self)) as binding::fmi3FMUState
    }

    /// Take ownership back from the host.
    ///
    /// # Safety
    /// `state` must be non-null and come from [`FmuState::into_raw`], and must not be used again.
    pub unsafe fn from_raw(state: binding::fmi3FMUState) -> Self {
        *unsafe { Box::from_raw(state as *mut FmuState) }
    }

    /// Borrow a host-held snapshot.
    ///
    /// # Safety
    /// `state` must be non-null and come from [`FmuState::into_raw`].
    pub unsafe fn from_raw_ref<'a>(state: binding::fmi3FMUState) -> &'a Self {
        unsafe { &*(state as *const FmuState) }
    }

    /// Mutable counterpart of [`FmuState::from_raw_ref`]. The host keeps ownership.
    ///
    /// # Safety
    /// As for [`FmuState::from_raw_ref`], and the snapshot must not be borrowed elsewhere.
    pub unsafe fn from_raw_mut<'a>(state: binding::fmi3FMUState) -> &'a mut Self {
        unsafe { &mut *(state as *mut FmuState) }
    }
}

macro_rules! default_getter_setter {
    ($name:ident, $ty:ty) => {
        $crate::paste::paste! {
            #[doc = "Get `" $name "` values."]
            fn [<get_ $name>](&mut self, vrs: &[binding::fmi3ValueReference], values: &mut [$ty]) -> Result<(), Error> {
                let _ = values;
                nonexistent("get", vrs)
            }

            #[doc = "Set `" $name "` values."]
            fn [<set_ $name>](&mut self, vrs: &[binding::fmi3ValueReference], values: &[$ty]) -> Result<(), Error> {
                let _ = values;
                nonexistent("set", vrs)
            }
        }
    };
}

fn nonexistent(action: &str, vrs: &[binding::fmi3ValueReference]) -> Result<(), Error> {
    if vrs.is_empty() {
        Ok(())
    } else {
        Err(Error::Model(format!(
            "Attempted to {action} nonexistent variable"
        )))
    }
}

/// A co-simulation model instance.
///
/// The lifecycle methods default to doing nothing, and the typed accessors default to
/// rejecting every value reference, so an implementation only provides what its model has.
pub trait SlaveInstance: Send {
    fn setup_experiment(
        &mut self,
        tolerance: Option<f64>,
        start_time: f64,
        stop_time: Option<f64>,
    ) -> Result<(), Error> {
        let _ = (tolerance, start_time, stop_time);
        Ok(())
    }

    fn enter_initialization_mode(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn exit_initialization_mode(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn terminate(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Return the model to the state it had right after instantiation.
    fn reset(&mut self) -> Result<(), Error>;

    default_getter_setter!(float64, f64);
    default_getter_setter!(int8, i8);
    default_getter_setter!(int16, i16);
    default_getter_setter!(int32, i32);
    default_getter_setter!(int64, i64);
    default_getter_setter!(uint8, u8);
    default_getter_setter!(uint16, u16);
    default_getter_setter!(uint32, u32);
    default_getter_setter!(uint64, u64);
    default_getter_setter!(boolean, bool);

    /// Get `string` values. The returned strings must stay alive until the next call, which is
    /// the caller's job.
    fn get_string(
        &mut self,
        vrs: &[binding::fmi3ValueReference],
        n_values: usize,
    ) -> Result<Vec<CString>, Error> {
        let _ = n_values;
        nonexistent("get", vrs).map(|_| Vec::new())
    }

    fn set_string(
        &mut self,
        vrs: &[binding::fmi3ValueReference],
        values: &[&str],
    ) -> Result<(), Error> {
        let _ = values;
        nonexistent("set", vrs)
    }

    fn do_step(
        &mut self,
        current_communication_point: f64,
        communication_step_size: f64,
        no_set_fmu_state_prior_to_current_point: bool,
    ) -> Result<StepResult, Error>;

    fn update_discrete_states(&mut self) -> Result<DiscreteStates, Error> {
        Ok(DiscreteStates::default())
    }

    fn get_fmu_state(&mut self) -> Result<FmuState, Error> {
        Err(Error::Unsupported("fmi3GetFMUState"))
    }

    fn set_fmu_state(&mut self, state: &FmuState) -> Result<(), Error> {
        let _ = state;
        Err(Error::Unsupported("fmi3SetFMUState"))
    }

    /// Release a snapshot without consulting the model.
    fn free_fmu_state(&mut self, state: FmuState) -> Result<(), Error> {
        drop(state);
        Ok(())
    }

    /// Byte representation of a snapshot. Must not modify the snapshot or the model.
    fn serialize_fmu_state(&mut self, state: &FmuState) -> Result<Vec<u8>, Error> {
        let _ = state;
        Err(Error::Unsupported("fmi3SerializeFMUState"))
    }

    fn deserialize_fmu_state(&mut self, bytes: &[u8]) -> Result<FmuState, Error> {
        let _ = bytes;
        Err(Error::Unsupported("fmi3DeserializeFMUState"))
    }
}
