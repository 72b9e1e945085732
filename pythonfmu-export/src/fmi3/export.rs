//! The exported FMI 3.0 C API.
//!
//! Every function resolves the instance pointer, turns the host's raw arrays into slices and
//! hands over to [`ModelInstance`]. Functions outside the Co-Simulation subset are exported too,
//! and report themselves as unsupported.
#![allow(clippy::missing_safety_doc, clippy::too_many_arguments)]

use std::{
    ffi::{c_char, CStr},
    panic::{self, AssertUnwindSafe},
    path::PathBuf,
    ptr,
    sync::Arc,
};

use url::Url;

use super::{
    binding,
    instance::panic_message,
    logger::{status_category, Logger},
    macros::{checked_deref, export_getter_setter, export_unsupported, host_slice},
    status_code, DiscreteStates, FmuState, ModelInstance, PySlaveInstance,
};
use crate::{config::SlaveConfig, Error};

/// Borrow `len` elements at `ptr`. A null pointer is only accepted for an empty array.
///
/// # Safety
/// A non-null `ptr` must point at `len` initialized elements that outlive `'a`.
pub(crate) unsafe fn host_slice<'a, T>(ptr: *const T, len: usize) -> Option<&'a [T]> {
    if len == 0 {
        Some(&[])
    } else if ptr.is_null() {
        None
    } else {
        Some(unsafe { std::slice::from_raw_parts(ptr, len) })
    }
}

/// Mutable counterpart of [`host_slice`].
///
/// # Safety
/// A non-null `ptr` must point at `len` elements that outlive `'a` and are not aliased.
pub(crate) unsafe fn host_slice_mut<'a, T>(ptr: *mut T, len: usize) -> Option<&'a mut [T]> {
    if len == 0 {
        Some(&mut [])
    } else if ptr.is_null() {
        None
    } else {
        Some(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
    }
}

unsafe fn owned_string(ptr: binding::fmi3String) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

/// The resource directory named by `resourcePath`: a plain path, or a `file:` URI.
fn resource_dir(resource_path: &str) -> Result<PathBuf, Error> {
    if !resource_path.starts_with("file:") {
        return Ok(PathBuf::from(resource_path));
    }
    let url = Url::parse(resource_path)
        .map_err(|e| Error::Fatal(format!("Invalid resource URI {resource_path:?}: {e}")))?;
    url.to_file_path()
        .map_err(|_| Error::Fatal(format!("Resource URI {resource_path:?} is not a local path")))
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3GetVersion() -> *const c_char {
    binding::fmi3Version.as_ptr() as *const c_char
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3SetDebugLogging(
    instance: binding::fmi3Instance,
    logging_on: binding::fmi3Boolean,
    n_categories: usize,
    categories: *const binding::fmi3String,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    let categories = host_slice!(instance, "fmi3SetDebugLogging", categories, n_categories)
        .iter()
        .filter_map(|category| unsafe { owned_string(*category) })
        .collect();
    instance.set_debug_logging(logging_on, categories)
}

/* Creation and destruction of FMU instances */

fn instantiate_co_simulation(
    instance_name: Option<String>,
    resource_path: Option<String>,
    visible: bool,
    event_mode_used: bool,
    logger: &Arc<Logger>,
) -> Result<ModelInstance, Error> {
    let name =
        instance_name.ok_or_else(|| Error::Fatal("instanceName must not be null".to_owned()))?;
    let resource_path =
        resource_path.ok_or_else(|| Error::Fatal("resourcePath must not be null".to_owned()))?;
    let resources = resource_dir(&resource_path)?;

    let slave = PySlaveInstance::new(
        &name,
        &resources,
        logger.clone(),
        visible,
        &SlaveConfig::from_env(),
    )?;
    Ok(ModelInstance::new(
        name,
        logger.clone(),
        event_mode_used,
        Box::new(slave),
    ))
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3InstantiateCoSimulation(
    instance_name: binding::fmi3String,
    _instantiation_token: binding::fmi3String,
    resource_path: binding::fmi3String,
    visible: binding::fmi3Boolean,
    logging_on: binding::fmi3Boolean,
    event_mode_used: binding::fmi3Boolean,
    _early_return_allowed: binding::fmi3Boolean,
    _required_intermediate_variables: *const binding::fmi3ValueReference,
    _n_required_intermediate_variables: usize,
    instance_environment: binding::fmi3InstanceEnvironment,
    log_message: binding::fmi3LogMessageCallback,
    _intermediate_update: binding::fmi3IntermediateUpdateCallback,
) -> binding::fmi3Instance {
    let logger = Arc::new(Logger::new(instance_environment, log_message, logging_on));
    let instance_name = unsafe { owned_string(instance_name) };
    let resource_path = unsafe { owned_string(resource_path) };

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        instantiate_co_simulation(instance_name, resource_path, visible, event_mode_used, &logger)
    }))
    .unwrap_or_else(|payload| Err(Error::Panic(panic_message(&*payload))));

    logger.flush();
    match result {
        Ok(instance) => {
            log::debug!("Instantiated {}", instance.instance_name());
            Box::into_raw(Box::new(instance)) as binding::fmi3Instance
        }
        Err(err) => {
            let status = status_code(err.severity());
            let message = format!("fmi3InstantiateCoSimulation: {err}");
            log::debug!("{message}");
            logger.log(status, status_category(status), &message);
            ptr::null_mut()
        }
    }
}

/// Report a request for an instance kind other than co-simulation.
fn reject_instance_type(
    function: &str,
    instance_environment: binding::fmi3InstanceEnvironment,
    log_message: binding::fmi3LogMessageCallback,
) -> binding::fmi3Instance {
    let err = Error::UnsupportedInstanceType;
    log::error!("{function}: {err}");
    let status = status_code(err.severity());
    Logger::new(instance_environment, log_message, false).log(
        status,
        status_category(status),
        &err.to_string(),
    );
    ptr::null_mut()
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3InstantiateModelExchange(
    _instance_name: binding::fmi3String,
    _instantiation_token: binding::fmi3String,
    _resource_path: binding::fmi3String,
    _visible: binding::fmi3Boolean,
    _logging_on: binding::fmi3Boolean,
    instance_environment: binding::fmi3InstanceEnvironment,
    log_message: binding::fmi3LogMessageCallback,
) -> binding::fmi3Instance {
    reject_instance_type(
        "fmi3InstantiateModelExchange",
        instance_environment,
        log_message,
    )
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3InstantiateScheduledExecution(
    _instance_name: binding::fmi3String,
    _instantiation_token: binding::fmi3String,
    _resource_path: binding::fmi3String,
    _visible: binding::fmi3Boolean,
    _logging_on: binding::fmi3Boolean,
    instance_environment: binding::fmi3InstanceEnvironment,
    log_message: binding::fmi3LogMessageCallback,
    _clock_update: binding::fmi3ClockUpdateCallback,
    _lock_preemption: binding::fmi3LockPreemptionCallback,
    _unlock_preemption: binding::fmi3UnlockPreemptionCallback,
) -> binding::fmi3Instance {
    reject_instance_type(
        "fmi3InstantiateScheduledExecution",
        instance_environment,
        log_message,
    )
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3FreeInstance(instance: binding::fmi3Instance) {
    if instance.is_null() {
        log::error!("fmi3FreeInstance: Invalid FMU instance");
        return;
    }
    let instance = unsafe { Box::from_raw(instance as *mut ModelInstance) };
    log::debug!("Freeing {}", instance.instance_name());
    // The Python object and the runtime handle go with the instance
    if panic::catch_unwind(AssertUnwindSafe(move || drop(instance))).is_err() {
        log::error!("fmi3FreeInstance: panic while releasing the instance");
    }
}

/* Enter and exit initialization mode, terminate and reset */

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3EnterInitializationMode(
    instance: binding::fmi3Instance,
    tolerance_defined: binding::fmi3Boolean,
    tolerance: binding::fmi3Float64,
    start_time: binding::fmi3Float64,
    stop_time_defined: binding::fmi3Boolean,
    stop_time: binding::fmi3Float64,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    instance.enter_initialization_mode(
        tolerance_defined.then_some(tolerance),
        start_time,
        stop_time_defined.then_some(stop_time),
    )
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3ExitInitializationMode(
    instance: binding::fmi3Instance,
) -> binding::fmi3Status {
    checked_deref!(instance).exit_initialization_mode()
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3EnterEventMode(instance: binding::fmi3Instance) -> binding::fmi3Status {
    checked_deref!(instance).enter_event_mode()
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3Terminate(instance: binding::fmi3Instance) -> binding::fmi3Status {
    checked_deref!(instance).terminate()
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3Reset(instance: binding::fmi3Instance) -> binding::fmi3Status {
    checked_deref!(instance).reset()
}

/* Getting and setting variable values */

export_getter_setter!(float64, f64, Float64);
export_getter_setter!(int8, i8, Int8);
export_getter_setter!(int16, i16, Int16);
export_getter_setter!(int32, i32, Int32);
export_getter_setter!(int64, i64, Int64);
export_getter_setter!(uint8, u8, UInt8);
export_getter_setter!(uint16, u16, UInt16);
export_getter_setter!(uint32, u32, UInt32);
export_getter_setter!(uint64, u64, UInt64);
export_getter_setter!(boolean, bool, Boolean);

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3GetString(
    instance: binding::fmi3Instance,
    value_references: *const binding::fmi3ValueReference,
    n_value_references: usize,
    values: *mut binding::fmi3String,
    n_values: usize,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    let vrs = host_slice!(instance, "fmi3GetString", value_references, n_value_references);
    let values = host_slice!(mut instance, "fmi3GetString", values, n_values);
    instance.get_string(vrs, values)
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3SetString(
    instance: binding::fmi3Instance,
    value_references: *const binding::fmi3ValueReference,
    n_value_references: usize,
    values: *const binding::fmi3String,
    n_values: usize,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    let vrs = host_slice!(instance, "fmi3SetString", value_references, n_value_references);
    let values = host_slice!(instance, "fmi3SetString", values, n_values);
    let strings = values
        .iter()
        .map(|value| {
            if value.is_null() {
                None
            } else {
                unsafe { CStr::from_ptr(*value) }.to_str().ok()
            }
        })
        .collect::<Option<Vec<&str>>>();
    match strings {
        Some(strings) => instance.set_string(vrs, &strings),
        None => instance.invalid_argument("fmi3SetString", "values must be non-null UTF-8 strings"),
    }
}

/* Getting and setting the internal FMU state */

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3GetFMUState(
    instance: binding::fmi3Instance,
    fmu_state: *mut binding::fmi3FMUState,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    let Some(fmu_state) = (unsafe { fmu_state.as_mut() }) else {
        return instance.invalid_argument("fmi3GetFMUState", "`FMUState` is null");
    };
    if !fmu_state.is_null() {
        // Reuse the host's snapshot so its handle stays valid
        return instance.overwrite_fmu_state(unsafe { FmuState::from_raw_mut(*fmu_state) });
    }
    let mut slot = None;
    let status = instance.get_fmu_state(&mut slot);
    if let Some(state) = slot {
        *fmu_state = state.into_raw();
    }
    status
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3SetFMUState(
    instance: binding::fmi3Instance,
    fmu_state: binding::fmi3FMUState,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    if fmu_state.is_null() {
        return instance.invalid_argument("fmi3SetFMUState", "`FMUState` is null");
    }
    instance.set_fmu_state(unsafe { FmuState::from_raw_ref(fmu_state) })
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3FreeFMUState(
    instance: binding::fmi3Instance,
    fmu_state: *mut binding::fmi3FMUState,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    let state = match unsafe { fmu_state.as_mut() } {
        Some(fmu_state) if !fmu_state.is_null() => {
            let state = unsafe { FmuState::from_raw(*fmu_state) };
            *fmu_state = ptr::null_mut();
            Some(state)
        }
        _ => None,
    };
    instance.free_fmu_state(state)
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3SerializedFMUStateSize(
    instance: binding::fmi3Instance,
    fmu_state: binding::fmi3FMUState,
    size: *mut usize,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    let Some(size) = (unsafe { size.as_mut() }) else {
        return instance.invalid_argument("fmi3SerializedFMUStateSize", "`size` is null");
    };
    if fmu_state.is_null() {
        return instance.invalid_argument("fmi3SerializedFMUStateSize", "`FMUState` is null");
    }
    instance.serialized_fmu_state_size(unsafe { FmuState::from_raw_ref(fmu_state) }, size)
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3SerializeFMUState(
    instance: binding::fmi3Instance,
    fmu_state: binding::fmi3FMUState,
    serialized_state: *mut binding::fmi3Byte,
    size: usize,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    if fmu_state.is_null() {
        return instance.invalid_argument("fmi3SerializeFMUState", "`FMUState` is null");
    }
    let buffer = host_slice!(mut instance, "fmi3SerializeFMUState", serialized_state, size);
    instance.serialize_fmu_state(unsafe { FmuState::from_raw_ref(fmu_state) }, buffer)
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3DeserializeFMUState(
    instance: binding::fmi3Instance,
    serialized_state: *const binding::fmi3Byte,
    size: usize,
    fmu_state: *mut binding::fmi3FMUState,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    let bytes = host_slice!(instance, "fmi3DeserializeFMUState", serialized_state, size);
    let Some(fmu_state) = (unsafe { fmu_state.as_mut() }) else {
        return instance.invalid_argument("fmi3DeserializeFMUState", "`FMUState` is null");
    };
    let mut slot = None;
    let status = instance.deserialize_fmu_state(bytes, &mut slot);
    if let Some(state) = slot {
        *fmu_state = state.into_raw();
    }
    status
}

/* Configuration and event modes */

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3EnterConfigurationMode(
    instance: binding::fmi3Instance,
) -> binding::fmi3Status {
    checked_deref!(instance).enter_configuration_mode()
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3ExitConfigurationMode(
    instance: binding::fmi3Instance,
) -> binding::fmi3Status {
    checked_deref!(instance).exit_configuration_mode()
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3UpdateDiscreteStates(
    instance: binding::fmi3Instance,
    discrete_states_need_update: *mut binding::fmi3Boolean,
    terminate_simulation: *mut binding::fmi3Boolean,
    nominals_of_continuous_states_changed: *mut binding::fmi3Boolean,
    values_of_continuous_states_changed: *mut binding::fmi3Boolean,
    next_event_time_defined: *mut binding::fmi3Boolean,
    next_event_time: *mut binding::fmi3Float64,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    let (
        Some(discrete_states_need_update),
        Some(terminate_simulation),
        Some(nominals_of_continuous_states_changed),
        Some(values_of_continuous_states_changed),
        Some(next_event_time_defined),
        Some(next_event_time),
    ) = (unsafe {
        (
            discrete_states_need_update.as_mut(),
            terminate_simulation.as_mut(),
            nominals_of_continuous_states_changed.as_mut(),
            values_of_continuous_states_changed.as_mut(),
            next_event_time_defined.as_mut(),
            next_event_time.as_mut(),
        )
    }) else {
        return instance.invalid_argument("fmi3UpdateDiscreteStates", "output argument is null");
    };

    let mut states = DiscreteStates::default();
    let status = instance.update_discrete_states(&mut states);
    *discrete_states_need_update = states.discrete_states_need_update;
    *terminate_simulation = states.terminate_simulation;
    *nominals_of_continuous_states_changed = states.nominals_of_continuous_states_changed;
    *values_of_continuous_states_changed = states.values_of_continuous_states_changed;
    *next_event_time_defined = states.next_event_time.is_some();
    *next_event_time = states.next_event_time.unwrap_or_default();
    status
}

/* Functions for Co-Simulation */

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3EnterStepMode(instance: binding::fmi3Instance) -> binding::fmi3Status {
    checked_deref!(instance).enter_step_mode()
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn fmi3DoStep(
    instance: binding::fmi3Instance,
    current_communication_point: binding::fmi3Float64,
    communication_step_size: binding::fmi3Float64,
    no_set_fmu_state_prior_to_current_point: binding::fmi3Boolean,
    event_handling_needed: *mut binding::fmi3Boolean,
    terminate_simulation: *mut binding::fmi3Boolean,
    early_return: *mut binding::fmi3Boolean,
    last_successful_time: *mut binding::fmi3Float64,
) -> binding::fmi3Status {
    let instance = checked_deref!(instance);
    let (
        Some(event_handling_needed),
        Some(terminate_simulation),
        Some(early_return),
        Some(last_successful_time),
    ) = (unsafe {
        (
            event_handling_needed.as_mut(),
            terminate_simulation.as_mut(),
            early_return.as_mut(),
            last_successful_time.as_mut(),
        )
    }) else {
        return instance.invalid_argument("fmi3DoStep", "output argument is null");
    };

    instance.do_step(
        current_communication_point,
        communication_step_size,
        no_set_fmu_state_prior_to_current_point,
        event_handling_needed,
        terminate_simulation,
        early_return,
        last_successful_time,
    )
}

/* Unsupported */

export_unsupported! {
    fmi3GetFloat32(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        values: *mut binding::fmi3Float32,
        n_values: usize,
    );
    fmi3SetFloat32(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        values: *const binding::fmi3Float32,
        n_values: usize,
    );
    fmi3GetBinary(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        value_sizes: *mut usize,
        values: *mut binding::fmi3Binary,
        n_values: usize,
    );
    fmi3SetBinary(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        value_sizes: *const usize,
        values: *const binding::fmi3Binary,
        n_values: usize,
    );
    fmi3GetClock(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        values: *mut binding::fmi3Clock,
    );
    fmi3SetClock(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        values: *const binding::fmi3Clock,
    );
    fmi3GetNumberOfVariableDependencies(
        value_reference: binding::fmi3ValueReference,
        n_dependencies: *mut usize,
    );
    fmi3GetVariableDependencies(
        dependent: binding::fmi3ValueReference,
        element_indices_of_dependent: *mut usize,
        independents: *mut binding::fmi3ValueReference,
        element_indices_of_independents: *mut usize,
        dependency_kinds: *mut binding::fmi3DependencyKind,
        n_dependencies: usize,
    );
    fmi3GetDirectionalDerivative(
        unknowns: *const binding::fmi3ValueReference,
        n_unknowns: usize,
        knowns: *const binding::fmi3ValueReference,
        n_knowns: usize,
        seed: *const binding::fmi3Float64,
        n_seed: usize,
        sensitivity: *mut binding::fmi3Float64,
        n_sensitivity: usize,
    );
    fmi3GetAdjointDerivative(
        unknowns: *const binding::fmi3ValueReference,
        n_unknowns: usize,
        knowns: *const binding::fmi3ValueReference,
        n_knowns: usize,
        seed: *const binding::fmi3Float64,
        n_seed: usize,
        sensitivity: *mut binding::fmi3Float64,
        n_sensitivity: usize,
    );
    fmi3GetOutputDerivatives(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        orders: *const binding::fmi3Int32,
        values: *mut binding::fmi3Float64,
        n_values: usize,
    );
    fmi3GetIntervalDecimal(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        intervals: *mut binding::fmi3Float64,
        qualifiers: *mut binding::fmi3IntervalQualifier,
    );
    fmi3GetIntervalFraction(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        counters: *mut binding::fmi3UInt64,
        resolutions: *mut binding::fmi3UInt64,
        qualifiers: *mut binding::fmi3IntervalQualifier,
    );
    fmi3GetShiftDecimal(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        shifts: *mut binding::fmi3Float64,
    );
    fmi3GetShiftFraction(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        counters: *mut binding::fmi3UInt64,
        resolutions: *mut binding::fmi3UInt64,
    );
    fmi3SetIntervalDecimal(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        intervals: *const binding::fmi3Float64,
    );
    fmi3SetIntervalFraction(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        counters: *const binding::fmi3UInt64,
        resolutions: *const binding::fmi3UInt64,
    );
    fmi3SetShiftDecimal(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        shifts: *const binding::fmi3Float64,
    );
    fmi3SetShiftFraction(
        value_references: *const binding::fmi3ValueReference,
        n_value_references: usize,
        counters: *const binding::fmi3UInt64,
        resolutions: *const binding::fmi3UInt64,
    );
    fmi3EvaluateDiscreteStates();
    fmi3ActivateModelPartition(
        clock_reference: binding::fmi3ValueReference,
        activation_time: binding::fmi3Float64,
    );
    fmi3EnterContinuousTimeMode();
    fmi3CompletedIntegratorStep(
        no_set_fmu_state_prior_to_current_point: binding::fmi3Boolean,
        enter_event_mode: *mut binding::fmi3Boolean,
        terminate_simulation: *mut binding::fmi3Boolean,
    );
    fmi3SetTime(time: binding::fmi3Float64);
    fmi3SetContinuousStates(
        continuous_states: *const binding::fmi3Float64,
        n_continuous_states: usize,
    );
    fmi3GetContinuousStateDerivatives(
        derivatives: *mut binding::fmi3Float64,
        n_continuous_states: usize,
    );
    fmi3GetEventIndicators(
        event_indicators: *mut binding::fmi3Float64,
        n_event_indicators: usize,
    );
    fmi3GetContinuousStates(
        continuous_states: *mut binding::fmi3Float64,
        n_continuous_states: usize,
    );
    fmi3GetNominalsOfContinuousStates(
        nominals: *mut binding::fmi3Float64,
        n_continuous_states: usize,
    );
    fmi3GetNumberOfEventIndicators(n_event_indicators: *mut usize);
    fmi3GetNumberOfContinuousStates(n_continuous_states: *mut usize);
}
