//! A minimal importer that drives the exported functions the way a co-simulation master does.
#![allow(dead_code)]

use std::{
    ffi::{CStr, CString},
    ptr,
};

use pythonfmu_export::fmi3::{binding, export::*};
use pythonfmu_test_data::{LogRecorder, PythonModels, ResourceDir};

/// Call `fmi3InstantiateCoSimulation` with `resource_path`.
pub fn instantiate(
    resource_path: &str,
    recorder: &LogRecorder,
    logging_on: bool,
    event_mode_used: bool,
) -> binding::fmi3Instance {
    let name = CString::new("instance").unwrap();
    let token = CString::new("{00000000-0000-0000-0000-000000000000}").unwrap();
    let resource_path = CString::new(resource_path).unwrap();
    unsafe {
        fmi3InstantiateCoSimulation(
            name.as_ptr(),
            token.as_ptr(),
            resource_path.as_ptr(),
            false,
            logging_on,
            event_mode_used,
            false,
            ptr::null(),
            0,
            recorder.environment(),
            recorder.log_message(),
            None,
        )
    }
}

/// Outputs of `fmi3DoStep`
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Step {
    pub status: binding::fmi3Status,
    pub event_handling_needed: bool,
    pub terminate_simulation: bool,
    pub early_return: bool,
    pub last_successful_time: f64,
}

/// An instantiated model together with its resources and log recorder. Freed on drop.
pub struct Fmu {
    pub instance: binding::fmi3Instance,
    pub recorder: Box<LogRecorder>,
    _resources: ResourceDir,
}

impl Fmu {
    pub fn new(model: PythonModels) -> Self {
        Self::with_options(model, false, false)
    }

    pub fn with_options(model: PythonModels, logging_on: bool, event_mode_used: bool) -> Self {
        let resources = model.resources().unwrap();
        let recorder = Box::new(LogRecorder::new());
        let instance = instantiate(
            &resources.resource_path(),
            &recorder,
            logging_on,
            event_mode_used,
        );
        assert!(
            !instance.is_null(),
            "instantiation failed: {:?}",
            recorder.messages()
        );
        Self {
            instance,
            recorder,
            _resources: resources,
        }
    }

    /// Instantiate from the `file://` URI form of the resource location
    pub fn from_uri(model: PythonModels) -> Self {
        let resources = model.resources().unwrap();
        let recorder = Box::new(LogRecorder::new());
        let instance = instantiate(&resources.resource_uri(), &recorder, false, false);
        assert!(
            !instance.is_null(),
            "instantiation failed: {:?}",
            recorder.messages()
        );
        Self {
            instance,
            recorder,
            _resources: resources,
        }
    }

    pub fn initialize(&self, start_time: f64) {
        unsafe {
            assert_eq!(
                fmi3EnterInitializationMode(self.instance, false, 0.0, start_time, false, 0.0),
                binding::fmi3Status_fmi3OK
            );
            assert_eq!(
                fmi3ExitInitializationMode(self.instance),
                binding::fmi3Status_fmi3OK
            );
        }
    }

    pub fn step(&self, current_communication_point: f64, communication_step_size: f64) -> Step {
        let mut step = Step::default();
        step.status = unsafe {
            fmi3DoStep(
                self.instance,
                current_communication_point,
                communication_step_size,
                false,
                &mut step.event_handling_needed,
                &mut step.terminate_simulation,
                &mut step.early_return,
                &mut step.last_successful_time,
            )
        };
        step
    }

    pub fn get_float64(&self, vrs: &[u32]) -> (binding::fmi3Status, Vec<f64>) {
        let mut values = vec![0.0; vrs.len()];
        let status = unsafe {
            fmi3GetFloat64(
                self.instance,
                vrs.as_ptr(),
                vrs.len(),
                values.as_mut_ptr(),
                values.len(),
            )
        };
        (status, values)
    }

    pub fn set_float64(&self, vrs: &[u32], values: &[f64]) -> binding::fmi3Status {
        unsafe {
            fmi3SetFloat64(
                self.instance,
                vrs.as_ptr(),
                vrs.len(),
                values.as_ptr(),
                values.len(),
            )
        }
    }

    pub fn get_string(&self, vr: u32) -> (binding::fmi3Status, binding::fmi3String) {
        let mut value: binding::fmi3String = ptr::null();
        let status = unsafe { fmi3GetString(self.instance, &vr, 1, &mut value, 1) };
        (status, value)
    }

    pub fn set_string(&self, vr: u32, value: &str) -> binding::fmi3Status {
        let value = CString::new(value).unwrap();
        unsafe { fmi3SetString(self.instance, &vr, 1, &value.as_ptr(), 1) }
    }

    pub fn set_debug_logging(&self, logging_on: bool, categories: &[&str]) -> binding::fmi3Status {
        let categories: Vec<CString> = categories.iter().map(|c| CString::new(*c).unwrap()).collect();
        let pointers: Vec<binding::fmi3String> = categories.iter().map(|c| c.as_ptr()).collect();
        unsafe {
            fmi3SetDebugLogging(self.instance, logging_on, pointers.len(), pointers.as_ptr())
        }
    }
}

impl Drop for Fmu {
    fn drop(&mut self) {
        unsafe { fmi3FreeInstance(self.instance) };
    }
}

/// Read a string handed out by the FMU
pub fn read(value: binding::fmi3String) -> String {
    assert!(!value.is_null());
    unsafe { CStr::from_ptr(value) }.to_str().unwrap().to_owned()
}
