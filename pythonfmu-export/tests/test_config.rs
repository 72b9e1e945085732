//! Environment overrides of the slave loader.
//!
//! Kept in its own test binary since it changes the process environment.

use std::fs;

use pythonfmu_export::config::{ENV_BASE_CLASS, ENV_MODULE_FILE};
use pythonfmu_test_data::{echo, LogRecorder, PythonModels};

mod common;
use common::instantiate;

#[test_log::test]
fn test_environment_overrides() {
    let resources = PythonModels::Echo.resources().unwrap();
    fs::rename(
        resources.path().join("slavemodule.txt"),
        resources.path().join("model.txt"),
    )
    .unwrap();

    let recorder = LogRecorder::new();
    assert!(instantiate(&resources.resource_path(), &recorder, false, false).is_null());
    assert!(recorder.contains("slavemodule.txt"));

    std::env::set_var(ENV_MODULE_FILE, "model.txt");
    let instance = instantiate(&resources.resource_path(), &recorder, false, false);
    assert!(!instance.is_null(), "{:?}", recorder.messages());
    let mut value = [0.0];
    let status = unsafe {
        pythonfmu_export::fmi3::export::fmi3GetFloat64(
            instance,
            &echo::REAL_IN,
            1,
            value.as_mut_ptr(),
            1,
        )
    };
    assert_eq!(status, pythonfmu_export::fmi3::binding::fmi3Status_fmi3OK);
    assert_eq!(value, [22.0]);
    unsafe { pythonfmu_export::fmi3::export::fmi3FreeInstance(instance) };

    // The model does not derive from this base
    std::env::set_var(ENV_BASE_CLASS, "collections:OrderedDict");
    recorder.clear();
    assert!(instantiate(&resources.resource_path(), &recorder, false, false).is_null());
    assert!(recorder.contains("No class deriving from collections.OrderedDict"));

    // Bases missing from the installed package are skipped
    std::env::set_var(
        ENV_BASE_CLASS,
        "pythonfmu3.fmi3slave:Fmi3SlaveV2,pythonfmu3.fmi3slave:Fmi3Slave",
    );
    recorder.clear();
    let instance = instantiate(&resources.resource_path(), &recorder, false, false);
    assert!(!instance.is_null(), "{:?}", recorder.messages());
    unsafe { pythonfmu_export::fmi3::export::fmi3FreeInstance(instance) };

    // but at least one has to exist
    std::env::set_var(ENV_BASE_CLASS, "pythonfmu3.fmi3slave:Fmi3SlaveV2");
    recorder.clear();
    assert!(instantiate(&resources.resource_path(), &recorder, false, false).is_null());
    assert!(recorder.contains("import pythonfmu3.fmi3slave.Fmi3SlaveV2"));
}
