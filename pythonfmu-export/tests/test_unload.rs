//! Runtime shutdown while instances are still alive.
//!
//! Kept in its own test binary: finalizing the runtime affects the whole process.

use pythonfmu_export::fmi3::{binding, runtime};
use pythonfmu_test_data::{echo, LogRecorder, PythonModels};

mod common;
use common::{instantiate, Fmu};

#[test_log::test]
fn test_finalize_waits_for_live_instances() {
    let fmu = Fmu::new(PythonModels::Echo);
    fmu.initialize(0.0);

    runtime::finalize();
    assert!(runtime::is_finalized());

    // The live instance keeps the interpreter running
    assert_eq!(fmu.set_float64(&[echo::REAL_IN], &[4.0]), binding::fmi3Status_fmi3OK);
    assert_eq!(fmu.step(0.0, 1.0).status, binding::fmi3Status_fmi3OK);
    assert_eq!(fmu.get_float64(&[echo::REAL_OUT]).1, vec![8.0]);

    // New instances are refused
    let resources = PythonModels::Echo.resources().unwrap();
    let recorder = LogRecorder::new();
    assert!(instantiate(&resources.resource_path(), &recorder, false, false).is_null());
    assert!(recorder.contains("embedded Python runtime has been finalized"));

    // Freeing the last instance shuts the interpreter down
    drop(fmu);
    runtime::finalize();
}
