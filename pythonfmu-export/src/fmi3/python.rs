//! [`SlaveInstance`] backed by a Python class.
//!
//! The class is found through the `slavemodule.txt` file in the FMU resources and must derive
//! from one of the configured bases, `pythonfmu3.fmi3slave.Fmi3Slave` or `Fmi3SlaveBase` by
//! default. Each operation calls the method of the same name on the Python object while holding
//! the GIL, then moves the messages the model queued into the instance [`Logger`]. Any Python
//! exception is reported as [`Error::Fatal`].

use std::{
    ffi::CString,
    path::{Path, PathBuf},
    sync::Arc,
};

use pyo3::{
    exceptions::PyValueError,
    prelude::*,
    types::{PyBytes, PyDict, PyList, PyType},
};

use super::{
    binding,
    logger::{status_category, LogRecord, Logger},
    runtime::{self, PyRuntime},
    status_from_code, DiscreteStates, FmuState, SlaveInstance, StepResult,
};
use crate::{config::SlaveConfig, Error};

trait PyResultExt<T> {
    /// Convert a Python exception into a fatal error naming the failed operation.
    fn or_fatal(self, py: Python<'_>, operation: &str) -> Result<T, Error>;
}

impl<T> PyResultExt<T> for PyResult<T> {
    fn or_fatal(self, py: Python<'_>, operation: &str) -> Result<T, Error> {
        self.map_err(|err| {
            let repr = err
                .value_bound(py)
                .repr()
                .map(|repr| repr.to_string())
                .unwrap_or_else(|_| "<unrepresentable exception>".to_owned());
            Error::Fatal(format!(
                "Fatal py exception encountered: {operation}: {err}\n{repr}"
            ))
        })
    }
}

/// The model's view of the instance logger, passed to the constructor as `logger`.
#[pyclass(name = "Logger", module = "pythonfmu_export")]
struct PyLogger {
    logger: Arc<Logger>,
}

#[pymethods]
impl PyLogger {
    #[pyo3(signature = (msg, status = 0, category = None, debug = false))]
    fn log(&self, msg: &str, status: i64, category: Option<&str>, debug: bool) -> PyResult<()> {
        let status = status_from_code(status)
            .ok_or_else(|| PyValueError::new_err(format!("invalid status {status}")))?;
        self.logger.enqueue(LogRecord {
            status,
            category: category.unwrap_or(status_category(status)).to_owned(),
            message: msg.to_owned(),
            debug,
        });
        Ok(())
    }
}

/// The live Python object and its log queue.
struct ModelObjects {
    instance: Py<PyAny>,
    log_queue: Py<PyList>,
}

pub struct PySlaveInstance {
    instance_name: String,
    resources: PathBuf,
    visible: bool,
    logger: Arc<Logger>,
    class: Option<Py<PyType>>,
    objects: Option<ModelObjects>,
    // Dropped after the Python objects above
    _runtime: Arc<PyRuntime>,
}

impl std::fmt::Debug for PySlaveInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PySlaveInstance")
            .field("instance_name", &self.instance_name)
            .field("resources", &self.resources)
            .field("instantiated", &self.objects.is_some())
            .finish()
    }
}

impl PySlaveInstance {
    /// Load the model class from `resources` and instantiate it.
    pub fn new(
        instance_name: &str,
        resources: &Path,
        logger: Arc<Logger>,
        visible: bool,
        config: &SlaveConfig,
    ) -> Result<Self, Error> {
        let runtime = runtime::acquire()?;

        let (class, objects) = Python::with_gil(|py| -> Result<_, Error> {
            let class = load_class(py, resources, config)?;
            let objects = instantiate(py, &class, instance_name, resources, &logger, visible)?;
            drain_log_queue(objects.log_queue.bind(py), &logger).or_fatal(py, "log queue")?;
            Ok((class.unbind(), objects))
        })?;

        log::debug!("Instantiated Python model for {instance_name}");
        Ok(Self {
            instance_name: instance_name.to_owned(),
            resources: resources.to_path_buf(),
            visible,
            logger,
            class: Some(class),
            objects: Some(objects),
            _runtime: runtime,
        })
    }

    /// Call into the model and forward whatever it logged, even when the call failed.
    fn call<T>(
        &mut self,
        operation: &str,
        f: impl for<'py> FnOnce(&Bound<'py, PyType>, &Bound<'py, PyAny>) -> PyResult<T> + Send,
    ) -> Result<T, Error> {
        Python::with_gil(|py| {
            let (Some(class), Some(objects)) = (&self.class, &self.objects) else {
                return Err(Error::Fatal(format!(
                    "{operation}: the Python model of {} is not available",
                    self.instance_name
                )));
            };
            let result = f(class.bind(py), objects.instance.bind(py));
            let drained = drain_log_queue(objects.log_queue.bind(py), &self.logger);
            let value = result.or_fatal(py, operation)?;
            drained.or_fatal(py, "log queue")?;
            Ok(value)
        })
    }

    fn fetch<T>(
        &mut self,
        kind: &str,
        vrs: &[binding::fmi3ValueReference],
        n_values: usize,
        extract: impl for<'py> Fn(&Bound<'py, PyAny>) -> PyResult<T> + Sync,
    ) -> Result<Vec<T>, Error> {
        let method = format!("get_{kind}");
        let values = self.call(&method, |_, instance| {
            let refs = PyList::new_bound(instance.py(), vrs);
            instance
                .call_method1(method.as_str(), (refs,))?
                .iter()?
                .map(|item| item.and_then(|item| extract(&item)))
                .collect::<PyResult<Vec<T>>>()
        })?;
        if values.len() != n_values {
            return Err(Error::Model(format!(
                "{method} returned {} values, expected {n_values}",
                values.len()
            )));
        }
        Ok(values)
    }

    fn store<T: ToPyObject + Sync>(
        &mut self,
        kind: &str,
        vrs: &[binding::fmi3ValueReference],
        values: &[T],
    ) -> Result<(), Error> {
        let method = format!("set_{kind}");
        self.call(&method, |_, instance| {
            let py = instance.py();
            let refs = PyList::new_bound(py, vrs);
            let values = PyList::new_bound(py, values);
            instance.call_method1(method.as_str(), (refs, values))?;
            Ok(())
        })
    }

    fn call_unit(&mut self, method: &'static str) -> Result<(), Error> {
        self.call(method, |_, instance| instance.call_method0(method).map(|_| ()))
    }
}

impl Drop for PySlaveInstance {
    fn drop(&mut self) {
        Python::with_gil(|_py| {
            self.objects = None;
            self.class = None;
        });
    }
}

/// Import the model module named in the resources and pick its slave class.
fn load_class<'py>(
    py: Python<'py>,
    resources: &Path,
    config: &SlaveConfig,
) -> Result<Bound<'py, PyType>, Error> {
    let resources_str = resources.to_string_lossy();
    let sys_path = py
        .import_bound("sys")
        .and_then(|sys| sys.getattr("path"))
        .and_then(|path| path.downcast_into::<PyList>().map_err(PyErr::from))
        .or_fatal(py, "sys.path")?;
    if !sys_path.contains(&*resources_str).or_fatal(py, "sys.path")? {
        sys_path
            .insert(0, &*resources_str)
            .or_fatal(py, "sys.path")?;
    }

    let pointer = resources.join(&config.module_file);
    let contents = std::fs::read_to_string(&pointer)
        .map_err(|e| Error::Fatal(format!("Unable to read {}: {e}", pointer.display())))?;
    let module_name = contents
        .lines()
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::Fatal(format!("{} does not name a module", pointer.display())))?;

    let module = py
        .import_bound(module_name)
        .or_fatal(py, &format!("import {module_name}"))?;
    let bases = import_bases(py, config)?;
    let defined_in = module
        .getattr("__name__")
        .and_then(|name| name.extract::<String>())
        .or_fatal(py, "module name")?;

    let mut candidates = Vec::new();
    for (_, value) in module.dict().iter() {
        let Ok(class) = value.downcast::<PyType>() else {
            continue;
        };
        if bases.iter().any(|base| class.is(base)) {
            continue;
        }
        let mut derived = false;
        for base in &bases {
            if class.is_subclass(base).or_fatal(py, "issubclass")? {
                derived = true;
                break;
            }
        }
        if !derived {
            continue;
        }
        // Classes imported into the module do not count
        let own = class
            .getattr("__module__")
            .and_then(|name| name.extract::<String>())
            .is_ok_and(|name| name == defined_in);
        if own {
            candidates.push(class.clone());
        }
    }

    let base_name = config.base_names();
    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(Error::Fatal(format!(
            "No class deriving from {base_name} found in module {module_name}"
        ))),
        n => Err(Error::Fatal(format!(
            "Found {n} classes deriving from {base_name} in module {module_name}, expected exactly one"
        ))),
    }
}

/// Import every configured base class that exists, failing only when none does.
fn import_bases<'py>(
    py: Python<'py>,
    config: &SlaveConfig,
) -> Result<Vec<Bound<'py, PyAny>>, Error> {
    let mut bases = Vec::new();
    let mut last_error = None;
    for base in &config.base_classes {
        match py
            .import_bound(base.module.as_str())
            .and_then(|module| module.getattr(base.class.as_str()))
        {
            Ok(class) => bases.push(class),
            Err(err) => {
                log::debug!("Base class {base} is not available");
                last_error = Some(err);
            }
        }
    }

    match last_error {
        Some(err) if bases.is_empty() => {
            Err(err).or_fatal(py, &format!("import {}", config.base_names()))
        }
        _ if bases.is_empty() => Err(Error::Fatal("No base class configured".to_owned())),
        _ => Ok(bases),
    }
}

fn instantiate(
    py: Python<'_>,
    class: &Bound<'_, PyType>,
    instance_name: &str,
    resources: &Path,
    logger: &Arc<Logger>,
    visible: bool,
) -> Result<ModelObjects, Error> {
    let create = || -> PyResult<ModelObjects> {
        let kwargs = PyDict::new_bound(py);
        kwargs.set_item("instance_name", instance_name)?;
        kwargs.set_item("resources", resources.to_string_lossy().as_ref())?;
        kwargs.set_item(
            "logger",
            Py::new(
                py,
                PyLogger {
                    logger: logger.clone(),
                },
            )?,
        )?;
        kwargs.set_item("visible", visible)?;

        let instance = class.call((), Some(&kwargs))?;
        let log_queue = instance
            .call_method0("_get_log_queue")?
            .downcast_into::<PyList>()
            .map_err(PyErr::from)?;
        Ok(ModelObjects {
            instance: instance.unbind(),
            log_queue: log_queue.unbind(),
        })
    };
    create().or_fatal(py, "instantiate model")
}

/// Move the messages the model queued into the instance logger and empty the queue.
fn drain_log_queue(queue: &Bound<'_, PyList>, logger: &Logger) -> PyResult<()> {
    let len = queue.len();
    if len == 0 {
        return Ok(());
    }
    for message in queue.iter() {
        let code: i64 = message.getattr("status")?.extract()?;
        let status = status_from_code(code)
            .ok_or_else(|| PyValueError::new_err(format!("invalid log status {code}")))?;
        let category = message.getattr("category")?;
        let category = if category.is_none() {
            status_category(status).to_owned()
        } else {
            category.str()?.extract()?
        };
        logger.enqueue(LogRecord {
            status,
            category,
            message: message.getattr("msg")?.str()?.extract()?,
            debug: message.getattr("debug")?.is_truthy()?,
        });
    }
    queue.del_slice(0, len)
}

fn flag(result: &Bound<'_, PyAny>, name: &str) -> PyResult<bool> {
    if result.hasattr(name)? {
        result.getattr(name)?.is_truthy()
    } else {
        Ok(false)
    }
}

fn optional_f64(result: &Bound<'_, PyAny>, name: &str) -> PyResult<Option<f64>> {
    if !result.hasattr(name)? {
        return Ok(None);
    }
    let value = result.getattr(name)?;
    if value.is_none() {
        Ok(None)
    } else {
        value.extract().map(Some)
    }
}

/// Read a `do_step` result: either an object with a `status` field or a plain truth value.
fn step_result(result: &Bound<'_, PyAny>) -> PyResult<StepResult> {
    let status = if result.hasattr("status")? {
        let code: i64 = result.getattr("status")?.extract()?;
        status_from_code(code)
            .ok_or_else(|| PyValueError::new_err(format!("invalid step status {code}")))?
    } else if result.is_truthy()? {
        binding::fmi3Status_fmi3OK
    } else {
        binding::fmi3Status_fmi3Discard
    };

    Ok(StepResult {
        status,
        event_handling_needed: flag(result, "eventHandlingNeeded")?,
        terminate_simulation: flag(result, "terminateSimulation")?,
        early_return: flag(result, "earlyReturn")?,
        last_successful_time: optional_f64(result, "lastSuccessfulTime")?,
    })
}

/// uint64 values may come back as `ctypes.c_uint64`
fn extract_uint64(item: &Bound<'_, PyAny>) -> PyResult<u64> {
    if item.hasattr("value")? {
        item.getattr("value")?.extract()
    } else {
        item.extract()
    }
}

fn py_state(state: &FmuState) -> Result<&Py<PyAny>, Error> {
    state
        .downcast_ref::<Py<PyAny>>()
        .ok_or_else(|| Error::Model("FMU state was not created by a Python model".to_owned()))
}

macro_rules! py_getter_setter {
    ($name:ident, $ty:ty) => {
        $crate::paste::paste! {
            fn [<get_ $name>](&mut self, vrs: &[binding::fmi3ValueReference], values: &mut [$ty]) -> Result<(), Error> {
                let fetched = self.fetch(stringify!($name), vrs, values.len(), |item| item.extract::<$ty>())?;
                values.copy_from_slice(&fetched);
                Ok(())
            }

            fn [<set_ $name>](&mut self, vrs: &[binding::fmi3ValueReference], values: &[$ty]) -> Result<(), Error> {
                self.store(stringify!($name), vrs, values)
            }
        }
    };
}

impl SlaveInstance for PySlaveInstance {
    fn setup_experiment(
        &mut self,
        _tolerance: Option<f64>,
        start_time: f64,
        _stop_time: Option<f64>,
    ) -> Result<(), Error> {
        self.call("setup_experiment", |_, instance| {
            instance
                .call_method1("setup_experiment", (start_time,))
                .map(|_| ())
        })
    }

    fn enter_initialization_mode(&mut self) -> Result<(), Error> {
        self.call_unit("enter_initialization_mode")
    }

    fn exit_initialization_mode(&mut self) -> Result<(), Error> {
        self.call_unit("exit_initialization_mode")
    }

    fn terminate(&mut self) -> Result<(), Error> {
        self.call_unit("terminate")
    }

    /// Construct a fresh object of the same class with the same arguments.
    fn reset(&mut self) -> Result<(), Error> {
        Python::with_gil(|py| {
            self.objects = None;
            let class = self
                .class
                .as_ref()
                .ok_or_else(|| Error::Fatal("the Python model class is not available".to_owned()))?
                .bind(py);
            let objects = instantiate(
                py,
                class,
                &self.instance_name,
                &self.resources,
                &self.logger,
                self.visible,
            )?;
            drain_log_queue(objects.log_queue.bind(py), &self.logger).or_fatal(py, "log queue")?;
            self.objects = Some(objects);
            Ok(())
        })
    }

    py_getter_setter!(float64, f64);
    py_getter_setter!(int8, i8);
    py_getter_setter!(int16, i16);
    py_getter_setter!(int32, i32);
    py_getter_setter!(int64, i64);
    py_getter_setter!(uint8, u8);
    py_getter_setter!(uint16, u16);
    py_getter_setter!(uint32, u32);
    py_getter_setter!(boolean, bool);

    fn get_uint64(
        &mut self,
        vrs: &[binding::fmi3ValueReference],
        values: &mut [u64],
    ) -> Result<(), Error> {
        let fetched = self.fetch("uint64", vrs, values.len(), extract_uint64)?;
        values.copy_from_slice(&fetched);
        Ok(())
    }

    fn set_uint64(
        &mut self,
        vrs: &[binding::fmi3ValueReference],
        values: &[u64],
    ) -> Result<(), Error> {
        self.store("uint64", vrs, values)
    }

    fn get_string(
        &mut self,
        vrs: &[binding::fmi3ValueReference],
        n_values: usize,
    ) -> Result<Vec<CString>, Error> {
        self.fetch("string", vrs, n_values, |item| item.extract::<String>())?
            .into_iter()
            .map(|value| {
                CString::new(value)
                    .map_err(|e| Error::Model(format!("get_string returned an invalid string: {e}")))
            })
            .collect()
    }

    fn set_string(
        &mut self,
        vrs: &[binding::fmi3ValueReference],
        values: &[&str],
    ) -> Result<(), Error> {
        self.store("string", vrs, values)
    }

    fn do_step(
        &mut self,
        current_communication_point: f64,
        communication_step_size: f64,
        _no_set_fmu_state_prior_to_current_point: bool,
    ) -> Result<StepResult, Error> {
        self.call("do_step", |_, instance| {
            let result = instance.call_method1(
                "do_step",
                (current_communication_point, communication_step_size),
            )?;
            step_result(&result)
        })
    }

    fn update_discrete_states(&mut self) -> Result<DiscreteStates, Error> {
        self.call("update_discrete_states", |_, instance| {
            if !instance.hasattr("update_discrete_states")? {
                return Ok(DiscreteStates::default());
            }
            let result = instance.call_method0("update_discrete_states")?;
            let next_event_time = if flag(&result, "nextEventTimeDefined")? {
                optional_f64(&result, "nextEventTime")?
            } else {
                None
            };
            Ok(DiscreteStates {
                discrete_states_need_update: flag(&result, "discreteStatesNeedUpdate")?,
                terminate_simulation: flag(&result, "terminateSimulation")?,
                nominals_of_continuous_states_changed: flag(
                    &result,
                    "nominalsOfContinuousStatesChanged",
                )?,
                values_of_continuous_states_changed: flag(
                    &result,
                    "valuesOfContinuousStatesChanged",
                )?,
                next_event_time,
            })
        })
    }

    fn get_fmu_state(&mut self) -> Result<FmuState, Error> {
        let state = self.call("_get_fmu_state", |_, instance| {
            instance.call_method0("_get_fmu_state").map(Bound::unbind)
        })?;
        Ok(FmuState::new(state))
    }

    fn set_fmu_state(&mut self, state: &FmuState) -> Result<(), Error> {
        let state = py_state(state)?;
        self.call("_set_fmu_state", |_, instance| {
            let state = state.clone_ref(instance.py());
            instance
                .call_method1("_set_fmu_state", (state,))
                .map(|_| ())
        })
    }

    /// Drops the reference under the GIL; the model is not consulted.
    fn free_fmu_state(&mut self, state: FmuState) -> Result<(), Error> {
        Python::with_gil(|_py| drop(state));
        Ok(())
    }

    fn serialize_fmu_state(&mut self, state: &FmuState) -> Result<Vec<u8>, Error> {
        let state = py_state(state)?;
        self.call("_fmu_state_to_bytes", |class, _| {
            let state = state.clone_ref(class.py());
            let bytes = class.call_method1("_fmu_state_to_bytes", (state,))?;
            Ok(bytes.downcast_into::<PyBytes>()?.as_bytes().to_vec())
        })
    }

    fn deserialize_fmu_state(&mut self, bytes: &[u8]) -> Result<FmuState, Error> {
        let state = self.call("_fmu_state_from_bytes", |class, _| {
            let bytes = PyBytes::new_bound(class.py(), bytes);
            class
                .call_method1("_fmu_state_from_bytes", (bytes,))
                .map(Bound::unbind)
        })?;
        Ok(FmuState::new(state))
    }
}
