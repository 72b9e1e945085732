//! Process-wide ownership of the embedded Python interpreter.
//!
//! CPython wants `Py_Initialize` and `Py_FinalizeEx` to be called from the same thread, so the
//! interpreter is brought up on a dedicated worker thread that releases the GIL and then parks
//! until shutdown is requested. Model calls acquire the GIL on whatever thread the host uses.
//!
//! The interpreter goes through `Uninitialized -> Running -> Finalized` exactly once. Every live
//! instance holds an `Arc<PyRuntime>`, and the lifecycle manager holds one more until the
//! library is unloaded. The interpreter is shut down when the last of these is dropped, so
//! unloading the library never finalizes Python underneath a live instance.

use std::{
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc, Mutex, PoisonError,
    },
    thread::JoinHandle,
    time::Duration,
};

use pyo3::ffi;

use crate::Error;

/// How long the unload path waits for the interpreter to shut down.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

enum LifecycleState<R> {
    Uninitialized,
    Running(Arc<R>),
    Finalized,
}

/// Start-once, finalize-once holder of a shared runtime.
pub struct Lifecycle<R> {
    state: Mutex<LifecycleState<R>>,
}

impl<R> Default for Lifecycle<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Lifecycle<R> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::Uninitialized),
        }
    }

    /// Return the running runtime, starting it with `start` on first use.
    pub fn acquire(&self, start: impl FnOnce() -> Result<R, Error>) -> Result<Arc<R>, Error> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            LifecycleState::Running(runtime) => Ok(runtime.clone()),
            LifecycleState::Finalized => Err(Error::Fatal(
                "embedded Python runtime has been finalized".to_owned(),
            )),
            LifecycleState::Uninitialized => {
                let runtime = Arc::new(start()?);
                *state = LifecycleState::Running(runtime.clone());
                Ok(runtime)
            }
        }
    }

    /// Move to `Finalized` and release the manager's reference.
    ///
    /// Returns `true` if a running runtime was released. Calling this again, or without ever
    /// having started the runtime, only records the terminal state.
    pub fn finalize(&self) -> bool {
        let previous = std::mem::replace(
            &mut *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            LifecycleState::Finalized,
        );
        // The lock is released before the runtime is dropped
        match previous {
            LifecycleState::Running(runtime) => {
                drop(runtime);
                true
            }
            _ => false,
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            LifecycleState::Finalized
        )
    }
}

/// Handle to the embedded interpreter. Dropping the last handle shuts Python down.
pub struct PyRuntime {
    shutdown: Option<Sender<()>>,
    done: Mutex<Receiver<()>>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PyRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PyRuntime")
            .field("running", &self.shutdown.is_some())
            .finish()
    }
}

impl PyRuntime {
    /// Spawn the interpreter thread and wait until Python is ready for use.
    fn start() -> Result<Self, Error> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        let worker = std::thread::Builder::new()
            .name("python-runtime".to_owned())
            .spawn(move || run_interpreter(ready_tx, shutdown_rx, done_tx))
            .map_err(|e| Error::Fatal(format!("unable to start the Python runtime thread: {e}")))?;

        ready_rx.recv().map_err(|_| {
            Error::Fatal("the Python runtime thread exited during start-up".to_owned())
        })?;

        log::debug!("Embedded Python runtime started");
        Ok(Self {
            shutdown: Some(shutdown_tx),
            done: Mutex::new(done_rx),
            worker: Some(worker),
        })
    }
}

impl Drop for PyRuntime {
    fn drop(&mut self) {
        // Closing the channel wakes the worker
        drop(self.shutdown.take());
        let done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        match done.recv_timeout(SHUTDOWN_TIMEOUT) {
            Ok(()) => {
                if let Some(worker) = self.worker.take() {
                    let _ = worker.join();
                }
                log::debug!("Embedded Python runtime finalized");
            }
            Err(_) => log::warn!("Embedded Python runtime did not shut down in time"),
        }
    }
}

fn run_interpreter(ready: Sender<()>, shutdown: Receiver<()>, done: Sender<()>) {
    // SAFETY: all calls below happen on this thread, which owns the interpreter if it started it.
    let thread_state = unsafe {
        if ffi::Py_IsInitialized() == 0 {
            ffi::Py_InitializeEx(0);
            Some(ffi::PyEval_SaveThread())
        } else {
            // The host process already runs Python; it keeps ownership
            None
        }
    };

    let _ = ready.send(());
    // Returns once the sender is dropped
    let _ = shutdown.recv();

    if let Some(thread_state) = thread_state {
        unsafe {
            ffi::PyEval_RestoreThread(thread_state);
            ffi::Py_FinalizeEx();
        }
    }
    let _ = done.send(());
}

static PYTHON: Lifecycle<PyRuntime> = Lifecycle::new();

/// Shared handle to the embedded interpreter, starting it on first use.
///
/// Fails once [`finalize`] has run.
pub fn acquire() -> Result<Arc<PyRuntime>, Error> {
    PYTHON.acquire(PyRuntime::start)
}

/// Refuse any further instantiation and release the process-wide handle.
///
/// Python itself is finalized once every instance holding a handle has been freed.
pub fn finalize() {
    if PYTHON.finalize() {
        log::debug!("Released the process-wide Python runtime handle");
    }
}

pub fn is_finalized() -> bool {
    PYTHON.is_finalized()
}
