//! Host-side capture of messages sent through `fmi3LogMessageCallback`.
#![allow(unsafe_code)]

use std::{ffi::CStr, os::raw::c_void, sync::Mutex};

use fmi_sys::fmi3 as binding;

/// Signature of `fmi3LogMessageCallback`
pub type LogMessageFn = unsafe extern "C" fn(
    binding::fmi3InstanceEnvironment,
    binding::fmi3Status,
    binding::fmi3String,
    binding::fmi3String,
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLog {
    pub status: binding::fmi3Status,
    pub category: String,
    pub message: String,
}

/// Collects forwarded log messages.
///
/// Pass [`LogRecorder::environment`] as the instance environment and
/// [`LogRecorder::log_message`] as the callback. The recorder must outlive the FMU instance.
#[derive(Debug, Default)]
pub struct LogRecorder {
    records: Mutex<Vec<RecordedLog>>,
}

impl LogRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(&self) -> *mut c_void {
        self as *const Self as *mut c_void
    }

    pub fn log_message(&self) -> Option<LogMessageFn> {
        let callback: LogMessageFn = Self::callback;
        Some(callback)
    }

    unsafe extern "C" fn callback(
        environment: binding::fmi3InstanceEnvironment,
        status: binding::fmi3Status,
        category: binding::fmi3String,
        message: binding::fmi3String,
    ) {
        if environment.is_null() {
            return;
        }
        let recorder = unsafe { &*(environment as *const Self) };
        let to_string = |ptr: binding::fmi3String| {
            if ptr.is_null() {
                String::new()
            } else {
                unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
            }
        };
        let record = RecordedLog {
            status,
            category: to_string(category),
            message: to_string(message),
        };
        recorder
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }

    pub fn records(&self) -> Vec<RecordedLog> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    /// Whether any recorded message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.records().iter().any(|r| r.message.contains(needle))
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
