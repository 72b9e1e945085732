//! Diagnostics forwarding from the model to the host's `fmi3LogMessageCallback`.
//!
//! Messages are filtered before they reach the callback: a message passes when the category
//! allow-list is empty or names its category, and debug messages additionally need debug
//! logging to be switched on.

use std::{
    ffi::CString,
    sync::{Mutex, PoisonError},
};

use super::{binding, status_code, Fmi3Status};

pub const LOG_STATUS_WARNING: &str = "logStatusWarning";
pub const LOG_STATUS_DISCARD: &str = "logStatusDiscard";
pub const LOG_STATUS_ERROR: &str = "logStatusError";
pub const LOG_STATUS_FATAL: &str = "logStatusFatal";
pub const LOG_ALL: &str = "logAll";

/// The category under which a message of the given severity is reported
pub fn status_category(status: binding::fmi3Status) -> &'static str {
    match status {
        binding::fmi3Status_fmi3Warning => LOG_STATUS_WARNING,
        binding::fmi3Status_fmi3Discard => LOG_STATUS_DISCARD,
        binding::fmi3Status_fmi3Error => LOG_STATUS_ERROR,
        binding::fmi3Status_fmi3Fatal => LOG_STATUS_FATAL,
        _ => LOG_ALL,
    }
}

/// Filter applied to every message. Replaced as a whole by `fmi3SetDebugLogging`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggerSettings {
    pub debug_logging_enabled: bool,
    /// Allowed categories; empty accepts every category.
    pub logged_categories: Vec<String>,
}

impl LoggerSettings {
    pub fn accepts(&self, category: &str, debug: bool) -> bool {
        if debug && !self.debug_logging_enabled {
            return false;
        }
        self.logged_categories.is_empty() || self.logged_categories.iter().any(|c| c == category)
    }
}

/// A message produced by the model during a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub status: binding::fmi3Status,
    pub category: String,
    pub message: String,
    pub debug: bool,
}

struct InstanceEnvironment(binding::fmi3InstanceEnvironment);

// The environment pointer is only ever passed back to the host callback.
unsafe impl Send for InstanceEnvironment {}
unsafe impl Sync for InstanceEnvironment {}

/// Per-instance diagnostics sink.
pub struct Logger {
    environment: InstanceEnvironment,
    log_message: binding::fmi3LogMessageCallback,
    settings: Mutex<LoggerSettings>,
    pending: Mutex<Vec<LogRecord>>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("callback", &self.log_message.is_some())
            .field("settings", &self.settings())
            .finish()
    }
}

impl Logger {
    pub fn new(
        environment: binding::fmi3InstanceEnvironment,
        log_message: binding::fmi3LogMessageCallback,
        debug_logging_enabled: bool,
    ) -> Self {
        Self {
            environment: InstanceEnvironment(environment),
            log_message,
            settings: Mutex::new(LoggerSettings {
                debug_logging_enabled,
                logged_categories: Vec::new(),
            }),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> LoggerSettings {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the debug flag and the category allow-list.
    pub fn set_debug_logging(&self, debug_logging_enabled: bool, logged_categories: Vec<String>) {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = LoggerSettings {
            debug_logging_enabled,
            logged_categories,
        };
    }

    pub fn log(&self, status: impl Into<Fmi3Status>, category: &str, message: &str) {
        self.emit(status_code(status), category, message, false);
    }

    /// Hold a message until the end of the current call.
    pub fn enqueue(&self, record: LogRecord) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Forward every held message, oldest first.
    pub fn flush(&self) {
        let records = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        for record in records {
            self.emit(record.status, &record.category, &record.message, record.debug);
        }
    }

    fn emit(&self, status: binding::fmi3Status, category: &str, message: &str, debug: bool) {
        if !self.settings().accepts(category, debug) {
            return;
        }
        let Some(log_message) = self.log_message else {
            return;
        };
        let category_c = to_c_string(category);
        let message_c = to_c_string(message);
        unsafe {
            log_message(
                self.environment.0,
                status,
                category_c.as_ptr(),
                message_c.as_ptr(),
            )
        };
    }
}

fn to_c_string(s: &str) -> CString {
    CString::new(s.replace('\0', " ")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pythonfmu_test_data::LogRecorder;

    fn logger(recorder: &LogRecorder, debug: bool) -> Logger {
        Logger::new(recorder.environment(), recorder.log_message(), debug)
    }

    #[test_log::test]
    fn test_empty_allow_list_accepts_all() {
        let recorder = LogRecorder::new();
        let logger = logger(&recorder, false);
        logger.log(binding::fmi3Status_fmi3OK, "logEvents", "one");
        logger.log(binding::fmi3Status_fmi3Warning, "anything", "two");

        let records = recorder.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, "logEvents");
        assert_eq!(records[1].status, binding::fmi3Status_fmi3Warning);
        assert_eq!(records[1].message, "two");
    }

    #[test_log::test]
    fn test_category_filter_replaces() {
        let recorder = LogRecorder::new();
        let logger = logger(&recorder, false);

        logger.set_debug_logging(false, vec!["logEvents".to_owned()]);
        logger.log(binding::fmi3Status_fmi3OK, "logEvents", "kept");
        logger.log(binding::fmi3Status_fmi3OK, "logStatusError", "dropped");

        logger.set_debug_logging(false, vec!["logStatusError".to_owned()]);
        logger.log(binding::fmi3Status_fmi3OK, "logEvents", "dropped after replace");
        logger.log(binding::fmi3Status_fmi3Error, "logStatusError", "kept after replace");

        assert_eq!(recorder.messages(), vec!["kept", "kept after replace"]);
    }

    #[test_log::test]
    fn test_debug_messages_need_debug_logging() {
        let recorder = LogRecorder::new();
        let logger = logger(&recorder, false);
        let debug = |message: &str| LogRecord {
            status: binding::fmi3Status_fmi3OK,
            category: "logEvents".to_owned(),
            message: message.to_owned(),
            debug: true,
        };
        logger.enqueue(debug("hidden"));
        logger.flush();
        logger.log(binding::fmi3Status_fmi3OK, "logEvents", "shown");

        logger.set_debug_logging(true, vec![]);
        logger.enqueue(debug("now shown"));
        logger.flush();

        assert_eq!(recorder.messages(), vec!["shown", "now shown"]);
    }

    #[test_log::test]
    fn test_flush_preserves_order() {
        let recorder = LogRecorder::new();
        let logger = logger(&recorder, true);
        for (i, debug) in [false, true, false].into_iter().enumerate() {
            logger.enqueue(LogRecord {
                status: binding::fmi3Status_fmi3OK,
                category: "logEvents".to_owned(),
                message: format!("message {i}"),
                debug,
            });
        }
        assert!(recorder.records().is_empty());

        logger.flush();
        assert_eq!(
            recorder.messages(),
            vec!["message 0", "message 1", "message 2"]
        );

        // The queue is empty after a flush
        logger.flush();
        assert_eq!(recorder.records().len(), 3);
    }

    #[test_log::test]
    fn test_interior_nul_and_missing_callback() {
        let recorder = LogRecorder::new();
        let logger = logger(&recorder, false);
        logger.log(binding::fmi3Status_fmi3OK, "logEvents", "nul\0inside");
        assert_eq!(recorder.messages(), vec!["nul inside"]);

        let silent = Logger::new(std::ptr::null_mut(), None, true);
        silent.log(binding::fmi3Status_fmi3Fatal, LOG_STATUS_FATAL, "goes nowhere");
        silent.enqueue(LogRecord {
            status: binding::fmi3Status_fmi3OK,
            category: String::new(),
            message: "also nowhere".to_owned(),
            debug: false,
        });
        silent.flush();
    }

    #[test_log::test]
    fn test_status_category() {
        assert_eq!(status_category(binding::fmi3Status_fmi3Fatal), LOG_STATUS_FATAL);
        assert_eq!(status_category(binding::fmi3Status_fmi3Error), LOG_STATUS_ERROR);
        assert_eq!(status_category(binding::fmi3Status_fmi3OK), LOG_ALL);
    }
}
