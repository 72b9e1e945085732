#![doc=include_str!( "../README.md")]
#![deny(unsafe_code)]
#![deny(clippy::all)]

use anyhow::Context;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

mod recorder;

pub use recorder::{LogRecorder, RecordedLog};

const BASE_PACKAGE: &str = "pythonfmu3";
const BASE_MODULE_SOURCE: &str = include_str!("python/fmi3slave.py");
const MODULE_FILE: &str = "slavemodule.txt";

/// Value references of the variables registered by [`PythonModels::Echo`].
pub mod echo {
    pub const REAL_IN: u32 = 0;
    pub const REAL_OUT: u32 = 1;
    pub const INT8: u32 = 2;
    pub const INT16: u32 = 3;
    pub const INT32: u32 = 4;
    pub const INT64: u32 = 5;
    pub const UINT8: u32 = 6;
    pub const UINT16: u32 = 7;
    pub const UINT32: u32 = 8;
    pub const UINT64: u32 = 9;
    pub const BOOLEAN: u32 = 10;
    pub const STRING: u32 = 11;
}

/// Value references of the variables registered by [`PythonModels::Stepper`].
pub mod stepper {
    pub const TIME: u32 = 0;
    pub const STOP_TIME: u32 = 1;
    /// Largest step the model accepts.
    pub const MAX_STEP: f64 = 0.5;
}

/// Value references of the variables registered by [`PythonModels::BaseDerived`].
pub mod counter {
    pub const STEPS: u32 = 0;
}

/// The Python models available to tests.
///
/// Every model lives in its own module so that the interpreter's module cache never hands one
/// test the module written by another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PythonModels {
    /// One variable of every supported type, `realOut = 2 * realIn` on each step
    Echo,
    /// Discards steps larger than [`stepper::MAX_STEP`], requests termination at `stopTime`
    Stepper,
    /// Raises from `do_step`
    Raising,
    /// Logs through the queue and the logger object
    Chatty,
    /// Derives from `Fmi3SlaveBase` and counts steps in [`counter::STEPS`]
    BaseDerived,
    /// Defines two qualifying classes
    Twins,
    /// Defines no qualifying class
    NoSlave,
    /// Raises from `__init__`
    BrokenInit,
    /// Fails to import
    SyntaxError,
}

impl PythonModels {
    pub fn module_name(&self) -> &'static str {
        match self {
            Self::Echo => "echo_slave",
            Self::Stepper => "stepper_slave",
            Self::Raising => "raising_slave",
            Self::Chatty => "chatty_slave",
            Self::BaseDerived => "base_slave",
            Self::Twins => "twin_slaves",
            Self::NoSlave => "no_slave",
            Self::BrokenInit => "broken_init_slave",
            Self::SyntaxError => "syntax_error_slave",
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::Echo => include_str!("python/echo_slave.py"),
            Self::Stepper => include_str!("python/stepper_slave.py"),
            Self::Raising => include_str!("python/raising_slave.py"),
            Self::Chatty => include_str!("python/chatty_slave.py"),
            Self::BaseDerived => include_str!("python/base_slave.py"),
            Self::Twins => include_str!("python/twin_slaves.py"),
            Self::NoSlave => include_str!("python/no_slave.py"),
            Self::BrokenInit => include_str!("python/broken_init_slave.py"),
            Self::SyntaxError => include_str!("python/syntax_error_slave.py"),
        }
    }

    /// Write the model into a fresh resource directory
    pub fn resources(&self) -> anyhow::Result<ResourceDir> {
        ResourceDir::new(self.module_name(), self.source())
    }
}

/// A temporary FMU `resources` directory, removed on drop.
#[derive(Debug)]
pub struct ResourceDir {
    dir: TempDir,
}

impl ResourceDir {
    /// Create a resource directory holding `source` as module `module`.
    ///
    /// The directory name contains a space so that URI decoding of the resource location is
    /// exercised as well.
    pub fn new(module: &str, source: &str) -> anyhow::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("pythonfmu resources")
            .tempdir()
            .context("Create resource directory")?;

        fs::write(dir.path().join(MODULE_FILE), format!("{module}\n"))
            .context(format!("Write {MODULE_FILE}"))?;
        fs::write(dir.path().join(format!("{module}.py")), source)
            .context(format!("Write module {module}"))?;

        let package = dir.path().join(BASE_PACKAGE);
        fs::create_dir(&package).context(format!("Create package {package:?}"))?;
        fs::write(package.join("__init__.py"), "").context("Write package __init__")?;
        fs::write(package.join("fmi3slave.py"), BASE_MODULE_SOURCE)
            .context("Write base module")?;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The resource path in the form FMI 3.0 passes it: an absolute path with a trailing
    /// separator.
    pub fn resource_path(&self) -> String {
        let mut path: PathBuf = self.dir.path().to_path_buf();
        path.push("");
        path.to_string_lossy().into_owned()
    }

    /// The resource location as a percent-encoded `file://` URI.
    pub fn resource_uri(&self) -> String {
        let path = self.resource_path().replace('\\', "/").replace(' ', "%20");
        if path.starts_with('/') {
            format!("file://{path}")
        } else {
            format!("file:///{path}")
        }
    }
}

#[test]
fn test_resource_dir_layout() {
    let resources = PythonModels::Echo.resources().unwrap();
    let pointer = fs::read_to_string(resources.path().join(MODULE_FILE)).unwrap();
    assert_eq!(pointer.lines().next(), Some("echo_slave"));
    assert!(resources.path().join("echo_slave.py").is_file());
    assert!(resources.path().join("pythonfmu3/fmi3slave.py").is_file());
    assert!(resources.resource_path().ends_with(std::path::MAIN_SEPARATOR));
    assert!(resources.resource_uri().starts_with("file:///"));
    assert!(resources.resource_uri().contains("pythonfmu%20resources"));
}
