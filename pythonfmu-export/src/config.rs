//! Runtime configuration of the Python slave loader.

use std::fmt;

/// Name of the resource file holding the importable module name.
pub const DEFAULT_MODULE_FILE: &str = "slavemodule.txt";
/// Module that defines the base classes a model may derive from.
pub const DEFAULT_BASE_MODULE: &str = "pythonfmu3.fmi3slave";
pub const DEFAULT_BASE_CLASSES: [&str; 2] = ["Fmi3Slave", "Fmi3SlaveBase"];

/// Overrides [`SlaveConfig::module_file`].
pub const ENV_MODULE_FILE: &str = "PYTHONFMU_MODULE_FILE";
/// Overrides the base classes, as a comma separated list of `module:Class` entries.
pub const ENV_BASE_CLASS: &str = "PYTHONFMU_BASE_CLASS";

/// A class a model may derive from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseClass {
    pub module: String,
    pub class: String,
}

impl BaseClass {
    pub fn new(module: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            class: class.into(),
        }
    }

    /// Parse the `module:Class` form.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().split_once(':') {
            Some((module, class)) if !module.trim().is_empty() && !class.trim().is_empty() => {
                Some(Self::new(module.trim(), class.trim()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for BaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.class)
    }
}

/// Where to find the model module and which base classes it may implement.
///
/// A model qualifies when it derives from any of [`SlaveConfig::base_classes`]. Bases that
/// cannot be imported are skipped, so older `pythonfmu3` releases without `Fmi3SlaveBase` still
/// load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlaveConfig {
    pub module_file: String,
    pub base_classes: Vec<BaseClass>,
}

impl Default for SlaveConfig {
    fn default() -> Self {
        Self {
            module_file: DEFAULT_MODULE_FILE.to_owned(),
            base_classes: DEFAULT_BASE_CLASSES
                .iter()
                .map(|class| BaseClass::new(DEFAULT_BASE_MODULE, *class))
                .collect(),
        }
    }
}

impl SlaveConfig {
    /// Build the configuration from the process environment, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(module_file) = lookup(ENV_MODULE_FILE).filter(|s| !s.trim().is_empty()) {
            config.module_file = module_file.trim().to_owned();
        }

        if let Some(bases) = lookup(ENV_BASE_CLASS) {
            let parsed: Option<Vec<BaseClass>> = bases.split(',').map(BaseClass::parse).collect();
            match parsed {
                Some(parsed) if !parsed.is_empty() => config.base_classes = parsed,
                _ => log::warn!(
                    "Ignoring {ENV_BASE_CLASS}={bases:?}, expected a comma separated list of `module:Class`"
                ),
            }
        }

        config
    }

    /// The accepted bases as one human readable string.
    pub fn base_names(&self) -> String {
        self.base_classes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ")
    }
}
