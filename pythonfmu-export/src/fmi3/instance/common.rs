//! Mode transitions and logging configuration.

use super::ModelInstance;
use crate::fmi3::{binding, DiscreteStates, Fmi3Res, ModelState};

impl ModelInstance {
    /// Replace the logging configuration. Never reaches the model.
    pub fn set_debug_logging(
        &mut self,
        logging_on: bool,
        categories: Vec<String>,
    ) -> binding::fmi3Status {
        self.logger.set_debug_logging(logging_on, categories);
        binding::fmi3Status_fmi3OK
    }

    pub fn enter_initialization_mode(
        &mut self,
        tolerance: Option<f64>,
        start_time: f64,
        stop_time: Option<f64>,
    ) -> binding::fmi3Status {
        self.invoke_in(
            "fmi3EnterInitializationMode",
            &[ModelState::Instantiated],
            |this| {
                this.slave
                    .setup_experiment(tolerance, start_time, stop_time)?;
                this.slave.enter_initialization_mode()?;
                this.last_successful_time = start_time;
                this.state = ModelState::InitializationMode;
                Ok(Fmi3Res::OK)
            },
        )
    }

    pub fn exit_initialization_mode(&mut self) -> binding::fmi3Status {
        self.invoke_in(
            "fmi3ExitInitializationMode",
            &[ModelState::InitializationMode],
            |this| {
                this.slave.exit_initialization_mode()?;
                this.state = if this.event_mode_used {
                    ModelState::EventMode
                } else {
                    ModelState::StepMode
                };
                Ok(Fmi3Res::OK)
            },
        )
    }

    pub fn enter_event_mode(&mut self) -> binding::fmi3Status {
        self.transition(
            "fmi3EnterEventMode",
            &[ModelState::StepMode],
            ModelState::EventMode,
        )
    }

    pub fn enter_step_mode(&mut self) -> binding::fmi3Status {
        self.transition(
            "fmi3EnterStepMode",
            &[ModelState::EventMode],
            ModelState::StepMode,
        )
    }

    pub fn enter_configuration_mode(&mut self) -> binding::fmi3Status {
        self.invoke_in(
            "fmi3EnterConfigurationMode",
            &[ModelState::Instantiated, ModelState::StepMode],
            |this| {
                this.state = match this.state {
                    ModelState::StepMode => ModelState::ReconfigurationMode,
                    _ => ModelState::ConfigurationMode,
                };
                Ok(Fmi3Res::OK)
            },
        )
    }

    pub fn exit_configuration_mode(&mut self) -> binding::fmi3Status {
        self.invoke_in(
            "fmi3ExitConfigurationMode",
            &[ModelState::ConfigurationMode, ModelState::ReconfigurationMode],
            |this| {
                this.state = match this.state {
                    ModelState::ReconfigurationMode => ModelState::StepMode,
                    _ => ModelState::Instantiated,
                };
                Ok(Fmi3Res::OK)
            },
        )
    }

    pub fn terminate(&mut self) -> binding::fmi3Status {
        self.invoke_in(
            "fmi3Terminate",
            &[ModelState::StepMode, ModelState::EventMode],
            |this| {
                this.slave.terminate()?;
                this.state = ModelState::Terminated;
                Ok(Fmi3Res::OK)
            },
        )
    }

    /// Rebuild the model from scratch and return to `Instantiated`.
    pub fn reset(&mut self) -> binding::fmi3Status {
        self.invoke("fmi3Reset", |this| {
            this.strings.clear();
            this.slave.reset()?;
            this.last_successful_time = 0.0;
            this.state = ModelState::Instantiated;
            Ok(Fmi3Res::OK)
        })
    }

    pub fn update_discrete_states(&mut self, discrete_states: &mut DiscreteStates) -> binding::fmi3Status {
        self.invoke_in(
            "fmi3UpdateDiscreteStates",
            &[ModelState::EventMode],
            |this| {
                *discrete_states = this.slave.update_discrete_states()?;
                Ok(Fmi3Res::OK)
            },
        )
    }

    /// A mode change that only records the new state
    fn transition(
        &mut self,
        function: &'static str,
        allowed: &[ModelState],
        next: ModelState,
    ) -> binding::fmi3Status {
        self.invoke_in(function, allowed, |this| {
            this.state = next;
            Ok(Fmi3Res::OK)
        })
    }
}

#[cfg(test)]
mod tests {
    use pythonfmu_test_data::LogRecorder;

    use super::super::tests::{instance, step_mode, MapSlave};
    use super::*;

    #[test_log::test]
    fn test_co_simulation_modes() {
        let recorder = LogRecorder::new();
        let mut instance = instance(&recorder, MapSlave::default());
        step_mode(&mut instance);

        assert_eq!(instance.enter_event_mode(), binding::fmi3Status_fmi3OK);
        assert_eq!(instance.state(), ModelState::EventMode);

        let mut discrete_states = DiscreteStates::default();
        assert_eq!(
            instance.update_discrete_states(&mut discrete_states),
            binding::fmi3Status_fmi3OK
        );
        assert_eq!(discrete_states, DiscreteStates::default());

        assert_eq!(instance.enter_step_mode(), binding::fmi3Status_fmi3OK);
        assert_eq!(instance.state(), ModelState::StepMode);

        assert_eq!(instance.terminate(), binding::fmi3Status_fmi3OK);
        assert_eq!(instance.state(), ModelState::Terminated);
        assert!(recorder.records().is_empty());
    }

    #[test_log::test]
    fn test_configuration_modes() {
        let recorder = LogRecorder::new();
        let mut instance = instance(&recorder, MapSlave::default());

        assert_eq!(instance.enter_configuration_mode(), binding::fmi3Status_fmi3OK);
        assert_eq!(instance.state(), ModelState::ConfigurationMode);
        assert_eq!(instance.exit_configuration_mode(), binding::fmi3Status_fmi3OK);
        assert_eq!(instance.state(), ModelState::Instantiated);

        step_mode(&mut instance);
        assert_eq!(instance.enter_configuration_mode(), binding::fmi3Status_fmi3OK);
        assert_eq!(instance.state(), ModelState::ReconfigurationMode);
        assert_eq!(instance.exit_configuration_mode(), binding::fmi3Status_fmi3OK);
        assert_eq!(instance.state(), ModelState::StepMode);
    }

    #[test_log::test]
    fn test_illegal_transitions_are_rejected() {
        let recorder = LogRecorder::new();
        let mut instance = instance(&recorder, MapSlave::default());

        assert_eq!(instance.exit_initialization_mode(), binding::fmi3Status_fmi3Error);
        assert_eq!(instance.enter_step_mode(), binding::fmi3Status_fmi3Error);
        assert_eq!(instance.terminate(), binding::fmi3Status_fmi3Error);
        assert_eq!(instance.state(), ModelState::Instantiated);

        assert!(recorder.contains(
            "fmi3ExitInitializationMode: not allowed in state Instantiated"
        ));
    }

    #[test_log::test]
    fn test_event_mode_after_initialization() {
        let recorder = LogRecorder::new();
        let logger = std::sync::Arc::new(crate::fmi3::Logger::new(
            recorder.environment(),
            recorder.log_message(),
            false,
        ));
        let mut instance =
            ModelInstance::new("events".to_owned(), logger, true, Box::new(MapSlave::default()));
        instance.enter_initialization_mode(None, 1.5, None);
        assert_eq!(instance.exit_initialization_mode(), binding::fmi3Status_fmi3OK);
        assert_eq!(instance.state(), ModelState::EventMode);
        assert_eq!(instance.last_successful_time(), 1.5);
    }

    #[test_log::test]
    fn test_reset_returns_to_instantiated() {
        let recorder = LogRecorder::new();
        let mut instance = instance(&recorder, MapSlave::default());
        step_mode(&mut instance);
        assert_eq!(instance.set_float64(&[1], &[4.0]), binding::fmi3Status_fmi3OK);

        assert_eq!(instance.reset(), binding::fmi3Status_fmi3OK);
        assert_eq!(instance.state(), ModelState::Instantiated);

        let mut values = [0.0];
        assert_eq!(
            instance.get_float64(&[1], &mut values),
            binding::fmi3Status_fmi3Error
        );
    }
}
