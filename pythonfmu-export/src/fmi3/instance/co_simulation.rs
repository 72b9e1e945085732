use super::ModelInstance;
use crate::fmi3::{binding, ModelState};

impl ModelInstance {
    /// Advance the model by one communication step.
    ///
    /// An `OK` step ends exactly at `current_communication_point + communication_step_size`.
    /// Any other outcome, `Warning` included, ends where the model says it stopped, or at the
    /// start of the step if the model does not say.
    #[allow(clippy::too_many_arguments)]
    pub fn do_step(
        &mut self,
        current_communication_point: f64,
        communication_step_size: f64,
        no_set_fmu_state_prior_to_current_point: bool,
        event_handling_needed: &mut bool,
        terminate_simulation: &mut bool,
        early_return: &mut bool,
        last_successful_time: &mut f64,
    ) -> binding::fmi3Status {
        *event_handling_needed = false;
        *terminate_simulation = false;
        *early_return = false;
        *last_successful_time = self.last_successful_time;

        self.invoke_in("fmi3DoStep", &[ModelState::StepMode], |this| {
            let result = this.slave.do_step(
                current_communication_point,
                communication_step_size,
                no_set_fmu_state_prior_to_current_point,
            )?;

            this.last_successful_time = if result.status == binding::fmi3Status_fmi3OK {
                current_communication_point + communication_step_size
            } else {
                result
                    .last_successful_time
                    .unwrap_or(current_communication_point)
            };

            *event_handling_needed = result.event_handling_needed;
            *terminate_simulation = result.terminate_simulation;
            *early_return = result.early_return;
            *last_successful_time = this.last_successful_time;
            Ok(result.status)
        })
    }
}
