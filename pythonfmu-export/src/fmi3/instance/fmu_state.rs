//! FMU state snapshots.
//!
//! Snapshots are owned by the host between calls. `slot` arguments mirror the in/out
//! `fmi3FMUState*` parameters of the C API.

use super::ModelInstance;
use crate::{
    fmi3::{binding, Fmi3Res, FmuState},
    Error,
};

impl ModelInstance {
    /// Capture the current state as a new snapshot in `slot`.
    pub fn get_fmu_state(&mut self, slot: &mut Option<FmuState>) -> binding::fmi3Status {
        self.invoke("fmi3GetFMUState", |this| {
            *slot = Some(this.slave.get_fmu_state()?);
            Ok(Fmi3Res::OK)
        })
    }

    /// Capture the current state over a snapshot the host already holds.
    ///
    /// The snapshot is replaced in place, so the host's handle stays the same. It is left
    /// untouched when the model fails to produce a new one.
    pub fn overwrite_fmu_state(&mut self, existing: &mut FmuState) -> binding::fmi3Status {
        self.invoke("fmi3GetFMUState", |this| {
            let snapshot = this.slave.get_fmu_state()?;
            let previous = std::mem::replace(existing, snapshot);
            this.slave.free_fmu_state(previous)?;
            Ok(Fmi3Res::OK)
        })
    }

    pub fn set_fmu_state(&mut self, state: &FmuState) -> binding::fmi3Status {
        self.invoke("fmi3SetFMUState", |this| {
            this.slave.set_fmu_state(state)?;
            Ok(Fmi3Res::OK)
        })
    }

    pub fn free_fmu_state(&mut self, state: Option<FmuState>) -> binding::fmi3Status {
        self.invoke("fmi3FreeFMUState", |this| {
            if let Some(state) = state {
                this.slave.free_fmu_state(state)?;
            }
            Ok(Fmi3Res::OK)
        })
    }

    pub fn serialized_fmu_state_size(
        &mut self,
        state: &FmuState,
        size: &mut usize,
    ) -> binding::fmi3Status {
        self.invoke("fmi3SerializedFMUStateSize", |this| {
            *size = this.slave.serialize_fmu_state(state)?.len();
            Ok(Fmi3Res::OK)
        })
    }

    pub fn serialize_fmu_state(
        &mut self,
        state: &FmuState,
        serialized_state: &mut [u8],
    ) -> binding::fmi3Status {
        self.invoke("fmi3SerializeFMUState", |this| {
            let bytes = this.slave.serialize_fmu_state(state)?;
            let available = serialized_state.len();
            let target = serialized_state.get_mut(..bytes.len()).ok_or_else(|| {
                Error::Model(format!(
                    "Serialized state needs {} bytes, buffer holds {available}",
                    bytes.len()
                ))
            })?;
            target.copy_from_slice(&bytes);
            Ok(Fmi3Res::OK)
        })
    }

    /// Rebuild a snapshot from bytes. The result is a new snapshot owned by the host.
    pub fn deserialize_fmu_state(
        &mut self,
        serialized_state: &[u8],
        slot: &mut Option<FmuState>,
    ) -> binding::fmi3Status {
        self.invoke("fmi3DeserializeFMUState", |this| {
            *slot = Some(this.slave.deserialize_fmu_state(serialized_state)?);
            Ok(Fmi3Res::OK)
        })
    }
}
