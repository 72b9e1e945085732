use super::ModelInstance;
use crate::{
    fmi3::{binding, Fmi3Res},
    Error,
};

/// Scalar accessors transfer exactly one value per value reference.
fn check_scalar_counts(n_value_references: usize, n_values: usize) -> Result<(), Error> {
    if n_value_references == n_values {
        Ok(())
    } else {
        Err(Error::Model(format!(
            "Array length mismatch: {n_value_references} value references, {n_values} values"
        )))
    }
}

macro_rules! scalar_getter_setter {
    ($name:ident, $ty:ty, $fmi_name:ident) => {
        $crate::paste::paste! {
            pub fn [<get_ $name>](
                &mut self,
                vrs: &[binding::fmi3ValueReference],
                values: &mut [$ty],
            ) -> binding::fmi3Status {
                self.invoke(concat!("fmi3Get", stringify!($fmi_name)), |this| {
                    check_scalar_counts(vrs.len(), values.len())?;
                    this.slave.[<get_ $name>](vrs, values)?;
                    Ok(Fmi3Res::OK)
                })
            }

            pub fn [<set_ $name>](
                &mut self,
                vrs: &[binding::fmi3ValueReference],
                values: &[$ty],
            ) -> binding::fmi3Status {
                self.invoke(concat!("fmi3Set", stringify!($fmi_name)), |this| {
                    check_scalar_counts(vrs.len(), values.len())?;
                    this.slave.[<set_ $name>](vrs, values)?;
                    Ok(Fmi3Res::OK)
                })
            }
        }
    };
}

impl ModelInstance {
    /// Float64 variables may be arrays, so the number of values is not tied to the number of
    /// value references.
    pub fn get_float64(
        &mut self,
        vrs: &[binding::fmi3ValueReference],
        values: &mut [f64],
    ) -> binding::fmi3Status {
        self.invoke("fmi3GetFloat64", |this| {
            this.slave.get_float64(vrs, values)?;
            Ok(Fmi3Res::OK)
        })
    }

    pub fn set_float64(
        &mut self,
        vrs: &[binding::fmi3ValueReference],
        values: &[f64],
    ) -> binding::fmi3Status {
        self.invoke("fmi3SetFloat64", |this| {
            this.slave.set_float64(vrs, values)?;
            Ok(Fmi3Res::OK)
        })
    }

    scalar_getter_setter!(int8, i8, Int8);
    scalar_getter_setter!(int16, i16, Int16);
    scalar_getter_setter!(int32, i32, Int32);
    scalar_getter_setter!(int64, i64, Int64);
    scalar_getter_setter!(uint8, u8, UInt8);
    scalar_getter_setter!(uint16, u16, UInt16);
    scalar_getter_setter!(uint32, u32, UInt32);
    scalar_getter_setter!(uint64, u64, UInt64);
    scalar_getter_setter!(boolean, bool, Boolean);

    /// The returned pointers stay valid until the next `get_string` or `reset` on this instance.
    pub fn get_string(
        &mut self,
        vrs: &[binding::fmi3ValueReference],
        values: &mut [binding::fmi3String],
    ) -> binding::fmi3Status {
        // Released before the call, not after: the host may still hold the previous pointers
        // until it calls again.
        self.strings.clear();
        self.invoke("fmi3GetString", |this| {
            this.strings = this.slave.get_string(vrs, values.len())?;
            if this.strings.len() != values.len() {
                return Err(Error::Model(format!(
                    "Expected {} string values, got {}",
                    values.len(),
                    this.strings.len()
                )));
            }
            for (value, string) in values.iter_mut().zip(&this.strings) {
                *value = string.as_ptr();
            }
            Ok(Fmi3Res::OK)
        })
    }

    pub fn set_string(
        &mut self,
        vrs: &[binding::fmi3ValueReference],
        values: &[&str],
    ) -> binding::fmi3Status {
        self.invoke("fmi3SetString", |this| {
            this.slave.set_string(vrs, values)?;
            Ok(Fmi3Res::OK)
        })
    }
}
