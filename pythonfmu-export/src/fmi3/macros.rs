/// Dereference an [`fmi3Instance`](crate::fmi3::binding::fmi3Instance) into the
/// [`ModelInstance`](crate::fmi3::ModelInstance) behind it, returning `fmi3Error` for null.
macro_rules! checked_deref {
    ($ptr:expr) => {{
        if ($ptr as *mut ::std::os::raw::c_void).is_null() {
            ::log::error!("Invalid FMU instance");
            return $crate::fmi3::binding::fmi3Status_fmi3Error;
        }
        unsafe { &mut *($ptr as *mut $crate::fmi3::ModelInstance) }
    }};
}

/// Borrow a host array, or reject the call when a non-empty array is null.
///
/// The `mut` form must come first: `mut x` does not parse as an expression.
macro_rules! host_slice {
    (mut $instance:expr, $function:expr, $ptr:expr, $len:expr) => {
        match unsafe { $crate::fmi3::export::host_slice_mut($ptr, $len) } {
            Some(slice) => slice,
            None => {
                return $instance.invalid_argument($function, concat!("`", stringify!($ptr), "` is null"))
            }
        }
    };
    ($instance:expr, $function:expr, $ptr:expr, $len:expr) => {
        match unsafe { $crate::fmi3::export::host_slice($ptr, $len) } {
            Some(slice) => slice,
            None => {
                return $instance.invalid_argument($function, concat!("`", stringify!($ptr), "` is null"))
            }
        }
    };
}

/// Export `fmi3Get<Name>` and `fmi3Set<Name>` for a numeric type.
macro_rules! export_getter_setter {
    ($name:ident, $ty:ty, $fmi_name:ident) => {
        $crate::paste::paste! {
            #[unsafe(no_mangle)]
            #[allow(non_snake_case)]
            pub unsafe extern "C" fn [<fmi3Get $fmi_name>](
                instance: binding::fmi3Instance,
                value_references: *const binding::fmi3ValueReference,
                n_value_references: usize,
                values: *mut $ty,
                n_values: usize,
            ) -> binding::fmi3Status {
                const FUNCTION: &str = concat!("fmi3Get", stringify!($fmi_name));
                let instance = checked_deref!(instance);
                let vrs = host_slice!(instance, FUNCTION, value_references, n_value_references);
                let values = host_slice!(mut instance, FUNCTION, values, n_values);
                instance.[<get_ $name>](vrs, values)
            }

            #[unsafe(no_mangle)]
            #[allow(non_snake_case)]
            pub unsafe extern "C" fn [<fmi3Set $fmi_name>](
                instance: binding::fmi3Instance,
                value_references: *const binding::fmi3ValueReference,
                n_value_references: usize,
                values: *const $ty,
                n_values: usize,
            ) -> binding::fmi3Status {
                const FUNCTION: &str = concat!("fmi3Set", stringify!($fmi_name));
                let instance = checked_deref!(instance);
                let vrs = host_slice!(instance, FUNCTION, value_references, n_value_references);
                let values = host_slice!(instance, FUNCTION, values, n_values);
                instance.[<set_ $name>](vrs, values)
            }
        }
    };
}

/// Export functions that only report themselves as unsupported.
///
/// Arguments are accepted with their C types and ignored.
macro_rules! export_unsupported {
    ($($name:ident($($arg:ident: $ty:ty),* $(,)?);)+) => {
        $(
            #[unsafe(no_mangle)]
            #[allow(non_snake_case)]
            pub unsafe extern "C" fn $name(
                instance: binding::fmi3Instance,
                $($arg: $ty),*
            ) -> binding::fmi3Status {
                $(let _ = $arg;)*
                let instance = checked_deref!(instance);
                instance.unsupported(stringify!($name))
            }
        )+
    };
}

pub(crate) use checked_deref;
pub(crate) use export_getter_setter;
pub(crate) use export_unsupported;
pub(crate) use host_slice;
