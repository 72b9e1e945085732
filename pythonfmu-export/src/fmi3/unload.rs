//! Library unload hook.

use super::runtime;

/// Runs when the shared library is unloaded or the process exits. Instances the host never
/// freed keep the interpreter alive; it goes away with the last of them.
#[ctor::dtor]
fn finalize_python() {
    runtime::finalize();
}
