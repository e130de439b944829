//! Compile-time limits and the runtime configuration read by `init`.

/// Size of the task table.
///
/// One slot stays unused as a guard, so at most `MAX_TASKS - 1` tasks can be registered.
pub const MAX_TASKS: usize = 10;

#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct KernelConfig {
    pub(crate) register_tags: bool,
}

impl KernelConfig {
    /// Fills the unused register slots of every synthesized frame with
    /// `(task index + 1) * 1000 + register number`, so that a stack dump shows which
    /// register belongs to which task. Otherwise the slots are zeroed.
    ///
    /// Defaults to on when the `register-tags` feature is enabled.
    pub fn with_register_tags(self, register_tags: bool) -> Self {
        Self {
            register_tags,
            ..self
        }
    }

    pub fn register_tags(&self) -> bool {
        self.register_tags
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            register_tags: cfg!(feature = "register-tags"),
        }
    }
}
