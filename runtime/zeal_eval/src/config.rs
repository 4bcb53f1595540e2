//! Evaluator configuration.

/// Explicit configuration value passed to [`crate::Evaluator::new`]
/// instead of process-global flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Whether `{name}` interpolation runs at all. Disabling it turns
    /// [`crate::Evaluator::interpolate`] into a pass-through.
    pub interpolation: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            interpolation: true,
        }
    }
}
