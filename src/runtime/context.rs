//! Evaluation context: the diagnostic sink and random source.

use super::error::MachineError;
use rand::Rng;
use std::fmt;
use std::sync::Arc;

/// Receiver of trace messages, warnings and errors.
///
/// Every method has a default: `log` and `warn` go to `tracing` at trace and
/// warn level, `error` is fatal and hands the error back to the caller.
/// Override `error` to return `Ok(())` and the evaluator carries on as if the
/// faulty transition or branch had not been found.
pub trait Diagnostics: Send + Sync {
    fn log(&self, message: &str) {
        tracing::trace!(target: "statetree", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "statetree", "{message}");
    }

    fn error(&self, error: MachineError) -> Result<(), MachineError> {
        Err(error)
    }
}

/// Sink with every default behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDiagnostics;

impl Diagnostics for DefaultDiagnostics {}

/// Returns an index in `[0, max)`.
pub type RandomSource = Box<dyn FnMut(usize) -> usize + Send>;

/// Explicit configuration passed to every evaluation.
///
/// # Example
///
/// ```rust
/// use statetree::runtime::Context;
///
/// // Always pick the first enabled branch of a choice.
/// let context = Context::new().with_random(|_| 0).with_auto_compile(false);
/// assert!(!context.auto_compile());
/// ```
pub struct Context {
    diagnostics: Arc<dyn Diagnostics>,
    random: RandomSource,
    auto_compile: bool,
}

impl Context {
    pub fn new() -> Self {
        Self {
            diagnostics: Arc::new(DefaultDiagnostics),
            random: Box::new(|max| rand::thread_rng().gen_range(0..max)),
            auto_compile: true,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Replace the sink, returning the previous one.
    pub fn set_diagnostics(&mut self, diagnostics: Arc<dyn Diagnostics>) -> Arc<dyn Diagnostics> {
        std::mem::replace(&mut self.diagnostics, diagnostics)
    }

    pub fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }

    pub fn with_random<F>(mut self, random: F) -> Self
    where
        F: FnMut(usize) -> usize + Send + 'static,
    {
        self.random = Box::new(random);
        self
    }

    /// Whether a dirty machine is compiled before evaluation.
    pub fn with_auto_compile(mut self, auto_compile: bool) -> Self {
        self.auto_compile = auto_compile;
        self
    }

    pub fn auto_compile(&self) -> bool {
        self.auto_compile
    }

    /// Index in `[0, max)`, whatever the installed source returns.
    pub(crate) fn random(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.random)(max) % max
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("auto_compile", &self.auto_compile)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        warnings: Mutex<Vec<String>>,
    }

    impl Diagnostics for Recording {
        fn warn(&self, message: &str) {
            self.warnings.lock().unwrap().push(message.to_string());
        }

        fn error(&self, _: MachineError) -> Result<(), MachineError> {
            Ok(())
        }
    }

    #[test]
    fn default_sink_treats_errors_as_fatal() {
        let context = Context::new();

        let result = context.diagnostics().error(MachineError::NotCompiled);

        assert_eq!(result, Err(MachineError::NotCompiled));
    }

    #[test]
    fn sink_can_be_swapped() {
        let recording = Arc::new(Recording::default());
        let mut context = Context::new();

        context.set_diagnostics(recording.clone());
        context.diagnostics().warn("careful");

        assert_eq!(*recording.warnings.lock().unwrap(), vec!["careful".to_string()]);
        assert!(context.diagnostics().error(MachineError::NotCompiled).is_ok());
    }

    #[test]
    fn random_source_is_clamped_to_range() {
        let mut context = Context::new().with_random(|_| 7);

        assert_eq!(context.random(3), 1);
        assert_eq!(context.random(0), 0);
    }

    #[test]
    fn default_random_source_stays_in_range() {
        let mut context = Context::new();

        for _ in 0..100 {
            assert!(context.random(4) < 4);
        }
    }
}
