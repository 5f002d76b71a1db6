/// Controls link assembly behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// When true, bytes discarded during resynchronization are kept as
    /// [`GarbageSpan`](crate::GarbageSpan)s until taken.
    pub keep_garbage: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self { keep_garbage: true }
    }
}
