/// Tuning knobs shared by the snapshot decoder and the patch engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Maximum nesting of schema instances inside one message. Bounds the
    /// recursion of both engines on hostile input.
    pub max_depth: usize,
    /// Whether instances unreachable from the root are dropped after each
    /// successful patch.
    pub collect_garbage: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            collect_garbage: true,
        }
    }
}
