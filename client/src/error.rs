use thiserror::Error;

use statesync_shared::DecodeError;

/// Errors surfaced by [`StateClient`](crate::StateClient)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The handshake could not be decoded into a type registry. The previous
    /// registry, if any, is still in use.
    #[error("Handshake rejected: {0}")]
    Handshake(DecodeError),

    /// A full snapshot could not be decoded. The previous state is untouched.
    #[error("Snapshot rejected: {0}")]
    Decode(DecodeError),

    /// A patch failed part way. Mutations applied before the failure were
    /// kept and notified; the state should be treated as desynchronized.
    #[error("Patch failed: {0}")]
    Patch(DecodeError),

    /// State was received before any type registry was available
    #[error("No type registry available. A handshake must be received first")]
    RegistryNotReady,

    /// Patches are refused until a full snapshot is received, either because
    /// none has been yet or because a re-handshake changed live types
    #[error("A full state snapshot is required before patches can be applied")]
    ResyncRequired,

    /// An observer path or field name does not resolve against the live state
    #[error("Path '{path}' does not resolve to a field of the current state")]
    PathNotFound { path: String },
}
