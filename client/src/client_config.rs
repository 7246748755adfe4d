use std::default::Default;

use statesync_shared::DecodeConfig;

/// Contains Config properties which will be used by the Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Limits shared by the snapshot decoder and the patch engine
    pub decode: DecodeConfig,
    /// Whether a full snapshot notifies observers of every field whose value
    /// differs from the state it replaced
    pub notify_on_set_state: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            decode: DecodeConfig::default(),
            notify_on_set_state: true,
        }
    }
}
