use roadside_core::CoordinatePolicy;
use serde::{Deserialize, Serialize};

/// Default number of match-and-claim rounds before a request is left open.
pub const DEFAULT_CLAIM_ATTEMPTS: u32 = 3;

/// Configuration for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// How out-of-range reporter coordinates are handled.
    pub coordinate_policy: CoordinatePolicy,
    /// Match-and-claim rounds per dispatch. A round fails when the chosen
    /// mechanic is claimed by someone else first.
    pub claim_attempts: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            coordinate_policy: CoordinatePolicy::Reject,
            claim_attempts: DEFAULT_CLAIM_ATTEMPTS,
        }
    }
}

impl DispatchConfig {
    /// Create a new dispatch configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the coordinate policy.
    pub fn with_coordinate_policy(mut self, policy: CoordinatePolicy) -> Self {
        self.coordinate_policy = policy;
        self
    }

    /// Set the number of claim attempts. At least one attempt is always made.
    pub fn with_claim_attempts(mut self, attempts: u32) -> Self {
        self.claim_attempts = attempts.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DispatchConfig::new();
        assert_eq!(config.coordinate_policy, CoordinatePolicy::Reject);
        assert_eq!(config.claim_attempts, 3);
    }

    #[test]
    fn builder_clamps_attempts() {
        let config = DispatchConfig::new()
            .with_coordinate_policy(CoordinatePolicy::Clamp)
            .with_claim_attempts(0);
        assert_eq!(config.coordinate_policy, CoordinatePolicy::Clamp);
        assert_eq!(config.claim_attempts, 1);
    }
}
