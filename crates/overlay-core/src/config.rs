//! Gate and store configuration.

/// Failure gate configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Report malformed producer events as
    /// [`crate::OverlayError::MalformedEvent`] instead of logging and
    /// forwarding them. Defaults to on in debug builds.
    pub strict_contract: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { strict_contract: cfg!(debug_assertions) }
    }
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Gate configuration
    pub gate: GateConfig,
    /// Maximum nesting of derived dispatches before the store gives up
    pub max_dispatch_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { gate: GateConfig::default(), max_dispatch_depth: 8 }
    }
}

impl StoreConfig {
    /// Configuration that never rejects malformed events.
    ///
    /// Matches production behaviour regardless of build profile.
    #[must_use]
    pub fn lenient() -> Self {
        Self { gate: GateConfig { strict_contract: false }, ..Self::default() }
    }

    /// Configuration that always rejects malformed events.
    #[must_use]
    pub fn strict() -> Self {
        Self { gate: GateConfig { strict_contract: true }, ..Self::default() }
    }
}
