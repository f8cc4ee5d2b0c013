use crate::Error;


/// Runtime settings of a [`crate::DiceEngine`].
///
/// Construct one with [`EngineConfig::builder()`] or take the defaults. With
/// the `serde` feature the struct can be loaded from a host configuration file;
/// [`crate::DiceEngine::new()`] validates it either way.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    history_capacity: usize,
    record_invalid: bool,
    suggestion_limit: usize,
}

impl EngineConfig {
    /// Default number of records kept in history.
    pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

    /// Default number of suggestions returned.
    pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

    /// Starts an [`EngineConfigBuilder`] from the defaults.
    ///
    /// # Examples
    /// ```
    /// use dicebox::EngineConfig;
    ///
    /// let config = EngineConfig::builder()
    ///     .history_capacity(50)
    ///     .record_invalid(true)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(config.history_capacity(), 50);
    /// assert!(EngineConfig::builder().history_capacity(0).build().is_err());
    /// ```
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder { config: Self::default() }
    }

    /// Maximum number of records kept in history.
    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    /// Whether rejected expressions are stored in history.
    pub fn record_invalid(&self) -> bool {
        self.record_invalid
    }

    /// Maximum number of suggestions returned.
    pub fn suggestion_limit(&self) -> usize {
        self.suggestion_limit
    }

    /// Checks the settings are usable.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] when a capacity or limit is zero.
    pub fn validate(self) -> Result<Self, Error> {
        if self.history_capacity == 0 {
            return Err(Error::InvalidConfig("history_capacity must be at least 1".into()));
        }

        if self.suggestion_limit == 0 {
            return Err(Error::InvalidConfig("suggestion_limit must be at least 1".into()));
        }

        Ok(self)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: Self::DEFAULT_HISTORY_CAPACITY,
            record_invalid: false,
            suggestion_limit: Self::DEFAULT_SUGGESTION_LIMIT,
        }
    }
}


/// Fluent builder for [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Sets how many records history keeps before evicting the oldest.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Sets whether rejected expressions are stored in history.
    pub fn record_invalid(mut self, record: bool) -> Self {
        self.config.record_invalid = record;
        self
    }

    /// Sets how many suggestions are returned.
    pub fn suggestion_limit(mut self, limit: usize) -> Self {
        self.config.suggestion_limit = limit;
        self
    }

    /// Finalizes the configuration.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] when a capacity or limit is zero.
    pub fn build(self) -> Result<EngineConfig, Error> {
        self.config.validate()
    }
}


#[cfg(test)]
mod test {
    use super::*;


    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.history_capacity(), 1000);
        assert!(!config.record_invalid());
        assert_eq!(config.suggestion_limit(), 10);
        assert_eq!(config.clone().validate(), Ok(config));
    }

    #[test]
    fn test_rejects_zero_limits() {
        assert!(matches!(
            EngineConfig::builder().history_capacity(0).build(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::builder().suggestion_limit(0).build(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "history_capacity": 25 }"#).unwrap();

        assert_eq!(config.history_capacity(), 25);
        assert_eq!(config.suggestion_limit(), 10);
        assert!(!config.record_invalid());
    }
}
