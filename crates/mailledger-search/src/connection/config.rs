//! Connection configuration types.

/// Default maximum length of one response line.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024; // 1 MB

/// Default maximum size of one literal.
pub const DEFAULT_MAX_LITERAL_SIZE: usize = 100 * 1024 * 1024; // 100 MB

/// Search client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// First character of every command tag.
    pub tag_prefix: char,
    /// Longest response line accepted before the connection is dropped.
    pub max_line_length: usize,
    /// Largest literal accepted before the connection is dropped.
    pub max_literal_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag_prefix: 'A',
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_literal_size: DEFAULT_MAX_LITERAL_SIZE,
        }
    }
}

impl Config {
    /// Creates a configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for client configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tag prefix.
    #[must_use]
    pub const fn tag_prefix(mut self, prefix: char) -> Self {
        self.config.tag_prefix = prefix;
        self
    }

    /// Sets the maximum response line length.
    #[must_use]
    pub const fn max_line_length(mut self, len: usize) -> Self {
        self.config.max_line_length = len;
        self
    }

    /// Sets the maximum literal size.
    #[must_use]
    pub const fn max_literal_size(mut self, size: usize) -> Self {
        self.config.max_literal_size = size;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}
