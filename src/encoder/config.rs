//! Intra decision configuration.

/// Settings for the intra decision core.
///
/// Every field is public; the `with_*` builder methods clamp their input to
/// the documented range.
///
/// ```
/// use zenvp8::encoder::IntraConfig;
///
/// let config = IntraConfig::new()
///     .with_method(6)
///     .with_filter_strength(40)
///     .with_error_diffusion(false);
/// assert_eq!(config.method, 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IntraConfig {
    /// Quality/speed tradeoff (0 = fast, 6 = slower but better). Default: 4.
    ///
    /// The 4x4 search runs from method 2; spectral distortion is scored
    /// from method 4.
    pub method: u8,
    /// Spatial noise shaping strength (0-100), weighting spectral distortion.
    /// Default: 50.
    pub sns_strength: u8,
    /// Loop filter strength (0-100). Default: 60.
    pub filter_strength: u8,
    /// Loop filter sharpness (0-7). Default: 0.
    pub filter_sharpness: u8,
    /// Probe the simple loop filter instead of the normal one. Default: false.
    pub simple_filter: bool,
    /// Diffuse chroma DC quantization error between sub-blocks. Default: true.
    pub error_diffusion: bool,
    /// Limit on 4x4 header bits (0 = no limit, 100 = forbid 4x4). Default: 0.
    pub partition_limit: u8,
    /// Collect per-strength SSIM statistics. Default: true.
    pub filter_stats: bool,
}

impl Default for IntraConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl IntraConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: 4,
            sns_strength: 50,
            filter_strength: 60,
            filter_sharpness: 0,
            simple_filter: false,
            error_diffusion: true,
            partition_limit: 0,
            filter_stats: true,
        }
    }

    /// Set quality/speed tradeoff (0 = fast, 6 = slower but better).
    #[must_use]
    pub fn with_method(mut self, method: u8) -> Self {
        self.method = method.min(6);
        self
    }

    /// Set spatial noise shaping strength (0-100).
    #[must_use]
    pub fn with_sns_strength(mut self, strength: u8) -> Self {
        self.sns_strength = strength.min(100);
        self
    }

    /// Set loop filter strength (0-100).
    /// Higher values produce smoother output.
    #[must_use]
    pub fn with_filter_strength(mut self, strength: u8) -> Self {
        self.filter_strength = strength.min(100);
        self
    }

    /// Set loop filter sharpness (0-7).
    #[must_use]
    pub fn with_filter_sharpness(mut self, sharpness: u8) -> Self {
        self.filter_sharpness = sharpness.min(7);
        self
    }

    /// Probe the simple loop filter.
    #[must_use]
    pub fn with_simple_filter(mut self, enable: bool) -> Self {
        self.simple_filter = enable;
        self
    }

    /// Enable or disable chroma DC error diffusion.
    #[must_use]
    pub fn with_error_diffusion(mut self, enable: bool) -> Self {
        self.error_diffusion = enable;
        self
    }

    /// Set the 4x4 header-bit limit (0-100).
    #[must_use]
    pub fn with_partition_limit(mut self, limit: u8) -> Self {
        self.partition_limit = limit.min(100);
        self
    }

    /// Enable or disable deblocking-strength statistics.
    #[must_use]
    pub fn with_filter_stats(mut self, enable: bool) -> Self {
        self.filter_stats = enable;
        self
    }

    /// Whether the 4x4 luma search runs at all.
    #[inline]
    pub(crate) fn search_i4(&self) -> bool {
        self.method >= 2
    }

    /// Whether spectral distortion contributes to scores.
    #[inline]
    pub(crate) fn use_tdisto(&self) -> bool {
        self.method >= 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps() {
        let c = IntraConfig::new()
            .with_method(9)
            .with_sns_strength(200)
            .with_filter_strength(101)
            .with_filter_sharpness(12)
            .with_partition_limit(255);
        assert_eq!(c.method, 6);
        assert_eq!(c.sns_strength, 100);
        assert_eq!(c.filter_strength, 100);
        assert_eq!(c.filter_sharpness, 7);
        assert_eq!(c.partition_limit, 100);
    }

    #[test]
    fn method_gates() {
        let fast = IntraConfig::new().with_method(1);
        assert!(!fast.search_i4());
        assert!(!fast.use_tdisto());
        let mid = IntraConfig::new().with_method(3);
        assert!(mid.search_i4());
        assert!(!mid.use_tdisto());
        assert!(IntraConfig::default().use_tdisto());
    }
}
