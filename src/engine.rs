use crate::capacity::{CapacityInfo, CapacityPlanner, DEFAULT_SAFETY_MARGIN};
use crate::codec::{Dimensions, ImageCodec, PreprocessOptions};
use crate::error::{Result, StegoError};
use crate::strategy::{EncodingStrategy, MIN_REDUNDANCY_FACTOR};
use crate::DEFAULT_REDUNDANCY_FACTOR;

/// Settings that shape the embedded layout. Encoder and decoder must agree on
/// them, so they are fixed for the lifetime of an engine.
///
/// Even redundancy factors are accepted; a tied vote decodes to 0.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EngineConfig {
    pub redundancy_factor: usize,
    pub safety_margin: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            redundancy_factor: DEFAULT_REDUNDANCY_FACTOR,
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.redundancy_factor < MIN_REDUNDANCY_FACTOR {
            return Err(StegoError::Input(format!(
                "redundancy factor must be at least {}, got {}",
                MIN_REDUNDANCY_FACTOR, self.redundancy_factor
            )));
        }
        if !(self.safety_margin > 0.0 && self.safety_margin <= 1.0) {
            return Err(StegoError::Input(format!(
                "safety margin must be in (0, 1], got {}",
                self.safety_margin
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CapacityCheck {
    pub can_fit: bool,
    pub capacity: CapacityInfo,
}

pub struct StegoEngine<C> {
    pub(crate) codec: C,
    pub(crate) planner: CapacityPlanner,
    /// Consulted in order, cheapest first, on both encode and decode.
    pub(crate) strategies: Vec<EncodingStrategy>,
}

impl<C: ImageCodec> StegoEngine<C> {
    pub fn new(codec: C) -> Self {
        Self::build(codec, EngineConfig::default())
    }

    pub fn with_config(codec: C, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(codec, config))
    }

    fn build(codec: C, config: EngineConfig) -> Self {
        let planner = CapacityPlanner::new()
            .with_safety_margin(config.safety_margin)
            .with_redundancy_factor(config.redundancy_factor);

        let strategies = vec![
            EncodingStrategy::simple().with_planner(planner),
            EncodingStrategy::triple_redundancy(config.redundancy_factor).with_planner(planner),
        ];

        Self {
            codec,
            planner,
            strategies,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn strategies(&self) -> &[EncodingStrategy] {
        &self.strategies
    }

    /// Whether `message_length` bytes fit in `image` with the least redundant
    /// method. Reads only the dimensions of `image` as given; when encoding
    /// will downscale, use [`check_capacity_with`](Self::check_capacity_with).
    pub fn check_capacity(&self, image: &[u8], message_length: usize) -> Result<CapacityCheck> {
        let dimensions = self.codec.get_dimensions(image)?;
        self.capacity_check(dimensions, message_length)
    }

    /// Like [`check_capacity`](Self::check_capacity), but measured on the image
    /// `encode_message` would embed into after `preprocess`.
    pub fn check_capacity_with(
        &self,
        image: &[u8],
        message_length: usize,
        preprocess: &PreprocessOptions,
    ) -> Result<CapacityCheck> {
        let standard = self.codec.preprocess_to_standard_format(image, preprocess)?;
        let dimensions = self.codec.get_dimensions(&standard)?;
        self.capacity_check(dimensions, message_length)
    }

    fn capacity_check(&self, dimensions: Dimensions, message_length: usize) -> Result<CapacityCheck> {
        let capacity = self
            .planner
            .calculate_capacity(i64::from(dimensions.width), i64::from(dimensions.height))?;

        Ok(CapacityCheck {
            can_fit: message_length <= capacity.simple_capacity,
            capacity,
        })
    }
}
