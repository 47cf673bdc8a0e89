//! Encoding with self-verification and fallback.
//!
//! Embedding happens on an in-memory pixel buffer, but the bytes that leave
//! the engine only exist after the codec has re-encoded that buffer, possibly
//! lossily. An attempt therefore only counts once the engine has decoded its
//! own output and recovered the exact message. Attempts are driven by
//! [`EncodeState`]:
//!
//! ```text
//! AttemptingSimple --verified--> Succeeded
//!        |
//!        +--too large / unverified, fallback on--> AttemptingTripleFallback --verified--> Succeeded
//!        |                                                 |
//!        +--fallback off--> Failed <----------otherwise----+
//! ```

use crate::capacity::CapacityInfo;
use crate::codec::{Dimensions, ImageCodec, PreprocessOptions, DEFAULT_QUALITY};
use crate::engine::StegoEngine;
use crate::error::{ErrorKind, Result, StegoError};
use crate::header::{create_header, EncodingMethod, MAX_MESSAGE_LENGTH};
use crate::pixels::PixelData;
use crate::strategy::EncodingStrategy;
use log::{debug, info, warn};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EncodeOptions {
    /// Passed to the codec when producing the output image.
    pub quality: u8,
    pub enable_fallback: bool,
    pub preprocess: PreprocessOptions,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            enable_fallback: true,
            preprocess: PreprocessOptions::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttemptOutcome {
    Verified,
    InsufficientCapacity,
    VerificationFailed,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FailureReason {
    MessageTooLarge,
    EncodingMethodFailed,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EncodeState {
    AttemptingSimple,
    AttemptingTripleFallback { simple: AttemptOutcome },
    Succeeded {
        method: EncodingMethod,
        used_fallback: bool,
    },
    Failed(FailureReason),
}

impl EncodeState {
    /// The retry policy. Terminal states absorb any further outcome.
    pub fn next(self, outcome: AttemptOutcome, fallback_enabled: bool) -> EncodeState {
        use self::AttemptOutcome::*;
        use self::EncodeState::*;

        match (self, outcome) {
            (AttemptingSimple, Verified) => Succeeded {
                method: EncodingMethod::SimpleLsb,
                used_fallback: false,
            },
            (AttemptingSimple, failed) if fallback_enabled => {
                AttemptingTripleFallback { simple: failed }
            }
            (AttemptingSimple, InsufficientCapacity) => Failed(FailureReason::MessageTooLarge),
            (AttemptingSimple, VerificationFailed) => {
                Failed(FailureReason::EncodingMethodFailed)
            }
            (AttemptingTripleFallback { .. }, Verified) => Succeeded {
                method: EncodingMethod::TripleRedundancy,
                used_fallback: true,
            },
            (AttemptingTripleFallback { simple }, InsufficientCapacity)
                if simple == InsufficientCapacity =>
            {
                Failed(FailureReason::MessageTooLarge)
            }
            (AttemptingTripleFallback { .. }, _) => Failed(FailureReason::EncodingMethodFailed),
            (terminal, _) => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EncodeState::Succeeded { .. } | EncodeState::Failed(_))
    }

    fn attempted_method(&self) -> Option<EncodingMethod> {
        match self {
            EncodeState::AttemptingSimple => Some(EncodingMethod::SimpleLsb),
            EncodeState::AttemptingTripleFallback { .. } => Some(EncodingMethod::TripleRedundancy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AttemptRecord {
    pub method: EncodingMethod,
    pub outcome: AttemptOutcome,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EncodeOutcome {
    pub image_data: Vec<u8>,
    pub method: EncodingMethod,
    pub used_fallback: bool,
    pub capacity: CapacityInfo,
    pub dimensions: Dimensions,
    pub file_size: usize,
    pub attempts: Vec<AttemptRecord>,
}

struct Attempt {
    record: AttemptRecord,
    output: Option<Vec<u8>>,
}

impl<C: ImageCodec> StegoEngine<C> {
    pub fn encode_message(
        &self,
        image: &[u8],
        message: &[u8],
        options: &EncodeOptions,
    ) -> Result<EncodeOutcome> {
        if message.len() > MAX_MESSAGE_LENGTH as usize {
            return Err(StegoError::Input(format!(
                "message of {} bytes exceeds the {} byte limit",
                message.len(),
                MAX_MESSAGE_LENGTH
            )));
        }

        let standard = self
            .codec
            .preprocess_to_standard_format(image, &options.preprocess)?;
        let pixels = self.codec.decode_to_pixels(&standard)?;
        let dimensions = Dimensions {
            width: pixels.width(),
            height: pixels.height(),
        };
        let capacity = self
            .planner
            .calculate_capacity(i64::from(dimensions.width), i64::from(dimensions.height))?;

        info!(
            "encoding {} bytes into {}x{} image (simple capacity {}, redundant capacity {})",
            message.len(),
            dimensions.width,
            dimensions.height,
            capacity.simple_capacity,
            capacity.triple_capacity
        );

        let mut state = EncodeState::AttemptingSimple;
        let mut attempts = Vec::new();
        let mut produced = None;

        while let Some(method) = state.attempted_method() {
            let strategy = self.strategy_for(method)?;
            let attempt = self.attempt(strategy, &pixels, message, options.quality)?;

            let next = state.next(attempt.record.outcome, options.enable_fallback);
            debug!("{:?} --{:?}--> {:?}", state, attempt.record.outcome, next);

            attempts.push(attempt.record);
            if attempt.output.is_some() {
                produced = attempt.output;
            }
            state = next;
        }

        match state {
            EncodeState::Succeeded {
                method,
                used_fallback,
            } => {
                let image_data = produced.ok_or_else(|| {
                    StegoError::Consistency("verified attempt produced no output".to_string())
                })?;
                info!(
                    "encoded with {} (fallback: {}), output {} bytes",
                    method,
                    used_fallback,
                    image_data.len()
                );
                Ok(EncodeOutcome {
                    file_size: image_data.len(),
                    image_data,
                    method,
                    used_fallback,
                    capacity,
                    dimensions,
                    attempts,
                })
            }
            EncodeState::Failed(FailureReason::MessageTooLarge) => {
                Err(StegoError::MessageTooLarge {
                    length: message.len(),
                    capacity: capacity.simple_capacity,
                })
            }
            _ => {
                let last = attempts
                    .iter()
                    .rev()
                    .find(|a| a.outcome == AttemptOutcome::VerificationFailed);
                Err(StegoError::EncodingMethodFailed {
                    method: last
                        .map(|a| a.method)
                        .unwrap_or(EncodingMethod::SimpleLsb),
                    reason: last
                        .and_then(|a| a.detail.clone())
                        .unwrap_or_else(|| "output did not survive re-encoding".to_string()),
                })
            }
        }
    }

    fn strategy_for(&self, method: EncodingMethod) -> Result<&EncodingStrategy> {
        self.strategies
            .iter()
            .find(|s| s.method() == method)
            .ok_or_else(|| StegoError::Consistency(format!("no strategy registered for {}", method)))
    }

    fn attempt(
        &self,
        strategy: &EncodingStrategy,
        pixels: &PixelData,
        message: &[u8],
        quality: u8,
    ) -> Result<Attempt> {
        let method = strategy.method();
        let skipped = |detail: String| Attempt {
            record: AttemptRecord {
                method,
                outcome: AttemptOutcome::InsufficientCapacity,
                detail: Some(detail),
            },
            output: None,
        };

        if !strategy.can_encode(pixels, message.len()) {
            info!("{}: message of {} bytes does not fit, skipping", method, message.len());
            return Ok(skipped(format!(
                "{} bytes exceed {} capacity",
                message.len(),
                method
            )));
        }

        let header = create_header(message.len(), method, Some(message))?;
        let stego = match strategy.encode(pixels, message, &header) {
            Ok(stego) => stego,
            Err(err) if err.kind() == ErrorKind::Capacity => return Ok(skipped(err.to_string())),
            Err(err) => return Err(err),
        };
        let output = self.codec.encode_from_pixels(&stego, quality)?;

        match self.verify(&output, message) {
            Ok(()) => Ok(Attempt {
                record: AttemptRecord {
                    method,
                    outcome: AttemptOutcome::Verified,
                    detail: None,
                },
                output: Some(output),
            }),
            Err(err) => {
                warn!("{}: self-verification failed: {}", method, err);
                Ok(Attempt {
                    record: AttemptRecord {
                        method,
                        outcome: AttemptOutcome::VerificationFailed,
                        detail: Some(err.to_string()),
                    },
                    output: None,
                })
            }
        }
    }

    /// Decodes the bytes that would actually be transmitted and checks the
    /// message survived unchanged.
    fn verify(&self, output: &[u8], message: &[u8]) -> Result<()> {
        let pixels = self.codec.decode_to_pixels(output)?;
        let decoded = self.decode_pixels(&pixels)?;
        if decoded.message != message {
            return Err(StegoError::Validation(vec![format!(
                "recovered {} bytes differ from the original {}",
                decoded.message.len(),
                message.len()
            )]));
        }
        Ok(())
    }
}
