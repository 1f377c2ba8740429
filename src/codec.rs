//! # Value Codecs
//!
//! Pure conversion between wire values and application types.
//!
//! Every channel carries values in a wire representation chosen by the
//! control-system server (a scalar or fixed-size array of a primitive
//! type). A [`Codec`] is the forward/reverse conversion pair between that
//! wire representation and the type the application wants to work with.
//! Codecs are stateless, perform no I/O, and fail only on values outside
//! their legal domain.
//!
//! ## Round-Trip Domain
//!
//! `decode(encode(t)) == t` holds for every `t` in the codec's supported
//! value domain. The reverse direction is deliberately weaker: a codec may
//! map many wire values onto one application value. [`BoolCodec`] decodes
//! any wire integer `> 0` as `true` but always encodes `true` back to `1`,
//! so `encode(decode(2)) == 1 != 2`. This asymmetry mirrors the server
//! convention (any non-zero means "set") and is intentional.
//!
//! ## Provided Codecs
//!
//! | Codec | Wire | Application | Notes |
//! |-------|------|-------------|-------|
//! | [`BoolCodec`] | `i32` | `bool` | `> 0` is `true`; encodes to `{0, 1}` |
//! | [`BoolArrayCodec`] | `Vec<i32>` | `Vec<bool>` | optional fixed element count |
//! | [`ByteStringCodec`] | `bytes::Bytes` | `String` | fixed-capacity, NUL-padded |
//! | [`IdentityCodec`] | `T` | `T` | wire type exposed unchanged |
//! | [`LinearCodec`] | `f64` | `f64` | affine engineering-unit scaling |

use bytes::Bytes;

use crate::error::ConversionError;

/// Forward/reverse conversion between a wire value and an application type.
///
/// Implementations must be pure: no I/O, no interior state, and total over
/// the legal value domain of [`Codec::Raw`] / [`Codec::Value`]. Malformed
/// input (wrong element count, over-capacity string) is a contract
/// violation signaled as [`ConversionError`], never coerced.
pub trait Codec: Send + Sync + 'static {
    /// The wire representation delivered by the transport.
    type Raw: Clone + PartialEq + Send + Sync + 'static;
    /// The application type exposed by the binding.
    type Value: Clone + Send + Sync + 'static;

    /// Convert a wire value into the application type.
    fn decode(&self, raw: &Self::Raw) -> Result<Self::Value, ConversionError>;

    /// Convert an application value into its wire representation.
    fn encode(&self, value: &Self::Value) -> Result<Self::Raw, ConversionError>;
}

// ============================================================================
// BOOLEAN
// ============================================================================

/// Boolean channel over an integer wire value.
///
/// Decodes any wire value `> 0` as `true` and anything else as `false`;
/// encodes `true -> 1`, `false -> 0`. Round-trip holds exactly for the
/// wire domain `{0, 1}` — see the module docs for why `encode(decode(2))`
/// is `1`, not `2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCodec;

impl Codec for BoolCodec {
    type Raw = i32;
    type Value = bool;

    fn decode(&self, raw: &i32) -> Result<bool, ConversionError> {
        Ok(*raw > 0)
    }

    fn encode(&self, value: &bool) -> Result<i32, ConversionError> {
        Ok(if *value { 1 } else { 0 })
    }
}

/// Boolean array channel over an integer-array wire value.
///
/// Element conversion follows [`BoolCodec`]. When constructed with a fixed
/// element count, values of any other length are rejected in both
/// directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolArrayCodec {
    expected: Option<usize>,
}

impl BoolArrayCodec {
    /// Codec accepting arrays of any length.
    pub fn new() -> Self {
        Self { expected: None }
    }

    /// Codec for a channel with a fixed element count.
    pub fn with_len(expected: usize) -> Self {
        Self {
            expected: Some(expected),
        }
    }

    fn check_len(&self, len: usize) -> Result<(), ConversionError> {
        match self.expected {
            Some(expected) if len != expected => Err(ConversionError::new(format!(
                "expected {expected} elements, got {len}"
            ))),
            _ => Ok(()),
        }
    }
}

impl Codec for BoolArrayCodec {
    type Raw = Vec<i32>;
    type Value = Vec<bool>;

    fn decode(&self, raw: &Vec<i32>) -> Result<Vec<bool>, ConversionError> {
        self.check_len(raw.len())?;
        Ok(raw.iter().map(|v| *v > 0).collect())
    }

    fn encode(&self, value: &Vec<bool>) -> Result<Vec<i32>, ConversionError> {
        self.check_len(value.len())?;
        Ok(value.iter().map(|b| i32::from(*b)).collect())
    }
}

// ============================================================================
// BYTE-ARRAY STRING
// ============================================================================

/// String channel over a fixed-capacity, NUL-padded byte array.
///
/// Control-system servers expose strings longer than the native string
/// record as character waveforms: a byte array of fixed capacity, padded
/// with NUL bytes. Decoding stops at the first NUL; encoding pads the
/// UTF-8 bytes up to the capacity.
///
/// Round-trip holds for strings whose UTF-8 length fits the capacity and
/// that contain no interior NUL (an interior NUL is truncated on decode,
/// matching the server convention).
#[derive(Debug, Clone, Copy)]
pub struct ByteStringCodec {
    capacity: usize,
}

impl ByteStringCodec {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// The wire capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Codec for ByteStringCodec {
    type Raw = Bytes;
    type Value = String;

    fn decode(&self, raw: &Bytes) -> Result<String, ConversionError> {
        if raw.len() > self.capacity {
            return Err(ConversionError::new(format!(
                "byte array of {} exceeds channel capacity {}",
                raw.len(),
                self.capacity
            )));
        }
        let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
        std::str::from_utf8(&raw[..end])
            .map(str::to_owned)
            .map_err(|e| ConversionError::new(format!("byte array is not valid UTF-8: {e}")))
    }

    fn encode(&self, value: &String) -> Result<Bytes, ConversionError> {
        let bytes = value.as_bytes();
        if bytes.len() > self.capacity {
            return Err(ConversionError::new(format!(
                "string of {} bytes exceeds channel capacity {}",
                bytes.len(),
                self.capacity
            )));
        }
        let mut buf = Vec::with_capacity(self.capacity);
        buf.extend_from_slice(bytes);
        buf.resize(self.capacity, 0);
        Ok(Bytes::from(buf))
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

/// Codec for channels whose wire type is exposed unchanged (`i32`, `f64`,
/// `Vec<f64>`, …).
#[derive(Debug, Clone, Copy)]
pub struct IdentityCodec<T> {
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> IdentityCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T> Default for IdentityCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec for IdentityCodec<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    type Raw = T;
    type Value = T;

    fn decode(&self, raw: &T) -> Result<T, ConversionError> {
        Ok(raw.clone())
    }

    fn encode(&self, value: &T) -> Result<T, ConversionError> {
        Ok(value.clone())
    }
}

// ============================================================================
// LINEAR SCALING
// ============================================================================

/// Affine engineering-unit scaling for floating-point channels.
///
/// `decode(raw) = raw * gain + offset`; `encode` inverts. A zero gain has
/// no inverse, so encoding under it is a [`ConversionError`].
///
/// Round-trip is subject to floating-point rounding; callers needing exact
/// equality should compare in wire representation (as `wait_for_value`
/// does).
#[derive(Debug, Clone, Copy)]
pub struct LinearCodec {
    gain: f64,
    offset: f64,
}

impl LinearCodec {
    pub fn new(gain: f64, offset: f64) -> Self {
        Self { gain, offset }
    }
}

impl Codec for LinearCodec {
    type Raw = f64;
    type Value = f64;

    fn decode(&self, raw: &f64) -> Result<f64, ConversionError> {
        Ok(raw * self.gain + self.offset)
    }

    fn encode(&self, value: &f64) -> Result<f64, ConversionError> {
        if self.gain == 0.0 {
            return Err(ConversionError::new(
                "cannot encode through a zero-gain scaling",
            ));
        }
        Ok((value - self.offset) / self.gain)
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
