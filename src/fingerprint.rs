//! Canonical cache-key encoding.
//!
//! Every filter configuration is written as its identifier followed by each
//! field in a fixed order and fixed width, big-endian. The resulting bytes
//! are the disk-cache fingerprint handed to the host, and equality and
//! hashing of configurations are defined over the same bytes so the three
//! can never disagree.

/// Appends fixed-width, big-endian fields to a fingerprint.
#[derive(Debug, Clone)]
pub struct KeyEncoder {
    buf: Vec<u8>,
}

impl KeyEncoder {
    /// Start a fingerprint with the filter identifier.
    pub fn new(id: &str) -> Self {
        let mut buf = Vec::with_capacity(id.len() + 32);
        buf.extend_from_slice(id.as_bytes());
        Self { buf }
    }

    /// Floats are written by bit pattern; `-0.0` folds into `0.0` and every
    /// NaN into the canonical quiet NaN.
    pub fn f32(&mut self, v: f32) -> &mut Self {
        let bits = if v.is_nan() {
            0x7fc0_0000
        } else if v == 0.0 {
            0
        } else {
            v.to_bits()
        };
        self.buf.extend_from_slice(&bits.to_be_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn flag(&mut self, v: bool) -> &mut Self {
        self.u8(v as u8)
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// A configuration that can be turned into a stable cache key.
pub trait CacheKey {
    /// Filter identifier, unique per filter type.
    const ID: &'static str;

    /// Write every configuration field, in declaration order.
    fn encode_fields(&self, enc: &mut KeyEncoder);

    /// Identifier followed by the encoded fields.
    fn fingerprint(&self) -> Vec<u8> {
        let mut enc = KeyEncoder::new(Self::ID);
        self.encode_fields(&mut enc);
        enc.finish()
    }
}

/// Implements `PartialEq`, `Eq` and `Hash` over [`CacheKey::fingerprint`].
macro_rules! fingerprint_identity {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::fingerprint::CacheKey::fingerprint(self)
                    == $crate::fingerprint::CacheKey::fingerprint(other)
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&$crate::fingerprint::CacheKey::fingerprint(self), state);
            }
        }
    };
}

pub(crate) use fingerprint_identity;
