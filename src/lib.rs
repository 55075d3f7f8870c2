//! Space efficient probabilistic set membership ([Bloom filter](https://en.wikipedia.org/wiki/Bloom_filter))
//! with a stable, self-describing binary format.
//!
//! Items are arbitrary byte sequences. Once inserted an item is always reported as present,
//! items never inserted are reported as present with a (tunable) false positive probability.
//! Items can't be removed.
//!
//! ### Example
//!
//! ```rust
//! let mut f = bitfilter::Filter::new(100, 4).unwrap();
//! f.insert("foo");
//! f.insert(b"bar");
//! assert!(f.contains("foo"));
//! assert!(f.contains("bar"));
//!
//! let f = bitfilter::Filter::from_bytes(&f.to_bytes()).unwrap();
//! assert!(f.contains(bitfilter::Item::slice(b"xxxfooxxx", 3..6)));
//! ```
//!
//! ### Hasher
//!
//! Bucket positions are derived from a single [xxhash64](https://crates.io/crates/xxhash-rust)
//! digest (seed 0) using double hashing: the high and low 32 bit halves `h1` and `h2`
//! produce the probes `(h1 + i * h2) % buckets` for `i` in `0..hashes`.
//! The digest is stable across platforms, so serialized filters can be shared between machines.
//!
//! ### Binary format
//!
//! | offset | size | field |
//! |:---:|:---:|---|
//! | 0 | 4 | bucket count, `u32` little endian |
//! | 4 | 1 | hash count, `u8` |
//! | 5 | ceil(buckets / 8) | bucket bits, bucket `i` is bit `0x80 >> (i % 8)` of byte `i / 8` |
//!
//! ### Filter size
//!
//! [`Filter::with_rate`] picks the bucket and hash counts that minimize the false positive
//! rate for an expected number of items.
//!
//! | Bits per item | Hashes | Error probability when full |
//! |:---:|:---:|:---:|
//! | 4.8 | 3 | 0.1 |
//! | 9.6 | 7 | 0.01 |
//! | 14.4 | 10 | 0.001 |
//! | 19.2 | 13 | 0.0001 |
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use std::num::{NonZeroU32, NonZeroU8};

#[cfg(feature = "jsonschema")]
use schemars::JsonSchema;
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use probes::Probes;

pub use item::Item;

mod item;
mod probes;

const HEADER_LEN: usize = 4 + 1;

/// Bloom filter over byte sequences, backed by a fixed size bit array.
///
/// The filter is sized at construction time with an explicit number of buckets (bits)
/// and hashes (probed buckets per item) and never grows.
#[derive(Clone, PartialEq, Eq)]
pub struct Filter {
    buffer: Box<[u8]>,
    buckets: NonZeroU32,
    hashes: NonZeroU8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Bucket or hash count is zero or too large
    InvalidSize,
    /// The buffer is too short or its header is invalid
    MalformedBuffer,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for Error {}

trait BitExt {
    fn is_bit_set(&self, i: usize) -> bool;
    fn set_bit(&mut self, i: usize);
    /// Number of set bits (1s) among the first `bits` bits
    fn popcnt(&self, bits: usize) -> u64;
}

/// Bits are numbered from the most significant bit of the first byte.
impl BitExt for [u8] {
    #[inline]
    fn is_bit_set(&self, i: usize) -> bool {
        (self[i / 8] & (0x80 >> (i % 8))) != 0
    }

    #[inline]
    fn set_bit(&mut self, i: usize) {
        self[i / 8] |= 0x80 >> (i % 8)
    }

    fn popcnt(&self, bits: usize) -> u64 {
        let full = &self[..bits / 8];
        let mut result = full.iter().map(|b| b.count_ones() as u64).sum::<u64>();
        if bits % 8 != 0 {
            // ignore the padding (low order) bits of the last byte
            let mask = !(0xffu8 >> (bits % 8));
            result += (self[bits / 8] & mask).count_ones() as u64;
        }
        result
    }
}

#[inline]
fn buffer_len(buckets: NonZeroU32) -> usize {
    (buckets.get() as usize).div_ceil(8)
}

impl Filter {
    /// Creates a new empty filter with `buckets` bits probing `hashes` bits per item.
    ///
    /// Errors with [`Error::InvalidSize`] if either argument is zero.
    pub fn new(buckets: u32, hashes: u8) -> Result<Self, Error> {
        let (Some(buckets), Some(hashes)) = (NonZeroU32::new(buckets), NonZeroU8::new(hashes))
        else {
            tracing::debug!(buckets, hashes, "rejected empty filter size");
            return Err(Error::InvalidSize);
        };
        Ok(Self::with_sizes(buckets, hashes))
    }

    /// Creates a new filter sized to hold `capacity` items with a desired
    /// error rate of `fp_rate` (clamped to (0, 0.5]).
    ///
    /// Errors with [`Error::InvalidSize`] if the required number of buckets doesn't fit in a `u32`.
    pub fn with_rate(capacity: u64, fp_rate: f64) -> Result<Self, Error> {
        let fp_rate = fp_rate.clamp(f64::MIN_POSITIVE, 0.5);
        let n = capacity.max(1) as f64;
        let ln2 = std::f64::consts::LN_2;
        let buckets = (-n * fp_rate.ln() / (ln2 * ln2)).ceil().max(1.0);
        if buckets > u32::MAX as f64 {
            tracing::debug!(capacity, fp_rate, buckets, "filter too large");
            return Err(Error::InvalidSize);
        }
        let hashes = (buckets / n * ln2).round().clamp(1.0, u8::MAX as f64);
        Self::new(buckets as u32, hashes as u8)
    }

    fn with_sizes(buckets: NonZeroU32, hashes: NonZeroU8) -> Self {
        let buffer = vec![0u8; buffer_len(buckets)].into_boxed_slice();
        Self {
            buffer,
            buckets,
            hashes,
        }
    }

    /// Number of buckets (bits) in the filter.
    #[inline]
    pub fn bucket_count(&self) -> u32 {
        self.buckets.get()
    }

    /// Number of buckets probed per item.
    #[inline]
    pub fn hash_count(&self) -> u8 {
        self.hashes.get()
    }

    /// Number of buckets currently set.
    pub fn count_ones(&self) -> u64 {
        self.buffer.popcnt(self.buckets.get() as usize)
    }

    /// Whether no bucket is set, in which case [`Filter::contains`] is `false` for every item.
    pub fn is_empty(&self) -> bool {
        self.count_ones() == 0
    }

    /// Current error ratio, the probability that an item never inserted is reported as present.
    pub fn current_error_ratio(&self) -> f64 {
        let fill = self.count_ones() as f64 / self.buckets.get() as f64;
        fill.powi(self.hashes.get() as i32)
    }

    /// Inserts `item` in the filter. Inserting the same item more than once has no effect.
    ///
    /// Strings are inserted as their UTF-8 bytes.
    #[doc(alias = "add")]
    pub fn insert<'a>(&mut self, item: impl Into<Item<'a>>) {
        for i in self.probes(item.into()) {
            self.buffer.set_bit(i);
        }
    }

    /// Returns whether item is present (probabilistically) in the filter.
    #[doc(alias = "test")]
    pub fn contains<'a>(&self, item: impl Into<Item<'a>>) -> bool {
        self.probes(item.into()).all(|i| self.buffer.is_bit_set(i))
    }

    #[inline]
    fn probes(&self, item: Item<'_>) -> Probes {
        Probes::new(item.as_bytes(), self.buckets, self.hashes)
    }

    /// Serializes the filter, see the [crate level docs](crate#binary-format) for the format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(HEADER_LEN + self.buffer.len());
        result.extend_from_slice(&self.buckets.get().to_le_bytes());
        result.push(self.hashes.get());
        result.extend_from_slice(&self.buffer);
        result
    }

    /// Deserializes a filter previously serialized with [`Filter::to_bytes`].
    ///
    /// Bytes past the end of the bucket bits are ignored.
    /// Errors with [`Error::MalformedBuffer`] if `buf` is truncated or declares zero buckets or hashes.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, Error> {
        let Some((header, bits)) = buf.split_first_chunk::<HEADER_LEN>() else {
            tracing::debug!(len = buf.len(), "buffer shorter than filter header");
            return Err(Error::MalformedBuffer);
        };
        let [b0, b1, b2, b3, hashes] = *header;
        let buckets = u32::from_le_bytes([b0, b1, b2, b3]);
        let (Some(buckets), Some(hashes)) = (NonZeroU32::new(buckets), NonZeroU8::new(hashes))
        else {
            tracing::debug!(buckets, hashes, "filter header with empty size");
            return Err(Error::MalformedBuffer);
        };
        let expected = buffer_len(buckets);
        if bits.len() < expected {
            tracing::debug!(
                buckets = buckets.get(),
                expected,
                actual = bits.len(),
                "truncated filter buffer"
            );
            return Err(Error::MalformedBuffer);
        }
        if bits.len() > expected {
            tracing::debug!(
                trailing = bits.len() - expected,
                "ignoring trailing bytes after filter"
            );
        }
        Ok(Self {
            buffer: bits[..expected].into(),
            buckets,
            hashes,
        })
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("buffer", &"[..]")
            .field("buckets", &self.buckets)
            .field("hashes", &self.hashes)
            .finish()
    }
}

#[cfg(feature = "serde")]
impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_bytes::serialize(&self.to_bytes(), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let buf: serde_bytes::ByteBuf = serde_bytes::deserialize(deserializer)?;
        Filter::from_bytes(&buf).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "jsonschema")]
impl JsonSchema for Filter {
    fn schema_name() -> String {
        "Filter".to_owned()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <Vec<u8>>::json_schema(gen)
    }
}
