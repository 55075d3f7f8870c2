use std::num::{NonZeroU32, NonZeroU8};

use xxhash_rust::xxh64::xxh64;

const SEED: u64 = 0;

/// Iterator over the bucket indexes probed for a single item.
///
/// A single 64 bit xxh64 digest is split into two 32 bit halves `h1` and `h2`,
/// the i-th probe is `(h1 + i * h2) % buckets`. Computed incrementally so each
/// step is an add and a remainder.
#[derive(Debug, Clone)]
pub(crate) struct Probes {
    next: u64,
    step: u64,
    buckets: u64,
    remaining: u8,
}

impl Probes {
    #[inline]
    pub(crate) fn new(bytes: &[u8], buckets: NonZeroU32, hashes: NonZeroU8) -> Self {
        let hash = xxh64(bytes, SEED);
        let buckets = buckets.get() as u64;
        Probes {
            next: (hash >> 32) % buckets,
            step: hash & 0xffff_ffff,
            buckets,
            remaining: hashes.get(),
        }
    }
}

impl Iterator for Probes {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.remaining = self.remaining.checked_sub(1)?;
        let current = self.next;
        // both operands are < 2^32, the sum can't overflow
        self.next = (current + self.step) % self.buckets;
        Some(current as usize)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for Probes {}
