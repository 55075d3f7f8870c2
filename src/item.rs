use std::ops::{Bound, RangeBounds};

/// An item to be inserted into or looked up in a [`Filter`](crate::Filter).
///
/// Items are always plain bytes, strings are converted using their UTF-8 representation.
/// A byte buffer can also be restricted to a sub range with [`Item::slice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<'a> {
    /// The whole byte sequence.
    Bytes(&'a [u8]),
    /// The `[begin, end)` range of `buf`, `end = None` meaning the end of the buffer.
    ///
    /// Out of range bounds are clamped to the buffer length and
    /// `end <= begin` selects the empty sequence.
    Slice {
        buf: &'a [u8],
        begin: usize,
        end: Option<usize>,
    },
}

impl<'a> Item<'a> {
    /// Creates an item from the `range` of `buf`.
    ///
    /// ```rust
    /// # use bitfilter::Item;
    /// assert_eq!(Item::slice(b"xxxfooxxx", 3..6).as_bytes(), b"foo");
    /// assert_eq!(Item::slice(b"xxxfoo", 3..200).as_bytes(), b"foo");
    /// assert_eq!(Item::slice(b"xxxfoo", 4..3).as_bytes(), b"");
    /// ```
    pub fn slice(buf: &'a [u8], range: impl RangeBounds<usize>) -> Self {
        let begin = match range.start_bound() {
            Bound::Included(&i) => i,
            Bound::Excluded(&i) => i.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&i) => Some(i.saturating_add(1)),
            Bound::Excluded(&i) => Some(i),
            Bound::Unbounded => None,
        };
        Item::Slice { buf, begin, end }
    }

    /// The effective bytes of this item, after clamping.
    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            Item::Bytes(bytes) => bytes,
            Item::Slice { buf, begin, end } => {
                let end = end.map_or(buf.len(), |e| e.min(buf.len()));
                let begin = begin.min(end);
                &buf[begin..end]
            }
        }
    }
}

impl<'a> From<&'a [u8]> for Item<'a> {
    #[inline]
    fn from(bytes: &'a [u8]) -> Self {
        Item::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Item<'a> {
    #[inline]
    fn from(bytes: &'a [u8; N]) -> Self {
        Item::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Item<'a> {
    #[inline]
    fn from(bytes: &'a Vec<u8>) -> Self {
        Item::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for Item<'a> {
    #[inline]
    fn from(s: &'a str) -> Self {
        Item::Bytes(s.as_bytes())
    }
}

impl<'a> From<&'a String> for Item<'a> {
    #[inline]
    fn from(s: &'a String) -> Self {
        Item::Bytes(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_defaults() {
        let buf = b"xxxfoo";
        assert_eq!(Item::slice(buf, ..).as_bytes(), buf);
        assert_eq!(Item::slice(buf, 3..).as_bytes(), b"foo");
        assert_eq!(Item::slice(buf, ..3).as_bytes(), b"xxx");
        assert_eq!(Item::slice(buf, 1..=2).as_bytes(), b"xx");
        assert_eq!(
            Item::slice(buf, (Bound::Excluded(2), Bound::Unbounded)).as_bytes(),
            b"foo"
        );
    }

    #[test]
    fn test_slice_clamping() {
        let buf = b"xxxfoo";
        assert_eq!(Item::slice(buf, 3..200).as_bytes(), b"foo");
        assert_eq!(Item::slice(buf, 100..200).as_bytes(), b"");
        assert_eq!(Item::slice(buf, 4..3).as_bytes(), b"");
        assert_eq!(Item::slice(buf, 7..).as_bytes(), b"");
        assert_eq!(Item::slice(buf, ..=usize::MAX).as_bytes(), buf);
        assert_eq!(Item::slice(&[], ..).as_bytes(), b"");
    }

    #[test]
    fn test_conversions() {
        let s = String::from("foo");
        let v = b"foo".to_vec();
        assert_eq!(Item::from("foo").as_bytes(), b"foo");
        assert_eq!(Item::from(&s).as_bytes(), b"foo");
        assert_eq!(Item::from(&v).as_bytes(), b"foo");
        assert_eq!(Item::from(b"foo").as_bytes(), b"foo");
        assert_eq!(Item::from(&b"foo"[..]), Item::Bytes(b"foo"));
    }
}
