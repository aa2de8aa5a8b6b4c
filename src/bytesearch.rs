use core::fmt;
extern crate memchr;

/// Facilities for searching bytes.
pub trait ByteSearcher {
    /// Search for ourselves in a slice of bytes.
    /// The length of the slice is unspecified and may be 0.
    /// \return the next index of ourselves in the slice, or None.
    fn find_in(&self, rhs: &[u8]) -> Option<usize>;
}

impl ByteSearcher for [u8] {
    #[inline(always)]
    fn find_in(&self, rhs: &[u8]) -> Option<usize> {
        match self.len() {
            0 => Some(0),
            1 => memchr::memchr(self[0], rhs),
            _ => memchr::memmem::find(rhs, self),
        }
    }
}

/// A ByteSet is any set of bytes.
pub trait ByteSet {
    /// \return whether the ByteSet contains the byte.
    fn contains(&self, b: u8) -> bool;
}

/// A ByteArraySet wraps a small array and uses linear equality.
#[derive(Copy, Clone, Debug)]
pub struct ByteArraySet<ArraySet: SmallArraySet>(pub ArraySet);

/// Cover over contains() to avoid bumping into native contains call.
impl<ArraySet: SmallArraySet> ByteArraySet<ArraySet> {
    #[inline(always)]
    pub fn contains(self, b: u8) -> bool {
        self.0.contains(b)
    }
}

impl<ArraySet: SmallArraySet> ByteSearcher for ByteArraySet<ArraySet> {
    #[inline(always)]
    fn find_in(&self, rhs: &[u8]) -> Option<usize> {
        self.0.find_in(rhs)
    }
}

/// A SmallArraySet is a set implemented as a small byte array.
pub trait SmallArraySet: Copy {
    fn contains(self, b: u8) -> bool;

    fn find_in(self, rhs: &[u8]) -> Option<usize>;
}

impl SmallArraySet for [u8; 2] {
    #[inline(always)]
    fn contains(self, b: u8) -> bool {
        b == self[0] || b == self[1]
    }

    #[inline(always)]
    fn find_in(self, rhs: &[u8]) -> Option<usize> {
        memchr::memchr2(self[0], self[1], rhs)
    }
}

impl SmallArraySet for [u8; 3] {
    #[inline(always)]
    fn contains(self, b: u8) -> bool {
        b == self[0] || b == self[1] || b == self[2]
    }

    #[inline(always)]
    fn find_in(self, rhs: &[u8]) -> Option<usize> {
        memchr::memchr3(self[0], self[1], self[2], rhs)
    }
}

/// A helper function for formatting bitmaps, using - ranges.
fn format_bitmap<Func>(name: &str, f: &mut fmt::Formatter<'_>, contains: Func) -> fmt::Result
where
    Func: Fn(u8) -> bool,
{
    write!(f, "{}[", name)?;
    let mut idx: usize = 0;
    let mut maybe_space = "";
    while idx < 256 {
        // Compute the next value not contained.
        let mut end = idx;
        while end < 256 && contains(end as u8) {
            end += 1;
        }
        match end - idx {
            0 => (),
            1 => write!(f, "{}{}", maybe_space, idx)?,
            _ => write!(f, "{}{}-{}", maybe_space, idx, end - 1)?,
        };
        if end > idx {
            maybe_space = " ";
        }
        idx = end + 1
    }
    write!(f, "]")
}

/// A bitmap covering ASCII characters.
#[derive(Default, Copy, Clone, PartialEq, Eq)]
pub struct AsciiBitmap(pub [u8; 16]);

impl AsciiBitmap {
    /// Set a byte val in this bitmap.
    #[inline(always)]
    pub fn set(&mut self, val: u8) {
        debug_assert!(val <= 127, "Value should be ASCII");
        self.0[(val >> 3) as usize] |= 1 << (val & 0x7);
    }
}

impl fmt::Debug for AsciiBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_bitmap("AsciiBitmap", f, |v| self.contains(v))
    }
}

impl ByteSet for AsciiBitmap {
    /// \return whether this bitmap contains a given value.
    /// The value does NOT have to be ASCII.
    #[inline(always)]
    fn contains(&self, val: u8) -> bool {
        // Mask off the MSB so that the index is always in range, then zero the
        // mask for non-ASCII values.
        let byte = (val & 0x7F) >> 3;
        let bit = val & 0x7;
        let mask = ((val >> 7) ^ 1) << bit;
        (self.0[byte as usize] & mask) != 0
    }
}

/// A bitmap covering all bytes.
#[derive(Default, Copy, Clone, PartialEq, Eq)]
pub struct ByteBitmap([u16; 16]);

impl ByteBitmap {
    /// Construct from a sequence of bytes.
    pub fn new(bytes: &[u8]) -> ByteBitmap {
        let mut bb = ByteBitmap::default();
        for &b in bytes {
            bb.set(b)
        }
        bb
    }

    /// \return whether this bitmap contains a given byte val.
    #[inline(always)]
    pub fn contains(&self, val: u8) -> bool {
        let byte = val >> 4;
        let bit = val & 0xF;
        (self.0[byte as usize] & (1 << bit)) != 0
    }

    /// Set a bit in this bitmap.
    #[inline(always)]
    pub fn set(&mut self, val: u8) {
        let byte = val >> 4;
        let bit = val & 0xF;
        self.0[byte as usize] |= 1 << bit;
    }

    /// Update ourselves from another bitmap, in place.
    pub fn bitor(&mut self, rhs: &ByteBitmap) {
        for (lhs, rhs) in self.0.iter_mut().zip(rhs.0.iter()) {
            *lhs |= *rhs;
        }
    }

    /// \return all set bytes, as a vec.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_vec(&self) -> Vec<u8> {
        (0..=255).filter(|b| self.contains(*b)).collect()
    }
}

impl ByteSearcher for ByteBitmap {
    #[inline(always)]
    fn find_in(&self, bytes: &[u8]) -> Option<usize> {
        bytes.iter().position(|&b| self.contains(b))
    }
}

impl fmt::Debug for ByteBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_bitmap("ByteBitmap", f, |v| self.contains(v))
    }
}

/// A trivial ByteSearcher corresponding to the empty string.
#[derive(Debug, Copy, Clone)]
pub struct EmptyString {}

impl ByteSearcher for EmptyString {
    #[inline(always)]
    fn find_in(&self, _bytes: &[u8]) -> Option<usize> {
        Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bitmap(bytes: &[u8]) -> ByteBitmap {
        ByteBitmap::new(bytes)
    }

    #[test]
    fn empty_search() {
        assert_eq!(EmptyString {}.find_in(&[1, 2, 3]), Some(0));
        assert_eq!(EmptyString {}.find_in(&[]), Some(0));
    }

    #[test]
    fn bitmap_search() {
        assert_eq!(make_bitmap(&[]).find_in(&[1, 2, 3]), None);
        assert_eq!(make_bitmap(&[2, 3]).find_in(&[1, 2, 3]), Some(1));
        assert_eq!(
            make_bitmap(&[4, 5, 6, 7]).find_in(&[8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20]),
            None
        );
        assert_eq!(
            make_bitmap(&[4, 5, 6, 7])
                .find_in(&[8, 9, 10, 11, 12, 13, 4, 14, 6, 15, 7, 16, 17, 18, 19, 20]),
            Some(6)
        );
    }

    #[test]
    fn bitmap_bits() {
        let mut bm = make_bitmap(&[0, 17, 255]);
        assert_eq!(bm.to_vec(), vec![0, 17, 255]);
        bm.bitor(&make_bitmap(&[18]));
        assert_eq!(bm.to_vec(), vec![0, 17, 18, 255]);
        assert_eq!(format!("{:?}", bm), "ByteBitmap[0 17-18 255]");
    }

    #[test]
    fn ascii_bitmap_ignores_high_bytes() {
        let mut bm = AsciiBitmap::default();
        bm.set(b'a');
        bm.set(b'z');
        assert!(bm.contains(b'a'));
        assert!(!bm.contains(b'b'));
        assert!(!bm.contains(b'a' | 0x80));
        assert!(!bm.contains(0xFF));
        assert_eq!(format!("{:?}", bm), "AsciiBitmap[97 122]");
    }

    #[test]
    fn small_sets() {
        let set2 = ByteArraySet([b'x', b'y']);
        assert!(set2.contains(b'y'));
        assert_eq!(set2.find_in(b"abcyx"), Some(3));
        let set3 = ByteArraySet([b'x', b'y', b'c']);
        assert_eq!(set3.find_in(b"abcyx"), Some(2));
        assert_eq!(set3.find_in(b"ab"), None);
    }

    #[test]
    fn literal_search() {
        let text: &[u8] = b"hello world, hello again";
        assert_eq!(b"hello"[..].find_in(text), Some(0));
        assert_eq!(b"world"[..].find_in(text), Some(6));
        assert_eq!(b"again"[..].find_in(text), Some(19));
        assert_eq!(b"xyzab"[..].find_in(text), None);
        assert_eq!(b"llo "[..].find_in(text), Some(2));
        assert_eq!(b"w"[..].find_in(text), Some(6));
        assert_eq!(b""[..].find_in(text), Some(0));
        assert_eq!(b"aaaa"[..].find_in(b"baaaaaaaaab"), Some(1));
        assert_eq!(b"abc"[..].find_in(b""), None);
    }
}
