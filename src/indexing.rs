use crate::bytesearch::ByteSearcher;
use crate::util::is_utf8_continuation;

/// \return the length of a UTF8 sequence starting with this byte.
#[inline(always)]
const fn utf8_seq_len(b: u8) -> usize {
    if b < 128 {
        1
    } else {
        match b & 0xF0 {
            0xE0 => 3,
            0xF0 => 4,
            _ => 2,
        }
    }
}

/// A helper type that holds a string and allows walking it by byte offsets.
/// Positions are byte offsets which always lie on char boundaries.
#[derive(Debug, Copy, Clone)]
pub struct Utf8Input<'a> {
    input: &'a str,
}

impl<'a> Utf8Input<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { input: s }
    }

    /// \return the byte contents.
    #[inline(always)]
    pub fn contents(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    /// \return the position at the right end of the input.
    #[inline(always)]
    pub fn right_end(&self) -> usize {
        self.input.len()
    }

    /// \return whether \p pos may be used as a position in this input.
    pub fn is_valid_pos(&self, pos: usize) -> bool {
        self.input.is_char_boundary(pos)
    }

    #[inline(always)]
    fn debug_assert_boundary(&self, pos: usize) {
        debug_assert!(self.input.is_char_boundary(pos), "Not a char boundary");
    }

    /// \return the char to the right (starting at) \p pos, or None if we are
    /// at the end. Advance the position past the char.
    #[inline(always)]
    pub fn next_right(&self, pos: &mut usize) -> Option<char> {
        self.debug_assert_boundary(*pos);
        let c = self.input.get(*pos..)?.chars().next()?;
        *pos += c.len_utf8();
        Some(c)
    }

    /// Like next_right, but does not decode the char.
    #[inline(always)]
    pub fn next_right_pos(&self, pos: usize) -> Option<usize> {
        self.debug_assert_boundary(pos);
        let b0 = *self.contents().get(pos)?;
        Some(pos + utf8_seq_len(b0))
    }

    /// \return the position of the char ending just before \p pos, or None
    /// if we are at the start.
    #[inline(always)]
    pub fn next_left_pos(&self, pos: usize) -> Option<usize> {
        self.debug_assert_boundary(pos);
        let bytes = self.contents();
        let mut pos = pos.checked_sub(1)?;
        while pos > 0 && is_utf8_continuation(bytes[pos]) {
            pos -= 1;
        }
        Some(pos)
    }

    /// \return the byte to the right (starting at) \p pos, or None if we are
    /// at the end.
    #[inline(always)]
    pub fn peek_byte_right(&self, pos: usize) -> Option<u8> {
        self.contents().get(pos).copied()
    }

    /// If the input at \p pos begins with \p bytes, advance past them and
    /// return true. Otherwise return false and leave the position alone.
    #[inline(always)]
    pub fn match_bytes(&self, pos: &mut usize, bytes: &[u8]) -> bool {
        let end = *pos + bytes.len();
        match self.contents().get(*pos..end) {
            Some(window) if window == bytes => {
                *pos = end;
                true
            }
            _ => false,
        }
    }

    /// Apply a byte searcher starting at \p pos.
    /// \return the position of the first hit which lies on a char boundary,
    /// or None.
    #[inline(always)]
    pub fn find_bytes<Search: ByteSearcher + ?Sized>(
        &self,
        mut pos: usize,
        search: &Search,
    ) -> Option<usize> {
        let bytes = self.contents();
        loop {
            let idx = search.find_in(bytes.get(pos..)?)?;
            let hit = pos + idx;
            if self.input.is_char_boundary(hit) {
                return Some(hit);
            }
            // A hit in the middle of a char; resume at the next boundary.
            pos = hit + 1;
            while pos < bytes.len() && !self.input.is_char_boundary(pos) {
                pos += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytesearch::ByteBitmap;

    #[test]
    fn walk_right_and_left() {
        let s = "a\u{e9}\u{20AC}\u{1F600}z";
        let input = Utf8Input::new(s);
        let mut pos = 0;
        let mut chars = Vec::new();
        let mut positions = vec![0];
        while let Some(c) = input.next_right(&mut pos) {
            chars.push(c);
            positions.push(pos);
        }
        assert_eq!(chars, s.chars().collect::<Vec<_>>());
        assert_eq!(positions, vec![0, 1, 3, 6, 10, 11]);

        for w in positions.windows(2) {
            assert_eq!(input.next_right_pos(w[0]), Some(w[1]));
            assert_eq!(input.next_left_pos(w[1]), Some(w[0]));
        }
        assert_eq!(input.next_right_pos(s.len()), None);
        assert_eq!(input.next_left_pos(0), None);
    }

    #[test]
    fn match_bytes_advances_only_on_success() {
        let input = Utf8Input::new("hello");
        let mut pos = 1;
        assert!(!input.match_bytes(&mut pos, b"ex"));
        assert_eq!(pos, 1);
        assert!(input.match_bytes(&mut pos, b"ell"));
        assert_eq!(pos, 4);
        assert!(!input.match_bytes(&mut pos, b"oo"));
        assert!(input.match_bytes(&mut pos, b""));
    }

    #[test]
    fn find_bytes_skips_mid_char_hits() {
        // The continuation byte 0xA9 of e-acute must not be reported.
        let input = Utf8Input::new("\u{e9}x\u{a9}");
        let bm = ByteBitmap::new(&[0xA9, 0xC2]);
        assert_eq!(input.find_bytes(0, &bm), Some(3));
        assert_eq!(input.find_bytes(4, &bm), None);
        assert_eq!(input.find_bytes(0, &b"x"[..]), Some(2));
    }
}
