use crate::bytesearch::ByteBitmap;
use crate::types::CharRange;

// Logging is compiled out entirely unless the "logging" feature is enabled.
macro_rules! log {
    ($($tt:tt)*) => {
        #[cfg(feature = "logging")]
        {
            $($tt)*
        }
    }
}

macro_rules! debug {
    ($($tt:tt)*) => { log!(log::debug!($($tt)*)) }
}

macro_rules! trace {
    ($($tt:tt)*) => { log!(log::trace!($($tt)*)) }
}

/// \return the first byte of the UTF-8 encoding of \p c.
#[inline(always)]
pub fn utf8_first_byte(c: char) -> u8 {
    let cp = c as u32;
    if cp < 0x80 {
        // One byte encoding.
        cp as u8
    } else if cp < 0x800 {
        // Two byte encoding.
        ((cp >> 6) & 0x1F) as u8 | 0b1100_0000
    } else if cp < 0x10000 {
        // Three byte encoding.
        ((cp >> 12) & 0x0F) as u8 | 0b1110_0000
    } else {
        // Four byte encoding.
        ((cp >> 18) & 0x07) as u8 | 0b1111_0000
    }
}

/// Add all of the first bytes of an inclusive char range to a byte bitmap.
pub fn add_utf8_first_bytes_to_bitmap(range: CharRange, bitmap: &mut ByteBitmap) {
    let (first, last) = (range.0 as u32, range.1 as u32);
    let ranges = [
        (first, last.min(0x7F)),              // 1 byte range
        (first.max(0x80), last.min(0x7FF)),   // 2 byte range
        (first.max(0x800), last.min(0xFFFF)), // 3 byte range
        (first.max(0x10000), last),           // 4 byte range
    ];
    for (first, last) in ranges {
        if first > last {
            continue;
        }
        // The endpoints may fall in the surrogate gap; clamp them to chars.
        let lo = char_at_or_after(first);
        let hi = char_at_or_before(last);
        if let (Some(lo), Some(hi)) = (lo, hi) {
            if lo <= hi {
                for byte in utf8_first_byte(lo)..=utf8_first_byte(hi) {
                    bitmap.set(byte);
                }
            }
        }
    }
}

fn char_at_or_after(cp: u32) -> Option<char> {
    char::from_u32(cp).or_else(|| char::from_u32(0xE000.max(cp)))
}

fn char_at_or_before(cp: u32) -> Option<char> {
    char::from_u32(cp).or_else(|| char::from_u32(0xD7FF.min(cp)))
}

/// \return true if \p b is a UTF8 continutation byte.
#[inline(always)]
pub fn is_utf8_continuation(b: u8) -> bool {
    (b & 0b1100_0000) == 0b1000_0000
}
