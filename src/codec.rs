//! Bit/byte packing helpers for word-packed Pix rows.
//!
//! A Pix row is a slice of `u32` words. Samples are packed MSB-first: the
//! leftmost pixel of a row occupies the most significant bits of the row's
//! first word, whatever the host byte order. Every accessor indexes through
//! the slice, so an out-of-range sample index panics instead of reading past
//! the row.

/// Number of 32-bit words needed for one row of `width` pixels at `depth` bpp.
pub fn words_per_line(width: u32, depth: u32) -> usize {
    ((u64::from(width) * u64::from(depth)).div_ceil(32)) as usize
}

/// Word offset of row `row` in a buffer of `height` rows, or `None` if the
/// row does not exist.
pub fn row_offset(words_per_line: usize, height: u32, row: u32) -> Option<usize> {
    if row >= height {
        return None;
    }
    words_per_line.checked_mul(row as usize)
}

// ── Sub-word accessors ──────────────────────────────────────────────

#[inline]
pub fn get_data_bit(line: &[u32], n: usize) -> u32 {
    (line[n >> 5] >> (31 - (n & 31))) & 0x1
}

#[inline]
pub fn set_data_bit(line: &mut [u32], n: usize, val: u32) {
    let shift = 31 - (n & 31);
    let word = &mut line[n >> 5];
    *word = (*word & !(0x1u32 << shift)) | ((val & 0x1) << shift);
}

#[inline]
pub fn get_data_dibit(line: &[u32], n: usize) -> u32 {
    (line[n >> 4] >> (2 * (15 - (n & 15)))) & 0x3
}

#[inline]
pub fn set_data_dibit(line: &mut [u32], n: usize, val: u32) {
    let shift = 2 * (15 - (n & 15));
    let word = &mut line[n >> 4];
    *word = (*word & !(0x3u32 << shift)) | ((val & 0x3) << shift);
}

#[inline]
pub fn get_data_qbit(line: &[u32], n: usize) -> u32 {
    (line[n >> 3] >> (4 * (7 - (n & 7)))) & 0xf
}

#[inline]
pub fn set_data_qbit(line: &mut [u32], n: usize, val: u32) {
    let shift = 4 * (7 - (n & 7));
    let word = &mut line[n >> 3];
    *word = (*word & !(0xfu32 << shift)) | ((val & 0xf) << shift);
}

/// Read the `n`-th byte of a row; byte 0 is the most significant byte of word 0.
#[inline]
pub fn get_data_byte(line: &[u32], n: usize) -> u32 {
    (line[n >> 2] >> (8 * (3 - (n & 3)))) & 0xff
}

#[inline]
pub fn set_data_byte(line: &mut [u32], n: usize, val: u32) {
    let shift = 8 * (3 - (n & 3));
    let word = &mut line[n >> 2];
    *word = (*word & !(0xffu32 << shift)) | ((val & 0xff) << shift);
}

#[inline]
pub fn get_data_two_bytes(line: &[u32], n: usize) -> u32 {
    (line[n >> 1] >> (16 * (1 - (n & 1)))) & 0xffff
}

#[inline]
pub fn set_data_two_bytes(line: &mut [u32], n: usize, val: u32) {
    let shift = 16 * (1 - (n & 1));
    let word = &mut line[n >> 1];
    *word = (*word & !(0xffffu32 << shift)) | ((val & 0xffff) << shift);
}

#[inline]
pub fn get_data_four_bytes(line: &[u32], n: usize) -> u32 {
    line[n]
}

#[inline]
pub fn set_data_four_bytes(line: &mut [u32], n: usize, val: u32) {
    line[n] = val;
}

/// Read sample `n` of a row at any supported depth.
///
/// Returns `None` for a depth with no packing rule.
pub fn get_sample(line: &[u32], depth: u32, n: usize) -> Option<u32> {
    Some(match depth {
        1 => get_data_bit(line, n),
        2 => get_data_dibit(line, n),
        4 => get_data_qbit(line, n),
        8 => get_data_byte(line, n),
        16 => get_data_two_bytes(line, n),
        32 => get_data_four_bytes(line, n),
        _ => return None,
    })
}

/// Write sample `n` of a row at any supported depth, masking `val` to the
/// field width. Returns `false` for a depth with no packing rule.
pub fn set_sample(line: &mut [u32], depth: u32, n: usize, val: u32) -> bool {
    match depth {
        1 => set_data_bit(line, n, val),
        2 => set_data_dibit(line, n, val),
        4 => set_data_qbit(line, n, val),
        8 => set_data_byte(line, n, val),
        16 => set_data_two_bytes(line, n, val),
        32 => set_data_four_bytes(line, n, val),
        _ => return false,
    }
    true
}

// ── Channel packing ─────────────────────────────────────────────────

/// Pack four channels into the canonical `0xRRGGBBAA` word.
#[inline]
pub fn encode_as_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> u32 {
    (u32::from(red) << 24) | (u32::from(green) << 16) | (u32::from(blue) << 8) | u32::from(alpha)
}

/// Split a `0xRRGGBBAA` word into `(red, green, blue, alpha)`.
#[inline]
pub fn decode_rgba(value: u32) -> (u8, u8, u8, u8) {
    (
        (value >> 24) as u8,
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
    )
}

#[inline]
fn expand5(v: u16) -> u8 {
    let v = (v & 0x1f) as u8;
    (v << 3) | (v >> 2)
}

#[inline]
fn expand6(v: u16) -> u8 {
    let v = (v & 0x3f) as u8;
    (v << 2) | (v >> 4)
}

/// `0RRRRRGGGGGBBBBB` to RGBA, alpha 255.
pub fn convert_rgb555_to_rgba(val: u16) -> u32 {
    encode_as_rgba(expand5(val >> 10), expand5(val >> 5), expand5(val), 255)
}

/// `ARRRRRGGGGGBBBBB` to RGBA; the alpha bit maps to 0x00 or 0xFF.
pub fn convert_argb1555_to_rgba(val: u16) -> u32 {
    let alpha = if val & 0x8000 != 0 { 255 } else { 0 };
    encode_as_rgba(expand5(val >> 10), expand5(val >> 5), expand5(val), alpha)
}

/// `RRRRRGGGGGGBBBBB` to RGBA, alpha 255.
pub fn convert_rgb565_to_rgba(val: u16) -> u32 {
    encode_as_rgba(expand5(val >> 11), expand6(val >> 5), expand5(val), 255)
}
