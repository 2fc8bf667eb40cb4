//! Unicode to WinAnsiEncoding, the encoding declared for every
//! single-byte font.

/// The WinAnsi code for `c`, or `None` when the encoding has no slot for it.
///
/// Latin-1 maps onto itself. The C1 control range is not part of the
/// encoding; those slots hold typographic punctuation instead.
pub fn winansi_byte(c: char) -> Option<u8> {
    let code = u32::from(c);
    match code {
        0x00..=0x7f | 0xa0..=0xff => return u8::try_from(code).ok(),
        _ => {}
    }
    let byte = match c {
        '\u{20ac}' => 0x80, // euro
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85, // ellipsis
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95, // bullet
        '\u{2013}' => 0x96, // en dash
        '\u{2014}' => 0x97, // em dash
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => return None,
    };
    Some(byte)
}
