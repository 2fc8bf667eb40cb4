//! Word areas: glyph encoding and text-run coalescing.
//!
//! Consecutive words on one baseline share a single `TJ`. The distance
//! between them is expressed as a gap in thousandths of an em, so no text
//! matrix is needed until the baseline, font or fill changes, or something
//! other than text is drawn.

use crate::frame::{self, Segment};
use crate::state::{DecorationCarries, DecorationCarry, RenderState};
use folio_area::Word;
use folio_render_core::RenderError;
use folio_render_core::encoding::winansi_byte;
use folio_traits::FontMetrics;
use folio_types::Millipoints;
use lopdf::{Object, StringFormat};

/// Gaps below this many thousandths of an em start a new run instead.
const MIN_GAP: f32 = -33_000.0;

fn string_object(bytes: Vec<u8>, multi_byte: bool) -> Object {
    if multi_byte {
        Object::String(bytes, StringFormat::Hexadecimal)
    } else {
        Object::String(bytes, StringFormat::Literal)
    }
}

fn push_char(bytes: &mut Vec<u8>, c: char, font: &str, multi_byte: bool) -> Result<(), RenderError> {
    if multi_byte {
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        return Ok(());
    }
    let byte = winansi_byte(c).ok_or_else(|| RenderError::Encoding {
        font: font.to_string(),
        character: c,
    })?;
    bytes.push(byte);
    Ok(())
}

/// Encodes `text` as `TJ` items: strings, split wherever a kerning pair
/// applies, with the negated adjustment between the pieces.
pub(crate) fn encode_word(text: &str, font: &str, metrics: &dyn FontMetrics) -> Result<Vec<Object>, RenderError> {
    let multi_byte = metrics.is_multi_byte(font);
    let mut items = Vec::new();
    let mut current = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        push_char(&mut current, c, font, multi_byte)?;
        if let Some(&next) = chars.peek() {
            if let Some(adjust) = metrics.kerning(font, c, next) {
                items.push(string_object(std::mem::take(&mut current), multi_byte));
                items.push(Object::Integer(-i64::from(adjust)));
            }
        }
    }
    items.push(string_object(current, multi_byte));
    Ok(items)
}

fn decoration(
    state: &mut RenderState,
    x: Millipoints,
    y: Millipoints,
    word: &Word,
) -> DecorationCarry {
    let thickness = word.size / 14;
    frame::stroke_segment(
        state,
        Segment {
            from: (x, y),
            to: (x + word.width, y),
            thickness,
            color: word.color,
        },
        None,
    );
    DecorationCarry {
        end_x: x + word.width,
        y,
        thickness,
        color: word.color,
    }
}

/// Shows `word` at the cursor and advances it by the word's width.
pub(crate) fn render_word(
    state: &mut RenderState,
    word: &Word,
    metrics: &dyn FontMetrics,
    coalesce: bool,
) -> Result<(), RenderError> {
    let x = state.x;
    let baseline = state.y;
    state.x += word.width;

    let items = encode_word(&word.text, &word.font, metrics)?;

    state.set_font(&word.font, word.size);
    state.set_fill(word.color);

    let ascender = metrics.ascender(&word.font, word.size);
    let underline = word
        .underline
        .then(|| decoration(state, x, baseline + word.size / 10, word));
    let overline = word
        .overline
        .then(|| decoration(state, x, baseline - ascender - word.size / 10, word));
    let line_through = word
        .line_through
        .then(|| decoration(state, x, baseline - ascender * 3 / 8, word));
    state.decorations = DecorationCarries {
        underline,
        overline,
        line_through,
    };

    let gap = (state.last_right - x) as f32 * 1000.0 / word.size as f32;
    if !coalesce || !state.run_open() || baseline != state.last_baseline || gap < MIN_GAP {
        state.open_run(x, baseline);
    } else {
        state.append_to_run(Object::Real(gap));
    }
    for item in items {
        state.append_to_run(item);
    }

    state.last_right = x + word.width;
    state.last_width = word.width;
    state.last_baseline = baseline;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_traits::{FontDescriptor, InMemoryFontMetrics};
    use lopdf::content::Operation;

    fn operators(ops: &[Operation]) -> Vec<&str> {
        ops.iter().map(|o| o.operator.as_str()).collect()
    }

    fn show(state: &mut RenderState, metrics: &InMemoryFontMetrics, word: &Word, x: Millipoints, y: Millipoints) {
        state.x = x;
        state.y = y;
        render_word(state, word, metrics, true).unwrap();
    }

    #[test]
    fn same_baseline_words_share_one_show() {
        let metrics = InMemoryFontMetrics::standard();
        let mut state = RenderState::new(792_000);
        show(&mut state, &metrics, &Word::new("Hello", "F3", 10_000, 5_000), 0, 10_000);
        show(&mut state, &metrics, &Word::new("World", "F3", 10_000, 5_200), 6_000, 10_000);
        let ops = state.finish();

        assert_eq!(operators(&ops), ["BT", "Tf", "rg", "Tm", "TJ", "ET"]);
        let items = ops[4].operands[0].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Object::string_literal("Hello"));
        assert_eq!(items[1], Object::Real(-100.0));
        assert_eq!(items[2], Object::string_literal("World"));
    }

    #[test]
    fn baseline_change_starts_a_new_run() {
        let metrics = InMemoryFontMetrics::standard();
        let mut state = RenderState::new(792_000);
        show(&mut state, &metrics, &Word::new("one", "F3", 10_000, 5_000), 0, 10_000);
        show(&mut state, &metrics, &Word::new("two", "F3", 10_000, 5_000), 0, 22_000);
        let ops = state.finish();
        assert_eq!(operators(&ops), ["BT", "Tf", "rg", "Tm", "TJ", "Tm", "TJ", "ET"]);
    }

    #[test]
    fn coalescing_can_be_disabled() {
        let metrics = InMemoryFontMetrics::standard();
        let mut state = RenderState::new(792_000);
        for x in [0, 6_000] {
            state.x = x;
            state.y = 10_000;
            render_word(&mut state, &Word::new("w", "F3", 10_000, 5_000), &metrics, false).unwrap();
        }
        let ops = state.finish();
        assert_eq!(operators(&ops).iter().filter(|o| **o == "Tm").count(), 2);
    }

    #[test]
    fn fill_change_flushes_the_run() {
        let metrics = InMemoryFontMetrics::standard();
        let mut state = RenderState::new(792_000);
        show(&mut state, &metrics, &Word::new("a", "F3", 10_000, 5_000), 0, 10_000);
        let mut red = Word::new("b", "F3", 10_000, 5_000);
        red.color = folio_types::Color::rgb(255, 0, 0);
        show(&mut state, &metrics, &red, 6_000, 10_000);
        let ops = state.finish();
        assert_eq!(operators(&ops), ["BT", "Tf", "rg", "Tm", "TJ", "rg", "Tm", "TJ", "ET"]);
    }

    #[test]
    fn decorations_close_the_run_and_leave_carries() {
        let metrics = InMemoryFontMetrics::standard();
        let mut state = RenderState::new(792_000);
        show(&mut state, &metrics, &Word::new("plain", "F3", 10_000, 5_000), 0, 10_000);
        let mut underlined = Word::new("under", "F3", 14_000, 7_000);
        underlined.underline = true;
        show(&mut state, &metrics, &underlined, 6_000, 10_000);

        let carry = state.decorations.underline.unwrap();
        assert_eq!(carry.end_x, 13_000);
        assert_eq!(carry.y, 11_400);
        assert_eq!(carry.thickness, 1_000);
        assert!(state.decorations.overline.is_none());

        let ops = state.finish();
        let names = operators(&ops);
        let stroke = names.iter().position(|o| *o == "S").unwrap();
        let first_show = names.iter().position(|o| *o == "TJ").unwrap();
        assert!(first_show < stroke);
        assert_eq!(names.iter().filter(|o| **o == "Tm").count(), 2);
    }

    #[test]
    fn kerning_splits_the_string() {
        let metrics = InMemoryFontMetrics::standard();
        let items = encode_word("AVE", "F1", &metrics).unwrap();
        assert_eq!(
            items,
            vec![Object::string_literal("A"), Object::Integer(70), Object::string_literal("VE")]
        );
    }

    #[test]
    fn single_byte_fonts_reject_wide_characters() {
        let metrics = InMemoryFontMetrics::standard();
        assert!(encode_word("caf\u{e9}", "F3", &metrics).is_ok());
        let err = encode_word("\u{4e2d}", "F3", &metrics).unwrap_err();
        assert!(matches!(err, RenderError::Encoding { character: '\u{4e2d}', .. }));
    }

    #[test]
    fn typographic_punctuation_maps_to_winansi() {
        let metrics = InMemoryFontMetrics::standard();
        let cases: [(&str, &[u8]); 4] = [
            ("don\u{2019}t", b"don\x92t"),
            ("1\u{2013}2", b"1\x962"),
            ("\u{20ac}5", b"\x805"),
            ("\u{201c}hi\u{201d}", b"\x93hi\x94"),
        ];
        for (text, expected) in cases {
            let items = encode_word(text, "F3", &metrics).unwrap();
            assert_eq!(items, vec![Object::String(expected.to_vec(), StringFormat::Literal)], "{}", text);
        }
        // C1 controls are not WinAnsi characters
        assert!(encode_word("\u{96}", "F3", &metrics).is_err());
    }

    #[test]
    fn wide_fonts_use_big_endian_units() {
        let metrics = InMemoryFontMetrics::new(&[FontDescriptor::new("F9", "Wide", 800).multi_byte()]);
        let items = encode_word("A\u{4e2d}", "F9", &metrics).unwrap();
        assert_eq!(items, vec![Object::String(vec![0x00, 0x41, 0x4e, 0x2d], StringFormat::Hexadecimal)]);
    }
}
