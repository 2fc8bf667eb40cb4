//! Font metrics consumed while emitting text.
//!
//! Word widths arrive precomputed from layout; the renderer only needs to know
//! how to encode glyphs, where decorations sit relative to the baseline and
//! which character pairs kern.

use folio_types::Millipoints;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KerningPair {
    pub first: char,
    pub second: char,
    /// Advance adjustment in thousandths of an em (negative tightens).
    pub adjust: i32,
}

/// One font as known to the renderer and the document builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    /// Resource name used with `Tf` (e.g. `F1`).
    pub name: String,
    /// PostScript base font name written to the font dictionary.
    pub base_font: String,
    /// Wide fonts take two bytes per character in shown strings.
    #[serde(default)]
    pub multi_byte: bool,
    /// Ascender height in thousandths of an em.
    pub ascender: i32,
    #[serde(default)]
    pub kerning: Vec<KerningPair>,
}

impl FontDescriptor {
    pub fn new(name: impl Into<String>, base_font: impl Into<String>, ascender: i32) -> Self {
        Self {
            name: name.into(),
            base_font: base_font.into(),
            multi_byte: false,
            ascender,
            kerning: Vec::new(),
        }
    }

    pub fn with_kerning(mut self, pairs: &[(char, char, i32)]) -> Self {
        self.kerning.extend(
            pairs
                .iter()
                .map(|&(first, second, adjust)| KerningPair { first, second, adjust }),
        );
        self
    }

    pub fn multi_byte(mut self) -> Self {
        self.multi_byte = true;
        self
    }
}

/// Metric lookups keyed by the font resource name.
pub trait FontMetrics: Send + Sync + Debug {
    fn is_multi_byte(&self, font: &str) -> bool;

    /// Ascender height for `size`, both in millipoints.
    fn ascender(&self, font: &str, size: Millipoints) -> Millipoints;

    /// Kerning adjustment between two adjacent characters, in thousandths of an em.
    fn kerning(&self, font: &str, first: char, second: char) -> Option<i32>;
}

#[derive(Debug, Default)]
struct FontEntry {
    multi_byte: bool,
    ascender: i32,
    kerning: HashMap<(char, char), i32>,
}

/// A [`FontMetrics`] implementation backed by a fixed descriptor list.
#[derive(Debug, Default)]
pub struct InMemoryFontMetrics {
    fonts: HashMap<String, FontEntry>,
}

impl InMemoryFontMetrics {
    pub fn new(descriptors: &[FontDescriptor]) -> Self {
        let fonts = descriptors
            .iter()
            .map(|d| {
                let entry = FontEntry {
                    multi_byte: d.multi_byte,
                    ascender: d.ascender,
                    kerning: d
                        .kerning
                        .iter()
                        .map(|k| ((k.first, k.second), k.adjust))
                        .collect(),
                };
                (d.name.clone(), entry)
            })
            .collect();
        Self { fonts }
    }

    /// The base-14 faces registered under `F1`..`F4`.
    pub fn standard_descriptors() -> Vec<FontDescriptor> {
        vec![
            FontDescriptor::new("F1", "Helvetica", 718).with_kerning(&[
                ('A', 'V', -70),
                ('A', 'W', -50),
                ('A', 'Y', -100),
                ('T', 'o', -120),
                ('V', 'A', -70),
                ('W', 'o', -30),
            ]),
            FontDescriptor::new("F2", "Helvetica-Bold", 718),
            FontDescriptor::new("F3", "Times-Roman", 683),
            FontDescriptor::new("F4", "Courier", 629),
        ]
    }

    pub fn standard() -> Self {
        Self::new(&Self::standard_descriptors())
    }
}

impl FontMetrics for InMemoryFontMetrics {
    fn is_multi_byte(&self, font: &str) -> bool {
        self.fonts.get(font).is_some_and(|f| f.multi_byte)
    }

    fn ascender(&self, font: &str, size: Millipoints) -> Millipoints {
        let ascender = self.fonts.get(font).map_or(750, |f| f.ascender);
        ((i64::from(ascender) * i64::from(size)) / 1000) as Millipoints
    }

    fn kerning(&self, font: &str, first: char, second: char) -> Option<i32> {
        self.fonts.get(font)?.kerning.get(&(first, second)).copied()
    }
}
