use pdf_writer::{Name, Pdf, Ref};

/// The two standard Type1 faces the reports use. Neither is embedded; every
/// PDF viewer ships them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    pub(crate) const ALL: [FontFace; 2] = [FontFace::Regular, FontFace::Bold];

    /// Resource name used inside page content streams.
    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
        }
    }

    fn base_font(self) -> &'static [u8] {
        match self {
            FontFace::Regular => b"Helvetica",
            FontFace::Bold => b"Helvetica-Bold",
        }
    }

    /// Width of a single character in 1000-units.
    fn char_width_1000(self, ch: char) -> f32 {
        let byte = match char_to_winansi(ch) {
            // Drawn as '?'.
            0 if !ch.is_control() => b'?',
            b => b,
        };
        if byte < 32 {
            return 0.0;
        }
        let w = helvetica_width_1000(byte);
        match self {
            FontFace::Regular => w,
            // Helvetica-Bold runs about 6% wider on average.
            FontFace::Bold => w * 1.06,
        }
    }

    /// Width of `text` at `font_size` points, in points.
    pub fn text_width_pt(self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    /// Width of `text` at `font_size` points, in page units.
    pub fn text_width(self, text: &str, font_size: f32) -> f32 {
        self.text_width_pt(text, font_size) * MM_PER_PT
    }

    /// Cut `text` so it fits in `max_width` page units, marking the cut with "...".
    pub fn fit_text(self, text: &str, font_size: f32, max_width: f32) -> String {
        if self.text_width(text, font_size) <= max_width {
            return text.to_string();
        }
        let ellipsis = "...";
        let budget = max_width - self.text_width(ellipsis, font_size);
        if budget <= 0.0 {
            return String::new();
        }
        let mut used = 0.0f32;
        let mut out = String::new();
        for ch in text.chars() {
            let w = self.char_width_1000(ch) * font_size / 1000.0 * MM_PER_PT;
            if used + w > budget {
                break;
            }
            used += w;
            out.push(ch);
        }
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push_str(ellipsis);
        out
    }
}

pub(crate) const MM_PER_PT: f32 = 25.4 / 72.0;

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Characters outside the code page become '?'.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .filter(|c| !c.is_control())
        .map(|c| match char_to_winansi(c) {
            0 => b'?',
            b => b,
        })
        .collect()
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi bytes 32..=255.
fn helvetica_width_1000(b: u8) -> f32 {
    match b {
        32 => 278.0,                          // space
        33..=47 => 333.0,                     // punctuation
        48..=57 => 556.0,                     // digits
        58..=64 => 333.0,                     // more punctuation
        73 | 74 => 278.0,                     // I J (narrow uppercase)
        77 => 833.0,                          // M (wide)
        65..=90 => 667.0,                     // uppercase A-Z (average)
        91..=96 => 333.0,                     // brackets etc.
        102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
        109 | 119 => 833.0,                   // m w (wide)
        97..=122 => 556.0,                    // lowercase a-z (average)
        _ => 556.0,
    }
}

/// Write the Type1 font dictionaries; returns (resource name, ref) pairs.
pub(crate) fn register_fonts(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
) -> Vec<(&'static str, Ref)> {
    FontFace::ALL
        .iter()
        .map(|&face| {
            let font_ref = alloc();
            pdf.type1_font(font_ref)
                .base_font(Name(face.base_font()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            (face.resource_name(), font_ref)
        })
        .collect()
}
