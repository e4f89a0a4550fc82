//! Replace characters the standard PDF fonts cannot show.
//!
//! The worksheet uses the built-in Helvetica faces with WinAnsi encoding.
//! Models happily emit peso signs, typographic dashes and curly quotes;
//! those are mapped to plain ASCII before any text is measured, since line
//! wrapping depends on the final glyph widths.

/// Fixed substitution table. No replacement contains a key, which keeps
/// [`sanitize_text`] idempotent.
const SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{20B1}', "PHP "), // ₱
    ('\u{2010}', "-"),    // hyphen
    ('\u{2011}', "-"),    // non-breaking hyphen
    ('\u{2012}', "-"),    // figure dash
    ('\u{2013}', "-"),    // en dash
    ('\u{2014}', "-"),    // em dash
    ('\u{2212}', "-"),    // minus sign
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{201E}', "\""),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201A}', "'"),
];

pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}
