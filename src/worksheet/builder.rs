//! The drawing surface used by the layout engine.
//!
//! [`DocumentBuilder`] records draw operations per page instead of writing
//! PDF directly. One builder is owned by one render call; the layout code
//! threads it through every step and [`crate::worksheet::pdf::encode`]
//! turns the finished value into bytes. Keeping the description separate
//! from the byte encoding is what lets tests assert on positions and page
//! membership.
//!
//! Coordinates are millimetres from the top-left corner of the page. Text
//! `y` is the baseline.

use crate::worksheet::metrics::{text_width_mm, FontFace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub const fn gray(level: u8) -> Rgb {
        Rgb(level, level, level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// A single recorded drawing operation with fully resolved state.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgb,
        width: f32,
    },
    Text {
        text: String,
        /// Left edge after alignment.
        x: f32,
        y: f32,
        font: FontFace,
        size: f32,
        color: Rgb,
    },
}

/// Paginated draw-operation recorder with jsPDF-style current state.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    width: f32,
    height: f32,
    pages: Vec<Vec<DrawOp>>,
    current: usize,
    font: FontFace,
    font_size: f32,
    text_color: Rgb,
    fill_color: Rgb,
    draw_color: Rgb,
    line_width: f32,
}

impl DocumentBuilder {
    /// A document with one blank page of `width` × `height` mm.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pages: vec![Vec::new()],
            current: 0,
            font: FontFace::Helvetica,
            font_size: 11.0,
            text_color: Rgb::BLACK,
            fill_color: Rgb::BLACK,
            draw_color: Rgb::BLACK,
            line_width: 0.2,
        }
    }

    pub fn page_width(&self) -> f32 {
        self.width
    }

    pub fn page_height(&self) -> f32 {
        self.height
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 0-based index of the page being drawn on.
    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    /// Append a blank page and make it current.
    pub fn add_page(&mut self) {
        self.pages.push(Vec::new());
        self.current = self.pages.len() - 1;
    }

    /// Switch to an existing page (0-based). Out-of-range indices are clamped.
    pub fn set_page(&mut self, index: usize) {
        self.current = index.min(self.pages.len() - 1);
    }

    pub fn set_font(&mut self, font: FontFace) {
        self.font = font;
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    pub fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    pub fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    pub fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    /// Width of `text` in the current font and size, in mm.
    pub fn text_width(&self, text: &str) -> f32 {
        text_width_mm(text, self.font, self.font_size)
    }

    /// Wrap `text` to `max_width` mm in the current font and size.
    ///
    /// Line breaks in the source are kept; a blank source line becomes an
    /// empty output line. Breaks happen only at whitespace: a single word
    /// wider than `max_width` is placed alone on its own line rather than
    /// split. Always returns at least one line.
    pub fn wrap_text(&self, text: &str, max_width: f32) -> Vec<String> {
        let normalised = text.replace("\r\n", "\n").replace('\r', "\n");
        let space = self.text_width(" ");
        let mut lines = Vec::new();

        for paragraph in normalised.split('\n') {
            let mut line = String::new();
            let mut line_width = 0.0;

            for word in paragraph.split_whitespace() {
                let word_width = self.text_width(word);
                if line.is_empty() {
                    line.push_str(word);
                    line_width = word_width;
                } else if line_width + space + word_width <= max_width {
                    line.push(' ');
                    line.push_str(word);
                    line_width += space + word_width;
                } else {
                    lines.push(std::mem::take(&mut line));
                    line.push_str(word);
                    line_width = word_width;
                }
            }
            lines.push(line);
        }

        lines
    }

    /// Draw one line of text at baseline `y`.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, align: Align) {
        let x = match align {
            Align::Left => x,
            Align::Center => x - self.text_width(text) / 2.0,
        };
        let op = DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            font: self.font,
            size: self.font_size,
            color: self.text_color,
        };
        self.pages[self.current].push(op);
    }

    /// Draw `lines` left-aligned from baseline `y`, `line_height` mm apart.
    pub fn draw_lines(&mut self, lines: &[String], x: f32, y: f32, line_height: f32) {
        for (i, line) in lines.iter().enumerate() {
            self.draw_text(line, x, y + i as f32 * line_height, Align::Left);
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let op = DrawOp::FillRect {
            x,
            y,
            w,
            h,
            color: self.fill_color,
        };
        self.pages[self.current].push(op);
    }

    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let op = DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color: self.draw_color,
            width: self.line_width,
        };
        self.pages[self.current].push(op);
    }

    /// Texts drawn on page `index`, in drawing order.
    pub fn page_texts(&self, index: usize) -> Vec<&str> {
        self.pages
            .get(index)
            .map(|ops| {
                ops.iter()
                    .filter_map(|op| match op {
                        DrawOp::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> DocumentBuilder {
        DocumentBuilder::new(210.0, 297.0)
    }

    #[test]
    fn short_text_is_one_line() {
        assert_eq!(builder().wrap_text("2+2=___", 160.0), vec!["2+2=___"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(builder().wrap_text("", 160.0), vec![""]);
    }

    #[test]
    fn keeps_source_line_breaks() {
        let lines = builder().wrap_text("Which is bigger?\nA. 1/2\n\nB. 1/3", 160.0);
        assert_eq!(lines, vec!["Which is bigger?", "A. 1/2", "", "B. 1/3"]);
    }

    #[test]
    fn wraps_without_splitting_words() {
        let b = builder();
        let text = "Si Juan ay bumili ng limang mangga sa palengke at binigyan niya ang \
                    kanyang kapatid ng dalawa. Ilan ang natira kay Juan?";
        let lines = b.wrap_text(text, 60.0);
        assert!(lines.len() >= 2, "got {lines:?}");
        for line in &lines {
            assert!(b.text_width(line) <= 60.0, "too wide: {line:?}");
        }
        let rejoined = lines.join(" ");
        assert_eq!(
            rejoined.split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn overlong_word_stands_alone() {
        let b = builder();
        let lines = b.wrap_text("a Pneumonoultramicroscopicsilicovolcanoconiosis b", 20.0);
        assert_eq!(
            lines,
            vec!["a", "Pneumonoultramicroscopicsilicovolcanoconiosis", "b"]
        );
    }

    #[test]
    fn center_alignment_shifts_left_edge() {
        let mut b = builder();
        b.set_font_size(8.0);
        b.draw_text("Sagip", 105.0, 290.0, Align::Center);
        let w = b.text_width("Sagip");
        match &b.pages()[0][0] {
            DrawOp::Text { x, .. } => assert!((x - (105.0 - w / 2.0)).abs() < 1e-4),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn ops_go_to_current_page() {
        let mut b = builder();
        b.draw_text("one", 0.0, 10.0, Align::Left);
        b.add_page();
        b.draw_text("two", 0.0, 10.0, Align::Left);
        b.set_page(0);
        b.draw_text("three", 0.0, 20.0, Align::Left);
        assert_eq!(b.page_texts(0), vec!["one", "three"]);
        assert_eq!(b.page_texts(1), vec!["two"]);
        assert_eq!(b.page_count(), 2);
    }
}
