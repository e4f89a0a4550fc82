//! Worksheet layout: [`StructuredResult`] → paginated [`DocumentBuilder`].
//!
//! Single pass, top to bottom, no backtracking. A vertical cursor (mm from
//! the page top) advances per section and per problem:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ header band (title, date,    │  30 mm
//! │ language)                    │
//! │ Concept Review               │  cursor = 45
//! │   wrapped text               │  += lines × 5 + 15 (flows onto
//! │                              │  new pages past 280 mm)
//! │ Remediation Exercises        │
//! │ 1. problem text              │  break check, then
//! │    ____________________      │  += lines × 5 + 25
//! │ 2. …                         │
//! └──────────────────────────────┘
//! answer-key page (own band), then footers on every page
//! ```
//!
//! The page-break check runs once per problem, before its ordinal is drawn,
//! so an ordinal always shares a page with its first line.

use crate::config::FooterStyle;
use crate::error::RenderError;
use crate::language::Language;
use crate::output::StructuredResult;
use crate::worksheet::builder::{Align, DocumentBuilder, Rgb};
use crate::worksheet::metrics::FontFace;
use crate::worksheet::sanitize::sanitize_text;
use chrono::NaiveDate;

// A4 portrait.
pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;

pub const MARGIN: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
pub const LINE_HEIGHT: f32 = 5.0;
pub const BODY_SIZE: f32 = 11.0;

/// Cursor on a continuation page.
pub const TOP_OFFSET: f32 = 20.0;
/// A problem starting below this line moves to a new page.
pub const BREAK_THRESHOLD: f32 = 260.0;
/// Lowest baseline for a concept-review line; later lines continue on a
/// new page.
pub const TEXT_BOTTOM: f32 = 280.0;

pub const PROBLEM_INDENT: f32 = 10.0;
/// Cursor advance after a problem's text block.
pub const PROBLEM_GAP: f32 = 25.0;
/// Distance from the end of a problem's text to its answer rule.
const RULE_OFFSET: f32 = 10.0;

const HEADER_HEIGHT: f32 = 30.0;
const FIRST_SECTION_Y: f32 = 45.0;
const CONCEPT_HEADING_GAP: f32 = 8.0;
const CONCEPT_SECTION_GAP: f32 = 15.0;
const EXERCISES_HEADING_GAP: f32 = 10.0;

const ANSWER_HEADER_HEIGHT: f32 = 20.0;
const ANSWER_FIRST_Y: f32 = 35.0;
const ANSWER_STEP: f32 = 10.0;

const FOOTER_Y: f32 = 290.0;

const BRAND_BLUE: Rgb = Rgb(0, 56, 168);
const RULE_COLOR: Rgb = Rgb::gray(150);
const FOOTER_COLOR: Rgb = Rgb::gray(100);

pub const TITLE: &str = "SAGIP: Remediation Worksheet";
pub const CONCEPT_HEADING: &str = "Guro's Notes (Concept Review)";
pub const EXERCISES_HEADING: &str = "Remediation Exercises";
pub const ANSWER_KEY_HEADING: &str = "Teacher's Answer Key";

/// Per-render inputs that are not part of the analysis result.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Date printed in the header.
    pub generated_on: NaiveDate,
    pub footer: FooterStyle,
}

impl RenderOptions {
    pub fn today(footer: FooterStyle) -> Self {
        Self {
            generated_on: chrono::Local::now().date_naive(),
            footer,
        }
    }
}

/// Lay out a complete worksheet.
///
/// # Errors
/// [`RenderError::MissingField`] when the concept review is blank.
pub fn layout_worksheet(
    result: &StructuredResult,
    language: Language,
    options: &RenderOptions,
) -> Result<DocumentBuilder, RenderError> {
    let concept = sanitize_text(&result.concept_review);
    if concept.trim().is_empty() {
        return Err(RenderError::MissingField {
            field: "concept review",
        });
    }

    let mut doc = DocumentBuilder::new(PAGE_WIDTH, PAGE_HEIGHT);

    draw_header(&mut doc, language, options.generated_on);
    let cursor = draw_concept_section(&mut doc, &concept, FIRST_SECTION_Y);
    draw_practice_section(&mut doc, &result.practice_problems, cursor);

    if result.has_answer_key() {
        draw_answer_key(&mut doc, &result.answer_key);
    }

    stamp_footers(&mut doc, &options.footer);
    Ok(doc)
}

fn draw_header(doc: &mut DocumentBuilder, language: Language, date: NaiveDate) {
    doc.set_fill_color(BRAND_BLUE);
    doc.fill_rect(0.0, 0.0, PAGE_WIDTH, HEADER_HEIGHT);

    doc.set_text_color(Rgb::WHITE);
    doc.set_font(FontFace::HelveticaBold);
    doc.set_font_size(22.0);
    doc.draw_text(TITLE, MARGIN, 18.0, Align::Left);

    doc.set_font(FontFace::Helvetica);
    doc.set_font_size(10.0);
    let subtitle = format!(
        "Generated on: {} | Language: {}",
        date.format("%B %-d, %Y"),
        language
    );
    doc.draw_text(&subtitle, MARGIN, 25.0, Align::Left);
}

fn draw_heading(doc: &mut DocumentBuilder, text: &str, y: f32) {
    doc.set_text_color(Rgb::BLACK);
    doc.set_font(FontFace::HelveticaBold);
    doc.set_font_size(14.0);
    doc.draw_text(text, MARGIN, y, Align::Left);
}

fn set_body_font(doc: &mut DocumentBuilder) {
    doc.set_text_color(Rgb::BLACK);
    doc.set_font(FontFace::Helvetica);
    doc.set_font_size(BODY_SIZE);
}

/// Returns the cursor below the section.
fn draw_concept_section(doc: &mut DocumentBuilder, concept: &str, cursor: f32) -> f32 {
    draw_heading(doc, CONCEPT_HEADING, cursor);
    let mut cursor = cursor + CONCEPT_HEADING_GAP;

    set_body_font(doc);
    let lines = doc.wrap_text(concept, CONTENT_WIDTH);
    for line in &lines {
        if cursor > TEXT_BOTTOM {
            doc.add_page();
            cursor = TOP_OFFSET;
        }
        doc.draw_text(line, MARGIN, cursor, Align::Left);
        cursor += LINE_HEIGHT;
    }

    cursor + CONCEPT_SECTION_GAP
}

fn draw_practice_section(doc: &mut DocumentBuilder, problems: &[String], cursor: f32) {
    let mut cursor = cursor;
    if cursor > BREAK_THRESHOLD {
        doc.add_page();
        cursor = TOP_OFFSET;
    }
    draw_heading(doc, EXERCISES_HEADING, cursor);
    cursor += EXERCISES_HEADING_GAP;

    set_body_font(doc);
    for (index, problem) in problems.iter().enumerate() {
        cursor = place_problem(doc, cursor, index + 1, problem);
    }
}

/// Draw one numbered problem with its answer rule; returns the next cursor.
///
/// Without a page break the advance is exactly
/// `lines × LINE_HEIGHT + PROBLEM_GAP`.
pub(crate) fn place_problem(
    doc: &mut DocumentBuilder,
    cursor: f32,
    ordinal: usize,
    problem: &str,
) -> f32 {
    let mut cursor = cursor;
    if cursor > BREAK_THRESHOLD {
        doc.add_page();
        cursor = TOP_OFFSET;
    }

    let text_x = MARGIN + PROBLEM_INDENT;
    let lines = doc.wrap_text(&sanitize_text(problem), CONTENT_WIDTH - PROBLEM_INDENT);

    doc.draw_text(&format!("{ordinal}."), MARGIN, cursor, Align::Left);
    doc.draw_lines(&lines, text_x, cursor, LINE_HEIGHT);

    let text_height = lines.len() as f32 * LINE_HEIGHT;
    let rule_y = cursor + text_height + RULE_OFFSET;
    doc.set_draw_color(RULE_COLOR);
    doc.draw_line(text_x, rule_y, PAGE_WIDTH - MARGIN, rule_y);

    cursor + text_height + PROBLEM_GAP
}

/// Answers are single lines at a fixed step with no page breaks; a key too
/// long for one page runs off the bottom.
fn draw_answer_key(doc: &mut DocumentBuilder, answers: &[String]) {
    doc.add_page();

    doc.set_fill_color(BRAND_BLUE);
    doc.fill_rect(0.0, 0.0, PAGE_WIDTH, ANSWER_HEADER_HEIGHT);
    doc.set_text_color(Rgb::WHITE);
    doc.set_font(FontFace::HelveticaBold);
    doc.set_font_size(16.0);
    doc.draw_text(ANSWER_KEY_HEADING, MARGIN, 13.0, Align::Left);

    set_body_font(doc);
    let mut cursor = ANSWER_FIRST_Y;
    for (index, answer) in answers.iter().enumerate() {
        let flat = sanitize_text(answer)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        doc.draw_text(&format!("{}. {}", index + 1, flat), MARGIN, cursor, Align::Left);
        cursor += ANSWER_STEP;
    }
}

fn stamp_footers(doc: &mut DocumentBuilder, footer: &FooterStyle) {
    let total = doc.page_count();
    for index in 0..total {
        doc.set_page(index);
        doc.set_font(FontFace::Helvetica);
        doc.set_font_size(8.0);
        doc.set_text_color(FOOTER_COLOR);
        let text = sanitize_text(&footer.render(index + 1, total));
        doc.draw_text(&text, PAGE_WIDTH / 2.0, FOOTER_Y, Align::Center);
    }
}
