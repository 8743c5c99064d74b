//! Meal plan document export
//!
//! Export happens in two steps. [`layout_document`] is a pure function that
//! places every text line and divider on A4 pages, measured in millimetres
//! from the top-left corner. [`render_pdf`] turns that layout into PDF bytes
//! with `printpdf`, using the built-in Times fonts.

use chrono::{DateTime, Utc};
use healer_shared::{format_measure, HealthPriorities, HealthProfile, MealRecommendation};
use once_cell::sync::Lazy;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};
use regex_lite::Regex;
use std::io::BufWriter;
use thiserror::Error;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;
/// Cursor position past which content moves to a new page
pub const PAGE_BREAK_MM: f32 = 270.0;
/// Cursor position at the top of a continuation page
pub const PAGE_TOP_MM: f32 = 20.0;
pub const FOOTER_MM: f32 = 285.0;

const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
/// Average glyph width of Times as a fraction of the font size
const GLYPH_WIDTH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;

const GREEN: Rgb8 = Rgb8(44, 138, 106);
const MEAL_GREEN: Rgb8 = Rgb8(60, 100, 60);
const GREY: Rgb8 = Rgb8(100, 100, 100);
const DARK_GREY: Rgb8 = Rgb8(80, 80, 80);
const LIGHT_GREY: Rgb8 = Rgb8(150, 150, 150);
const BLACK: Rgb8 = Rgb8(0, 0, 0);
const DIVIDER: Rgb8 = Rgb8(210, 210, 210);

const DISCLAIMER: [&str; 13] = [
    "HEALER provides meal suggestions based on the health information you provided.",
    "This is not a substitute for professional medical advice, diagnosis, or treatment.",
    "Always seek the advice of your physician or other qualified health provider with",
    "any questions you may have regarding a medical condition. Never disregard",
    "professional medical advice or delay in seeking it because of something you",
    "have read or received from this application.",
    "",
    "The meal plans generated are suggestions and should be adjusted based on",
    "your personal tolerances, preferences, and any specific medical advice you",
    "have received from your healthcare providers.",
    "",
    "If you have severe allergies, medical conditions, or are pregnant, please",
    "consult with your healthcare provider before making significant dietary changes.",
];

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

// ============================================================================
// Layout Model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// A line of text; `y_mm` is the baseline
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size_pt: f32,
    pub style: FontStyle,
    pub color: Rgb8,
}

/// A horizontal divider
#[derive(Debug, Clone, PartialEq)]
pub struct RuleElement {
    pub x1_mm: f32,
    pub x2_mm: f32,
    pub y_mm: f32,
    pub color: Rgb8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextElement),
    Rule(RuleElement),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

#[cfg(test)]
impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &TextElement> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t),
            Element::Rule(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size_pt: f32,
    style: FontStyle,
    color: Rgb8,
}

impl TextStyle {
    const fn new(size_pt: f32, style: FontStyle, color: Rgb8) -> Self {
        Self {
            size_pt,
            style,
            color,
        }
    }
}

/// Estimated rendered width of a string
fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * PT_TO_MM * GLYPH_WIDTH_EM
}

/// Characters that fit on a line of the given width
fn chars_per_line(width_mm: f32, size_pt: f32) -> usize {
    ((width_mm / (size_pt * PT_TO_MM * GLYPH_WIDTH_EM)) as usize).max(10)
}

/// Greedy word wrap by character count
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let width = current.chars().count() + word.chars().count() + 1;
        if width > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Top-down writing cursor over a growing list of pages
struct Cursor {
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    fn new(start_y: f32) -> Self {
        Self {
            pages: vec![Page::default()],
            y: start_y,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = PAGE_TOP_MM;
    }

    fn ensure_room(&mut self) {
        if self.y > PAGE_BREAK_MM {
            self.new_page();
        }
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn text_at(&mut self, text: &str, x_mm: f32, y_mm: f32, style: TextStyle) {
        self.push(Element::Text(TextElement {
            text: text.to_string(),
            x_mm,
            y_mm,
            size_pt: style.size_pt,
            style: style.style,
            color: style.color,
        }));
    }

    /// One unwrapped line at the cursor, then advance
    fn line(&mut self, text: &str, x_mm: f32, style: TextStyle, advance: f32) {
        self.ensure_room();
        let y = self.y;
        self.text_at(text, x_mm, y, style);
        self.y += advance;
    }

    fn centered(&mut self, text: &str, style: TextStyle, advance: f32) {
        let x = ((PAGE_WIDTH_MM - text_width_mm(text, style.size_pt)) / 2.0).max(MARGIN_MM);
        self.line(text, x, style, advance);
    }

    /// Word-wrapped paragraph, breaking pages between lines
    fn paragraph(&mut self, text: &str, x_mm: f32, width_mm: f32, style: TextStyle, advance: f32) {
        for line in wrap_text(text, chars_per_line(width_mm, style.size_pt)) {
            self.line(&line, x_mm, style, advance);
        }
    }

    fn rule(&mut self, y_mm: f32) {
        self.push(Element::Rule(RuleElement {
            x1_mm: MARGIN_MM,
            x2_mm: PAGE_WIDTH_MM - MARGIN_MM,
            y_mm,
            color: DIVIDER,
        }));
    }
}

// ============================================================================
// Layout
// ============================================================================

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

fn profile_lines(profile: &HealthProfile) -> Vec<String> {
    let mut lines = vec![
        format!("Name: {}", profile.name),
        format!("Age: {} | Gender: {}", profile.age, profile.gender),
        format!(
            "Height: {} cm | Weight: {} kg",
            format_measure(profile.height_cm),
            format_measure(profile.weight_kg)
        ),
        format!("BMI: {}", profile.bmi),
        format!("Activity Level: {}", profile.activity_level),
        format!("Blood Pressure: {}", profile.blood_pressure),
        format!("Cholesterol: {}", profile.cholesterol),
    ];
    if let Some(fasting) = profile.glucose.fasting {
        lines.push(format!("Fasting Glucose: {} mg/dL", format_measure(fasting)));
    }
    if let Some(post_meal) = profile.glucose.post_meal {
        lines.push(format!("Post-Meal Glucose: {} mg/dL", format_measure(post_meal)));
    }
    lines.push(format!(
        "Allergies: {}",
        if profile.allergies.is_empty() {
            "None".to_string()
        } else {
            profile.allergies.join(", ")
        }
    ));
    lines.push(format!(
        "Health Issues: {}",
        if profile.health_issues.is_empty() {
            "None specified".to_string()
        } else {
            profile.health_issues.join(", ")
        }
    ));
    lines.push(format!(
        "Available Ingredients: {}",
        profile
            .available_ingredients
            .as_deref()
            .unwrap_or("Not specified")
    ));
    lines.push(format!("Generated on: {}", format_date(profile.submitted_at)));
    lines
}

fn layout_meal(cursor: &mut Cursor, index: usize, meal: &MealRecommendation) {
    let heading = TextStyle::new(12.0, FontStyle::Bold, DARK_GREY);
    let body = TextStyle::new(10.0, FontStyle::Regular, BLACK);
    let indent = MARGIN_MM + 5.0;
    let indented_width = CONTENT_WIDTH_MM - 10.0;

    cursor.paragraph(
        &format!("{}. {}", index + 1, meal.name),
        MARGIN_MM,
        CONTENT_WIDTH_MM,
        TextStyle::new(14.0, FontStyle::Bold, MEAL_GREEN),
        8.0,
    );

    cursor.ensure_room();
    let metadata = [
        format!("Dietary: {}", meal.dietary_preference),
        format!("Cooking Time: {}", meal.cooking_time_display()),
        format!("Total Calories: {}", meal.total_calories),
        format!("Match Score: {}%", meal.match_score),
    ];
    let y = cursor.y;
    for (i, item) in metadata.iter().enumerate() {
        cursor.text_at(
            item,
            MARGIN_MM + i as f32 * 45.0,
            y,
            TextStyle::new(9.0, FontStyle::Regular, GREY),
        );
    }
    cursor.y += 8.0;

    if let Some(benefits) = &meal.key_benefits {
        cursor.line(
            "Key Benefits:",
            MARGIN_MM,
            TextStyle::new(10.0, FontStyle::Bold, GREEN),
            6.0,
        );
        cursor.paragraph(
            benefits,
            indent,
            CONTENT_WIDTH_MM,
            TextStyle::new(10.0, FontStyle::Italic, DARK_GREY),
            5.0,
        );
        cursor.y += 5.0;
    }

    cursor.line("Ingredients:", MARGIN_MM, heading, 8.0);
    for ingredient in &meal.ingredients {
        cursor.paragraph(&format!("• {}", ingredient), indent, indented_width, body, 5.0);
    }
    cursor.y += 8.0;

    cursor.line("Nutrition Information:", MARGIN_MM, heading, 8.0);
    let n = &meal.nutrients;
    let mut nutrients = vec![
        format!("Protein: {}g", format_measure(n.protein)),
        format!("Carbohydrates: {}g", format_measure(n.carbs)),
        format!("Fats: {}g", format_measure(n.fats)),
        format!("Fiber: {}g", format_measure(n.fiber)),
        format!("Sugar: {}g", format_measure(n.sugar)),
    ];
    if let Some(sodium) = n.sodium {
        nutrients.push(format!("Sodium: {}mg", format_measure(sodium)));
    }
    for row in nutrients.chunks(2) {
        cursor.ensure_room();
        let y = cursor.y;
        for (col, item) in row.iter().enumerate() {
            cursor.text_at(item, indent + col as f32 * 80.0, y, body);
        }
        cursor.y += 5.0;
    }
    cursor.y += 8.0;

    cursor.line("Preparation Instructions:", MARGIN_MM, heading, 8.0);
    for (i, step) in meal.steps.iter().enumerate() {
        cursor.paragraph(&format!("{}. {}", i + 1, step), indent, indented_width, body, 5.0);
        cursor.y += 2.0;
    }

    if let Some(why) = &meal.why_this_helps {
        cursor.y += 8.0;
        cursor.line(
            "Why This Meal Helps:",
            MARGIN_MM,
            TextStyle::new(12.0, FontStyle::Bold, GREEN),
            8.0,
        );
        cursor.paragraph(
            why,
            indent,
            indented_width,
            TextStyle::new(10.0, FontStyle::Italic, DARK_GREY),
            5.0,
        );
    }
}

/// Lay out the meal plan document
///
/// Sections, in order: title and tagline, profile summary, applied health
/// priorities, numbered recipes separated by dividers, then a disclaimer
/// page whose footer carries the export date.
pub fn layout_document(
    profile: &HealthProfile,
    meals: &[MealRecommendation],
    generated_at: DateTime<Utc>,
) -> DocumentLayout {
    let section = TextStyle::new(16.0, FontStyle::Bold, GREEN);
    let mut cursor = Cursor::new(25.0);

    cursor.centered(
        "HEALER - Personalized Meal Plan",
        TextStyle::new(22.0, FontStyle::Bold, GREEN),
        10.0,
    );
    cursor.centered(
        "\"An AI Powered Virtual Nutritionist for Your Health Needs\"",
        TextStyle::new(12.0, FontStyle::Italic, GREY),
        20.0,
    );
    cursor.rule(cursor.y - 5.0);
    cursor.y += 15.0;

    cursor.line("Health Profile Summary:", MARGIN_MM, section, 12.0);
    for line in profile_lines(profile) {
        cursor.paragraph(
            &line,
            MARGIN_MM,
            CONTENT_WIDTH_MM,
            TextStyle::new(11.0, FontStyle::Regular, BLACK),
            6.0,
        );
    }
    cursor.y += 15.0;

    cursor.line(
        "Health Priorities Applied:",
        MARGIN_MM,
        TextStyle::new(12.0, FontStyle::Bold, GREEN),
        8.0,
    );
    for priority in HealthPriorities::from_profile(profile).lines() {
        cursor.paragraph(
            &format!("• {}", priority),
            MARGIN_MM + 5.0,
            CONTENT_WIDTH_MM,
            TextStyle::new(10.0, FontStyle::Italic, DARK_GREY),
            6.0,
        );
    }
    cursor.y += 15.0;

    cursor.line("Personalized Meal Recommendations:", MARGIN_MM, section, 15.0);
    for (index, meal) in meals.iter().enumerate() {
        layout_meal(&mut cursor, index, meal);
        cursor.y += 15.0;
        if index + 1 < meals.len() {
            cursor.rule(cursor.y - 5.0);
            cursor.y += 10.0;
        }
    }

    cursor.new_page();
    cursor.centered(
        "Important Medical Disclaimer",
        TextStyle::new(14.0, FontStyle::Bold, GREEN),
        15.0,
    );
    let disclaimer = TextStyle::new(10.0, FontStyle::Italic, GREY);
    for line in DISCLAIMER {
        if line.is_empty() {
            cursor.y += 6.0;
        } else {
            cursor.centered(line, disclaimer, 6.0);
        }
    }

    let footer = format!(
        "Generated by HEALER - AI Powered Healthy Meal Planner • {}",
        format_date(generated_at)
    );
    let footer_style = TextStyle::new(9.0, FontStyle::Italic, LIGHT_GREY);
    let x = (PAGE_WIDTH_MM - text_width_mm(&footer, footer_style.size_pt)) / 2.0;
    cursor.text_at(&footer, x, FOOTER_MM, footer_style);

    DocumentLayout {
        title: format!("{} - HEALER Meal Plan", profile.name),
        pages: cursor.pages,
    }
}

/// Download file name: whitespace runs in the name become `_`
pub fn export_file_name(name: &str) -> String {
    format!("{}_HEALER_Meal_Plan.pdf", WHITESPACE_RUN.replace_all(name, "_"))
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),
}

/// Built-in fonts only cover Latin-1; map common typography to ASCII
fn pdf_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '•' => '-',
            '–' | '—' => '-',
            '‘' | '’' => '\'',
            '“' | '”' => '"',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

fn color(c: Rgb8) -> Color {
    Color::Rgb(Rgb::new(
        c.0 as f32 / 255.0,
        c.1 as f32 / 255.0,
        c.2 as f32 / 255.0,
        None,
    ))
}

fn draw_page(layer: &PdfLayerReference, page: &Page, fonts: &Fonts) {
    for element in &page.elements {
        match element {
            Element::Text(t) => {
                layer.set_fill_color(color(t.color));
                layer.use_text(
                    pdf_text(&t.text),
                    t.size_pt,
                    Mm(t.x_mm),
                    Mm(PAGE_HEIGHT_MM - t.y_mm),
                    fonts.get(t.style),
                );
            }
            Element::Rule(r) => {
                let y = Mm(PAGE_HEIGHT_MM - r.y_mm);
                layer.set_outline_color(color(r.color));
                layer.set_outline_thickness(0.5);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(r.x1_mm), y), false),
                        (Point::new(Mm(r.x2_mm), y), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }
}

/// Render a layout to PDF bytes
pub fn render_pdf(layout: &DocumentLayout) -> Result<Vec<u8>, ExportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        &layout.title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );

    let font = |builtin| {
        doc.add_builtin_font(builtin)
            .map_err(|e| ExportError::Font(e.to_string()))
    };
    let fonts = Fonts {
        regular: font(BuiltinFont::TimesRoman)?,
        bold: font(BuiltinFont::TimesBold)?,
        italic: font(BuiltinFont::TimesItalic)?,
    };

    for (i, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        draw_page(&layer, page, &fonts);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Save(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| ExportError::Save(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fallback::fallback_meals;
    use chrono::TimeZone;
    use healer_shared::{normalize_at, RawProfileForm};

    fn profile() -> HealthProfile {
        let form = RawProfileForm {
            name: Some("Anna  Maria Lopez".to_string()),
            age: Some(30.0.into()),
            gender: Some("Female".to_string()),
            height: Some(165.0.into()),
            weight: Some(60.0.into()),
            bp_level: Some("High".to_string()),
            allergies: vec!["Shellfish".to_string()],
            ..Default::default()
        };
        normalize_at(&form, Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap()).unwrap()
    }

    fn all_texts(layout: &DocumentLayout) -> Vec<&str> {
        layout
            .pages
            .iter()
            .flat_map(|p| p.texts())
            .map(|t| t.text.as_str())
            .collect()
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("Anna  Maria Lopez"),
            "Anna_Maria_Lopez_HEALER_Meal_Plan.pdf"
        );
        assert_eq!(export_file_name("A"), "A_HEALER_Meal_Plan.pdf");
        assert_eq!(export_file_name("Jo\tAnn"), "Jo_Ann_HEALER_Meal_Plan.pdf");
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four five", 10);
        assert_eq!(lines, vec!["one two", "three four", "five"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_layout_sections() {
        let profile = profile();
        let meals = fallback_meals(&profile);
        let generated = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
        let layout = layout_document(&profile, &meals, generated);
        let texts = all_texts(&layout);

        assert_eq!(texts[0], "HEALER - Personalized Meal Plan");
        assert!(texts.contains(&"Name: Anna  Maria Lopez"));
        assert!(texts.contains(&"BMI: 22.0 (Normal)"));
        assert!(texts.contains(&"Blood Pressure: High"));
        assert!(texts.contains(&"Generated on: March 5, 2024"));
        assert!(texts.contains(&"• Allergen-free: Excluded Shellfish"));
        assert!(texts.iter().any(|t| t.starts_with("1. Heart-Healthy")));
        assert!(texts.iter().any(|t| t.starts_with("5. Omega-3")));
        assert!(texts.contains(&"Sodium: 380mg"));
    }

    #[test]
    fn test_disclaimer_page_is_last_with_footer() {
        let profile = profile();
        let layout = layout_document(&profile, &fallback_meals(&profile), Utc::now());
        let last = layout.pages.last().unwrap();
        let texts: Vec<&TextElement> = last.texts().collect();

        assert!(layout.pages.len() >= 3);
        assert_eq!(texts[0].text, "Important Medical Disclaimer");
        assert_eq!(texts[0].y_mm, PAGE_TOP_MM);
        let footer = texts.last().unwrap();
        assert!(footer.text.starts_with("Generated by HEALER"));
        assert_eq!(footer.y_mm, FOOTER_MM);
    }

    #[test]
    fn test_no_line_starts_below_break_threshold() {
        let profile = profile();
        let layout = layout_document(&profile, &fallback_meals(&profile), Utc::now());

        for (i, page) in layout.pages.iter().enumerate() {
            for text in page.texts() {
                if text.y_mm == FOOTER_MM {
                    continue;
                }
                assert!(
                    text.y_mm <= PAGE_BREAK_MM,
                    "page {} line {:?} at {}",
                    i,
                    text.text,
                    text.y_mm
                );
            }
            if i > 0 {
                let first = page.texts().next().unwrap();
                assert_eq!(first.y_mm, PAGE_TOP_MM);
            }
        }
    }

    #[test]
    fn test_dividers_between_meals_only() {
        let profile = profile();
        let meals = fallback_meals(&profile);
        let layout = layout_document(&profile, &meals, Utc::now());
        let rules = layout
            .pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .filter(|e| matches!(e, Element::Rule(_)))
            .count();
        // One under the title, then one between each pair of meals
        assert_eq!(rules, 1 + meals.len() - 1);
    }

    #[test]
    fn test_pdf_text_is_latin1() {
        assert_eq!(pdf_text("• 200°C – ok"), "- 200°C - ok");
        assert_eq!(pdf_text("日本"), "??");
    }

    #[test]
    fn test_render_pdf() {
        let profile = profile();
        let layout = layout_document(&profile, &fallback_meals(&profile), Utc::now());
        let bytes = render_pdf(&layout).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
