//! Page geometry and the positioned-element document model.
//!
//! All coordinates are millimetres on an A4 page, measured from the top-left
//! corner. Text `y` values are baselines.

use std::mem;

use serde::Serialize;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = 170.0;
pub const TOP: f32 = 20.0;
/// A block that would end below this line moves to a new page.
pub const PAGE_BREAK_AT: f32 = 270.0;
pub const FOOTER_Y: f32 = 285.0;

pub mod spacing {
    pub const SECTION_GAP: f32 = 15.0;
    pub const ITEM_GAP: f32 = 8.0;
    pub const SUB_ITEM_GAP: f32 = 5.0;
    pub const LINE_HEIGHT: f32 = 6.0;
    pub const TITLE_GAP: f32 = 12.0;
    pub const PARAGRAPH_GAP: f32 = 10.0;
    pub const DIVIDER_GAP: f32 = 8.0;
}

const PT_TO_MM: f32 = 0.3528;
const AVERAGE_GLYPH_EM: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Weight {
    Normal,
    Bold,
    Italic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Brand,
    Strong,
    Body,
    Muted,
    Saving,
    Extra,
    Notice,
    Inverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    Outline,
    Panel,
    SavingBand,
    ExtraBand,
    HeaderBand,
    Stripe,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TextStyle {
    pub size_pt: f32,
    pub weight: Weight,
    pub tone: Tone,
}

impl TextStyle {
    pub const TITLE: Self = Self::new(22.0, Weight::Bold, Tone::Brand);
    pub const COMPANY: Self = Self::new(16.0, Weight::Bold, Tone::Strong);
    pub const SECTION: Self = Self::new(16.0, Weight::Bold, Tone::Brand);
    pub const GROUP: Self = Self::new(14.0, Weight::Bold, Tone::Brand);
    pub const SUBSECTION: Self = Self::new(12.0, Weight::Bold, Tone::Brand);
    pub const LEAD: Self = Self::new(11.0, Weight::Normal, Tone::Body);
    pub const BODY: Self = Self::new(10.0, Weight::Normal, Tone::Body);
    pub const BODY_BOLD: Self = Self::new(10.0, Weight::Bold, Tone::Strong);
    pub const DETAIL: Self = Self::new(9.0, Weight::Normal, Tone::Muted);
    pub const NOTE: Self = Self::new(9.0, Weight::Italic, Tone::Muted);
    pub const FOOTER: Self = Self::new(8.0, Weight::Normal, Tone::Muted);

    pub const fn new(size_pt: f32, weight: Weight, tone: Tone) -> Self {
        Self { size_pt, weight, tone }
    }

    pub const fn with_tone(self, tone: Tone) -> Self {
        Self { tone, ..self }
    }

    pub const fn with_weight(self, weight: Weight) -> Self {
        Self { weight, ..self }
    }

    /// Rough number of characters that fit in `width` millimetres.
    pub fn chars_per(&self, width: f32) -> usize {
        let glyph = self.size_pt * PT_TO_MM * AVERAGE_GLYPH_EM;
        ((width / glyph).floor() as usize).max(1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Text { x: f32, y: f32, text: String, style: TextStyle },
    Line { x1: f32, x2: f32, y: f32, width: f32, tone: Tone },
    Rect { x: f32, y: f32, width: f32, height: f32, fill: Fill },
}

impl Element {
    pub fn text(&self) -> Option<&str> {
        match self {
            Element::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn y(&self) -> f32 {
        match self {
            Element::Text { y, .. } | Element::Line { y, .. } | Element::Rect { y, .. } => *y,
        }
    }

    /// Lowest point the element reaches: the baseline for text and lines, the
    /// bottom edge for rectangles.
    pub fn bottom(&self) -> f32 {
        match self {
            Element::Rect { y, height, .. } => y + height,
            other => other.y(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
    pub number: usize,
    pub elements: Vec<Element>,
}

impl Page {
    fn new(number: usize) -> Self {
        Self { number, elements: Vec::new() }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(Element::text)
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text.contains(needle))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Header,
    ExecutiveSummary,
    Scope,
    CostBreakdown,
    SelectedServices,
    PagesAndFeatures,
    Infrastructure,
    Timeline,
    FinancialSummary,
    MonthlyCostExamples,
    AddonCatalog,
    PaymentTerms,
    Clarifications,
    NextSteps,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Section::Header => "header",
            Section::ExecutiveSummary => "executive_summary",
            Section::Scope => "scope",
            Section::CostBreakdown => "cost_breakdown",
            Section::SelectedServices => "selected_services",
            Section::PagesAndFeatures => "pages_and_features",
            Section::Infrastructure => "infrastructure",
            Section::Timeline => "timeline",
            Section::FinancialSummary => "financial_summary",
            Section::MonthlyCostExamples => "monthly_cost_examples",
            Section::AddonCatalog => "addon_catalog",
            Section::PaymentTerms => "payment_terms",
            Section::Clarifications => "clarifications",
            Section::NextSteps => "next_steps",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SectionStart {
    pub section: Section,
    pub page: usize,
}

/// A finished, paginated budget document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
    pub section_starts: Vec<SectionStart>,
}

impl Document {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn section_starts(&self) -> &[SectionStart] {
        &self.section_starts
    }

    /// Sections in document order.
    pub fn sections(&self) -> Vec<Section> {
        self.section_starts.iter().map(|start| start.section).collect()
    }

    pub fn has_section(&self, section: Section) -> bool {
        self.section_page(section).is_some()
    }

    pub fn section_page(&self, section: Section) -> Option<usize> {
        self.section_starts
            .iter()
            .find(|start| start.section == section)
            .map(|start| start.page)
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages.iter().any(|page| page.contains_text(needle))
    }
}

/// Vertical write head over a growing list of pages.
#[derive(Debug)]
pub struct PageCursor {
    finished: Vec<Page>,
    current: Page,
    y: f32,
    starts: Vec<SectionStart>,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCursor {
    pub fn new() -> Self {
        Self { finished: Vec::new(), current: Page::new(1), y: TOP, starts: Vec::new() }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_number(&self) -> usize {
        self.current.number
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    pub fn new_page(&mut self) {
        let next = Page::new(self.current.number + 1);
        self.finished.push(mem::replace(&mut self.current, next));
        self.y = TOP;
    }

    /// Starts a new page when a block of `needed` millimetres would cross the
    /// break line. Returns whether a page was added.
    pub fn check_space(&mut self, needed: f32) -> bool {
        if self.y + needed > PAGE_BREAK_AT {
            self.new_page();
            true
        } else {
            false
        }
    }

    pub fn begin(&mut self, section: Section) {
        self.starts.push(SectionStart { section, page: self.current.number });
    }

    pub fn text(&mut self, indent: f32, text: impl Into<String>, style: TextStyle) {
        self.text_at(indent, 0.0, text, style);
    }

    pub fn text_at(&mut self, indent: f32, dy: f32, text: impl Into<String>, style: TextStyle) {
        self.current.elements.push(Element::Text {
            x: MARGIN + indent,
            y: self.y + dy,
            text: text.into(),
            style,
        });
    }

    /// Writes `text` wrapped to the content width, advancing one line height
    /// between lines. Each line gets its own space check, so long text flows
    /// onto following pages. The cursor is left on the last line.
    pub fn paragraph(&mut self, indent: f32, text: &str, style: TextStyle) {
        let lines = wrap(text, style.chars_per(CONTENT_WIDTH - indent));
        let count = lines.len();
        for (index, line) in lines.into_iter().enumerate() {
            self.check_space(spacing::LINE_HEIGHT);
            self.text(indent, line, style);
            if index + 1 < count {
                self.advance(spacing::LINE_HEIGHT);
            }
        }
    }

    pub fn line(&mut self, from: f32, to: f32, width: f32, tone: Tone) {
        self.current.elements.push(Element::Line {
            x1: MARGIN + from,
            x2: MARGIN + to,
            y: self.y,
            width,
            tone,
        });
    }

    pub fn line_at(&mut self, y: f32, from: f32, to: f32, width: f32, tone: Tone) {
        self.current.elements.push(Element::Line { x1: MARGIN + from, x2: MARGIN + to, y, width, tone });
    }

    pub fn rect(&mut self, dy: f32, height: f32, fill: Fill) {
        self.current.elements.push(Element::Rect {
            x: MARGIN,
            y: self.y + dy,
            width: CONTENT_WIDTH,
            height,
            fill,
        });
    }

    pub fn text_at_y(&mut self, indent: f32, y: f32, text: impl Into<String>, style: TextStyle) {
        self.current.elements.push(Element::Text { x: MARGIN + indent, y, text: text.into(), style });
    }

    pub fn divider(&mut self) {
        self.rule(0.3, spacing::ITEM_GAP);
    }

    pub fn thick_divider(&mut self) {
        self.rule(1.0, spacing::PARAGRAPH_GAP);
    }

    fn rule(&mut self, width: f32, gap: f32) {
        self.check_space(spacing::DIVIDER_GAP);
        self.line(0.0, CONTENT_WIDTH, width, Tone::Muted);
        self.advance(gap);
    }

    pub fn finish(mut self) -> (Vec<Page>, Vec<SectionStart>) {
        self.finished.push(self.current);
        (self.finished, self.starts)
    }
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !line.is_empty() {
            lines.push(mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}
