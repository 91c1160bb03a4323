//! Document rendering.
//!
//! Pages are rendered to HTML with Tera, one absolutely positioned A4
//! `<section>` per page, and converted to PDF with `wkhtmltopdf` when it is
//! installed. Without a converter the HTML is returned for browser printing.

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::str::FromStr;

use serde::Serialize;
use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::error::ExportError;
use crate::layout::{Document, Element, Fill, Page, Tone, Weight, PAGE_HEIGHT, PAGE_WIDTH};

const TEMPLATE_NAME: &str = "document.html";
const PT_TO_MM: f32 = 0.3528;
const ASCENT: f32 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Html,
    Pdf,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(format!("unsupported output format `{other}` (expected html|pdf)")),
        }
    }
}

/// Result of rendering. PDF requests fall back to HTML when no converter ran.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedArtifact {
    Pdf(Vec<u8>),
    Html(String),
}

impl RenderedArtifact {
    pub fn format(&self) -> OutputFormat {
        match self {
            RenderedArtifact::Pdf(_) => OutputFormat::Pdf,
            RenderedArtifact::Html(_) => OutputFormat::Html,
        }
    }

    pub fn extension(&self) -> &'static str {
        self.format().extension()
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RenderedArtifact::Pdf(bytes) => bytes,
            RenderedArtifact::Html(html) => html.as_bytes(),
        }
    }
}

#[derive(Serialize)]
struct HtmlPage {
    number: usize,
    elements: Vec<HtmlElement>,
}

#[derive(Serialize)]
struct HtmlElement {
    kind: &'static str,
    class: String,
    style: String,
    text: String,
}

#[derive(Clone, Debug)]
pub struct DocumentRenderer {
    tera: Tera,
    wkhtmltopdf_path: Option<String>,
}

impl DocumentRenderer {
    /// Uses `wkhtmltopdf_path` when given, otherwise looks the binary up on
    /// `PATH`.
    pub fn new(wkhtmltopdf_path: Option<&str>) -> Result<Self, ExportError> {
        let mut renderer = Self::html_only()?;

        renderer.wkhtmltopdf_path = which::which(wkhtmltopdf_path.unwrap_or("wkhtmltopdf"))
            .ok()
            .map(|path| path.to_string_lossy().to_string());

        match &renderer.wkhtmltopdf_path {
            Some(path) => info!(event_name = "budget.render.converter_found", path = %path, "wkhtmltopdf found"),
            None => warn!(
                event_name = "budget.render.converter_missing",
                "wkhtmltopdf not found - PDF exports will fall back to HTML"
            ),
        }

        Ok(renderer)
    }

    pub fn html_only() -> Result<Self, ExportError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, include_str!("../templates/document.html"))
            .map_err(|e| ExportError::Template(e.to_string()))?;
        Ok(Self { tera, wkhtmltopdf_path: None })
    }

    pub fn converter(&self) -> Option<&str> {
        self.wkhtmltopdf_path.as_deref()
    }

    pub fn render_html(&self, document: &Document) -> Result<String, ExportError> {
        let pages: Vec<HtmlPage> = document.pages().iter().map(html_page).collect();

        let mut context = Context::new();
        context.insert("title", &document.title);
        context.insert("page_width", &PAGE_WIDTH.to_string());
        context.insert("page_height", &PAGE_HEIGHT.to_string());
        context.insert("pages", &pages);

        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| ExportError::Template(e.to_string()))
    }

    pub async fn render(
        &self,
        document: &Document,
        format: OutputFormat,
    ) -> Result<RenderedArtifact, ExportError> {
        let html = self.render_html(document)?;

        if format == OutputFormat::Html {
            return Ok(RenderedArtifact::Html(html));
        }

        let Some(wkhtmltopdf) = self.wkhtmltopdf_path.as_deref() else {
            info!(event_name = "budget.render.html_fallback", "no PDF converter configured");
            return Ok(RenderedArtifact::Html(html));
        };

        match convert_html_to_pdf(&html, wkhtmltopdf).await {
            Ok(bytes) => Ok(RenderedArtifact::Pdf(bytes)),
            Err(e) => {
                warn!(
                    event_name = "budget.render.html_fallback",
                    error = %e,
                    "PDF conversion failed, falling back to HTML"
                );
                Ok(RenderedArtifact::Html(html))
            }
        }
    }
}

async fn convert_html_to_pdf(html: &str, wkhtmltopdf_path: &str) -> Result<Vec<u8>, ExportError> {
    let temp_dir = std::env::temp_dir();
    let html_path = temp_dir.join(format!("budget_{}.html", uuid::Uuid::new_v4()));
    let pdf_path = temp_dir.join(format!("budget_{}.pdf", uuid::Uuid::new_v4()));

    tokio::fs::write(&html_path, html).await?;

    let result = run_converter(wkhtmltopdf_path, &html_path, &pdf_path).await;

    remove_temp(&html_path).await;
    remove_temp(&pdf_path).await;

    let bytes = result?;
    info!(event_name = "budget.render.pdf_generated", size = bytes.len(), "PDF generated");
    Ok(bytes)
}

async fn run_converter(
    wkhtmltopdf_path: &str,
    html_path: &Path,
    pdf_path: &Path,
) -> Result<Vec<u8>, ExportError> {
    let output = Command::new(wkhtmltopdf_path)
        .arg("--page-size")
        .arg("A4")
        .arg("--margin-top")
        .arg("0mm")
        .arg("--margin-bottom")
        .arg("0mm")
        .arg("--margin-left")
        .arg("0mm")
        .arg("--margin-right")
        .arg("0mm")
        .arg("--disable-smart-shrinking")
        .arg("--encoding")
        .arg("utf-8")
        .arg("--enable-local-file-access")
        .arg(html_path)
        .arg(pdf_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(event_name = "budget.render.converter_failed", stderr = %stderr, "wkhtmltopdf failed");
        return Err(ExportError::Conversion(stderr.to_string()));
    }

    Ok(tokio::fs::read(pdf_path).await?)
}

async fn remove_temp(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!(path = %path.display(), error = %e, "could not remove temporary render file");
        }
    }
}

fn html_page(page: &Page) -> HtmlPage {
    HtmlPage { number: page.number, elements: page.elements.iter().map(html_element).collect() }
}

fn html_element(element: &Element) -> HtmlElement {
    match element {
        Element::Text { x, y, text, style } => {
            let top = y - style.size_pt * PT_TO_MM * ASCENT;
            HtmlElement {
                kind: "text",
                class: format!("{} {}", weight_class(style.weight), tone_class(style.tone)),
                style: format!("left:{x:.2}mm;top:{top:.2}mm;font-size:{:.1}pt", style.size_pt),
                text: text.clone(),
            }
        }
        Element::Line { x1, x2, y, width, tone } => HtmlElement {
            kind: "line",
            class: format!("line {}", tone_class(*tone)),
            style: format!(
                "left:{x1:.2}mm;top:{:.2}mm;width:{:.2}mm;height:{width:.2}mm",
                y - width / 2.0,
                x2 - x1
            ),
            text: String::new(),
        },
        Element::Rect { x, y, width, height, fill } => HtmlElement {
            kind: "rect",
            class: fill_class(*fill).to_string(),
            style: format!("left:{x:.2}mm;top:{y:.2}mm;width:{width:.2}mm;height:{height:.2}mm"),
            text: String::new(),
        },
    }
}

fn weight_class(weight: Weight) -> &'static str {
    match weight {
        Weight::Normal => "w-normal",
        Weight::Bold => "w-bold",
        Weight::Italic => "w-italic",
    }
}

fn tone_class(tone: Tone) -> &'static str {
    match tone {
        Tone::Brand => "t-brand",
        Tone::Strong => "t-strong",
        Tone::Body => "t-body",
        Tone::Muted => "t-muted",
        Tone::Saving => "t-saving",
        Tone::Extra => "t-extra",
        Tone::Notice => "t-notice",
        Tone::Inverse => "t-inverse",
    }
}

fn fill_class(fill: Fill) -> &'static str {
    match fill {
        Fill::Outline => "f-outline",
        Fill::Panel => "f-panel",
        Fill::SavingBand => "f-saving_band",
        Fill::ExtraBand => "f-extra_band",
        Fill::HeaderBand => "f-header_band",
        Fill::Stripe => "f-stripe",
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentRenderer, OutputFormat, RenderedArtifact};
    use crate::layout::{Document, PageCursor, Section, TextStyle};

    fn document() -> Document {
        let mut cursor = PageCursor::new();
        cursor.begin(Section::Header);
        cursor.text(0.0, "Reformas <García> & Co", TextStyle::TITLE);
        cursor.divider();
        cursor.new_page();
        cursor.text(0.0, "second page", TextStyle::BODY);
        let (pages, section_starts) = cursor.finish();
        Document { title: "Budget".to_string(), pages, section_starts }
    }

    #[test]
    fn html_has_one_section_per_page_and_escapes_text() {
        let renderer = DocumentRenderer::html_only().expect("renderer");
        let html = renderer.render_html(&document()).expect("html");

        assert_eq!(html.matches("<section class=\"page\"").count(), 2);
        assert!(html.contains("Reformas &lt;García&gt; &amp; Co"));
        assert!(html.contains("second page"));
        assert!(html.contains("width: 210mm"));
    }

    #[tokio::test]
    async fn pdf_request_without_converter_falls_back_to_html() {
        let renderer = DocumentRenderer::html_only().expect("renderer");
        let artifact = renderer.render(&document(), OutputFormat::Pdf).await.expect("render");

        assert!(matches!(artifact, RenderedArtifact::Html(_)));
        assert_eq!(artifact.extension(), "html");
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("PDF".parse::<OutputFormat>(), Ok(OutputFormat::Pdf));
        assert_eq!("html".parse::<OutputFormat>(), Ok(OutputFormat::Html));
        assert!("docx".parse::<OutputFormat>().is_err());
    }
}
