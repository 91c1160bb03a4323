//! Budget report builder.
//!
//! [`ReportExporter::export`] lays out an [`ExportSnapshot`] into a
//! [`Document`] with a fixed section order. Optional catalog blocks that are
//! absent are skipped and traced at `debug`.

use budgetkit_core::domain::project::ProjectCatalog;
use budgetkit_core::domain::shared::SharedCatalog;
use budgetkit_core::{ExportSnapshot, ServiceItem};
use tracing::{debug, info};

use crate::format::MoneyFormat;
use crate::layout::{
    spacing, Document, Element, Fill, PageCursor, Section, TextStyle, Tone, Weight,
    CONTENT_WIDTH, FOOTER_Y, MARGIN,
};

pub const DOCUMENT_TITLE: &str = "PROFESSIONAL WEB BUDGET";

/// Category panel plus its first item row.
const BREAKDOWN_BLOCK: f32 = 25.0;
/// Column header band of the schedule table plus one row.
const SCHEDULE_HEADER: f32 = spacing::TITLE_GAP + spacing::ITEM_GAP;

#[derive(Clone, Debug, Default)]
pub struct ExportSettings {
    pub money: MoneyFormat,
}

impl ExportSettings {
    pub fn with_currency(symbol: impl Into<String>) -> Self {
        Self { money: MoneyFormat::new(symbol) }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReportExporter {
    settings: ExportSettings,
}

impl ReportExporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn export(&self, snapshot: &ExportSnapshot) -> Document {
        let mut report = ReportBuilder {
            cursor: PageCursor::new(),
            snapshot,
            project: &snapshot.catalog.project,
            shared: &snapshot.catalog.shared,
            money: &self.settings.money,
        };

        report.header();
        report.executive_summary();
        report.scope();
        report.cost_breakdown();
        report.selected_services();
        report.pages_and_features();
        report.infrastructure();
        report.timeline();
        report.financial_summary();
        report.monthly_cost_examples();
        report.addon_catalog();
        report.payment_terms();
        report.clarifications();
        report.next_steps();

        let (mut pages, section_starts) = report.cursor.finish();

        let total_pages = pages.len();
        let generated = snapshot.generated_on.format("%d/%m/%Y").to_string();
        let contact = snapshot.catalog.contact().footer_line();
        for page in &mut pages {
            page.elements.extend(footer(page.number, total_pages, &generated, &contact));
        }

        info!(
            event_name = "budget.export.completed",
            project = %snapshot.catalog.project.id,
            pages = total_pages,
            sections = section_starts.len(),
            "budget document laid out"
        );

        Document { title: DOCUMENT_TITLE.to_string(), pages, section_starts }
    }
}

fn footer(page: usize, total: usize, generated: &str, contact: &str) -> Vec<Element> {
    let text = |indent: f32, text: String| Element::Text {
        x: MARGIN + indent,
        y: FOOTER_Y,
        text,
        style: TextStyle::FOOTER,
    };
    vec![
        text(0.0, format!("Page {page} of {total}")),
        text(50.0, format!("Generated automatically - {generated}")),
        text(120.0, contact.to_string()),
    ]
}

fn skipped(section: Section, reason: &'static str) {
    debug!(
        event_name = "budget.export.section_skipped",
        section = section.name(),
        reason,
        "optional section omitted"
    );
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct ReportBuilder<'a> {
    cursor: PageCursor,
    snapshot: &'a ExportSnapshot,
    project: &'a ProjectCatalog,
    shared: &'a SharedCatalog,
    money: &'a MoneyFormat,
}

impl ReportBuilder<'_> {
    fn heading(&mut self, title: &str, gap: f32) {
        self.cursor.text(0.0, title, TextStyle::SECTION);
        self.cursor.advance(gap);
    }

    fn bullets(&mut self, items: &[String], step: f32) {
        for item in items {
            self.cursor.check_space(step);
            self.cursor.text(5.0, format!("• {item}"), TextStyle::BODY);
            self.cursor.advance(step);
        }
    }

    fn header(&mut self) {
        let project = self.project;
        self.cursor.begin(Section::Header);
        self.cursor.text(0.0, DOCUMENT_TITLE, TextStyle::TITLE);
        self.cursor.advance(spacing::TITLE_GAP);

        self.cursor.text(0.0, &project.company, TextStyle::COMPANY);
        self.cursor.advance(spacing::ITEM_GAP);

        self.cursor.paragraph(0.0, &project.description, TextStyle::LEAD);
        self.cursor.advance(spacing::SECTION_GAP);

        self.cursor.thick_divider();
    }

    fn executive_summary(&mut self) {
        let (snapshot, project) = (self.snapshot, self.project);
        self.cursor.check_space(spacing::TITLE_GAP + spacing::LINE_HEIGHT);
        self.cursor.begin(Section::ExecutiveSummary);
        self.heading("EXECUTIVE SUMMARY", spacing::TITLE_GAP);

        let lines = [
            format!("Prepared for: {}", snapshot.client),
            format!("Project: {}", project.description),
            format!("Technology: {}", project.technology),
            format!("Estimated time: {}", project.timeline),
            format!(
                "Total price: {} (VAT not included)",
                self.money.amount(snapshot.totals.total)
            ),
        ];
        for line in lines {
            self.cursor.check_space(spacing::LINE_HEIGHT);
            self.cursor.text(0.0, line, TextStyle::LEAD);
            self.cursor.advance(spacing::LINE_HEIGHT);
        }

        self.cursor.advance(spacing::ITEM_GAP);
        self.cursor.divider();
    }

    fn scope(&mut self) {
        let project = self.project;
        if project.scope.is_empty() {
            skipped(Section::Scope, "no scope items");
            return;
        }

        self.cursor.check_space(spacing::PARAGRAPH_GAP + spacing::ITEM_GAP + spacing::SUB_ITEM_GAP);
        self.cursor.begin(Section::Scope);
        self.heading("PROJECT SCOPE", spacing::PARAGRAPH_GAP);
        self.cursor.text(0.0, "Included features:", TextStyle::SUBSECTION);
        self.cursor.advance(spacing::ITEM_GAP);

        self.bullets(&project.scope, spacing::SUB_ITEM_GAP);

        self.cursor.advance(spacing::PARAGRAPH_GAP);
        self.cursor.divider();
    }

    fn cost_breakdown(&mut self) {
        let project = self.project;
        if project.breakdown.is_empty() {
            skipped(Section::CostBreakdown, "no breakdown categories");
            return;
        }

        self.cursor.check_space(spacing::TITLE_GAP + BREAKDOWN_BLOCK);
        self.cursor.begin(Section::CostBreakdown);
        self.heading("COST BREAKDOWN", spacing::TITLE_GAP);

        for (index, category) in project.breakdown.iter().enumerate() {
            self.cursor.check_space(BREAKDOWN_BLOCK);
            self.cursor.rect(-3.0, 12.0, Fill::Panel);
            self.cursor.text_at(
                5.0,
                5.0,
                format!("{}. {} - {}", index + 1, category.category, self.money.amount(category.price)),
                TextStyle::SUBSECTION,
            );
            self.cursor.advance(spacing::SECTION_GAP);

            for item in &category.items {
                self.cursor.check_space(spacing::ITEM_GAP);
                self.cursor.text(10.0, format!("• {}", item.concept), TextStyle::DETAIL);
                self.cursor.advance(4.0);
                self.cursor.text(12.0, format!("  {}", item.description), TextStyle::DETAIL);
                self.cursor.text(
                    CONTENT_WIDTH - 25.0,
                    self.money.amount(item.price),
                    TextStyle::DETAIL.with_tone(Tone::Body),
                );
                self.cursor.advance(spacing::LINE_HEIGHT);
            }
            self.cursor.advance(spacing::SUB_ITEM_GAP);
        }
    }

    fn service_price(&self, service: &ServiceItem) -> String {
        if service.is_discount() {
            self.money.saving(service.price)
        } else {
            self.money.extra(service.price)
        }
    }

    fn selected_services(&mut self) {
        let snapshot = self.snapshot;
        let selected = snapshot.selection.services();
        if selected.is_empty() {
            skipped(Section::SelectedServices, "no services selected");
            return;
        }

        self.cursor.check_space(30.0);
        self.cursor.divider();
        self.cursor.begin(Section::SelectedServices);
        self.heading("SELECTED CUSTOM SERVICES", spacing::PARAGRAPH_GAP);
        self.cursor.text(0.0, "Additional services included in your budget:", TextStyle::LEAD);
        self.cursor.advance(spacing::TITLE_GAP);

        for service in selected {
            self.cursor.check_space(spacing::PARAGRAPH_GAP);
            let (band, tone) = if service.is_discount() {
                (Fill::SavingBand, Tone::Saving)
            } else {
                (Fill::ExtraBand, Tone::Extra)
            };
            self.cursor.rect(-2.0, 8.0, band);
            self.cursor.text_at(5.0, 3.0, format!("• {}", service.title), TextStyle::BODY_BOLD);
            self.cursor.text_at(
                CONTENT_WIDTH - 60.0,
                3.0,
                format!("{}: {}", service.kind.label(), self.service_price(service)),
                TextStyle::BODY_BOLD.with_tone(tone),
            );
            self.cursor.advance(spacing::PARAGRAPH_GAP);
        }
    }

    fn pages_and_features(&mut self) {
        let project = self.project;
        let Some(features) = project.pages_and_features.as_ref().filter(|f| !f.is_empty())
        else {
            skipped(Section::PagesAndFeatures, "no pages or integrations");
            return;
        };

        self.cursor.check_space(40.0);
        self.cursor.divider();
        self.cursor.begin(Section::PagesAndFeatures);
        self.heading("INCLUDED PAGES AND FEATURES", spacing::TITLE_GAP);

        self.cursor.text(0.0, "Main pages:", TextStyle::SUBSECTION);
        self.cursor.advance(spacing::ITEM_GAP);
        for page in &features.main_pages {
            self.cursor.check_space(spacing::LINE_HEIGHT);
            self.cursor.text(5.0, format!("• {}:", page.name), TextStyle::BODY_BOLD.with_tone(Tone::Brand));
            self.cursor.text(35.0, &page.description, TextStyle::BODY);
            self.cursor.advance(spacing::LINE_HEIGHT);
        }
        self.cursor.advance(spacing::SUB_ITEM_GAP);

        self.cursor.check_space(spacing::ITEM_GAP + spacing::SUB_ITEM_GAP);
        self.cursor.text(0.0, "Technical integrations:", TextStyle::SUBSECTION);
        self.cursor.advance(spacing::ITEM_GAP);
        self.bullets(&features.integrations, spacing::SUB_ITEM_GAP);
    }

    fn infrastructure(&mut self) {
        let shared = self.shared;
        let Some(infrastructure) = shared.infrastructure.as_ref() else {
            skipped(Section::Infrastructure, "no infrastructure block");
            return;
        };

        self.cursor.new_page();
        self.cursor.begin(Section::Infrastructure);
        self.heading("TECHNICAL INFRASTRUCTURE", spacing::SECTION_GAP);

        if let Some(email) = &infrastructure.email {
            self.cursor.text(0.0, "Email system:", TextStyle::GROUP);
            self.cursor.advance(spacing::ITEM_GAP);
            self.cursor.paragraph(0.0, &email.description, TextStyle::LEAD);
            self.cursor.advance(spacing::ITEM_GAP);

            for option in &email.options {
                self.cursor.check_space(spacing::ITEM_GAP);
                self.cursor.text(5.0, format!("• {}", option.name), TextStyle::BODY_BOLD);
                self.cursor.text_at(
                    8.0,
                    4.0,
                    format!("{} - {}", option.description, option.cost),
                    TextStyle::BODY,
                );
                self.cursor.advance(spacing::ITEM_GAP);
            }

            if !email.setup.is_empty() {
                self.cursor.paragraph(0.0, &email.setup, TextStyle::BODY);
            }
            self.cursor.advance(spacing::SECTION_GAP);
        }

        if let Some(hosting) = &infrastructure.hosting {
            self.cursor.check_space(spacing::SECTION_GAP);
            self.cursor.text(0.0, "Hosting and servers:", TextStyle::GROUP);
            self.cursor.advance(spacing::ITEM_GAP);
            self.cursor.paragraph(0.0, &hosting.description, TextStyle::LEAD);
            self.cursor.advance(spacing::PARAGRAPH_GAP);

            for option in &hosting.options {
                self.cursor.check_space(spacing::SECTION_GAP);
                self.cursor.text(
                    5.0,
                    format!("• {}: {}", capitalize(&option.kind), option.name),
                    TextStyle::BODY_BOLD,
                );
                self.cursor.advance(spacing::SUB_ITEM_GAP);
                self.cursor.text(8.0, format!("  {}", option.cost), TextStyle::BODY);
                self.cursor.advance(4.0);
                self.cursor.text(8.0, "  Includes:", TextStyle::BODY);
                self.cursor.advance(4.0);
                for included in &option.includes {
                    self.cursor.check_space(4.0);
                    self.cursor.text(10.0, format!("    - {included}"), TextStyle::BODY);
                    self.cursor.advance(4.0);
                }
                self.cursor.advance(3.0);
            }

            if let Some(decision) = &hosting.decision {
                self.cursor.advance(spacing::SUB_ITEM_GAP);
                self.cursor.check_space(spacing::ITEM_GAP);
                self.cursor.text(
                    0.0,
                    &decision.title,
                    TextStyle::LEAD.with_weight(Weight::Bold).with_tone(Tone::Strong),
                );
                self.cursor.advance(spacing::ITEM_GAP);
                self.bullets(&decision.options, spacing::SUB_ITEM_GAP);
            }
        }
    }

    fn timeline(&mut self) {
        let project = self.project;
        if project.schedule.is_empty() {
            skipped(Section::Timeline, "no schedule phases");
            return;
        }

        self.cursor.check_space(
            spacing::DIVIDER_GAP + spacing::TITLE_GAP + spacing::PARAGRAPH_GAP + SCHEDULE_HEADER,
        );
        self.cursor.divider();
        self.cursor.begin(Section::Timeline);
        self.heading("TIMELINE", spacing::TITLE_GAP);

        self.cursor.text(
            0.0,
            format!("BASE PROJECT ({}):", self.money.amount(project.base_price)),
            TextStyle::SUBSECTION,
        );
        self.cursor.advance(spacing::PARAGRAPH_GAP);
        self.schedule_header();

        for (index, phase) in project.schedule.iter().enumerate() {
            // Rows carried onto a new page get the column header again.
            if self.cursor.check_space(spacing::ITEM_GAP) {
                self.schedule_header();
            }
            if index % 2 == 0 {
                self.cursor.rect(-2.0, 8.0, Fill::Stripe);
            }
            self.cursor.text_at(10.0, 3.0, phase.week.to_string(), TextStyle::BODY_BOLD);
            self.cursor.text_at(30.0, 3.0, &phase.tasks, TextStyle::BODY);
            self.cursor.text_at(100.0, 3.0, &phase.deliverables, TextStyle::BODY);
            self.cursor.advance(spacing::ITEM_GAP);
        }

        if let Some(extras) = &project.schedule_extras {
            self.cursor.advance(spacing::PARAGRAPH_GAP);
            self.cursor.check_space(spacing::ITEM_GAP);
            self.cursor.text(0.0, &extras.title, TextStyle::SUBSECTION);
            self.cursor.advance(spacing::ITEM_GAP);

            for extra in &extras.extra_times {
                self.cursor.check_space(spacing::SUB_ITEM_GAP);
                self.cursor.text(5.0, format!("• {}: {}", extra.service, extra.time), TextStyle::BODY);
                self.cursor.advance(spacing::SUB_ITEM_GAP);
            }

            if let Some(note) = &extras.note {
                self.cursor.advance(spacing::SUB_ITEM_GAP);
                self.cursor.check_space(spacing::SUB_ITEM_GAP);
                self.cursor.paragraph(0.0, note, TextStyle::NOTE);
            }
        }
    }

    fn schedule_header(&mut self) {
        self.cursor.rect(0.0, 10.0, Fill::HeaderBand);
        let header = TextStyle::BODY_BOLD.with_tone(Tone::Inverse);
        self.cursor.text_at(5.0, 7.0, "Week", header);
        self.cursor.text_at(30.0, 7.0, "Tasks", header);
        self.cursor.text_at(100.0, 7.0, "Deliverables", header);
        self.cursor.advance(spacing::TITLE_GAP);
    }

    fn financial_summary(&mut self) {
        let snapshot = self.snapshot;
        let totals = snapshot.totals;

        let row = TextStyle::new(12.0, Weight::Normal, Tone::Body);
        let mut rows = vec![("Base project price:", self.money.amount(totals.base_price), Tone::Body)];
        if totals.savings.is_positive() {
            rows.push(("Discounts applied:", self.money.saving(totals.savings), Tone::Saving));
        }
        if totals.extras.is_positive() {
            rows.push(("Additional services:", self.money.extra(totals.extras), Tone::Extra));
        }

        // One row step per line, the rule, the total row and bottom padding.
        let box_height = spacing::ITEM_GAP * (rows.len() as f32 + 2.0) + 3.0 + spacing::LINE_HEIGHT;
        let monthly_note = if totals.monthly.is_positive() { spacing::ITEM_GAP } else { 0.0 };
        self.cursor.check_space(
            spacing::DIVIDER_GAP
                + spacing::SECTION_GAP
                + box_height
                + spacing::SUB_ITEM_GAP
                + monthly_note,
        );
        self.cursor.divider();
        self.cursor.begin(Section::FinancialSummary);
        self.heading("FINANCIAL SUMMARY", spacing::SECTION_GAP);

        let top = self.cursor.y();
        self.cursor.rect(0.0, box_height, Fill::Outline);

        let mut row_y = top + spacing::ITEM_GAP;
        for (label, value, tone) in rows {
            self.cursor.text_at_y(10.0, row_y, label, row.with_tone(tone));
            self.cursor.text_at_y(CONTENT_WIDTH - 40.0, row_y, value, row.with_tone(tone));
            row_y += spacing::ITEM_GAP;
        }

        row_y += 3.0;
        self.cursor.line_at(row_y, 10.0, CONTENT_WIDTH - 10.0, 1.0, Tone::Brand);
        row_y += spacing::ITEM_GAP;

        let total_style = TextStyle::GROUP;
        self.cursor.text_at_y(10.0, row_y, "TOTAL PRICE:", total_style);
        self.cursor.text_at_y(CONTENT_WIDTH - 40.0, row_y, self.money.amount(totals.total), total_style);

        self.cursor.advance(box_height + spacing::SUB_ITEM_GAP);

        if totals.monthly.is_positive() {
            self.cursor.text(
                0.0,
                format!("* Estimated monthly services: {}", self.money.monthly(totals.monthly)),
                TextStyle::LEAD.with_tone(Tone::Notice),
            );
            self.cursor.advance(spacing::ITEM_GAP);
        }
    }

    fn monthly_cost_examples(&mut self) {
        let shared = self.shared;
        let Some(examples) = shared.monthly_cost_examples.as_ref() else {
            skipped(Section::MonthlyCostExamples, "no monthly cost examples");
            return;
        };

        self.cursor.check_space(60.0);
        self.cursor.divider();
        self.cursor.begin(Section::MonthlyCostExamples);
        self.heading(&examples.title, spacing::SECTION_GAP);

        for case in &examples.cases {
            self.cursor.check_space(20.0);
            self.cursor.text(0.0, format!("{}:", case.name), TextStyle::SUBSECTION.with_tone(Tone::Strong));
            self.cursor.advance(spacing::ITEM_GAP);

            for component in &case.components {
                self.cursor.check_space(spacing::SUB_ITEM_GAP);
                self.cursor.text(5.0, format!("{}: {}", component.concept, component.cost), TextStyle::BODY);
                self.cursor.advance(spacing::SUB_ITEM_GAP);
            }

            self.cursor.text(5.0, format!("Total: {}", case.total), TextStyle::BODY_BOLD);
            self.cursor.advance(spacing::PARAGRAPH_GAP);
        }

        if !examples.note.is_empty() {
            self.cursor.check_space(spacing::SUB_ITEM_GAP);
            self.cursor.paragraph(0.0, &examples.note, TextStyle::NOTE);
        }
        self.cursor.advance(spacing::SECTION_GAP);
    }

    fn addon_catalog(&mut self) {
        let snapshot = self.snapshot;
        self.cursor.new_page();
        self.cursor.begin(Section::AddonCatalog);
        self.heading("AVAILABLE ADDITIONAL SERVICES", spacing::SUB_ITEM_GAP);
        self.cursor.text(0.0, "(Web development only)", TextStyle::BODY.with_tone(Tone::Muted));
        self.cursor.advance(spacing::SECTION_GAP);

        let mut groups: Vec<(&str, Vec<&ServiceItem>)> = Vec::new();
        for service in snapshot.catalog.listed_services() {
            match groups.iter_mut().find(|(section, _)| *section == service.section) {
                Some((_, services)) => services.push(service),
                None => groups.push((service.section.as_str(), vec![service])),
            }
        }

        if groups.is_empty() {
            debug!(
                event_name = "budget.export.section_skipped",
                section = Section::AddonCatalog.name(),
                reason = "no listed services",
                "add-on catalog has no entries"
            );
        }

        for (section, services) in groups {
            self.cursor.check_space(20.0);
            self.cursor.text(0.0, section.to_uppercase(), TextStyle::GROUP);
            self.cursor.advance(spacing::TITLE_GAP);

            for service in services {
                self.cursor.check_space(spacing::TITLE_GAP);
                self.cursor.text(5.0, format!("• {}", service.title), TextStyle::BODY_BOLD);
                self.cursor.text_at(8.0, 5.0, &service.description, TextStyle::DETAIL);
                let tone = if service.is_discount() { Tone::Saving } else { Tone::Extra };
                self.cursor.text(
                    CONTENT_WIDTH - 30.0,
                    self.service_price(service),
                    TextStyle::BODY_BOLD.with_tone(tone),
                );
                self.cursor.advance(spacing::TITLE_GAP);
            }
            self.cursor.advance(spacing::ITEM_GAP);
        }
    }

    fn payment_terms(&mut self) {
        let (snapshot, shared) = (self.snapshot, self.shared);
        let Some(terms) = shared.payment_terms.as_ref() else {
            skipped(Section::PaymentTerms, "no payment terms");
            return;
        };

        self.cursor.new_page();
        self.cursor.begin(Section::PaymentTerms);
        self.heading("PAYMENT TERMS", spacing::TITLE_GAP);

        if !terms.description.is_empty() {
            self.cursor.paragraph(0.0, &terms.description, TextStyle::LEAD);
            self.cursor.advance(spacing::ITEM_GAP);
        }

        let (upfront, delivery) = terms.split.installments(snapshot.totals.total);
        self.cursor.check_space(3.0 * spacing::LINE_HEIGHT + 2.0);
        let lines = [
            format!("• {}% at project start: {}", terms.split.upfront_pct, self.money.amount(upfront)),
            format!("• {}% on delivery: {}", terms.split.delivery_pct, self.money.amount(delivery)),
            format!("• Payment methods: {}", terms.methods.join(" or ")),
        ];
        let count = lines.len();
        for (index, line) in lines.into_iter().enumerate() {
            self.cursor.text(0.0, line, TextStyle::LEAD);
            if index + 1 < count {
                self.cursor.advance(spacing::LINE_HEIGHT + 1.0);
            }
        }
        self.cursor.advance(spacing::SECTION_GAP);

        self.cursor.divider();
    }

    fn clarifications(&mut self) {
        let shared = self.shared;
        let Some(clarifications) = shared.clarifications.as_ref() else {
            skipped(Section::Clarifications, "no clarifications");
            return;
        };

        self.cursor.check_space(spacing::SECTION_GAP + spacing::PARAGRAPH_GAP);
        self.cursor.begin(Section::Clarifications);
        self.heading("IMPORTANT CLARIFICATIONS", spacing::SECTION_GAP);

        let lists = [
            ("INCLUDED IN THE BASE PRICE:", &clarifications.included),
            ("NOT INCLUDED (additional services):", &clarifications.excluded),
        ];
        for (title, items) in lists {
            if items.is_empty() {
                continue;
            }
            self.cursor.check_space(spacing::PARAGRAPH_GAP);
            self.cursor.text(0.0, title, TextStyle::SUBSECTION.with_tone(Tone::Strong));
            self.cursor.advance(spacing::PARAGRAPH_GAP);
            self.bullets(items, spacing::SUB_ITEM_GAP);
            self.cursor.advance(spacing::ITEM_GAP);
        }

        for topic in &clarifications.topics {
            self.cursor.check_space(spacing::SECTION_GAP);
            self.cursor.text(0.0, &topic.title, TextStyle::LEAD.with_weight(Weight::Bold));
            self.cursor.advance(spacing::LINE_HEIGHT);
            self.cursor.text(5.0, format!("Included: {}", topic.included), TextStyle::DETAIL);
            self.cursor.advance(4.0);
            self.cursor.text(5.0, format!("Not included: {}", topic.excluded), TextStyle::DETAIL);
            self.cursor.advance(spacing::ITEM_GAP);
        }
    }

    fn next_steps(&mut self) {
        let (snapshot, project, shared) = (self.snapshot, self.project, self.shared);
        let Some(next) = shared.next_steps.as_ref() else {
            skipped(Section::NextSteps, "no next steps");
            return;
        };

        self.cursor.check_space(40.0);
        self.cursor.divider();
        self.cursor.begin(Section::NextSteps);
        self.heading("NEXT STEP", spacing::TITLE_GAP);

        self.cursor.text(0.0, &next.title, TextStyle::SUBSECTION);
        self.cursor.advance(spacing::ITEM_GAP);
        self.bullets(&next.goals, spacing::SUB_ITEM_GAP);
        self.cursor.advance(spacing::PARAGRAPH_GAP);

        let contact = snapshot.catalog.contact();
        self.cursor.check_space(25.0 + spacing::SECTION_GAP + 2.0 * spacing::SUB_ITEM_GAP);
        self.cursor.rect(0.0, 25.0, Fill::Panel);
        self.cursor.text_at(10.0, 8.0, "CONTACT", TextStyle::SUBSECTION);
        self.cursor.advance(spacing::SECTION_GAP);
        self.cursor.text(10.0, format!("Phone: {}", contact.phone), TextStyle::LEAD.with_tone(Tone::Brand));
        self.cursor.advance(spacing::LINE_HEIGHT);
        self.cursor.text(10.0, format!("Email: {}", contact.email), TextStyle::LEAD.with_tone(Tone::Brand));
        self.cursor.advance(spacing::SECTION_GAP);

        let closing = [
            format!("• Budget valid for: {}", shared.validity_or_default()),
            format!("• Execution time: {}", project.timeline),
            "• Additional services: can be added during or after development".to_string(),
        ];
        for line in closing {
            self.cursor.text(0.0, line, TextStyle::DETAIL);
            self.cursor.advance(spacing::SUB_ITEM_GAP);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use budgetkit_core::domain::project::{BreakdownCategory, BreakdownItem, ProjectCatalog};
    use budgetkit_core::domain::shared::{NextSteps, PaymentSplit, PaymentTerms, SharedCatalog};
    use budgetkit_core::{
        Catalog, ContactInfo, ExportSnapshot, ItemId, MaintenanceItem, Money, SelectionEngine,
        ServiceItem, ServiceKind,
    };
    use chrono::NaiveDate;

    use super::{ExportSettings, ReportExporter};
    use crate::layout::Section;

    fn catalog() -> Catalog {
        let project = ProjectCatalog {
            id: "reformas".to_string(),
            company: "García Reformas S.L.".to_string(),
            base_price: Money::new(2000),
            technology: "Static site".to_string(),
            timeline: "4 weeks".to_string(),
            description: "Corporate website".to_string(),
            breakdown: vec![BreakdownCategory {
                category: "Design".to_string(),
                price: Money::new(800),
                items: vec![BreakdownItem {
                    concept: "Mockups".to_string(),
                    description: "Three pages".to_string(),
                    price: Money::new(800),
                }],
            }],
            services: vec![ServiceItem {
                id: ItemId::from("own-logo"),
                title: "Client provides logo".to_string(),
                description: String::new(),
                price: Money::new(-300),
                kind: ServiceKind::Discount,
                section: "Branding".to_string(),
            }],
            ..ProjectCatalog::default()
        };
        let shared = SharedCatalog {
            contact: ContactInfo {
                phone: "+34 611 111 111".to_string(),
                email: "hello@example.com".to_string(),
                ..ContactInfo::default()
            },
            payment_terms: Some(PaymentTerms {
                description: String::new(),
                split: PaymentSplit { upfront_pct: 50, delivery_pct: 50 },
                methods: vec!["transfer".to_string(), "card".to_string()],
            }),
            next_steps: Some(NextSteps {
                title: "Kick-off".to_string(),
                goals: vec!["Sign the budget".to_string()],
            }),
            maintenance: vec![MaintenanceItem {
                id: ItemId::from("basic"),
                title: "Basic".to_string(),
                description: String::new(),
                price: Money::new(25),
            }],
            ..SharedCatalog::default()
        };
        Catalog::new(project, shared)
    }

    fn snapshot(select: bool) -> ExportSnapshot {
        let catalog = Arc::new(catalog());
        let mut engine = SelectionEngine::new(catalog.project.base_price);
        if select {
            engine.toggle_service(&catalog.project.services[0]);
            engine.toggle_maintenance(&catalog.shared.maintenance[0]);
        }
        let date = NaiveDate::from_ymd_opt(2026, 10, 14).expect("date");
        ExportSnapshot::new(catalog, "García Reformas S.L.".to_string(), &engine, date)
    }

    #[test]
    fn selected_discount_shows_negative_delta_and_label() {
        let document = ReportExporter::default().export(&snapshot(true));

        assert!(document.has_section(Section::SelectedServices));
        assert!(document.contains_text("DISCOUNT: -300 €"));
        assert!(document.contains_text("Discounts applied:"));
        assert!(document.contains_text("* Estimated monthly services: 25 €/month"));
        assert!(document.contains_text("TOTAL PRICE:"));
        assert!(document.contains_text("1700 €"));
    }

    #[test]
    fn payment_installments_are_computed_from_the_total() {
        let document = ReportExporter::default().export(&snapshot(true));

        assert!(document.contains_text("• 50% at project start: 850 €"));
        assert!(document.contains_text("• 50% on delivery: 850 €"));
        assert!(document.contains_text("• Payment methods: transfer or card"));
    }

    #[test]
    fn currency_symbol_comes_from_settings() {
        let exporter = ReportExporter::new(ExportSettings::with_currency("USD"));
        let document = exporter.export(&snapshot(false));

        assert!(document.contains_text("Total price: 2000 USD (VAT not included)"));
        assert!(!document.contains_text("Discounts applied:"));
    }

    #[test]
    fn footer_date_uses_day_month_year() {
        let document = ReportExporter::default().export(&snapshot(false));
        let last = document.pages().last().expect("at least one page");

        assert!(last.contains_text("Generated automatically - 14/10/2026"));
        assert!(last.contains_text("+34 611 111 111 | hello@example.com"));
    }
}
