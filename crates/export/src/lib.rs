pub mod artifact;
pub mod error;
pub mod format;
pub mod launch;
pub mod layout;
pub mod render;
pub mod report;
pub mod share;

pub use artifact::{file_name, ArtifactWriter};
pub use error::ExportError;
pub use format::MoneyFormat;
pub use launch::{ChannelLauncher, RecordingLauncher, SystemLauncher};
pub use layout::{Document, Element, Page, Section, SectionStart};
pub use render::{DocumentRenderer, OutputFormat, RenderedArtifact};
pub use report::{ExportSettings, ReportExporter};
pub use share::{email_draft, mailto_link, message_summary, whatsapp_link, EmailDraft};
