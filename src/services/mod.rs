// Service exports
pub mod export;
pub mod mailer;
pub mod survey;

pub use export::{read_matches, ExportError, ResultWriter, RunArtifacts};
pub use mailer::{render_template, MailComposer, MailError, MailTransport, OutboxTransport, OutgoingMail};
pub use survey::{SurveyError, SurveyReader};
