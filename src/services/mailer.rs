use crate::core::LanguageTable;
use crate::models::MatchRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while composing or delivering introduction mails
#[derive(Debug, Error)]
pub enum MailError {
    #[error("template for '{language}' uses unknown placeholder '{{{placeholder}}}'")]
    UnknownPlaceholder { language: String, placeholder: String },

    #[error("template for '{language}' has an unbalanced brace at byte {position}")]
    UnbalancedBrace { language: String, position: usize },

    #[error("no mail template for language '{0}'")]
    UnknownLanguage(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A rendered introduction mail for one matched pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub language: String,
    pub subject: String,
    pub body: String,
}

/// Render `{field}` placeholders from a match record; `{{` and `}}` are literal braces.
pub fn render_template(language: &str, template: &str, record: &MatchRecord) -> Result<String, MailError> {
    let unbalanced = |position| MailError::UnbalancedBrace {
        language: language.to_string(),
        position,
    };

    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((position, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, '{')) | None => return Err(unbalanced(position)),
                        Some((_, ch)) => name.push(ch),
                    }
                }
                let value = record.field(name.trim()).ok_or_else(|| MailError::UnknownPlaceholder {
                    language: language.to_string(),
                    placeholder: name.clone(),
                })?;
                out.push_str(&value);
            }
            '}' => return Err(unbalanced(position)),
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Picks the template for each match by its selected language.
#[derive(Debug, Clone, Copy)]
pub struct MailComposer<'a> {
    languages: &'a LanguageTable,
    ascii_only: bool,
}

impl<'a> MailComposer<'a> {
    pub fn new(languages: &'a LanguageTable) -> Self {
        Self {
            languages,
            ascii_only: false,
        }
    }

    /// Transliterate rendered text to ASCII, e.g. "Élodie" becomes "Elodie".
    pub fn with_ascii_folding(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }

    pub fn compose(&self, record: &MatchRecord) -> Result<OutgoingMail, MailError> {
        let entry = self
            .languages
            .get(&record.language)
            .ok_or_else(|| MailError::UnknownLanguage(record.language.clone()))?;

        let subject = render_template(&entry.name, &entry.subject, record)?;
        let body = render_template(&entry.name, &entry.template, record)?;

        Ok(OutgoingMail {
            to: vec![record.fr_email.clone(), record.ex_email.clone()],
            language: entry.name.clone(),
            subject: self.fold(subject),
            body: self.fold(body),
        })
    }

    fn fold(&self, text: String) -> String {
        if self.ascii_only {
            deunicode::deunicode(&text)
        } else {
            text
        }
    }

    pub fn compose_all(&self, records: &[MatchRecord]) -> Result<Vec<OutgoingMail>, MailError> {
        records.iter().map(|record| self.compose(record)).collect()
    }
}

/// Delivery seam for composed mails.
pub trait MailTransport {
    fn deliver(&mut self, mails: &[OutgoingMail]) -> Result<usize, MailError>;
}

/// Writes composed mails to a JSON outbox file for review or a separate sender.
#[derive(Debug, Clone)]
pub struct OutboxTransport {
    path: PathBuf,
}

impl OutboxTransport {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MailTransport for OutboxTransport {
    fn deliver(&mut self, mails: &[OutgoingMail]) -> Result<usize, MailError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        let json = serde_json::to_vec_pretty(mails)?;
        fs::write(&temp, json).map_err(io_error(&temp))?;
        if let Err(source) = fs::rename(&temp, &self.path) {
            fs::remove_file(&temp).ok();
            return Err(MailError::Io {
                path: self.path.clone(),
                source,
            });
        }

        for mail in mails {
            debug!(to = ?mail.to, language = %mail.language, "mail queued");
        }
        info!(path = %self.path.display(), mails = mails.len(), "outbox written");
        Ok(mails.len())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MailError {
    let path = path.to_path_buf();
    move |source| MailError::Io { path, source }
}
