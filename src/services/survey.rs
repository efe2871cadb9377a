use crate::models::{Respondent, RespondentGroup};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while reading a survey export
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("failed to open survey export {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid survey CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("question '{0}' appears more than once in the header")]
    DuplicateQuestion(String),

    #[error("expected {expected} title rows after the header, found {found} rows")]
    MissingTitleRows { expected: usize, found: usize },
}

/// Reads survey exports: one header row of question labels, title rows, then answers.
#[derive(Debug, Clone, Copy)]
pub struct SurveyReader {
    title_rows: usize,
}

impl Default for SurveyReader {
    fn default() -> Self {
        Self { title_rows: 2 }
    }
}

impl SurveyReader {
    pub fn new(title_rows: usize) -> Self {
        Self { title_rows }
    }

    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<RespondentGroup, SurveyError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| SurveyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let group = self.read(file)?;
        debug!(path = %path.display(), respondents = group.len(), "survey export read");
        Ok(group)
    }

    pub fn read<R: Read>(&self, reader: R) -> Result<RespondentGroup, SurveyError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        let mut seen = HashSet::new();
        if let Some(dup) = headers.iter().find(|h| !seen.insert(h.as_str())) {
            return Err(SurveyError::DuplicateQuestion(dup.clone()));
        }

        let records = csv_reader
            .records()
            .collect::<Result<Vec<_>, _>>()?;
        if records.len() < self.title_rows {
            return Err(SurveyError::MissingTitleRows {
                expected: self.title_rows,
                found: records.len(),
            });
        }

        let mut rows: Vec<Vec<String>> = records
            .iter()
            .skip(self.title_rows)
            .map(|record| record.iter().map(str::to_string).collect())
            .collect();

        for (col, question) in headers.iter().enumerate() {
            impute_column(&mut rows, col, question);
        }

        let respondents = rows
            .into_iter()
            .map(|row| Respondent::from_pairs(headers.iter().cloned().zip(row)))
            .collect::<Vec<_>>();
        Ok(RespondentGroup::new(respondents))
    }
}

/// Fill empty answers of one column with its most frequent answer.
///
/// Ties go to the lexicographically smallest value.
fn impute_column(rows: &mut [Vec<String>], col: usize, question: &str) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in rows.iter().filter_map(|row| row.get(col)) {
        if !value.is_empty() {
            *counts.entry(value.as_str()).or_default() += 1;
        }
    }

    let mut mode: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if mode.map_or(true, |(_, best)| count > best) {
            mode = Some((value, count));
        }
    }
    let mode = match mode {
        Some((value, _)) => value.to_string(),
        None => {
            if !rows.is_empty() {
                warn!(question, "no answers to impute from, column left empty");
            }
            return;
        }
    };

    let mut filled = 0;
    for cell in rows.iter_mut().filter_map(|row| row.get_mut(col)) {
        if cell.is_empty() {
            cell.clone_from(&mode);
            filled += 1;
        }
    }
    if filled > 0 {
        debug!(question, filled, value = %mode, "imputed missing answers");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
Q1,Q7,Q21
First name,Capacity,Hobbies
QID1,QID7,QID21
Alice,Yes,\"Tennis,Chess\"
Bob,,Chess
Carol,No,
Dan,No,Tennis
";

    #[test]
    fn test_title_rows_are_skipped() {
        let group = SurveyReader::default().read(EXPORT.as_bytes()).unwrap();
        assert_eq!(group.len(), 4);
        assert_eq!(group.get(0).unwrap().get("Q1"), Some("Alice"));
    }

    #[test]
    fn test_missing_answers_take_the_column_mode() {
        let group = SurveyReader::default().read(EXPORT.as_bytes()).unwrap();
        assert_eq!(group.get(1).unwrap().get("Q7"), Some("No"));
    }

    #[test]
    fn test_mode_ties_pick_smallest_value() {
        let group = SurveyReader::default().read(EXPORT.as_bytes()).unwrap();
        // "Chess", "Tennis" and "Tennis,Chess" each appear once
        assert_eq!(group.get(2).unwrap().get("Q21"), Some("Chess"));
    }

    #[test]
    fn test_zero_title_rows() {
        let data = "Q1,Q7\nAlice,Yes\n";
        let group = SurveyReader::new(0).read(data.as_bytes()).unwrap();
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_duplicate_header_is_rejected() {
        let err = SurveyReader::new(0).read("Q1,Q1\na,b\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SurveyError::DuplicateQuestion(ref q) if q == "Q1"));
    }

    #[test]
    fn test_short_file_reports_missing_title_rows() {
        let err = SurveyReader::new(2).read("Q1\ntitle\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SurveyError::MissingTitleRows { expected: 2, found: 1 }));
    }
}
