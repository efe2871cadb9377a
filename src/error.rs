use thiserror::Error;

/// Problems in the matching rules document, reported before any scoring starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read rules document: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed rules document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("criterion '{criterion}' uses unknown kind '{kind}'")]
    UnknownCriterionKind { criterion: String, kind: String },

    #[error("criterion '{criterion}' uses unknown condition kind '{kind}'")]
    UnknownConditionKind { criterion: String, kind: String },

    #[error("criterion '{criterion}' is missing required parameter '{parameter}'")]
    MissingParameter {
        criterion: String,
        parameter: &'static str,
    },

    #[error("criterion '{criterion}' has invalid parameters: {source}")]
    InvalidParameters {
        criterion: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("criterion '{criterion}' has a degenerate transform table: {reason}")]
    DegenerateTransform { criterion: String, reason: String },

    #[error("criterion '{criterion}' ranks {n} answers, at least 2 are required")]
    RankTooShort { criterion: String, n: usize },

    #[error("criterion '{criterion}' has invalid scale {scale}, expected a finite value >= 0")]
    InvalidScale { criterion: String, scale: f64 },

    #[error("criterion '{0}' is defined more than once")]
    DuplicateCriterion(String),

    #[error("default language '{0}' is not in the supported language list")]
    UnknownDefaultLanguage(String),

    #[error("supported language '{0}' is listed more than once")]
    DuplicateLanguage(String),

    #[error("invalid rules document: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// A respondent record that cannot be scored as configured.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("question '{0}' is absent from the respondent record")]
    MissingQuestion(String),

    #[error("ranked field '{field}' is absent ({n} ranked answers expected)")]
    MissingRank { field: String, n: usize },

    #[error("answer '{value}' to '{question}' is not a number")]
    InvalidNumber { question: String, value: String },

    #[error("answer '{value}' to '{question}' is not a yes/no flag")]
    NotBoolean { question: String, value: String },

    #[error("answer '{value}' to '{question}' has no entry in the lookup table")]
    UnmappedAnswer { question: String, value: String },

    #[error("both answer sets to '{0}' are empty")]
    EmptyAnswerSets(String),
}

/// Failure of the assignment solver or of its output contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("cost matrix has {actual} cells, expected {rows}x{cols}")]
    Shape {
        rows: usize,
        cols: usize,
        actual: usize,
    },

    #[error("cost at ({row}, {col}) is {value}, expected a finite value >= 0")]
    InvalidCost { row: usize, col: usize, value: f64 },

    #[error("no augmenting path found for row {0}")]
    Infeasible(usize),

    #[error("solver returned {actual} pairs, expected {expected}")]
    WrongPairCount { expected: usize, actual: usize },

    #[error("solver returned pair ({row}, {col}) outside or reusing the matrix indices")]
    InvalidPair { row: usize, col: usize },
}

/// Scoring failure of one criterion for one pair.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("criterion '{criterion}': {source}")]
pub struct ScoreError {
    pub criterion: String,
    #[source]
    pub source: DataError,
}

/// Errors raised by a matching run.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("pair (domestic {row}, incoming {col}): {source}")]
    Pair {
        row: usize,
        col: usize,
        #[source]
        source: ScoreError,
    },

    #[error("pair (domestic {row}, incoming {col}) has non-finite total cost {value}")]
    NonFiniteCost { row: usize, col: usize, value: f64 },

    #[error("solver error: {0}")]
    Solver(#[from] SolverError),
}

/// Top-level error of the command line application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] crate::config::SettingsError),

    #[error(transparent)]
    Telemetry(#[from] crate::telemetry::TelemetryError),

    #[error("rules error: {0}")]
    Rules(#[from] ConfigError),

    #[error("matching failed: {0}")]
    Match(#[from] MatchError),

    #[error("survey error: {0}")]
    Survey(#[from] crate::services::SurveyError),

    #[error("export error: {0}")]
    Export(#[from] crate::services::ExportError),

    #[error("mail error: {0}")]
    Mail(#[from] crate::services::MailError),

    #[error("unmatched respondent could not be described: {0}")]
    Data(#[from] DataError),
}
