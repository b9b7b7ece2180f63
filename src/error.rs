use std::fmt::Display;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    InvalidFramework(String),
    DataUnavailable(String),
    Parser(String),
    Write(String),
    IO(String),
    InvalidValue(String),
    General(String),
}

impl Error {
    /// Whether the orchestration layer may retry the failed step.
    pub fn is_retryable(&self) -> bool {
        return matches!(self, Error::DataUnavailable(_) | Error::Write(_) | Error::IO(_));
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        return Self::DataUnavailable(format!("Reqwest error: {}", err.to_string()));
    }
}

impl From<&'static str> for Error {
    fn from(str_err: &'static str) -> Self {
        Error::General(String::from(str_err))
    }
}

impl From<String> for Error {
    fn from(str_err: String) -> Self {
        Error::General(str_err)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::IO(value.to_string())
    }
}

impl From<serde_json::error::Error> for Error {
    fn from(value: serde_json::error::Error) -> Self {
        Self::Parser(value.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::Write(value.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidFramework(msg) => write!(f, "invalid framework: {}", msg),
            Error::DataUnavailable(msg) => write!(f, "framework data unavailable: {}", msg),
            Error::Parser(msg) => write!(f, "unable to parse framework data: {}", msg),
            Error::Write(msg) => write!(f, "unable to write spreadsheet: {}", msg),
            _ => write!(f, "{:?}", self),
        }
    }
}
