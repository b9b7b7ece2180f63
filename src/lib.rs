#[macro_use]
extern crate lazy_static;
pub mod attack;
pub mod commands;
pub mod error;
pub mod render;

use std::time::Duration;

lazy_static! {
    static ref PATH_HOSTILE_RE: regex::Regex = regex::Regex::new(r#"[/\\:*?"<>|]"#).unwrap();
    static ref WHITESPACE_RE: regex::Regex = regex::Regex::new(r"\s+").unwrap();
}

/// Makes `text` usable as a single file name component.
pub fn sanitize_file_component(text: &str) -> String {
    let replaced = PATH_HOSTILE_RE.replace_all(text.trim(), "_");

    return WHITESPACE_RE.replace_all(&replaced, " ").to_string();
}

pub fn config_dir() -> Result<std::path::PathBuf, error::Error> {
    return match home::home_dir() {
        Some(home) => Ok(home.join(".mitre_matrix")),
        None => Err(error::Error::IO(String::from(
            "unable to resolve the user's home directory",
        ))),
    };
}

pub trait WebFetch {
    fn fetch(&self, url: &str) -> Result<String, error::Error>;
}

pub struct HttpReqwest {
    timeout: Duration,
}

impl WebFetch for HttpReqwest {
    fn fetch(&self, url: &str) -> Result<String, error::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        match client.get(url).send() {
            Ok(get_response) => match get_response.error_for_status() {
                Ok(resp) => match resp.text() {
                    Ok(text) => Ok(text),
                    Err(err) => Err(error::Error::from(err)),
                },
                Err(err) => Err(error::Error::from(err)),
            },
            Err(err) => Err(error::Error::from(err)),
        }
    }
}

impl HttpReqwest {
    pub fn with_timeout(timeout: Duration) -> Self {
        return Self { timeout };
    }
}
