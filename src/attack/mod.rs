use std::{fmt::Display, str::FromStr};

use serde::Serialize;

pub mod bundle;
pub mod matrix;

/// One of the three ATT&CK knowledge bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    ENTERPRISE,
    MOBILE,
    ICS,
}

impl Framework {
    pub const ALL: [Framework; 3] = [Framework::ENTERPRISE, Framework::MOBILE, Framework::ICS];

    /// Lowercase name used in URLs, cache files and output file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::ENTERPRISE => "enterprise",
            Self::MOBILE => "mobile",
            Self::ICS => "ics",
        }
    }
}

impl FromStr for Framework {
    type Err = crate::error::Error;

    fn from_str(dom_str: &str) -> Result<Self, Self::Err> {
        match dom_str.trim().to_lowercase().as_str() {
            "enterprise" => Ok(Self::ENTERPRISE),
            "mobile" => Ok(Self::MOBILE),
            "ics" => Ok(Self::ICS),
            _ => Err(crate::error::Error::InvalidFramework(format!(
                "{} is not a valid ATT&CK framework (enterprise, mobile, ics)",
                dom_str
            ))),
        }
    }
}

impl Into<&'static str> for Framework {
    fn into(self) -> &'static str {
        match self {
            Self::ENTERPRISE => "https://raw.githubusercontent.com/mitre/cti/master/enterprise-attack/enterprise-attack.json",
            Self::MOBILE => "https://raw.githubusercontent.com/mitre/cti/master/mobile-attack/mobile-attack.json",
            Self::ICS => "https://raw.githubusercontent.com/mitre/cti/master/ics-attack/ics-attack.json",
        }
    }
}

impl Display for Framework {
    fn fmt(&self, std_fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            std_fmt,
            "{}",
            match self {
                Self::ENTERPRISE => "Enterprise",
                Self::MOBILE => "Mobile",
                Self::ICS => "ICS",
            }
        )
    }
}
