use std::{fmt::Display, path::PathBuf, str::FromStr};

use structopt::StructOpt;

use crate::attack::{bundle::DataSource, Framework};

mod interactive;
mod matrix;

pub use matrix::{generate_matrices, output_file_name, MatrixFile};

#[derive(Debug, Default, Clone, Copy)]
pub enum Output {
    JSON,
    #[default]
    STDOUT,
}

impl FromStr for Output {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Output::JSON),
            "stdout" => Ok(Output::STDOUT),
            _ => Err(crate::error::Error::InvalidValue(format!(
                "output type {} is not valid",
                s
            ))),
        }
    }
}

impl Display for Output {
    fn fmt(&self, std_fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            std_fmt,
            "{}",
            match self {
                Output::STDOUT => "stdout",
                Output::JSON => "json",
            }
        )
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct SourceOpts {
    /// Read the STIX bundle from a local file instead of downloading it
    #[structopt(long, parse(from_os_str))]
    source: Option<PathBuf>,

    /// Download the bundle even when a cached copy exists
    #[structopt(long)]
    refresh: bool,

    /// Neither read nor write the local bundle cache
    #[structopt(long)]
    no_cache: bool,
}

impl SourceOpts {
    fn data_source(&self) -> Result<DataSource, crate::error::Error> {
        if let Some(path) = &self.source {
            return Ok(DataSource::Local(path.clone()));
        }

        if self.no_cache {
            return Ok(DataSource::Remote);
        }

        return Ok(DataSource::Cached {
            dir: crate::config_dir()?.join("attack"),
            refresh: self.refresh,
        });
    }
}

#[derive(StructOpt)]
#[structopt(no_version)]
pub enum Command {
    /// List the platforms covered by an ATT&CK framework
    Platforms {
        /// Framework to inspect (enterprise, mobile, ics)
        #[structopt(long)]
        framework: Framework,

        #[structopt(flatten)]
        source: SourceOpts,

        /// Output command result to stdout or as JSON
        #[structopt(long, default_value)]
        output: Output,
    },
    /// Print the tactic, technique and subtechnique tree of one platform
    Tree {
        /// Framework to inspect (enterprise, mobile, ics)
        #[structopt(long)]
        framework: Framework,

        /// Platform to filter techniques by
        #[structopt(long)]
        platform: String,

        #[structopt(flatten)]
        source: SourceOpts,

        /// Output command result to stdout or as JSON
        #[structopt(long, default_value)]
        output: Output,
    },
    /// Generate one spreadsheet per selected platform
    Generate {
        /// Framework to render (enterprise, mobile, ics)
        #[structopt(long)]
        framework: Framework,

        /// Comma separated platforms to render
        #[structopt(long, use_delimiter = true)]
        platforms: Vec<String>,

        /// Render every platform of the framework
        #[structopt(long)]
        all_platforms: bool,

        /// Directory receiving the generated files
        #[structopt(long, default_value = "mitre_matrices", parse(from_os_str))]
        output_dir: PathBuf,

        #[structopt(flatten)]
        source: SourceOpts,
    },
    /// Pick a framework and platforms from a menu
    Interactive {
        /// Directory receiving the generated files
        #[structopt(long, default_value = "mitre_matrices", parse(from_os_str))]
        output_dir: PathBuf,

        #[structopt(flatten)]
        source: SourceOpts,
    },
}

#[derive(StructOpt)]
#[structopt(
    name = "mitre_matrix",
    about = "Renders MITRE ATT&CK matrices into spreadsheets.",
    no_version
)]
pub struct Cli {
    /// Network timeout in seconds when downloading framework data
    #[structopt(long, default_value = "60")]
    pub timeout: u64,

    #[structopt(subcommand)]
    pub command: Command,
}

impl Command {
    pub fn handle(self, req_client: impl crate::WebFetch) -> Result<(), crate::error::Error> {
        match self {
            Command::Platforms {
                framework,
                source,
                output,
            } => matrix::handle_platforms(framework, &source.data_source()?, output, &req_client)?,
            Command::Tree {
                framework,
                ref platform,
                ref source,
                output,
            } => matrix::handle_tree(
                framework,
                platform,
                &source.data_source()?,
                output,
                &req_client,
            )?,
            Command::Generate {
                framework,
                ref platforms,
                all_platforms,
                ref output_dir,
                ref source,
            } => matrix::handle_generate(
                framework,
                platforms,
                all_platforms,
                output_dir,
                &source.data_source()?,
                &req_client,
            )?,
            Command::Interactive {
                ref output_dir,
                ref source,
            } => {
                let stdin = std::io::stdin();
                let mut stdout = std::io::stdout();

                interactive::run(
                    &mut stdin.lock(),
                    &mut stdout,
                    &source.data_source()?,
                    output_dir,
                    &req_client,
                )?;
            }
        };

        return Ok(());
    }
}
