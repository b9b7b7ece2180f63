use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::Output;
use crate::{
    attack::{
        bundle::{list_available_platforms, DataSource, FrameworkBundle},
        matrix, Framework,
    },
    error, render, sanitize_file_component, WebFetch,
};

const OUTPUT_PREFIX: &'static str = "MITRE_ATT&CK";

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixFile {
    pub platform: String,
    pub path: PathBuf,
    pub technique_count: usize,
}

/// `MITRE_ATT&CK_<framework>_<platform>_<YYYYMMDD>.xlsx`
pub fn output_file_name(framework: Framework, platform: &str, date: NaiveDate) -> String {
    return format!(
        "{}_{}_{}_{}.xlsx",
        OUTPUT_PREFIX,
        framework.slug(),
        sanitize_file_component(platform),
        date.format("%Y%m%d")
    );
}

/// Runs build and render for every platform in turn. A failed platform does
/// not stop the others; only an unusable output directory aborts the run.
pub fn generate_matrices(
    bundle: &FrameworkBundle,
    platforms: &[String],
    output_dir: &Path,
    date: NaiveDate,
) -> Result<Vec<(String, Result<MatrixFile, error::Error>)>, error::Error> {
    if !output_dir.exists() {
        log::info!("Creating output directory '{}'", output_dir.display());
        std::fs::create_dir_all(output_dir).map_err(|err| {
            error::Error::Write(format!("{}: {}", output_dir.display(), err))
        })?;
    }

    let mut outcomes = Vec::with_capacity(platforms.len());

    for platform in platforms {
        log::info!("Building {} matrix for {}", bundle.framework(), platform);
        let tree = matrix::build(bundle, platform);

        if tree.is_empty() {
            log::warn!(
                "No {} techniques match platform '{}'; the spreadsheet will be empty",
                bundle.framework(),
                platform
            );
        }

        let path = output_dir.join(output_file_name(bundle.framework(), platform, date));
        let outcome = render::render(&tree, &path).map(|_| MatrixFile {
            platform: platform.clone(),
            path,
            technique_count: tree.technique_count(),
        });

        match &outcome {
            Ok(file) => log::info!("Created '{}'", file.path.display()),
            Err(err) => log::error!("Unable to render {}: {}", platform, err),
        }

        outcomes.push((platform.clone(), outcome));
    }

    return Ok(outcomes);
}

/// Maps requested platform names onto the framework's spelling. Unknown names
/// are kept as given so they still produce an (empty) matrix.
fn resolve_platforms(requested: &[String], available: &[String]) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::with_capacity(requested.len());

    for platform in requested.iter().map(|platform| platform.trim()) {
        if platform.is_empty() {
            continue;
        }

        let canonical = match available
            .iter()
            .find(|known| known.to_lowercase() == platform.to_lowercase())
        {
            Some(known) => known.clone(),
            None => {
                log::warn!("Platform '{}' is not listed by the framework", platform);
                platform.to_string()
            }
        };

        if !resolved.contains(&canonical) {
            resolved.push(canonical);
        }
    }

    return resolved;
}

pub(super) fn handle_platforms(
    framework: Framework,
    source: &DataSource,
    output: Output,
    req_client: &impl WebFetch,
) -> Result<(), error::Error> {
    let bundle = FrameworkBundle::load(framework, source, req_client)?;
    let platforms = list_available_platforms(&bundle);

    match output {
        Output::JSON => println!("{}", serde_json::to_string_pretty(&platforms)?),
        Output::STDOUT => {
            let mut table = comfy_table::Table::new();
            table
                .load_preset(comfy_table::presets::UTF8_FULL)
                .set_content_arrangement(comfy_table::ContentArrangement::Dynamic)
                .set_header(vec![
                    comfy_table::Cell::new("#")
                        .set_alignment(comfy_table::CellAlignment::Center)
                        .add_attribute(comfy_table::Attribute::Bold)
                        .fg(comfy_table::Color::Red),
                    comfy_table::Cell::new(format!("{} platform", framework))
                        .set_alignment(comfy_table::CellAlignment::Center)
                        .add_attribute(comfy_table::Attribute::Bold)
                        .fg(comfy_table::Color::Red),
                ]);

            for (inx, platform) in platforms.iter().enumerate() {
                table.add_row(vec![(inx + 1).to_string(), platform.clone()]);
            }

            println!("{}", table);
        }
    }

    Ok(())
}

pub(super) fn handle_tree(
    framework: Framework,
    platform: &str,
    source: &DataSource,
    output: Output,
    req_client: &impl WebFetch,
) -> Result<(), error::Error> {
    let bundle = FrameworkBundle::load(framework, source, req_client)?;
    let tree = matrix::build(&bundle, platform);

    if tree.is_empty() {
        log::warn!("No {} techniques match platform '{}'", framework, platform);
    }

    match output {
        Output::JSON => println!("{}", serde_json::to_string_pretty(&tree)?),
        Output::STDOUT => {
            println!("[*] {}", tree.title());
            println!(
                "[*] Tactics: {}, technique entries: {}",
                tree.tactics.len(),
                tree.technique_count()
            );

            let table: comfy_table::Table = tree.into();
            println!("{}", table);
        }
    }

    Ok(())
}

pub(super) fn handle_generate(
    framework: Framework,
    platforms: &[String],
    all_platforms: bool,
    output_dir: &Path,
    source: &DataSource,
    req_client: &impl WebFetch,
) -> Result<(), error::Error> {
    if platforms.is_empty() && !all_platforms {
        return Err(error::Error::InvalidValue(String::from(
            "select platforms with --platforms or pass --all-platforms",
        )));
    }

    let bundle = FrameworkBundle::load(framework, source, req_client)?;
    let available = list_available_platforms(&bundle);

    let selected = if all_platforms {
        available
    } else {
        resolve_platforms(platforms, &available)
    };

    let outcomes = generate_matrices(
        &bundle,
        &selected,
        output_dir,
        chrono::Local::now().date_naive(),
    )?;

    print_outcomes(&mut std::io::stdout(), &outcomes)?;

    let failed = outcomes.iter().filter(|(_, outcome)| outcome.is_err()).count();

    if failed > 0 {
        return Err(error::Error::General(format!(
            "{} of {} matrices could not be generated",
            failed,
            outcomes.len()
        )));
    }

    Ok(())
}

pub(super) fn print_outcomes(
    writer: &mut impl Write,
    outcomes: &[(String, Result<MatrixFile, error::Error>)],
) -> Result<(), error::Error> {
    let created: Vec<&MatrixFile> = outcomes
        .iter()
        .filter_map(|(_, outcome)| outcome.as_ref().ok())
        .collect();

    writeln!(writer, "\nProcessing complete!")?;

    if created.is_empty() {
        writeln!(writer, "No files were created.")?;
    } else {
        writeln!(writer, "\nCreated files:")?;

        for file in created {
            writeln!(
                writer,
                " - {} ({} technique entries)",
                file.path.display(),
                file.technique_count
            )?;
        }
    }

    for (platform, outcome) in outcomes {
        if let Err(err) = outcome {
            writeln!(writer, "[!] {}: {}", platform, err)?;
        }
    }

    Ok(())
}
