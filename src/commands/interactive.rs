use std::io::{BufRead, Write};
use std::path::Path;

use super::matrix::{generate_matrices, print_outcomes, MatrixFile};
use crate::{
    attack::{
        bundle::{list_available_platforms, DataSource, FrameworkBundle},
        Framework,
    },
    error, WebFetch,
};

#[derive(Debug, PartialEq)]
pub enum Selection {
    Quit,
    Indices(Vec<usize>),
    Invalid(String),
}

/// Parses a 1-based menu answer. `multi` accepts `1,3,5` and `all`.
pub fn parse_selection(input: &str, option_count: usize, multi: bool) -> Selection {
    let answer = input.trim().to_lowercase();

    if answer == "q" {
        return Selection::Quit;
    }

    if multi && answer == "all" {
        return Selection::Indices((0..option_count).collect());
    }

    let parts: Vec<&str> = if multi {
        answer.split(',').map(|part| part.trim()).collect()
    } else {
        vec![answer.as_str()]
    };

    let mut indices: Vec<usize> = Vec::with_capacity(parts.len());

    for part in parts {
        let number = match part.parse::<usize>() {
            Ok(number) => number,
            Err(_) => {
                return Selection::Invalid(if multi {
                    String::from("Invalid input. Please enter numbers separated by commas.")
                } else {
                    String::from("Invalid input. Please enter a number.")
                })
            }
        };

        if number == 0 || number > option_count {
            return Selection::Invalid(String::from("Invalid selection. Please try again."));
        }

        if !indices.contains(&(number - 1)) {
            indices.push(number - 1);
        }
    }

    return Selection::Indices(indices);
}

/// Shows a numbered menu until the answer is valid. `None` means the user quit
/// or input ended.
fn prompt(
    reader: &mut impl BufRead,
    writer: &mut impl Write,
    title: &str,
    options: &[String],
    multi: bool,
) -> Result<Option<Vec<usize>>, error::Error> {
    writeln!(writer, "\n=== {} ===\n", title)?;

    for (inx, option) in options.iter().enumerate() {
        writeln!(writer, "{}. {}", inx + 1, option)?;
    }

    if multi {
        writeln!(writer, "\nEnter numbers separated by commas (e.g., 1,3,5)")?;
        writeln!(writer, "Or enter 'all' to select all options")?;
    } else {
        writeln!(writer, "\nEnter a number to select an option")?;
    }
    writeln!(writer, "Or enter 'q' to quit")?;

    loop {
        write!(writer, "\nYour selection: ")?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match parse_selection(&line, options.len(), multi) {
            Selection::Quit => return Ok(None),
            Selection::Indices(indices) => return Ok(Some(indices)),
            Selection::Invalid(message) => writeln!(writer, "{}", message)?,
        }
    }
}

/// Framework menu, then platform menu, then one spreadsheet per platform.
pub fn run(
    reader: &mut impl BufRead,
    writer: &mut impl Write,
    source: &DataSource,
    output_dir: &Path,
    req_client: &impl WebFetch,
) -> Result<Vec<MatrixFile>, error::Error> {
    let framework_names: Vec<String> = Framework::ALL
        .iter()
        .map(|framework| framework.to_string())
        .collect();

    let framework = match prompt(
        reader,
        writer,
        "Select MITRE ATT&CK Matrix Type",
        &framework_names,
        false,
    )? {
        Some(indices) => Framework::ALL[indices[0]],
        None => return Ok(Vec::new()),
    };

    let bundle = FrameworkBundle::load(framework, source, req_client)?;
    let platforms = list_available_platforms(&bundle);

    if platforms.is_empty() {
        writeln!(writer, "No platforms found in the selected matrix.")?;
        return Ok(Vec::new());
    }

    let selected: Vec<String> = match prompt(
        reader,
        writer,
        &format!("Select Platforms ({})", framework),
        &platforms,
        true,
    )? {
        Some(indices) => indices.into_iter().map(|inx| platforms[inx].clone()).collect(),
        None => {
            writeln!(writer, "No platforms selected.")?;
            return Ok(Vec::new());
        }
    };

    let outcomes = generate_matrices(
        &bundle,
        &selected,
        output_dir,
        chrono::Local::now().date_naive(),
    )?;

    print_outcomes(writer, &outcomes)?;

    return Ok(outcomes
        .into_iter()
        .filter_map(|(_, outcome)| outcome.ok())
        .collect());
}
