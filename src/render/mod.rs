//! Matrix renderer: writes a [`MatrixTree`] as an `.xlsx` workbook with one
//! column per tactic.

use std::path::Path;

use rust_xlsxwriter::{
    Color, DocProperties, Format, FormatAlign, FormatBorder, FormatUnderline, Url, Workbook,
    Worksheet,
};

use crate::{attack::matrix::MatrixTree, error};

pub mod layout;

use layout::{CellStyle, SheetLayout, FIRST_TECHNIQUE_ROW};

struct Formats {
    title: Format,
    header: Format,
    technique: Format,
    subtechnique: Format,
    note: Format,
}

impl Formats {
    fn new() -> Self {
        return Self {
            title: Format::new()
                .set_bold()
                .set_font_size(14)
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center),
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xDDDDDD))
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center)
                .set_text_wrap(),
            technique: Format::new()
                .set_border(FormatBorder::Thin)
                .set_font_color(Color::Blue)
                .set_underline(FormatUnderline::Single),
            subtechnique: Format::new()
                .set_border(FormatBorder::Thin)
                .set_indent(1)
                .set_background_color(Color::RGB(0xF5F5F5))
                .set_font_color(Color::Blue)
                .set_underline(FormatUnderline::Single),
            note: Format::new().set_italic().set_border(FormatBorder::Thin),
        };
    }

    fn get(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Title => &self.title,
            CellStyle::Header => &self.header,
            CellStyle::Technique => &self.technique,
            CellStyle::Subtechnique => &self.subtechnique,
            CellStyle::Note => &self.note,
        }
    }
}

fn write_layout(worksheet: &mut Worksheet, layout: &SheetLayout) -> Result<(), error::Error> {
    let formats = Formats::new();

    for (col, width) in layout.column_widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    for cell in layout.cells.iter() {
        let format = formats.get(cell.style);

        if cell.style == CellStyle::Title && layout.column_count > 1 {
            worksheet.merge_range(
                cell.row,
                0,
                cell.row,
                layout.column_count - 1,
                cell.text.as_str(),
                format,
            )?;
            continue;
        }

        match &cell.link {
            Some(link) => {
                worksheet.write_url_with_format(
                    cell.row,
                    cell.col,
                    Url::new(link.as_str()).set_text(cell.text.as_str()),
                    format,
                )?;
            }
            None => {
                worksheet.write_string_with_format(cell.row, cell.col, cell.text.as_str(), format)?;
            }
        }
    }

    if layout.has_header() {
        worksheet.set_freeze_panes(FIRST_TECHNIQUE_ROW, 0)?;
    }

    return Ok(());
}

fn build_workbook(tree: &MatrixTree, properties: &DocProperties) -> Result<Workbook, error::Error> {
    let layout = SheetLayout::from(tree);
    let mut workbook = Workbook::new();
    workbook.set_properties(properties);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(layout.sheet_name.as_str())?;
    write_layout(worksheet, &layout)?;

    return Ok(workbook);
}

/// Writes `tree` to `destination`, replacing any existing file.
pub fn render(tree: &MatrixTree, destination: &Path) -> Result<(), error::Error> {
    let mut workbook = build_workbook(tree, &DocProperties::new())?;

    workbook.save(destination).map_err(|err| {
        error::Error::Write(format!("{}: {}", destination.display(), err))
    })?;

    log::debug!(
        "Rendered {} technique entries to '{}'",
        tree.technique_count(),
        destination.display()
    );

    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::{
        bundle::{FrameworkBundle, FrameworkObject, Relationship},
        matrix, Framework,
    };
    use rust_xlsxwriter::ExcelDateTime;

    const SAMPLE_BUNDLE: &'static str = include_str!("../attack/json/enterprise_sample.json");

    fn assert_xlsx(path: &Path) -> Result<(), error::Error> {
        let bytes = std::fs::read(path)?;

        assert!(bytes.starts_with(b"PK"), "xlsx files are zip archives");

        Ok(())
    }

    #[test]
    fn test_every_cell_style_is_bordered() {
        let formats = Formats::new();

        for style in [
            CellStyle::Title,
            CellStyle::Header,
            CellStyle::Technique,
            CellStyle::Subtechnique,
            CellStyle::Note,
        ] {
            let format = formats.get(style);

            assert_eq!(
                format.clone().set_border(FormatBorder::Thin),
                *format,
                "{:?} cells lack a thin border",
                style
            );
        }
    }

    #[test]
    fn test_render_sample_matrix() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;
        let output_dir = tempfile::tempdir()?;
        let destination = output_dir.path().join("enterprise_windows.xlsx");

        render(&matrix::build(&bundle, "Windows"), &destination)?;

        assert_xlsx(&destination)
    }

    #[test]
    fn test_render_empty_platform() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;
        let output_dir = tempfile::tempdir()?;
        let destination = output_dir.path().join("enterprise_android.xlsx");

        let tree = matrix::build(&bundle, "Android");
        assert!(tree.is_empty());

        render(&tree, &destination)?;

        assert_xlsx(&destination)
    }

    #[test]
    fn test_render_tree_without_tactics() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::new(Framework::ICS, Vec::new(), Vec::new());
        let output_dir = tempfile::tempdir()?;
        let destination = output_dir.path().join("ics_empty.xlsx");

        render(&matrix::build(&bundle, "Control Server"), &destination)?;

        assert_xlsx(&destination)
    }

    #[test]
    fn test_render_twice_to_different_destinations() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;
        let tree = matrix::build(&bundle, "macOS");
        let output_dir = tempfile::tempdir()?;

        let first = output_dir.path().join("first.xlsx");
        let second = output_dir.path().join("second.xlsx");
        render(&tree, &first)?;
        render(&tree, &second)?;

        assert_xlsx(&first)?;
        assert_xlsx(&second)
    }

    #[test]
    fn test_same_tree_same_workbook() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;
        let created = ExcelDateTime::from_ymd(2024, 3, 9)?;
        let properties = DocProperties::new().set_creation_datetime(&created);

        let windows = matrix::build(&bundle, "Windows");
        let first = build_workbook(&windows, &properties)?.save_to_buffer()?;
        let second = build_workbook(&windows, &properties)?.save_to_buffer()?;

        assert!(first.starts_with(b"PK"));
        assert_eq!(first, second);

        let linux = build_workbook(&matrix::build(&bundle, "Linux"), &properties)?
            .save_to_buffer()?;
        assert_ne!(first, linux);

        Ok(())
    }

    #[test]
    fn test_render_schemeless_reference_url() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::new(
            Framework::ENTERPRISE,
            vec![
                FrameworkObject::tactic("TA0001", "Initial Access"),
                FrameworkObject::technique("T1", "Schemeless", &["Windows"])
                    .with_reference_url("attack.mitre.org/techniques/T1"),
            ],
            vec![Relationship::uses("T1", "TA0001")],
        );
        let output_dir = tempfile::tempdir()?;
        let destination = output_dir.path().join("schemeless.xlsx");

        render(&matrix::build(&bundle, "Windows"), &destination)?;

        assert_xlsx(&destination)
    }

    #[test]
    fn test_unwritable_destination() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;
        let output_dir = tempfile::tempdir()?;
        let destination = output_dir.path().join("missing").join("matrix.xlsx");

        let error = render(&matrix::build(&bundle, "Windows"), &destination).unwrap_err();

        assert!(matches!(error, error::Error::Write(_)));

        Ok(())
    }
}
