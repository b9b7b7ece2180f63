//! Cell grid of a rendered matrix, independent of the spreadsheet writer.

use crate::attack::matrix::MatrixTree;

pub const TITLE_ROW: u32 = 0;
pub const HEADER_ROW: u32 = 2;
pub const FIRST_TECHNIQUE_ROW: u32 = HEADER_ROW + 1;

const MIN_COLUMN_WIDTH: usize = 12;
const MAX_COLUMN_WIDTH: usize = 60;
const COLUMN_PADDING: usize = 2;
const SUBTECHNIQUE_INDENT: usize = 2;
const SHEET_NAME_LIMIT: usize = 31;
const LINK_LENGTH_LIMIT: usize = 2079;

lazy_static! {
    static ref SHEET_NAME_RE: regex::Regex = regex::Regex::new(r"[\[\]:*?/\\]").unwrap();
    static ref LINK_SCHEME_RE: regex::Regex =
        regex::Regex::new(r"^(https?://|ftps?://|file://|mailto:)\S+$").unwrap();
}

/// Links the spreadsheet writer cannot store are dropped so the cell falls
/// back to plain text.
fn usable_link(text: &str, link: &str) -> Option<String> {
    if link.is_empty() {
        return None;
    }

    if !LINK_SCHEME_RE.is_match(link) || link.chars().count() > LINK_LENGTH_LIMIT {
        log::warn!("Ignoring unusable reference '{}' of '{}'", link, text);
        return None;
    }

    return Some(link.to_string());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Title,
    Header,
    Technique,
    Subtechnique,
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutCell {
    pub row: u32,
    pub col: u16,
    pub text: String,
    pub link: Option<String>,
    pub style: CellStyle,
}

impl LayoutCell {
    fn new(row: u32, col: u16, text: &str, link: &str, style: CellStyle) -> Self {
        return Self {
            row,
            col,
            text: text.to_string(),
            link: usable_link(text, link),
            style,
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub sheet_name: String,
    /// Columns the title spans; at least one.
    pub column_count: u16,
    pub column_widths: Vec<f64>,
    pub cells: Vec<LayoutCell>,
}

impl SheetLayout {
    pub fn cell(&self, row: u32, col: u16) -> Option<&LayoutCell> {
        return self.cells.iter().find(|cell| cell.row == row && cell.col == col);
    }

    pub fn column(&self, col: u16) -> Vec<&LayoutCell> {
        return self
            .cells
            .iter()
            .filter(|cell| cell.col == col && cell.row >= FIRST_TECHNIQUE_ROW)
            .filter(|cell| cell.style != CellStyle::Note)
            .collect();
    }

    pub fn has_header(&self) -> bool {
        return self.cells.iter().any(|cell| cell.style == CellStyle::Header);
    }
}

/// Excel sheet names are limited to 31 characters and may not contain
/// `[ ] : * ? / \`.
pub fn sheet_name(tree: &MatrixTree) -> String {
    let raw = format!("{} - {}", tree.framework, tree.platform);
    let cleaned = SHEET_NAME_RE.replace_all(&raw, "_");
    let name: String = cleaned.chars().take(SHEET_NAME_LIMIT).collect();

    return name.trim().to_string();
}

impl From<&MatrixTree> for SheetLayout {
    fn from(tree: &MatrixTree) -> Self {
        let mut cells: Vec<LayoutCell> = vec![LayoutCell::new(
            TITLE_ROW,
            0,
            &tree.title(),
            "",
            CellStyle::Title,
        )];
        let mut column_widths: Vec<f64> = Vec::with_capacity(tree.tactics.len());

        for (inx, tactic) in tree.tactics.iter().enumerate() {
            let col = inx as u16;
            let mut widest = tactic.name.chars().count();
            let mut row = FIRST_TECHNIQUE_ROW;

            cells.push(LayoutCell::new(HEADER_ROW, col, &tactic.name, "", CellStyle::Header));

            for technique in tactic.techniques.iter() {
                widest = widest.max(technique.name.chars().count());
                cells.push(LayoutCell::new(
                    row,
                    col,
                    &technique.name,
                    &technique.reference_url,
                    CellStyle::Technique,
                ));
                row += 1;

                for sub in technique.subtechniques.iter() {
                    widest = widest.max(sub.name.chars().count() + SUBTECHNIQUE_INDENT);
                    cells.push(LayoutCell::new(
                        row,
                        col,
                        &sub.name,
                        &sub.reference_url,
                        CellStyle::Subtechnique,
                    ));
                    row += 1;
                }
            }

            column_widths
                .push((widest + COLUMN_PADDING).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) as f64);
        }

        if tree.is_empty() {
            cells.push(LayoutCell::new(
                FIRST_TECHNIQUE_ROW,
                0,
                &format!(
                    "No techniques found for {} in the {} matrix.",
                    tree.platform, tree.framework
                ),
                "",
                CellStyle::Note,
            ));
        }

        return Self {
            sheet_name: sheet_name(tree),
            column_count: tree.tactics.len().max(1) as u16,
            column_widths,
            cells,
        };
    }
}
