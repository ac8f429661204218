use crate::error::AppError;
use crate::export::statement::{FIRST_DAY_COLUMN, Statement};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

const SHEET_NAME: &str = "Présences";
const HEADER_ROW: u32 = 3;

fn export_err(e: impl std::fmt::Display) -> AppError {
    AppError::ExportFailure(e.to_string())
}

/// Renders the statement as a single-sheet workbook. Cell text matches the PDF;
/// the row number and total are written as numbers so they stay summable.
pub fn render_xlsx(statement: &Statement) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();

    let title = Format::new().set_bold().set_font_size(14);
    let subtitle = Format::new().set_bold();
    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(Color::RGB(0xDCE6F1))
        .set_border(FormatBorder::Thin);
    let cell = Format::new()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let weekend = cell.clone().set_background_color(Color::RGB(0xD3D3D3));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(export_err)?;

    worksheet
        .write_string_with_format(0, 0, statement.title.as_str(), &title)
        .map_err(export_err)?;
    worksheet
        .write_string_with_format(1, 0, statement.subtitle.as_str(), &subtitle)
        .map_err(export_err)?;

    for (column, text) in statement.header.iter().enumerate() {
        worksheet
            .write_string_with_format(HEADER_ROW, column as u16, text.as_str(), &header)
            .map_err(export_err)?;
    }

    let trailing = statement.column_count() - 2;
    for (i, row) in statement.rows.iter().enumerate() {
        let r = HEADER_ROW + 1 + i as u32;
        for (column, text) in row.cells().iter().enumerate() {
            let format = if statement.is_weekend_column(column) { &weekend } else { &cell };
            let c = column as u16;
            if column == 0 {
                worksheet
                    .write_number_with_format(r, c, row.number as f64, format)
                    .map_err(export_err)?;
            } else if column == trailing {
                worksheet
                    .write_number_with_format(r, c, (row.total * 10.0).round() / 10.0, format)
                    .map_err(export_err)?;
            } else {
                worksheet
                    .write_string_with_format(r, c, text.as_str(), format)
                    .map_err(export_err)?;
            }
        }
    }

    let footer_row = HEADER_ROW + statement.rows.len() as u32 + 3;
    for (i, line) in statement.footer.iter().enumerate() {
        for (j, text) in line.iter().enumerate() {
            if !text.is_empty() {
                worksheet
                    .write_string(footer_row + i as u32, (j * FIRST_DAY_COLUMN * 3) as u16, text.as_str())
                    .map_err(export_err)?;
            }
        }
    }

    for column in 0..statement.column_count() {
        let width = match column {
            2 => 32.0,
            c if (FIRST_DAY_COLUMN..trailing).contains(&c) => 5.0,
            _ => 12.0,
        };
        worksheet.set_column_width(column as u16, width).map_err(export_err)?;
    }

    workbook.save_to_buffer().map_err(export_err)
}
