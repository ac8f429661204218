use crate::error::AppError;
use crate::export::statement::{FIRST_DAY_COLUMN, Statement};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};

// A4 landscape, millimetres.
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN_TOP: f32 = 10.0;
const MARGIN_BOTTOM: f32 = 10.0;

const ROW_HEIGHT: f32 = 4.5;
const FONT_SIZE: f32 = 7.0;
const TITLE_SIZE: f32 = 14.0;
const SUBTITLE_SIZE: f32 = 11.0;
const FOOTER_SIZE: f32 = 10.0;
const FOOTER_HEIGHT: f32 = 25.0;

const DAY_COLUMN_WIDTH: f32 = 4.5;
const LEADING_WIDTHS: [f32; FIRST_DAY_COLUMN] = [5.0, 15.0, 70.0, 15.0];
const TRAILING_WIDTHS: [f32; 2] = [8.0, 25.0];

/// Helvetica averages about half an em per glyph; enough to centre short cells.
const GLYPH_WIDTH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;

fn grey(level: f32) -> Color {
    Color::Rgb(Rgb::new(level, level, level, None))
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH_EM * PT_TO_MM
}

/// Cuts `text` so it fits `width` at `size`.
fn fit(text: &str, width: f32, size: f32) -> String {
    let max_chars = (width / (size * GLYPH_WIDTH_EM * PT_TO_MM)).floor() as usize;
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars.saturating_sub(1)).collect::<String>() + "."
    }
}

fn export_err(e: impl std::fmt::Display) -> AppError {
    AppError::ExportFailure(e.to_string())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

struct Layout {
    widths: Vec<f32>,
    left: f32,
}

impl Layout {
    fn new(statement: &Statement) -> Self {
        let days = statement.column_count() - FIRST_DAY_COLUMN - TRAILING_WIDTHS.len();
        let mut widths: Vec<f32> = LEADING_WIDTHS.to_vec();
        widths.extend(std::iter::repeat(DAY_COLUMN_WIDTH).take(days));
        widths.extend(TRAILING_WIDTHS);

        let total: f32 = widths.iter().sum();
        Self {
            left: ((PAGE_WIDTH - total) / 2.0).max(0.0),
            widths,
        }
    }

    fn column_x(&self, column: usize) -> f32 {
        self.left + self.widths[..column].iter().sum::<f32>()
    }
}

fn draw_row(
    layer: &PdfLayerReference,
    layout: &Layout,
    cells: &[String],
    bottom: f32,
    font: &IndirectFontRef,
    background: impl Fn(usize) -> Option<Color>,
    text_color: Color,
) {
    for (column, text) in cells.iter().enumerate() {
        let x = layout.column_x(column);
        let w = layout.widths[column];

        if let Some(fill) = background(column) {
            layer.set_fill_color(fill);
            layer.add_rect(
                Rect::new(Mm(x), Mm(bottom), Mm(x + w), Mm(bottom + ROW_HEIGHT))
                    .with_mode(PaintMode::Fill),
            );
        }

        layer.set_outline_color(grey(0.0));
        layer.set_outline_thickness(0.4);
        layer.add_rect(
            Rect::new(Mm(x), Mm(bottom), Mm(x + w), Mm(bottom + ROW_HEIGHT))
                .with_mode(PaintMode::Stroke),
        );

        let text = fit(text, w - 1.0, FONT_SIZE);
        let text_x = x + (w - text_width(&text, FONT_SIZE)) / 2.0;
        layer.set_fill_color(text_color.clone());
        layer.use_text(text, FONT_SIZE, Mm(text_x), Mm(bottom + 1.4), font);
    }
}

fn draw_header(layer: &PdfLayerReference, layout: &Layout, statement: &Statement, bottom: f32, fonts: &Fonts) {
    draw_row(
        layer,
        layout,
        &statement.header,
        bottom,
        &fonts.bold,
        |_| Some(grey(0.66)),
        grey(1.0),
    );
}

fn draw_centered(layer: &PdfLayerReference, text: &str, size: f32, y: f32, font: &IndirectFontRef) {
    let x = ((PAGE_WIDTH - text_width(text, size)) / 2.0).max(0.0);
    layer.set_fill_color(grey(0.0));
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

fn draw_footer(layer: &PdfLayerReference, statement: &Statement, top: f32, left: f32, fonts: &Fonts) {
    layer.set_fill_color(grey(0.0));
    for (i, line) in statement.footer.iter().enumerate() {
        let y = top - 10.0 - i as f32 * 6.0;
        for (j, cell) in line.iter().enumerate() {
            if !cell.is_empty() {
                layer.use_text(cell.as_str(), FOOTER_SIZE, Mm(left + j as f32 * 120.0), Mm(y), &fonts.regular);
            }
        }
    }
}

/// Renders the statement as an A4 landscape table; the header row repeats on
/// every page and the signature block follows the last row.
pub fn render_pdf(statement: &Statement) -> Result<Vec<u8>, AppError> {
    let name = statement.file_name("pdf");
    let (doc, page, layer) = PdfDocument::new(
        name.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Tableau",
    );
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(export_err)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(export_err)?,
    };
    let layout = Layout::new(statement);

    let mut layer = doc.get_page(page).get_layer(layer);
    let mut cursor = PAGE_HEIGHT - MARGIN_TOP - 6.0;

    draw_centered(&layer, &statement.title, TITLE_SIZE, cursor, &fonts.bold);
    cursor -= 7.0;
    draw_centered(&layer, &statement.subtitle, SUBTITLE_SIZE, cursor, &fonts.bold);
    cursor -= 4.0 + ROW_HEIGHT;

    draw_header(&layer, &layout, statement, cursor, &fonts);

    for row in &statement.rows {
        if cursor - ROW_HEIGHT < MARGIN_BOTTOM {
            let (page, new_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Tableau");
            layer = doc.get_page(page).get_layer(new_layer);
            cursor = PAGE_HEIGHT - MARGIN_TOP - ROW_HEIGHT;
            draw_header(&layer, &layout, statement, cursor, &fonts);
        }
        cursor -= ROW_HEIGHT;

        draw_row(
            &layer,
            &layout,
            &row.cells(),
            cursor,
            &fonts.regular,
            |column| statement.is_weekend_column(column).then(|| grey(0.83)),
            grey(0.0),
        );
    }

    if cursor - FOOTER_HEIGHT < MARGIN_BOTTOM {
        let (page, new_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Signatures");
        layer = doc.get_page(page).get_layer(new_layer);
        cursor = PAGE_HEIGHT - MARGIN_TOP;
    }
    draw_footer(&layer, statement, cursor, layout.left.max(10.0), &fonts);

    doc.save_to_bytes().map_err(export_err)
}
