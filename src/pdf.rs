use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::editor::Editor;
use crate::error::{AppError, AppResult};

const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/truetype/liberation-sans",
];

// Colors (RGB 0-1)
const TEXT_DARK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const HEADER_BG: (f32, f32, f32) = (0.906, 0.898, 0.894); // stone
const ROW_ALT: (f32, f32, f32) = (1.0, 0.929, 0.835); // orange band
const TOTALS_BG: (f32, f32, f32) = (0.996, 0.988, 0.910); // yellow tint

// Landscape letter-ish page in mm
const PAGE_W: f32 = 297.0;
const PAGE_H: f32 = 210.0;
const MARGIN: f32 = 15.0;
const ROW_H: f32 = 8.0;

const HEADERS: [&str; 12] = [
    "No.", "Day", "Date", "In - 1", "Out - 1", "Break", "In - 2", "Out - 2", "Hours", "O.T. Hours", "Sales",
    "Tips",
];
const COL_W: [f32; 12] = [12.0, 18.0, 28.0, 24.0, 24.0, 18.0, 24.0, 24.0, 20.0, 22.0, 26.0, 26.0];

/// Renders the grid, header and totals to a PDF. Only the sheet itself is
/// drawn; no CLI state ends up on the page.
pub fn generate_pdf(editor: &Editor, config: &Config, output: Option<&Path>) -> AppResult<PathBuf> {
    let period = editor.period_ending();
    let (doc, page1, layer1) = PdfDocument::new(
        &format!("{} {}", config.sheet.title, period),
        Mm(PAGE_W),
        Mm(PAGE_H),
        "Layer 1",
    );
    let layer = doc.get_page(page1).get_layer(layer1);

    let font_regular = load_font(&doc, "LiberationSans-Regular.ttf", BuiltinFont::Helvetica)?;
    let font_bold = load_font(&doc, "LiberationSans-Bold.ttf", BuiltinFont::HelveticaBold)?;

    let mut y = PAGE_H - MARGIN;
    set_fill(&layer, TEXT_DARK);

    if !config.sheet.business.is_empty() {
        layer.use_text(config.sheet.business.to_uppercase(), 16.0, Mm(MARGIN), Mm(y - 6.0), &font_bold);
        y -= 8.0;
    }
    layer.use_text(config.sheet.title.to_uppercase(), 16.0, Mm(MARGIN), Mm(y - 6.0), &font_bold);
    y -= 16.0;

    layer.use_text("Name:", 12.0, Mm(MARGIN), Mm(y), &font_bold);
    layer.use_text(editor.sheet.name.as_str(), 12.0, Mm(MARGIN + 16.0), Mm(y), &font_regular);
    layer.use_text("Pay Period Ending:", 12.0, Mm(PAGE_W / 2.0), Mm(y), &font_bold);
    layer.use_text(period.as_str(), 12.0, Mm(PAGE_W / 2.0 + 42.0), Mm(y), &font_regular);
    y -= 8.0;

    let table_w: f32 = COL_W.iter().sum();

    draw_rect(&layer, MARGIN, y - ROW_H, table_w, ROW_H, HEADER_BG);
    set_fill(&layer, TEXT_DARK);
    draw_cells(&layer, &HEADERS.map(String::from), y, &font_bold);
    y -= ROW_H;

    for entry in &editor.sheet.rows {
        if entry.id % 2 == 1 {
            draw_rect(&layer, MARGIN, y - ROW_H, table_w, ROW_H, ROW_ALT);
        }
        set_fill(&layer, TEXT_DARK);
        let cells = [
            (entry.id + 1).to_string(),
            entry.day.label().to_string(),
            entry.date.clone(),
            entry.in1.clone(),
            entry.out1.clone(),
            entry.break_time.clone(),
            entry.in2.clone(),
            entry.out2.clone(),
            entry.hours.clone(),
            entry.ot_hours.clone(),
            entry.sales.clone(),
            entry.tips.clone(),
        ];
        draw_cells(&layer, &cells, y, &font_regular);
        y -= ROW_H;
    }

    let totals = editor.totals();
    draw_rect(&layer, MARGIN, y - ROW_H, table_w, ROW_H, TOTALS_BG);
    set_fill(&layer, TEXT_DARK);
    let mut cells: [String; 12] = Default::default();
    cells[7] = "Totals:".to_string();
    cells[8] = totals.reg_hours;
    cells[9] = totals.ot_hours;
    cells[10] = totals.total_sales;
    cells[11] = totals.total_tips;
    draw_cells(&layer, &cells, y, &font_bold);
    y -= ROW_H;

    draw_grid(&layer, y, table_w);

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => get_output_path(config, &period),
    };
    let file = File::create(&output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| AppError::Pdf(e.to_string()))?;

    info!(path = %output_path.display(), "pdf written");
    Ok(output_path)
}

fn set_fill(layer: &PdfLayerReference, color: (f32, f32, f32)) {
    layer.set_fill_color(Color::Rgb(Rgb::new(color.0, color.1, color.2, None)));
}

fn draw_cells(layer: &PdfLayerReference, cells: &[String; 12], y: f32, font: &IndirectFontRef) {
    let mut x = MARGIN + 1.5;
    for (i, cell) in cells.iter().enumerate() {
        layer.use_text(cell.as_str(), 9.0, Mm(x), Mm(y - 5.5), font);
        x += COL_W[i];
    }
}

fn draw_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, color: (f32, f32, f32)) {
    set_fill(layer, color);

    let points = vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y + h)), false),
        (Point::new(Mm(x), Mm(y + h)), false),
    ];

    let polygon = Polygon {
        rings: vec![points],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    };

    layer.add_polygon(polygon);
}

/// Cell borders for the header, 14 rows and the totals row ending at `bottom`.
fn draw_grid(layer: &PdfLayerReference, bottom: f32, width: f32) {
    layer.set_outline_color(Color::Rgb(Rgb::new(TEXT_DARK.0, TEXT_DARK.1, TEXT_DARK.2, None)));
    layer.set_outline_thickness(0.5);

    let top = bottom + ROW_H * 16.0;
    let mut y = top;
    while y >= bottom - 0.01 {
        line(layer, (MARGIN, y), (MARGIN + width, y));
        y -= ROW_H;
    }

    let mut x = MARGIN;
    line(layer, (x, top), (x, bottom));
    for w in COL_W {
        x += w;
        line(layer, (x, top), (x, bottom));
    }
}

fn line(layer: &PdfLayerReference, from: (f32, f32), to: (f32, f32)) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    });
}

/// System Liberation font when installed, otherwise a built-in PDF font.
fn load_font(doc: &PdfDocumentReference, filename: &str, fallback: BuiltinFont) -> AppResult<IndirectFontRef> {
    for dir in FONT_DIRS {
        let path = Path::new(dir).join(filename);
        if path.exists() {
            let font_data = std::fs::read(&path)?;
            return doc
                .add_external_font(&*font_data)
                .map_err(|e| AppError::Pdf(format!("cannot add font {}: {}", path.display(), e)));
        }
    }
    debug!(filename, "font not installed, using built-in");
    doc.add_builtin_font(fallback)
        .map_err(|e| AppError::Pdf(e.to_string()))
}

fn get_output_path(config: &Config, period: &str) -> PathBuf {
    let filename = if period.is_empty() {
        "timesheet.pdf".to_string()
    } else {
        format!("timesheet_{}.pdf", period.replace('/', "-"))
    };

    let dir = config
        .pdf
        .output_dir
        .as_ref()
        .map(PathBuf::from)
        .or_else(dirs::home_dir);

    match dir {
        Some(dir) => dir.join(filename),
        None => PathBuf::from(filename),
    }
}
