//! # Invoice Export
//!
//! Renders the stored state of an invoice into a document. Rendering only
//! reads; nothing here can change an invoice.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  &Invoice ──► Snapshot ─┬──► csv::Writer  ──► spreadsheet (.csv)        │
//! │                         └──► printpdf     ──► PDF (.pdf)                │
//! │                                                                         │
//! │  Snapshot = header fields + product rows + the four stored totals      │
//! │  (totals are copied, never recomputed)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The spreadsheet keeps amounts as plain integers in đồng so they import
//! without locale parsing. The PDF uses the built-in Helvetica font, which
//! has no Vietnamese glyphs; its text is folded to unaccented Latin.

use std::fmt;
use std::str::FromStr;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use thiserror::Error;

use shopfront_core::stats::store_offset;
use shopfront_core::{Invoice, Money};

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Spreadsheet rendering failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        tracing::error!("Export failed: {}", err);
        ApiError::export(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Spreadsheet,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Spreadsheet => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "spreadsheet" | "csv" => Ok(ExportFormat::Spreadsheet),
            other => Err(ApiError::validation(format!(
                "Unknown export format: '{}'. Valid options: pdf, spreadsheet",
                other
            ))),
        }
    }
}

/// Renders `invoice` in the requested format.
pub fn render(invoice: &Invoice, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let snapshot = Snapshot::of(invoice);
    match format {
        ExportFormat::Spreadsheet => render_csv(&snapshot),
        ExportFormat::Pdf => render_pdf(&snapshot),
    }
}

// =============================================================================
// Snapshot
// =============================================================================

const PRODUCT_HEADER: [&str; 9] = [
    "Mã SP",
    "Tên sản phẩm",
    "Màu",
    "Size",
    "Số lượng",
    "Đơn giá",
    "Thuế",
    "Giảm giá",
    "Thành tiền",
];

struct ProductRow {
    product_id: String,
    name: String,
    color: String,
    size: String,
    quantity: i64,
    unit_price: Money,
    tax: Money,
    discount: Money,
    line_total: Money,
}

struct Snapshot {
    title: String,
    fields: Vec<(&'static str, String)>,
    products: Vec<ProductRow>,
    totals: [(&'static str, Money); 4],
}

impl Snapshot {
    fn of(invoice: &Invoice) -> Self {
        let customer = &invoice.customer;
        let fields = vec![
            ("Mã hóa đơn", invoice.id.clone()),
            (
                "Mã đơn hàng",
                invoice.order_id.clone().unwrap_or_else(|| "Không có".to_string()),
            ),
            ("Khách hàng", customer.name.clone()),
            ("Số điện thoại", customer.phone.clone()),
            ("Địa chỉ", customer.address.clone()),
            ("Email", customer.email.clone().unwrap_or_default()),
            ("Phương thức thanh toán", invoice.payment_method.label().to_string()),
            (
                "Trạng thái thanh toán",
                invoice.payment_status.display_label().to_string(),
            ),
            ("Trạng thái", invoice.status.display_label().to_string()),
            (
                "Ngày tạo",
                invoice
                    .created_at
                    .with_timezone(&store_offset())
                    .format("%d/%m/%Y %H:%M")
                    .to_string(),
            ),
        ];

        let products = invoice
            .products
            .iter()
            .map(|p| ProductRow {
                product_id: p.product_id.clone(),
                name: p.name.clone(),
                color: p.color.clone().unwrap_or_default(),
                size: p.size.clone().unwrap_or_default(),
                quantity: p.quantity,
                unit_price: p.unit_price,
                tax: p.tax,
                discount: p.discount,
                line_total: (p.unit_price + p.tax - p.discount).multiply_quantity(p.quantity),
            })
            .collect();

        let f = &invoice.financials;
        Snapshot {
            title: format!("Hóa đơn {}", invoice.id),
            fields,
            products,
            totals: [
                ("Tạm tính", f.subtotal),
                ("Tổng thuế", f.total_tax),
                ("Tổng giảm giá", f.total_discount),
                ("Tổng thanh toán", f.final_amount),
            ],
        }
    }
}

// =============================================================================
// Spreadsheet
// =============================================================================

fn render_csv(snapshot: &Snapshot) -> Result<Vec<u8>, ExportError> {
    // Sections have different widths.
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record([snapshot.title.as_str()])?;
    for (label, value) in &snapshot.fields {
        writer.write_record([*label, value.as_str()])?;
    }

    writer.write_record([""])?;
    writer.write_record(PRODUCT_HEADER)?;
    for row in &snapshot.products {
        writer.write_record([
            row.product_id.clone(),
            row.name.clone(),
            row.color.clone(),
            row.size.clone(),
            row.quantity.to_string(),
            row.unit_price.dong().to_string(),
            row.tax.dong().to_string(),
            row.discount.dong().to_string(),
            row.line_total.dong().to_string(),
        ])?;
    }

    writer.write_record([""])?;
    for (label, amount) in &snapshot.totals {
        writer.write_record([label.to_string(), amount.dong().to_string()])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}

// =============================================================================
// PDF
// =============================================================================

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LINE_HEIGHT: f32 = 6.0;
const FONT_SIZE: f32 = 10.0;

/// Left edge of each product column (mm).
const PRODUCT_COLUMNS: [f32; 9] = [15.0, 35.0, 85.0, 103.0, 117.0, 132.0, 152.0, 167.0, 182.0];

/// Writes lines top to bottom, adding pages as needed.
struct PdfCursor<'a> {
    doc: &'a printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PdfCursor<'_> {
    fn next_line(&mut self) {
        self.y -= LINE_HEIGHT;
        if self.y < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text(&self, x: f32, text: &str, bold: bool) {
        let font = if bold { &self.bold } else { &self.font };
        self.layer
            .use_text(fold_to_latin(text), FONT_SIZE, Mm(x), Mm(self.y), font);
    }

    fn row(&mut self, cells: &[(f32, String)], bold: bool) {
        for (x, cell) in cells {
            self.text(*x, cell, bold);
        }
        self.next_line();
    }
}

fn render_pdf(snapshot: &Snapshot) -> Result<Vec<u8>, ExportError> {
    let title = fold_to_latin(&snapshot.title);
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    {
        let mut cursor = PdfCursor {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            font,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        };

        cursor.row(&[(MARGIN, snapshot.title.clone())], true);
        cursor.next_line();
        for (label, value) in &snapshot.fields {
            cursor.row(&[(MARGIN, format!("{}:", label)), (70.0, value.clone())], false);
        }

        cursor.next_line();
        let header: Vec<(f32, String)> = PRODUCT_COLUMNS
            .iter()
            .zip(PRODUCT_HEADER)
            .map(|(x, h)| (*x, h.to_string()))
            .collect();
        cursor.row(&header, true);
        for p in &snapshot.products {
            let cells = [
                p.product_id.clone(),
                p.name.clone(),
                p.color.clone(),
                p.size.clone(),
                p.quantity.to_string(),
                p.unit_price.dong().to_string(),
                p.tax.dong().to_string(),
                p.discount.dong().to_string(),
                p.line_total.dong().to_string(),
            ];
            let row: Vec<(f32, String)> = PRODUCT_COLUMNS.iter().copied().zip(cells).collect();
            cursor.row(&row, false);
        }

        cursor.next_line();
        for (label, amount) in &snapshot.totals {
            cursor.row(&[(120.0, format!("{}:", label)), (165.0, amount.to_string())], true);
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

/// Strips Vietnamese diacritics; anything else outside ASCII becomes `?`.
fn fold_to_latin(text: &str) -> String {
    const GROUPS: [(&str, char); 7] = [
        ("àáảãạăằắẳẵặâầấẩẫậ", 'a'),
        ("èéẻẽẹêềếểễệ", 'e'),
        ("ìíỉĩị", 'i'),
        ("òóỏõọôồốổỗộơờớởỡợ", 'o'),
        ("ùúủũụưừứửữự", 'u'),
        ("ỳýỷỹỵ", 'y'),
        ("đ", 'd'),
    ];

    text.chars()
        .flat_map(|ch| {
            let folded: String = if ch.is_ascii() {
                ch.to_string()
            } else if ch == '₫' {
                "VND".to_string()
            } else {
                let lower = ch.to_lowercase().next().unwrap_or(ch);
                match GROUPS.iter().find(|(group, _)| group.contains(lower)) {
                    Some((_, base)) if ch.is_uppercase() => base.to_ascii_uppercase().to_string(),
                    Some((_, base)) => base.to_string(),
                    None => "?".to_string(),
                }
            };
            folded.chars().collect::<Vec<_>>()
        })
        .collect()
}
