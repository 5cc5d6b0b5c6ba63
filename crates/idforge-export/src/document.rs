use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::atomic::write_json_atomic;
use crate::errors::ExportError;
use crate::symbology::Symbology;

/// Fixed grid the barcode document is laid out on (millimetres, A4 portrait).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_mm: f64,
    pub columns: usize,
    pub items_per_page: usize,
    pub barcode_width_mm: f64,
    pub barcode_height_mm: f64,
    pub text_height_mm: f64,
    pub vertical_gap_mm: f64,
    /// Space between the page title and the first row.
    pub title_gap_mm: f64,
}

impl Default for DocumentLayout {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 15.0,
            columns: 2,
            items_per_page: 10,
            barcode_width_mm: 75.0,
            barcode_height_mm: 25.0,
            text_height_mm: 5.0,
            vertical_gap_mm: 10.0,
            title_gap_mm: 15.0,
        }
    }
}

impl DocumentLayout {
    pub fn item_height_mm(&self) -> f64 {
        self.barcode_height_mm + self.text_height_mm + self.vertical_gap_mm
    }

    pub fn column_step_mm(&self) -> f64 {
        self.page_width_mm / 2.0 - self.margin_mm * 0.75
    }

    /// Top-left corner of slot `(column, row)` on a page.
    pub fn cell_origin(&self, column: usize, row: usize) -> (f64, f64) {
        let x = self.margin_mm + column as f64 * self.column_step_mm();
        let y = self.margin_mm + self.title_gap_mm + row as f64 * self.item_height_mm();
        (x, y)
    }

    pub fn page_count(&self, items: usize) -> usize {
        items.div_ceil(self.items_per_page.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellContent {
    Barcode {
        /// String handed to the rasterizer.
        payload: String,
        /// Caption centred under the barcode.
        caption: String,
        caption_x_mm: f64,
        caption_y_mm: f64,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Position of the item in the exported list.
    pub index: usize,
    pub column: usize,
    pub row: usize,
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub value: String,
    pub content: CellContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub number: usize,
    pub title: String,
    pub title_x_mm: f64,
    pub title_y_mm: f64,
    pub cells: Vec<Cell>,
}

/// A paginated barcode sheet, one barcode per exported item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub file_name: String,
    pub symbology: Symbology,
    pub layout: DocumentLayout,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.cells.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.cells()
            .filter(|cell| matches!(cell.content, CellContent::Error { .. }))
            .count()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.pages.iter().flat_map(|page| page.cells.iter())
    }
}

/// Lay `items` out on the default grid.
///
/// Items the symbology rejects become error cells; they never fail the export.
pub fn export_document(
    items: &[String],
    symbology: Symbology,
    title: &str,
) -> Result<Document, ExportError> {
    export_document_with_layout(items, symbology, title, DocumentLayout::default())
}

pub fn export_document_with_layout(
    items: &[String],
    symbology: Symbology,
    title: &str,
    layout: DocumentLayout,
) -> Result<Document, ExportError> {
    if items.is_empty() {
        return Err(ExportError::Invalid("nothing to export".to_string()));
    }
    if layout.items_per_page == 0 || layout.columns == 0 {
        return Err(ExportError::Invalid(
            "layout needs at least one column and one item per page".to_string(),
        ));
    }

    let mut pages: Vec<Page> = Vec::with_capacity(layout.page_count(items.len()));
    for (index, item) in items.iter().enumerate() {
        if index % layout.items_per_page == 0 {
            pages.push(Page {
                number: pages.len() + 1,
                title: title.to_string(),
                title_x_mm: layout.page_width_mm / 2.0,
                title_y_mm: layout.margin_mm,
                cells: Vec::with_capacity(layout.items_per_page),
            });
        }

        let slot = index % layout.items_per_page;
        let column = slot % layout.columns;
        let row = slot / layout.columns;
        let (x_mm, y_mm) = layout.cell_origin(column, row);

        let content = match symbology.encoded_payload(item) {
            Ok(payload) => CellContent::Barcode {
                payload,
                caption: item.clone(),
                caption_x_mm: x_mm + layout.barcode_width_mm / 2.0,
                caption_y_mm: y_mm + layout.barcode_height_mm + layout.text_height_mm,
            },
            Err(err) => {
                tracing::warn!(event = "barcode_rejected", index, error = %err);
                CellContent::Error {
                    message: format!("Error generating barcode for: {item}"),
                }
            }
        };

        if let Some(page) = pages.last_mut() {
            page.cells.push(Cell {
                index,
                column,
                row,
                x_mm,
                y_mm,
                width_mm: layout.barcode_width_mm,
                height_mm: layout.barcode_height_mm,
                value: item.clone(),
                content,
            });
        }
    }

    Ok(Document {
        title: title.to_string(),
        file_name: document_file_name(title),
        symbology,
        layout,
        pages,
    })
}

/// `title` lowercased with each whitespace character replaced by `_`.
pub fn document_file_name(title: &str) -> String {
    let stem: String = title
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_whitespace() { '_' } else { ch })
        .collect();
    format!("{stem}.json")
}

/// Write `document` into `dir` under its file name and return the path.
pub fn write_document(dir: &Path, document: &Document) -> Result<PathBuf, ExportError> {
    let path = dir.join(&document.file_name);
    write_json_atomic(&path, document)?;
    tracing::info!(
        event = "export_written",
        path = %path.display(),
        pages = document.pages.len(),
        items = document.item_count(),
        errors = document.error_count()
    );
    Ok(path)
}
