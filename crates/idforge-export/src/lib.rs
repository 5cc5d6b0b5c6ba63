//! Export side of idforge: barcode symbology checks, the paginated barcode
//! document, and CSV/JSON batch output.
//!
//! Generated values are treated as opaque text here; nothing in this crate
//! alters a value before handing it to a renderer.

pub mod atomic;
pub mod document;
pub mod errors;
pub mod output;
pub mod symbology;
pub mod text_list;

pub use document::{Cell, CellContent, Document, DocumentLayout, Page, export_document, write_document};
pub use errors::ExportError;
pub use symbology::{RenderError, Symbology};
pub use text_list::parse_text_list;
