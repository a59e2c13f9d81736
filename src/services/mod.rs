pub mod archiver;
pub mod document_renderer;
pub mod order_source;
pub mod pdf_pages;
pub mod receipt_builder;
pub mod snapshot_normalizer;

pub use archiver::{BundleArchiver, ZipArchiver};
pub use document_renderer::{ChromePdfRenderer, DocumentRenderer};
pub use receipt_builder::ReceiptBuilder;
pub use snapshot_normalizer::SnapshotNormalizer;
