pub mod layout;
pub mod pdf;
pub mod report;

pub use layout::{DocumentBuilder, PageGeometry};
pub use report::{build_pages, render_pdf, ScanReport};
