pub mod archive;
pub mod pdf;

pub use archive::ArchiveWorkspace;
pub use pdf::extract_lines;
