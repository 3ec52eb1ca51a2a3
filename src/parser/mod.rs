// file: src/parser/mod.rs
// description: pdf loading module exports
// reference: internal module structure

pub mod normalizer;
pub mod pdf;

pub use normalizer::TextNormalizer;
pub use pdf::PdfLoader;
