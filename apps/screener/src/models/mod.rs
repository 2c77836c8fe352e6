pub mod document;
pub mod prediction;
