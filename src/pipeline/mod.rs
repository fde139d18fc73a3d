pub mod assembly;
pub mod batch;
pub mod diagnostic; // OCR text artifacts (SECA_OCR_DEBUG)
pub mod extraction;
pub mod parsing;
pub mod processor;
pub mod quality;
