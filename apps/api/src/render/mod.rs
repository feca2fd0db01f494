// Report rendering: tagged section views -> block document -> markdown or PDF.

pub mod document;
pub mod handlers;
pub mod markdown;
pub mod pdf;
pub mod sections;
