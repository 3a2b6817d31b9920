//! Domain layer for the exam-study speech core
//!
//! Contains the language-tagged value objects, the bilingual segmenter and
//! the speech sanitizer. This layer performs no I/O.

pub mod errors;
pub mod text;
pub mod value_objects;

pub use errors::DomainError;
pub use text::{escape_markup, plain_text_for_speech, sanitize_for_speech, segment_bilingual};
pub use value_objects::*;
