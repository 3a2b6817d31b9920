//! Text preparation for speech synthesis
//!
//! - `segmenter` splits `**foreign**`-annotated text into language-tagged segments
//! - `sanitizer` strips everything a speech engine should not read aloud
//! - `escape` makes text safe to embed in SSML

mod escape;
mod sanitizer;
mod segmenter;

pub use escape::escape_markup;
pub use sanitizer::{plain_text_for_speech, sanitize_for_speech};
pub use segmenter::{DELIMITER, segment_bilingual};
