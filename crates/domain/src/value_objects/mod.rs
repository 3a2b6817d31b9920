//! Value Objects - Immutable, identity-less domain primitives

mod language;
mod language_code;
mod segment;
mod voice_profile;
mod voice_variant;

pub use language::Language;
pub use language_code::LanguageCode;
pub use segment::Segment;
pub use voice_profile::{VoiceProfile, VoiceTier};
pub use voice_variant::VoiceVariant;
