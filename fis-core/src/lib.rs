pub mod chat;
pub mod error;
pub mod file;
pub mod format;
pub mod settings;

// Public library API - callers outside this crate (the CLI, chat front ends)
// should only need these.
pub use chat::session::{GenerateSettings, ProjectSession};
pub use error::FisError;
pub use file::apply::{apply, apply_document, materialize, materialize_document, ApplyReport};
pub use file::ignore::{IgnoreOptions, IgnoreRules};
pub use format::decode::decode;
pub use format::encode::{encode, encode_to_string, EncodeOptions, Encoded};
pub use format::preamble::PreambleLanguage;
pub use format::{Directive, Record};
pub use settings::RuleFile;
