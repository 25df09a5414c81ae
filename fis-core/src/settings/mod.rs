//! Project-local configuration.
//!
//! The only setting FIS reads is the custom ignore rule file kept at the root of
//! the project being encoded (see [`RuleFile`]).

pub mod rules;

pub use rules::RuleFile;
