//! Conversational round trips over a FIS document.
//!
//! Model SDKs live outside this crate; they plug in through [`ChatProvider`],
//! which only has to turn a prompt into a finite stream of text chunks. The
//! accumulated reply is itself a FIS document (usually fenced and wrapped in
//! prose) that [`session::ProjectSession`] can apply back to the project.

pub mod mock;
pub mod session;

use crate::format::preamble::PreambleLanguage;

/// Lazily produced reply chunks. The stream is finite and cannot be restarted.
pub type ChunkStream<'a> = Box<dyn Iterator<Item = anyhow::Result<String>> + 'a>;

pub trait ChatProvider {
    fn name(&self) -> &str;

    fn ask(&mut self, prompt: &str) -> anyhow::Result<ChunkStream<'_>>;
}

/// Prompt sent for a question about the project described by `document`.
pub fn question_prompt(document: &str, question: &str, language: PreambleLanguage) -> String {
    format!("\n{document}\n\n{}\n{question}\n", language.question_lead())
}
