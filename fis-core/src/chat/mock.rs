use std::collections::VecDeque;

use anyhow::anyhow;

use super::{ChatProvider, ChunkStream};

/// Scripted reply for the mock provider
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Stream these chunks, then finish
    Chunks(Vec<String>),
    /// Stream these chunks, then fail mid-stream
    ChunksThenError { chunks: Vec<String>, error: String },
    /// Refuse the request before streaming anything
    Refuse(String),
}

impl MockReply {
    /// Whole reply split into chunks of at most `size` characters.
    pub fn chunked(text: &str, size: usize) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Self::Chunks(
            chars
                .chunks(size.max(1))
                .map(|c| c.iter().collect::<String>())
                .collect(),
        )
    }
}

/// Mock chat provider for testing. Replies are consumed in order; once the
/// queue is empty every request is refused.
#[derive(Debug, Default)]
pub struct MockProvider {
    replies: VecDeque<MockReply>,
    prompts: Vec<String>,
}

impl MockProvider {
    pub fn new(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    pub fn push(&mut self, reply: MockReply) {
        self.replies.push_back(reply);
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn ask(&mut self, prompt: &str) -> anyhow::Result<ChunkStream<'_>> {
        self.prompts.push(prompt.to_string());
        let reply = self
            .replies
            .pop_front()
            .unwrap_or_else(|| MockReply::Refuse("no scripted reply left".to_string()));

        match reply {
            MockReply::Chunks(chunks) => Ok(Box::new(chunks.into_iter().map(Ok))),
            MockReply::ChunksThenError { chunks, error } => Ok(Box::new(
                chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(anyhow!(error)))),
            )),
            MockReply::Refuse(error) => Err(anyhow!(error)),
        }
    }
}
