//! Scripted generator for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::generation::{GenerationError, Generator};

/// A generator that replays queued responses
///
/// Each call pops the next queued result; once the queue is empty the
/// fallback text is returned. Every prompt is recorded.
#[derive(Debug)]
pub struct MockGenerator {
    queue: Mutex<VecDeque<Result<String, GenerationError>>>,
    fallback: String,
    prompts: Mutex<Vec<String>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("Generated text.")
    }
}

impl MockGenerator {
    /// Create a mock that always answers with `fallback`
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: fallback.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful completion
    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(Ok(text.into()));
        }
        self
    }

    /// Queue a failure
    pub fn push_error(&self, error: GenerationError) -> &Self {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(Err(error));
        }
        self
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let next = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    fn name(&self) -> &str {
        "Mock Generator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_then_fallback() {
        let generator = MockGenerator::new("fallback");
        generator
            .push_text("first")
            .push_error(GenerationError::EmptyResponse);

        tokio_test::block_on(async {
            assert_eq!(generator.complete("a").await, Ok("first".to_string()));
            assert_eq!(
                generator.complete("b").await,
                Err(GenerationError::EmptyResponse)
            );
            assert_eq!(generator.complete("c").await, Ok("fallback".to_string()));
        });

        assert_eq!(generator.prompts(), vec!["a", "b", "c"]);
    }
}
