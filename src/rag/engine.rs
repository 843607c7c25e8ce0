//! Conversational RAG engine.

use super::ContextAssembler;
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::{ChatMessage, LlmProvider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One completed question/answer exchange.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
}

/// Engine that answers questions over the documentation corpus, carrying a
/// bounded conversation history.
///
/// History is append-only from the engine's side and grows without bound in
/// storage, but only the most recent turns are replayed into any prompt.
/// `ask` takes `&mut self`: one call owns the history for its duration, so
/// concurrent sessions should each hold their own engine.
pub struct RagEngine {
    provider: Arc<dyn LlmProvider>,
    assembler: ContextAssembler,
    prompts: Prompts,
    history: Vec<ConversationTurn>,
    /// Turns replayed into each prompt (two messages per turn).
    history_turns: usize,
}

impl RagEngine {
    /// Create an engine over an already-constructed provider.
    ///
    /// Provider construction (and thus credential validation) happens
    /// before any engine exists, so there is no half-initialized state.
    pub fn new(assembler: ContextAssembler, provider: Arc<dyn LlmProvider>) -> Self {
        info!("RAG engine initialized with provider '{}'", provider.name());
        Self {
            provider,
            assembler,
            prompts: Prompts::default(),
            history: Vec::new(),
            history_turns: 3,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set how many past turns are replayed into each prompt.
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    /// Ask a question and get an answer grounded in the corpus.
    ///
    /// Retrieval failures propagate as errors. A provider failure is
    /// converted into an apology string carrying the failure reason and
    /// leaves history untouched, so interactive loops stay unbroken and a
    /// retry replays the same conversation state.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        info!("Processing question");

        let context = self.assembler.retrieve(question).await?;
        let context_text = if context.is_empty() {
            "(No relevant documentation found in the index.)".to_string()
        } else {
            self.assembler.format(&context)
        };

        let messages = self.build_messages(question, &context_text);

        match self.provider.invoke(&messages).await {
            Ok(answer) => {
                self.history.push(ConversationTurn {
                    question: question.to_string(),
                    answer: answer.clone(),
                });
                Ok(answer)
            }
            Err(e) => {
                warn!("Provider failed, history left unchanged: {}", e);
                Ok(format!("I apologize, but I encountered an error: {}", e))
            }
        }
    }

    /// Build the message sequence for one question.
    ///
    /// The prompt is a pure function of the question, current history, and
    /// retrieved context: one system message, the most recent turns as
    /// user/assistant pairs in original order, then the question with its
    /// context embedded.
    fn build_messages(&self, question: &str, context_text: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.prompts.rag.system.clone())];

        let replay = self.history.len().saturating_sub(self.history_turns);
        for turn in &self.history[replay..] {
            messages.push(ChatMessage::user(turn.question.clone()));
            messages.push(ChatMessage::assistant(turn.answer.clone()));
        }

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context_text.to_string());
        vars.insert("question".to_string(), question.to_string());
        messages.push(ChatMessage::user(
            self.prompts.render_with_custom(&self.prompts.rag.user, &vars),
        ));

        messages
    }

    /// Clear conversation history. Idempotent.
    pub fn clear_history(&mut self) {
        self.history.clear();
        info!("Conversation history cleared");
    }

    /// Number of completed turns in history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::LetterFrequencyEmbedder;
    use crate::ingest::{Document, DocumentKind};
    use crate::llm::testing::MockProvider;
    use crate::llm::Role;
    use crate::vector_store::{MemoryVectorStore, VectorStore};

    async fn engine_with(provider: Arc<MockProvider>) -> RagEngine {
        let store = Arc::new(MemoryVectorStore::new(Arc::new(LetterFrequencyEmbedder)));
        store
            .add_documents(&[Document {
                title: "Customization".to_string(),
                url: "https://docs.example.com".to_string(),
                content: "Forms can be customized with extra fields and event hooks.".to_string(),
                code_examples: vec!["form.add_field(Field::text(\"notes\"));".to_string()],
                kind: DocumentKind::Content,
            }])
            .await
            .unwrap();

        RagEngine::new(ContextAssembler::new(store), provider)
    }

    #[tokio::test]
    async fn test_ask_appends_history_and_returns_answer() {
        let provider = Arc::new(MockProvider::new());
        let mut engine = engine_with(provider.clone()).await;

        let answer = engine.ask("How do I add a field?").await.unwrap();
        assert_eq!(answer, "answer 1");
        assert_eq!(engine.history_len(), 1);
    }

    #[tokio::test]
    async fn test_prompt_embeds_context_and_question() {
        let provider = Arc::new(MockProvider::new());
        let mut engine = engine_with(provider.clone()).await;

        engine.ask("How do I customize a form?").await.unwrap();

        let calls = provider.calls.lock().unwrap();
        let messages = &calls[0];
        assert_eq!(messages[0].role, Role::System);
        let last = messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert!(last.content.contains("How do I customize a form?"));
        assert!(last.content.contains("Relevant Documentation"));
    }

    #[tokio::test]
    async fn test_history_window_replays_last_three_turns() {
        let provider = Arc::new(MockProvider::new());
        let mut engine = engine_with(provider.clone()).await;

        for i in 1..=4 {
            engine.ask(&format!("question {}", i)).await.unwrap();
        }
        engine.ask("question 5").await.unwrap();

        let calls = provider.calls.lock().unwrap();
        let fifth = &calls[4];
        // system + 3 replayed turns (6 messages) + current question.
        assert_eq!(fifth.len(), 8);
        assert_eq!(fifth[1].content, "question 2");
        assert_eq!(fifth[2].content, "answer 2");
        assert_eq!(fifth[5].content, "question 4");
        assert!(!fifth.iter().any(|m| m.content == "question 1"));
    }

    #[tokio::test]
    async fn test_short_history_replays_everything() {
        let provider = Arc::new(MockProvider::new());
        let mut engine = engine_with(provider.clone()).await;

        engine.ask("first").await.unwrap();
        engine.ask("second").await.unwrap();

        let calls = provider.calls.lock().unwrap();
        // system + 1 turn + question.
        assert_eq!(calls[1].len(), 4);
        assert_eq!(calls[1][1].content, "first");
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_history_and_returns_apology() {
        let provider = Arc::new(MockProvider::failing("rate limited"));
        let mut engine = engine_with(provider.clone()).await;

        let answer = engine.ask("will fail").await.unwrap();
        assert!(answer.contains("I apologize"));
        assert!(answer.contains("rate limited"));
        // History untouched, so a retry replays the same state.
        assert_eq!(engine.history_len(), 0);
    }

    #[tokio::test]
    async fn test_clear_history_is_idempotent() {
        let provider = Arc::new(MockProvider::new());
        let mut engine = engine_with(provider.clone()).await;

        engine.ask("one").await.unwrap();
        engine.clear_history();
        assert_eq!(engine.history_len(), 0);
        engine.clear_history();
        assert_eq!(engine.history_len(), 0);

        // The next prompt replays nothing.
        engine.ask("two").await.unwrap();
        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.last().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_index_notes_missing_context() {
        let store = Arc::new(MemoryVectorStore::new(Arc::new(LetterFrequencyEmbedder)));
        let provider = Arc::new(MockProvider::new());
        let mut engine = RagEngine::new(ContextAssembler::new(store), provider.clone());

        engine.ask("anything").await.unwrap();
        let calls = provider.calls.lock().unwrap();
        assert!(calls[0]
            .last()
            .unwrap()
            .content
            .contains("No relevant documentation found"));
    }
}
