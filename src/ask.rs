use anyhow::Result;

use crate::cohere::CohereClient;
use crate::config::AppConfig;
use crate::models::AskResponse;
use crate::qdrant_store::{QdrantStore, SearchHit};

const NO_CONTEXT_ANSWER: &str = "I couldn't find relevant information in the book to answer \
     your question. Please try rephrasing or ask about a different topic from the book.";

/// Answers questions about the book: embed the question, retrieve the
/// closest chunks from Qdrant, and generate a grounded answer with the
/// chat model.
#[derive(Clone)]
pub struct AskService {
    config: AppConfig,
    cohere: CohereClient,
    qdrant: QdrantStore,
}

impl AskService {
    pub fn new(config: AppConfig, cohere: CohereClient, qdrant: QdrantStore) -> Self {
        Self {
            config,
            cohere,
            qdrant,
        }
    }

    pub async fn answer(&self, question: &str) -> Result<AskResponse> {
        let embedding = self
            .cohere
            .embed_query(&self.config.models.embed_model, question)
            .await?;

        let hits = self
            .qdrant
            .search(&embedding, self.config.models.retrieval_limit)
            .await?;

        if hits.is_empty() {
            return Ok(AskResponse {
                question: question.to_string(),
                answer: NO_CONTEXT_ANSWER.to_string(),
            });
        }

        let context = build_context(&hits);
        let prompt = build_answer_prompt(question, &context);

        let answer = self
            .cohere
            .chat(
                &self.config.models.chat_model,
                &prompt,
                self.config.models.max_answer_tokens,
                self.config.models.answer_temperature,
            )
            .await?;

        Ok(AskResponse {
            question: question.to_string(),
            answer,
        })
    }
}

fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_answer_prompt(question: &str, context: &str) -> String {
    format!(
        "You are an AI assistant for the AI Textbook. Your purpose is to answer questions \
         about the book content.\n\
         Answer the user's question based on the context provided below.\n\n\
         Context information is below:\n\
         ---------------------\n\
         {context}\n\
         ---------------------\n\n\
         User Query: {question}\n\n\
         Provide a helpful and accurate answer based on the context. If the context doesn't \
         contain the information needed to answer the question, say so clearly. Always be \
         helpful and reference the book content when possible."
    )
}
