// Resume analysis: prompt building, response normalization, orchestration and rendering.
// All LLM calls go through llm_client; handlers only see Analyzer.

pub mod analyzer;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod prompts;
pub mod render;
