pub mod error;
pub mod pacing;
pub mod diagnostics;

pub mod ephemeris_client;
pub mod response_normalizer;
pub mod llm_client;
pub mod prompt_builder;
pub mod interpretation;
pub mod pipeline;
