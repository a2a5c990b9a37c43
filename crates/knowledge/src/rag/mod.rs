//! Retrieval-augmented answering: context assembly, answer generation and the
//! pipeline that sequences classification, embedding, retrieval and generation.

pub mod context;
pub mod generate;
pub mod pipeline;
pub mod types;

pub use context::{assemble, AssembledContext};
pub use generate::{AnswerGenerator, ANSWER_TEMPERATURE};
pub use pipeline::{PipelineFailure, PipelineOutcome, PipelineStage, RagPipeline, SearchHits};
pub use types::{AnswerResult, Citation, CLARIFICATION_MESSAGE, NO_RESULTS_MESSAGE};
