//! End-to-end pipeline behavior against in-process services.

use super::fakes::{document, FakeEmbedder, FakeIndex, ScriptedLlm};
use crate::classifier::Classifier;
use crate::rag::{
    AnswerGenerator, AnswerResult, PipelineOutcome, PipelineStage, RagPipeline,
    CLARIFICATION_MESSAGE, NO_RESULTS_MESSAGE,
};
use crate::retriever::{CollectionMap, Retriever};
use crate::types::{Category, ConversationTurn};
use docroute_core::{AppError, RetryPolicy};
use docroute_llm::{ChatRole, LlmClient};
use docroute_prompt::{builtin_prompt, ANSWER_PROMPT_ID, CLASSIFY_PROMPT_ID};
use std::sync::Arc;

const POLICY: &str = "TestPolicyUpload";
const RESUME: &str = "ApplicantCV";

struct Harness {
    llm: Arc<ScriptedLlm>,
    embedder: Arc<FakeEmbedder>,
    index: Arc<FakeIndex>,
    pipeline: RagPipeline,
}

fn harness(llm: ScriptedLlm, embedder: FakeEmbedder, index: FakeIndex) -> Harness {
    let llm = Arc::new(llm);
    let embedder = Arc::new(embedder);
    let index = Arc::new(index);
    let client: Arc<dyn LlmClient> = llm.clone();

    let pipeline = RagPipeline::new(
        Classifier::new(
            client.clone(),
            "gpt-4o",
            builtin_prompt(CLASSIFY_PROMPT_ID).unwrap(),
        ),
        embedder.clone(),
        Retriever::new(index.clone(), CollectionMap::default()),
        AnswerGenerator::new(client, "gpt-4o", builtin_prompt(ANSWER_PROMPT_ID).unwrap()),
    );

    Harness {
        llm,
        embedder,
        index,
        pipeline,
    }
}

fn populated_index() -> FakeIndex {
    FakeIndex::default()
        .with_collection(
            POLICY,
            vec![
                document(Some("Dental plan"), "Dental is covered at 80%.", 0.12),
                document(None, "Orthodontics require pre-approval.", 0.31),
            ],
        )
        .with_collection(
            RESUME,
            vec![document(Some("Jane Doe CV"), "Senior Rust engineer.", 0.2)],
        )
}

#[tokio::test]
async fn test_policy_question_is_answered_with_citations() {
    let h = harness(
        ScriptedLlm::replying(&["Policy", "Dental is covered at **80%**."]),
        FakeEmbedder::new(vec![0.1, 0.2, 0.3]),
        populated_index(),
    );

    let outcome = h
        .pipeline
        .run("What is the dental benefit?", &[])
        .await
        .unwrap();

    let (category, result) = match outcome {
        PipelineOutcome::Answered { category, result } => (category, result),
        other => panic!("expected an answer, got {:?}", other),
    };
    assert_eq!(category, Category::PolicyDomain);
    assert_eq!(result.answer, "Dental is covered at **80%**.");
    assert_eq!(result.citations.len(), 2);
    assert_eq!(result.citations[0].index, 1);
    assert_eq!(result.citations[0].title, "Dental plan");
    assert_eq!(result.citations[1].index, 2);
    assert_eq!(result.citations[1].title, "Document 2");

    assert_eq!(h.index.queried_collections(), vec![POLICY]);
    assert_eq!(h.embedder.calls(), 1);
    assert_eq!(h.llm.calls(), 2);

    let requests = h.llm.requests.lock().unwrap();
    assert_eq!(requests[0].temperature, Some(0.0));
    assert_eq!(requests[1].temperature, Some(0.2));
    let context_turn = &requests[1].messages.last().unwrap().content;
    assert!(context_turn.contains("Document #1:\n- Description: Dental plan"));
    assert!(context_turn.contains("\n\n---\n\nDocument #2:"));
}

#[tokio::test]
async fn test_unresolved_classification_stops_the_pipeline() {
    let h = harness(
        ScriptedLlm::replying(&["I am not sure."]),
        FakeEmbedder::new(vec![0.1]),
        populated_index(),
    );

    let outcome = h.pipeline.run("gibberish ???", &[]).await.unwrap();
    assert_eq!(outcome, PipelineOutcome::Unresolved);

    let answer = outcome.into_answer();
    assert_eq!(answer.answer, CLARIFICATION_MESSAGE);
    assert!(answer.citations.is_empty());

    assert_eq!(h.llm.calls(), 1);
    assert_eq!(h.embedder.calls(), 0);
    assert!(h.index.queried_collections().is_empty());
}

#[tokio::test]
async fn test_empty_retrieval_skips_generation() {
    let index = FakeIndex::default()
        .with_collection(POLICY, vec![document(Some("Dental plan"), "x", 0.1)])
        .with_collection(RESUME, Vec::new());
    let h = harness(
        ScriptedLlm::replying(&["Resume", "should never be used"]),
        FakeEmbedder::new(vec![0.1]),
        index,
    );

    let answer = h
        .pipeline
        .respond("Who has Kubernetes experience?", &[])
        .await;

    assert_eq!(answer, AnswerResult::no_results());
    assert_eq!(answer.answer, NO_RESULTS_MESSAGE);
    assert_eq!(h.index.queried_collections(), vec![RESUME]);
    assert_eq!(h.llm.calls(), 1);
}

#[tokio::test]
async fn test_category_selects_only_its_collection() {
    for (label, collection) in [("Policy", POLICY), ("Resume", RESUME)] {
        let h = harness(
            ScriptedLlm::replying(&[label, "answer"]),
            FakeEmbedder::new(vec![0.5]),
            populated_index(),
        );

        h.pipeline.run("question", &[]).await.unwrap();
        assert_eq!(h.index.queried_collections(), vec![collection]);
    }
}

#[tokio::test]
async fn test_top_k_is_passed_as_limit() {
    let mut h = harness(
        ScriptedLlm::replying(&["Policy", "answer"]),
        FakeEmbedder::new(vec![0.5]),
        populated_index(),
    );
    h.pipeline = h.pipeline.with_top_k(1);

    let answer = h.pipeline.respond("dental?", &[]).await;

    assert_eq!(answer.citations.len(), 1);
    assert_eq!(h.index.queries.lock().unwrap()[0], (POLICY.to_string(), 1));
}

#[tokio::test]
async fn test_empty_question_fails_before_any_call() {
    let h = harness(
        ScriptedLlm::replying(&["Policy"]),
        FakeEmbedder::new(vec![0.1]),
        populated_index(),
    );

    let failure = h.pipeline.run("   ", &[]).await.unwrap_err();
    assert_eq!(failure.stage, PipelineStage::Received);
    assert!(matches!(failure.error, AppError::Validation(_)));
    assert_eq!(h.llm.calls(), 0);
    assert_eq!(h.embedder.calls(), 0);
}

#[tokio::test]
async fn test_upstream_failure_becomes_error_reply() {
    let h = harness(
        ScriptedLlm::replying(&["Policy"]),
        FakeEmbedder::failing(),
        populated_index(),
    );

    let failure = h.pipeline.run("dental?", &[]).await.unwrap_err();
    assert_eq!(failure.stage, PipelineStage::Embedding);
    assert!(matches!(failure.error, AppError::Upstream(_)));

    let answer = failure.to_answer();
    assert!(answer
        .answer
        .starts_with("There was an error connecting to the knowledge base: "));
    assert!(!answer.answer.contains("overloaded"));
    assert!(answer.citations.is_empty());
    assert!(h.index.queried_collections().is_empty());
}

#[tokio::test]
async fn test_classifier_transport_failure() {
    let h = harness(
        ScriptedLlm::new(vec![Err(AppError::Upstream("timeout".to_string()))]),
        FakeEmbedder::new(vec![0.1]),
        populated_index(),
    );

    let failure = h.pipeline.run("dental?", &[]).await.unwrap_err();
    assert_eq!(failure.stage, PipelineStage::Classifying);
    assert_eq!(h.embedder.calls(), 0);
}

#[tokio::test]
async fn test_retrieval_failure_is_not_retried_by_default() {
    let h = harness(
        ScriptedLlm::replying(&["Policy", "answer"]),
        FakeEmbedder::new(vec![0.1]),
        populated_index().failing_times(1),
    );

    let failure = h.pipeline.run("dental?", &[]).await.unwrap_err();
    assert_eq!(failure.stage, PipelineStage::Retrieving);
    assert!(matches!(failure.error, AppError::Retrieval(_)));
    assert_eq!(h.index.queried_collections().len(), 1);
}

#[tokio::test]
async fn test_retry_policy_recovers_from_transient_failure() {
    let mut h = harness(
        ScriptedLlm::replying(&["Policy", "answer"]),
        FakeEmbedder::new(vec![0.1]),
        populated_index().failing_times(1),
    );
    h.pipeline = h.pipeline.with_retry(RetryPolicy {
        max_attempts: 2,
        initial_backoff_ms: 1,
    });

    let outcome = h.pipeline.run("dental?", &[]).await.unwrap();
    assert_eq!(outcome.category(), Some(Category::PolicyDomain));
    assert_eq!(h.index.queried_collections(), vec![POLICY, POLICY]);
}

#[tokio::test]
async fn test_history_conditions_both_model_calls() {
    let h = harness(
        ScriptedLlm::replying(&["Resume", "Jane knows Rust."]),
        FakeEmbedder::new(vec![0.1]),
        populated_index(),
    );
    let history = vec![
        ConversationTurn::user("Find me a backend engineer"),
        ConversationTurn::assistant("Jane Doe is a senior engineer."),
    ];

    h.pipeline.run("Does she know Rust?", &history).await.unwrap();

    let requests = h.llm.requests.lock().unwrap();
    for request in requests.iter() {
        let roles: Vec<ChatRole> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::System,
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User
            ]
        );
        assert_eq!(request.messages[1].content, "Find me a backend engineer");
    }
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_repeated_retrieval_is_stable() {
    let index = Arc::new(populated_index());
    let retriever = Retriever::new(index, CollectionMap::default());

    let first = retriever
        .retrieve(&[0.1, 0.2], Category::PolicyDomain, 5)
        .await
        .unwrap();
    let second = retriever
        .retrieve(&[0.1, 0.2], Category::PolicyDomain, 5)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert!(first[0].distance <= first[1].distance);
}

#[tokio::test]
async fn test_search_with_explicit_category_skips_classification() {
    let h = harness(
        ScriptedLlm::default(),
        FakeEmbedder::new(vec![0.1]),
        populated_index(),
    );

    let hits = h
        .pipeline
        .search("rust engineer", Some(Category::ResumeDomain), Some(3))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(hits.collection, RESUME);
    assert_eq!(hits.documents.len(), 1);
    assert_eq!(h.llm.calls(), 0);
    assert_eq!(h.index.queries.lock().unwrap()[0], (RESUME.to_string(), 3));
}

#[tokio::test]
async fn test_search_unroutable_query() {
    let h = harness(
        ScriptedLlm::replying(&["Weather"]),
        FakeEmbedder::new(vec![0.1]),
        populated_index(),
    );

    let hits = h.pipeline.search("is it raining", None, None).await.unwrap();
    assert!(hits.is_none());
    assert_eq!(h.embedder.calls(), 0);
}

fn ollama_config(workspace: &std::path::Path) -> docroute_core::AppConfig {
    docroute_core::AppConfig {
        workspace: workspace.to_path_buf(),
        provider: "ollama".to_string(),
        model: "llama3.2".to_string(),
        embedding_provider: "ollama".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_from_config_builds_local_pipeline() {
    let temp = tempfile::TempDir::new().unwrap();
    let pipeline = RagPipeline::from_config(&ollama_config(temp.path()));
    assert!(pipeline.is_ok());
}

#[test]
fn test_from_config_rejects_mismatched_prompt_override() {
    let temp = tempfile::TempDir::new().unwrap();
    let prompts = temp.path().join(".docroute").join("prompts");
    std::fs::create_dir_all(&prompts).unwrap();
    std::fs::write(
        prompts.join("rag.answer.yml"),
        "id: something.else\ntitle: Wrong\napiVersion: \"1.0\"\ncreatedBy: test\ntemplate: \"{{question}}\"\n",
    )
    .unwrap();

    let result = RagPipeline::from_config(&ollama_config(temp.path()));
    assert!(matches!(result, Err(AppError::Prompt(_))));
}
