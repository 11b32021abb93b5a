//! Run Council use case
//!
//! Orchestrates the two-round grading council: independent grading, agreement
//! check, optional deliberation, and weighted aggregation.

use crate::config::ExecutionParams;
use crate::ports::llm_gateway::{CompletionRequest, LlmGateway};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::invoke_model::{GradeError, ModelInvoker};
use council_domain::{
    CouncilResult, CouncilState, Credential, DomainError, GraderFailure, GraderResult,
    GradingRound, Model, PromptTemplate, RubricCategory, aggregate, agreement,
    parse_grade_response, validate_rubric,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default agreement needed to skip deliberation
pub const DEFAULT_AGREEMENT_THRESHOLD: f64 = 0.8;

/// Errors that can occur during a council run
#[derive(Error, Debug)]
pub enum RunCouncilError {
    #[error("No grading models configured")]
    NoModels,

    #[error(transparent)]
    InvalidInput(#[from] DomainError),

    #[error("All grading models failed ({} failure(s))", failures.len())]
    AllGradersFailed { failures: Vec<GraderFailure> },

    #[error("Operation cancelled")]
    Cancelled,
}

impl RunCouncilError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunCouncilError::Cancelled)
    }
}

/// Input for the RunCouncil use case
#[derive(Debug, Clone)]
pub struct RunCouncilInput {
    /// Transcript to grade, embedded verbatim in the prompts
    pub transcript: String,
    pub rubric: Vec<RubricCategory>,
    /// Graders, in dispatch order
    pub models: Vec<Model>,
    pub agreement_threshold: f64,
    /// Resolved once per run and forwarded unchanged to every call
    pub credential: Credential,
    pub cancellation: Option<CancellationToken>,
}

impl RunCouncilInput {
    pub fn new(
        transcript: impl Into<String>,
        rubric: Vec<RubricCategory>,
        models: Vec<Model>,
        credential: Credential,
    ) -> Self {
        Self {
            transcript: transcript.into(),
            rubric,
            models,
            agreement_threshold: DEFAULT_AGREEMENT_THRESHOLD,
            credential,
            cancellation: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.agreement_threshold = threshold;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn validate(&self) -> Result<(), RunCouncilError> {
        if self.models.is_empty() {
            return Err(RunCouncilError::NoModels);
        }
        validate_rubric(&self.rubric)?;
        if !(0.0..=1.0).contains(&self.agreement_threshold) {
            return Err(DomainError::InvalidThreshold(self.agreement_threshold).into());
        }
        Ok(())
    }
}

/// Outcome of one fan-out round
#[derive(Debug, Default)]
struct RoundOutcome {
    /// Successful grades, in dispatch order
    results: Vec<GraderResult>,
    failures: Vec<GraderFailure>,
}

/// Tracks the council state machine of one run
struct CouncilRun {
    state: CouncilState,
}

impl CouncilRun {
    fn new() -> Self {
        Self {
            state: CouncilState::Init,
        }
    }

    fn advance(&mut self, next: CouncilState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal council transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "Council state transition");
        self.state = next;
    }
}

/// Use case for running a grading council
pub struct RunCouncilUseCase<G: LlmGateway + 'static> {
    invoker: ModelInvoker<G>,
}

impl<G: LlmGateway + 'static> RunCouncilUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_params(gateway, ExecutionParams::default())
    }

    pub fn with_params(gateway: Arc<G>, params: ExecutionParams) -> Self {
        Self {
            invoker: ModelInvoker::new(gateway, params),
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunCouncilInput) -> Result<CouncilResult, RunCouncilError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunCouncilInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<CouncilResult, RunCouncilError> {
        input.validate()?;

        let cancellation = input.cancellation.clone().unwrap_or_default();
        let transcript: Arc<str> = Arc::from(input.transcript.as_str());
        let mut run = CouncilRun::new();

        info!(
            models = input.models.len(),
            threshold = input.agreement_threshold,
            "Starting grading council"
        );

        // Round 1: Independent grading
        run.advance(CouncilState::Round1InFlight);
        let round1 = self
            .run_round(GradingRound::Independent, &input, &transcript, &[], &cancellation, progress)
            .await?;
        let mut failures = round1.failures;

        if round1.results.is_empty() {
            run.advance(CouncilState::AllFailed);
            warn!("All grading models failed in round 1");
            return Err(RunCouncilError::AllGradersFailed { failures });
        }

        let round1_agreement = agreement(&round1.results);
        progress.on_agreement(
            GradingRound::Independent,
            round1_agreement,
            input.agreement_threshold,
        );
        info!(
            agreement = round1_agreement,
            graders = round1.results.len(),
            "Round 1 agreement computed"
        );

        if round1_agreement >= input.agreement_threshold {
            run.advance(CouncilState::Agreed);
            let final_grade = self.finalize(&round1.results, &input.rubric);
            return Ok(CouncilResult {
                round1_grades: round1.results,
                round2_grades: None,
                final_grade,
                agreement_score: round1_agreement,
                rounds_used: 1,
                failures,
            });
        }

        // Round 2: Deliberation over the original model list
        run.advance(CouncilState::Round2InFlight);
        info!(
            agreement = round1_agreement,
            threshold = input.agreement_threshold,
            "Agreement below threshold, starting deliberation"
        );
        let round2 = self
            .run_round(
                GradingRound::Deliberation,
                &input,
                &transcript,
                &round1.results,
                &cancellation,
                progress,
            )
            .await?;
        failures.extend(round2.failures);
        run.advance(CouncilState::Finalized);

        if round2.results.is_empty() {
            warn!("All grading models failed in round 2, falling back to round 1 results");
            let final_grade = self.finalize(&round1.results, &input.rubric);
            return Ok(CouncilResult {
                round1_grades: round1.results,
                round2_grades: Some(Vec::new()),
                final_grade,
                agreement_score: round1_agreement,
                rounds_used: 1,
                failures,
            });
        }

        let round2_agreement = agreement(&round2.results);
        progress.on_agreement(
            GradingRound::Deliberation,
            round2_agreement,
            input.agreement_threshold,
        );
        info!(agreement = round2_agreement, "Round 2 agreement computed");

        let final_grade = self.finalize(&round2.results, &input.rubric);
        Ok(CouncilResult {
            round1_grades: round1.results,
            round2_grades: Some(round2.results),
            final_grade,
            agreement_score: round2_agreement,
            rounds_used: 2,
            failures,
        })
    }

    /// Fan out one call per model and wait for all of them.
    ///
    /// A failing model never aborts the others; its error is logged and
    /// recorded as a [`GraderFailure`].
    async fn run_round(
        &self,
        round: GradingRound,
        input: &RunCouncilInput,
        transcript: &Arc<str>,
        previous_round: &[GraderResult],
        cancellation: &CancellationToken,
        progress: &dyn ProgressNotifier,
    ) -> Result<RoundOutcome, RunCouncilError> {
        info!("{}", round.display_name());
        progress.on_round_start(round, input.models.len());

        let prompt: Arc<str> = Arc::from(PromptTemplate::build_prompt(
            transcript,
            &input.rubric,
            round,
            previous_round,
        ));

        let mut join_set = JoinSet::new();
        for (index, model) in input.models.iter().enumerate() {
            let invoker = self.invoker.clone();
            let model = model.clone();
            let prompt = Arc::clone(&prompt);
            let credential = input.credential.clone();
            let cancellation = cancellation.clone();

            join_set.spawn(async move {
                let result =
                    Self::grade_with_model(&invoker, &model, round, &prompt, &credential, &cancellation)
                        .await;
                (index, model, result)
            });
        }

        // Slots keyed by dispatch index, so completion order is irrelevant
        let mut slots: Vec<Option<Result<GraderResult, GradeError>>> =
            vec![None; input.models.len()];

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, model, result)) => {
                    match &result {
                        Ok(_) => info!(model = %model, round = round.number(), "Grader responded"),
                        Err(e) => warn!(
                            model = %model,
                            round = round.number(),
                            error = %e,
                            "Grader failed, dropping from round"
                        ),
                    }
                    progress.on_grader_complete(round, &model, result.is_ok());
                    slots[index] = Some(result);
                }
                Err(e) => warn!("Task join error: {}", e),
            }
        }
        progress.on_round_complete(round);

        if cancellation.is_cancelled() {
            return Err(RunCouncilError::Cancelled);
        }

        let mut outcome = RoundOutcome::default();
        for (model, slot) in input.models.iter().zip(slots) {
            match slot {
                Some(Ok(result)) => outcome.results.push(result),
                Some(Err(e)) => outcome
                    .failures
                    .push(GraderFailure::new(model.clone(), round, e.to_string())),
                None => outcome.failures.push(GraderFailure::new(
                    model.clone(),
                    round,
                    "grading task aborted",
                )),
            }
        }
        Ok(outcome)
    }

    /// Grade the transcript with one model
    async fn grade_with_model(
        invoker: &ModelInvoker<G>,
        model: &Model,
        round: GradingRound,
        prompt: &str,
        credential: &Credential,
        cancellation: &CancellationToken,
    ) -> Result<GraderResult, GradeError> {
        let params = invoker.params();
        let request = CompletionRequest::new(model.clone(), PromptTemplate::grader_system(), prompt)
            .with_sampling(params.temperature, params.max_tokens);

        let invocation = invoker
            .invoke(&request, credential, round, cancellation)
            .await?;
        let parsed = parse_grade_response(&invocation.completion.content)?;

        Ok(GraderResult::new(model.clone(), round, parsed.scores)
            .with_feedback(parsed.overall_feedback)
            .with_confidence(parsed.confidence)
            .with_usage(
                invocation.completion.prompt_tokens,
                invocation.completion.completion_tokens,
                invocation.latency_ms,
            ))
    }

    fn finalize(
        &self,
        results: &[GraderResult],
        rubric: &[RubricCategory],
    ) -> council_domain::FinalGrade {
        let aggregation = aggregate(results, rubric);
        for category in &aggregation.unmatched_categories {
            warn!(
                category = %category,
                "Graders reported a category missing from the rubric, weighting it 1.0"
            );
        }
        info!(
            total = aggregation.grade.total_score,
            max = aggregation.grade.max_possible_score,
            percentage = aggregation.grade.percentage,
            "Final grade aggregated"
        );
        aggregation.grade
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::llm_gateway::{Completion, GatewayError};
    use async_trait::async_trait;
    use council_domain::{KeySource, Provider};
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    // ==================== Test Infrastructure ====================

    /// A scripted reply for one call
    #[derive(Debug, Clone)]
    enum Scripted {
        Text(String),
        Error(GatewayError),
    }

    /// Gateway that replays per-model scripts and records prompts
    struct ScriptedGateway {
        scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedGateway {
        fn new() -> Self {
            Self {
                scripts: Mutex::new(HashMap::new()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn script(self, model: &str, replies: Vec<Scripted>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(model.to_string(), replies.into());
            self
        }

        fn calls_for(&self, model: &str) -> usize {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .filter(|(m, _)| m == model)
                .count()
        }

        fn last_prompt_for(&self, model: &str) -> Option<String> {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(m, _)| m == model)
                .map(|(_, p)| p.clone())
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn complete(
            &self,
            request: &CompletionRequest,
            _credential: &Credential,
        ) -> Result<Completion, GatewayError> {
            let model = request.model.to_string();
            self.prompts
                .lock()
                .unwrap()
                .push((model.clone(), request.user_prompt.clone()));
            let next = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(&model)
                .and_then(|q| q.pop_front());
            match next {
                Some(Scripted::Text(content)) => Ok(Completion {
                    content,
                    prompt_tokens: 100,
                    completion_tokens: 50,
                }),
                Some(Scripted::Error(e)) => Err(e),
                None => Err(GatewayError::Other(format!("no script for {model}"))),
            }
        }
    }

    fn grade_json(clarity: f64, depth: f64, feedback: &str) -> Scripted {
        Scripted::Text(format!(
            r#"{{"scores": [
                {{"category": "Clarity", "score": {clarity}, "max_score": 5,
                  "evidence": "quote", "feedback": "ok"}},
                {{"category": "Depth", "score": {depth}, "max_score": 5,
                  "evidence": "quote", "feedback": "ok"}}
              ],
              "overall_feedback": "{feedback}",
              "confidence": 0.9}}"#
        ))
    }

    fn server_error() -> Scripted {
        Scripted::Error(GatewayError::HttpStatus {
            status: 500,
            message: "boom".into(),
        })
    }

    fn rubric() -> Vec<RubricCategory> {
        vec![
            RubricCategory::new("Clarity", 5.0, 1.0),
            RubricCategory::new("Depth", 5.0, 2.0),
        ]
    }

    fn models() -> Vec<Model> {
        vec![Model::from("grader-a"), Model::from("grader-b"), Model::from("grader-c")]
    }

    fn credential() -> Credential {
        Credential::new(KeySource::PlatformShared).with_key(Provider::OpenAi, "sk-test")
    }

    fn use_case(gateway: Arc<ScriptedGateway>) -> RunCouncilUseCase<ScriptedGateway> {
        let params = ExecutionParams::default().with_retry(
            RetryPolicy::default().with_backoff(Duration::from_millis(1), Duration::from_millis(2)),
        );
        RunCouncilUseCase::with_params(gateway, params)
    }

    fn input() -> RunCouncilInput {
        RunCouncilInput::new("Student: I think...", rubric(), models(), credential())
    }

    // ==================== Flow Tests ====================

    #[tokio::test]
    async fn test_end_to_end_agreement_skips_deliberation() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("grader-a", vec![grade_json(4.0, 3.0, "Good.")])
                .script("grader-b", vec![grade_json(4.0, 4.0, "Good.")])
                .script("grader-c", vec![grade_json(5.0, 3.0, "Strong.")]),
        );

        let result = use_case(gateway.clone()).execute(input()).await.unwrap();

        assert_eq!(result.rounds_used, 1);
        assert!(result.round2_grades.is_none());
        assert_eq!(result.round1_grades.len(), 3);
        assert!((result.agreement_score - (1.0 - 4.0 * 0.08 / 9.0)).abs() < 1e-9);
        assert!((result.final_grade.total_score - 11.0).abs() < 1e-6);
        assert!((result.final_grade.max_possible_score - 15.0).abs() < 1e-6);
        assert!((result.final_grade.percentage - 1100.0 / 15.0).abs() < 1e-6);
        assert_eq!(result.final_grade.overall_feedback, "Good. Strong.");
        assert_eq!(gateway.calls_for("grader-a"), 1);
        assert!(result.failures.is_empty());
    }

    #[tokio::test]
    async fn test_results_keep_dispatch_order_and_metadata() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("grader-a", vec![grade_json(4.0, 4.0, "")])
                .script("grader-b", vec![grade_json(4.0, 4.0, "")])
                .script("grader-c", vec![grade_json(4.0, 4.0, "")]),
        );

        let result = use_case(gateway).execute(input()).await.unwrap();

        let order: Vec<_> = result.round1_grades.iter().map(|g| g.model.to_string()).collect();
        assert_eq!(order, vec!["grader-a", "grader-b", "grader-c"]);
        let first = &result.round1_grades[0];
        assert_eq!(first.round, GradingRound::Independent);
        assert_eq!(first.prompt_tokens, 100);
        assert_eq!(first.completion_tokens, 50);
        assert_eq!(first.confidence, 0.9);
    }

    #[tokio::test]
    async fn test_partial_failure_uses_survivors() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("grader-a", vec![grade_json(4.0, 4.0, "")])
                .script("grader-b", vec![server_error(), server_error(), server_error()])
                .script("grader-c", vec![grade_json(4.0, 4.0, "")]),
        );

        let result = use_case(gateway.clone()).execute(input()).await.unwrap();

        assert_eq!(result.rounds_used, 1);
        assert_eq!(result.round1_grades.len(), 2);
        assert_eq!(result.agreement_score, 1.0);
        assert_eq!(gateway.calls_for("grader-b"), 3);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].model, Model::from("grader-b"));
        assert_eq!(result.failures[0].round, GradingRound::Independent);
    }

    #[tokio::test]
    async fn test_parse_failure_is_dropped() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("grader-a", vec![grade_json(4.0, 4.0, "")])
                .script("grader-b", vec![Scripted::Text("I refuse to answer in JSON".into())])
                .script("grader-c", vec![grade_json(4.0, 4.0, "")]),
        );

        let result = use_case(gateway.clone()).execute(input()).await.unwrap();

        assert_eq!(result.round1_grades.len(), 2);
        assert!(result.failures[0].reason.contains("parse"));
        // Parse errors are not retried
        assert_eq!(gateway.calls_for("grader-b"), 1);
    }

    #[tokio::test]
    async fn test_all_fail_in_round1_is_fatal_without_round2() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("grader-a", vec![Scripted::Text("nope".into())])
                .script("grader-b", vec![Scripted::Text("nope".into())])
                .script("grader-c", vec![Scripted::Text("nope".into())]),
        );

        let err = use_case(gateway.clone()).execute(input()).await.unwrap_err();

        match err {
            RunCouncilError::AllGradersFailed { failures } => assert_eq!(failures.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
        for model in ["grader-a", "grader-b", "grader-c"] {
            assert_eq!(gateway.calls_for(model), 1);
        }
    }

    #[tokio::test]
    async fn test_disagreement_triggers_deliberation() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("grader-a", vec![grade_json(0.0, 0.0, "Weak."), grade_json(3.0, 3.0, "Fair.")])
                .script("grader-b", vec![grade_json(5.0, 5.0, "Great."), grade_json(3.0, 3.0, "Fair.")])
                .script("grader-c", vec![grade_json(5.0, 5.0, "Great."), grade_json(4.0, 3.0, "Fair.")]),
        );

        let result = use_case(gateway.clone()).execute(input()).await.unwrap();

        assert_eq!(result.rounds_used, 2);
        let round2 = result.round2_grades.as_ref().unwrap();
        assert_eq!(round2.len(), 3);
        assert!(round2.iter().all(|g| g.round == GradingRound::Deliberation));
        // Agreement reported over round 2
        assert!((result.agreement_score - agreement(round2)).abs() < 1e-12);
        // Final grade from round 2: Clarity mean 10/3, Depth 3
        assert!((result.final_grade.total_score - (10.0 / 3.0 + 6.0)).abs() < 1e-6);
        assert_eq!(result.final_grade.overall_feedback, "Fair.");

        let prompt = gateway.last_prompt_for("grader-a").unwrap();
        assert!(prompt.contains("Other Graders' Scores"));
        assert!(prompt.contains("**grader-b**"));
        assert!(prompt.contains("**grader-c**"));
    }

    #[tokio::test]
    async fn test_round2_dispatches_original_model_list() {
        // grader-c fails in round 1 but is still asked to deliberate
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("grader-a", vec![grade_json(0.0, 0.0, ""), grade_json(2.0, 2.0, "")])
                .script("grader-b", vec![grade_json(5.0, 5.0, ""), grade_json(3.0, 3.0, "")])
                .script(
                    "grader-c",
                    vec![Scripted::Text("garbage".into()), grade_json(2.0, 3.0, "")],
                ),
        );

        let result = use_case(gateway.clone()).execute(input()).await.unwrap();

        assert_eq!(gateway.calls_for("grader-c"), 2);
        assert_eq!(result.round1_grades.len(), 2);
        assert_eq!(result.round2_grades.as_ref().unwrap().len(), 3);
        assert_eq!(result.rounds_used, 2);
    }

    #[tokio::test]
    async fn test_round2_total_failure_falls_back_to_round1() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("grader-a", vec![grade_json(0.0, 0.0, ""), Scripted::Text("x".into())])
                .script("grader-b", vec![grade_json(5.0, 5.0, ""), Scripted::Text("x".into())])
                .script("grader-c", vec![grade_json(5.0, 5.0, ""), Scripted::Text("x".into())]),
        );

        let result = use_case(gateway).execute(input()).await.unwrap();

        assert_eq!(result.rounds_used, 1);
        assert_eq!(result.round2_grades, Some(Vec::new()));
        assert!(result.deliberated());
        let round1_agreement = agreement(&result.round1_grades);
        assert_eq!(result.agreement_score, round1_agreement);
        assert!(round1_agreement < DEFAULT_AGREEMENT_THRESHOLD);
        // 3 round-2 failures recorded
        assert_eq!(result.failures_in(GradingRound::Deliberation).count(), 3);
        // Final grade from round 1: Clarity 10/3, Depth 10/3
        assert!((result.final_grade.total_score - 10.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_threshold_zero_never_deliberates() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("grader-a", vec![grade_json(0.0, 0.0, "")])
                .script("grader-b", vec![grade_json(5.0, 5.0, "")])
                .script("grader-c", vec![grade_json(0.0, 5.0, "")]),
        );

        let result = use_case(gateway)
            .execute(input().with_threshold(0.0))
            .await
            .unwrap();

        assert_eq!(result.rounds_used, 1);
        assert!(result.round2_grades.is_none());
    }

    #[tokio::test]
    async fn test_missing_provider_key_drops_only_that_model() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("gpt-4o", vec![grade_json(4.0, 4.0, "")])
                .script(
                    "claude-3-5-sonnet-20241022",
                    vec![Scripted::Error(GatewayError::MissingCredential {
                        provider: Provider::Anthropic,
                        model: "claude-3-5-sonnet-20241022".into(),
                    })],
                )
                .script("grader-b", vec![grade_json(4.0, 4.0, "")]),
        );
        let input = RunCouncilInput::new(
            "T",
            rubric(),
            vec![Model::Gpt4o, Model::Claude35Sonnet, Model::from("grader-b")],
            credential(),
        );

        let result = use_case(gateway.clone()).execute(input).await.unwrap();

        assert_eq!(result.round1_grades.len(), 2);
        // Configuration errors are not retried
        assert_eq!(gateway.calls_for("claude-3-5-sonnet-20241022"), 1);
        assert!(result.failures[0].reason.starts_with("Configuration error"));
    }

    #[tokio::test]
    async fn test_invalid_inputs_rejected() {
        let gateway = Arc::new(ScriptedGateway::new());
        let use_case = use_case(gateway);

        let no_models = RunCouncilInput::new("T", rubric(), vec![], credential());
        assert!(matches!(
            use_case.execute(no_models).await,
            Err(RunCouncilError::NoModels)
        ));

        let bad_threshold = input().with_threshold(1.5);
        assert!(matches!(
            use_case.execute(bad_threshold).await,
            Err(RunCouncilError::InvalidInput(DomainError::InvalidThreshold(_)))
        ));

        let empty_rubric = RunCouncilInput::new("T", vec![], models(), credential());
        assert!(matches!(
            use_case.execute(empty_rubric).await,
            Err(RunCouncilError::InvalidInput(DomainError::InvalidRubric(_)))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_run() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("grader-a", vec![grade_json(4.0, 4.0, "")])
                .script("grader-b", vec![grade_json(4.0, 4.0, "")])
                .script("grader-c", vec![grade_json(4.0, 4.0, "")]),
        );
        let token = CancellationToken::new();
        token.cancel();

        let err = use_case(gateway.clone())
            .execute(input().with_cancellation(token))
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(gateway.calls_for("grader-a"), 0);
    }

    /// Records progress callbacks
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressNotifier for RecordingProgress {
        fn on_round_start(&self, round: GradingRound, total_graders: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {} {}", round.number(), total_graders));
        }

        fn on_grader_complete(&self, round: GradingRound, _model: &Model, success: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("grader {} {}", round.number(), success));
        }

        fn on_round_complete(&self, round: GradingRound) {
            self.events
                .lock()
                .unwrap()
                .push(format!("complete {}", round.number()));
        }

        fn on_agreement(&self, round: GradingRound, _agreement: f64, _threshold: f64) {
            self.events
                .lock()
                .unwrap()
                .push(format!("agreement {}", round.number()));
        }
    }

    #[tokio::test]
    async fn test_progress_events() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("grader-a", vec![grade_json(4.0, 4.0, "")])
                .script("grader-b", vec![Scripted::Text("bad".into())])
                .script("grader-c", vec![grade_json(4.0, 4.0, "")]),
        );
        let progress = RecordingProgress::default();

        use_case(gateway)
            .execute_with_progress(input(), &progress)
            .await
            .unwrap();

        let events = progress.events.lock().unwrap();
        assert_eq!(events.first().unwrap(), "start 1 3");
        assert_eq!(events.iter().filter(|e| *e == "grader 1 true").count(), 2);
        assert_eq!(events.iter().filter(|e| *e == "grader 1 false").count(), 1);
        assert!(events.contains(&"complete 1".to_string()));
        assert_eq!(events.last().unwrap(), "agreement 1");
    }
}
