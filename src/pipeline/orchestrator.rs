//! Sequential, fail-fast execution of the stage list

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::capabilities::CapabilitySet;
use crate::clients::{CompletionRequest, LanguageModel};
use crate::error::{NewsProbeError, Result, SCHEMA_VALIDATION_PREFIX};
use crate::pipeline::catalog::news_analysis_stages;
use crate::pipeline::context::{AnalysisInput, PipelineContext, StageOutput};
use crate::pipeline::stage::{Evidence, StageSpec};
use crate::report::{Report, coerce_report};

pub const DEFAULT_MAX_CAPABILITY_CALLS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "stage")]
pub enum RunState {
    Created,
    /// Index of the stage currently executing
    Running(usize),
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageTrace {
    pub stage_id: String,
    pub role: String,
    pub success: bool,
    pub capability_calls: usize,
    pub summary: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub execution_time_ms: u64,
}

impl StageTrace {
    fn start(stage: &StageSpec) -> Self {
        let now = Utc::now();
        Self {
            stage_id: stage.id.to_string(),
            role: stage.role.to_string(),
            success: false,
            capability_calls: 0,
            summary: String::new(),
            started_at: now,
            completed_at: now,
            execution_time_ms: 0,
        }
    }

    fn finish(mut self, success: bool, summary: String) -> Self {
        self.success = success;
        self.summary = summary;
        self.completed_at = Utc::now();
        self.execution_time_ms = (self.completed_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunTrace {
    pub run_id: Uuid,
    pub state: RunState,
    pub stages: Vec<StageTrace>,
}

impl RunTrace {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: RunState::Created,
            stages: Vec::new(),
        }
    }

    /// Stage ids in the order they ran
    pub fn stage_order(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.stage_id.as_str()).collect()
    }
}

/// Result of one run together with its trace. The trace is kept on failure too.
#[derive(Debug)]
pub struct PipelineRun {
    pub trace: RunTrace,
    pub result: Result<Report>,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub report: Report,
    pub trace: RunTrace,
}

impl PipelineRun {
    pub fn into_outcome(self) -> Result<PipelineOutcome> {
        let report = self.result?;
        Ok(PipelineOutcome {
            report,
            trace: self.trace,
        })
    }
}

pub struct Pipeline {
    stages: Vec<StageSpec>,
    model: Arc<dyn LanguageModel>,
    capabilities: CapabilitySet,
    max_capability_calls: usize,
}

impl Pipeline {
    /// The stage list must be non-empty and only its last stage may be structured
    pub fn new(
        stages: Vec<StageSpec>,
        model: Arc<dyn LanguageModel>,
        capabilities: CapabilitySet,
    ) -> Result<Self> {
        let Some((last, rest)) = stages.split_last() else {
            return Err(NewsProbeError::input("pipeline has no stages"));
        };
        if !last.structured {
            return Err(NewsProbeError::input(format!(
                "terminal stage '{}' must produce the report",
                last.id
            )));
        }
        if let Some(early) = rest.iter().find(|s| s.structured) {
            return Err(NewsProbeError::input(format!(
                "stage '{}' is structured but not terminal",
                early.id
            )));
        }

        Ok(Self {
            stages,
            model,
            capabilities,
            max_capability_calls: DEFAULT_MAX_CAPABILITY_CALLS,
        })
    }

    /// The six-stage news analysis crew
    pub fn news_analysis(
        model: Arc<dyn LanguageModel>,
        capabilities: CapabilitySet,
    ) -> Result<Self> {
        Self::new(news_analysis_stages(), model, capabilities)
    }

    pub fn with_max_capability_calls(mut self, max: usize) -> Self {
        self.max_capability_calls = max;
        self
    }

    /// Validate the request, then run every stage
    pub async fn analyze(&self, input: AnalysisInput) -> Result<PipelineOutcome> {
        let ctx = PipelineContext::new(input)?;
        self.run(ctx).await.into_outcome()
    }

    /// Run all stages in order against `ctx`. The first failure stops the run.
    pub async fn run(&self, mut ctx: PipelineContext) -> PipelineRun {
        let mut trace = RunTrace::new();
        info!(
            "Pipeline run {} starting: query='{}', {} stages",
            trace.run_id,
            ctx.inputs().effective_query,
            self.stages.len()
        );

        let last = self.stages.len() - 1;
        for (index, stage) in self.stages.iter().enumerate() {
            trace.state = RunState::Running(index);
            info!("Stage {}/{} {} starting", index + 1, self.stages.len(), stage.id);
            let mut stage_trace = StageTrace::start(stage);

            let outcome = self.execute_stage(stage, &ctx, &mut stage_trace).await;
            let text = match outcome {
                Ok(text) => text,
                Err(e) => {
                    error!("Stage {} failed: {}", stage.id, e);
                    trace.stages.push(stage_trace.finish(false, e.to_string()));
                    trace.state = RunState::Failed;
                    return PipelineRun {
                        trace,
                        result: Err(e),
                    };
                }
            };

            if index == last {
                match coerce_report(&text) {
                    Ok(report) => {
                        let out_of_range = report.out_of_range_fields();
                        if !out_of_range.is_empty() {
                            warn!("Report has out-of-range values: {}", out_of_range.join(", "));
                        }
                        trace
                            .stages
                            .push(stage_trace.finish(true, "report validated".to_string()));
                        trace.state = RunState::Completed;
                        info!("Pipeline run {} completed", trace.run_id);
                        return PipelineRun {
                            trace,
                            result: Ok(report),
                        };
                    }
                    Err(reason) => {
                        let e = NewsProbeError::stage(
                            stage.id,
                            format!("{}: {}", SCHEMA_VALIDATION_PREFIX, reason),
                        );
                        error!("Stage {} failed: {}", stage.id, e);
                        trace.stages.push(stage_trace.finish(false, e.to_string()));
                        trace.state = RunState::Failed;
                        return PipelineRun {
                            trace,
                            result: Err(e),
                        };
                    }
                }
            }

            info!("Stage {} done ({} chars)", stage.id, text.len());
            trace
                .stages
                .push(stage_trace.finish(true, format!("{} chars", text.len())));
            ctx.append(StageOutput {
                stage_id: stage.id.to_string(),
                role: stage.role.to_string(),
                text,
            });
        }

        // Only reachable with an empty stage list, which `new` rejects
        trace.state = RunState::Failed;
        PipelineRun {
            trace,
            result: Err(NewsProbeError::Internal {
                message: "pipeline ended without a terminal stage".to_string(),
            }),
        }
    }

    async fn execute_stage(
        &self,
        stage: &StageSpec,
        ctx: &PipelineContext,
        stage_trace: &mut StageTrace,
    ) -> Result<String> {
        let requests = stage.plan_requests(ctx, self.max_capability_calls);
        stage_trace.capability_calls = requests.len();

        let calls = requests.into_iter().map(|request| {
            let capabilities = &self.capabilities;
            async move {
                let tool = capabilities.get(request.kind)?;
                debug!("Stage {} invoking {} '{}'", stage.id, request.kind, request.target);
                let text = tool.invoke(&request).await?;
                Ok::<_, crate::capabilities::CapabilityError>(Evidence { request, text })
            }
        });
        let evidence = try_join_all(calls)
            .await
            .map_err(|e| NewsProbeError::stage(stage.id, e.to_string()))?;

        let messages = stage.build_messages(ctx, &evidence);
        debug!(
            "Stage {} prompt: {} chars across {} messages",
            stage.id,
            messages.iter().map(|m| m.content.len()).sum::<usize>(),
            messages.len()
        );

        let response = self
            .model
            .complete(CompletionRequest {
                stage_id: stage.id.to_string(),
                messages,
                json_mode: stage.structured,
            })
            .await
            .map_err(|e| NewsProbeError::stage(stage.id, e.to_string()))?;

        if response.content.trim().is_empty() {
            return Err(NewsProbeError::stage(stage.id, "model returned empty output"));
        }
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{Capability, CapabilityError, CapabilityKind, CapabilityRequest};
    use crate::clients::ScriptedModel;
    use crate::report::fixtures::sample_report;
    use async_trait::async_trait;

    struct FakeSearch;

    #[async_trait]
    impl Capability for FakeSearch {
        fn kind(&self) -> CapabilityKind {
            CapabilityKind::Search
        }

        async fn invoke(&self, request: &CapabilityRequest) -> std::result::Result<String, CapabilityError> {
            Ok(format!("results for {}", request.target))
        }
    }

    const TOOLS: &[CapabilityKind] = &[CapabilityKind::Search];

    fn stage(id: &'static str, structured: bool) -> StageSpec {
        StageSpec {
            id,
            role: "Tester",
            goal: "test",
            backstory: "none",
            instruction: "Work on {query}",
            expected_output: "text",
            capabilities: if structured { &[] } else { TOOLS },
            structured,
        }
    }

    fn report_json() -> String {
        serde_json::to_string(&sample_report()).unwrap()
    }

    #[test]
    fn test_empty_stage_list_rejected() {
        let model = Arc::new(ScriptedModel::new());
        let err = Pipeline::new(vec![], model, CapabilitySet::new()).err().unwrap();
        assert!(err.is_input());
    }

    #[test]
    fn test_terminal_stage_must_be_structured() {
        let model = Arc::new(ScriptedModel::new());
        let err = Pipeline::new(vec![stage("a", false)], model, CapabilitySet::new())
            .err()
            .unwrap();
        assert!(err.is_input());
    }

    #[tokio::test]
    async fn test_stage_outputs_flow_forward() {
        let model = Arc::new(
            ScriptedModel::new()
                .with_reply("a", "alpha notes")
                .with_reply("b", "beta notes")
                .with_reply("c", report_json()),
        );
        let pipeline = Pipeline::new(
            vec![stage("a", false), stage("b", false), stage("c", true)],
            model.clone(),
            CapabilitySet::new().with(Arc::new(FakeSearch)),
        )
        .unwrap();

        let outcome = pipeline.analyze(AnalysisInput::new("q")).await.unwrap();
        assert_eq!(outcome.trace.stage_order(), vec!["a", "b", "c"]);
        assert_eq!(outcome.trace.state, RunState::Completed);
        assert_eq!(outcome.report.query_summary, "Election fraud claims");

        let requests = model.requests();
        assert!(requests[1].messages[1].content.contains("alpha notes"));
        assert!(requests[1].messages[1].content.contains("results for q"));
        assert!(requests[2].messages[1].content.contains("beta notes"));
        assert!(requests[2].json_mode);
        assert!(!requests[0].json_mode);
    }

    #[tokio::test]
    async fn test_missing_capability_fails_stage() {
        let model = Arc::new(ScriptedModel::new().with_fallback("x"));
        let pipeline = Pipeline::new(
            vec![stage("a", false), stage("b", true)],
            model.clone(),
            CapabilitySet::new(),
        )
        .unwrap();
        let run = pipeline.run(PipelineContext::new(AnalysisInput::new("q")).unwrap()).await;
        assert_eq!(run.trace.state, RunState::Failed);
        assert!(run.result.unwrap_err().is_stage_failure());
        assert!(model.called_stages().is_empty());
    }

    #[tokio::test]
    async fn test_empty_completion_fails_stage() {
        let model = Arc::new(ScriptedModel::new().with_reply("b", "   "));
        let pipeline =
            Pipeline::new(vec![stage("b", true)], model, CapabilitySet::new()).unwrap();
        let err = pipeline.analyze(AnalysisInput::new("q")).await.unwrap_err();
        assert!(err.is_stage_failure());
        assert!(!err.is_schema_validation());
    }

    #[tokio::test]
    async fn test_capability_cap_applies() {
        let model = Arc::new(ScriptedModel::new().with_fallback(report_json()));
        let pipeline = Pipeline::new(
            vec![stage("a", false), stage("b", true)],
            model,
            CapabilitySet::new().with(Arc::new(FakeSearch)),
        )
        .unwrap()
        .with_max_capability_calls(1);
        let input = AnalysisInput {
            query: "q".to_string(),
            hashtags: vec!["#one".to_string(), "#two".to_string()],
            ..Default::default()
        };
        let outcome = pipeline.analyze(input).await.unwrap();
        assert_eq!(outcome.trace.stages[0].capability_calls, 1);
    }
}
