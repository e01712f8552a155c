use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use argus_core::backend::{AuditBackend, BackendOptions};
use argus_core::events::{AuditEvent, SKIP_REASON_BUDGET};
use argus_core::finding::AuditTaskResult;
use argus_core::ids::{ReportId, RunId, TaskId};
use argus_core::plan::{AuditPlan, AuditTask};
use argus_core::report::{ComplianceReport, ReportMetadata, ReportScope};
use argus_core::ruleset::Ruleset;
use argus_core::source::SourceFile;
use argus_core::tokens::{AccumulatedTokens, TokenUsage};
use argus_llm::{build_request, parse_response};
use argus_synthesis::{
    apply_suppressions, compute_coverage, dedup_findings, summarize, SuppressionConfig,
    SuppressionIndex, TaskOutcomes,
};
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

use crate::budget::filter_admitted;
use crate::error::EngineError;

pub const DEFAULT_CONCURRENCY: usize = 5;
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct ExecutorConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Pool width: cap on in-flight backend calls within a wave.
    pub concurrency: usize,
    /// Run-cumulative token spend limit; `None` admits everything.
    pub token_budget: Option<u64>,
    /// Root of the audited tree. When present, the suppression config is
    /// loaded from it and suppressions apply; when absent they don't.
    pub target_root: Option<PathBuf>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            model: "default".into(),
            max_tokens: 8192,
            concurrency: DEFAULT_CONCURRENCY,
            token_budget: None,
            target_root: None,
        }
    }
}

/// Drives a plan to a report: wave 1 and 2 tasks run concurrently against
/// the injected backend under budget admission control, wave 3 synthesizes
/// in-process. Progress is observable only through the broadcast stream.
pub struct AuditExecutor {
    backend: Arc<dyn AuditBackend>,
    config: ExecutorConfig,
    event_tx: broadcast::Sender<AuditEvent>,
}

impl AuditExecutor {
    pub fn new(backend: Arc<dyn AuditBackend>, config: ExecutorConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            config,
            event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.event_tx.subscribe()
    }

    fn send_event(&self, event: AuditEvent) {
        if self.event_tx.send(event).is_err() {
            warn!("no event receivers — event dropped");
        }
    }

    /// Execute the full run. Per-task failures are contained; the only
    /// errors surfacing here are environmental (malformed suppression
    /// config).
    #[instrument(skip_all, fields(backend = self.backend.name(), tasks = plan.stats.wave1_tasks + plan.stats.wave2_tasks))]
    pub async fn run(
        &self,
        plan: &AuditPlan,
        ruleset: &Ruleset,
        files: &[SourceFile],
    ) -> Result<ComplianceReport, EngineError> {
        let run_id = RunId::new();
        info!(%run_id, "audit run starting");
        self.send_event(AuditEvent::plan_ready(plan));

        let ruleset = Arc::new(ruleset.clone());
        let shared_files: Arc<[SourceFile]> = files.into();

        let mut outcomes = TaskOutcomes::default();
        let mut results: Vec<AuditTaskResult> = Vec::new();
        let mut tokens = AccumulatedTokens::default();
        let mut spent: u64 = 0;

        for wave in [1u8, 2] {
            let (admitted, skipped) =
                filter_admitted(plan.wave(wave), self.config.token_budget, &mut spent);
            self.send_event(AuditEvent::WaveStart {
                wave,
                task_count: admitted.len(),
            });
            for task in skipped {
                outcomes.skipped.insert(task.id.clone());
                self.send_event(AuditEvent::TaskSkipped {
                    task: Box::new(task.clone()),
                    reason: SKIP_REASON_BUDGET.into(),
                });
            }

            let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
            let mut pool: JoinSet<(AuditTask, Result<AuditTaskResult, EngineError>)> =
                JoinSet::new();

            for task in admitted {
                let task = task.clone();
                let backend = Arc::clone(&self.backend);
                let ruleset = Arc::clone(&ruleset);
                let task_files = Arc::clone(&shared_files);
                let semaphore = Arc::clone(&semaphore);
                let event_tx = self.event_tx.clone();
                let options = BackendOptions {
                    model: self.config.model.clone(),
                    max_tokens: self.config.max_tokens,
                    json_schema: None,
                };

                pool.spawn(async move {
                    // Closed only if the pool is dropped mid-wave, which
                    // run() never does.
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            return (task, Err(EngineError::Join("worker pool closed".into())))
                        }
                    };
                    let _ = event_tx.send(AuditEvent::TaskStart {
                        task: Box::new(task.clone()),
                    });
                    let result = run_task(&*backend, &task, &ruleset, &task_files, options).await;
                    (task, result)
                });
            }

            let mut wave_results: Vec<AuditTaskResult> = Vec::new();
            while let Some(joined) = pool.join_next().await {
                match joined {
                    Ok((task, Ok(result))) => {
                        outcomes.completed.insert(task.id.clone());
                        tokens.accumulate(result.tokens_used);
                        wave_results.push(result.clone());
                        self.send_event(AuditEvent::TaskComplete {
                            task: Box::new(task),
                            result,
                        });
                    }
                    Ok((task, Err(e))) => {
                        error!(task_id = %task.id, error = %e, "task failed");
                        outcomes.failed.insert(task.id.clone());
                        self.send_event(AuditEvent::TaskError {
                            task: Box::new(task),
                            error: e.to_string(),
                        });
                    }
                    Err(join_err) => {
                        // A panicked worker cannot be attributed to a task
                        // id; its task stays unaccounted and shows up in
                        // coverage as not executed.
                        error!(error = %join_err, "worker panicked");
                    }
                }
            }

            results.extend(wave_results.iter().cloned());
            self.send_event(AuditEvent::WaveComplete {
                wave,
                results: wave_results,
            });
        }

        // Wave 3: in-process synthesis, no backend call.
        self.send_event(AuditEvent::WaveStart {
            wave: 3,
            task_count: plan.wave3.len(),
        });

        let mut findings = dedup_findings(&results);
        if let Some(root) = &self.config.target_root {
            let config = SuppressionConfig::load(root)?;
            let index = SuppressionIndex::build(config, files);
            apply_suppressions(&mut findings, &index);
        }
        let summary = summarize(&findings);
        let coverage = compute_coverage(&plan.wave1, &outcomes);

        for task in &plan.wave3 {
            outcomes.completed.insert(task.id.clone());
        }
        // Synthesis produces the report itself, not task results.
        self.send_event(AuditEvent::WaveComplete {
            wave: 3,
            results: vec![],
        });

        let report = ComplianceReport {
            id: ReportId::new(),
            scope: ReportScope {
                framework: plan.meta.framework.clone(),
                target: self
                    .config
                    .target_root
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                file_count: plan.stats.file_count,
                component_count: plan.stats.component_count,
            },
            findings,
            summary,
            coverage,
            metadata: ReportMetadata {
                run_id,
                generated_at: chrono::Utc::now().to_rfc3339(),
                tasks_planned: plan.wave1.len() + plan.wave2.len() + plan.wave3.len(),
                tasks_completed: outcomes.completed.len(),
                tasks_failed: outcomes.failed.len(),
                tasks_skipped: outcomes.skipped.len(),
                tokens,
            },
        };

        info!(
            findings = report.summary.total,
            suppressed = report.summary.suppressed_count,
            failed = report.metadata.tasks_failed,
            skipped = report.metadata.tasks_skipped,
            "audit run complete"
        );
        self.send_event(AuditEvent::Complete {
            report: Box::new(report.clone()),
        });
        Ok(report)
    }
}

/// One task body: build the prompt, call the backend, parse the reply.
/// Any error here marks the task failed without touching its siblings.
async fn run_task(
    backend: &dyn AuditBackend,
    task: &AuditTask,
    ruleset: &Ruleset,
    files: &[SourceFile],
    options: BackendOptions,
) -> Result<AuditTaskResult, EngineError> {
    let started = Instant::now();
    let model = options.model.clone();
    let request = build_request(task, ruleset, files, options)?;
    let response = backend.complete(&request).await?;
    let findings = parse_response(task, &response);

    let tokens_used = response.usage.unwrap_or_else(|| {
        TokenUsage::estimated(&format!("{}{}", request.system, request.user), &response.text)
    });

    Ok(AuditTaskResult {
        task_id: task.id.clone(),
        kind: task.kind,
        component: task.component.clone(),
        rules_checked: task.rules.clone(),
        findings,
        duration_ms: started.elapsed().as_millis() as u64,
        model,
        tokens_used,
    })
}
