//! Bounded evaluate/revise loop over a single draft.
//!
//! The loop is a small state machine. Each step makes at most one model call:
//! `Evaluating` scores the working content, `Revising` asks for a rewrite.
//! A revision is always scored before it can be accepted, and any model
//! failure ends the loop with the last content that was known to be good.

use pc_core::EvaluationResult;
use pc_inference::ContentEvaluator;
use std::fmt;
use tracing::{info, warn};

/// How the loop ended. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// Every dimension cleared its threshold.
    Passed,
    /// The revision budget ran out; the last revision is returned.
    Exhausted,
    /// A model call failed mid-loop; the last known-good content is returned.
    FellBack,
}

impl fmt::Display for LoopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoopStatus::Passed => "passed",
            LoopStatus::Exhausted => "exhausted",
            LoopStatus::FellBack => "fell back",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
enum LoopState {
    Evaluating { content: String },
    Revising { content: String, evaluation: EvaluationResult },
    Finished { content: String, status: LoopStatus },
}

#[derive(Debug)]
struct Progress {
    history: Vec<EvaluationResult>,
    revisions_used: u32,
    max_revisions: u32,
    last_scored: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RevisionOutcome {
    pub content: String,
    /// One entry per scoring call, in order.
    pub history: Vec<EvaluationResult>,
    pub status: LoopStatus,
    /// Revision calls made, including a failed last one.
    pub revisions_used: u32,
}

impl RevisionOutcome {
    pub fn final_evaluation(&self) -> Option<&EvaluationResult> {
        self.history.last()
    }
}

#[derive(Debug)]
pub struct RevisionLoop {
    evaluator: ContentEvaluator,
}

impl RevisionLoop {
    pub fn new(evaluator: ContentEvaluator) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &ContentEvaluator {
        &self.evaluator
    }

    /// Scores `draft` and revises it at most `max_revisions` times.
    pub async fn evaluate_and_revise(&self, draft: &str, max_revisions: u32) -> RevisionOutcome {
        let mut progress = Progress {
            history: Vec::new(),
            revisions_used: 0,
            max_revisions,
            last_scored: None,
        };
        let mut state = LoopState::Evaluating {
            content: draft.to_string(),
        };

        loop {
            state = match self.step(state, &mut progress).await {
                LoopState::Finished { content, status } => {
                    info!(
                        "🏁 Revision loop {} after {} evaluation(s), {} revision(s)",
                        status,
                        progress.history.len(),
                        progress.revisions_used
                    );
                    return RevisionOutcome {
                        content,
                        history: progress.history,
                        status,
                        revisions_used: progress.revisions_used,
                    };
                }
                next => next,
            };
        }
    }

    async fn step(&self, state: LoopState, progress: &mut Progress) -> LoopState {
        match state {
            LoopState::Evaluating { content } => {
                let round = progress.history.len() as u32 + 1;
                match self.evaluator.evaluate(&content).await {
                    Ok(evaluation) => {
                        self.evaluator.log_quality_report(&evaluation, round);
                        progress.last_scored = Some(content.clone());
                        progress.history.push(evaluation.clone());
                        if evaluation.passed {
                            LoopState::Finished {
                                content,
                                status: LoopStatus::Passed,
                            }
                        } else if progress.revisions_used >= progress.max_revisions {
                            LoopState::Finished {
                                content,
                                status: LoopStatus::Exhausted,
                            }
                        } else {
                            LoopState::Revising { content, evaluation }
                        }
                    }
                    Err(e) => {
                        warn!("⚠️ Evaluation round {} failed: {}", round, e);
                        // An unscored revision is never returned.
                        let content = progress.last_scored.take().unwrap_or(content);
                        LoopState::Finished {
                            content,
                            status: LoopStatus::FellBack,
                        }
                    }
                }
            }
            LoopState::Revising {
                content,
                mut evaluation,
            } => {
                progress.revisions_used += 1;
                info!(
                    "🔄 Revision {}/{}",
                    progress.revisions_used, progress.max_revisions
                );
                match self.evaluator.revise(&content, &mut evaluation).await {
                    Ok(revised) => {
                        if let Some(last) = progress.history.last_mut() {
                            last.revised_content = evaluation.revised_content.take();
                        }
                        LoopState::Evaluating { content: revised }
                    }
                    Err(e) => {
                        warn!(
                            "⚠️ Revision {} failed, keeping current content: {}",
                            progress.revisions_used, e
                        );
                        LoopState::Finished {
                            content,
                            status: LoopStatus::FellBack,
                        }
                    }
                }
            }
            finished @ LoopState::Finished { .. } => finished,
        }
    }
}
