//! Human-readable reports for every controller operation.
//!
//! The report is the only channel through which the agent learns whether to
//! keep working, so each variant carries enough state to render the next
//! prompt or the evidence for a terminal outcome.

use std::fmt;

use crate::domain::{ArchiveSummary, LoopState};
use crate::promise::wrap_promise;

/// Prompts longer than this are cut short in status output
pub const PROMPT_PREVIEW_CHARS: usize = 200;

/// Command the agent runs at the end of each work session
const CHECK_COMMAND: &str = "iterloop check";

const BANNER_WIDTH: usize = 66;

/// Outcome of a controller operation
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// A new loop was started
    Started { state: LoopState },
    /// The loop continues; `state` is already at the next iteration
    Continue { state: LoopState },
    /// The agent echoed the completion promise
    Completed { state: LoopState, archive: String },
    /// The iteration cap was hit
    MaxReached { state: LoopState, archive: String },
    /// The loop was cancelled
    Cancelled { state: LoopState, archive: String },
    /// Status of the active loop
    Active { state: LoopState },
    /// Status with no active loop, newest archives first
    Idle { recent: Vec<ArchiveSummary> },
}

impl Report {
    /// Returns true if the loop left the active slot because of a `check`
    pub fn is_loop_ended(&self) -> bool {
        matches!(self, Report::Completed { .. } | Report::MaxReached { .. })
    }

    /// Process exit code for this report: 1 when a `check` ended the loop
    pub fn exit_code(&self) -> i32 {
        if self.is_loop_ended() { 1 } else { 0 }
    }
}

fn iteration_label(iteration: u32, max_iterations: u32) -> String {
    if max_iterations == 0 {
        format!("{} of ∞", iteration)
    } else {
        format!("{} of {}", iteration, max_iterations)
    }
}

fn preview(prompt: &str) -> String {
    if prompt.chars().count() > PROMPT_PREVIEW_CHARS {
        let cut: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        prompt.to_string()
    }
}

fn rule(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", "━".repeat(BANNER_WIDTH + 2))
}

/// Draw a boxed banner. The glyph, when given, is an emoji two columns wide
/// and is kept outside the padded title so the right border lines up.
fn banner(f: &mut fmt::Formatter<'_>, glyph: Option<&str>, title: &str, lines: &[String]) -> fmt::Result {
    let inner = BANNER_WIDTH - 2;
    writeln!(f)?;
    writeln!(f, "╔{}╗", "═".repeat(BANNER_WIDTH))?;
    match glyph {
        Some(glyph) => {
            let rest = inner - 3;
            writeln!(f, "║ {} {:^rest$} ║", glyph, title)?;
        }
        None => writeln!(f, "║ {:^inner$} ║", title)?,
    }
    writeln!(f, "╠{}╣", "═".repeat(BANNER_WIDTH))?;
    for line in lines {
        writeln!(f, "║ {:<inner$} ║", line)?;
    }
    writeln!(f, "╚{}╝", "═".repeat(BANNER_WIDTH))
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Started { state } => {
                banner(
                    f,
                    None,
                    "ITERATION LOOP STARTED",
                    &[
                        format!("Iteration: {}", iteration_label(state.iteration, state.max_iterations)),
                        format!("Promise: {}", state.completion_promise.as_deref().unwrap_or("None")),
                    ],
                )?;
                writeln!(f)?;
                writeln!(f, "PROMPT:")?;
                writeln!(f, "{}", state.prompt)?;
                writeln!(f)?;
                rule(f)?;
                writeln!(f)?;
                writeln!(f, "INSTRUCTIONS FOR COMPLETION:")?;
                writeln!(f)?;
                match &state.completion_promise {
                    Some(promise) => {
                        writeln!(f, "To complete this loop, output this EXACT text when the statement is TRUE:")?;
                        writeln!(f, "  {}", wrap_promise(promise))?;
                        writeln!(f)?;
                        writeln!(f, "RULES:")?;
                        writeln!(f, "  - Use <promise> tags exactly as shown")?;
                        writeln!(f, "  - The statement MUST be completely true")?;
                        writeln!(f, "  - Do NOT output the promise to escape - only when genuinely complete")?;
                        writeln!(f, "  - After each work session, run: {}", CHECK_COMMAND)?;
                        writeln!(f)?;
                        writeln!(f, "If stuck after many iterations, document blockers and suggest alternatives.")
                    }
                    None => {
                        writeln!(f, "No completion promise set. Loop runs until max iterations or manual cancel.")?;
                        writeln!(f, "After each work session, run: {}", CHECK_COMMAND)
                    }
                }
            }
            Report::Continue { state } => {
                let mut lines = vec![format!(
                    "Iteration: {}",
                    iteration_label(state.iteration, state.max_iterations)
                )];
                if let Some(remaining) = state.remaining() {
                    lines.push(format!("Remaining after this one: {}", remaining));
                }
                banner(f, Some("🔄"), "CONTINUING LOOP", &lines)?;
                writeln!(f)?;
                if let Some(promise) = &state.completion_promise {
                    writeln!(f, "To complete: output {} when TRUE", wrap_promise(promise))?;
                    writeln!(f)?;
                }
                writeln!(f, "PROMPT:")?;
                writeln!(f, "{}", state.prompt)?;
                writeln!(f)?;
                rule(f)
            }
            Report::Completed { state, archive } => banner(
                f,
                Some("✅"),
                "LOOP COMPLETE",
                &[
                    format!("Completed in {} iteration(s)", state.iteration),
                    format!(
                        "Promise detected: {}",
                        wrap_promise(state.completion_promise.as_deref().unwrap_or_default())
                    ),
                    format!("Archived: {}", archive),
                ],
            ),
            Report::MaxReached { state, archive } => banner(
                f,
                Some("🛑"),
                "MAX ITERATIONS REACHED",
                &[
                    format!("Stopped at iteration {} (max: {})", state.iteration, state.max_iterations),
                    "Loop ended without completion promise".to_string(),
                    format!("Archived: {}", archive),
                ],
            ),
            Report::Cancelled { state, archive } => {
                writeln!(f, "Cancelled loop at iteration {}", state.iteration)?;
                writeln!(f, "Checks recorded: {}", state.history.len())?;
                writeln!(f, "Archived: {}", archive)
            }
            Report::Active { state } => {
                let mut lines = vec![
                    format!("Iteration: {}", iteration_label(state.iteration, state.max_iterations)),
                    format!("Promise: {}", state.completion_promise.as_deref().unwrap_or("None")),
                    format!("Started: {}", state.started_at.format("%Y-%m-%d %H:%M:%S UTC")),
                ];
                if let Some(remaining) = state.remaining() {
                    lines.push(format!("Remaining after this one: {}", remaining));
                }
                banner(f, None, "ITERATION LOOP STATUS", &lines)?;
                writeln!(f)?;
                writeln!(f, "PROMPT:")?;
                writeln!(f, "{}", preview(&state.prompt))
            }
            Report::Idle { recent } => {
                writeln!(f, "No active loop.")?;
                if !recent.is_empty() {
                    writeln!(f)?;
                    writeln!(f, "Recent loops:")?;
                    for summary in recent {
                        writeln!(
                            f,
                            "  {} {}: {} iterations",
                            summary.outcome.glyph(),
                            summary.key,
                            summary.iterations
                        )?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArchiveRecord, LoopOutcome};

    fn advanced(mut state: LoopState, times: u32) -> LoopState {
        for _ in 0..times {
            state.record(false, None);
            state.advance();
        }
        state
    }

    #[test]
    fn test_exit_codes() {
        let state = LoopState::new("p", None, 0);
        assert_eq!(Report::Started { state: state.clone() }.exit_code(), 0);
        assert_eq!(Report::Continue { state: state.clone() }.exit_code(), 0);
        assert_eq!(Report::Active { state: state.clone() }.exit_code(), 0);
        assert_eq!(Report::Idle { recent: vec![] }.exit_code(), 0);
        assert_eq!(
            Report::Cancelled { state: state.clone(), archive: "a".into() }.exit_code(),
            0
        );
        assert_eq!(
            Report::Completed { state: state.clone(), archive: "a".into() }.exit_code(),
            1
        );
        assert_eq!(Report::MaxReached { state, archive: "a".into() }.exit_code(), 1);
    }

    #[test]
    fn test_started_with_promise_shows_instructions() {
        let text = Report::Started {
            state: LoopState::new("Build feature X", Some("COMPLETE"), 50),
        }
        .to_string();

        assert!(text.contains("ITERATION LOOP STARTED"));
        assert!(text.contains("Iteration: 1 of 50"));
        assert!(text.contains("Promise: COMPLETE"));
        assert!(text.contains("Build feature X"));
        assert!(text.contains("<promise>COMPLETE</promise>"));
        assert!(text.contains("iterloop check"));
    }

    #[test]
    fn test_started_without_promise() {
        let text = Report::Started {
            state: LoopState::new("Refactor", None, 0),
        }
        .to_string();

        assert!(text.contains("Iteration: 1 of ∞"));
        assert!(text.contains("Promise: None"));
        assert!(text.contains("No completion promise set"));
        assert!(!text.contains("<promise>"));
    }

    #[test]
    fn test_continue_reemits_prompt_and_reminder() {
        let state = advanced(LoopState::new("Fix the flaky test", Some("FIXED"), 5), 1);
        let text = Report::Continue { state }.to_string();

        assert!(text.contains("CONTINUING LOOP"));
        assert!(text.contains("Iteration: 2 of 5"));
        assert!(text.contains("Remaining after this one: 3"));
        assert!(text.contains("To complete: output <promise>FIXED</promise> when TRUE"));
        assert!(text.contains("PROMPT:\nFix the flaky test"));
    }

    #[test]
    fn test_continue_without_promise_has_no_reminder() {
        let state = advanced(LoopState::new("Keep going", None, 0), 2);
        let text = Report::Continue { state }.to_string();

        assert!(text.contains("Iteration: 3 of ∞"));
        assert!(!text.contains("To complete"));
        assert!(!text.contains("Remaining"));
    }

    #[test]
    fn test_completed_shows_evidence() {
        let mut state = advanced(LoopState::new("p", Some("ALL DONE"), 0), 2);
        state.record(true, None);
        let text = Report::Completed {
            state,
            archive: "iteration-loop-completed-20260101-000000".into(),
        }
        .to_string();

        assert!(text.contains("LOOP COMPLETE"));
        assert!(text.contains("Completed in 3 iteration(s)"));
        assert!(text.contains("Promise detected: <promise>ALL DONE</promise>"));
        assert!(text.contains("iteration-loop-completed-20260101-000000"));
    }

    #[test]
    fn test_max_reached_shows_bound() {
        let state = advanced(LoopState::new("p", None, 3), 2);
        let text = Report::MaxReached {
            state,
            archive: "k".into(),
        }
        .to_string();

        assert!(text.contains("MAX ITERATIONS REACHED"));
        assert!(text.contains("Stopped at iteration 3 (max: 3)"));
    }

    #[test]
    fn test_cancelled() {
        let state = advanced(LoopState::new("p", None, 0), 2);
        let text = Report::Cancelled {
            state,
            archive: "k".into(),
        }
        .to_string();

        assert!(text.contains("Cancelled loop at iteration 3"));
        assert!(text.contains("Checks recorded: 2"));
    }

    #[test]
    fn test_active_truncates_long_prompt() {
        let prompt = "x".repeat(PROMPT_PREVIEW_CHARS + 50);
        let text = Report::Active {
            state: LoopState::new(prompt, None, 0),
        }
        .to_string();

        let expected = format!("{}...", "x".repeat(PROMPT_PREVIEW_CHARS));
        assert!(text.contains(&expected));
        assert!(!text.contains(&"x".repeat(PROMPT_PREVIEW_CHARS + 1)));
    }

    #[test]
    fn test_active_short_prompt_untouched() {
        let text = Report::Active {
            state: LoopState::new("Short prompt", Some("OK"), 4),
        }
        .to_string();

        assert!(text.contains("ITERATION LOOP STATUS"));
        assert!(text.contains("Iteration: 1 of 4"));
        assert!(text.contains("Promise: OK"));
        assert!(text.contains("PROMPT:\nShort prompt\n"));
        assert!(!text.contains("Short prompt..."));
    }

    #[test]
    fn test_idle_lists_recent() {
        let record = ArchiveRecord::new(advanced(LoopState::new("p", None, 0), 4), LoopOutcome::Completed);
        let summary = ArchiveSummary::new("iteration-loop-completed-x", &record);
        let text = Report::Idle { recent: vec![summary] }.to_string();

        assert!(text.starts_with("No active loop."));
        assert!(text.contains("Recent loops:"));
        assert!(text.contains("✅ iteration-loop-completed-x: 4 iterations"));
    }

    /// Columns a banner line occupies; the emoji glyphs used in titles are two wide
    fn columns(line: &str) -> usize {
        line.chars()
            .map(|c| if matches!(c, '🔄' | '✅' | '🛑') { 2 } else { 1 })
            .sum()
    }

    fn assert_box_aligned(text: &str) {
        let boxed: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with('╔') || l.starts_with('║') || l.starts_with('╠') || l.starts_with('╚'))
            .collect();
        assert!(!boxed.is_empty());
        let width = columns(boxed[0]);
        for line in &boxed {
            assert_eq!(columns(line), width, "misaligned banner line: {line}");
            assert!(line.ends_with('╗') || line.ends_with('║') || line.ends_with('╣') || line.ends_with('╝'));
        }
    }

    #[test]
    fn test_banner_right_border_aligned() {
        let base = LoopState::new("p", Some("DONE"), 3);
        let continuing = advanced(base.clone(), 1);
        let maxed = advanced(base.clone(), 2);

        assert_box_aligned(&Report::Started { state: base.clone() }.to_string());
        assert_box_aligned(&Report::Continue { state: continuing }.to_string());
        assert_box_aligned(&Report::Completed { state: base.clone(), archive: "k".into() }.to_string());
        assert_box_aligned(&Report::MaxReached { state: maxed, archive: "k".into() }.to_string());
        assert_box_aligned(&Report::Active { state: base }.to_string());
    }

    #[test]
    fn test_idle_without_archives() {
        let text = Report::Idle { recent: vec![] }.to_string();
        assert_eq!(text, "No active loop.\n");
    }
}
