//! Interactive restart-count prompt and result printing.

use pt_optimizer::{Objective, RandomRestart, SearchReport};
use pt_types::{internal_error, SearchError, TuneResult};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const SEPARATOR: &str = "--------------------";

/// Parse a restart count typed by the user. Must be a positive integer.
pub fn parse_restart_count(input: &str) -> Result<usize, SearchError> {
    let trimmed = input.trim();
    match trimmed.parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(SearchError::InvalidRestartCount {
            input: trimmed.to_string(),
        }),
    }
}

/// Anything except a case-insensitive `N` asks for another search.
pub fn wants_another_round(answer: &str) -> bool {
    !answer.trim().eq_ignore_ascii_case("n")
}

/// Human-readable summary of one search.
pub fn format_report(report: &SearchReport) -> String {
    let best = &report.best;
    [
        SEPARATOR.to_string(),
        format!("Best C: {}", best.params.c),
        SEPARATOR.to_string(),
        format!("Best degree: {}", best.params.degree),
        SEPARATOR.to_string(),
        format!("Accuracy: {}", best.accuracy_percent()),
        SEPARATOR.to_string(),
        format!("Elapsed: {:.2} seconds", report.elapsed_seconds),
        SEPARATOR.to_string(),
    ]
    .join("\n")
}

/// Render a report as text or pretty JSON.
pub fn render_report(report: &SearchReport, json: bool) -> TuneResult<String> {
    if json {
        Ok(report.to_json_pretty()?)
    } else {
        Ok(format_report(report))
    }
}

/// Prompt loop around a [`RandomRestart`] driver: ask for a restart count,
/// run one search, print it, and ask whether to go again.
pub struct Shell<O> {
    search: RandomRestart<O>,
    editor: DefaultEditor,
    json: bool,
}

impl<O: Objective> Shell<O> {
    pub fn new(search: RandomRestart<O>) -> TuneResult<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| internal_error!("Failed to create line editor: {e}"))?;
        Ok(Self {
            search,
            editor,
            json: false,
        })
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Run until the user answers `N` or closes input.
    pub fn run(&mut self) -> TuneResult<()> {
        loop {
            let Some(count) = self.read_restart_count()? else {
                break;
            };

            match self.search.run(count) {
                Ok(report) => println!("{}", render_report(&report, self.json)?),
                Err(e) => println!("Search failed: {e}"),
            }

            match self.editor.readline("Run again? (Y/N): ") {
                Ok(answer) if wants_another_round(&answer) => continue,
                Ok(_) => break,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(internal_error!("Failed to read input: {e}")),
            }
        }
        Ok(())
    }

    /// Re-prompts on invalid input. `None` when input is closed.
    fn read_restart_count(&mut self) -> TuneResult<Option<usize>> {
        loop {
            match self.editor.readline("Number of random restarts: ") {
                Ok(line) => match parse_restart_count(&line) {
                    Ok(count) => {
                        let _ = self.editor.add_history_entry(line.trim());
                        return Ok(Some(count));
                    }
                    Err(e) => println!("{e}"),
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
                Err(e) => return Err(internal_error!("Failed to read input: {e}")),
            }
        }
    }
}
