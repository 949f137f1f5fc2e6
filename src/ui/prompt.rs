use std::sync::{Arc, Mutex};

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use tokio_util::sync::CancellationToken;

use super::input_area::COMMANDS;

/// Command names starting with the typed prefix. Only the first word of a
/// slash line is completed.
pub fn complete_command(line: &str) -> Vec<&'static str> {
    if !line.starts_with('/') || line.contains(char::is_whitespace) {
        return Vec::new();
    }
    COMMANDS
        .iter()
        .copied()
        .filter(|cmd| cmd.starts_with(line))
        .collect()
}

/// Line-editor helper completing and hinting slash commands.
#[derive(Clone, Default)]
pub struct CommandHelper;

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = complete_command(&line[..pos])
            .into_iter()
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        complete_command(line)
            .into_iter()
            .find(|cmd| cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Highlighter for CommandHelper {}

impl Validator for CommandHelper {}

/// Routes Ctrl-C to the turn in flight. One process-wide signal listener
/// calls `interrupt`; the front end brackets each send with `begin` and
/// `finish`.
#[derive(Clone, Default)]
pub struct TurnInterrupt {
    current: Arc<Mutex<Option<CancellationToken>>>,
}

impl TurnInterrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Ok(mut current) = self.current.lock() {
            *current = Some(token.clone());
        }
        token
    }

    pub fn finish(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }

    /// Cancel the turn in flight. Returns false when nothing was running.
    pub fn interrupt(&self) -> bool {
        match self.current.lock() {
            Ok(current) => match current.as_ref() {
                Some(token) => {
                    token.cancel();
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }
}
