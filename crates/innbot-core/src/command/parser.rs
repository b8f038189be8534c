use std::sync::OnceLock;

use regex::Regex;

/// A message split into its command token and arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub token: String,
    pub args: Vec<String>,
}

static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

/// Collapse whitespace runs to single spaces, then split on spaces.
///
/// Never fails: empty input yields a single empty token, and leading
/// whitespace yields an empty command token.
pub fn parse_command(text: &str) -> ParsedCommand {
    let re = WHITESPACE_RUN.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    let collapsed = re.replace_all(text, " ");

    let mut tokens = collapsed.split(' ').map(str::to_string);
    let token = tokens.next().unwrap_or_default();
    ParsedCommand {
        token,
        args: tokens.collect(),
    }
}
