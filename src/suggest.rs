//! Unknown-subcommand handling with near-miss suggestions.

use clap::Command;

use crate::errors::{Fault, FaultKind, FaultResult};

/// A candidate qualifies when its edit distance is at most this, or when it
/// extends the attempted name as a prefix.
const SUGGESTION_MIN_DISTANCE: usize = 2;

/// Suggestion lists stay short; anything past this is noise.
const MAX_SUGGESTIONS: usize = 3;

/// Handler for a parent command invoked with a non-existent subcommand.
///
/// With no arguments at all, delegates to the help renderer. Otherwise
/// returns a single error naming the attempted subcommand, with a
/// `Did you mean this?` block when near-miss candidates exist. Terminal in
/// both branches; never recurses or retries.
pub fn unknown_subcommand(cmd: &mut Command, args: &[String]) -> FaultResult<()> {
    if args.is_empty() {
        return cmd
            .print_help()
            .map_err(|e| Fault::wrap(FaultKind::System, e));
    }
    let attempted = args[0].as_str();
    let mut msg = format!(
        "unknown subcommand {:?} for {:?}",
        attempted,
        cmd.get_name()
    );
    let suggestions = suggestions_for(cmd, attempted);
    if !suggestions.is_empty() {
        msg.push_str("\n\nDid you mean this?\n");
        for s in &suggestions {
            msg.push_str(&format!("\t{}\n", s));
        }
    }
    Err(Fault::invalid_argument(msg))
}

/// Near-miss subcommand names for `attempted`, most similar first.
///
/// Prefix matches rank ahead of pure edit-distance matches; ties keep
/// declaration order. The engine does not expose its own matcher, so a
/// small case-insensitive Levenshtein ranking stands in.
pub fn suggestions_for(cmd: &Command, attempted: &str) -> Vec<String> {
    let attempted = attempted.to_lowercase();
    let mut ranked: Vec<(usize, String)> = Vec::new();
    for sub in cmd.get_subcommands() {
        let name = sub.get_name();
        let candidate = name.to_lowercase();
        let distance = levenshtein(&attempted, &candidate);
        // an empty attempted name prefixes every sibling
        let prefixed = candidate.starts_with(&attempted);
        if prefixed {
            ranked.push((0, name.to_string()));
        } else if distance <= SUGGESTION_MIN_DISTANCE {
            ranked.push((distance, name.to_string()));
        }
    }
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name)
        .collect()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
