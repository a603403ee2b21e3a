//! Positional-argument arity rules.

use clap::Command;

use crate::errors::{Fault, FaultResult};

/// Build a validator that accepts exactly `expected` positional arguments.
///
/// On violation it returns a single usage error carrying the full command
/// path, the required count, a `--help` pointer, the command's usage line,
/// and its short description. The message format is fixed; downstream
/// tooling greps it.
///
/// The command path is taken from clap's `bin_name` when populated (clap
/// fills it for dispatched subcommands), falling back to the command name.
pub fn exact_args(expected: usize) -> impl Fn(&mut Command, &[String]) -> FaultResult<()> {
    move |cmd, args| {
        if args.len() == expected {
            return Ok(());
        }
        let path = cmd
            .get_bin_name()
            .unwrap_or_else(|| cmd.get_name())
            .to_string();
        let short = cmd
            .get_about()
            .map(|s| s.to_string())
            .unwrap_or_default();
        let use_line = use_line(cmd);
        Err(Fault::invalid_argument(format!(
            "{:?} requires exactly {} argument(s).\nSee '{} --help'.\n\nUsage:  {}\n\n{}",
            path, expected, path, use_line, short
        )))
    }
}

/// Usage line without the renderer's `Usage:` prefix.
fn use_line(cmd: &mut Command) -> String {
    let rendered = cmd.render_usage().to_string();
    rendered
        .strip_prefix("Usage:")
        .unwrap_or(&rendered)
        .trim()
        .to_string()
}
