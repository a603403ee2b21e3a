//! Flag binding: one effective value shared by a primary flag, its aliases,
//! and an optional environment-variable override.

use std::collections::BTreeMap;
use std::env;
use std::iter;
use std::time::Duration;

use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing::warn;

use crate::errors::{Fault, FaultResult};

/// Typed compiled-in default, resolved against the environment at bind time.
#[derive(Debug, Clone, PartialEq)]
enum FlagValue {
    Str(String),
    Int(i64),
    Duration(Duration),
}

impl FlagValue {
    /// Render for clap's `default_value` (must round-trip through the
    /// matching value parser).
    fn render(&self) -> String {
        match self {
            FlagValue::Str(s) => s.clone(),
            FlagValue::Int(i) => i.to_string(),
            FlagValue::Duration(d) => humantime::format_duration(*d).to_string(),
        }
    }
}

#[derive(Debug)]
struct Binding {
    primary: String,
    /// Primary first, then aliases in registration order.
    names: Vec<String>,
    /// Effective value when no name was supplied on the command line.
    default: FlagValue,
}

/// Per-command flag registry.
///
/// Binds named options onto a [`Command`] so that a primary flag, its
/// aliases, an optional environment variable, and a compiled-in default all
/// resolve to one effective value. Reads go through the same registry after
/// parsing, so setting the value through any one name is observable through
/// every other name.
///
/// Precedence for the initial value, evaluated once at bind time:
///
/// 1. environment variable set and parseable → env value
/// 2. environment variable set but malformed → warning logged, compiled
///    default kept (binding never fails because of the environment)
/// 3. otherwise → compiled default
///
/// A user supplying the flag (via any of its names) during invocation
/// overrides the initial value; when several names appear, the last
/// occurrence on the command line wins.
#[derive(Debug, Default)]
pub struct FlagSet {
    bindings: Vec<Binding>,
    by_name: BTreeMap<String, usize>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a string option with aliases and an optional env override.
    ///
    /// Registers `--<name>` plus one flag per alias on `cmd`. Alias help is
    /// auto-generated as `Alias of --<name>`; single-character aliases are
    /// additionally registered as short flags. When `env` is given, the
    /// usage text is suffixed with `[$ENV]`.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidArgument` fault when `name` or any alias collides
    /// with a name already bound through this registry.
    pub fn bind_string(
        &mut self,
        cmd: Command,
        name: &str,
        aliases: &[&str],
        default: &str,
        env: Option<&str>,
        usage: &str,
    ) -> FaultResult<Command> {
        let env = env.filter(|k| !k.is_empty());
        let mut value = default.to_string();
        if let Some(raw) = env.and_then(lookup_env) {
            value = raw;
        }
        self.install(cmd, name, aliases, FlagValue::Str(value), usage_text(usage, env))
    }

    /// Bind an integer option with aliases and an optional env override.
    pub fn bind_int(
        &mut self,
        cmd: Command,
        name: &str,
        aliases: &[&str],
        default: i64,
        env: Option<&str>,
        usage: &str,
    ) -> FaultResult<Command> {
        let env = env.filter(|k| !k.is_empty());
        let mut value = default;
        if let Some(key) = env {
            if let Some(raw) = lookup_env(key) {
                match raw.parse::<i64>() {
                    Ok(v) => value = v,
                    Err(e) => warn!("Invalid int value for `{}`: {}", key, e),
                }
            }
        }
        self.install(cmd, name, aliases, FlagValue::Int(value), usage_text(usage, env))
    }

    /// Bind a duration option with aliases and an optional env override.
    ///
    /// Values are parsed with `humantime` (e.g. `30s`, `1h5m`), both from
    /// the environment and from the command line.
    pub fn bind_duration(
        &mut self,
        cmd: Command,
        name: &str,
        aliases: &[&str],
        default: Duration,
        env: Option<&str>,
        usage: &str,
    ) -> FaultResult<Command> {
        let env = env.filter(|k| !k.is_empty());
        let mut value = default;
        if let Some(key) = env {
            if let Some(raw) = lookup_env(key) {
                match humantime::parse_duration(&raw) {
                    Ok(v) => value = v,
                    Err(e) => warn!("Invalid duration value for `{}`: {}", key, e),
                }
            }
        }
        self.install(cmd, name, aliases, FlagValue::Duration(value), usage_text(usage, env))
    }

    /// Effective string value, readable through the primary name or any alias.
    pub fn string(&self, matches: &ArgMatches, name: &str) -> FaultResult<String> {
        let binding = self.binding(name)?;
        let FlagValue::Str(default) = &binding.default else {
            return Err(Fault::invalid_argument(format!(
                "flag --{} is not a string flag",
                binding.primary
            )));
        };
        match self.winning_name(binding, matches)? {
            Some(n) => parsed_value::<String>(matches, n).cloned(),
            None => Ok(default.clone()),
        }
    }

    /// Effective integer value, readable through the primary name or any alias.
    pub fn int(&self, matches: &ArgMatches, name: &str) -> FaultResult<i64> {
        let binding = self.binding(name)?;
        let FlagValue::Int(default) = binding.default else {
            return Err(Fault::invalid_argument(format!(
                "flag --{} is not an int flag",
                binding.primary
            )));
        };
        match self.winning_name(binding, matches)? {
            Some(n) => parsed_value::<i64>(matches, n).copied(),
            None => Ok(default),
        }
    }

    /// Effective duration value, readable through the primary name or any alias.
    pub fn duration(&self, matches: &ArgMatches, name: &str) -> FaultResult<Duration> {
        let binding = self.binding(name)?;
        let FlagValue::Duration(default) = binding.default else {
            return Err(Fault::invalid_argument(format!(
                "flag --{} is not a duration flag",
                binding.primary
            )));
        };
        match self.winning_name(binding, matches)? {
            Some(n) => parsed_value::<Duration>(matches, n).copied(),
            None => Ok(default),
        }
    }

    fn install(
        &mut self,
        mut cmd: Command,
        name: &str,
        aliases: &[&str],
        value: FlagValue,
        usage: String,
    ) -> FaultResult<Command> {
        let names = self.claim(name, aliases)?;
        let rendered = value.render();
        let alias_usage = format!("Alias of --{}", name);

        cmd = cmd.arg(
            typed_arg(name, &value)
                .long(name.to_string())
                .help(usage)
                .default_value(rendered.clone()),
        );
        for alias in aliases {
            let mut arg = typed_arg(alias, &value)
                .long(alias.to_string())
                .help(alias_usage.clone())
                .default_value(rendered.clone());
            // the engine does not infer a short flag from a one-char long name
            if let Some(c) = single_char(alias) {
                arg = arg.short(c);
            }
            cmd = cmd.arg(arg);
        }

        let idx = self.bindings.len();
        for n in &names {
            self.by_name.insert(n.clone(), idx);
        }
        self.bindings.push(Binding {
            primary: name.to_string(),
            names,
            default: value,
        });
        Ok(cmd)
    }

    /// Reject any name (primary or alias) already claimed by another option.
    fn claim(&self, name: &str, aliases: &[&str]) -> FaultResult<Vec<String>> {
        let mut names: Vec<String> = Vec::with_capacity(1 + aliases.len());
        for n in iter::once(name).chain(aliases.iter().copied()) {
            if self.by_name.contains_key(n) || names.iter().any(|seen| seen.as_str() == n) {
                return Err(Fault::invalid_argument(format!(
                    "flag name already registered: --{}",
                    n
                )));
            }
            names.push(n.to_string());
        }
        Ok(names)
    }

    fn binding(&self, name: &str) -> FaultResult<&Binding> {
        self.by_name
            .get(name)
            .map(|&i| &self.bindings[i])
            .ok_or_else(|| Fault::invalid_argument(format!("unknown flag: --{}", name)))
    }

    /// The name whose command-line occurrence came last, or `None` when the
    /// user supplied none of the option's names.
    fn winning_name<'a>(
        &self,
        binding: &'a Binding,
        matches: &ArgMatches,
    ) -> FaultResult<Option<&'a str>> {
        let mut best: Option<(usize, &'a str)> = None;
        for n in &binding.names {
            matches.try_contains_id(n.as_str()).map_err(|_| {
                Fault::system(format!(
                    "flag --{} looked up against a command it was not bound on",
                    n
                ))
            })?;
            if matches.value_source(n.as_str()) != Some(ValueSource::CommandLine) {
                continue;
            }
            if let Some(idx) = matches.index_of(n.as_str()) {
                if best.map_or(true, |(b, _)| idx > b) {
                    best = Some((idx, n.as_str()));
                }
            }
        }
        Ok(best.map(|(_, n)| n))
    }
}

fn typed_arg(id: &str, value: &FlagValue) -> Arg {
    let arg = Arg::new(id.to_string()).action(ArgAction::Set);
    match value {
        FlagValue::Str(_) => arg,
        FlagValue::Int(_) => arg.value_parser(value_parser!(i64)),
        FlagValue::Duration(_) => arg.value_parser(parse_cli_duration),
    }
}

fn parsed_value<'a, T>(matches: &'a ArgMatches, name: &str) -> FaultResult<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    matches
        .try_get_one::<T>(name)
        .map_err(|e| Fault::system(format!("reading flag --{}: {}", name, e)))?
        .ok_or_else(|| Fault::system(format!("missing parsed value for --{}", name)))
}

fn parse_cli_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s)
}

fn usage_text(usage: &str, env: Option<&str>) -> String {
    match env {
        Some(key) => format!("{} [${}]", usage, key),
        None => usage.to_string(),
    }
}

fn single_char(name: &str) -> Option<char> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn lookup_env(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) => Some(v),
        Err(env::VarError::NotPresent) => None,
        Err(env::VarError::NotUnicode(_)) => {
            warn!("Invalid unicode value for `{}`", key);
            None
        }
    }
}
