//! Command-line plumbing for container-style CLIs built on the clap builder
//! API: aliased flags with environment overrides, positional arity rules,
//! unknown-subcommand suggestions, and a closed failure taxonomy for
//! exit-code and log-level decisions.
//!
//! ```
//! use clap::Command;
//! use cmdkit::FlagSet;
//!
//! let mut flags = FlagSet::new();
//! let cmd = flags
//!     .bind_string(
//!         Command::new("volume"),
//!         "label",
//!         &["l"],
//!         "",
//!         None,
//!         "Set a label on the volume",
//!     )
//!     .unwrap();
//! let matches = cmd.get_matches_from(["volume", "-l", "dev"]);
//! assert_eq!(flags.string(&matches, "label").unwrap(), "dev");
//! assert_eq!(flags.string(&matches, "l").unwrap(), "dev");
//! ```

pub mod arity;
pub mod errors;
pub mod exitcode;
pub mod flags;
pub mod suggest;
pub mod util;

pub use arity::exact_args;
pub use errors::{ClassifyExt, Fault, FaultKind, FaultResult};
pub use flags::FlagSet;
pub use suggest::{suggestions_for, unknown_subcommand};
