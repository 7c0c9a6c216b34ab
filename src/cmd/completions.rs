//! Completions command implementation
//!
//! Handles the `bundle-sizer completions` command which generates
//! shell completion scripts for bash, zsh, fish, etc.

use clap::{Arg, ArgAction, Command};
use clap_complete::{generate, Shell};
use std::io::Write;

const BIN_NAME: &str = "bundle-sizer";

// Mirrors the derive-based Cli in main.rs, which the library cannot see
fn completion_command() -> Command {
    Command::new(BIN_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Measure minified and gzipped bundle sizes of JavaScript packages")
        .arg(
            Arg::new("no-emoji")
                .long("no-emoji")
                .help("Disable emoji output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("measure")
                .about("Bundle every package and report sizes")
                .arg(Arg::new("packages").num_args(0..).value_name("PACKAGES"))
                .arg(Arg::new("config").long("config").short('c').value_name("FILE"))
                .arg(Arg::new("manifest").long("manifest").short('m').value_name("FILE"))
                .arg(Arg::new("out-dir").long("out-dir").short('o').value_name("DIR"))
                .arg(Arg::new("jobs").long("jobs").short('j').value_name("N"))
                .arg(Arg::new("io-jobs").long("io-jobs").value_name("N"))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue))
                .arg(Arg::new("quiet").long("quiet").short('q').action(ArgAction::SetTrue))
                .arg(Arg::new("skip-setup").long("skip-setup").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("init")
                .about("Initialize bundle-sizer configuration")
                .arg(Arg::new("packages").num_args(0..).value_name("PACKAGES"))
                .arg(Arg::new("force").long("force").short('f').action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("completions").about("Generate shell completions"))
}

/// Write the completion script for `shell` to `out`
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = completion_command();
    generate(shell, &mut cmd, BIN_NAME, out);
}

/// Generate shell completion scripts
///
/// Outputs completion script for the specified shell to stdout.
/// Users can redirect this to their shell's completion directory.
///
/// # Examples
///
/// ```bash
/// # Bash
/// bundle-sizer completions bash > /etc/bash_completion.d/bundle-sizer
///
/// # Zsh
/// bundle-sizer completions zsh > ~/.zfunc/_bundle-sizer
///
/// # Fish
/// bundle-sizer completions fish > ~/.config/fish/completions/bundle-sizer.fish
/// ```
pub fn cmd_completions(shell: Shell) {
    write_completions(shell, &mut std::io::stdout());
}
