use bundle_sizer::cmd::{self, MeasureOptions};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process;

/// JavaScript bundle size measurer
///
/// bundle-sizer bundles every package on its own and all of them together,
/// then reports minified and gzipped sizes, largest first.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable emoji output (useful for CI/CD or accessibility)
    #[arg(long, global = true)]
    no_emoji: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle every package and report sizes
    Measure {
        /// Packages to measure (default: config `packages` or package.json dependencies)
        #[arg(value_name = "PACKAGES")]
        packages: Vec<String>,

        /// Config file to use instead of .bundle-sizer.toml
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// package.json whose dependencies are measured
        #[arg(short, long, value_name = "FILE")]
        manifest: Option<PathBuf>,

        /// Directory for entries and artifacts
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Maximum concurrent builds (default: number of CPUs)
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,

        /// Maximum concurrent entry writes
        #[arg(long, value_name = "N")]
        io_jobs: Option<usize>,

        /// Output as JSON (for CI/CD integration)
        #[arg(long)]
        json: bool,

        /// Only print the report
        #[arg(short, long)]
        quiet: bool,

        /// Do not run the configured setup command
        #[arg(long)]
        skip_setup: bool,
    },

    /// Initialize bundle-sizer configuration
    Init {
        /// Packages to list in the new config file
        #[arg(value_name = "PACKAGES")]
        packages: Vec<String>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // Initialize logger (use RUST_LOG env var to control verbosity)
    env_logger::init();

    let cli = Cli::parse();

    // Set console emoji mode based on CLI flag
    if cli.no_emoji {
        std::env::set_var("NO_EMOJI", "1");
    }

    let result = match cli.command {
        Some(Commands::Measure {
            packages,
            config,
            manifest,
            out_dir,
            jobs,
            io_jobs,
            json,
            quiet,
            skip_setup,
        }) => {
            let options = MeasureOptions {
                packages,
                config_path: config,
                manifest,
                out_dir,
                jobs,
                io_jobs,
                skip_setup,
            };
            cmd::cmd_measure(&options, json, quiet)
        }
        Some(Commands::Init { packages, force }) => cmd::cmd_init(&packages, force),
        Some(Commands::Completions { shell }) => {
            cmd::cmd_completions(shell);
            Ok(())
        }
        None => {
            // No subcommand provided, show help
            println!("bundle-sizer v{}", env!("CARGO_PKG_VERSION"));
            println!("JavaScript bundle size measurer\n");
            println!("Usage: bundle-sizer <COMMAND>\n");
            println!("Commands:");
            println!("  measure      Bundle every package and report sizes");
            println!("  init         Initialize bundle-sizer configuration");
            println!("  completions  Generate shell completions");
            println!("\nRun 'bundle-sizer <COMMAND> --help' for more information on a command.");
            Ok(())
        }
    };

    if let Err(e) = result {
        use bundle_sizer::error::ErrorFormatter;
        eprintln!("{}", ErrorFormatter::format(&e));
        let exit_code = ErrorFormatter::exit_code(&e);
        process::exit(exit_code);
    }
}
