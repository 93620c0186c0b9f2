use std::{
    io::{self, Read},
    path::PathBuf,
};

use clap::{Args, Parser as ClapParser, Subcommand};
use cond_probe::{
    PreviewOptions, ReportConfig,
    cli::{self, CheckOptions, CliError},
    output::{render_text, to_json},
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "cond-probe")]
#[command(about = "Explain why a JSONPath filter condition is true or false for a JSON document")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a condition and explain the outcome
    Check {
        /// The condition, e.g. "$[?(@.amount < 0 && @.lines empty false)]"
        condition: String,

        /// JSON document given inline
        #[arg(short, long)]
        input: Option<String>,

        /// JSON document read from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        limits: Limits,
    },

    /// Show how a condition splits into groups and clauses
    Split {
        /// The condition to split
        condition: String,
    },
}

#[derive(Args)]
struct Limits {
    /// Characters of a string shown before truncating
    #[arg(long, default_value_t = PreviewOptions::STANDARD.max_string_len)]
    max_string_len: usize,

    /// Object keys shown
    #[arg(long, default_value_t = PreviewOptions::STANDARD.max_keys)]
    max_keys: usize,

    /// Array elements shown
    #[arg(long, default_value_t = PreviewOptions::STANDARD.max_array_items)]
    max_array_items: usize,

    /// Nesting depth rendered for arrays
    #[arg(long, default_value_t = PreviewOptions::STANDARD.max_depth)]
    max_depth: usize,

    /// Values of each clause's node set shown
    #[arg(long, default_value_t = 5)]
    max_nodes: usize,

    /// Values sampled per diagnostic step
    #[arg(long, default_value_t = 3)]
    sample_size: usize,
}

impl Limits {
    fn config(&self) -> ReportConfig {
        ReportConfig {
            preview: PreviewOptions {
                max_string_len: self.max_string_len,
                max_keys: self.max_keys,
                max_array_items: self.max_array_items,
                max_depth: self.max_depth,
            },
            max_nodes: self.max_nodes,
            sample_size: self.sample_size,
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            condition,
            input,
            file,
            json,
            limits,
        } => run_check(condition, input, file, json, &limits),
        Commands::Split { condition } => {
            print!("{}", cli::describe_split(&condition));
            Ok(0)
        }
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    }
}

fn run_check(
    condition: String,
    input: Option<String>,
    file: Option<PathBuf>,
    json: bool,
    limits: &Limits,
) -> Result<i32, CliError> {
    let input = match (input, &file) {
        (Some(s), _) => Some(s),
        (None, None) if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        (None, _) => None,
    };

    let options = CheckOptions {
        condition,
        input,
        file,
        config: limits.config(),
    };

    let outcome = cli::execute_check(&options)?;
    if json {
        let rendered = serde_json::to_string_pretty(&to_json(&outcome.report))?;
        println!("{}", rendered);
    } else {
        print!("{}", render_text(&outcome.report));
    }
    Ok(outcome.exit_code())
}
