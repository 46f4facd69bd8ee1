use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use testcase_records::config::RULES_ENV;
use testcase_records::report::{exit_status, run_command, Command, CommandOutput};
use testcase_records::{Error, ValidationRules};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Normalize, validate and encode API test case records", long_about = None)]
struct Cli {
    /// JSON file overriding the default validation rules
    #[arg(long, global = true, env = RULES_ENV)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate test cases and print a report
    Check {
        /// Test case JSON (object or array); `-` reads stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// Print the normalized test cases as JSON
    Normalize {
        #[arg(default_value = "-")]
        input: String,
    },
    /// Print the document-database item of each normalized test case
    Document {
        #[arg(default_value = "-")]
        input: String,
    },
}

impl Commands {
    fn parts(&self) -> (Command, &str) {
        match self {
            Commands::Check { input } => (Command::Check, input),
            Commands::Normalize { input } => (Command::Normalize, input),
            Commands::Document { input } => (Command::Document, input),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = run(cli);
    match &result {
        Ok(output) => {
            if let Some(stdout) = &output.stdout {
                print_json(stdout, false);
            }
            if let Some(stderr) = &output.stderr {
                print_json(stderr, true);
            }
        }
        Err(err) => error!("{}", err),
    }
    ExitCode::from(exit_status(&result))
}

fn run(cli: Cli) -> Result<CommandOutput, Error> {
    let rules = ValidationRules::load_or_default(cli.rules.as_deref())?;
    let (command, input) = cli.command.parts();
    let content = read_input(input)?;
    info!("read input from {}", input);
    run_command(command, &content, &rules)
}

fn read_input(input: &str) -> Result<String, Error> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

fn print_json(value: &serde_json::Value, to_stderr: bool) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    if to_stderr {
        eprintln!("{}", rendered);
    } else {
        println!("{}", rendered);
    }
}
