use std::path::PathBuf;
use std::process::ExitCode;

use axum::http::Method;
use clap::{Parser, Subcommand};

use page_dispatch::config::{build_rule_table, load_config};
use page_dispatch::routing::{OutcomeSpec, RuleTable};

#[derive(Parser)]
#[command(name = "dispatch-cli")]
#[command(about = "Inspect page-dispatch rule configuration", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and list rules in match order
    Check,
    /// Show which rule a request would select
    Match {
        /// HTTP method, e.g. GET
        method: String,
        /// Request path, context prefix already stripped
        path: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let table = match load_config(&cli.config).map_err(|e| e.to_string()).and_then(|config| {
        build_rule_table(&config, None).map_err(|e| e.to_string())
    }) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Check => {
            print_rules(&table);
            ExitCode::SUCCESS
        }
        Commands::Match { method, path } => {
            let Ok(method) = Method::from_bytes(method.to_ascii_uppercase().as_bytes()) else {
                eprintln!("Error: invalid method '{}'", method);
                return ExitCode::FAILURE;
            };
            match table.find(&method, &path) {
                Some(route) => {
                    println!("{}", route.rule);
                    for (name, value) in route.path_vars.iter() {
                        println!("  {} = {}", name, value);
                    }
                    ExitCode::SUCCESS
                }
                None => {
                    println!("no rule matches {} {}", method, path);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn print_rules(table: &RuleTable) {
    println!("{} rules, in match order:", table.rules().len());
    for rule in table.rules() {
        let outcome = match rule.default_outcome() {
            OutcomeSpec::Forward { path, status } => format!("forward {} ({})", path, status.as_u16()),
            OutcomeSpec::Redirect(target) => format!("redirect {}", target),
            other => other.name().to_string(),
        };
        let handlers: Vec<String> = rule.handlers().iter().map(|h| h.declaration.to_string()).collect();
        println!("  {:<40} {:<30} [{}]", rule.to_string(), outcome, handlers.join(", "));
    }
}
