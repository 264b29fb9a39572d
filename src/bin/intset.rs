use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use intset::IntSet;

#[derive(Parser, Debug)]
#[command(
    name = "intset",
    version,
    about = "Compress integers into range notation and expand it back",
    propagate_version = true
)]
struct Cli {
    /// Logging level to use: one of "error", "warn", "info", "debug", "trace"
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the compressed notation of the given values, e.g. `2018 2019 2022` -> `2018-2019,2022`.
    /// Each value may itself be range notation.
    Render { values: Vec<String> },
    /// Print every integer the notation expands to, one per line
    Parse {
        notation: String,
        /// Sort ascending instead of keeping segment order
        #[arg(long)]
        sort: bool,
    },
    /// Expand the notation and compress it again
    Normalize { notation: String },
}

fn parse_notation(notation: &str) -> Result<IntSet> {
    IntSet::parse(notation).with_context(|| format!("invalid range notation {notation:?}"))
}

fn run(command: &Commands) -> Result<String> {
    match command {
        Commands::Render { values } => {
            let mut set = IntSet::new();
            for value in values {
                set.extend(parse_notation(value)?);
            }
            tracing::debug!(count = set.len(), "rendering");
            Ok(set.render())
        }
        Commands::Parse { notation, sort } => {
            let mut set = parse_notation(notation)?;
            if *sort {
                set.sort();
            }
            tracing::debug!(count = set.len(), "parsed");
            Ok(set
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Commands::Normalize { notation } => Ok(parse_notation(notation)?.render()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // logs go to stderr so stdout stays pipeable
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let output = run(&cli.command)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn run_args(args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("intset").chain(args.iter().copied()))?;
        run(&cli.command)
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_values() {
        let out = run_args(&["render", "2019", "2018", "2022"]).unwrap();
        assert_eq!(out, "2018-2019,2022");
    }

    #[test]
    fn test_render_accepts_notation() {
        let out = run_args(&["render", "2010-2012", "2013", "2017-2019,2022"]).unwrap();
        assert_eq!(out, "2010-2013,2017-2019,2022");
    }

    #[test]
    fn test_render_nothing() {
        assert_eq!(run_args(&["render"]).unwrap(), "");
    }

    #[test]
    fn test_parse_keeps_segment_order() {
        assert_eq!(run_args(&["parse", "5,1-3"]).unwrap(), "5\n1\n2\n3");
        assert_eq!(run_args(&["parse", "5,1-3", "--sort"]).unwrap(), "1\n2\n3\n5");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(run_args(&["normalize", "3,1-2,2,7"]).unwrap(), "1-3,7");
    }

    #[test]
    fn test_invalid_notation_reports_input() {
        let err = run_args(&["normalize", "1-2-3"]).unwrap_err();
        assert_eq!(err.to_string(), "invalid range notation \"1-2-3\"");
        assert!(err.root_cause().to_string().contains("invalid int span"));
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::try_parse_from(["intset", "render", "--log-level", "debug", "1"]).unwrap();
        assert_eq!(cli.log_level, tracing::Level::DEBUG);
    }
}
