#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use marks_core::ErrorCode;
use marks_core::config::load_user_config;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "marks",
    author,
    version,
    about = "marks: flatten browser bookmarks and find near-duplicates",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Bookmark file to read (overrides MARKS_BOOKMARKS and the config file).
    #[arg(long, short = 'f', global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (shorthand for --format json).
    #[arg(long, global = true)]
    json: bool,

    /// Read the bookmark file directly, skipping the flatten cache.
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "List bookmarked urls",
        long_about = "List every bookmarked url, oldest first, with optional filters.",
        after_help = "EXAMPLES:\n    # All urls\n    marks urls\n\n    # Urls mentioning rust in the name or address\n    marks urls --search rust\n\n    # Ten oldest urls in one folder\n    marks urls --folder Reading --limit 10\n\n    # Emit machine-readable output\n    marks urls --json"
    )]
    Urls(cmd::urls::UrlsArgs),

    #[command(
        next_help_heading = "Read",
        about = "List bookmark folders",
        long_about = "List every folder in tree order with its parent and depth.",
        after_help = "EXAMPLES:\n    # Folder outline\n    marks folders\n\n    # Emit machine-readable output\n    marks folders --json"
    )]
    Folders(cmd::folders::FoldersArgs),

    #[command(
        next_help_heading = "Read",
        about = "Summarize the bookmark collection",
        long_about = "Report totals, folders, top sites, and monthly activity.",
        after_help = "EXAMPLES:\n    # Collection summary\n    marks stats\n\n    # Show the 5 most bookmarked sites\n    marks stats --top 5\n\n    # Emit machine-readable output\n    marks stats --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(next_help_heading = "Analyze")]
    Dedup(cmd::dedup::DedupArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    marks completions bash\n\n    # Generate zsh completions\n    marks completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MARKS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "marks=debug,info"
        } else {
            "marks=info,warn"
        })
    });

    let format = env::var("MARKS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(ref args) = cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args, &mut command);
    }

    let config = match load_user_config() {
        Ok(config) => config,
        Err(err) => {
            let mode = resolve_output_mode(cli.format, cli.json, None);
            render_error(
                mode,
                &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            return Err(err);
        }
    };

    let session = cmd::Session {
        output: resolve_output_mode(cli.format, cli.json, config.output.as_deref()),
        file: cli.file,
        no_cache: cli.no_cache,
        config,
    };
    debug!(output = ?session.output, no_cache = session.no_cache, "resolved session");

    match cli.command {
        Commands::Urls(ref args) => cmd::urls::run_urls(args, &session),
        Commands::Folders(ref args) => cmd::folders::run_folders(args, &session),
        Commands::Stats(ref args) => cmd::stats::run_stats(args, &session),
        Commands::Dedup(ref args) => cmd::dedup::run_dedup(args, &session),
        Commands::Completions(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_parses_before_and_after_subcommand() {
        let cli = Cli::parse_from(["marks", "--json", "urls"]);
        assert!(cli.json);
        let cli = Cli::parse_from(["marks", "urls", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn format_flag_parses() {
        let cli = Cli::parse_from(["marks", "folders", "--format", "text"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn file_and_no_cache_are_global() {
        let cli = Cli::parse_from(["marks", "stats", "--file", "/tmp/Bookmarks", "--no-cache"]);
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/Bookmarks")));
        assert!(cli.no_cache);
    }

    #[test]
    fn urls_subcommand_parses_filters() {
        let cli = Cli::parse_from(["marks", "urls", "--search", "rust", "--folder", "Dev", "-n", "5"]);
        let Commands::Urls(args) = cli.command else {
            panic!("expected urls");
        };
        assert_eq!(args.search.as_deref(), Some("rust"));
        assert_eq!(args.folder.as_deref(), Some("Dev"));
        assert_eq!(args.limit, Some(5));
    }

    #[test]
    fn stats_top_defaults_to_20() {
        let cli = Cli::parse_from(["marks", "stats"]);
        let Commands::Stats(args) = cli.command else {
            panic!("expected stats");
        };
        assert_eq!(args.top, 20);
    }

    #[test]
    fn dedup_subcommand_parses_all_flags() {
        let cli = Cli::parse_from([
            "marks",
            "dedup",
            "--threshold",
            "85",
            "--max-size",
            "4",
            "--block-by",
            "site",
            "--assign",
            "--limit",
            "3",
        ]);
        let Commands::Dedup(args) = cli.command else {
            panic!("expected dedup");
        };
        assert_eq!(args.threshold, Some(85));
        assert_eq!(args.max_size, Some(4));
        assert_eq!(args.block_by, Some(cmd::dedup::BlockByArg::Site));
        assert!(args.assign);
        assert_eq!(args.limit, Some(3));
    }

    #[test]
    fn dedup_threshold_above_100_is_rejected() {
        assert!(Cli::try_parse_from(["marks", "dedup", "--threshold", "101"]).is_err());
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["marks", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["marks", "urls"],
            vec!["marks", "folders"],
            vec!["marks", "stats"],
            vec!["marks", "dedup"],
            vec!["marks", "completions", "zsh"],
        ];
        for argv in subcommands {
            assert!(Cli::try_parse_from(argv.iter().copied()).is_ok(), "failed to parse {argv:?}");
        }
    }
}
