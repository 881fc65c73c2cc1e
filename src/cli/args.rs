//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::task::Task;

/// Default config file name, searched upward from cwd.
pub const DEFAULT_CONFIG: &str = "assetflow.toml";

/// Static site asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (optional; built-in defaults apply without it)
    #[arg(short = 'C', long, global = true, default_value = DEFAULT_CONFIG, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Source root (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Output root (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands (default: dev)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build once, serve the output and rebuild on change
    #[command(visible_alias = "d")]
    Dev {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for auto-rebuild
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,

        /// Serve without watching or live reload
        #[arg(long, conflicts_with = "watch")]
        no_watch: bool,
    },

    /// Minify stylesheets and scripts with source maps
    #[command(visible_alias = "p")]
    Prod,

    /// Run individual tasks one after another
    #[command(visible_alias = "r")]
    Run {
        /// Task names, in execution order
        #[arg(required = true, value_enum)]
        tasks: Vec<Task>,
    },

    /// List available tasks
    #[command(visible_alias = "t")]
    Tasks,
}

impl Cli {
    /// The command to run; a bare invocation means `dev`.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Dev {
            interface: None,
            port: None,
            watch: None,
            no_watch: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_invocation_is_dev() {
        let cli = Cli::try_parse_from(["assetflow"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(cli.command(), Commands::Dev { watch: None, .. }));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG));
    }

    #[test]
    fn test_dev_options() {
        let cli = Cli::try_parse_from(["assetflow", "dev", "-p", "8080", "--watch", "false"]).unwrap();
        let Some(Commands::Dev { port, watch, .. }) = cli.command else {
            panic!("expected dev");
        };
        assert_eq!(port, Some(8080));
        assert_eq!(watch, Some(false));
    }

    #[test]
    fn test_dev_no_watch() {
        let cli = Cli::try_parse_from(["assetflow", "dev", "--no-watch"]).unwrap();
        assert!(matches!(cli.command(), Commands::Dev { no_watch: true, .. }));
        assert!(Cli::try_parse_from(["assetflow", "dev", "--no-watch", "-w"]).is_err());
    }

    #[test]
    fn test_run_parses_task_names() {
        let cli = Cli::try_parse_from(["assetflow", "run", "styles", "minify-scripts"]).unwrap();
        let Some(Commands::Run { tasks }) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(tasks, vec![Task::Styles, Task::MinifyScripts]);
    }

    #[test]
    fn test_run_rejects_unknown_task() {
        assert!(Cli::try_parse_from(["assetflow", "run", "deploy"]).is_err());
        assert!(Cli::try_parse_from(["assetflow", "run"]).is_err());
    }

    #[test]
    fn test_global_paths_after_subcommand() {
        let cli = Cli::try_parse_from(["assetflow", "prod", "--output", "public", "-v"]).unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("public")));
        assert!(cli.verbose);
    }
}
