// gridstate CLI - replay recorded grid editing sessions headlessly

mod exit_codes;
mod script;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use gridstate_config::keybindings::load_user_keybindings;
use gridstate_config::{load_keybindings, ConfigError, Settings};
use gridstate_engine::Keymap;

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "gridstate")]
#[command(about = "Replay spreadsheet editing sessions against an in-memory grid")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a JSON event script and print the resulting grid as TSV
    #[command(after_help = "\
Script format:
  {
    \"rows\": 3, \"columns\": 3,
    \"data\": \"a\\tb\\nc\\td\",
    \"events\": [
      { \"type\": \"click\", \"cell\": \"A1\" },
      { \"type\": \"key\", \"key\": \"ArrowDown\", \"shift\": true },
      { \"type\": \"copy\" },
      { \"type\": \"paste\" }
    ]
  }

Event types: click, shiftClick, dragStart, hover, dragEnd, key, keyPress,
type, copy, cut, paste, setData")]
    Replay {
        /// Script file (JSON)
        script: PathBuf,

        /// Print a JSON summary of the final state instead of the grid
        #[arg(long)]
        state: bool,

        /// Settings file to use instead of the user's settings.json
        #[arg(long, env = "GRIDSTATE_CONFIG")]
        config: Option<PathBuf>,

        /// Keybinding overrides to use instead of the user's keybindings.json
        #[arg(long)]
        keybindings: Option<PathBuf>,
    },

    /// List the effective key bindings
    Keymap {
        /// Settings file to use instead of the user's settings.json
        #[arg(long, env = "GRIDSTATE_CONFIG")]
        config: Option<PathBuf>,

        /// Keybinding overrides to use instead of the user's keybindings.json
        #[arg(long)]
        keybindings: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  gridstate-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  gridstate-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    // Keep a subscriber that is already installed.
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Replay {
            script,
            state,
            config,
            keybindings,
        } => cmd_replay(script, state, config, keybindings),
        Commands::Keymap {
            config,
            keybindings,
        } => cmd_keymap(config, keybindings),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn error(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { .. } => CliError::io(err.to_string()),
            ConfigError::Parse { .. } => CliError::parse(err.to_string())
                .with_hint("config files are JSON; lines starting with // are ignored"),
        }
    }
}

// ============================================================================
// config
// ============================================================================

fn load_settings(config: Option<&Path>) -> Result<Settings, CliError> {
    match config {
        Some(path) => Ok(Settings::load_from(path)?),
        None => Ok(Settings::load()),
    }
}

fn load_keymap(settings: &Settings, keybindings: Option<&Path>) -> Result<Keymap, CliError> {
    if !settings.enable_overrides {
        log::info!("keyboard overrides disabled, using default bindings");
        return Ok(Keymap::default());
    }
    let overrides = match keybindings {
        Some(path) => load_keybindings(path)?,
        None => load_user_keybindings(),
    };
    log::debug!("applying {} keybinding override(s)", overrides.len());
    Ok(Keymap::default().with_overrides(&overrides))
}

// ============================================================================
// replay
// ============================================================================

fn cmd_replay(
    script_path: PathBuf,
    state: bool,
    config: Option<PathBuf>,
    keybindings: Option<PathBuf>,
) -> Result<(), CliError> {
    let contents = fs::read_to_string(&script_path)
        .map_err(|e| CliError::io(format!("{}: {}", script_path.display(), e)))?;
    let script = script::parse_script(&contents)?;

    let settings = load_settings(config.as_deref())?;
    let keymap = load_keymap(&settings, keybindings.as_deref())?;

    let outcome = script::run(&script, &settings, &keymap)?;
    log::info!(
        "replayed {} event(s), {} without effect",
        script.events.len(),
        outcome.summary.ignored
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if state {
        let json = serde_json::to_string_pretty(&outcome.summary)
            .map_err(|e| CliError::error(e.to_string()))?;
        writeln!(handle, "{}", json).map_err(|e| CliError::io(e.to_string()))?;
    } else {
        writeln!(handle, "{}", outcome.grid).map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

// ============================================================================
// keymap
// ============================================================================

fn cmd_keymap(config: Option<PathBuf>, keybindings: Option<PathBuf>) -> Result<(), CliError> {
    let settings = load_settings(config.as_deref())?;
    let keymap = load_keymap(&settings, keybindings.as_deref())?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for (context, key, command) in keymap.bindings() {
        writeln!(
            handle,
            "{:<8} {:<22} {}",
            context.to_string(),
            Keymap::describe(context, key),
            command
        )
        .map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}
