//! Standalone CLI tool for window listing, focus and show-state changes.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use winpilot_core::window::{ShowCommand, WindowHandle};

#[derive(Clone, Copy, ValueEnum)]
enum State {
    Minimize,
    Maximize,
    Restore,
    Hide,
    Show,
}

impl From<State> for ShowCommand {
    fn from(s: State) -> Self {
        match s {
            State::Minimize => ShowCommand::Minimize,
            State::Maximize => ShowCommand::Maximize,
            State::Restore => ShowCommand::Restore,
            State::Hide => ShowCommand::Hide,
            State::Show => ShowCommand::Show,
        }
    }
}

#[derive(Parser)]
#[command(name = "winpilot-windows", about = "List, focus and arrange top-level windows")]
struct Args {
    /// Enable debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List windows as JSON
    List {
        /// Include hidden and untitled windows
        #[arg(long)]
        all: bool,
    },
    /// Show the foreground window
    Active,
    /// Bring a window to the foreground by handle or title substring
    Focus {
        #[arg(long, conflicts_with = "title")]
        id: Option<isize>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Request a show-state change
    State {
        id: isize,
        #[arg(value_enum)]
        state: State,
    },
}

fn main() {
    let args = Args::parse();
    winpilot_cli::init_logging(args.verbose);
    let desktop = winpilot_cli::desktop_or_exit(args.config.as_deref());

    let response = match args.command {
        Command::List { all } => desktop.list_windows(all),
        Command::Active => desktop.get_active_window(),
        Command::Focus { id, title } => desktop.focus_window(id, title.as_deref()),
        Command::State { id, state } => desktop.window_state(WindowHandle(id), state.into()),
    };

    std::process::exit(winpilot_cli::emit(&response));
}
