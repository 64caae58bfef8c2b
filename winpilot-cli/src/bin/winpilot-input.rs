//! Standalone CLI tool for sending input events.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "winpilot-input", about = "Send keyboard/mouse input via Win32 SendInput")]
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
    /// Type Unicode text
    Text {
        /// The text to type
        text: String,
    },
    /// Click at screen coordinates
    Click {
        x: i32,
        y: i32,
        /// Button: left, right, middle
        #[arg(short, long, default_value = "left")]
        button: String,
        /// Number of clicks
        #[arg(short = 'n', long, default_value_t = 1)]
        clicks: u32,
    },
    /// Move cursor to coordinates
    Move { x: i32, y: i32 },
    /// Press-move-release drag
    Drag {
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        #[arg(short, long, default_value = "left")]
        button: String,
    },
    /// Scroll the wheel (up, down, left, right)
    Scroll {
        #[arg(default_value = "down")]
        direction: String,
        /// Wheel notches
        #[arg(short, long, default_value_t = 3)]
        amount: i32,
        #[arg(long)]
        x: Option<i32>,
        #[arg(long)]
        y: Option<i32>,
    },
    /// Press a named key, e.g. `enter` or `f5`
    Key {
        key: String,
        /// Modifiers held during the press (ctrl, alt, shift, win)
        #[arg(short, long, value_delimiter = ',')]
        modifiers: Vec<String>,
    },
    /// Send a combo such as `ctrl+shift+s`
    Combo { combo: String },
    /// Print the cursor position
    Cursor,
}

fn main() {
    let args = Args::parse();
    winpilot_cli::init_logging(args.verbose);
    let desktop = winpilot_cli::desktop_or_exit(args.config.as_deref());

    let response = match args.command {
        Command::Text { text } => desktop.type_text(&text),
        Command::Click {
            x,
            y,
            button,
            clicks,
        } => desktop.mouse_click(x, y, Some(&button), clicks),
        Command::Move { x, y } => desktop.mouse_move(x, y),
        Command::Drag {
            start_x,
            start_y,
            end_x,
            end_y,
            button,
        } => desktop.mouse_drag((start_x, start_y), (end_x, end_y), Some(&button)),
        Command::Scroll {
            direction,
            amount,
            x,
            y,
        } => desktop.scroll(x, y, Some(&direction), amount),
        Command::Key { key, modifiers } => desktop.press_key(&key, &modifiers),
        Command::Combo { combo } => desktop.key_combo(&combo),
        Command::Cursor => desktop.cursor_position(),
    };

    std::process::exit(winpilot_cli::emit(&response));
}
