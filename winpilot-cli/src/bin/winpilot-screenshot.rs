//! Standalone CLI tool for capturing screenshots.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use winpilot_core::tools::{CaptureTarget, ScreenshotRequest};

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Screen,
    ActiveWindow,
    Window,
}

impl From<Target> for CaptureTarget {
    fn from(t: Target) -> Self {
        match t {
            Target::Screen => CaptureTarget::Screen,
            Target::ActiveWindow => CaptureTarget::ActiveWindow,
            Target::Window => CaptureTarget::Window,
        }
    }
}

#[derive(Parser)]
#[command(name = "winpilot-screenshot", about = "Capture a display or window to PNG via GDI")]
struct Args {
    /// Output file; `.png` is appended if missing.  Timestamped when omitted.
    #[arg(short, long)]
    output: Option<String>,

    /// Display index (enumeration order)
    #[arg(long, default_value_t = 0)]
    monitor: usize,

    #[arg(short, long, value_enum, default_value_t = Target::Screen)]
    target: Target,

    /// Window handle, for `--target window`
    #[arg(long)]
    window_id: Option<isize>,

    /// Window title substring, for `--target window`
    #[arg(long)]
    window_name: Option<String>,

    /// List displays instead of capturing
    #[arg(long)]
    list_displays: bool,

    /// Enable debug logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Engine config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    winpilot_cli::init_logging(args.verbose);
    let desktop = winpilot_cli::desktop_or_exit(args.config.as_deref());

    let response = if args.list_displays {
        desktop.list_displays()
    } else {
        desktop.take_screenshot(&ScreenshotRequest {
            filename: args.output,
            screen_id: args.monitor,
            target: args.target.into(),
            window_id: args.window_id,
            window_name: args.window_name,
        })
    };

    std::process::exit(winpilot_cli::emit(&response));
}
