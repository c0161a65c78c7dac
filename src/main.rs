use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

use slidepad::geometry::{Anchor, Offset, SizeSpec, SlideEdge};
use slidepad::identity::IdentityStore;
use slidepad::ipc::{I3Client, X11Probe};
use slidepad::launch::LAUNCH_TIMEOUT;
use slidepad::scratchpad::{Options, Outcome, Scratchpad};

#[derive(Parser)]
#[command(name = "slidepad")]
#[command(
    about = "Runs a command in a positioned i3/sway scratchpad window, \
             reusing the same window when invoked again with the same command"
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Anchor to position from: top-left .. bottom-right, or tl .. br
    #[arg(short, long)]
    anchor: Option<String>,

    /// Window size as WIDTHxHEIGHT, pixels or percentages (e.g. 50%x50%)
    #[arg(short = 'd', long)]
    size: Option<String>,

    /// Pixel offset X,Y applied after anchoring; may be negative
    #[arg(short, long)]
    pos: Option<String>,

    /// Output to place the window on; defaults to the focused output
    #[arg(short, long)]
    screen: Option<String>,

    /// Slide the window in/out across this edge: top, bottom, left, right
    #[arg(short = 'm', long = "move")]
    edge: Option<String>,

    /// Toggle between shown and hidden
    #[arg(short, long)]
    toggle: bool,

    /// Wrap the command in a terminal window, for command-line apps
    #[arg(short = 'u', long)]
    terminal: bool,

    /// Extra options to pass to the wrapper terminal
    #[arg(short, long)]
    opts: Option<String>,

    /// Keep the wrapper terminal open until a key is pressed; useful
    /// for commands that return immediately
    #[arg(short, long)]
    wait: bool,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Command to run
    command: String,
}

/// Pure string wrapping; the terminal is what actually owns the
/// spawned process.
fn wrap_in_terminal(command: &str, opts: Option<&str>, wait: bool) -> String {
    let inner = if wait {
        format!("{command}; printf '\\n[press enter to close]'; read -r _")
    } else {
        command.to_string()
    };
    match opts {
        Some(opts) => format!("urxvt {opts} -e sh -c '{inner}'"),
        None => format!("urxvt -e sh -c '{inner}'"),
    }
}

fn options_from(cli: &Cli) -> Result<Options> {
    let anchor = match cli.anchor.as_deref() {
        Some(spec) => Anchor::parse(spec)?,
        None => Anchor::default(),
    };
    let size = match cli.size.as_deref() {
        Some(spec) => SizeSpec::parse(spec)?,
        None => SizeSpec::default(),
    };
    let offset = match cli.pos.as_deref() {
        Some(spec) => Offset::parse(spec)?,
        None => Offset::default(),
    };
    let edge = cli.edge.as_deref().map(SlideEdge::parse).transpose()?;

    let exec_command = if cli.terminal {
        wrap_in_terminal(&cli.command, cli.opts.as_deref(), cli.wait)
    } else {
        cli.command.clone()
    };

    Ok(Options {
        command: cli.command.clone(),
        exec_command,
        size,
        offset,
        anchor,
        edge,
        toggle: cli.toggle,
        screen: cli.screen.clone(),
        launch_timeout: LAUNCH_TIMEOUT,
    })
}

async fn run(cli: &Cli) -> Result<Outcome> {
    // Validate everything user-provided before touching the sockets.
    let options = options_from(cli)?;
    debug!("⚙️  Options: {:?}", options);

    let mut wm = I3Client::connect()?;
    let probe = X11Probe::connect()?;
    let store = IdentityStore::new();

    Scratchpad::new(&mut wm, &probe, &store, &options).run().await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(format!("slidepad={log_level}"))
        .with_target(false)
        .init();

    match run(&cli).await {
        Ok(Outcome::Shown) => println!("now shown"),
        Ok(Outcome::Hidden) => println!("now hidden"),
        Err(e) => {
            error!("❌ {e:#}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_wrapper_shapes() {
        assert_eq!(wrap_in_terminal("cal", None, false), "urxvt -e sh -c 'cal'");
        assert_eq!(
            wrap_in_terminal("cal", Some("-bg black"), false),
            "urxvt -bg black -e sh -c 'cal'"
        );
        assert!(wrap_in_terminal("cal", None, true).contains("read -r _"));
    }
}
