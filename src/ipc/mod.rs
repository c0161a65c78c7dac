use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use swayipc::{Connection, Event, EventType, Node, WindowChange};
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use crate::geometry::{Rect, Screen};

pub mod x11;

pub use x11::X11Probe;

/// Payload of a window-new notification: the ids needed to correlate
/// the freshly created window with the command that spawned it. Either
/// id can be missing in the event, which is the caller's problem.
#[derive(Debug, Clone, Copy)]
pub struct LaunchedWindow {
    pub window_id: Option<u32>,
    pub container_id: i64,
}

/// ICCCM WM_STATE of a window, read from the display server directly
/// since the window manager's own view may lag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmState {
    /// `false` means withdrawn: the window is parked, not on screen.
    pub mapped: bool,
    pub iconic: bool,
}

/// Read access to a window's manage-state property.
pub trait StateProbe {
    fn wm_state(&self, window_id: u32) -> Result<WmState>;
}

/// The window-manager control channel, as much of it as the scratchpad
/// flow needs. Implemented over i3 IPC; tests substitute a simulation.
#[async_trait]
pub trait Compositor: Send {
    /// The output to place the window on: the named one, or the output
    /// of the currently focused workspace.
    async fn screen(&mut self, preferred: Option<&str>) -> Result<Screen>;

    /// Container id of the tree node owning this platform window id,
    /// `None` if the window is gone. Absence is a signal, not an error.
    async fn find_container(&mut self, window_id: u32) -> Result<Option<i64>>;

    /// Run a raw command payload and fail on any rejected sub-command.
    async fn run(&mut self, payload: &str) -> Result<()>;

    /// Spawn the user's command through the window manager.
    async fn exec(&mut self, command: &str) -> Result<()>;

    /// Block until the first window-new notification arrives, bounded
    /// by `wait`. Single shot: the subscription ends with the first
    /// event so later unrelated windows are never picked up.
    async fn await_new_window(&mut self, wait: Duration) -> Result<LaunchedWindow>;
}

/// i3/sway client over the socket discovered from the environment.
pub struct I3Client {
    conn: Connection,
}

impl I3Client {
    pub fn connect() -> Result<Self> {
        debug!("🔌 Connecting to the i3 IPC socket");
        let conn = Connection::new().context("failed to connect to the i3/sway IPC socket")?;
        Ok(Self { conn })
    }
}

// X11 ids use the full u32 range; the tree stores them widened to i64.
fn window_matches(window: Option<i64>, window_id: u32) -> bool {
    window == Some(i64::from(window_id))
}

fn find_by_window(node: &Node, window_id: u32) -> Option<i64> {
    if window_matches(node.window, window_id) {
        return Some(node.id);
    }
    node.nodes
        .iter()
        .chain(node.floating_nodes.iter())
        .find_map(|child| find_by_window(child, window_id))
}

#[async_trait]
impl Compositor for I3Client {
    async fn screen(&mut self, preferred: Option<&str>) -> Result<Screen> {
        let name = match preferred {
            Some(name) => name.to_string(),
            None => self
                .conn
                .get_workspaces()
                .context("failed to list workspaces")?
                .into_iter()
                .find(|workspace| workspace.focused)
                .map(|workspace| workspace.output)
                .ok_or_else(|| anyhow!("no focused workspace reported"))?,
        };

        let output = self
            .conn
            .get_outputs()
            .context("failed to list outputs")?
            .into_iter()
            .find(|output| output.name == name)
            .ok_or_else(|| anyhow!("output '{name}' not found"))?;

        debug!("🖥️  Using output {} ({:?})", output.name, output.rect);
        Ok(Screen {
            name: output.name,
            rect: Rect {
                x: output.rect.x,
                y: output.rect.y,
                width: output.rect.width,
                height: output.rect.height,
            },
        })
    }

    async fn find_container(&mut self, window_id: u32) -> Result<Option<i64>> {
        let tree = self.conn.get_tree().context("failed to query the tree")?;
        Ok(find_by_window(&tree, window_id))
    }

    async fn run(&mut self, payload: &str) -> Result<()> {
        debug!("📤 Running command: {}", payload);
        for outcome in self
            .conn
            .run_command(payload)
            .with_context(|| format!("failed to send command '{payload}'"))?
        {
            outcome.with_context(|| format!("command rejected: '{payload}'"))?;
        }
        Ok(())
    }

    async fn exec(&mut self, command: &str) -> Result<()> {
        info!("🚀 Spawning application: {}", command);
        self.run(&format!("exec --no-startup-id \"{command}\"")).await
    }

    async fn await_new_window(&mut self, wait: Duration) -> Result<LaunchedWindow> {
        debug!("📡 Waiting up to {:?} for the new window", wait);

        // The subscription gets its own connection so the request
        // channel stays usable for the commands that follow.
        let listener = tokio::task::spawn_blocking(move || -> Result<LaunchedWindow> {
            let stream = Connection::new()
                .context("failed to open the event subscription connection")?
                .subscribe([EventType::Window])
                .context("failed to subscribe to window events")?;

            for event in stream {
                if let Event::Window(ev) = event.context("window event stream error")? {
                    if matches!(ev.change, WindowChange::New) {
                        return Ok(LaunchedWindow {
                            window_id: ev.container.window.map(|id| id as u32),
                            container_id: ev.container.id,
                        });
                    }
                }
            }
            Err(anyhow!("window event stream ended unexpectedly"))
        });

        timeout(wait, listener)
            .await
            .map_err(|_| anyhow!("no window appeared within {wait:?}"))?
            .context("window wait task failed")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_id_comparison_covers_full_x11_range() {
        // Ids above i32::MAX are real on X11; a narrowing cast would
        // never match them.
        assert!(window_matches(Some(0x8000_0001), 0x8000_0001));
        assert!(window_matches(Some(42), 42));
        assert!(!window_matches(Some(42), 43));
        assert!(!window_matches(None, 42));
    }
}
