//! WM_STATE probe over the X property channel.
//!
//! The scratchpad's shown/hidden decision reads WM_STATE straight from
//! the X server: state 0 is withdrawn (parked), 1 normal, 3 iconic.

use anyhow::{Context, Result};
use x11rb::protocol::xproto::{Atom, ConnectionExt};
use x11rb::rust_connection::RustConnection;

use super::{StateProbe, WmState};

const ICONIC: u32 = 3;

pub struct X11Probe {
    conn: RustConnection,
    wm_state: Atom,
}

impl X11Probe {
    pub fn connect() -> Result<Self> {
        let (conn, _screen) =
            x11rb::connect(None).context("failed to connect to the X display")?;
        let wm_state = conn
            .intern_atom(false, b"WM_STATE")
            .context("failed to send WM_STATE atom request")?
            .reply()
            .context("failed to intern the WM_STATE atom")?
            .atom;
        Ok(Self { conn, wm_state })
    }
}

impl StateProbe for X11Probe {
    fn wm_state(&self, window_id: u32) -> Result<WmState> {
        let reply = self
            .conn
            .get_property(false, window_id, self.wm_state, self.wm_state, 0, 2)
            .context("failed to send WM_STATE property request")?
            .reply()
            .with_context(|| format!("failed to read WM_STATE of window {window_id}"))?;

        // A window without the property (or with a different type) has
        // never been mapped or is withdrawn.
        let state = reply
            .value32()
            .and_then(|mut values| values.next())
            .unwrap_or(0);

        Ok(WmState {
            mapped: state != 0,
            iconic: state == ICONIC,
        })
    }
}
