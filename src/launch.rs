//! Spawn → await → correlate → persist.
//!
//! The window manager execs the command, we block (bounded) for the
//! first window-new notification, float the new container and persist
//! its ids. Anything launched afterwards is deliberately ignored.

use anyhow::Result;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::error::Error;
use crate::identity::{IdentityRecord, IdentityStore};
use crate::ipc::Compositor;

/// Bound on the wait for the launched window to appear.
pub const LAUNCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Launch `command` and return the identity of the window it produced,
/// already persisted under `key`.
///
/// When the event cannot be correlated (no platform window id, no
/// container id) any identity file under `key` is removed and the
/// invocation fails; the caller exits non-zero with no window shown.
pub async fn launch(
    wm: &mut dyn Compositor,
    store: &IdentityStore,
    key: &str,
    command: &str,
    wait: Duration,
) -> Result<IdentityRecord> {
    wm.exec(command).await?;
    let launched = wm.await_new_window(wait).await?;

    let correlation_failed = |reason: String| {
        warn!("⚠️  {reason}");
        if let Err(e) = store.delete(key) {
            warn!("⚠️  Could not remove stale identity file: {e:#}");
        }
        Error::Correlation(reason)
    };

    let window_id = match launched.window_id {
        Some(id) if id != 0 => id,
        _ => {
            return Err(correlation_failed(
                "window-new event carried no platform window id".to_string(),
            )
            .into())
        }
    };
    if launched.container_id == 0 {
        return Err(correlation_failed(format!(
            "no container id found for window {window_id}"
        ))
        .into());
    }

    // Float it so absolute positioning works.
    wm.run(&format!(
        "[con_id=\"{}\"] floating enable",
        launched.container_id
    ))
    .await?;

    let record = IdentityRecord {
        window_id,
        container_id: launched.container_id,
    };
    store.save(key, record)?;
    info!(
        "✅ Correlated '{}' with window {} (container {})",
        command, record.window_id, record.container_id
    );
    Ok(record)
}
