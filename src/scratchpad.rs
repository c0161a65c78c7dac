//! Orchestration: revalidate the cached identity against the live
//! tree, then toggle, reposition or launch.

use anyhow::Result;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::animation::{self, Slide};
use crate::error::Error;
use crate::geometry::{self, Anchor, Offset, Placement, Screen, SizeSpec, SlideEdge};
use crate::identity::{storage_key, IdentityStore};
use crate::ipc::{Compositor, StateProbe};
use crate::launch;

/// Per-invocation options, already validated by the CLI layer.
#[derive(Debug, Clone)]
pub struct Options {
    /// Exact command string; also the identity key source.
    pub command: String,
    /// What the window manager actually execs; differs from `command`
    /// when a terminal wrapper is requested.
    pub exec_command: String,
    pub size: SizeSpec,
    pub offset: Offset,
    pub anchor: Anchor,
    pub edge: Option<SlideEdge>,
    pub toggle: bool,
    pub screen: Option<String>,
    pub launch_timeout: Duration,
}

/// What the invocation did with the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Shown,
    Hidden,
}

pub struct Scratchpad<'a> {
    wm: &'a mut dyn Compositor,
    probe: &'a dyn StateProbe,
    store: &'a IdentityStore,
    options: &'a Options,
}

impl<'a> Scratchpad<'a> {
    pub fn new(
        wm: &'a mut dyn Compositor,
        probe: &'a dyn StateProbe,
        store: &'a IdentityStore,
        options: &'a Options,
    ) -> Self {
        Self {
            wm,
            probe,
            store,
            options,
        }
    }

    pub async fn run(&mut self) -> Result<Outcome> {
        let screen = self.wm.screen(self.options.screen.as_deref()).await?;
        let placement = geometry::resolve(
            &screen,
            self.options.size,
            self.options.offset,
            self.options.anchor,
        );
        let key = storage_key(&self.options.command);

        if let Some(window_id) = self.tracked_window(&key).await? {
            return self.toggle_existing(window_id, &placement, &screen).await;
        }

        let record = launch::launch(
            self.wm,
            self.store,
            &key,
            &self.options.exec_command,
            self.options.launch_timeout,
        )
        .await?;
        self.show(record.window_id, &placement, &screen).await?;
        Ok(Outcome::Shown)
    }

    /// Revalidate the cached identity against the live tree. Both a
    /// vanished window and a recycled window id (container mismatch)
    /// invalidate the cache and send us down the launch path.
    async fn tracked_window(&mut self, key: &str) -> Result<Option<u32>> {
        let Some(record) = self.store.load(key)? else {
            return Ok(None);
        };
        debug!("🔍 Last window id was {}", record.window_id);

        match self.wm.find_container(record.window_id).await? {
            Some(container_id) if container_id == record.container_id => {
                debug!("🪟 Window {} still exists", record.window_id);
                Ok(Some(record.window_id))
            }
            Some(container_id) => {
                warn!(
                    "⚠️  {}",
                    Error::StaleIdentity {
                        window_id: record.window_id,
                        reason: format!(
                            "container id changed from {} to {container_id}, window id reused?",
                            record.container_id
                        ),
                    }
                );
                self.store.delete(key)?;
                Ok(None)
            }
            None => {
                info!("🪟 Tracked window {} is gone, relaunching", record.window_id);
                self.store.delete(key)?;
                Ok(None)
            }
        }
    }

    async fn toggle_existing(
        &mut self,
        window_id: u32,
        placement: &Placement,
        screen: &Screen,
    ) -> Result<Outcome> {
        if self.options.toggle {
            let state = self.probe.wm_state(window_id)?;
            debug!("🔄 Toggle mode on, current state: {:?}", state);
            if state.mapped {
                self.hide(window_id, placement, screen).await?;
                return Ok(Outcome::Hidden);
            }
        }
        self.show(window_id, placement, screen).await?;
        Ok(Outcome::Shown)
    }

    /// Bring the window out of the scratchpad at the resolved geometry,
    /// sliding it in from the configured edge if one was requested.
    async fn show(
        &mut self,
        window_id: u32,
        placement: &Placement,
        screen: &Screen,
    ) -> Result<()> {
        let rect = placement.rect;
        let Some(edge) = self.options.edge else {
            debug!("🪟 Moving to scratchpad, showing and resizing");
            self.wm
                .run(&format!(
                    "[id=\"{window_id}\"] move to scratchpad;\
                     [id=\"{window_id}\"] scratchpad show;\
                     [id=\"{window_id}\"] move position {} px {} px;\
                     [id=\"{window_id}\"] resize set {} px {} px",
                    rect.x, rect.y, rect.width, rect.height
                ))
                .await?;
            return Ok(());
        };

        let slide = Slide::show(placement, screen, edge);
        let (start_x, start_y) = slide.start();
        self.wm
            .run(&format!(
                "[id=\"{window_id}\"] move to scratchpad;\
                 [id=\"{window_id}\"] scratchpad show;\
                 [id=\"{window_id}\"] move absolute position {start_x} px {start_y} px;\
                 [id=\"{window_id}\"] resize set {} px {} px",
                rect.width, rect.height
            ))
            .await?;
        debug!("🎬 Starting show animation from {:?}", edge);
        animation::run_slide(self.wm, window_id, slide).await
    }

    /// Park the window back in the scratchpad, sliding it out first if
    /// an edge was requested.
    async fn hide(
        &mut self,
        window_id: u32,
        placement: &Placement,
        screen: &Screen,
    ) -> Result<()> {
        if let Some(edge) = self.options.edge {
            debug!("🎬 Starting hide animation towards {:?}", edge);
            let slide = Slide::hide(placement, screen, edge);
            animation::run_slide(self.wm, window_id, slide).await?;
        }
        self.wm
            .run(&format!("[id=\"{window_id}\"] move to scratchpad"))
            .await
    }
}
