//! Eased slide transitions across a screen edge.
//!
//! One axis moves per slide. The increment is seeded at distance/20 and
//! re-eased every frame with the 1.25/0.8 factors, which gives a short
//! accelerating run that overshoots slightly and is then snapped to the
//! exact target with a final move.

use anyhow::Result;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::geometry::{Placement, Screen, SlideEdge};
use crate::ipc::Compositor;

/// Delay between emitted move commands.
pub const FRAME_DELAY: Duration = Duration::from_millis(20);

/// Nominal frame count; seeds the per-frame increment.
pub const FRAME_COUNT: i32 = 20;

/// Hard bound on emitted frames. The geometric growth of the increment
/// converges far earlier for any sane travel distance.
pub const MAX_FRAMES: u32 = 1000;

const ACCELERATE: f64 = 1.25;
const DECELERATE: f64 = 0.8;

/// Absolute-move command for one frame.
fn move_absolute(window_id: u32, x: i32, y: i32) -> String {
    format!("[id=\"{window_id}\"] move absolute position {x} px {y} px")
}

/// Off-screen coordinate for the moving axis of `edge`: one pixel of
/// the window is left on screen so the compositor keeps it mapped.
fn park_position(placement: &Placement, screen: &Screen, edge: SlideEdge) -> (i32, i32) {
    let rect = placement.rect;
    match edge {
        SlideEdge::Top => (rect.x, placement.screen_y - rect.height + 1),
        SlideEdge::Bottom => (rect.x, placement.screen_y + screen.rect.height - 1),
        SlideEdge::Left => (placement.screen_x - rect.width + 1, rect.y),
        SlideEdge::Right => (placement.screen_x + screen.rect.width - 1, rect.y),
    }
}

/// One in-flight slide: the mutable animation cursor, kept separate
/// from the immutable target `Placement` callers hold on to.
#[derive(Debug, Clone)]
pub struct Slide {
    x: f64,
    y: f64,
    start_x: f64,
    start_y: f64,
    end_x: f64,
    end_y: f64,
    inc_x: f64,
    inc_y: f64,
}

impl Slide {
    fn between(start: (i32, i32), end: (i32, i32)) -> Self {
        let (start_x, start_y) = (f64::from(start.0), f64::from(start.1));
        let (end_x, end_y) = (f64::from(end.0), f64::from(end.1));
        Self {
            x: start_x,
            y: start_y,
            start_x,
            start_y,
            end_x,
            end_y,
            inc_x: (end_x - start_x) / f64::from(FRAME_COUNT),
            inc_y: (end_y - start_y) / f64::from(FRAME_COUNT),
        }
    }

    /// Slide in: from the parked coordinate to the target position.
    pub fn show(placement: &Placement, screen: &Screen, edge: SlideEdge) -> Self {
        let park = park_position(placement, screen, edge);
        Self::between(park, (placement.rect.x, placement.rect.y))
    }

    /// Slide out: from the current (target) position to the park
    /// coordinate.
    pub fn hide(placement: &Placement, screen: &Screen, edge: SlideEdge) -> Self {
        let park = park_position(placement, screen, edge);
        Self::between((placement.rect.x, placement.rect.y), park)
    }

    /// Where the window starts, useful for pre-positioning before the
    /// first frame is emitted.
    pub fn start(&self) -> (i32, i32) {
        (self.start_x as i32, self.start_y as i32)
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }

    pub fn end(&self) -> (i32, i32) {
        (self.end_x as i32, self.end_y as i32)
    }

    /// True while any moving axis has not reached or passed its target
    /// for the configured increment sign.
    pub fn active(&self) -> bool {
        (self.inc_x < 0.0 && self.x > self.end_x)
            || (self.inc_x > 0.0 && self.x < self.end_x)
            || (self.inc_y < 0.0 && self.y > self.end_y)
            || (self.inc_y > 0.0 && self.y < self.end_y)
    }

    /// Advance the cursor by one frame and re-ease both increments.
    pub fn step(&mut self) {
        self.x += self.inc_x;
        self.y += self.inc_y;
        self.inc_x = ease(self.x, self.start_x, self.inc_x);
        self.inc_y = ease(self.y, self.start_y, self.inc_y);
    }
}

fn ease(position: f64, start: f64, inc: f64) -> f64 {
    // Past the start and still moving away from it: grow; otherwise
    // shrink (which also pins a zero increment at zero).
    if (position < start && inc <= 0.0) || (position > start && inc >= 0.0) {
        inc * ACCELERATE
    } else {
        inc * DECELERATE
    }
}

/// Emit the slide frame by frame, then snap to the exact end position
/// to compensate for any overshoot of the eased stepping.
pub async fn run_slide(wm: &mut dyn Compositor, window_id: u32, mut slide: Slide) -> Result<()> {
    let mut frames = 0u32;
    while slide.active() && frames < MAX_FRAMES {
        let (x, y) = slide.position();
        debug!("🎞️  Frame {}: moving window {} to [{} {}]", frames, window_id, x, y);
        wm.run(&move_absolute(window_id, x, y)).await?;
        slide.step();
        frames += 1;
        sleep(FRAME_DELAY).await;
    }

    let (x, y) = slide.end();
    wm.run(&move_absolute(window_id, x, y)).await?;
    info!("✅ Slide finished after {} frames at [{} {}]", frames, x, y);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn placement() -> Placement {
        Placement {
            rect: Rect {
                x: 760,
                y: 390,
                width: 400,
                height: 300,
            },
            screen_x: 0,
            screen_y: 0,
        }
    }

    fn screen() -> Screen {
        Screen {
            name: "eDP-1".to_string(),
            rect: Rect {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            },
        }
    }

    #[test]
    fn park_positions_per_edge() {
        let p = placement();
        let s = screen();
        assert_eq!(park_position(&p, &s, SlideEdge::Top), (760, -299));
        assert_eq!(park_position(&p, &s, SlideEdge::Bottom), (760, 1079));
        assert_eq!(park_position(&p, &s, SlideEdge::Left), (-399, 390));
        assert_eq!(park_position(&p, &s, SlideEdge::Right), (1919, 390));
    }

    #[test]
    fn slide_terminates_and_reports_exact_target() {
        // start 0, target 500: increment seeds at 25 and accelerates.
        let mut slide = Slide::between((0, 0), (500, 0));
        let mut frames = 0u32;
        let mut last = slide.position();
        while slide.active() && frames < MAX_FRAMES {
            last = slide.position();
            slide.step();
            frames += 1;
        }
        assert!(frames < MAX_FRAMES, "slide did not converge");
        assert!(frames > 1, "slide ended before moving");
        assert!(last.0 < 500, "last intermediate frame should undershoot");
        assert_eq!(slide.end(), (500, 0));
    }

    #[test]
    fn only_one_axis_moves() {
        let mut slide = Slide::show(&placement(), &screen(), SlideEdge::Bottom);
        assert_eq!(slide.start(), (760, 1079));
        for _ in 0..MAX_FRAMES {
            if !slide.active() {
                break;
            }
            slide.step();
            assert_eq!(slide.position().0, 760);
        }
        assert!(!slide.active());
        assert_eq!(slide.end(), (760, 390));
    }

    #[test]
    fn hide_travels_from_target_to_park() {
        let slide = Slide::hide(&placement(), &screen(), SlideEdge::Right);
        assert_eq!(slide.start(), (760, 390));
        assert_eq!(slide.end(), (1919, 390));
    }
}
