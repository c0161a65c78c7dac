use tracing::debug;

use crate::error::Error;

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// An output as reported by the window manager. Never moves; placement
/// math reads it, nothing writes it.
#[derive(Debug, Clone)]
pub struct Screen {
    pub name: String,
    pub rect: Rect,
}

/// Resolved target geometry for the scratchpad window: the absolute
/// rectangle it should occupy plus the owning screen's origin. The
/// origin is needed later for off-screen parking coordinates. This
/// value is immutable; the animation engine keeps its own cursor.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub rect: Rect,
    pub screen_x: i32,
    pub screen_y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAnchor {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

/// Reference point for placement, `vertical-horizontal` as on the CLI
/// (`bottom-right`, `br`). Default is center-center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub horizontal: HorizontalAnchor,
    pub vertical: VerticalAnchor,
}

impl Default for Anchor {
    fn default() -> Self {
        Self {
            horizontal: HorizontalAnchor::Center,
            vertical: VerticalAnchor::Center,
        }
    }
}

impl Anchor {
    /// Parse `top-left` style names or their `tl` style shorthands.
    pub fn parse(spec: &str) -> Result<Self, Error> {
        let (vertical, horizontal) = match spec.split_once('-') {
            Some((v, h)) => (v, h),
            None if spec.len() == 2 && spec.is_ascii() => (&spec[..1], &spec[1..]),
            None => {
                return Err(Error::configuration(
                    "anchor",
                    spec,
                    "expected VERTICAL-HORIZONTAL, e.g. bottom-right or br",
                ))
            }
        };

        let vertical = match vertical {
            "top" | "t" => VerticalAnchor::Top,
            "center" | "c" => VerticalAnchor::Center,
            "bottom" | "b" => VerticalAnchor::Bottom,
            other => {
                return Err(Error::configuration(
                    "anchor",
                    spec,
                    format!("unknown vertical axis '{other}'"),
                ))
            }
        };
        let horizontal = match horizontal {
            "left" | "l" => HorizontalAnchor::Left,
            "center" | "c" => HorizontalAnchor::Center,
            "right" | "r" => HorizontalAnchor::Right,
            other => {
                return Err(Error::configuration(
                    "anchor",
                    spec,
                    format!("unknown horizontal axis '{other}'"),
                ))
            }
        };

        Ok(Self {
            horizontal,
            vertical,
        })
    }
}

/// Screen edge a slide animation travels across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl SlideEdge {
    pub fn parse(spec: &str) -> Result<Self, Error> {
        match spec {
            "top" | "t" => Ok(Self::Top),
            "bottom" | "b" => Ok(Self::Bottom),
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            _ => Err(Error::configuration(
                "edge",
                spec,
                "expected top, bottom, left or right",
            )),
        }
    }
}

/// One axis of a size spec: absolute pixels or a percentage of the
/// screen dimension, resolved independently per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AxisSpec {
    Pixels(i32),
    Percent(f64),
}

impl AxisSpec {
    fn parse(token: &str, spec: &str) -> Result<Self, Error> {
        if let Some(percent) = token.strip_suffix('%') {
            percent.trim().parse().map(Self::Percent).map_err(|_| {
                Error::configuration("size", spec, format!("bad percentage '{token}'"))
            })
        } else {
            token.trim().parse().map(Self::Pixels).map_err(|_| {
                Error::configuration("size", spec, format!("bad pixel value '{token}'"))
            })
        }
    }

    fn resolve(self, screen_extent: i32) -> i32 {
        match self {
            Self::Pixels(px) => px,
            Self::Percent(percent) => (f64::from(screen_extent) * percent / 100.0) as i32,
        }
    }
}

/// `WIDTHxHEIGHT` window size, validated before any IPC happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeSpec {
    width: AxisSpec,
    height: AxisSpec,
}

impl Default for SizeSpec {
    fn default() -> Self {
        Self {
            width: AxisSpec::Percent(50.0),
            height: AxisSpec::Percent(50.0),
        }
    }
}

impl SizeSpec {
    pub fn parse(spec: &str) -> Result<Self, Error> {
        let (w, h) = spec
            .split_once('x')
            .ok_or_else(|| Error::configuration("size", spec, "expected WIDTHxHEIGHT"))?;
        Ok(Self {
            width: AxisSpec::parse(w, spec)?,
            height: AxisSpec::parse(h, spec)?,
        })
    }
}

/// `X,Y` pixel offset added after anchoring; either value may be
/// negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub fn parse(spec: &str) -> Result<Self, Error> {
        let (x, y) = spec
            .split_once(',')
            .ok_or_else(|| Error::configuration("position", spec, "expected X,Y"))?;
        let parse = |token: &str| {
            token.trim().parse::<i32>().map_err(|_| {
                Error::configuration("position", spec, format!("bad offset '{token}'"))
            })
        };
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
        })
    }
}

/// Compute the absolute target rectangle for the window.
///
/// The anchor point of the screen and of the window are aligned, then
/// the position offset is added. Sizes larger than the screen may push
/// coordinates out of bounds; the window manager clips, we don't.
pub fn resolve(screen: &Screen, size: SizeSpec, offset: Offset, anchor: Anchor) -> Placement {
    let width = size.width.resolve(screen.rect.width);
    let height = size.height.resolve(screen.rect.height);

    let x = offset.x
        + screen.rect.x
        + match anchor.horizontal {
            HorizontalAnchor::Left => 0,
            HorizontalAnchor::Center => ((screen.rect.width - width) as f64 / 2.0) as i32,
            HorizontalAnchor::Right => screen.rect.width - width,
        };
    let y = offset.y
        + screen.rect.y
        + match anchor.vertical {
            VerticalAnchor::Top => 0,
            VerticalAnchor::Center => ((screen.rect.height - height) as f64 / 2.0) as i32,
            VerticalAnchor::Bottom => screen.rect.height - height,
        };

    debug!(
        "📐 Resolved placement: x={} y={} w={} h={} on output {}",
        x, y, width, height, screen.name
    );
    Placement {
        rect: Rect {
            x,
            y,
            width,
            height,
        },
        screen_x: screen.rect.x,
        screen_y: screen.rect.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Screen {
        Screen {
            name: "HDMI-1".to_string(),
            rect: Rect {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            },
        }
    }

    fn place(anchor: &str) -> Rect {
        resolve(
            &screen(),
            SizeSpec::parse("400x300").unwrap(),
            Offset::default(),
            Anchor::parse(anchor).unwrap(),
        )
        .rect
    }

    #[test]
    fn all_nine_anchors() {
        let cases = [
            ("top-left", 0, 0),
            ("top-center", 760, 0),
            ("top-right", 1520, 0),
            ("center-left", 0, 390),
            ("center-center", 760, 390),
            ("center-right", 1520, 390),
            ("bottom-left", 0, 780),
            ("bottom-center", 760, 780),
            ("bottom-right", 1520, 780),
        ];
        for (anchor, x, y) in cases {
            let rect = place(anchor);
            assert_eq!((rect.x, rect.y), (x, y), "anchor {anchor}");
            assert_eq!((rect.width, rect.height), (400, 300));
        }
    }

    #[test]
    fn short_anchor_spellings() {
        assert_eq!(
            Anchor::parse("br").unwrap(),
            Anchor::parse("bottom-right").unwrap()
        );
        assert_eq!(
            Anchor::parse("tc").unwrap(),
            Anchor::parse("top-center").unwrap()
        );
        assert_eq!(Anchor::parse("cc").unwrap(), Anchor::default());
    }

    #[test]
    fn percentage_size() {
        let placement = resolve(
            &screen(),
            SizeSpec::parse("50%x50%").unwrap(),
            Offset::default(),
            Anchor::default(),
        );
        assert_eq!(placement.rect.width, 960);
        assert_eq!(placement.rect.height, 540);
    }

    #[test]
    fn default_size_is_half_screen() {
        let placement = resolve(
            &screen(),
            SizeSpec::default(),
            Offset::default(),
            Anchor::default(),
        );
        assert_eq!((placement.rect.width, placement.rect.height), (960, 540));
    }

    #[test]
    fn position_offset_applies_after_anchoring() {
        let placement = resolve(
            &screen(),
            SizeSpec::parse("200x200").unwrap(),
            Offset::parse("0,-32").unwrap(),
            Anchor::parse("br").unwrap(),
        );
        assert_eq!((placement.rect.x, placement.rect.y), (1720, 848));
    }

    #[test]
    fn screen_origin_shifts_placement() {
        let side = Screen {
            name: "DP-2".to_string(),
            rect: Rect {
                x: 1920,
                y: 200,
                width: 1280,
                height: 1024,
            },
        };
        let placement = resolve(
            &side,
            SizeSpec::parse("400x300").unwrap(),
            Offset::default(),
            Anchor::parse("tl").unwrap(),
        );
        assert_eq!((placement.rect.x, placement.rect.y), (1920, 200));
        assert_eq!((placement.screen_x, placement.screen_y), (1920, 200));
    }

    #[test]
    fn oversized_window_is_not_clamped() {
        let placement = resolve(
            &screen(),
            SizeSpec::parse("2400x1200").unwrap(),
            Offset::default(),
            Anchor::parse("cc").unwrap(),
        );
        assert_eq!((placement.rect.x, placement.rect.y), (-240, -60));
    }

    #[test]
    fn malformed_specs_are_configuration_errors() {
        assert!(SizeSpec::parse("400").is_err());
        assert!(SizeSpec::parse("axb").is_err());
        assert!(Offset::parse("10;20").is_err());
        assert!(Anchor::parse("middle-left").is_err());
        assert!(SlideEdge::parse("diagonal").is_err());
    }
}
