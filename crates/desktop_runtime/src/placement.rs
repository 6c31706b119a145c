//! Initial geometry for newly launched windows.

use desktop_app_contract::ApplicationDescriptor;

use crate::{
    config::DesktopConfig,
    model::{Position, Size, WorkArea, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH},
};

/// Spacing constants used by [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRules {
    pub margin: i32,
    pub cascade_origin: i32,
    pub cascade_step: i32,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self::from(&DesktopConfig::default())
    }
}

impl From<&DesktopConfig> for PlacementRules {
    fn from(config: &DesktopConfig) -> Self {
        Self {
            margin: config.margin,
            cascade_origin: config.cascade_origin,
            cascade_step: config.cascade_step,
        }
    }
}

/// Resolved geometry for a new window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub position: Position,
    pub size: Size,
}

/// Computes where a new instance of `descriptor` opens.
///
/// `creation_index` is the number of instances open before this launch and only drives the
/// cascade for descriptors without a default position. The top-left corner is pulled back inside
/// the work area when the window would overflow the far edge, and never goes below the margin.
pub fn resolve(
    descriptor: &ApplicationDescriptor,
    creation_index: usize,
    work_area: WorkArea,
    rules: &PlacementRules,
) -> Placement {
    let size = Size {
        width: descriptor
            .default_size
            .width
            .to_pixels()
            .unwrap_or(DEFAULT_WINDOW_WIDTH),
        height: descriptor
            .default_size
            .height
            .to_pixels()
            .unwrap_or(DEFAULT_WINDOW_HEIGHT),
    };

    let base = descriptor
        .default_position
        .map(|p| Position { x: p.x, y: p.y })
        .unwrap_or_else(|| {
            let index = i32::try_from(creation_index).unwrap_or(i32::MAX);
            let offset = rules
                .cascade_origin
                .saturating_add(index.saturating_mul(rules.cascade_step));
            Position {
                x: offset,
                y: offset,
            }
        });

    Placement {
        position: clamp_position(base, size, work_area, rules.margin),
        size,
    }
}

/// Pulls a window's top-left corner inside the work area inset.
///
/// The corner never goes below `margin`, and is moved back when the window would cross the far
/// edge minus `margin`. Windows larger than the inset stick to the margin.
pub fn clamp_position(
    position: Position,
    size: Size,
    work_area: WorkArea,
    margin: i32,
) -> Position {
    Position {
        x: clamp_axis(position.x, size.width, work_area.width, margin),
        y: clamp_axis(position.y, size.height, work_area.height, margin),
    }
}

fn clamp_axis(start: i32, extent: i32, available: i32, margin: i32) -> i32 {
    let mut start = start;
    let far_limit = available.saturating_sub(margin);
    if start.saturating_add(extent) > far_limit {
        start = margin.max(far_limit.saturating_sub(extent));
    }
    start.max(margin)
}

#[cfg(test)]
mod tests {
    use desktop_app_contract::{ApplicationId, DefaultPosition, DefaultSize, WindowDimension};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn descriptor(size: DefaultSize, position: Option<(i32, i32)>) -> ApplicationDescriptor {
        ApplicationDescriptor {
            id: ApplicationId::trusted("probe"),
            display_name: "Probe".to_string(),
            icon_id: String::new(),
            default_size: size,
            default_position: position.map(|(x, y)| DefaultPosition { x, y }),
            open_on_startup: false,
            singleton: false,
        }
    }

    #[test]
    fn overflowing_window_is_pulled_back_inside_the_margin() {
        let placement = resolve(
            &descriptor(DefaultSize::pixels(700, 500), Some((50, 50))),
            0,
            WorkArea {
                width: 760,
                height: 540,
            },
            &PlacementRules::default(),
        );
        assert_eq!(placement.position, Position { x: 50, y: 32 });
        assert_eq!(
            placement.size,
            Size {
                width: 700,
                height: 500
            }
        );
    }

    #[test]
    fn windows_without_a_position_cascade_by_creation_index() {
        let rules = PlacementRules::default();
        let probe = descriptor(DefaultSize::pixels(300, 200), None);
        let first = resolve(&probe, 0, WorkArea::default(), &rules);
        let third = resolve(&probe, 2, WorkArea::default(), &rules);
        assert_eq!(first.position, Position { x: 50, y: 50 });
        assert_eq!(third.position, Position { x: 110, y: 110 });
    }

    #[test]
    fn string_sizes_are_parsed_and_unreadable_ones_fall_back() {
        let placement = resolve(
            &descriptor(
                DefaultSize {
                    width: WindowDimension::from("640px"),
                    height: WindowDimension::from("auto"),
                },
                Some((10, 10)),
            ),
            0,
            WorkArea::default(),
            &PlacementRules::default(),
        );
        assert_eq!(
            placement.size,
            Size {
                width: 640,
                height: DEFAULT_WINDOW_HEIGHT
            }
        );
    }

    #[test]
    fn clamp_position_keeps_corners_inside_the_inset() {
        let size = Size {
            width: 300,
            height: 200,
        };
        let area = WorkArea::default();
        assert_eq!(
            clamp_position(Position { x: -500, y: 5000 }, size, area, 8),
            Position { x: 8, y: 512 }
        );
        assert_eq!(
            clamp_position(Position { x: 100, y: 100 }, size, area, 8),
            Position { x: 100, y: 100 }
        );
    }

    #[test]
    fn oversized_windows_stick_to_the_margin() {
        let placement = resolve(
            &descriptor(DefaultSize::pixels(2000, 2000), Some((300, 300))),
            0,
            WorkArea::default(),
            &PlacementRules::default(),
        );
        assert_eq!(placement.position, Position { x: 8, y: 8 });
    }

    proptest! {
        #[test]
        fn placement_is_deterministic_and_clamped(
            width in 1i32..1200,
            height in 1i32..700,
            x in -500i32..2000,
            y in -500i32..2000,
            index in 0usize..40,
            has_position in any::<bool>(),
        ) {
            let area = WorkArea { width: 1280, height: 720 };
            let rules = PlacementRules::default();
            let probe = descriptor(
                DefaultSize::pixels(width, height),
                has_position.then_some((x, y)),
            );
            let first = resolve(&probe, index, area, &rules);
            prop_assert_eq!(first, resolve(&probe, index, area, &rules));

            prop_assert!(first.position.x >= rules.margin);
            prop_assert!(first.position.y >= rules.margin);
            if width <= area.width - 2 * rules.margin {
                prop_assert!(first.position.x + width <= area.width - rules.margin);
            }
            if height <= area.height - 2 * rules.margin {
                prop_assert!(first.position.y + height <= area.height - rules.margin);
            }
        }
    }
}
