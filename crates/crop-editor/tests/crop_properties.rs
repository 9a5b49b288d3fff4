use proptest::prelude::*;

use snapcrop_crop_editor::{AspectPreset, CropGeometry, TouchMode};
use snapcrop_geometry::RectF;

const VIEW: (f64, f64) = (1000.0, 1000.0);

#[derive(Debug, Clone)]
enum Op {
    /// Press near one of the eight handles.
    PressHandle { index: usize, jx: f64, jy: f64 },
    /// Press anywhere in (or slightly outside) the view.
    PressAt { x: f64, y: f64 },
    Move { dx: f64, dy: f64 },
    Release,
    Aspect(AspectPreset),
    Rotate(f64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..8, -20.0..20.0f64, -20.0..20.0f64)
            .prop_map(|(index, jx, jy)| Op::PressHandle { index, jx, jy }),
        2 => (-100.0..1100.0f64, -100.0..1100.0f64).prop_map(|(x, y)| Op::PressAt { x, y }),
        6 => (-400.0..400.0f64, -400.0..400.0f64).prop_map(|(dx, dy)| Op::Move { dx, dy }),
        2 => Just(Op::Release),
        1 => proptest::sample::select(AspectPreset::ALL.to_vec()).prop_map(Op::Aspect),
        1 => prop_oneof![Just(90.0), Just(-90.0), Just(180.0), -45.0..45.0f64]
            .prop_map(Op::Rotate),
    ]
}

fn image_size() -> impl Strategy<Value = (u32, u32)> {
    (200u32..4000, 200u32..4000)
}

fn contained(crop: &RectF, bounds: &RectF) -> bool {
    bounds.contains_rect(crop)
}

fn ratio_holds(geometry: &CropGeometry) -> bool {
    match geometry.aspect_ratio() {
        Some(ratio) => {
            let crop = geometry.crop_rect();
            (crop.width() / crop.height() - ratio.value()).abs() < 1e-2
        }
        None => true,
    }
}

proptest! {
    #[test]
    fn gestures_keep_crop_inside_bitmap(
        (iw, ih) in image_size(),
        ops in proptest::collection::vec(op(), 1..60),
    ) {
        let mut geometry = CropGeometry::for_image(iw, ih, VIEW.0, VIEW.1);
        let mut cursor = (0.0, 0.0);

        for op in ops {
            match op {
                Op::PressHandle { index, jx, jy } => {
                    let (_, anchor) = geometry.handles()[index];
                    cursor = (anchor.x + jx, anchor.y + jy);
                    geometry.press(cursor.0, cursor.1);
                }
                Op::PressAt { x, y } => {
                    cursor = (x, y);
                    geometry.press(x, y);
                }
                Op::Move { dx, dy } => {
                    cursor = (cursor.0 + dx, cursor.1 + dy);
                    let resizing = geometry.touch_mode() == TouchMode::Resize;
                    geometry.move_to(cursor.0, cursor.1);
                    if resizing {
                        prop_assert!(
                            ratio_holds(&geometry),
                            "ratio drifted: {:?} for {:?}",
                            geometry.crop_rect(),
                            geometry.aspect_ratio()
                        );
                    }
                }
                Op::Release => geometry.release(),
                Op::Aspect(preset) => {
                    geometry.set_aspect_ratio(preset.ratio());
                    prop_assert!(ratio_holds(&geometry));
                }
                Op::Rotate(degrees) => geometry.rotate(degrees),
            }

            prop_assert!(
                contained(&geometry.crop_rect(), &geometry.bitmap_rect()),
                "crop {:?} escaped bitmap {:?}",
                geometry.crop_rect(),
                geometry.bitmap_rect()
            );
        }
    }

    #[test]
    fn unconstrained_resize_respects_min_size(
        (iw, ih) in image_size(),
        moves in proptest::collection::vec((-600.0..600.0f64, -600.0..600.0f64), 1..20),
        index in 0usize..8,
    ) {
        let mut geometry = CropGeometry::for_image(iw, ih, VIEW.0, VIEW.1);
        let bounds = geometry.bitmap_rect();
        let min_w = geometry.config().min_size.min(bounds.width());
        let min_h = geometry.config().min_size.min(bounds.height());

        let (_, anchor) = geometry.handles()[index];
        let mut cursor = (anchor.x, anchor.y);
        geometry.press(cursor.0, cursor.1);
        prop_assume!(geometry.touch_mode() == TouchMode::Resize);

        for (dx, dy) in moves {
            cursor = (cursor.0 + dx, cursor.1 + dy);
            geometry.move_to(cursor.0, cursor.1);
            let crop = geometry.crop_rect();
            prop_assert!(crop.width() >= min_w - 1e-6, "width {} < {}", crop.width(), min_w);
            prop_assert!(crop.height() >= min_h - 1e-6, "height {} < {}", crop.height(), min_h);
        }
    }

    #[test]
    fn export_is_never_empty(
        (iw, ih) in image_size(),
        ops in proptest::collection::vec(op(), 0..30),
    ) {
        let mut geometry = CropGeometry::for_image(iw, ih, VIEW.0, VIEW.1);
        let mut cursor = (0.0, 0.0);
        for op in ops {
            match op {
                Op::PressHandle { index, jx, jy } => {
                    let (_, anchor) = geometry.handles()[index];
                    cursor = (anchor.x + jx, anchor.y + jy);
                    geometry.press(cursor.0, cursor.1);
                }
                Op::PressAt { x, y } => {
                    cursor = (x, y);
                    geometry.press(x, y);
                }
                Op::Move { dx, dy } => {
                    cursor = (cursor.0 + dx, cursor.1 + dy);
                    geometry.move_to(cursor.0, cursor.1);
                }
                Op::Release => geometry.release(),
                Op::Aspect(preset) => geometry.set_aspect_ratio(preset.ratio()),
                Op::Rotate(degrees) => geometry.rotate(degrees),
            }
        }

        let region = geometry.export_region().expect("fit transform is invertible");
        prop_assert!(region.width >= 1);
        prop_assert!(region.height >= 1);
        prop_assert!(region.x < iw);
        prop_assert!(region.y < ih);
        prop_assert!(region.x + region.width <= iw.max(region.x + 1));
        prop_assert!(region.y + region.height <= ih.max(region.y + 1));
    }
}

#[test]
fn zero_sized_view_cannot_export() {
    let geometry = CropGeometry::for_image(640, 480, 0.0, 0.0);
    assert!(matches!(
        geometry.export_region(),
        Err(snapcrop_common::error::SnapError::DegenerateTransform)
    ));
}
