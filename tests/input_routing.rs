mod common;

use common::*;
use dual_pano::orbit::PointerId;
use dual_pano::{InputEvent, Routed, Side};

fn down(pointer: PointerId, x: f32, y: f32) -> InputEvent {
    InputEvent::PointerDown { pointer, x, y }
}

fn moved(pointer: PointerId, x: f32, y: f32) -> InputEvent {
    InputEvent::PointerMove { pointer, x, y }
}

fn wheel(x: f32, y: f32, delta_y: f32) -> InputEvent {
    InputEvent::Wheel { x, y, delta_y }
}

const MOUSE: PointerId = PointerId::Mouse;

#[test]
fn horizontal_drag_turns_both_views() {
    let (mut engine, mut backend, _loader) = engine();
    engine.set_descriptors(pair("a.jpg", "b.jpg"), &mut backend).unwrap();

    assert_eq!(engine.handle_input(down(MOUSE, 100.0, 200.0)), Routed::DragStarted(Side::Left));
    assert_eq!(engine.handle_input(moved(MOUSE, 200.0, 200.0)), Routed::Orbited);

    let orbit = engine.orbit().unwrap();
    assert_close(orbit.lon_deg, -10.0);
    assert_close(orbit.lat_deg, 0.0);

    let mut frame = MockFrame::default();
    engine.render_frame(&mut backend, &mut frame);
    assert_eq!(frame.draws[0].target, frame.draws[1].target);
}

#[test]
fn drag_keeps_steering_across_and_outside_surfaces() {
    let (mut engine, mut backend, _loader) = engine();
    engine.set_descriptors(pair("a.jpg", "b.jpg"), &mut backend).unwrap();

    engine.handle_input(down(MOUSE, 700.0, 200.0));
    engine.handle_input(moved(MOUSE, 100.0, 200.0));
    assert_close(engine.orbit().unwrap().lon_deg, 60.0);

    // far outside the window
    engine.handle_input(moved(MOUSE, -300.0, 200.0));
    assert_close(engine.orbit().unwrap().lon_deg, 100.0);

    assert_eq!(engine.handle_input(InputEvent::PointerUp { pointer: MOUSE }), Routed::DragEnded);
    assert_eq!(engine.handle_input(moved(MOUSE, 0.0, 0.0)), Routed::Ignored);
}

#[test]
fn latitude_is_limited_when_aiming_cameras() {
    let (mut engine, mut backend, _loader) = engine();
    engine.set_descriptors(pair("a.jpg", "b.jpg"), &mut backend).unwrap();

    engine.handle_input(down(MOUSE, 100.0, 0.0));
    engine.handle_input(moved(MOUSE, 100.0, 5000.0));
    assert_close(engine.orbit().unwrap().lat_deg, 85.0);

    let mut frame = MockFrame::default();
    engine.render_frame(&mut backend, &mut frame);
    let target = frame.draws[0].target;
    let elevation = (target.y / target.length()).asin().to_degrees();
    assert_close(elevation, 85.0);
}

#[test]
fn extreme_initial_pitch_is_clamped() {
    let (mut engine, mut backend, _loader) = engine();
    let left = dual_pano::PanoramaDescriptor::new("a.jpg").with_pitch(-120.0);
    engine
        .set_descriptors(
            dual_pano::PanoramaPair::new(left, dual_pano::PanoramaDescriptor::new("b.jpg")),
            &mut backend,
        )
        .unwrap();
    assert_close(engine.orbit().unwrap().lat_deg, 85.0);
}

#[test]
fn second_pointer_cannot_hijack_a_drag() {
    let (mut engine, mut backend, _loader) = engine();
    engine.set_descriptors(pair("a.jpg", "b.jpg"), &mut backend).unwrap();
    let finger = PointerId::Touch(7);

    engine.handle_input(down(MOUSE, 100.0, 100.0));
    assert_eq!(engine.handle_input(down(finger, 500.0, 100.0)), Routed::Ignored);
    assert_eq!(engine.handle_input(moved(finger, 600.0, 100.0)), Routed::Ignored);
    assert_eq!(engine.handle_input(InputEvent::PointerUp { pointer: finger }), Routed::Ignored);
    assert!(engine.router().drag_session().is_some());

    assert_eq!(
        engine.handle_input(InputEvent::PointerCancel { pointer: MOUSE }),
        Routed::DragEnded
    );
    assert_eq!(engine.handle_input(down(finger, 500.0, 100.0)), Routed::DragStarted(Side::Right));
}

#[test]
fn wheel_zooms_only_the_side_under_the_cursor() {
    let (mut engine, mut backend, _loader) = engine();
    engine.set_descriptors(pair("a.jpg", "b.jpg"), &mut backend).unwrap();

    assert_eq!(engine.handle_input(wheel(100.0, 100.0, 1000.0)), Routed::Zoomed(Side::Left));
    assert_eq!(engine.fov(Side::Left), Some(100.0));
    assert_eq!(engine.fov(Side::Right), Some(75.0));
    assert_eq!(engine.camera(Side::Left).unwrap().fov_deg(), 100.0);

    engine.handle_input(wheel(600.0, 100.0, -100.0));
    assert_close(engine.fov(Side::Right).unwrap(), 67.0);

    engine.handle_input(wheel(600.0, 100.0, -10_000.0));
    assert_eq!(engine.fov(Side::Right), Some(30.0));
}

#[test]
fn wheel_over_the_divider_is_ignored() {
    let (mut engine, mut backend, _loader) = engine();
    engine.set_descriptors(pair("a.jpg", "b.jpg"), &mut backend).unwrap();

    assert_eq!(engine.handle_input(wheel(401.0, 100.0, 500.0)), Routed::Ignored);
    assert_eq!(engine.fov(Side::Left), Some(75.0));
    assert_eq!(engine.fov(Side::Right), Some(75.0));
}

#[test]
fn wide_initial_fov_snaps_into_zoom_range_on_first_wheel() {
    let (mut engine, mut backend, _loader) = engine();
    let left = dual_pano::PanoramaDescriptor::new("a.jpg").with_vfov(115.0);
    engine
        .set_descriptors(
            dual_pano::PanoramaPair::new(left, dual_pano::PanoramaDescriptor::new("b.jpg")),
            &mut backend,
        )
        .unwrap();
    assert_eq!(engine.fov(Side::Left), Some(115.0));

    engine.handle_input(wheel(100.0, 100.0, -1.0));
    assert_eq!(engine.fov(Side::Left), Some(100.0));
}

#[test]
fn input_is_ignored_while_idle() {
    let (mut engine, mut backend, _loader) = engine();
    engine.set_descriptors(pair("a.jpg", ""), &mut backend).unwrap();

    assert_eq!(engine.handle_input(down(MOUSE, 100.0, 100.0)), Routed::Ignored);
    assert_eq!(engine.handle_input(wheel(100.0, 100.0, 100.0)), Routed::Ignored);
}

#[test]
fn rebuild_cancels_an_in_progress_drag() {
    let (mut engine, mut backend, _loader) = engine();
    engine.set_descriptors(pair("a.jpg", "b.jpg"), &mut backend).unwrap();

    engine.handle_input(down(MOUSE, 100.0, 100.0));
    engine.set_descriptors(pair("c.jpg", "b.jpg"), &mut backend).unwrap();

    assert!(engine.router().drag_session().is_none());
    assert_eq!(engine.handle_input(moved(MOUSE, 300.0, 100.0)), Routed::Ignored);
    assert_close(engine.orbit().unwrap().lon_deg, 0.0);
}

#[test]
fn drag_starts_from_the_current_orientation() {
    let (mut engine, mut backend, _loader) = engine();
    let left = dual_pano::PanoramaDescriptor::new("a.jpg").with_heading(90.0);
    engine
        .set_descriptors(
            dual_pano::PanoramaPair::new(left, dual_pano::PanoramaDescriptor::new("b.jpg")),
            &mut backend,
        )
        .unwrap();

    engine.handle_input(down(MOUSE, 100.0, 100.0));
    engine.handle_input(moved(MOUSE, 150.0, 130.0));
    let orbit = engine.orbit().unwrap();
    assert_close(orbit.lon_deg, 85.0);
    assert_close(orbit.lat_deg, 3.0);
}

#[test]
fn latitude_stays_limited_over_drag_sequences() {
    let (mut engine, mut backend, _loader) = engine();
    engine.set_descriptors(pair("a.jpg", "b.jpg"), &mut backend).unwrap();

    let sessions: [&[(f32, f32)]; 3] = [
        &[(100.0, 600.0), (120.0, 1100.0), (140.0, 5000.0), (160.0, 200.0), (180.0, -1000.0)],
        &[(300.0, -4000.0), (250.0, 900.0), (200.0, -300.0), (150.0, 3000.0)],
        &[(700.0, 100.0), (650.0, 1800.0), (600.0, -1800.0), (550.0, 1800.0), (500.0, -1800.0)],
    ];
    let mut frame = MockFrame::default();
    for (start, moves) in [(100.0, 100.0), (300.0, 100.0), (700.0, 100.0)].into_iter().zip(sessions) {
        engine.handle_input(down(MOUSE, start.0, start.1));
        for &(x, y) in moves {
            engine.handle_input(moved(MOUSE, x, y));

            let lat = engine.orbit().unwrap().lat_deg;
            assert!(lat.abs() <= 85.0 + 1e-3, "lat {lat} after move to ({x}, {y})");

            frame.draws.clear();
            engine.render_frame(&mut backend, &mut frame);
            assert_eq!(frame.draws.len(), 2);
            for draw in &frame.draws {
                let elevation = (draw.target.y / draw.target.length()).asin().to_degrees();
                assert!(elevation.abs() <= 85.0 + 1e-3, "elevation {elevation} on {:?}", draw.side);
            }
        }
        engine.handle_input(InputEvent::PointerUp { pointer: MOUSE });
    }
}
