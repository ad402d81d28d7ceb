use super::*;

#[test]
fn linear_tween_samples_midpoint() {
    let tw = Tween::position(
        Position3D::ORIGIN,
        Position3D::on_plane(100.0, -50.0),
        1.0,
        Duration::from_millis(1000),
    )
    .with_opacity(0.0, 1.0)
    .with_ease(Ease::Linear);

    let (p, o) = tw.sample(Duration::from_millis(500));
    assert_eq!(p, Position3D::on_plane(50.0, -25.0));
    assert_eq!(o, 0.5);
    assert!(!tw.is_done(Duration::from_millis(999)));
    assert!(tw.is_done(Duration::from_millis(1000)));
}

#[test]
fn zero_duration_lands_immediately() {
    let tw = Tween::position(
        Position3D::ORIGIN,
        Position3D::on_plane(1.0, 1.0),
        1.0,
        Duration::ZERO,
    );
    assert_eq!(tw.sample(Duration::ZERO).0, Position3D::on_plane(1.0, 1.0));
}

#[test]
fn tracks_collect_stages_in_order() {
    let t = Track::new("a", 3)
        .then(Stage::State(AnimationState::Spawning))
        .then(Stage::Delay(Duration::from_millis(10)));
    assert_eq!(t.stages.len(), 2);
    assert_eq!(t.stages[0], Stage::State(AnimationState::Spawning));
    assert_eq!(t.generation, 3);
}
