use super::*;

fn circles(radii: &[f64]) -> Vec<Circle> {
    radii
        .iter()
        .enumerate()
        .map(|(i, r)| Circle::new(format!("c{i}"), *r))
        .collect()
}

#[test]
fn packed_circles_respect_buffer() {
    let buffer = 50.0;
    let input = circles(&[900.0, 700.0, 640.0, 640.0, 400.0, 400.0, 400.0, 300.0, 300.0, 120.0]);
    let packed = pack_circles(&input, buffer);
    assert_eq!(packed.len(), input.len());
    for (i, a) in packed.iter().enumerate() {
        for b in &packed[i + 1..] {
            let d = a.center.distance(b.center);
            assert!(
                d + 1e-6 >= a.radius + b.radius + buffer,
                "{} and {} too close: {d}",
                a.id,
                b.id
            );
        }
    }
}

#[test]
fn first_circle_sits_at_origin_and_second_at_angle_zero() {
    let packed = pack_circles(&circles(&[10.0, 10.0]), 5.0);
    assert_eq!(packed[0].center, Point::ORIGIN);
    assert!((packed[1].center.x - 25.0).abs() < 1e-9);
    assert!(packed[1].center.y.abs() < 1e-9);
}

#[test]
fn packing_is_deterministic() {
    let input = circles(&[50.0, 40.0, 40.0, 30.0, 20.0]);
    assert_eq!(pack_circles(&input, 10.0), pack_circles(&input, 10.0));
}

#[test]
fn group_radius_formula() {
    let r = 100.0;
    assert_eq!(group_radius(1, r, 50.0), 150.0);
    assert!((group_radius(4, r, 50.0) - 350.0).abs() < 1e-9);
    assert_eq!(group_radius(2, 100.0, -200.0), 200.0);
}

#[test]
fn slices_partition_the_circle_proportionally() {
    let slices = calculate_group_slices(&[
        ("a".to_string(), 5),
        ("b".to_string(), 3),
        ("c".to_string(), 2),
    ]);
    assert_eq!(slices.len(), 3);
    let total: f64 = slices.iter().map(|s| s.sweep).sum();
    assert!((total - TAU).abs() < 1e-12);
    assert!((slices[0].sweep - TAU * 0.5).abs() < 1e-12);
    assert!((slices[1].sweep - TAU * 0.3).abs() < 1e-12);
    assert!((slices[2].sweep - TAU * 0.2).abs() < 1e-12);
    assert_eq!(slices[1].start_angle, slices[0].end_angle());
}

#[test]
fn empty_groups_have_no_slices() {
    assert!(calculate_group_slices(&[]).is_empty());
}
