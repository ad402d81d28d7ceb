use super::*;

const ALL: [Ease; 4] = [Ease::Linear, Ease::OutCubic, Ease::OutBack, Ease::InOutSine];

#[test]
fn every_curve_pins_endpoints() {
    for e in ALL {
        assert!(e.apply(0.0).abs() < 1e-12, "{e:?}");
        assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::Linear.apply(-1.0), 0.0);
    assert_eq!(Ease::OutCubic.apply(2.0), 1.0);
}

#[test]
fn settle_curve_is_the_default_and_front_loads_motion() {
    assert_eq!(Ease::default(), Ease::OutCubic);
    assert!(Ease::OutCubic.apply(0.5) > 0.5);
}

#[test]
fn only_back_passes_the_target() {
    let peak = (1..100)
        .map(|i| Ease::OutBack.apply(f64::from(i) / 100.0))
        .fold(f64::MIN, f64::max);
    assert!(peak > 1.05 && peak < 1.15, "{peak}");
    assert!(Ease::OutBack.overshoots());

    for e in ALL.into_iter().filter(|e| !e.overshoots()) {
        for i in 0..=100 {
            let v = e.apply(f64::from(i) / 100.0);
            assert!((0.0..=1.0 + 1e-12).contains(&v), "{e:?} at {i}: {v}");
        }
    }
}

#[test]
fn sine_glide_is_symmetric() {
    let e = Ease::InOutSine;
    assert!((e.apply(0.5) - 0.5).abs() < 1e-12);
    assert!((e.apply(0.2) + e.apply(0.8) - 1.0).abs() < 1e-12);
}

#[test]
fn curve_names_round_trip_through_config_json() {
    let e: Ease = serde_json::from_str("\"in_out_sine\"").unwrap();
    assert_eq!(e, Ease::InOutSine);
    assert_eq!(serde_json::to_string(&Ease::OutBack).unwrap(), "\"out_back\"");
}
