//! End-to-end checks of the Sunny 16 rule through the public API.

use sunny16::catalog::{Catalog, StopIncrement};
use sunny16::config::CalculatorConfig;
use sunny16::engine::{Engine, RangeCheck};
use sunny16::form;
use sunny16::page::render_calculator_page;
use sunny16::types::{ExposureRequest, ExposureResult, Locks, ResultValue, Variable};

fn request(
    aperture: f64,
    shutter_speed: f64,
    iso: u32,
    ev: i32,
    solve: Variable,
) -> ExposureRequest {
    ExposureRequest {
        aperture,
        shutter_speed,
        iso,
        ev,
        locks: Locks::solving(solve),
    }
}

#[test]
fn sunny_day_at_f16_is_reciprocal_of_iso() {
    let catalog = Catalog::default();
    let engine = Engine::new(&catalog);
    for (iso, expected) in [
        (100, "1/125"),
        (200, "1/250"),
        (400, "1/500"),
        (800, "1/1000"),
    ] {
        let result = engine
            .process_calculation(&request(16.0, 1.0 / 125.0, iso, 15, Variable::ShutterSpeed))
            .unwrap();
        assert_eq!(result.to_record().result.as_deref(), Some(expected), "ISO {iso}");
    }
}

#[test]
fn each_stop_darker_needs_one_stop_more_iso() {
    let catalog = Catalog::default();
    let engine = Engine::new(&catalog).with_range_check(RangeCheck::Snapped);
    let isos: Vec<u32> = (11..=15)
        .rev()
        .map(|ev| {
            match engine
                .process_calculation(&request(16.0, 1.0 / 125.0, 100, ev, Variable::Iso))
                .unwrap()
            {
                ExposureResult::Solved(ResultValue::Iso(iso)) => iso,
                other => panic!("EV {ev}: {other:?}"),
            }
        })
        .collect();
    assert_eq!(isos, vec![100, 200, 400, 800, 1600]);
}

#[test]
fn solved_values_are_selectable() {
    let catalog = Catalog::default();
    let engine = Engine::new(&catalog);
    for ev in 11..=16 {
        for &iso in &[100, 400, 1600] {
            let result = engine
                .process_calculation(&request(8.0, 1.0 / 125.0, iso, ev, Variable::ShutterSpeed))
                .unwrap();
            if let ExposureResult::Solved(value) = result {
                assert!(catalog.ui(Variable::ShutterSpeed).contains(value.as_f64()));
            }
        }
    }
}

#[test]
fn configured_calculator_round_trip() {
    let config: CalculatorConfig = toml::from_str(
        r#"
[defaults]
iso = 400

[engine]
range_check = "snapped"
"#,
    )
    .unwrap();
    let catalog = config.catalog().unwrap();
    let engine = config.engine(&catalog);

    let submission = form::submit(
        &engine,
        [
            ("aperture", "16"),
            ("lock_aperture", "on"),
            ("lock_iso", "on"),
        ],
        StopIncrement::Full,
    )
    .unwrap();
    // ISO 400 came from the configured defaults
    assert_eq!(submission.form.request.iso, 400);
    assert_eq!(submission.result.to_record().result.as_deref(), Some("1/500"));

    let html = render_calculator_page(&submission, true).into_string();
    assert!(html.contains("Shutter Speed: <strong>1/500</strong>"));
}
