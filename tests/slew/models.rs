use super::inertial_pointing;
use crate::{test_ephemeris, AnalyticEphemeris};
use nyx_attitude::adc::{AdcModel, TabulatedAttitude};
use nyx_attitude::attitude::Orientation;
use nyx_attitude::io::config::SlewConfig;
use nyx_attitude::io::ConfigRepr;
use nyx_attitude::linalg::{UnitQuaternion, Vector3};
use nyx_attitude::slew::{AttitudeProfile, NoRateMatchSlew, RateMatchSlew, TurnRequest};
use nyx_attitude::time::Unit;
use nyx_attitude::AttitudeError;
use rstest::*;
use std::path::PathBuf;

#[fixture]
fn ephem() -> AnalyticEphemeris {
    test_ephemeris()
}

fn output_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("nyx_attitude_{}_{name}", std::process::id()))
}

fn at_rest() -> Orientation {
    Orientation::with_rate(UnitQuaternion::identity(), Vector3::zeros())
}

/// Without a rate to cancel and with inertial targets, both generators fly the same turn: the rate matching profile
/// is exported, read back as a table, and replayed against the rest to rest one.
#[rstest]
fn generators_agree_from_rest(ephem: AnalyticEphemeris) {
    let request = TurnRequest::builder()
        .start(ephem.reference)
        .from(at_rest())
        .to(inertial_pointing())
        .build();

    let rate_matched = RateMatchSlew::builder()
        .sample_period(1 * Unit::Minute)
        .build()
        .generate(&request, &ephem)
        .unwrap();
    let rest_to_rest = NoRateMatchSlew::builder()
        .build()
        .generate(&request, &ephem)
        .unwrap();
    assert_eq!(rate_matched.len(), rest_to_rest.len());

    let path = output_path("rate_match.csv");
    rate_matched.to_csv(&path).unwrap();
    let table = TabulatedAttitude::from_csv(&path, 1 * Unit::Minute).unwrap();
    assert_eq!(table.len(), rate_matched.len());
    assert_eq!(table.start(), request.start);
    assert_eq!(table.end(), request.end());

    let replayed: AttitudeProfile = table.turn_profile(&request, &ephem).unwrap();
    let errors = replayed.max_axis_error_deg(&rest_to_rest).unwrap();
    for (axis, error) in ["X", "Y", "Z"].iter().zip(errors) {
        assert!(error < 0.2, "{axis} axis off by {error} deg");
    }

    // The table also answers between its samples
    let mid = table.at(request.start + 90 * Unit::Second).unwrap();
    let before = table.at(request.start + 1 * Unit::Minute).unwrap();
    let after = table.at(request.start + 2 * Unit::Minute).unwrap();
    assert!(before.angle_to(&mid) <= before.angle_to(&after));

    let outside = table.at(request.end() + 1 * Unit::Second);
    assert!(matches!(
        outside,
        Err(AttitudeError::AttitudeUnavailable { .. })
    ));

    std::fs::remove_file(path).unwrap();
}

#[rstest]
fn models_are_interchangeable(ephem: AnalyticEphemeris) {
    let request = TurnRequest::builder()
        .start(ephem.reference)
        .from(at_rest())
        .to(inertial_pointing())
        .build();

    let configs = SlewConfig::loads_many(
        r#"
- rate_matching: false
- rate_matching: true
  sample_period: 1 min
"#,
    )
    .unwrap();

    let reference = NoRateMatchSlew::builder()
        .build()
        .generate(&request, &ephem)
        .unwrap();

    let mut models: Vec<Box<dyn AdcModel>> = configs
        .into_iter()
        .map(|cfg| cfg.into_model().unwrap())
        .collect();
    models.push(Box::new(
        TabulatedAttitude::from_profile(&reference, 1 * Unit::Minute).unwrap(),
    ));

    for model in &models {
        let profile = model.turn_profile(&request, &ephem).unwrap();
        assert_eq!(profile.len(), 121);
        let (_, first) = profile.first().unwrap();
        assert!(first.angle_to(&at_rest()) < 1e-9);

        let end = model
            .orientation_at(request.end(), &request.to, &ephem)
            .unwrap();
        let (_, last) = profile.last().unwrap();
        assert!(end.angle_to(&last) < 1e-9);
    }

    // Slower limits make the slews infeasible, the table is unaffected
    let slow = nyx_attitude::slew::SlewLimits::default().scaled(1e-3).unwrap();
    for model in models.iter_mut() {
        model.set_rate_and_accel_limits(slow);
    }
    assert!(matches!(
        models[0].turn_profile(&request, &ephem),
        Err(AttitudeError::TurnInfeasible { .. })
    ));
    assert!(matches!(
        models[1].turn_profile(&request, &ephem),
        Err(AttitudeError::TurnInfeasible { .. })
    ));
    assert!(models[2].turn_profile(&request, &ephem).is_ok());
}
