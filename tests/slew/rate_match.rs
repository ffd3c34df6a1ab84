use super::{inertial_pointing, max_sample_rate, moon_pointing};
use crate::{test_ephemeris, AnalyticEphemeris};
use nyx_attitude::attitude::solver::pointing_error;
use nyx_attitude::attitude::Orientation;
use nyx_attitude::linalg::{UnitQuaternion, Vector3};
use nyx_attitude::slew::{RateMatchSlew, SlewLimits, TurnRequest, DEFAULT_RATE_LIMIT_RAD_S};
use nyx_attitude::time::Unit;
use nyx_attitude::AttitudeError;
use rstest::*;

#[fixture]
fn ephem() -> AnalyticEphemeris {
    test_ephemeris()
}

/// Identity attitude spinning slowly about body Z.
fn spinning() -> Orientation {
    Orientation::with_rate(UnitQuaternion::identity(), Vector3::new(0.0, 0.0, 1e-4))
}

fn request(ephem: &AnalyticEphemeris, from: Orientation) -> TurnRequest {
    TurnRequest::builder()
        .start(ephem.reference)
        .from(from)
        .to(inertial_pointing())
        .build()
}

#[rstest]
fn rate_required(ephem: AnalyticEphemeris) {
    let slew = RateMatchSlew::builder().build();
    assert_eq!(
        slew.generate(&request(&ephem, Orientation::identity()), &ephem),
        Err(AttitudeError::RateRequired {
            epoch: ephem.reference
        })
    );
}

#[rstest]
fn spinning_start(ephem: AnalyticEphemeris) {
    let slew = RateMatchSlew::builder().build();
    let request = request(&ephem, spinning());

    let profile = slew.generate(&request, &ephem).unwrap();
    // Every ten seconds over the two hour allocation
    assert_eq!(profile.len(), 721);

    let (first_epoch, first) = profile.first().unwrap();
    assert_eq!(first_epoch, request.start);
    assert!(first.angle_to(&spinning()) < 1e-9);

    let (last_epoch, last) = profile.last().unwrap();
    assert_eq!(last_epoch, request.end());
    let target = Vector3::new(1.0, 1.0, 0.0);
    assert!(pointing_error(&last.rotation(), &Vector3::z(), &target) < 1e-9);
    assert!(last.rate_rad_s().is_some());

    assert!(max_sample_rate(&profile) <= DEFAULT_RATE_LIMIT_RAD_S * (1.0 + 1e-9));
}

#[rstest]
fn truncated_after_turn(ephem: AnalyticEphemeris) {
    let request = request(&ephem, spinning());
    let full = RateMatchSlew::builder()
        .build()
        .generate(&request, &ephem)
        .unwrap();
    let truncated = RateMatchSlew::builder()
        .truncate_after_turn(true)
        .build()
        .generate(&request, &ephem)
        .unwrap();

    assert!(truncated.len() < full.len());
    let (_, last) = truncated.last().unwrap();
    let target = Vector3::new(1.0, 1.0, 0.0);
    assert!(pointing_error(&last.rotation(), &Vector3::z(), &target) < 1e-9);
    assert!(last.rate_rad_s().is_some());

    // The truncated profile is the beginning of the full one
    let errors = truncated.max_axis_error_deg(&full).unwrap();
    assert_eq!(errors, [0.0; 3]);
}

#[rstest]
fn longer_than_allocated(ephem: AnalyticEphemeris) {
    let limits = SlewLimits::default().scaled(1e-3).unwrap();
    let request = request(&ephem, spinning());

    let strict = RateMatchSlew::builder().limits(limits).build();
    assert!(matches!(
        strict.generate(&request, &ephem),
        Err(AttitudeError::TurnInfeasible { .. })
    ));

    // Partial turn when failures are disabled
    let lenient = RateMatchSlew::builder()
        .limits(limits)
        .fail_if_longer_than_allocated(false)
        .build();
    let profile = lenient.generate(&request, &ephem).unwrap();
    assert_eq!(profile.len(), 721);

    let (_, first) = profile.first().unwrap();
    assert!(first.angle_to(&spinning()) < 1e-9);
    let (_, last) = profile.last().unwrap();
    let target = Vector3::new(1.0, 1.0, 0.0);
    assert!(pointing_error(&last.rotation(), &Vector3::z(), &target) > 1e-2);
}

#[rstest]
fn from_tracking_state(ephem: AnalyticEphemeris) {
    // Start from the Moon tracking attitude, whose rate is estimated by the solver
    let slew = RateMatchSlew::new(SlewLimits::default(), 20 * Unit::Second);
    let from = moon_pointing();
    let request = TurnRequest::builder()
        .start(ephem.reference)
        .from_constraints(from.clone())
        .to(inertial_pointing())
        .build();

    let profile = slew.generate(&request, &ephem).unwrap();
    assert_eq!(profile.len(), 361);

    let start = slew
        .solver
        .orientation_at(request.start, &from, &ephem)
        .unwrap();
    let (_, first) = profile.first().unwrap();
    assert!(first.angle_to(&start) < 1e-9);

    let (_, last) = profile.last().unwrap();
    let target = Vector3::new(1.0, 1.0, 0.0);
    assert!(pointing_error(&last.rotation(), &Vector3::z(), &target) < 1e-9);
}
