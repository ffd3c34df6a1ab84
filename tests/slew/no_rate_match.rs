use super::{inertial_pointing, max_sample_rate, moon_pointing};
use crate::{test_ephemeris, AnalyticEphemeris};
use nyx_attitude::attitude::solver::pointing_error;
use nyx_attitude::attitude::Orientation;
use nyx_attitude::linalg::Vector3;
use nyx_attitude::slew::{NoRateMatchSlew, SlewLimits, TurnRequest, DEFAULT_RATE_LIMIT_RAD_S};
use nyx_attitude::time::Unit;
use nyx_attitude::AttitudeError;
use rstest::*;

#[fixture]
fn ephem() -> AnalyticEphemeris {
    test_ephemeris()
}

#[rstest]
fn quarter_turn(ephem: AnalyticEphemeris) {
    let slew = NoRateMatchSlew::builder().build();
    let request = TurnRequest::builder()
        .start(ephem.reference)
        .from(Orientation::identity())
        .to(inertial_pointing())
        .build();

    let plan = slew
        .plan(&Orientation::identity().rotation(), &request, &ephem)
        .unwrap();
    assert!((plan.angle_rad - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    assert!(!plan.times.is_triangular());
    assert!(plan.times.total() <= plan.offset);

    let profile = slew.generate(&request, &ephem).unwrap();
    // One sample per minute over the two hour allocation
    assert_eq!(profile.len(), 121);

    let (first_epoch, first) = profile.first().unwrap();
    assert_eq!(first_epoch, request.start);
    assert!(first.angle_to(&Orientation::identity()) < 1e-12);

    let (last_epoch, last) = profile.last().unwrap();
    assert!(last_epoch <= request.end());
    assert!(last.rate_rad_s().is_some());

    let target = Vector3::new(1.0, 1.0, 0.0);
    for (epoch, orientation) in &profile {
        if (*epoch - request.start) > plan.times.total() {
            assert!(pointing_error(&orientation.rotation(), &Vector3::z(), &target) < 1e-9);
        }
    }

    assert!(max_sample_rate(&profile) <= DEFAULT_RATE_LIMIT_RAD_S * (1.0 + 1e-9));
}

#[rstest]
fn moving_target(ephem: AnalyticEphemeris) {
    let slew = NoRateMatchSlew::new(SlewLimits::default(), 30 * Unit::Second);
    let to = moon_pointing();
    let request = TurnRequest::builder()
        .start(ephem.reference + 20 * Unit::Minute)
        .from(Orientation::identity())
        .to(to.clone())
        .max_duration(90 * Unit::Minute)
        .build();

    let plan = slew
        .plan(&Orientation::identity().rotation(), &request, &ephem)
        .unwrap();
    let profile = slew.generate(&request, &ephem).unwrap();
    assert_eq!(profile.len(), 181);
    assert!(profile.duration() <= request.max_duration);

    let (_, first) = profile.first().unwrap();
    assert!(first.angle_to(&Orientation::identity()) < 1e-12);

    // Once turned, the end constraints are tracked
    for (epoch, orientation) in &profile {
        if (*epoch - request.start) > plan.times.total() {
            let moon = to.primary.target.pointing(*epoch, &ephem).unwrap();
            assert!(pointing_error(&orientation.rotation(), &Vector3::z(), &moon) < 1e-7);
        }
    }

    assert!(max_sample_rate(&profile) <= DEFAULT_RATE_LIMIT_RAD_S * (1.0 + 1e-9));
}

#[rstest]
fn start_from_constraints(ephem: AnalyticEphemeris) {
    let slew = NoRateMatchSlew::builder().build();
    let from = moon_pointing();
    let request = TurnRequest::builder()
        .start(ephem.reference)
        .from_constraints(from.clone())
        .to(inertial_pointing())
        .build();

    let profile = slew.generate(&request, &ephem).unwrap();
    let (_, first) = profile.first().unwrap();
    let expected = slew
        .solver
        .rotation_at(request.start, &from, &ephem)
        .unwrap();
    assert!(first.angle_to(&Orientation::new(expected)) < 1e-12);

    let no_start = TurnRequest::builder()
        .start(ephem.reference)
        .to(inertial_pointing())
        .build();
    assert_eq!(
        slew.generate(&no_start, &ephem),
        Err(AttitudeError::NoStartState {
            epoch: ephem.reference
        })
    );
}

#[rstest]
fn infeasible_turn(ephem: AnalyticEphemeris) {
    let slew = NoRateMatchSlew::builder()
        .limits(SlewLimits::default().scaled(1e-3).unwrap())
        .build();
    let request = TurnRequest::builder()
        .start(ephem.reference)
        .from(Orientation::identity())
        .to(inertial_pointing())
        .max_duration(40 * Unit::Minute)
        .build();

    match slew.generate(&request, &ephem) {
        Err(err @ AttitudeError::TurnInfeasible { allocated, .. }) => {
            assert_eq!(allocated, 40 * Unit::Minute);
            assert!(err.to_string().contains("longer than the allocated"));
        }
        other => panic!("expected an infeasible turn, got {other:?}"),
    }
}

#[rstest]
fn per_axis_limits(ephem: AnalyticEphemeris) {
    // 0.1 deg/s on every axis, the Y axis accelerates 5.8 times faster than the others
    let rate = 0.1_f64.to_radians();
    let limits = SlewLimits::new(
        Vector3::repeat(rate),
        Vector3::new(2.5e-4, 2.5e-4 * 5.8, 2.5e-4),
    )
    .unwrap();
    let slew = NoRateMatchSlew::new(limits, 1 * Unit::Minute);
    let request = TurnRequest::builder()
        .start(ephem.reference)
        .from(Orientation::identity())
        .to(inertial_pointing())
        .max_duration(40 * Unit::Minute)
        .build();

    let plan = slew
        .plan(&Orientation::identity().rotation(), &request, &ephem)
        .unwrap();
    assert!(plan.rate_rad_s <= rate * (1.0 + 1e-12));
    assert!(plan.accel_rad_s2 >= 2.5e-4 && plan.accel_rad_s2 <= 2.5e-4 * 5.8);

    let profile = slew.generate(&request, &ephem).unwrap();
    assert_eq!(profile.len(), 41);
    for (_, orientation) in &profile {
        assert!(orientation.rotation().w >= 0.0);
        assert!((orientation.rotation().quaternion().norm() - 1.0).abs() < 1e-6);
    }
    assert!(max_sample_rate(&profile) <= plan.rate_rad_s * (1.0 + 1e-9));
}
