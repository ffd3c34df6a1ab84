use crate::{test_ephemeris, AnalyticEphemeris, EARTH, SPACECRAFT, SUN};
use approx::assert_relative_eq;
use nyx_attitude::attitude::solver::pointing_error;
use nyx_attitude::attitude::{AttitudeSolver, Observer, PointingConstraints, Target};
use nyx_attitude::ephemeris::{j2000_frame, RelativeBody};
use nyx_attitude::linalg::{UnitQuaternion, Vector3};
use nyx_attitude::time::{Epoch, TimeSeries, Unit};
use rstest::*;

#[fixture]
fn ephem() -> AnalyticEphemeris {
    test_ephemeris()
}

fn seen_from_spacecraft(body: i32) -> RelativeBody {
    RelativeBody::new(j2000_frame(body), j2000_frame(SPACECRAFT))
}

fn nadir_orbit_plane() -> PointingConstraints {
    let earth = seen_from_spacecraft(EARTH);
    PointingConstraints::new(
        Observer::from_axis_name("+Z").unwrap(),
        Target::body_center(earth),
        Observer::from_axis_name("+Y").unwrap(),
        Target::orbit_plane(earth),
    )
}

#[rstest]
fn secondary_with_skewed_observer(ephem: AnalyticEphemeris) {
    let solver = AttitudeSolver::default();
    let primary = Target::body_center(seen_from_spacecraft(EARTH));
    // Secondary observer 55 degrees away from the primary one
    let skewed = Observer::new("skewed", Vector3::new(0.0, 1.0, 0.5_f64.sqrt())).unwrap();
    let constraints = PointingConstraints::new(
        Observer::from_axis_name("+Z").unwrap(),
        primary.clone(),
        skewed.clone(),
        Target::body_vector(seen_from_spacecraft(SUN), primary, 0.0),
    );

    let (start, end) = (ephem.reference, ephem.reference + 1 * Unit::Hour);
    for epoch in TimeSeries::inclusive(start, end, 5 * Unit::Minute) {
        let rotation = solver.rotation_at(epoch, &constraints, &ephem).unwrap();

        let primary_dir = constraints.primary.target.pointing(epoch, &ephem).unwrap();
        assert!(pointing_error(&rotation, &Vector3::z(), &primary_dir) < 1e-7);

        let secondary = constraints.secondary.as_ref().unwrap();
        let secondary_dir = secondary.target.pointing(epoch, &ephem).unwrap();
        let achieved = (rotation * skewed.pointing()).dot(&secondary_dir).abs();

        // Brute force over every tenth of a degree about the primary direction
        let axis = nyx_attitude::linalg::Unit::new_normalize(primary_dir);
        let best = (0..3600)
            .map(|k| {
                let spin = UnitQuaternion::from_axis_angle(&axis, (k as f64 * 0.1).to_radians());
                (spin * rotation * skewed.pointing()).dot(&secondary_dir).abs()
            })
            .fold(f64::INFINITY, f64::min);

        assert!(
            achieved <= best + 2e-3,
            "{epoch}: secondary misalignment {achieved} vs best {best}"
        );
    }
}

#[rstest]
fn nadir_tracking_rate(ephem: AnalyticEphemeris) {
    let solver = AttitudeSolver::default();
    let constraints = nadir_orbit_plane();

    let profile = solver
        .track(
            &constraints,
            ephem.reference,
            ephem.reference + 1 * Unit::Hour,
            1 * Unit::Minute,
            &ephem,
        )
        .unwrap();
    assert_eq!(profile.len(), 61);

    for (epoch, orientation) in &profile {
        let nadir = constraints.primary.target.pointing(*epoch, &ephem).unwrap();
        assert!(pointing_error(&orientation.rotation(), &Vector3::z(), &nadir) < 1e-7);

        let normal = constraints
            .secondary
            .as_ref()
            .unwrap()
            .target
            .pointing(*epoch, &ephem)
            .unwrap();
        assert!(orientation.to_reference(&Vector3::y()).dot(&normal).abs() < 1e-9);

        // Nadir pointing turns once per orbit about the orbit normal
        let rate = orientation.rate_rad_s().unwrap();
        assert_relative_eq!(rate.norm(), ephem.mean_motion(), max_relative = 1e-6);
        assert!(rate.normalize().dot(&normal).abs() > 1.0 - 1e-6);
    }
}

#[rstest]
fn parallel_tracking_matches_serial(ephem: AnalyticEphemeris) {
    let solver = AttitudeSolver::builder().step(2 * Unit::Second).build();
    let constraints = nadir_orbit_plane();
    let start = ephem.reference + 7 * Unit::Minute;
    let end = start + 20 * Unit::Minute;

    let profile = solver
        .track(&constraints, start, end, 30 * Unit::Second, &ephem)
        .unwrap();

    let serial: Vec<Epoch> = TimeSeries::inclusive(start, end, 30 * Unit::Second).collect();
    assert_eq!(profile.len(), serial.len());
    for epoch in serial {
        let expected = solver.orientation_at(epoch, &constraints, &ephem).unwrap();
        assert_eq!(profile.get(&epoch), Some(&expected));
    }
}

#[rstest]
fn offset_nadir(ephem: AnalyticEphemeris) {
    let earth = seen_from_spacecraft(EARTH);
    let epoch = ephem.reference + 13 * Unit::Minute;

    let nadir = Target::body_center(earth).pointing(epoch, &ephem).unwrap();
    let zero_offset = Target::offset_nadir(earth, 0.0, 0.0)
        .pointing(epoch, &ephem)
        .unwrap();
    assert!((nadir - zero_offset).norm() < 1e-12);

    // Looking ahead tilts the boresight towards the velocity
    let ahead = Target::offset_nadir(earth, 10.0, 0.0)
        .pointing(epoch, &ephem)
        .unwrap();
    let velocity = Target::body_center(earth)
        .velocity(epoch, &ephem)
        .unwrap();
    assert_relative_eq!(nadir.dot(&ahead), 10.0_f64.to_radians().cos(), epsilon = 1e-12);
    assert!(ahead.dot(&-velocity) > 0.0);
}
