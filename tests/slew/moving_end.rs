use super::{max_sample_rate, moon_pointing};
use crate::{test_ephemeris, AnalyticEphemeris, EARTH, MOON, SPACECRAFT, SUN};
use nyx_attitude::adc::AdcModel;
use nyx_attitude::attitude::solver::pointing_error;
use nyx_attitude::attitude::{AttitudeSolver, Observer, PointingConstraints, Target};
use nyx_attitude::ephemeris::{j2000_frame, NaifId, RelativeBody};
use nyx_attitude::linalg::Vector3;
use nyx_attitude::slew::{NoRateMatchSlew, RateMatchSlew, SlewLimits, TurnRequest};
use nyx_attitude::time::Unit;
use rstest::*;

#[fixture]
fn ephem() -> AnalyticEphemeris {
    test_ephemeris()
}

fn seen_from_spacecraft(body: NaifId) -> RelativeBody {
    RelativeBody::new(j2000_frame(body), j2000_frame(SPACECRAFT))
}

/// Body +Z towards the Earth, body +Y along the orbit normal.
fn earth_nadir() -> PointingConstraints {
    let earth = seen_from_spacecraft(EARTH);
    PointingConstraints::new(
        Observer::from_axis_name("+Z").unwrap(),
        Target::body_center(earth),
        Observer::from_axis_name("+Y").unwrap(),
        Target::orbit_plane(earth),
    )
}

/// Body +Z towards the Moon, body +X normal to the plane containing the Moon and the Sun.
fn moon_sun_plane() -> PointingConstraints {
    let moon = Target::body_center(seen_from_spacecraft(MOON));
    PointingConstraints::new(
        Observer::from_axis_name("+Z").unwrap(),
        moon.clone(),
        Observer::from_axis_name("+X").unwrap(),
        Target::body_plane(seen_from_spacecraft(SUN), moon, 0.0, true),
    )
}

#[rstest]
fn nadir_to_moon(
    ephem: AnalyticEphemeris,
    #[values(false, true)] rate_matching: bool,
    #[values(false, true)] sun_plane: bool,
) {
    // 0.1 deg/s on every axis, the Y axis accelerates 5.8 times faster than the others
    let rate_limit = 0.1_f64.to_radians();
    let limits = SlewLimits::new(
        Vector3::repeat(rate_limit),
        Vector3::new(2.5e-4, 2.5e-4 * 5.8, 2.5e-4),
    )
    .unwrap();
    let model: Box<dyn AdcModel> = if rate_matching {
        Box::new(RateMatchSlew::new(limits, 1 * Unit::Minute))
    } else {
        Box::new(NoRateMatchSlew::new(limits, 1 * Unit::Minute))
    };

    let from = earth_nadir();
    let to = if sun_plane {
        moon_sun_plane()
    } else {
        moon_pointing()
    };
    let request = TurnRequest::builder()
        .start(ephem.reference)
        .from_constraints(from.clone())
        .to(to.clone())
        .max_duration(40 * Unit::Minute)
        .build();

    let profile = model.turn_profile(&request, &ephem).unwrap();
    assert_eq!(profile.len(), 41);
    assert!(profile.duration() <= request.max_duration);

    let start = AttitudeSolver::default()
        .orientation_at(request.start, &from, &ephem)
        .unwrap();
    let (first_epoch, first) = profile.first().unwrap();
    assert_eq!(first_epoch, request.start);
    assert!(first.angle_to(&start) < 1e-9);

    // Nadir and the Moon are far apart
    let moon_at_start = to.primary.target.pointing(request.start, &ephem).unwrap();
    assert!(pointing_error(&first.rotation(), &Vector3::z(), &moon_at_start) > 0.5);

    // Turn samples carry no rate, the tracking samples which follow the turn do
    let (_, last) = profile.last().unwrap();
    assert!(last.rate_rad_s().is_some());
    let mut tracking = false;
    for (epoch, orientation) in &profile {
        tracking |= orientation.rate_rad_s().is_some();
        if tracking {
            let moon = to.primary.target.pointing(*epoch, &ephem).unwrap();
            let error = pointing_error(&orientation.rotation(), &Vector3::z(), &moon);
            assert!(error < 1e-9, "{epoch}: {error:e} rad off the Moon");
        }
    }

    // The end frame keeps moving during the turn
    let max_rate = max_sample_rate(&profile);
    assert!(
        max_rate <= rate_limit * 1.05,
        "{:.4} deg/s above the limit",
        max_rate.to_degrees()
    );
}
