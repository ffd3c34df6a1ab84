/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2023 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::orientation::{positive_scalar, rate_estimate, vector_angle};
use super::{unit_vector, Observer, Orientation, Target};
use crate::ephemeris::Ephemeris;
use crate::errors::AttitudeError;
use crate::linalg::{Unit, UnitQuaternion, Vector3};
use crate::slew::AttitudeProfile;
use crate::time::{Duration, Epoch, TimeSeries, Unit as TimeUnit};
use rayon::prelude::*;
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use typed_builder::TypedBuilder;

/// Below this norm of the cross product, two unit vectors are considered parallel or opposite.
///
/// Closer to zero, the normalized cross product loses too many digits to be used as a rotation axis.
const PARALLEL_TOLERANCE: f64 = 1e-8;

/// An observer and the target it must point to.
#[derive(Clone, Debug)]
pub struct Alignment {
    pub observer: Observer,
    pub target: Target,
}

impl Alignment {
    pub fn new(observer: Observer, target: Target) -> Self {
        Self { observer, target }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.observer.name(), self.target)
    }
}

/// The primary alignment is met exactly, the secondary one as closely as the primary allows.
#[derive(Clone, Debug)]
pub struct PointingConstraints {
    pub primary: Alignment,
    pub secondary: Option<Alignment>,
}

impl PointingConstraints {
    pub fn new(
        primary_observer: Observer,
        primary_target: Target,
        secondary_observer: Observer,
        secondary_target: Target,
    ) -> Self {
        Self {
            primary: Alignment::new(primary_observer, primary_target),
            secondary: Some(Alignment::new(secondary_observer, secondary_target)),
        }
    }

    pub fn primary_only(observer: Observer, target: Target) -> Self {
        Self {
            primary: Alignment::new(observer, target),
            secondary: None,
        }
    }
}

impl fmt::Display for PointingConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.secondary {
            Some(secondary) => write!(f, "primary {}, secondary {}", self.primary, secondary),
            None => write!(f, "primary {}", self.primary),
        }
    }
}

/// Rotation bringing the direction of `from` onto the direction of `to`, about their common normal.
pub fn align_vectors(from: &Vector3<f64>, to: &Vector3<f64>) -> UnitQuaternion<f64> {
    align_vectors_about(from, to, None)
}

/// Same as [align_vectors], but rotates about `half_turn_axis` (if provided) when the vectors are opposite.
fn align_vectors_about(
    from: &Vector3<f64>,
    to: &Vector3<f64>,
    half_turn_axis: Option<&Vector3<f64>>,
) -> UnitQuaternion<f64> {
    let from = from.normalize();
    let to = to.normalize();
    let angle = vector_angle(&from, &to);

    let axis = match Unit::try_new(from.cross(&to), PARALLEL_TOLERANCE) {
        Some(axis) => axis,
        None if angle < FRAC_PI_2 => return UnitQuaternion::identity(),
        None => match half_turn_axis {
            Some(axis) => Unit::new_normalize(*axis),
            None => any_orthogonal(&from),
        },
    };

    // Keep whichever rotation sense lands closest to the destination
    let positive = UnitQuaternion::from_axis_angle(&axis, angle);
    let negative = UnitQuaternion::from_axis_angle(&axis, -angle);
    if (to - positive * from).norm() <= (to - negative * from).norm() {
        positive
    } else {
        negative
    }
}

fn any_orthogonal(vector: &Vector3<f64>) -> Unit<Vector3<f64>> {
    let other = if vector.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    Unit::new_normalize(vector.cross(&other))
}

/// Rotates `guess` about `axis` in steps of `step_deg` from `start_deg` to `end_deg`, first positively then
/// negatively, and returns the rotated guess which is the most perpendicular to `target`.
///
/// Each direction is walked while the absolute dot product with the target decreases. If the first step of a
/// direction worsens it, the other direction is tried. Once a direction has improved, the first step which does
/// not improve stops the search.
pub fn sweep_about_axis(
    guess: &Vector3<f64>,
    axis: &Unit<Vector3<f64>>,
    target: &Vector3<f64>,
    start_deg: f64,
    end_deg: f64,
    step_deg: f64,
) -> Vector3<f64> {
    let steps = ((end_deg - start_deg) / step_deg).round().max(0.0) as usize;
    let mut best = *guess;
    let mut min_dot = guess.dot(target).abs();

    for sign in [1.0, -1.0] {
        for k in 0..=steps {
            let angle_deg = start_deg + (k as f64) * step_deg;
            let candidate =
                UnitQuaternion::from_axis_angle(axis, sign * angle_deg.to_radians()) * guess;
            let dot = candidate.dot(target).abs();
            if k == 0 && dot > min_dot {
                break;
            }
            if dot < min_dot {
                min_dot = dot;
                best = candidate;
            } else {
                return best;
            }
        }
    }

    best
}

/// Coarse then fine search about the primary axis for the secondary observer direction most perpendicular to the
/// secondary target direction: 1 degree steps up to half a turn, followed by 0.1 degree steps over one degree.
pub fn optimize_secondary(
    guess: &Vector3<f64>,
    primary_axis: &Unit<Vector3<f64>>,
    secondary_target: &Vector3<f64>,
) -> Vector3<f64> {
    let coarse = sweep_about_axis(guess, primary_axis, secondary_target, 1.0, 180.0, 1.0);
    sweep_about_axis(&coarse, primary_axis, secondary_target, 0.1, 1.0, 0.1)
}

/// Computes the attitude which meets pointing constraints.
#[derive(Copy, Clone, Debug, TypedBuilder)]
pub struct AttitudeSolver {
    /// Time step of the forward difference used to estimate the angular rate
    #[builder(default = 1 * TimeUnit::Second)]
    pub step: Duration,
}

impl Default for AttitudeSolver {
    fn default() -> Self {
        Self {
            step: 1 * TimeUnit::Second,
        }
    }
}

impl AttitudeSolver {
    pub fn new(step: Duration) -> Self {
        Self { step }
    }

    /// Rotation from the body frame to the reference frame which meets the constraints at the provided epoch.
    pub fn rotation_at(
        &self,
        epoch: Epoch,
        constraints: &PointingConstraints,
        ephem: &dyn Ephemeris,
    ) -> Result<UnitQuaternion<f64>, AttitudeError> {
        let primary_dir = constraints.primary.target.pointing(epoch, ephem)?;
        let primary_rotation =
            align_vectors(&constraints.primary.observer.pointing(), &primary_dir);

        let secondary = match &constraints.secondary {
            Some(secondary) if !secondary.observer.coincides_with(&constraints.primary.observer) => {
                secondary
            }
            _ => return Ok(positive_scalar(primary_rotation)),
        };

        // Secondary observer once the primary is aligned, and its projection on the plane normal to the primary target
        let secondary_obs = primary_rotation * secondary.observer.pointing();
        let secondary_obs_proj = project_on_plane(
            &secondary_obs,
            &primary_dir,
            epoch,
            "secondary observer is along the primary target direction",
        )?;

        let secondary_dir = secondary.target.pointing(epoch, ephem)?;
        let secondary_dir_proj = unit_vector(
            secondary_dir.cross(&primary_dir),
            epoch,
            "secondary target is along the primary target direction",
        )?;
        let first_pass =
            align_vectors_about(&secondary_obs_proj, &secondary_dir_proj, Some(&primary_dir));

        // Handles non orthogonal observers
        let guess = first_pass * secondary_obs;
        let optimized =
            optimize_secondary(&guess, &Unit::new_normalize(primary_dir), &secondary_dir);
        let optimized_proj = project_on_plane(
            &optimized,
            &primary_dir,
            epoch,
            "optimized secondary observer is along the primary target direction",
        )?;
        let secondary_rotation =
            align_vectors_about(&secondary_obs_proj, &optimized_proj, Some(&primary_dir));

        Ok(positive_scalar(secondary_rotation * primary_rotation))
    }

    /// Orientation meeting the constraints at the provided epoch, with its forward difference angular rate.
    pub fn orientation_at(
        &self,
        epoch: Epoch,
        constraints: &PointingConstraints,
        ephem: &dyn Ephemeris,
    ) -> Result<Orientation, AttitudeError> {
        let rotation = self.rotation_at(epoch, constraints, ephem)?;
        let next = self.rotation_at(epoch + self.step, constraints, ephem)?;
        let rate = rate_estimate(&rotation, &next, self.step.to_seconds());
        debug!("{constraints} at {epoch}: {rotation} with rate {rate:?}");
        Ok(Orientation::with_rate(rotation, rate))
    }

    /// Solves the constraints at each step between both epochs, inclusively, in parallel.
    pub fn track(
        &self,
        constraints: &PointingConstraints,
        start: Epoch,
        end: Epoch,
        period: Duration,
        ephem: &dyn Ephemeris,
    ) -> Result<AttitudeProfile, AttitudeError> {
        let epochs: Vec<Epoch> = TimeSeries::inclusive(start, end, period).collect();
        let samples = epochs
            .into_par_iter()
            .map(|epoch| {
                self.orientation_at(epoch, constraints, ephem)
                    .map(|orientation| (epoch, orientation))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "tracked {constraints} from {start} to {end} with {} samples",
            samples.len()
        );

        Ok(samples.into_iter().collect())
    }
}

/// Projects the vector on the plane normal to `normal`, and normalizes it.
fn project_on_plane(
    vector: &Vector3<f64>,
    normal: &Vector3<f64>,
    epoch: Epoch,
    details: &'static str,
) -> Result<Vector3<f64>, AttitudeError> {
    let perpendicular = vector.cross(normal);
    unit_vector(normal.cross(&perpendicular), epoch, details)
}

/// Angle in radians between a rotated body vector and a reference direction, handy to check constraints.
pub fn pointing_error(
    rotation: &UnitQuaternion<f64>,
    body_vector: &Vector3<f64>,
    direction: &Vector3<f64>,
) -> f64 {
    vector_angle(&(rotation * body_vector), direction)
}
