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

use super::{check_sampling, AttitudeProfile, SlewLimits, TurnRequest, TurnTimes};
use crate::attitude::orientation::{frame_axis, rotation_angle};
use crate::attitude::{AttitudeSolver, Orientation};
use crate::ephemeris::Ephemeris;
use crate::errors::AttitudeError;
use crate::linalg::{Unit, UnitQuaternion, Vector3};
use crate::time::{Duration, Unit as TimeUnit};
use std::fmt;
use typed_builder::TypedBuilder;

/// The turn sized by the duration search.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TurnPlan {
    /// Time after the start of the turn at which the end attitude was solved
    pub offset: Duration,
    /// Attitude at the end of the turn
    pub end_rotation: UnitQuaternion<f64>,
    /// Turn angle in radians
    pub angle_rad: f64,
    /// Axis in the reference frame about which the spacecraft turns
    pub axis: Unit<Vector3<f64>>,
    /// Projected angular rate limit about the turn axis
    pub rate_rad_s: f64,
    /// Projected angular acceleration limit about the turn axis
    pub accel_rad_s2: f64,
    pub times: TurnTimes,
}

impl TurnPlan {
    /// Turn angle after `t_s` seconds of turning, following the acceleration, coast and deceleration phases.
    pub fn angle_at(&self, t_s: f64) -> f64 {
        let burn_s = self.times.burn_s;
        let coast_s = self.times.coast_s;
        let accel_angle = 0.5 * self.accel_rad_s2 * burn_s.powi(2);
        if t_s <= burn_s {
            0.5 * self.accel_rad_s2 * t_s.powi(2)
        } else if t_s <= burn_s + coast_s {
            accel_angle + self.accel_rad_s2 * burn_s * (t_s - burn_s)
        } else {
            let coast_angle = accel_angle + self.accel_rad_s2 * burn_s * coast_s;
            let tau = t_s - (burn_s + coast_s);
            coast_angle + tau * (self.accel_rad_s2 * burn_s - 0.5 * self.accel_rad_s2 * tau)
        }
    }
}

impl fmt::Display for TurnPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} deg turn about [{:.6}, {:.6}, {:.6}] taking {}",
            self.angle_rad.to_degrees(),
            self.axis.x,
            self.axis.y,
            self.axis.z,
            self.times
        )
    }
}

/// Rest to rest slew about a fixed axis from the start attitude, ignoring its rate, followed by tracking of the end
/// constraints until the end of the allocated duration.
#[derive(Copy, Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct NoRateMatchSlew {
    #[builder(default)]
    pub limits: SlewLimits,
    /// Time between two attitude samples
    #[builder(default = 60 * TimeUnit::Second)]
    pub sample_period: Duration,
    #[builder(default)]
    pub solver: AttitudeSolver,
}

impl NoRateMatchSlew {
    pub fn new(limits: SlewLimits, sample_period: Duration) -> Self {
        Self {
            limits,
            sample_period,
            solver: AttitudeSolver::default(),
        }
    }

    /// Searches, one second at a time, for the first offset at which a turn towards the end attitude solved at that
    /// offset would already be complete.
    pub fn plan(
        &self,
        start_rotation: &UnitQuaternion<f64>,
        request: &TurnRequest,
        ephem: &dyn Ephemeris,
    ) -> Result<TurnPlan, AttitudeError> {
        let max_offset_s = request.max_duration.to_seconds().floor() as i64;
        let mut plan = None;

        for offset_s in 0..=max_offset_s {
            let offset = offset_s * TimeUnit::Second;
            let end_rotation = self
                .solver
                .rotation_at(request.start + offset, &request.to, ephem)?;

            let turn = start_rotation * end_rotation.inverse();
            let angle_rad = rotation_angle(&turn);
            let axis = frame_axis(&turn);
            let rate_rad_s = self.limits.rate_along(&axis);
            let accel_rad_s2 = self.limits.accel_along(&axis);
            let times = TurnTimes::new(angle_rad, rate_rad_s, accel_rad_s2);

            let this_plan = TurnPlan {
                offset,
                end_rotation,
                angle_rad,
                axis,
                rate_rad_s,
                accel_rad_s2,
                times,
            };
            plan = Some(this_plan);

            if times.total_s <= offset_s as f64 {
                debug!("turn search converged after {offset}: {this_plan}");
                return Ok(this_plan);
            }
        }

        let predicted = plan.map_or(Duration::ZERO, |plan| plan.times.total());
        warn!(
            "turn at {} needs {predicted} but only {} are allocated",
            request.start, request.max_duration
        );
        Err(AttitudeError::TurnInfeasible {
            start: request.start,
            predicted,
            allocated: request.max_duration,
        })
    }

    /// Generates the turn profile: acceleration, coast and deceleration samples about the turn axis, then tracking.
    pub fn generate(
        &self,
        request: &TurnRequest,
        ephem: &dyn Ephemeris,
    ) -> Result<AttitudeProfile, AttitudeError> {
        check_sampling(self.sample_period, request.max_duration)?;

        let start = request.start_orientation(&self.solver, ephem)?;
        let start_rotation = start.rotation();
        let plan = self.plan(&start_rotation, request, ephem)?;

        let step_s = self.sample_period.to_seconds();
        let max_s = request.max_duration.to_seconds();
        let burn_s = plan.times.burn_s;
        let coast_s = plan.times.coast_s;

        // Number of samples in each phase, such that the remainders of each phase add up to full samples
        let burn_steps = (burn_s / step_s).floor() as usize;
        let coast_remainder = burn_s % step_s + coast_s % step_s;
        let burn_remainder = 2.0 * (burn_s % step_s) + coast_s % step_s;
        let extra_coast = (coast_remainder / step_s).floor();
        let extra_burn = ((burn_remainder - extra_coast * step_s) / step_s).floor() as usize;
        let coast_steps = if coast_s > 0.0 {
            (coast_s / step_s).floor() as usize + extra_coast as usize
        } else {
            0
        };
        let turn_steps = 2 * burn_steps + coast_steps + extra_burn;

        let sample_epoch = |n: usize| request.start + (n as f64 * step_s) * TimeUnit::Second;

        // The start rate is not matched, so kinematic samples carry no rate
        let mut profile = AttitudeProfile::new();
        profile.insert(request.start, start.without_rate());

        // Acceleration, coast and deceleration
        let mut n = 0;
        while n < turn_steps {
            n += 1;
            let theta = plan.angle_at(n as f64 * step_s);
            let turned = UnitQuaternion::from_axis_angle(&plan.axis, theta);
            profile.insert(sample_epoch(n), Orientation::new(turned * start_rotation));
        }

        let turn_samples = profile.len();

        // Tracking
        while (n + 1) as f64 * step_s <= max_s {
            n += 1;
            let epoch = sample_epoch(n);
            profile.insert(
                epoch,
                self.solver.orientation_at(epoch, &request.to, ephem)?,
            );
        }

        info!(
            "no rate match turn at {}: {plan}, {turn_samples} turn samples and {} tracking samples",
            request.start,
            profile.len() - turn_samples
        );

        Ok(profile)
    }
}
