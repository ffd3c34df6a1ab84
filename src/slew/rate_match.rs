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
use crate::attitude::orientation::{frame_axis, rate_estimate, rotation_angle};
use crate::attitude::{AttitudeSolver, Orientation};
use crate::ephemeris::Ephemeris;
use crate::errors::{AttitudeError, RateRequiredSnafu};
use crate::linalg::{Unit, UnitQuaternion, Vector3};
use crate::time::{Duration, Unit as TimeUnit};
use snafu::OptionExt;
use std::fmt;
use typed_builder::TypedBuilder;

/// Phase boundaries of a rate matching turn, in seconds from the start of the turn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RateMatchPlan {
    /// Axis, in the start frame, about which the rate mismatch is cancelled
    pub match_axis: Unit<Vector3<f64>>,
    pub match_accel_rad_s2: f64,
    /// Duration of the rate matching phase
    pub match_s: f64,
    /// Axis, in the end frame, of the remaining turn
    pub turn_axis: Unit<Vector3<f64>>,
    pub turn_angle_rad: f64,
    pub rate_rad_s: f64,
    pub accel_rad_s2: f64,
    pub coast_start_s: f64,
    pub decel_start_s: f64,
    pub end_s: f64,
}

impl RateMatchPlan {
    pub fn duration(&self) -> Duration {
        self.end_s * TimeUnit::Second
    }

    /// Angle left to turn, about the turn axis, `t_s` seconds after the start of the turn once the rates are matched.
    fn remaining_angle(&self, t_s: f64) -> f64 {
        let tail_angle = 0.5 * self.accel_rad_s2 * (self.end_s - self.decel_start_s).powi(2);
        if t_s < self.coast_start_s {
            tail_angle
                + self.rate_rad_s * (self.decel_start_s - self.coast_start_s)
                + 0.5
                    * self.accel_rad_s2
                    * ((self.coast_start_s - self.match_s).powi(2) - (t_s - self.match_s).powi(2))
        } else if t_s < self.decel_start_s {
            tail_angle + self.rate_rad_s * (self.decel_start_s - t_s)
        } else {
            0.5 * self.accel_rad_s2 * (self.end_s - t_s).powi(2)
        }
    }
}

impl fmt::Display for RateMatchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rate match for {:.3} s then {:.3} deg turn, coast from {:.3} s to {:.3} s, done after {:.3} s",
            self.match_s,
            self.turn_angle_rad.to_degrees(),
            self.coast_start_s,
            self.decel_start_s,
            self.end_s
        )
    }
}

/// Slew which first cancels the angular rate difference between the start attitude and the end constraints, then
/// turns onto the end constraints while following them.
#[derive(Copy, Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct RateMatchSlew {
    #[builder(default)]
    pub limits: SlewLimits,
    /// Time between two attitude samples
    #[builder(default = 10 * TimeUnit::Second)]
    pub sample_period: Duration,
    #[builder(default)]
    pub solver: AttitudeSolver,
    /// Return an error if the turn cannot complete within the allocation, otherwise return the partial turn
    #[builder(default = true)]
    pub fail_if_longer_than_allocated: bool,
    /// Stop the profile at the first sample after the end of the turn instead of tracking until the end of the allocation
    #[builder(default = false)]
    pub truncate_after_turn: bool,
}

impl RateMatchSlew {
    pub fn new(limits: SlewLimits, sample_period: Duration) -> Self {
        Self {
            limits,
            sample_period,
            solver: AttitudeSolver::default(),
            fail_if_longer_than_allocated: true,
            truncate_after_turn: false,
        }
    }

    /// Computes the phases of the turn from the start attitude (which must have a rate) to the end constraints
    /// solved at the start of the turn.
    ///
    /// Returns the plan, the end attitude at the start of the turn, and the rotation from that end attitude to the
    /// start attitude.
    fn plan(
        &self,
        from: &Orientation,
        request: &TurnRequest,
        ephem: &dyn Ephemeris,
    ) -> Result<(RateMatchPlan, UnitQuaternion<f64>, UnitQuaternion<f64>), AttitudeError> {
        let from_rate = from.rate_rad_s().context(RateRequiredSnafu {
            epoch: request.start,
        })?;
        let from_rotation = from.rotation();

        let step_s = self.solver.step.to_seconds();
        let end_rotation = self.solver.rotation_at(request.start, &request.to, ephem)?;
        let end_next = self
            .solver
            .rotation_at(request.start + self.solver.step, &request.to, ephem)?;
        let end_rate = rate_estimate(&end_rotation, &end_next, step_s);

        // Rate matching
        let end_to_start = from_rotation.inverse() * end_rotation;
        let mismatch = from_rate - end_to_start * end_rate;
        let match_axis = Unit::try_new(mismatch, 0.0).unwrap_or_else(Vector3::x_axis);
        let match_accel_rad_s2 = self.limits.accel_along(&match_axis);
        let match_s = mismatch.norm() / match_accel_rad_s2;
        let match_angle = 0.5 * match_accel_rad_s2 * match_s.powi(2);
        let start_to_matched = UnitQuaternion::from_axis_angle(&match_axis, -match_angle);

        // Whole turn from the rate matched attitude to the end attitude
        let matched_to_end = (start_to_matched * end_to_start).inverse();
        let turn_angle_rad = rotation_angle(&matched_to_end);
        let turn_axis = frame_axis(&matched_to_end);
        let rate_rad_s = self.limits.rate_along(&turn_axis);
        let accel_rad_s2 = self.limits.accel_along(&turn_axis);
        let times = TurnTimes::new(turn_angle_rad, rate_rad_s, accel_rad_s2);

        let coast_start_s = match_s + times.burn_s;
        let decel_start_s = coast_start_s + times.coast_s;
        let end_s = decel_start_s + times.burn_s;

        let plan = RateMatchPlan {
            match_axis,
            match_accel_rad_s2,
            match_s,
            turn_axis,
            turn_angle_rad,
            rate_rad_s,
            accel_rad_s2,
            coast_start_s,
            decel_start_s,
            end_s,
        };
        debug!("turn at {}: {plan}", request.start);

        Ok((plan, end_rotation, end_to_start))
    }

    /// Generates the turn profile, sampled every sample period from the start of the turn.
    pub fn generate(
        &self,
        request: &TurnRequest,
        ephem: &dyn Ephemeris,
    ) -> Result<AttitudeProfile, AttitudeError> {
        check_sampling(self.sample_period, request.max_duration)?;

        let from = request.start_orientation(&self.solver, ephem)?;
        let (plan, end_rotation, end_to_start) = self.plan(&from, request, ephem)?;

        let max_s = request.max_duration.to_seconds();
        if plan.end_s > max_s {
            if self.fail_if_longer_than_allocated {
                return Err(AttitudeError::TurnInfeasible {
                    start: request.start,
                    predicted: plan.duration(),
                    allocated: request.max_duration,
                });
            }
            warn!(
                "turn at {} needs {} but only {} are allocated: profile will end mid turn",
                request.start,
                plan.duration(),
                request.max_duration
            );
        }

        let step_s = self.sample_period.to_seconds();
        let end_rotation_inv = end_rotation.inverse();
        let mut profile = AttitudeProfile::new();

        let mut n = 0;
        while n as f64 * step_s <= max_s {
            let t_s = n as f64 * step_s;
            let epoch = request.start + t_s * TimeUnit::Second;
            n += 1;

            if t_s >= plan.end_s {
                // Turn complete, track the end constraints
                profile.insert(
                    epoch,
                    self.solver.orientation_at(epoch, &request.to, ephem)?,
                );
                if self.truncate_after_turn {
                    break;
                }
                continue;
            }

            let current = self.solver.rotation_at(epoch, &request.to, ephem)?;
            let rotation = if t_s < plan.match_s {
                let theta = 0.5
                    * plan.match_accel_rad_s2
                    * (plan.match_s.powi(2) - (t_s - plan.match_s).powi(2));
                let start_to_sc = UnitQuaternion::from_axis_angle(&plan.match_axis, -theta);
                let current_to_sc = start_to_sc * end_to_start * end_rotation_inv * current;
                current * current_to_sc.inverse()
            } else {
                let theta = plan.remaining_angle(t_s);
                current * UnitQuaternion::from_axis_angle(&plan.turn_axis, -theta)
            };
            profile.insert(epoch, Orientation::new(rotation));
        }

        info!(
            "rate match turn at {}: {plan}, {} samples",
            request.start,
            profile.len()
        );

        Ok(profile)
    }
}
