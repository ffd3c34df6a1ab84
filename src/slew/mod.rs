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

use crate::attitude::{AttitudeSolver, Orientation, PointingConstraints};
use crate::ephemeris::Ephemeris;
use crate::errors::{AttitudeError, InvalidLimitsSnafu, NoStartStateSnafu};
use crate::linalg::Vector3;
use crate::time::{Duration, Epoch, Unit as TimeUnit};
use snafu::ensure;
use std::fmt;
use typed_builder::TypedBuilder;

/// Slew without matching the initial angular rate.
pub mod no_rate_match;
mod profile;
/// Slew which first cancels the rate mismatch between the start attitude and the end constraints.
pub mod rate_match;

pub use no_rate_match::NoRateMatchSlew;
pub use profile::AttitudeProfile;
pub use rate_match::RateMatchSlew;

/// Default maximum angular rate on each body axis, in rad/s.
pub const DEFAULT_RATE_LIMIT_RAD_S: f64 = 5e-4;
/// Default maximum angular acceleration on each body axis, in rad/s^2.
pub const DEFAULT_ACCEL_LIMIT_RAD_S2: f64 = 5e-6;

/// Per body axis angular rate and acceleration limits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SlewLimits {
    rate_rad_s: Vector3<f64>,
    accel_rad_s2: Vector3<f64>,
}

impl SlewLimits {
    /// Builds new limits, all components must be strictly positive.
    pub fn new(rate_rad_s: Vector3<f64>, accel_rad_s2: Vector3<f64>) -> Result<Self, AttitudeError> {
        ensure!(
            rate_rad_s.iter().all(|x| x.is_finite() && *x > 0.0),
            InvalidLimitsSnafu {
                details: format!("angular rate limits must be positive, got {rate_rad_s:?}")
            }
        );
        ensure!(
            accel_rad_s2.iter().all(|x| x.is_finite() && *x > 0.0),
            InvalidLimitsSnafu {
                details: format!(
                    "angular acceleration limits must be positive, got {accel_rad_s2:?}"
                )
            }
        );
        Ok(Self {
            rate_rad_s,
            accel_rad_s2,
        })
    }

    /// Same limits on all three axes.
    pub fn uniform(rate_rad_s: f64, accel_rad_s2: f64) -> Result<Self, AttitudeError> {
        Self::new(
            Vector3::repeat(rate_rad_s),
            Vector3::repeat(accel_rad_s2),
        )
    }

    pub fn rate_rad_s(&self) -> Vector3<f64> {
        self.rate_rad_s
    }

    pub fn accel_rad_s2(&self) -> Vector3<f64> {
        self.accel_rad_s2
    }

    /// Maximum angular rate about the provided unit axis.
    pub fn rate_along(&self, axis: &Vector3<f64>) -> f64 {
        project_limit(axis, &self.rate_rad_s)
    }

    /// Maximum angular acceleration about the provided unit axis.
    pub fn accel_along(&self, axis: &Vector3<f64>) -> f64 {
        project_limit(axis, &self.accel_rad_s2)
    }

    /// Scales both rate and acceleration limits.
    pub fn scaled(&self, factor: f64) -> Result<Self, AttitudeError> {
        Self::new(self.rate_rad_s * factor, self.accel_rad_s2 * factor)
    }
}

impl Default for SlewLimits {
    fn default() -> Self {
        Self {
            rate_rad_s: Vector3::repeat(DEFAULT_RATE_LIMIT_RAD_S),
            accel_rad_s2: Vector3::repeat(DEFAULT_ACCEL_LIMIT_RAD_S2),
        }
    }
}

impl fmt::Display for SlewLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ω_max = [{:e}, {:e}, {:e}] rad/s, α_max = [{:e}, {:e}, {:e}] rad/s^2",
            self.rate_rad_s.x,
            self.rate_rad_s.y,
            self.rate_rad_s.z,
            self.accel_rad_s2.x,
            self.accel_rad_s2.y,
            self.accel_rad_s2.z
        )
    }
}

/// Projects per axis limits onto an axis: the limits define an ellipsoid, and the result is its radius along the axis.
///
/// Returns `1 / sqrt(Σ (axis_i / limit_i)^2)`.
pub fn project_limit(axis: &Vector3<f64>, limit: &Vector3<f64>) -> f64 {
    1.0 / axis.component_div(limit).norm()
}

/// Timing of a rest to rest turn about a fixed axis, with symmetric acceleration and deceleration.
///
/// If the rate limit cannot be reached within half of the turn angle, the profile is triangular and has no coast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TurnTimes {
    /// Duration of the acceleration, and of the deceleration, in seconds
    pub burn_s: f64,
    /// Duration at the maximum rate, in seconds
    pub coast_s: f64,
    /// Total turn duration in seconds
    pub total_s: f64,
}

impl TurnTimes {
    pub fn new(angle_rad: f64, rate_rad_s: f64, accel_rad_s2: f64) -> Self {
        let burn_s = rate_rad_s / accel_rad_s2;
        let burn_angle = 0.5 * accel_rad_s2 * burn_s.powi(2);
        if burn_angle >= 0.5 * angle_rad {
            let burn_s = (angle_rad / accel_rad_s2).sqrt();
            Self {
                burn_s,
                coast_s: 0.0,
                total_s: 2.0 * burn_s,
            }
        } else {
            let coast_s = (angle_rad - 2.0 * burn_angle) / rate_rad_s;
            Self {
                burn_s,
                coast_s,
                total_s: 2.0 * burn_s + coast_s,
            }
        }
    }

    pub fn is_triangular(&self) -> bool {
        self.coast_s <= 0.0
    }

    pub fn total(&self) -> Duration {
        self.total_s * TimeUnit::Second
    }
}

impl fmt::Display for TurnTimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (burn {} s, coast {} s)",
            self.total(),
            self.burn_s,
            self.coast_s
        )
    }
}

/// A request to turn from a start state towards end pointing constraints.
#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct TurnRequest {
    /// Epoch at which the turn starts
    pub start: Epoch,
    /// Start attitude, if unset it is solved from the start constraints
    #[builder(default, setter(strip_option))]
    pub from: Option<Orientation>,
    /// Pointing constraints met at the start of the turn
    #[builder(default, setter(strip_option))]
    pub from_constraints: Option<PointingConstraints>,
    /// Pointing constraints to turn to, and track afterwards
    pub to: PointingConstraints,
    /// Maximum duration of the turn, and end of the generated profile, defaults to two hours
    #[builder(default = 2 * TimeUnit::Hour)]
    pub max_duration: Duration,
}

impl TurnRequest {
    /// Attitude at the start of the turn, either provided or solved from the start constraints.
    pub fn start_orientation(
        &self,
        solver: &AttitudeSolver,
        ephem: &dyn Ephemeris,
    ) -> Result<Orientation, AttitudeError> {
        match (&self.from, &self.from_constraints) {
            (Some(orientation), _) => Ok(*orientation),
            (None, Some(constraints)) => solver.orientation_at(self.start, constraints, ephem),
            (None, None) => NoStartStateSnafu { epoch: self.start }.fail(),
        }
    }

    /// Last epoch of the turn allocation.
    pub fn end(&self) -> Epoch {
        self.start + self.max_duration
    }
}

/// Checks the sampling of a turn.
pub(crate) fn check_sampling(
    sample_period: Duration,
    max_duration: Duration,
) -> Result<(), AttitudeError> {
    ensure!(
        sample_period > Duration::ZERO,
        InvalidLimitsSnafu {
            details: format!("sample period must be positive, got {sample_period}")
        }
    );
    ensure!(
        max_duration > Duration::ZERO,
        InvalidLimitsSnafu {
            details: format!("maximum turn duration must be positive, got {max_duration}")
        }
    );
    Ok(())
}
