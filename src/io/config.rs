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

use super::{
    duration_from_str, duration_to_str, maybe_duration_from_str, maybe_duration_to_str, ConfigError,
    ConfigRepr,
};
use crate::adc::AdcModel;
use crate::attitude::{AttitudeSolver, Observer, PointingConstraints, Target};
use crate::ephemeris::{j2000_frame, NaifId, RelativeBody};
use crate::errors::AttitudeError;
use crate::linalg::Vector3;
use crate::slew::{
    NoRateMatchSlew, RateMatchSlew, SlewLimits, DEFAULT_ACCEL_LIMIT_RAD_S2,
    DEFAULT_RATE_LIMIT_RAD_S,
};
use crate::time::{Duration, Unit as TimeUnit};
use anise::astro::Aberration;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

/// Maximum dot product between two observers for them to be treated as orthogonal.
const ORTHOGONAL_OBSERVERS_TOLERANCE: f64 = 1e-9;

fn default_rate_limit() -> [f64; 3] {
    [DEFAULT_RATE_LIMIT_RAD_S; 3]
}

fn default_accel_limit() -> [f64; 3] {
    [DEFAULT_ACCEL_LIMIT_RAD_S2; 3]
}

fn default_step() -> Duration {
    1 * TimeUnit::Second
}

fn default_true() -> bool {
    true
}

/// Configuration of a slew generator.
///
/// ```yaml
/// rate_limit_rad_s: [5.0e-4, 5.0e-4, 2.5e-4]
/// accel_limit_rad_s2: [5.0e-6, 5.0e-6, 5.0e-6]
/// rate_matching: true
/// sample_period: 10 s
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, TypedBuilder)]
#[builder(doc)]
pub struct SlewConfig {
    #[serde(default = "default_rate_limit")]
    #[builder(default = default_rate_limit())]
    pub rate_limit_rad_s: [f64; 3],
    #[serde(default = "default_accel_limit")]
    #[builder(default = default_accel_limit())]
    pub accel_limit_rad_s2: [f64; 3],
    /// Defaults to 10 seconds with rate matching, and to one minute otherwise
    #[serde(
        default,
        serialize_with = "maybe_duration_to_str",
        deserialize_with = "maybe_duration_from_str"
    )]
    #[builder(default, setter(strip_option))]
    pub sample_period: Option<Duration>,
    /// Finite difference step of the rate estimate
    #[serde(
        default = "default_step",
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    #[builder(default = default_step())]
    pub step: Duration,
    #[serde(default)]
    #[builder(default)]
    pub rate_matching: bool,
    #[serde(default = "default_true")]
    #[builder(default = true)]
    pub fail_if_longer_than_allocated: bool,
    #[serde(default)]
    #[builder(default)]
    pub truncate_after_turn: bool,
}

impl SlewConfig {
    pub fn limits(&self) -> Result<SlewLimits, AttitudeError> {
        SlewLimits::new(
            Vector3::from(self.rate_limit_rad_s),
            Vector3::from(self.accel_limit_rad_s2),
        )
    }

    pub fn sample_period(&self) -> Duration {
        match self.sample_period {
            Some(period) => period,
            None if self.rate_matching => 10 * TimeUnit::Second,
            None => 60 * TimeUnit::Second,
        }
    }

    /// Builds the configured slew generator.
    pub fn into_model(self) -> Result<Box<dyn AdcModel>, AttitudeError> {
        let limits = self.limits()?;
        if self.step <= Duration::ZERO {
            return Err(AttitudeError::InvalidLimits {
                details: format!("finite difference step must be positive, got {}", self.step),
            });
        }
        let solver = AttitudeSolver::new(self.step);
        let sample_period = self.sample_period();

        if self.rate_matching {
            Ok(Box::new(
                RateMatchSlew::builder()
                    .limits(limits)
                    .sample_period(sample_period)
                    .solver(solver)
                    .fail_if_longer_than_allocated(self.fail_if_longer_than_allocated)
                    .truncate_after_turn(self.truncate_after_turn)
                    .build(),
            ))
        } else {
            Ok(Box::new(
                NoRateMatchSlew::builder()
                    .limits(limits)
                    .sample_period(sample_period)
                    .solver(solver)
                    .build(),
            ))
        }
    }
}

impl Default for SlewConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ConfigRepr for SlewConfig {}

impl fmt::Display for SlewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} slew, rate limit {:?} rad/s, accel limit {:?} rad/s^2, sampled every {}",
            if self.rate_matching {
                "rate matching"
            } else {
                "rest to rest"
            },
            self.rate_limit_rad_s,
            self.accel_limit_rad_s2,
            self.sample_period()
        )
    }
}

/// An observer given either by a body axis name (e.g. `+X`, `MINUS_Z`) or by a body vector.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ObserverConfig {
    Axis(String),
    Vector([f64; 3]),
}

impl ObserverConfig {
    pub fn to_observer(&self) -> Result<Observer, AttitudeError> {
        match self {
            Self::Axis(name) => Observer::from_axis_name(name),
            Self::Vector(v) => Observer::custom(Vector3::from(*v)),
        }
    }
}

/// Aberration correction of the body directions.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AberrationConfig {
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "LT")]
    LightTime,
    #[default]
    #[serde(rename = "LT+S")]
    LightTimeStellar,
}

impl From<AberrationConfig> for Option<Aberration> {
    fn from(cfg: AberrationConfig) -> Self {
        match cfg {
            AberrationConfig::None => Aberration::NONE,
            AberrationConfig::LightTime => Aberration::LT,
            AberrationConfig::LightTimeStellar => Aberration::LT_S,
        }
    }
}

/// A pointing target. Bodies are NAIF IDs, vectors are expressed in the J2000 frame.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetConfig {
    BodyCenter {
        body: NaifId,
    },
    Vector {
        vector: [f64; 3],
    },
    OffsetNadir {
        center: NaifId,
        #[serde(default)]
        ahead_deg: f64,
        #[serde(default)]
        cross_deg: f64,
    },
    BodyPlane {
        body: NaifId,
        #[serde(default)]
        offset_deg: f64,
    },
    BodyVector {
        body: NaifId,
        #[serde(default)]
        offset_deg: f64,
    },
    SecondaryVector {
        vector: [f64; 3],
        #[serde(default)]
        offset_deg: f64,
    },
    OrbitPlane {
        center: NaifId,
    },
}

/// Pointing constraints of a spacecraft.
///
/// ```yaml
/// spacecraft: -10
/// primary_observer: +Z
/// primary_target:
///   kind: body_center
///   body: 399
/// secondary_observer: +Y
/// secondary_target:
///   kind: body_plane
///   body: 10
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PointingConfig {
    pub spacecraft: NaifId,
    #[serde(default)]
    pub aberration: AberrationConfig,
    pub primary_observer: ObserverConfig,
    pub primary_target: TargetConfig,
    #[serde(default)]
    pub secondary_observer: Option<ObserverConfig>,
    #[serde(default)]
    pub secondary_target: Option<TargetConfig>,
}

impl PointingConfig {
    /// The body seen from the spacecraft.
    fn seen_from_spacecraft(&self, body: NaifId) -> RelativeBody {
        RelativeBody::new(j2000_frame(body), j2000_frame(self.spacecraft))
            .with_ab_corr(self.aberration.into())
    }

    fn primary_target(&self) -> Result<Target, ConfigError> {
        match self.primary_target {
            TargetConfig::BodyCenter { body } => {
                Ok(Target::body_center(self.seen_from_spacecraft(body)))
            }
            TargetConfig::Vector { vector } => Ok(Target::custom(Vector3::from(vector))),
            TargetConfig::OffsetNadir {
                center,
                ahead_deg,
                cross_deg,
            } => Ok(Target::offset_nadir(
                self.seen_from_spacecraft(center),
                ahead_deg,
                cross_deg,
            )),
            _ => Err(ConfigError::InvalidConfig {
                msg: format!(
                    "{:?} can only be used as a secondary target",
                    self.primary_target
                ),
            }),
        }
    }

    fn secondary_target(
        &self,
        secondary: &TargetConfig,
        primary: Target,
        observers_orthogonal: bool,
    ) -> Result<Target, ConfigError> {
        match *secondary {
            TargetConfig::BodyPlane { body, offset_deg } => Ok(Target::body_plane(
                self.seen_from_spacecraft(body),
                primary,
                offset_deg,
                observers_orthogonal,
            )),
            TargetConfig::BodyVector { body, offset_deg } => Ok(Target::body_vector(
                self.seen_from_spacecraft(body),
                primary,
                offset_deg,
            )),
            TargetConfig::SecondaryVector { vector, offset_deg } => Ok(
                Target::custom_secondary(Vector3::from(vector), primary, offset_deg),
            ),
            TargetConfig::OrbitPlane { center } => {
                Ok(Target::orbit_plane(self.seen_from_spacecraft(center)))
            }
            _ => Err(ConfigError::InvalidConfig {
                msg: format!("{secondary:?} can only be used as a primary target"),
            }),
        }
    }

    /// Builds the pointing constraints, checking that secondary targets are only used as such.
    pub fn into_constraints(&self) -> Result<PointingConstraints, AttitudeError> {
        let primary_observer = self.primary_observer.to_observer()?;
        let primary_target = self.primary_target()?;

        match (&self.secondary_observer, &self.secondary_target) {
            (None, None) => Ok(PointingConstraints::primary_only(
                primary_observer,
                primary_target,
            )),
            (Some(observer), Some(target)) => {
                let secondary_observer = observer.to_observer()?;
                let orthogonal = primary_observer
                    .is_orthogonal_to(&secondary_observer, ORTHOGONAL_OBSERVERS_TOLERANCE);
                let secondary_target =
                    self.secondary_target(target, primary_target.clone(), orthogonal)?;
                Ok(PointingConstraints::new(
                    primary_observer,
                    primary_target,
                    secondary_observer,
                    secondary_target,
                ))
            }
            _ => Err(ConfigError::InvalidConfig {
                msg: "secondary observer and secondary target must be provided together"
                    .to_string(),
            }
            .into()),
        }
    }
}

impl ConfigRepr for PointingConfig {}
