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

use super::{rotation_about, unit_vector};
use crate::ephemeris::{Ephemeris, RelativeBody};
use crate::errors::AttitudeError;
use crate::linalg::Vector3;
use crate::time::Epoch;
use std::fmt;

/// Below this offset, a plane target does not need orthogonal observers.
const PLANE_OFFSET_TOLERANCE_RAD: f64 = 1e-6;

/// What an observer is pointed at.
///
/// Primary targets return the direction to the target. Secondary targets return a plane-normal-like direction
/// which the solver crosses with the primary direction: the secondary observer is driven into the plane
/// perpendicular to that direction which contains the primary axis.
#[derive(Clone, Debug)]
pub enum Target {
    /// Center of a body, e.g. the Earth seen from the spacecraft
    BodyCenter { body: RelativeBody },
    /// Fixed inertial direction
    CustomVector { vector: Vector3<f64> },
    /// Nadir of the center body, offset by an along track (ahead) angle and a cross track angle
    OffsetNadir {
        center: RelativeBody,
        ahead_deg: f64,
        cross_deg: f64,
    },
    /// Plane containing the primary target direction and the direction to a body
    BodyPlane {
        body: RelativeBody,
        primary: Box<Target>,
        offset_deg: f64,
        observers_orthogonal: bool,
    },
    /// Direction to a body, as close as the primary constraint allows
    BodyVector {
        body: RelativeBody,
        primary: Box<Target>,
        offset_deg: f64,
    },
    /// Fixed inertial direction, as close as the primary constraint allows
    CustomSecondaryVector {
        vector: Vector3<f64>,
        primary: Box<Target>,
        offset_deg: f64,
    },
    /// Orbit plane of the spacecraft around the center body
    OrbitPlane { center: RelativeBody },
}

impl Target {
    pub fn body_center(body: RelativeBody) -> Self {
        Self::BodyCenter { body }
    }

    pub fn custom(vector: Vector3<f64>) -> Self {
        Self::CustomVector { vector }
    }

    pub fn offset_nadir(center: RelativeBody, ahead_deg: f64, cross_deg: f64) -> Self {
        Self::OffsetNadir {
            center,
            ahead_deg,
            cross_deg,
        }
    }

    pub fn body_plane(
        body: RelativeBody,
        primary: Target,
        offset_deg: f64,
        observers_orthogonal: bool,
    ) -> Self {
        Self::BodyPlane {
            body,
            primary: Box::new(primary),
            offset_deg,
            observers_orthogonal,
        }
    }

    pub fn body_vector(body: RelativeBody, primary: Target, offset_deg: f64) -> Self {
        Self::BodyVector {
            body,
            primary: Box::new(primary),
            offset_deg,
        }
    }

    pub fn custom_secondary(vector: Vector3<f64>, primary: Target, offset_deg: f64) -> Self {
        Self::CustomSecondaryVector {
            vector,
            primary: Box::new(primary),
            offset_deg,
        }
    }

    pub fn orbit_plane(center: RelativeBody) -> Self {
        Self::OrbitPlane { center }
    }

    /// Returns whether this target is meant for a secondary observer.
    pub fn is_secondary(&self) -> bool {
        matches!(
            self,
            Self::BodyPlane { .. }
                | Self::BodyVector { .. }
                | Self::CustomSecondaryVector { .. }
                | Self::OrbitPlane { .. }
        )
    }

    /// Unit direction used by the attitude solver at the provided epoch.
    pub fn pointing(&self, epoch: Epoch, ephem: &dyn Ephemeris) -> Result<Vector3<f64>, AttitudeError> {
        match self {
            Self::BodyCenter { body } => unit_vector(
                body.state(epoch, ephem)?.radius_km,
                epoch,
                "target body is at the observer",
            ),
            Self::CustomVector { vector } => {
                unit_vector(*vector, epoch, "custom target vector is null")
            }
            Self::OffsetNadir {
                center,
                ahead_deg,
                cross_deg,
            } => {
                let state = center.state(epoch, ephem)?;
                // Spacecraft relative to the center body
                let radius = -state.radius_km;
                let velocity = -state.velocity_km_s;
                let z_lvlh = unit_vector(-radius, epoch, "spacecraft is at the center body")?;
                let y_lvlh = -unit_vector(
                    radius.cross(&velocity),
                    epoch,
                    "spacecraft orbit is rectilinear",
                )?;
                let x_lvlh = y_lvlh.cross(&z_lvlh);

                let (sin_ahead, cos_ahead) = ahead_deg.to_radians().sin_cos();
                let (sin_cross, cos_cross) = cross_deg.to_radians().sin_cos();
                let along_nadir = cos_cross * cos_ahead;
                let along_track = cos_cross * sin_ahead;

                unit_vector(
                    along_track * x_lvlh + sin_cross * y_lvlh + along_nadir * z_lvlh,
                    epoch,
                    "offset nadir direction is null",
                )
            }
            Self::BodyPlane {
                body,
                primary,
                offset_deg,
                observers_orthogonal,
            } => {
                let body_dir = unit_vector(
                    body.state(epoch, ephem)?.radius_km,
                    epoch,
                    "plane body is at the observer",
                )?;
                if *observers_orthogonal {
                    let primary_dir = primary.pointing(epoch, ephem)?;
                    let normal = unit_vector(
                        primary_dir.cross(&body_dir),
                        epoch,
                        "plane body is along the primary target direction",
                    )?;
                    let projected = normal.cross(&primary_dir);
                    Ok(rotation_about(&primary_dir, offset_deg.to_radians()) * projected)
                } else if offset_deg.to_radians().abs() < PLANE_OFFSET_TOLERANCE_RAD {
                    Ok(body_dir)
                } else {
                    Err(AttitudeError::PlaneOffsetUnsupported {
                        offset_deg: *offset_deg,
                    })
                }
            }
            Self::BodyVector {
                body,
                primary,
                offset_deg,
            } => secondary_normal(
                primary.pointing(epoch, ephem)?,
                body.state(epoch, ephem)?.radius_km,
                *offset_deg,
                epoch,
            ),
            Self::CustomSecondaryVector {
                vector,
                primary,
                offset_deg,
            } => secondary_normal(primary.pointing(epoch, ephem)?, *vector, *offset_deg, epoch),
            Self::OrbitPlane { center } => {
                let state = center.state(epoch, ephem)?;
                unit_vector(
                    state.radius_km.cross(&state.velocity_km_s),
                    epoch,
                    "orbit is rectilinear",
                )
            }
        }
    }

    /// Position of the target relative to its observer, in km. Custom vectors return the vector itself.
    pub fn position(&self, epoch: Epoch, ephem: &dyn Ephemeris) -> Result<Vector3<f64>, AttitudeError> {
        match self {
            Self::CustomVector { vector } | Self::CustomSecondaryVector { vector, .. } => Ok(*vector),
            _ => Ok(self.relative_state(epoch, ephem)?.0),
        }
    }

    /// Velocity of the target relative to its observer, in km/s. Custom vectors are fixed.
    pub fn velocity(&self, epoch: Epoch, ephem: &dyn Ephemeris) -> Result<Vector3<f64>, AttitudeError> {
        match self {
            Self::CustomVector { .. } | Self::CustomSecondaryVector { .. } => Ok(Vector3::zeros()),
            _ => Ok(self.relative_state(epoch, ephem)?.1),
        }
    }

    pub fn name(&self) -> String {
        format!("{self}")
    }

    fn relative_state(
        &self,
        epoch: Epoch,
        ephem: &dyn Ephemeris,
    ) -> Result<(Vector3<f64>, Vector3<f64>), AttitudeError> {
        let body = match self {
            Self::BodyCenter { body }
            | Self::BodyPlane { body, .. }
            | Self::BodyVector { body, .. } => body,
            Self::OffsetNadir { center, .. } | Self::OrbitPlane { center } => center,
            Self::CustomVector { vector } | Self::CustomSecondaryVector { vector, .. } => {
                return Ok((*vector, Vector3::zeros()))
            }
        };
        let state = body.state(epoch, ephem)?;
        Ok((state.radius_km, state.velocity_km_s))
    }
}

/// Normal to the plane containing the primary direction and the secondary direction, rotated about the primary direction.
fn secondary_normal(
    primary_dir: Vector3<f64>,
    direction: Vector3<f64>,
    offset_deg: f64,
    epoch: Epoch,
) -> Result<Vector3<f64>, AttitudeError> {
    let direction = unit_vector(direction, epoch, "secondary target vector is null")?;
    let normal = unit_vector(
        primary_dir.cross(&direction),
        epoch,
        "secondary target is along the primary target direction",
    )?;
    Ok(rotation_about(&primary_dir, offset_deg.to_radians()) * normal)
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BodyCenter { body } => write!(f, "BodyCenterTarget,{}", body.target),
            Self::CustomVector { vector } => write!(
                f,
                "CustomVectorTarget,[{}, {}, {}]",
                vector.x, vector.y, vector.z
            ),
            Self::OffsetNadir {
                center,
                ahead_deg,
                cross_deg,
            } => write!(
                f,
                "OffsetNadirTarget,{},{ahead_deg},{cross_deg}",
                center.target
            ),
            Self::BodyPlane {
                body, offset_deg, ..
            } => write!(f, "BodyPlaneSecondaryTarget,{},{offset_deg}", body.target),
            Self::BodyVector {
                body, offset_deg, ..
            } => write!(f, "BodyVectorSecondaryTarget,{},{offset_deg}", body.target),
            Self::CustomSecondaryVector {
                vector, offset_deg, ..
            } => write!(
                f,
                "CustomVectorSecondaryTarget,[{}, {}, {}],{offset_deg}",
                vector.x, vector.y, vector.z
            ),
            Self::OrbitPlane { center } => {
                write!(f, "OrbitPlaneSecondaryTarget,{}", center.target)
            }
        }
    }
}
