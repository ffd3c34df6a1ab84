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

use crate::linalg::{Unit, UnitQuaternion, Vector3};
use std::fmt;

/// The attitude of the spacecraft: the rotation from the body frame to the reference frame, with an optional angular rate.
///
/// The rotation is always stored with a non-negative scalar part: both `q` and `-q` describe the same rotation,
/// so the sign is fixed at construction. An orientation without a rate is not the same as one with a zero rate:
/// the former simply did not estimate it.
///
/// The angular rate is expressed in the reference frame axes, not in the body axes. Use
/// `rotation().inverse() * rate` to get the body rate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Orientation {
    rotation: UnitQuaternion<f64>,
    rate_rad_s: Option<Vector3<f64>>,
}

impl Orientation {
    /// Builds an orientation without an angular rate.
    pub fn new(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            rotation: positive_scalar(rotation),
            rate_rad_s: None,
        }
    }

    /// Builds an orientation with an angular rate in radians per second.
    pub fn with_rate(rotation: UnitQuaternion<f64>, rate_rad_s: Vector3<f64>) -> Self {
        Self {
            rotation: positive_scalar(rotation),
            rate_rad_s: Some(rate_rad_s),
        }
    }

    pub fn identity() -> Self {
        Self::new(UnitQuaternion::identity())
    }

    /// Rotation from the body frame to the reference frame
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.rotation
    }

    /// Angular rate estimate, in rad/s in the reference frame axes, if any
    pub fn rate_rad_s(&self) -> Option<Vector3<f64>> {
        self.rate_rad_s
    }

    /// Returns a copy of this orientation without its rate.
    pub fn without_rate(&self) -> Self {
        Self {
            rotation: self.rotation,
            rate_rad_s: None,
        }
    }

    /// Expresses a body-fixed vector in the reference frame.
    pub fn to_reference(&self, body_vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * body_vector
    }

    /// Angle in radians of the rotation that brings this orientation onto the other one.
    pub fn angle_to(&self, other: &Self) -> f64 {
        rotation_angle(&(self.rotation.inverse() * other.rotation))
    }

    /// Angles in degrees between the X, Y and Z body axes of both orientations, expressed in the reference frame.
    pub fn axis_errors_deg(&self, other: &Self) -> [f64; 3] {
        let mut errors = [0.0; 3];
        for (i, axis) in [Vector3::x(), Vector3::y(), Vector3::z()].iter().enumerate() {
            errors[i] = vector_angle(&(self.rotation * axis), &(other.rotation * axis)).to_degrees();
        }
        errors
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.rotation.quaternion();
        write!(f, "q = [{:.9}, {:.9}, {:.9}, {:.9}]", q.w, q.i, q.j, q.k)?;
        match self.rate_rad_s {
            Some(rate) => write!(
                f,
                " ω = [{:.6e}, {:.6e}, {:.6e}] rad/s",
                rate.x, rate.y, rate.z
            ),
            None => write!(f, " (no rate)"),
        }
    }
}

/// Flips the sign of all four components if the scalar part is negative. The rotation is unchanged.
pub fn positive_scalar(rotation: UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    if rotation.w < 0.0 {
        UnitQuaternion::new_unchecked(-rotation.into_inner())
    } else {
        rotation
    }
}

/// Angle of the rotation in radians, in [0, π].
///
/// Uses the half-angle tangent so that small rotations are not lost in the arc cosine of a scalar part near one.
pub fn rotation_angle(rotation: &UnitQuaternion<f64>) -> f64 {
    2.0 * rotation.imag().norm().atan2(rotation.w.abs())
}

/// Rotation axis matching [rotation_angle], or None for a null rotation.
pub fn rotation_axis(rotation: &UnitQuaternion<f64>) -> Option<Unit<Vector3<f64>>> {
    let imag = if rotation.w < 0.0 {
        -rotation.imag()
    } else {
        rotation.imag()
    };
    Unit::try_new(imag, 0.0)
}

/// Axis about which the reference frame must turn so that `rotation` is undone, i.e. the opposite of the
/// rotation axis. Defaults to the X axis for a null rotation.
pub fn frame_axis(rotation: &UnitQuaternion<f64>) -> Unit<Vector3<f64>> {
    match rotation_axis(rotation) {
        Some(axis) => -axis,
        None => Vector3::x_axis(),
    }
}

/// Angle between two vectors in radians, accurate for nearly (anti-)parallel vectors.
pub fn vector_angle(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}

/// Forward difference estimate of the angular rate between two attitudes `step_s` seconds apart.
///
/// The result is the angular velocity expressed in the reference frame axes, in rad/s.
pub fn rate_estimate(
    current: &UnitQuaternion<f64>,
    next: &UnitQuaternion<f64>,
    step_s: f64,
) -> Vector3<f64> {
    let delta = current.inverse() * next;
    match rotation_axis(&delta) {
        Some(axis) => next * axis.into_inner() * (rotation_angle(&delta) / step_s),
        None => Vector3::zeros(),
    }
}
