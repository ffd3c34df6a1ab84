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

use crate::errors::AttitudeError;
use crate::linalg::{Unit, UnitQuaternion, Vector3};
use std::fmt;

/// A named direction fixed in the spacecraft body frame, typically an instrument or antenna boresight.
#[derive(Clone, Debug, PartialEq)]
pub struct Observer {
    name: String,
    pointing: Unit<Vector3<f64>>,
}

impl Observer {
    /// Builds a new observer, the pointing vector is normalized.
    pub fn new<S: Into<String>>(name: S, pointing: Vector3<f64>) -> Result<Self, AttitudeError> {
        let name = name.into();
        match Unit::try_new(pointing, f64::EPSILON) {
            Some(pointing) => Ok(Self { name, pointing }),
            None => Err(AttitudeError::InvalidObserver { name }),
        }
    }

    /// An unnamed observer along the provided body vector.
    pub fn custom(pointing: Vector3<f64>) -> Result<Self, AttitudeError> {
        Self::new(
            format!(
                "CustomObserver,[{}, {}, {}]",
                pointing.x, pointing.y, pointing.z
            ),
            pointing,
        )
    }

    /// An observer along one of the body axes, named like `+X`, `-z`, `MINUS_Y` or `PLUS_Z`.
    pub fn from_axis_name(name: &str) -> Result<Self, AttitudeError> {
        match body_axis(name) {
            Some(axis) => Self::new(name.trim().to_uppercase(), axis),
            None => Err(AttitudeError::InvalidObserver {
                name: name.to_string(),
            }),
        }
    }

    /// An instrument boresight expressed in the instrument frame, mounted with the provided instrument to body rotation.
    pub fn instrument<S: Into<String>>(
        name: S,
        boresight: Vector3<f64>,
        instrument_to_body: UnitQuaternion<f64>,
    ) -> Result<Self, AttitudeError> {
        Self::new(name, instrument_to_body * boresight)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit pointing vector in the body frame
    pub fn pointing(&self) -> Vector3<f64> {
        self.pointing.into_inner()
    }

    /// Returns true if both observers point along the same body direction.
    pub fn coincides_with(&self, other: &Self) -> bool {
        (self.pointing.into_inner() - other.pointing.into_inner()).norm() < 1e-12
    }

    /// Returns true if both observers are perpendicular within the provided tolerance on the dot product.
    pub fn is_orthogonal_to(&self, other: &Self, tolerance: f64) -> bool {
        self.pointing.dot(&other.pointing.into_inner()).abs() <= tolerance
    }
}

impl fmt::Display for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:.6}, {:.6}, {:.6}]",
            self.name, self.pointing.x, self.pointing.y, self.pointing.z
        )
    }
}

/// Unit vector of a body axis from its name.
///
/// Accepts `X`, `+X`, `PLUS_X`, `POS_X`, `-X`, `NEG_X` and `MINUS_X` (and the same for Y and Z), ignoring case and
/// surrounding white space. Returns None for anything else.
pub fn body_axis(name: &str) -> Option<Vector3<f64>> {
    let name = name.trim().to_uppercase();
    let (sign, axis) = match name.as_str() {
        "X" | "+X" | "PLUS_X" | "POS_X" => (1.0, 0),
        "-X" | "NEG_X" | "MINUS_X" => (-1.0, 0),
        "Y" | "+Y" | "PLUS_Y" | "POS_Y" => (1.0, 1),
        "-Y" | "NEG_Y" | "MINUS_Y" => (-1.0, 1),
        "Z" | "+Z" | "PLUS_Z" | "POS_Z" => (1.0, 2),
        "-Z" | "NEG_Z" | "MINUS_Z" => (-1.0, 2),
        _ => return None,
    };
    let mut vector = Vector3::zeros();
    vector[axis] = sign;
    Some(vector)
}
