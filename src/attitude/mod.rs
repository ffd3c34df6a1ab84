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
use crate::time::Epoch;

/// Body-fixed directions that must be pointed at targets.
pub mod observer;
/// The attitude itself, and the quaternion conventions used throughout.
pub mod orientation;
/// Two constraint attitude solver.
pub mod solver;
/// Directions and planes the observers are aligned with.
pub mod target;

pub use observer::{body_axis, Observer};
pub use orientation::Orientation;
pub use solver::{align_vectors, optimize_secondary, sweep_about_axis};
pub use solver::{Alignment, AttitudeSolver, PointingConstraints};
pub use target::Target;

/// Normalizes the vector, or reports the degenerate geometry which made it vanish.
pub(crate) fn unit_vector(
    vector: Vector3<f64>,
    epoch: Epoch,
    details: &'static str,
) -> Result<Vector3<f64>, AttitudeError> {
    match Unit::try_new(vector, f64::EPSILON) {
        Some(unit) => Ok(unit.into_inner()),
        None => Err(AttitudeError::DegenerateGeometry { epoch, details }),
    }
}

/// Rotation of `angle_rad` about the provided (non-null) axis.
pub(crate) fn rotation_about(axis: &Vector3<f64>, angle_rad: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Unit::new_normalize(*axis), angle_rad)
}
