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

use crate::attitude::{Orientation, PointingConstraints};
use crate::ephemeris::Ephemeris;
use crate::errors::AttitudeError;
use crate::slew::{AttitudeProfile, NoRateMatchSlew, RateMatchSlew, SlewLimits, TurnRequest};
use crate::time::Epoch;

mod tabulated;
pub use tabulated::TabulatedAttitude;

/// An attitude determination and control model: solves the instantaneous attitude and generates turns.
///
/// Both slew generators implement it, and so does [TabulatedAttitude] which replays a precomputed attitude so that
/// generated turns can be compared to it without changing the calling code.
pub trait AdcModel: Send + Sync {
    /// Attitude at the provided epoch. Models which replay a precomputed attitude ignore the constraints.
    fn orientation_at(
        &self,
        epoch: Epoch,
        constraints: &PointingConstraints,
        ephem: &dyn Ephemeris,
    ) -> Result<Orientation, AttitudeError>;

    /// Attitude samples from the start of the requested turn to the end of its allocation.
    fn turn_profile(
        &self,
        request: &TurnRequest,
        ephem: &dyn Ephemeris,
    ) -> Result<AttitudeProfile, AttitudeError>;

    fn set_rate_and_accel_limits(&mut self, limits: SlewLimits);
}

impl AdcModel for NoRateMatchSlew {
    fn orientation_at(
        &self,
        epoch: Epoch,
        constraints: &PointingConstraints,
        ephem: &dyn Ephemeris,
    ) -> Result<Orientation, AttitudeError> {
        self.solver.orientation_at(epoch, constraints, ephem)
    }

    fn turn_profile(
        &self,
        request: &TurnRequest,
        ephem: &dyn Ephemeris,
    ) -> Result<AttitudeProfile, AttitudeError> {
        self.generate(request, ephem)
    }

    fn set_rate_and_accel_limits(&mut self, limits: SlewLimits) {
        self.limits = limits;
    }
}

impl AdcModel for RateMatchSlew {
    fn orientation_at(
        &self,
        epoch: Epoch,
        constraints: &PointingConstraints,
        ephem: &dyn Ephemeris,
    ) -> Result<Orientation, AttitudeError> {
        self.solver.orientation_at(epoch, constraints, ephem)
    }

    fn turn_profile(
        &self,
        request: &TurnRequest,
        ephem: &dyn Ephemeris,
    ) -> Result<AttitudeProfile, AttitudeError> {
        self.generate(request, ephem)
    }

    fn set_rate_and_accel_limits(&mut self, limits: SlewLimits) {
        self.limits = limits;
    }
}
