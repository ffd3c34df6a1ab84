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

use crate::ephemeris::EphemerisError;
use crate::io::{ConfigError, InputOutputError};
use crate::time::{Duration, Epoch};
use snafu::prelude::*;

/// Errors returned by the attitude solver, the slew generators and the attitude tables.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AttitudeError {
    #[snafu(display("ephemeris unavailable when {action}: {source}"))]
    EphemerisUnavailable {
        action: &'static str,
        source: EphemerisError,
    },
    #[snafu(display("rate matching turn at {epoch} requires a start orientation with an angular rate"))]
    RateRequired { epoch: Epoch },
    #[snafu(display(
        "turn starting at {start} is estimated to take {predicted}, longer than the allocated {allocated}"
    ))]
    TurnInfeasible {
        start: Epoch,
        predicted: Duration,
        allocated: Duration,
    },
    #[snafu(display("turn at {epoch} has neither a start orientation nor start pointing constraints"))]
    NoStartState { epoch: Epoch },
    #[snafu(display("observer {name} does not have a valid pointing direction"))]
    InvalidObserver { name: String },
    #[snafu(display("degenerate pointing geometry at {epoch}: {details}"))]
    DegenerateGeometry { epoch: Epoch, details: &'static str },
    #[snafu(display(
        "plane target offset of {offset_deg} deg requires orthogonal primary and secondary observers"
    ))]
    PlaneOffsetUnsupported { offset_deg: f64 },
    #[snafu(display("invalid slew limits: {details}"))]
    InvalidLimits { details: String },
    #[snafu(display("attitude not available at {epoch}: table covers {start} to {end}"))]
    AttitudeUnavailable {
        epoch: Epoch,
        start: Epoch,
        end: Epoch,
    },
    #[snafu(display("attitude table is empty"))]
    EmptyTable,
    #[snafu(display("{source}"))]
    AttitudeIo { source: InputOutputError },
    #[snafu(display("{source}"))]
    AttitudeConfig { source: ConfigError },
}

impl From<InputOutputError> for AttitudeError {
    fn from(source: InputOutputError) -> Self {
        Self::AttitudeIo { source }
    }
}

impl From<ConfigError> for AttitudeError {
    fn from(source: ConfigError) -> Self {
        Self::AttitudeConfig { source }
    }
}
