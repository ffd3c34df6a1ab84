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

/*! # nyx-attitude

Spacecraft attitude solving and slew profile generation.

The [attitude::AttitudeSolver] computes the orientation meeting a primary pointing constraint exactly and a
secondary one as closely as possible. The slew generators of [slew] produce the attitude samples of a turn from
one set of constraints to another under per axis rate and acceleration limits, either from rest
([slew::NoRateMatchSlew]) or first cancelling the rate difference with the end constraints
([slew::RateMatchSlew]). All of them, and the precomputed [adc::TabulatedAttitude], implement [adc::AdcModel].

Ephemerides are provided by anything implementing [ephemeris::Ephemeris], notably ANISE's `Almanac`.
*/

/// Attitude determination and control models.
pub mod adc;

/// Orientations, observers, pointing targets and the attitude solver.
pub mod attitude;

/// Queries of the relative states of bodies and spacecraft.
pub mod ephemeris;

mod errors;
/// Functions which may fail return an error instead of panicking.
pub use self::errors::AttitudeError;

/// Configuration files and attitude tables.
pub mod io;

/// Turn profiles between two sets of pointing constraints.
pub mod slew;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
    pub use na::geometry::{Quaternion, UnitQuaternion};
}

pub use self::adc::AdcModel;
pub use self::attitude::{AttitudeSolver, Observer, Orientation, PointingConstraints, Target};
