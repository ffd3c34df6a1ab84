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

use crate::errors::{AttitudeError, EphemerisUnavailableSnafu};
use crate::linalg::Vector3;
use crate::time::Epoch;
use anise::astro::Aberration;
use anise::constants::orientations::J2000;
use anise::errors::AlmanacError;
use anise::prelude::{Almanac, Frame};
use snafu::prelude::*;
use std::fmt;
use std::sync::Arc;

/// NAIF ID of a body or spacecraft.
pub type NaifId = i32;

/// Errors raised by an [Ephemeris] implementation.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EphemerisError {
    #[snafu(display("state of {target} relative to {observer} at {epoch}: {source}"))]
    AlmanacQuery {
        target: Frame,
        observer: Frame,
        epoch: Epoch,
        source: AlmanacError,
    },
    #[snafu(display("no ephemeris data for {target} relative to {observer} at {epoch}"))]
    NoEphemerisData {
        target: Frame,
        observer: Frame,
        epoch: Epoch,
    },
}

/// Position and velocity of a target relative to an observer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RelativeState {
    pub radius_km: Vector3<f64>,
    pub velocity_km_s: Vector3<f64>,
}

impl RelativeState {
    pub fn new(radius_km: Vector3<f64>, velocity_km_s: Vector3<f64>) -> Self {
        Self {
            radius_km,
            velocity_km_s,
        }
    }
}

/// The narrow ephemeris query surface consumed by the attitude solver.
///
/// Implementations return the state of `target` as seen from `observer` at `epoch`, expressed in the
/// orientation of the `observer` frame. Everything in this crate only reads from the ephemeris, so it
/// must be shareable between threads.
pub trait Ephemeris: Send + Sync {
    fn state(
        &self,
        target: Frame,
        observer: Frame,
        epoch: Epoch,
        ab_corr: Option<Aberration>,
    ) -> Result<RelativeState, EphemerisError>;
}

impl Ephemeris for Almanac {
    fn state(
        &self,
        target: Frame,
        observer: Frame,
        epoch: Epoch,
        ab_corr: Option<Aberration>,
    ) -> Result<RelativeState, EphemerisError> {
        let state = self
            .transform(target, observer, epoch, ab_corr)
            .context(AlmanacQuerySnafu {
                target,
                observer,
                epoch,
            })?;

        Ok(RelativeState::new(state.radius_km, state.velocity_km_s))
    }
}

impl<E: Ephemeris + ?Sized> Ephemeris for Arc<E> {
    fn state(
        &self,
        target: Frame,
        observer: Frame,
        epoch: Epoch,
        ab_corr: Option<Aberration>,
    ) -> Result<RelativeState, EphemerisError> {
        self.as_ref().state(target, observer, epoch, ab_corr)
    }
}

/// A body observed from another one, e.g. the Sun seen from the spacecraft.
#[derive(Copy, Clone, Debug)]
pub struct RelativeBody {
    pub target: Frame,
    pub observer: Frame,
    pub ab_corr: Option<Aberration>,
}

impl RelativeBody {
    /// Builds a relative body with the light time and stellar aberration correction ("LT+S").
    pub fn new(target: Frame, observer: Frame) -> Self {
        Self {
            target,
            observer,
            ab_corr: Aberration::LT_S,
        }
    }

    pub fn with_ab_corr(mut self, ab_corr: Option<Aberration>) -> Self {
        self.ab_corr = ab_corr;
        self
    }

    pub fn state(
        &self,
        epoch: Epoch,
        ephem: &dyn Ephemeris,
    ) -> Result<RelativeState, AttitudeError> {
        ephem
            .state(self.target, self.observer, epoch, self.ab_corr)
            .context(EphemerisUnavailableSnafu {
                action: "querying the state of a target body",
            })
    }
}

impl fmt::Display for RelativeBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.target, self.observer)
    }
}

/// Frame centered on the body or spacecraft with the provided NAIF ID, with the J2000 orientation.
pub fn j2000_frame(naif_id: NaifId) -> Frame {
    Frame::new(naif_id, J2000)
}

/// Bodies at fixed positions in an inertial frame, for tests.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub(crate) struct FixedEphemeris {
    bodies: std::collections::HashMap<NaifId, RelativeState>,
}

#[cfg(test)]
impl FixedEphemeris {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_body(
        mut self,
        id: NaifId,
        radius_km: Vector3<f64>,
        velocity_km_s: Vector3<f64>,
    ) -> Self {
        self.bodies
            .insert(id, RelativeState::new(radius_km, velocity_km_s));
        self
    }
}

#[cfg(test)]
impl Ephemeris for FixedEphemeris {
    fn state(
        &self,
        target: Frame,
        observer: Frame,
        epoch: Epoch,
        _ab_corr: Option<Aberration>,
    ) -> Result<RelativeState, EphemerisError> {
        match (
            self.bodies.get(&target.ephemeris_id),
            self.bodies.get(&observer.ephemeris_id),
        ) {
            (Some(tgt), Some(obs)) => Ok(RelativeState::new(
                tgt.radius_km - obs.radius_km,
                tgt.velocity_km_s - obs.velocity_km_s,
            )),
            _ => Err(EphemerisError::NoEphemerisData {
                target,
                observer,
                epoch,
            }),
        }
    }
}
