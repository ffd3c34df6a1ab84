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

use super::AdcModel;
use crate::attitude::{Orientation, PointingConstraints};
use crate::ephemeris::Ephemeris;
use crate::errors::{AttitudeError, EmptyTableSnafu};
use crate::slew::{AttitudeProfile, SlewLimits, TurnRequest};
use crate::time::{Duration, Epoch, TimeSeries};
use snafu::ensure;
use std::fmt;
use std::path::Path;

/// Below this quaternion dot product distance, interpolation falls back to a normalized linear interpolation.
const SLERP_EPSILON: f64 = 1e-9;

/// Attitude replayed from a precomputed table, for example the reference attitude of a past mission phase.
///
/// Between two samples, the attitude is spherically interpolated. Outside of the table, the attitude is not available.
#[derive(Clone, Debug, PartialEq)]
pub struct TabulatedAttitude {
    samples: Vec<(Epoch, Orientation)>,
    /// Sampling of the turn profiles extracted from this table
    pub sample_period: Duration,
}

impl TabulatedAttitude {
    pub fn new<I>(samples: I, sample_period: Duration) -> Result<Self, AttitudeError>
    where
        I: IntoIterator<Item = (Epoch, Orientation)>,
    {
        let mut samples: Vec<(Epoch, Orientation)> = samples.into_iter().collect();
        ensure!(!samples.is_empty(), EmptyTableSnafu);
        samples.sort_by_key(|(epoch, _)| *epoch);
        samples.dedup_by(|a, b| a.0 == b.0);
        Ok(Self {
            samples,
            sample_period,
        })
    }

    pub fn from_profile(
        profile: &AttitudeProfile,
        sample_period: Duration,
    ) -> Result<Self, AttitudeError> {
        Self::new(profile.iter().map(|(e, o)| (*e, *o)), sample_period)
    }

    /// Loads the table from a CSV file with the columns `epoch,w,x,y,z` and optionally `rate_x,rate_y,rate_z`.
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        sample_period: Duration,
    ) -> Result<Self, AttitudeError> {
        let profile = AttitudeProfile::from_csv(path)?;
        Self::from_profile(&profile, sample_period)
    }

    /// First epoch of the table
    pub fn start(&self) -> Epoch {
        self.samples[0].0
    }

    /// Last epoch of the table
    pub fn end(&self) -> Epoch {
        self.samples[self.samples.len() - 1].0
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Attitude at the provided epoch, interpolated between the surrounding samples.
    pub fn at(&self, epoch: Epoch) -> Result<Orientation, AttitudeError> {
        if epoch < self.start() || epoch > self.end() {
            return Err(AttitudeError::AttitudeUnavailable {
                epoch,
                start: self.start(),
                end: self.end(),
            });
        }

        match self.samples.binary_search_by(|(e, _)| e.cmp(&epoch)) {
            Ok(idx) => Ok(self.samples[idx].1),
            Err(idx) => {
                // Bounds were checked above, so the epoch is strictly between two samples
                let (before_epoch, before) = self.samples[idx - 1];
                let (after_epoch, after) = self.samples[idx];
                let fraction =
                    (epoch - before_epoch).to_seconds() / (after_epoch - before_epoch).to_seconds();

                let q0 = before.rotation();
                let q1 = after.rotation();
                let rotation = q0
                    .try_slerp(&q1, fraction, SLERP_EPSILON)
                    .unwrap_or_else(|| q0.nlerp(&q1, fraction));

                Ok(match (before.rate_rad_s(), after.rate_rad_s()) {
                    (Some(rate0), Some(rate1)) => {
                        Orientation::with_rate(rotation, rate0.lerp(&rate1, fraction))
                    }
                    _ => Orientation::new(rotation),
                })
            }
        }
    }
}

impl fmt::Display for TabulatedAttitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attitude table from {} to {} ({} samples)",
            self.start(),
            self.end(),
            self.len()
        )
    }
}

impl AdcModel for TabulatedAttitude {
    fn orientation_at(
        &self,
        epoch: Epoch,
        _constraints: &PointingConstraints,
        _ephem: &dyn Ephemeris,
    ) -> Result<Orientation, AttitudeError> {
        self.at(epoch)
    }

    fn turn_profile(
        &self,
        request: &TurnRequest,
        _ephem: &dyn Ephemeris,
    ) -> Result<AttitudeProfile, AttitudeError> {
        TimeSeries::inclusive(request.start, request.end(), self.sample_period)
            .map(|epoch| self.at(epoch).map(|orientation| (epoch, orientation)))
            .collect()
    }

    /// The table is already what it is.
    fn set_rate_and_accel_limits(&mut self, _limits: SlewLimits) {}
}
