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

use crate::attitude::Orientation;
use crate::io::{AttitudeRecord, CsvSnafu, InputOutputError, StdIOSnafu};
use crate::time::{Duration, Epoch};
use snafu::ResultExt;
use std::collections::btree_map::Iter;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Attitude samples sorted by epoch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttitudeProfile {
    samples: BTreeMap<Epoch, Orientation>,
}

impl AttitudeProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a sample, replacing any sample at the same epoch.
    pub fn insert(&mut self, epoch: Epoch, orientation: Orientation) {
        self.samples.insert(epoch, orientation);
    }

    pub fn get(&self, epoch: &Epoch) -> Option<&Orientation> {
        self.samples.get(epoch)
    }

    pub fn first(&self) -> Option<(Epoch, Orientation)> {
        self.samples.first_key_value().map(|(e, o)| (*e, *o))
    }

    pub fn last(&self) -> Option<(Epoch, Orientation)> {
        self.samples.last_key_value().map(|(e, o)| (*e, *o))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, Epoch, Orientation> {
        self.samples.iter()
    }

    pub fn epochs(&self) -> impl Iterator<Item = Epoch> + '_ {
        self.samples.keys().copied()
    }

    /// Time between the first and last samples.
    pub fn duration(&self) -> Duration {
        match (self.first(), self.last()) {
            (Some((first, _)), Some((last, _))) => last - first,
            _ => Duration::ZERO,
        }
    }

    /// Worst angle in degrees between the X, Y and Z body axes of both profiles, at the epochs they share.
    ///
    /// Returns None if the profiles have no epoch in common.
    pub fn max_axis_error_deg(&self, other: &Self) -> Option<[f64; 3]> {
        let mut worst: Option<[f64; 3]> = None;
        for (epoch, orientation) in &self.samples {
            if let Some(other_orientation) = other.samples.get(epoch) {
                let errors = orientation.axis_errors_deg(other_orientation);
                let max = worst.get_or_insert([0.0; 3]);
                for (max_i, error) in max.iter_mut().zip(errors) {
                    *max_i = max_i.max(error);
                }
            }
        }
        worst
    }

    /// Writes the profile as CSV with the columns `epoch,w,x,y,z,rate_x,rate_y,rate_z`.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), InputOutputError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let mut wtr = csv::Writer::from_path(&path).context(CsvSnafu {
            action: "creating attitude file",
            path: path_str.clone(),
        })?;

        for (epoch, orientation) in &self.samples {
            wtr.serialize(AttitudeRecord::new(*epoch, orientation))
                .context(CsvSnafu {
                    action: "writing attitude record to",
                    path: path_str.clone(),
                })?;
        }

        wtr.flush().context(StdIOSnafu {
            action: "flushing attitude file",
        })?;

        info!("attitude profile with {} samples written to {path_str}", self.len());
        Ok(())
    }

    /// Reads a profile from a CSV file written by [AttitudeProfile::to_csv].
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, InputOutputError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let mut rdr = csv::Reader::from_path(&path).context(CsvSnafu {
            action: "opening attitude file",
            path: path_str.clone(),
        })?;

        let mut profile = Self::new();
        for result in rdr.deserialize() {
            let record: AttitudeRecord = result.context(CsvSnafu {
                action: "reading attitude record from",
                path: path_str.clone(),
            })?;
            let (epoch, orientation) = record.into_sample();
            profile.insert(epoch, orientation);
        }

        debug!("read {} attitude samples from {path_str}", profile.len());
        Ok(profile)
    }
}

impl FromIterator<(Epoch, Orientation)> for AttitudeProfile {
    fn from_iter<T: IntoIterator<Item = (Epoch, Orientation)>>(iter: T) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AttitudeProfile {
    type Item = (&'a Epoch, &'a Orientation);
    type IntoIter = Iter<'a, Epoch, Orientation>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl fmt::Display for AttitudeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.first(), self.last()) {
            (Some((first, _)), Some((last, _))) => write!(
                f,
                "attitude profile from {first} to {last} ({} samples)",
                self.len()
            ),
            _ => write!(f, "empty attitude profile"),
        }
    }
}
