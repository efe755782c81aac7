//! The wavelength grid shared by every tabulated spectrum.

use std::cmp::Ordering;

use ndarray::{Array1, ArrayView1};

use crate::error::AtmosphereError;

/// Unit of the wavelength samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavelengthUnit {
    /// 1e-10 m
    Angstrom,
    /// 1e-9 m
    Nanometer,
    /// 1e-6 m
    Micron,
}

/// An ordered, strictly increasing set of wavelengths in a single unit.
///
/// All spectra used together in one model must be sampled on the same grid.
/// Resampling onto a common grid is the job of whatever loads the tables.
#[derive(Debug, Clone, PartialEq)]
pub struct WavelengthGrid {
    values: Array1<f64>,
    unit: WavelengthUnit,
}

impl WavelengthGrid {
    /// Wrap `values` as a grid, checking that it is non-empty and strictly
    /// increasing.
    pub fn new(
        values: impl Into<Array1<f64>>,
        unit: WavelengthUnit,
    ) -> Result<Self, AtmosphereError> {
        let values = values.into();
        if values.is_empty() {
            return Err(AtmosphereError::EmptyGrid);
        }
        // NaN samples are unordered, so they are rejected as well
        if let Some(index) = (1..values.len())
            .find(|&i| values[i].partial_cmp(&values[i - 1]) != Some(Ordering::Greater))
        {
            return Err(AtmosphereError::UnsortedGrid { index });
        }

        Ok(Self { values, unit })
    }

    /// Number of wavelength samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false, since an empty grid is rejected by [`WavelengthGrid::new`].
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The wavelength samples.
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// The unit of the wavelength samples.
    pub fn unit(&self) -> WavelengthUnit {
        self.unit
    }

    /// Check that a tabulated quantity has one sample per wavelength.
    pub(crate) fn check_aligned(
        &self,
        what: &'static str,
        found: usize,
    ) -> Result<(), AtmosphereError> {
        if found != self.len() {
            return Err(AtmosphereError::ConfigurationMismatch {
                what,
                expected: self.len(),
                found,
            });
        }
        Ok(())
    }
}
