//! Zenith extinction and the airmass transmission curve.

use std::sync::Arc;

use ndarray::{Array1, ArrayView1};

use super::grid::WavelengthGrid;
use crate::error::AtmosphereError;

/// Tabulated zenith extinction coefficient, in magnitudes per unit airmass.
///
/// The coefficients are immutable once loaded and cheap to clone, so a lunar
/// model can keep a handle to the same table as the atmosphere.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtinctionModel {
    grid: WavelengthGrid,
    coefficient: Arc<Array1<f64>>,
}

impl ExtinctionModel {
    /// Wrap the tabulated coefficient `e(λ)`, which must have one sample per
    /// wavelength of `grid`.
    pub fn new(
        grid: &WavelengthGrid,
        coefficient: impl Into<Array1<f64>>,
    ) -> Result<Self, AtmosphereError> {
        let coefficient = coefficient.into();
        grid.check_aligned("extinction coefficient", coefficient.len())?;

        Ok(Self {
            grid: grid.clone(),
            coefficient: Arc::new(coefficient),
        })
    }

    /// The wavelength grid the coefficient is sampled on.
    pub fn grid(&self) -> &WavelengthGrid {
        &self.grid
    }

    /// The zenith extinction coefficient `e(λ)`.
    pub fn coefficient(&self) -> ArrayView1<'_, f64> {
        self.coefficient.view()
    }

    /// A shared handle to the coefficient table.
    pub(crate) fn shared(&self) -> Arc<Array1<f64>> {
        Arc::clone(&self.coefficient)
    }

    /// Transmission through `airmass` atmospheres: `10^(-e(λ) X / 2.5)`.
    ///
    /// Any real airmass is accepted. For `e(λ) ≥ 0` and `X ≥ 0` the result is
    /// in (0, 1], and exactly 1 at zero airmass.
    pub fn transmission(&self, airmass: f64) -> Array1<f64> {
        self.coefficient.mapv(|e| 10_f64.powf(-e * airmass / 2.5))
    }
}
