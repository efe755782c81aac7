//! Tabulated sky emission for each named observing condition.

use std::collections::BTreeMap;
use std::sync::Arc;

use ndarray::Array1;

use super::grid::WavelengthGrid;
use crate::error::AtmosphereError;

/// Sky surface brightness (flux density per unit solid angle) keyed by
/// condition name, e.g. "dark", "gray" and "bright".
///
/// Every spectrum is sampled on the same wavelength grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyEmissionTable {
    grid: WavelengthGrid,
    spectra: BTreeMap<String, Arc<Array1<f64>>>,
}

impl SkyEmissionTable {
    /// Build the table, checking every spectrum against `grid`.
    pub fn new<I, K, V>(grid: &WavelengthGrid, spectra: I) -> Result<Self, AtmosphereError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Array1<f64>>,
    {
        let spectra = spectra
            .into_iter()
            .map(|(name, spectrum)| {
                let spectrum = spectrum.into();
                grid.check_aligned("surface brightness", spectrum.len())?;
                Ok((name.into(), Arc::new(spectrum)))
            })
            .collect::<Result<BTreeMap<String, _>, AtmosphereError>>()?;

        Ok(Self {
            grid: grid.clone(),
            spectra,
        })
    }

    /// The wavelength grid the spectra are sampled on.
    pub fn grid(&self) -> &WavelengthGrid {
        &self.grid
    }

    /// The configured condition names, sorted.
    pub fn condition_names(&self) -> Vec<String> {
        self.spectra.keys().cloned().collect()
    }

    /// Look up the surface brightness for a condition.
    pub fn get(&self, name: &str) -> Result<Arc<Array1<f64>>, AtmosphereError> {
        self.spectra
            .get(name)
            .cloned()
            .ok_or_else(|| AtmosphereError::InvalidCondition {
                name: name.to_string(),
                valid: self.condition_names(),
            })
    }
}
