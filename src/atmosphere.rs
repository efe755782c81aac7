//! Atmospheric emission and absorption for spectroscopic simulations.
//!
//! The atmosphere model computes the spectral flux density arriving at the
//! telescope for a source flux entering the atmosphere. If emission is not
//! extinguished, this is
//!
//! ```text
//! f(λ) = 10^(-e(λ) X / 2.5) s(λ) + a b(λ)
//! ```
//!
//! and otherwise
//!
//! ```text
//! f(λ) = 10^(-e(λ) X / 2.5) [s(λ) + a b(λ)]
//! ```
//!
//! where `s(λ)` is the source flux entering the atmosphere, `e(λ)` is the
//! zenith extinction, `X` is the airmass, `a` is the fiber entrance face area,
//! and `b(λ)` is the sky emission surface brightness.

mod extinction;
mod grid;
mod sky;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;

pub use self::extinction::ExtinctionModel;
pub use self::grid::{WavelengthGrid, WavelengthUnit};
pub use self::sky::SkyEmissionTable;
use crate::error::AtmosphereError;
use crate::moon::MoonGeometry;

/// Atmosphere model based on tabulated extinction and sky emission.
///
/// The setters take `&mut self`, so a model can't change while it is being
/// used to propagate flux. Use [`AtmosphereModel::with_condition`] and
/// [`AtmosphereModel::with_airmass`] to derive a new model instead.
#[derive(Debug, Clone)]
pub struct AtmosphereModel {
    wavelength: WavelengthGrid,
    surface_brightness_table: SkyEmissionTable,
    extinction_coefficient: ExtinctionModel,
    /// Whether the sky emission is extinguished along with the source.
    extinct_emission: bool,
    moon: Option<MoonGeometry>,

    /// Name of the active sky condition.
    condition: String,
    /// Surface brightness of the active sky condition.
    surface_brightness: Arc<Array1<f64>>,
    airmass: f64,
    /// Transmission at the current airmass, aka the extinction factor.
    extinction: Array1<f64>,
}

impl AtmosphereModel {
    /// Create a model for the given condition and airmass.
    ///
    /// Both tables must be sampled on `wavelength`, as must the moon
    /// spectrum if there is one.
    pub fn new(
        wavelength: WavelengthGrid,
        surface_brightness_table: SkyEmissionTable,
        extinction_coefficient: ExtinctionModel,
        extinct_emission: bool,
        condition: &str,
        airmass: f64,
        moon: Option<MoonGeometry>,
    ) -> Result<Self, AtmosphereError> {
        if surface_brightness_table.grid() != &wavelength {
            return Err(AtmosphereError::GridMismatch {
                what: "surface brightness",
            });
        }
        if extinction_coefficient.grid() != &wavelength {
            return Err(AtmosphereError::GridMismatch {
                what: "extinction coefficient",
            });
        }
        if let Some(moon) = &moon {
            wavelength.check_aligned("moon spectrum", moon.spectrum().len())?;
        }

        let surface_brightness = surface_brightness_table.get(condition)?;
        let extinction = extinction_coefficient.transmission(airmass);

        Ok(Self {
            wavelength,
            surface_brightness_table,
            extinction_coefficient,
            extinct_emission,
            moon,
            condition: condition.to_string(),
            surface_brightness,
            airmass,
            extinction,
        })
    }

    /// Select the active sky condition.
    ///
    /// On error, the model is left unchanged and the error lists the valid
    /// condition names.
    pub fn set_condition(&mut self, name: &str) -> Result<(), AtmosphereError> {
        self.surface_brightness = self.surface_brightness_table.get(name)?;
        self.condition = name.to_string();
        debug!("atmosphere condition set to '{name}'");
        Ok(())
    }

    /// Set the airmass and recompute the transmission curve.
    ///
    /// No range check is done; physically the airmass is at least 1.
    pub fn set_airmass(&mut self, airmass: f64) {
        self.airmass = airmass;
        self.extinction = self.extinction_coefficient.transmission(airmass);
        debug!("atmosphere airmass set to {airmass}");
    }

    /// A copy of this model with a different sky condition.
    pub fn with_condition(mut self, name: &str) -> Result<Self, AtmosphereError> {
        self.set_condition(name)?;
        Ok(self)
    }

    /// A copy of this model at a different airmass.
    pub fn with_airmass(mut self, airmass: f64) -> Self {
        self.set_airmass(airmass);
        self
    }

    /// Propagate a source flux through the atmosphere and into a fiber.
    ///
    /// `source_flux` is the flux density entering the atmosphere, sampled on
    /// the model's wavelength grid, and `fiber_area` is the fiber entrance
    /// face area, in the solid angle units of the surface brightness.
    pub fn propagate(
        &self,
        source_flux: ArrayView1<'_, f64>,
        fiber_area: f64,
    ) -> Result<Array1<f64>, AtmosphereError> {
        self.wavelength.check_aligned("source flux", source_flux.len())?;

        let mut sky = &*self.surface_brightness * fiber_area;
        if self.extinct_emission {
            sky *= &self.extinction;
        }
        Ok(sky + &source_flux * &self.extinction)
    }

    /// Propagate many source fluxes at once.
    ///
    /// Each row of `source_fluxes` is a spectrum on the model's wavelength
    /// grid. The rows are processed in parallel on the current rayon thread
    /// pool, and the output has the same shape as the input.
    pub fn propagate_batch(
        &self,
        source_fluxes: ArrayView2<'_, f64>,
        fiber_area: f64,
    ) -> Result<Array2<f64>, AtmosphereError> {
        self.wavelength.check_aligned("source flux", source_fluxes.ncols())?;
        debug!(
            "propagating {} source spectra through the atmosphere",
            source_fluxes.nrows()
        );

        let results = (0..source_fluxes.nrows())
            .into_par_iter()
            .map(|index| self.propagate(source_fluxes.row(index), fiber_area))
            .collect::<Result<Vec<_>, _>>()?;

        let mut output = Array2::zeros(source_fluxes.raw_dim());
        output
            .rows_mut()
            .into_iter()
            .zip(&results)
            .for_each(|(mut row, flux)| row.assign(flux));

        Ok(output)
    }

    /// The wavelength grid of every spectrum in the model.
    pub fn wavelength(&self) -> &WavelengthGrid {
        &self.wavelength
    }

    /// Name of the active sky condition.
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// All configured sky condition names, sorted.
    pub fn condition_names(&self) -> Vec<String> {
        self.surface_brightness_table.condition_names()
    }

    /// Surface brightness of the active sky condition.
    pub fn surface_brightness(&self) -> ArrayView1<'_, f64> {
        self.surface_brightness.view()
    }

    /// Current airmass.
    pub fn airmass(&self) -> f64 {
        self.airmass
    }

    /// Transmission at the current airmass.
    pub fn extinction(&self) -> ArrayView1<'_, f64> {
        self.extinction.view()
    }

    /// Zenith extinction coefficient.
    pub fn extinction_coefficient(&self) -> ArrayView1<'_, f64> {
        self.extinction_coefficient.coefficient()
    }

    /// Whether sky emission is extinguished along with the source.
    pub fn extinct_emission(&self) -> bool {
        self.extinct_emission
    }

    /// The lunar geometry, if a moon is configured.
    pub fn moon(&self) -> Option<&MoonGeometry> {
        self.moon.as_ref()
    }

    /// Mutable access to the lunar geometry, e.g. to
    /// [update](MoonGeometry::update) it.
    pub fn moon_mut(&mut self) -> Option<&mut MoonGeometry> {
        self.moon.as_mut()
    }
}

/// Configuration constants for an atmosphere model.
#[derive(Debug, Clone, PartialEq)]
pub struct AtmosphereConfig {
    /// Extinguish the sky emission along with the source flux.
    pub extinct_emission: bool,
    /// Initial sky condition name.
    pub condition: String,
    /// Initial airmass.
    pub airmass: f64,
    /// Optional lunar scattering geometry.
    pub moon: Option<MoonConfig>,
}

/// Configuration constants for the lunar geometry. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonConfig {
    /// Phase from 0 (full) to 1 (new).
    pub moon_phase: f64,
    /// Zenith angle of the moon.
    pub moon_zenith: f64,
    /// Zenith angle of the observation.
    pub observation_zenith: f64,
    /// Opening angle between the observation and the moon.
    pub separation_angle: f64,
}

/// Tabulated data for an atmosphere model, already resampled onto a common
/// wavelength grid.
#[derive(Debug, Clone)]
pub struct AtmosphereTables {
    /// Common wavelength grid.
    pub wavelength: WavelengthGrid,
    /// Sky surface brightness for each condition.
    pub surface_brightness: SkyEmissionTable,
    /// Zenith extinction coefficient.
    pub extinction_coefficient: ExtinctionModel,
    /// Flux spectrum of the moon, required when a moon is configured.
    pub moon_spectrum: Option<Array1<f64>>,
}

/// Initialize an atmosphere model from configuration constants and loaded
/// tables.
pub fn initialize(
    config: &AtmosphereConfig,
    tables: AtmosphereTables,
) -> Result<AtmosphereModel, AtmosphereError> {
    let AtmosphereTables {
        wavelength,
        surface_brightness,
        extinction_coefficient,
        moon_spectrum,
    } = tables;

    // The lunar scattering model is optional
    let moon = match (&config.moon, moon_spectrum) {
        (Some(c), Some(spectrum)) => Some(MoonGeometry::new(
            spectrum,
            &extinction_coefficient,
            c.moon_phase,
            c.moon_zenith,
            c.observation_zenith,
            c.separation_angle,
        )),
        (Some(_), None) => return Err(AtmosphereError::MissingMoonSpectrum),
        (None, _) => None,
    };

    let atmosphere = AtmosphereModel::new(
        wavelength,
        surface_brightness,
        extinction_coefficient,
        config.extinct_emission,
        &config.condition,
        config.airmass,
        moon,
    )?;

    info!(
        "Atmosphere initialized with condition '{}' from {:?}",
        atmosphere.condition(),
        atmosphere.condition_names()
    );

    Ok(atmosphere)
}
