//! Scattered moonlight.
//!
//! [`MoonGeometry`] holds the lunar configuration of an atmosphere model. The
//! analytic V-band model in [`krisciunas_schaefer`] is not yet folded into
//! the sky emission spectrum; it can be evaluated on its own, or for the
//! stored geometry with [`MoonGeometry::vband_surface_brightness`].

mod broadcast;
mod scattering;


use std::sync::Arc;

use ndarray::{Array1, ArrayView1};

pub use self::scattering::{
    krisciunas_schaefer, krisciunas_schaefer_scalar, lunar_sky_map, LunarSkyMap,
    DEFAULT_VBAND_EXTINCTION,
};
use crate::atmosphere::ExtinctionModel;
use crate::error::AtmosphereError;

/// Position and phase of the moon relative to an observation.
///
/// This is a plain container: the geometry is only checked when it is fed to
/// the lunar brightness model. All angles are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct MoonGeometry {
    /// Flux spectrum of the moon, on the atmosphere's wavelength grid.
    spectrum: Array1<f64>,
    /// The atmosphere's zenith extinction coefficient.
    extinction_coefficient: Arc<Array1<f64>>,
    /// Phase from 0 (full) to 1 (new).
    moon_phase: f64,
    /// Zenith angle of the moon.
    moon_zenith: f64,
    /// Zenith angle of the observation.
    observation_zenith: f64,
    /// Opening angle between the observation and the moon.
    separation_angle: f64,
}

impl MoonGeometry {
    /// Create the geometry, sharing the extinction table of `extinction`.
    pub fn new(
        spectrum: impl Into<Array1<f64>>,
        extinction: &ExtinctionModel,
        moon_phase: f64,
        moon_zenith: f64,
        observation_zenith: f64,
        separation_angle: f64,
    ) -> Self {
        Self {
            spectrum: spectrum.into(),
            extinction_coefficient: extinction.shared(),
            moon_phase,
            moon_zenith,
            observation_zenith,
            separation_angle,
        }
    }

    /// Replace all four geometric parameters at once.
    pub fn update(
        &mut self,
        moon_phase: f64,
        moon_zenith: f64,
        observation_zenith: f64,
        separation_angle: f64,
    ) {
        self.moon_phase = moon_phase;
        self.moon_zenith = moon_zenith;
        self.observation_zenith = observation_zenith;
        self.separation_angle = separation_angle;
    }

    /// Flux spectrum of the moon.
    pub fn spectrum(&self) -> ArrayView1<'_, f64> {
        self.spectrum.view()
    }

    /// Zenith extinction coefficient shared with the atmosphere.
    pub fn extinction_coefficient(&self) -> ArrayView1<'_, f64> {
        self.extinction_coefficient.view()
    }

    /// Phase from 0 (full) to 1 (new).
    pub fn moon_phase(&self) -> f64 {
        self.moon_phase
    }

    /// Zenith angle of the moon in degrees.
    pub fn moon_zenith(&self) -> f64 {
        self.moon_zenith
    }

    /// Zenith angle of the observation in degrees.
    pub fn observation_zenith(&self) -> f64 {
        self.observation_zenith
    }

    /// Separation between the observation and the moon in degrees.
    pub fn separation_angle(&self) -> f64 {
        self.separation_angle
    }

    /// V-band surface brightness of scattered moonlight for this geometry, in
    /// mag/arcsec².
    pub fn vband_surface_brightness(
        &self,
        vband_extinction: f64,
    ) -> Result<f64, AtmosphereError> {
        krisciunas_schaefer_scalar(
            self.observation_zenith,
            self.moon_zenith,
            self.separation_angle,
            self.moon_phase,
            vband_extinction,
        )
    }
}
