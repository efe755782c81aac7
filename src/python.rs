//! Python interface
//!
//! NOTE: this module is intended for the interface between Rust and Python. The
//! real work happens in the other modules, and they do not use `pyo3`, its
//! only used here.

use std::collections::HashMap;

use log::{debug, info};
use numpy::prelude::*;
use numpy::{
    PyArray1, PyArray2, PyArrayDyn, PyReadonlyArray1, PyReadonlyArray2, PyReadonlyArrayDyn,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::atmosphere::{
    AtmosphereModel, ExtinctionModel, SkyEmissionTable, WavelengthGrid, WavelengthUnit,
};
use crate::error::AtmosphereError;
use crate::moon::{self, MoonGeometry, DEFAULT_VBAND_EXTINCTION};

impl From<AtmosphereError> for PyErr {
    fn from(e: AtmosphereError) -> Self {
        PyValueError::new_err(e.to_string())
    }
}

/// Parse an astropy-style wavelength unit name.
fn parse_unit(unit: &str) -> PyResult<WavelengthUnit> {
    match unit {
        "Angstrom" | "angstrom" | "AA" => Ok(WavelengthUnit::Angstrom),
        "nm" | "nanometer" => Ok(WavelengthUnit::Nanometer),
        "um" | "micron" => Ok(WavelengthUnit::Micron),
        _ => Err(PyValueError::new_err(format!(
            "unknown wavelength unit '{unit}'"
        ))),
    }
}

/// Atmosphere model based on tabulated data.
///
/// `wavelength` is the common wavelength grid in `wavelength_unit`,
/// `surface_brightness` is a dict of sky surface brightness arrays keyed by
/// condition name, and `extinction_coefficient` is the zenith extinction. The
/// optional `moon` is a tuple (`spectrum`, `moon_phase`, `moon_zenith`,
/// `observation_zenith`, `separation_angle`), with angles in degrees.
#[pyclass(name = "Atmosphere")]
struct PyAtmosphere {
    inner: AtmosphereModel,
}

#[pymethods]
impl PyAtmosphere {
    #[new]
    #[pyo3(signature = (wavelength, surface_brightness, extinction_coefficient, extinct_emission, condition, airmass, wavelength_unit="Angstrom", moon=None))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        wavelength: PyReadonlyArray1<'_, f64>,
        surface_brightness: HashMap<String, PyReadonlyArray1<'_, f64>>,
        extinction_coefficient: PyReadonlyArray1<'_, f64>,
        extinct_emission: bool,
        condition: &str,
        airmass: f64,
        wavelength_unit: &str,
        moon: Option<(PyReadonlyArray1<'_, f64>, f64, f64, f64, f64)>,
    ) -> PyResult<Self> {
        let wavelength = WavelengthGrid::new(
            wavelength.as_array().to_owned(),
            parse_unit(wavelength_unit)?,
        )?;
        let surface_brightness = SkyEmissionTable::new(
            &wavelength,
            surface_brightness
                .iter()
                .map(|(name, spectrum)| (name.as_str(), spectrum.as_array().to_owned())),
        )?;
        let extinction_coefficient =
            ExtinctionModel::new(&wavelength, extinction_coefficient.as_array().to_owned())?;

        let moon = moon.map(
            |(spectrum, moon_phase, moon_zenith, observation_zenith, separation_angle)| {
                MoonGeometry::new(
                    spectrum.as_array().to_owned(),
                    &extinction_coefficient,
                    moon_phase,
                    moon_zenith,
                    observation_zenith,
                    separation_angle,
                )
            },
        );

        let inner = AtmosphereModel::new(
            wavelength,
            surface_brightness,
            extinction_coefficient,
            extinct_emission,
            condition,
            airmass,
            moon,
        )?;
        info!(
            "Atmosphere initialized with condition '{}' from {:?}",
            inner.condition(),
            inner.condition_names()
        );

        Ok(Self { inner })
    }

    fn set_condition(&mut self, name: &str) -> PyResult<()> {
        Ok(self.inner.set_condition(name)?)
    }

    fn set_airmass(&mut self, airmass: f64) {
        self.inner.set_airmass(airmass);
    }

    /// Replace the lunar geometry. Angles are in degrees.
    fn update_moon(
        &mut self,
        moon_phase: f64,
        moon_zenith: f64,
        observation_zenith: f64,
        separation_angle: f64,
    ) -> PyResult<()> {
        let moon = self
            .inner
            .moon_mut()
            .ok_or_else(|| PyValueError::new_err("no moon is configured"))?;
        moon.update(moon_phase, moon_zenith, observation_zenith, separation_angle);
        Ok(())
    }

    /// Scattered moonlight V-band surface brightness in mag/arcsec² for the
    /// configured geometry, or `None` without a moon.
    #[pyo3(signature = (vband_extinction=DEFAULT_VBAND_EXTINCTION))]
    fn moon_brightness(&self, vband_extinction: f64) -> PyResult<Option<f64>> {
        self.inner
            .moon()
            .map(|moon| moon.vband_surface_brightness(vband_extinction))
            .transpose()
            .map_err(PyErr::from)
    }

    /// Propagate a source flux through the atmosphere and into a fiber.
    fn propagate<'py>(
        &self,
        py: Python<'py>,
        source_flux: PyReadonlyArray1<'py, f64>,
        fiber_area: f64,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let flux = self.inner.propagate(source_flux.as_array(), fiber_area)?;
        Ok(flux.into_pyarray(py))
    }

    /// Propagate many source fluxes, one per row of `source_fluxes`.
    ///
    /// The number of worker threads is controlled by `num_threads`. It must be
    /// a positive integer, or `None` to automatically choose the number of
    /// threads.
    #[pyo3(signature = (source_fluxes, fiber_area, num_threads=None))]
    fn propagate_batch<'py>(
        &self,
        py: Python<'py>,
        source_fluxes: PyReadonlyArray2<'py, f64>,
        fiber_area: f64,
        num_threads: Option<usize>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads.unwrap_or(0))
            .build()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        let source_fluxes = source_fluxes.as_array();
        info!(
            "Propagating {} source spectra on {} threads",
            source_fluxes.nrows(),
            pool.current_num_threads()
        );

        let flux = py.allow_threads(|| {
            pool.install(|| self.inner.propagate_batch(source_fluxes, fiber_area))
        })?;
        debug!("copying propagated flux");

        Ok(flux.into_pyarray(py))
    }

    #[getter]
    fn condition(&self) -> String {
        self.inner.condition().to_string()
    }

    #[getter]
    fn condition_names(&self) -> Vec<String> {
        self.inner.condition_names()
    }

    #[getter]
    fn airmass(&self) -> f64 {
        self.inner.airmass()
    }

    #[getter]
    fn extinct_emission(&self) -> bool {
        self.inner.extinct_emission()
    }

    #[getter]
    fn wavelength<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.wavelength().values().to_pyarray(py)
    }

    #[getter]
    fn surface_brightness<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.surface_brightness().to_pyarray(py)
    }

    #[getter]
    fn extinction<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.extinction().to_pyarray(py)
    }

    #[getter]
    fn extinction_coefficient<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.extinction_coefficient().to_pyarray(py)
    }
}

/// Scattered moonlight surface brightness in V band, in mag/arcsec².
///
/// All inputs are numpy arrays (0-d for scalars) that broadcast together.
/// Angles are in degrees and `moon_phase` runs from 0 (full) to 1 (new).
#[pyfunction]
fn krisciunas_schaefer<'py>(
    py: Python<'py>,
    obs_zenith: PyReadonlyArrayDyn<'py, f64>,
    moon_zenith: PyReadonlyArrayDyn<'py, f64>,
    separation_angle: PyReadonlyArrayDyn<'py, f64>,
    moon_phase: PyReadonlyArrayDyn<'py, f64>,
    vband_extinction: PyReadonlyArrayDyn<'py, f64>,
) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
    let brightness = moon::krisciunas_schaefer(
        obs_zenith.as_array(),
        moon_zenith.as_array(),
        separation_angle.as_array(),
        moon_phase.as_array(),
        vband_extinction.as_array(),
    )?;
    Ok(brightness.into_pyarray(py))
}

/// Evaluate the scattered moonlight model on a polar grid of pointings.
///
/// Returns the tuple (`zenith`, `azimuth`, `brightness`), where `brightness`
/// is dimensioned as (`ngrid` azimuths, `ngrid` zenith angles).
#[pyfunction]
#[pyo3(signature = (moon_zenith, moon_azimuth, moon_phase, vband_extinction=DEFAULT_VBAND_EXTINCTION, ngrid=250))]
#[allow(clippy::type_complexity)]
fn lunar_sky_map<'py>(
    py: Python<'py>,
    moon_zenith: f64,
    moon_azimuth: f64,
    moon_phase: f64,
    vband_extinction: f64,
    ngrid: usize,
) -> PyResult<(
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray2<f64>>,
)> {
    let map = moon::lunar_sky_map(moon_zenith, moon_azimuth, moon_phase, vband_extinction, ngrid)?;
    Ok((
        map.zenith.into_pyarray(py),
        map.azimuth.into_pyarray(py),
        map.brightness.into_pyarray(py),
    ))
}

/// A Python module implemented in Rust.
#[pymodule]
fn specsim_atmos(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_function(wrap_pyfunction!(krisciunas_schaefer, m)?)?;
    m.add_function(wrap_pyfunction!(lunar_sky_map, m)?)?;
    m.add_class::<PyAtmosphere>()?;
    Ok(())
}
