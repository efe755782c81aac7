//! Atmosphere model for spectroscopic simulations
//!
//! Computes the spectral flux density arriving at a telescope fiber from a
//! source flux entering the atmosphere, combining extinguished source light
//! with sky emission. See [`atmosphere`] for the model and [`moon`] for the
//! scattered moonlight model.
//!
//! NOTE: the Python bindings live in `python` and are only built with the
//! `python` feature. The other modules do not use `pyo3`.

pub mod atmosphere;
pub mod error;
pub mod moon;
pub mod telescope;

#[cfg(feature = "python")]
mod python;

pub use atmosphere::{
    initialize, AtmosphereConfig, AtmosphereModel, AtmosphereTables, ExtinctionModel, MoonConfig,
    SkyEmissionTable, WavelengthGrid, WavelengthUnit,
};
pub use error::AtmosphereError;
pub use moon::{
    krisciunas_schaefer, krisciunas_schaefer_scalar, lunar_sky_map, LunarSkyMap, MoonGeometry,
    DEFAULT_VBAND_EXTINCTION,
};
pub use telescope::{Telescope, TelescopeConstants};
