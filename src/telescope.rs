//! Telescope description consumed alongside the atmosphere model.

use std::fmt;

use log::debug;

/// Every recognized telescope constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelescopeConstants {
    /// Effective collecting area of the primary mirror in m².
    pub effective_area_m2: f64,
    /// Plate scale at the focal plane in µm/arcsec.
    pub plate_scale_um_per_arcsec: f64,
    /// Diameter of a fiber entrance face in µm.
    pub fiber_diameter_um: f64,
}

/// A named telescope configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Telescope {
    /// Survey name, optionally followed by a size designation.
    pub name: String,
    /// Telescope constants.
    pub constants: TelescopeConstants,
}

impl Telescope {
    /// Name the telescope after its `survey`, plus a `size` designation if
    /// there is one.
    pub fn initialize(survey: &str, size: Option<&str>, constants: TelescopeConstants) -> Self {
        let name = match size {
            Some(size) if !size.is_empty() => format!("{survey} {size}"),
            _ => survey.to_string(),
        };
        debug!("initialized telescope '{name}'");

        Self { name, constants }
    }

    /// Area of a fiber entrance face projected on the sky, in arcsec².
    ///
    /// This is the `fiber_area` used by
    /// [`AtmosphereModel::propagate`](crate::AtmosphereModel::propagate) when
    /// the sky surface brightness is per arcsec².
    pub fn fiber_area_arcsec2(&self) -> f64 {
        let radius = 0.5 * self.constants.fiber_diameter_um
            / self.constants.plate_scale_um_per_arcsec;
        std::f64::consts::PI * radius * radius
    }
}

impl fmt::Display for Telescope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Telescope(name={})", self.name)
    }
}
