//! Krisciunas & Schaefer model of the brightness of scattered moonlight.
//!
//! From Krisciunas and Schaefer, "A model of the brightness of moonlight",
//! PASP, vol. 103, Sept. 1991, p. 1033-1039
//! (<http://dx.doi.org/10.1086/132921>). Equation numbers refer to this
//! paper. The authors find agreement with data at the 8% - 23% level.
//!
//! All angles are in degrees.

use log::debug;
use ndarray::{arr0, Array1, Array2, ArrayD, ArrayViewD, Ix2, Zip};

use super::broadcast::{broadcast_shape, broadcast_to};
use crate::error::AtmosphereError;

/// V-band zenith extinction coefficient to use when nothing better is known.
pub const DEFAULT_VBAND_EXTINCTION: f64 = 0.162;

/// Scattered moonlight surface brightness in V band, in mag/arcsec².
///
/// Each input may have any shape as long as they all broadcast together
/// (NumPy rules); the output has the broadcast shape.
///
/// `obs_zenith` is the zenith angle of the observation, `moon_zenith` the
/// zenith angle of the moon and `separation_angle` the opening angle between
/// the two. `moon_phase` runs from 0 (full) to 1 (new), which can be
/// calculated as `|d / D - 1|` where `d` is the time since the last new moon
/// and `D = 29.5` days. `vband_extinction` is the V-band extinction
/// coefficient.
///
/// The whole call fails if any phase is outside [0, 1], or if the scattered
/// brightness is not positive for any element (e.g. zero extinction), since
/// it then has no magnitude.
pub fn krisciunas_schaefer(
    obs_zenith: ArrayViewD<'_, f64>,
    moon_zenith: ArrayViewD<'_, f64>,
    separation_angle: ArrayViewD<'_, f64>,
    moon_phase: ArrayViewD<'_, f64>,
    vband_extinction: ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>, AtmosphereError> {
    check_phase(moon_phase.iter())?;

    let shape = broadcast_shape(&[
        obs_zenith.shape(),
        moon_zenith.shape(),
        separation_angle.shape(),
        moon_phase.shape(),
        vband_extinction.shape(),
    ])?;
    debug!("lunar brightness inputs broadcast to {shape:?}");

    let mut brightness = ArrayD::zeros(shape.as_slice());
    Zip::from(&mut brightness)
        .and(broadcast_to(&obs_zenith, &shape)?)
        .and(broadcast_to(&moon_zenith, &shape)?)
        .and(broadcast_to(&separation_angle, &shape)?)
        .and(broadcast_to(&moon_phase, &shape)?)
        .and(broadcast_to(&vband_extinction, &shape)?)
        .for_each(|b, &obs, &moon, &sep, &phase, &k| {
            *b = scattered_brightness(obs, moon, sep, phase, k);
        });

    let count = brightness.iter().filter(|&&b| !in_domain(b)).count();
    if count > 0 {
        return Err(AtmosphereError::UndefinedBrightness { count });
    }

    Ok(brightness.mapv_into(nanolamberts_to_mag))
}

/// Single-pointing version of [`krisciunas_schaefer`].
pub fn krisciunas_schaefer_scalar(
    obs_zenith: f64,
    moon_zenith: f64,
    separation_angle: f64,
    moon_phase: f64,
    vband_extinction: f64,
) -> Result<f64, AtmosphereError> {
    check_phase(std::iter::once(&moon_phase))?;

    let b_moon = scattered_brightness(
        obs_zenith,
        moon_zenith,
        separation_angle,
        moon_phase,
        vband_extinction,
    );
    if !in_domain(b_moon) {
        return Err(AtmosphereError::UndefinedBrightness { count: 1 });
    }

    Ok(nanolamberts_to_mag(b_moon))
}

/// Scattered moonlight evaluated over a polar grid of observation pointings.
#[derive(Debug, Clone)]
pub struct LunarSkyMap {
    /// Observation zenith angles in degrees, with length `ngrid`.
    pub zenith: Array1<f64>,
    /// Observation azimuths in degrees, measured clockwise from North, with
    /// length `ngrid`.
    pub azimuth: Array1<f64>,
    /// V-band brightness in mag/arcsec², dimensioned as (`azimuth`,
    /// `zenith`).
    pub brightness: Array2<f64>,
}

/// Evaluate [`krisciunas_schaefer`] on an `ngrid` x `ngrid` grid of
/// observation pointings for a fixed moon position and phase.
///
/// Zenith angles cover [0°, 90°) and azimuths cover [0°, 360°]. The azimuth
/// of the moon, `moon_azimuth`, is measured clockwise from North.
pub fn lunar_sky_map(
    moon_zenith: f64,
    moon_azimuth: f64,
    moon_phase: f64,
    vband_extinction: f64,
    ngrid: usize,
) -> Result<LunarSkyMap, AtmosphereError> {
    let zenith: Array1<f64> = (0..ngrid)
        .map(|i| 90. * i as f64 / ngrid as f64)
        .collect();
    let azimuth = Array1::linspace(0., 360., ngrid);

    let (sin_zm, cos_zm) = moon_zenith.to_radians().sin_cos();
    let separation = Array2::from_shape_fn((ngrid, ngrid), |(i, j)| {
        let (sin_zo, cos_zo) = zenith[j].to_radians().sin_cos();
        let cos_daz = (moon_azimuth - azimuth[i]).to_radians().cos();
        let cos_sep = cos_zm * cos_zo + cos_daz * sin_zm * sin_zo;
        cos_sep.clamp(-1., 1.).acos().to_degrees()
    });

    let brightness = krisciunas_schaefer(
        zenith.view().into_dyn(),
        arr0(moon_zenith).into_dyn().view(),
        separation.view().into_dyn(),
        arr0(moon_phase).into_dyn().view(),
        arr0(vband_extinction).into_dyn().view(),
    )?
    .into_dimensionality::<Ix2>()
    .or(Err(AtmosphereError::IncompatibleShapes))?;

    Ok(LunarSkyMap {
        zenith,
        azimuth,
        brightness,
    })
}

/// Reject the call if any phase is outside of [0, 1].
fn check_phase<'a>(phases: impl Iterator<Item = &'a f64>) -> Result<(), AtmosphereError> {
    let values: Vec<f64> = phases
        .copied()
        .filter(|phase| !(0.0..=1.0).contains(phase))
        .collect();
    if !values.is_empty() {
        return Err(AtmosphereError::InvalidPhase { values });
    }
    Ok(())
}

/// Whether a brightness in nanoLamberts can be converted to a magnitude.
fn in_domain(b_moon: f64) -> bool {
    b_moon.is_finite() && b_moon > 0.
}

/// Scattered moonlight surface brightness in V band, in nanoLamberts.
fn scattered_brightness(
    obs_zenith: f64,
    moon_zenith: f64,
    separation_angle: f64,
    moon_phase: f64,
    vband_extinction: f64,
) -> f64 {
    // V-band magnitude of the moon (eqn. 9)
    let abs_alpha = 180. * moon_phase;
    let m = -12.73 + 0.026 * abs_alpha + 4e-9 * abs_alpha.powi(4);

    // Illuminance of the moon outside the atmosphere in foot-candles (eqn. 8)
    let istar = 10_f64.powf(-0.4 * (m + 16.57));

    // Scattering function (eqn. 21)
    let rho = separation_angle;
    let f_scatter = 10_f64.powf(5.36) * (1.06 + separation_angle.to_radians().cos().powi(2))
        + 10_f64.powf(6.15 - rho / 40.);

    // Scattering airmass along the lines of sight to the observation and the
    // moon (eqn. 3)
    let x_obs = f64::sqrt(1. - 0.96 * obs_zenith.to_radians().sin().powi(2));
    let x_moon = f64::sqrt(1. - 0.96 * moon_zenith.to_radians().sin().powi(2));

    f_scatter
        * istar
        * 10_f64.powf(-0.4 * vband_extinction * x_moon)
        * (1. - 10_f64.powf(-0.4 * vband_extinction * x_obs))
}

/// Convert nanoLamberts to mag/arcsec² using eqn. 19 of Garstang, "Model for
/// Artificial Night-Sky Illumination", PASP, vol. 98, Mar. 1986, p. 364
/// (<http://dx.doi.org/10.1086/131768>).
fn nanolamberts_to_mag(b_moon: f64) -> f64 {
    (20.7233 - f64::ln(b_moon / 34.08)) / 0.92104
}
