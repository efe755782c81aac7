use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::{array, Array1, Array2};

use super::*;

/// Three-sample grid with unit sky brightness in every condition, except
/// "bright" which is twice as bright.
fn tables() -> AtmosphereTables {
    let wavelength = WavelengthGrid::new(array![4000., 5000., 6000.], WavelengthUnit::Angstrom)
        .expect("valid grid");
    let surface_brightness = SkyEmissionTable::new(
        &wavelength,
        [
            ("dark", array![1., 1., 1.]),
            ("gray", array![1., 1., 1.]),
            ("bright", array![2., 2., 2.]),
        ],
    )
    .expect("aligned spectra");
    let extinction_coefficient =
        ExtinctionModel::new(&wavelength, array![0.5, 0.4, 0.3]).expect("aligned extinction");

    AtmosphereTables {
        wavelength,
        surface_brightness,
        extinction_coefficient,
        moon_spectrum: None,
    }
}

fn config(extinct_emission: bool) -> AtmosphereConfig {
    AtmosphereConfig {
        extinct_emission,
        condition: "dark".to_string(),
        airmass: 1.0,
        moon: None,
    }
}

fn model(extinct_emission: bool) -> AtmosphereModel {
    initialize(&config(extinct_emission), tables()).expect("valid model")
}

#[test]
fn transmission_at_unit_airmass() {
    let atmosphere = model(true);
    let expected = array![
        10_f64.powf(-0.2),
        10_f64.powf(-0.16),
        10_f64.powf(-0.12)
    ];
    assert_abs_diff_eq!(atmosphere.extinction(), expected.view(), epsilon = 1e-12);
    assert_abs_diff_eq!(
        atmosphere.extinction(),
        array![0.631, 0.692, 0.759].view(),
        epsilon = 1e-3
    );
}

#[test]
fn transmission_bounds() {
    let mut atmosphere = model(true);

    atmosphere.set_airmass(0.0);
    assert!(atmosphere.extinction().iter().all(|&t| t == 1.0));

    for airmass in [0.5, 1.0, 1.5, 2.0, 3.0, 10.0] {
        atmosphere.set_airmass(airmass);
        assert_eq!(atmosphere.airmass(), airmass);
        assert!(atmosphere
            .extinction()
            .iter()
            .all(|&t| t > 0.0 && t <= 1.0));
    }
}

#[test]
fn negative_airmass_follows_formula() {
    let atmosphere = model(true).with_airmass(-1.0);
    assert_relative_eq!(atmosphere.extinction()[0], 10_f64.powf(0.2), max_relative = 1e-12);
}

#[test]
fn propagate_with_extinct_emission() {
    let atmosphere = model(true);
    let flux = atmosphere
        .propagate(array![10., 10., 10.].view(), 2.0)
        .expect("aligned flux");

    let t = atmosphere.extinction().to_owned();
    assert_abs_diff_eq!(flux, &t * 12.0, epsilon = 1e-12);
    assert_abs_diff_eq!(flux, array![7.572, 8.304, 9.108], epsilon = 1e-2);
}

#[test]
fn propagate_without_extinct_emission() {
    let atmosphere = model(false);
    assert!(!atmosphere.extinct_emission());

    let flux = atmosphere
        .propagate(array![10., 10., 10.].view(), 2.0)
        .expect("aligned flux");

    let t = atmosphere.extinction().to_owned();
    assert_abs_diff_eq!(flux, &t * 10.0 + 2.0, epsilon = 1e-12);
}

#[test]
fn propagate_does_not_touch_inputs() {
    let atmosphere = model(true);
    let source = array![3., 4., 5.];
    let before = atmosphere.surface_brightness().to_owned();

    atmosphere
        .propagate(source.view(), 2.0)
        .expect("aligned flux");

    assert_eq!(source, array![3., 4., 5.]);
    assert_eq!(atmosphere.surface_brightness(), before);
}

#[test]
fn propagate_is_linear_in_source() {
    let atmosphere = model(true).with_airmass(1.3);
    let f1 = array![1., 2., 3.];
    let f2 = array![-4., 0.5, 7.];
    let (a, b) = (2.5, -0.75);

    let sky = atmosphere
        .propagate(Array1::zeros(3).view(), 2.0)
        .expect("aligned flux");
    let source_term = |f: &Array1<f64>| {
        atmosphere.propagate(f.view(), 2.0).expect("aligned flux") - &sky
    };

    let combined = &f1 * a + &f2 * b;
    assert_abs_diff_eq!(
        source_term(&combined),
        source_term(&f1) * a + source_term(&f2) * b,
        epsilon = 1e-12
    );
}

#[test]
fn condition_selection_is_idempotent() {
    let mut atmosphere = model(true);
    let source = array![10., 10., 10.];

    let dark = atmosphere.propagate(source.view(), 2.0).unwrap();

    atmosphere.set_condition("bright").unwrap();
    assert_eq!(atmosphere.condition(), "bright");
    assert_eq!(atmosphere.surface_brightness(), array![2., 2., 2.]);
    let bright = atmosphere.propagate(source.view(), 2.0).unwrap();
    assert!(bright.iter().zip(&dark).all(|(b, d)| b > d));

    atmosphere.set_condition("gray").unwrap();
    atmosphere.set_condition("dark").unwrap();
    assert_eq!(atmosphere.propagate(source.view(), 2.0).unwrap(), dark);
}

#[test]
fn invalid_condition_lists_valid_names() {
    let mut atmosphere = model(true);

    let err = atmosphere.set_condition("cloudy").unwrap_err();
    assert_eq!(
        err,
        AtmosphereError::InvalidCondition {
            name: "cloudy".to_string(),
            valid: vec!["bright".into(), "dark".into(), "gray".into()],
        }
    );
    assert!(err.to_string().contains("{bright, dark, gray}"));

    // Nothing changed
    assert_eq!(atmosphere.condition(), "dark");
    assert_eq!(atmosphere.surface_brightness(), array![1., 1., 1.]);
}

#[test]
fn invalid_initial_condition() {
    let mut config = config(true);
    config.condition = "twilight".to_string();

    assert!(matches!(
        initialize(&config, tables()),
        Err(AtmosphereError::InvalidCondition { .. })
    ));
}

#[test]
fn misaligned_source_flux() {
    let atmosphere = model(true);

    assert_eq!(
        atmosphere.propagate(array![1., 2.].view(), 1.0),
        Err(AtmosphereError::ConfigurationMismatch {
            what: "source flux",
            expected: 3,
            found: 2,
        })
    );
    assert!(atmosphere
        .propagate_batch(Array2::zeros((4, 5)).view(), 1.0)
        .is_err());
}

#[test]
fn misaligned_tables() {
    let tables = tables();
    assert!(matches!(
        ExtinctionModel::new(&tables.wavelength, array![0.1, 0.2]),
        Err(AtmosphereError::ConfigurationMismatch { found: 2, .. })
    ));
    assert!(matches!(
        SkyEmissionTable::new(&tables.wavelength, [("dark", array![1., 1., 1., 1.])]),
        Err(AtmosphereError::ConfigurationMismatch { found: 4, .. })
    ));
}

#[test]
fn tables_on_different_grids() {
    let tables = tables();
    let nanometers =
        WavelengthGrid::new(array![400., 500., 600.], WavelengthUnit::Nanometer).unwrap();
    let extinction = ExtinctionModel::new(&nanometers, array![0.5, 0.4, 0.3]).unwrap();

    let err = AtmosphereModel::new(
        tables.wavelength,
        tables.surface_brightness,
        extinction,
        true,
        "dark",
        1.0,
        None,
    )
    .unwrap_err();
    assert_eq!(
        err,
        AtmosphereError::GridMismatch {
            what: "extinction coefficient"
        }
    );
}

#[test]
fn grid_validation() {
    assert_eq!(
        WavelengthGrid::new(Array1::<f64>::zeros(0), WavelengthUnit::Angstrom),
        Err(AtmosphereError::EmptyGrid)
    );
    assert_eq!(
        WavelengthGrid::new(array![1., 2., 2., 3.], WavelengthUnit::Angstrom),
        Err(AtmosphereError::UnsortedGrid { index: 2 })
    );
    assert_eq!(
        WavelengthGrid::new(array![1., f64::NAN], WavelengthUnit::Micron),
        Err(AtmosphereError::UnsortedGrid { index: 1 })
    );

    let grid = WavelengthGrid::new(vec![0.5, 0.6], WavelengthUnit::Micron).unwrap();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid.unit(), WavelengthUnit::Micron);
}

#[test]
fn batch_matches_single_propagation() {
    let atmosphere = model(true).with_condition("bright").unwrap();
    let fluxes = Array2::from_shape_fn((5, 3), |(i, j)| (i * 3 + j) as f64);

    let batch = atmosphere.propagate_batch(fluxes.view(), 1.5).unwrap();
    assert_eq!(batch.dim(), (5, 3));
    for (row, flux) in batch.rows().into_iter().zip(fluxes.rows()) {
        let single = atmosphere.propagate(flux, 1.5).unwrap();
        assert_abs_diff_eq!(row, single.view(), epsilon = 1e-12);
    }
}

#[test]
fn functional_updates_leave_original() {
    let atmosphere = model(true);
    let other = atmosphere
        .clone()
        .with_airmass(2.0)
        .with_condition("gray")
        .unwrap();

    assert_eq!(atmosphere.airmass(), 1.0);
    assert_eq!(atmosphere.condition(), "dark");
    assert_eq!(other.airmass(), 2.0);
    assert_eq!(other.condition(), "gray");
    assert_relative_eq!(other.extinction()[0], 10_f64.powf(-0.4), max_relative = 1e-12);
}

#[test]
fn initialize_with_moon() {
    let mut config = config(true);
    config.moon = Some(MoonConfig {
        moon_phase: 0.5,
        moon_zenith: 30.,
        observation_zenith: 20.,
        separation_angle: 40.,
    });

    assert_eq!(
        initialize(&config, tables()).unwrap_err(),
        AtmosphereError::MissingMoonSpectrum
    );

    let mut with_spectrum = tables();
    with_spectrum.moon_spectrum = Some(array![5., 6., 7.]);
    let mut atmosphere = initialize(&config, with_spectrum).unwrap();

    let moon = atmosphere.moon().expect("moon configured");
    assert_eq!(moon.moon_phase(), 0.5);
    assert_eq!(moon.separation_angle(), 40.);
    assert_eq!(moon.spectrum(), array![5., 6., 7.]);
    assert_eq!(moon.extinction_coefficient(), atmosphere.extinction_coefficient());

    atmosphere
        .moon_mut()
        .expect("moon configured")
        .update(0.1, 10., 15., 20.);
    let moon = atmosphere.moon().unwrap();
    assert_eq!(
        (
            moon.moon_phase(),
            moon.moon_zenith(),
            moon.observation_zenith(),
            moon.separation_angle()
        ),
        (0.1, 10., 15., 20.)
    );
}

#[test]
fn misaligned_moon_spectrum() {
    let mut config = config(true);
    config.moon = Some(MoonConfig {
        moon_phase: 0.5,
        moon_zenith: 30.,
        observation_zenith: 20.,
        separation_angle: 40.,
    });
    let mut tables = tables();
    tables.moon_spectrum = Some(array![5., 6.]);

    assert!(matches!(
        initialize(&config, tables),
        Err(AtmosphereError::ConfigurationMismatch {
            what: "moon spectrum",
            ..
        })
    ));
}
