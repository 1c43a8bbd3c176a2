use approx::assert_relative_eq;
use lensing_observables::{
    microlensing::{self, MicrolensError},
    units::{self, Unit},
    Microlens, MicrolensEvent, PointLens, Quantity,
};

fn bulge_lens() -> PointLens {
    PointLens::new(
        "1 solMass".parse().unwrap(),
        "4e3 pc".parse().unwrap(),
        "8e3 pc".parse().unwrap(),
    )
    .unwrap()
}

#[test]
fn bulge_star() {
    let star = Microlens::new(bulge_lens(), "0.1 mas".parse().unwrap()).unwrap();
    assert_relative_eq!(
        units::from_canonical(star.einstein_radius(), Unit::Milliarcsecond),
        1.00895,
        max_relative = 1e-4
    );
    let obs = star.observables();
    assert_eq!(obs.image_pos, star.image_pos());
    assert_eq!(obs.deviation, star.deviation());
    assert_relative_eq!(
        obs.magnification.unwrap().total,
        10.1266,
        max_relative = 1e-4
    );
}

#[test]
fn light_curve_through_the_lens() {
    let time: Vec<Quantity> = (-40..=40)
        .map(|t| Quantity::new(t as f64, Unit::Day))
        .collect();
    let event = MicrolensEvent::new(
        bulge_lens(),
        Quantity::new(0., Unit::Milliarcsecond),
        "200 km/s".parse().unwrap(),
        &time,
    )
    .unwrap();
    let lc = event.light_curve();
    assert_eq!(lc.len(), time.len());
    let failures = lc.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 40);
    assert!(matches!(failures[0].1, MicrolensError::Singularity { .. }));

    let mu = lc.total_magnification();
    for k in 1..=40 {
        let (before, after) = (mu[40 - k].unwrap(), mu[40 + k].unwrap());
        assert_relative_eq!(before, after, max_relative = 1e-12);
        if k > 1 {
            assert!(after < mu[40 + k - 1].unwrap());
        }
        assert!(after > 1.);
    }
    // each sample matches the static solution at the same impact parameter
    for (y, obs) in lc.impact_parameter().iter().zip(lc.samples()).skip(41) {
        assert_eq!(
            *obs.magnification.as_ref().unwrap(),
            microlensing::magnification(*y).unwrap()
        );
        assert_eq!(obs.centroid_shift, microlensing::centroid_shift(*y));
    }
    // the aligned sample still reports its images and centroid
    let aligned = &lc.samples()[40];
    assert_eq!(aligned.image_pos, (1., -1.));
    assert_eq!(aligned.deviation, 0.);
}

#[test]
fn light_curve_far_from_the_lens() {
    let lens = bulge_lens();
    let t_e = lens.einstein_length() / 2e5;
    let event = MicrolensEvent::from_si(
        lens,
        0.5 * lens.einstein_radius(),
        2e5,
        vec![-1e3 * t_e, 0., 1e3 * t_e],
    )
    .unwrap();
    assert_relative_eq!(event.einstein_time(), t_e);
    let mu = event.light_curve().total_magnification();
    assert_relative_eq!(mu[0].unwrap(), 1., epsilon = 1e-9);
    assert_relative_eq!(mu[2].unwrap(), 1., epsilon = 1e-9);
    assert_relative_eq!(mu[1].unwrap(), 2.25 / (0.5 * 4.25f64.sqrt()), max_relative = 1e-9);
}

#[test]
fn source_in_front_of_the_lens() {
    let err = PointLens::new(
        "1 solMass".parse().unwrap(),
        "8 kpc".parse().unwrap(),
        "4 kpc".parse().unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, MicrolensError::Domain(_)));
    let err: lensing_observables::Error = err.into();
    assert!(matches!(
        err,
        lensing_observables::Error::Microlensing(MicrolensError::Domain(_))
    ));
}
