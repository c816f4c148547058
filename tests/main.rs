use nanorand::{Rng, WyRand};
use pmt_coverage::{
    construct_detector, Builder, CablePositions, ConfigStore, CoverageError, CylinderLayout,
    FromBuilder, MemoryStore, PmtInfo,
};

fn watchman(coverage: f64) -> MemoryStore {
    let mut store = MemoryStore::new().data_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
    store.load("Watchman/DETECTOR.ratdb").unwrap();
    store.set_d("DETECTOR", "", "photocathode_coverage", coverage);
    store
}

#[test]
fn watchman_regression() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut store = watchman(0.4);
    let report = construct_detector(&mut store).unwrap();
    println!("{report}");

    assert!((report.surface_area - 1804.4037490823252).abs() < 1e-9);
    assert_eq!(report.photocathode_radius, 0.254);
    assert_eq!(report.required_pmts, 3562);
    assert!((report.pmt_space - 0.7117375889942879).abs() < 1e-12);
    assert_eq!((report.cols, report.rows), (86, 28));
    assert_eq!(report.generated_pmts, 3514);
    assert!((report.actual_coverage - 0.39471655552792123).abs() < 1e-12);

    assert_eq!(store.get_i("GEO", "shield", "cols").unwrap(), 86);
    assert_eq!(store.get_i("GEO", "shield", "rows").unwrap(), 28);
    assert_eq!(store.get_i("GEO", "shield", "inner_len").unwrap(), 3514);
    assert_eq!(store.get_i("GEO", "inner_pmts", "max_pmts").unwrap(), 3514);
    assert_eq!(store.get_i("GEO", "shield", "veto_len").unwrap(), 0);
    assert_eq!(store.get_i("GEO", "veto_pmts", "enable").unwrap(), 0);
}

#[test]
fn published_arrays() {
    let mut store = watchman(0.2);
    let report = construct_detector(&mut store).unwrap();
    assert_eq!(report.generated_pmts, 1681);
    assert_eq!((report.cols, report.rows), (61, 19));

    let info = PmtInfo::from_store(&store).unwrap();
    let n = report.generated_pmts;
    for array in [
        &info.x,
        &info.y,
        &info.z,
        &info.dir_x,
        &info.dir_y,
        &info.dir_z,
    ] {
        assert_eq!(array.len(), n);
    }
    assert_eq!(info.pmt_type.len(), n);

    let cables = CablePositions::from_store(&store).unwrap();
    assert_eq!(cables.len(), report.cols);
    let cable_radius = store.get_d("GEO", "shield", "detector_size").unwrap() / 2.0
        - store.get_d("GEO", "shield", "shield_thickness").unwrap()
        + 4.0 * store.get_d("GEO", "shield", "steel_thickness").unwrap();
    for i in 0..cables.len() {
        assert!((cables.x[i].hypot(cables.y[i]) - cable_radius).abs() < 1e-9);
        assert_eq!(cables.z[i], 0.0);
        assert_eq!(
            (cables.dir_x[i], cables.dir_y[i], cables.dir_z[i]),
            (0.0, 0.0, 1.0)
        );
    }
}

#[test]
fn idempotence() -> anyhow::Result<()> {
    let mut first = watchman(0.3);
    let mut second = watchman(0.3);
    construct_detector(&mut first)?;
    construct_detector(&mut second)?;
    assert_eq!(
        bincode::serialize(&PmtInfo::from_store(&first)?)?,
        bincode::serialize(&PmtInfo::from_store(&second)?)?
    );
    assert_eq!(
        bincode::serialize(&CablePositions::from_store(&first)?)?,
        bincode::serialize(&CablePositions::from_store(&second)?)?
    );
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn missing_detector_table() {
    let mut store = MemoryStore::new();
    let err = construct_detector(&mut store).unwrap_err();
    assert!(matches!(err, CoverageError::Store(_)));
    assert!(err.to_string().contains("DETECTOR[]"));
    assert!(store.is_empty());
}

#[test]
fn coverage_convergence() {
    let deviations: Vec<f64> = [1.0, 0.5, 0.254, 0.127, 0.0635]
        .into_iter()
        .map(|radius| {
            let layout = CylinderLayout::builder()
                .photocathode_radius(radius)
                .build()
                .unwrap();
            let report = layout.report();
            println!(
                "radius: {radius:6.4}m, PMTs: {:6}, deviation: {:.5}",
                report.generated_pmts,
                report.coverage_deviation()
            );
            report.coverage_deviation()
        })
        .collect();
    assert!(deviations.windows(2).all(|d| d[1] < d[0]));
    assert!(deviations[deviations.len() - 1] < 0.01);
}

#[test]
fn random_layouts() {
    let mut rng = WyRand::new_seed(7);
    for _ in 0..50 {
        let coverage = 0.05 + 0.45 * rng.generate::<f64>();
        let radius = 0.1 + 0.2 * rng.generate::<f64>();
        let size = 5.0 + 25.0 * rng.generate::<f64>();
        let layout = CylinderLayout::builder()
            .photocathode_coverage(coverage)
            .photocathode_radius(radius)
            .detector_size(size)
            .build()
            .unwrap();

        assert!(layout.solution.required_pmts >= 1);
        assert_eq!(
            layout.n_pmt(),
            layout.cols() * layout.rows() + 2 * layout.endcap.len()
        );
        assert_eq!(layout.pmt_info().len(), layout.n_pmt());
        assert_eq!(layout.cables().len(), layout.cols());

        for pmt in layout.barrel_pmts() {
            assert!((pmt.direction.norm() - 1.0).abs() < 1e-12);
            assert_eq!(pmt.direction.z, 0.0);
            assert!(pmt.direction.xy().dot(&pmt.position.xy()) < 0.0);
        }
        for pair in layout.endcap_pmts().chunks(2) {
            let (top, bottom) = (&pair[0], &pair[1]);
            assert_eq!(top.position.xy(), bottom.position.xy());
            assert_eq!(top.position.z, layout.geometry.topbot_offset);
            assert_eq!(bottom.position.z, -layout.geometry.topbot_offset);
            assert_eq!(top.direction.z, -1.0);
            assert_eq!(bottom.direction.z, 1.0);
            assert!(
                top.position.xy().norm()
                    <= layout.geometry.pmt_radius - layout.solution.pmt_space / 2.0 + 1e-12
            );
        }
    }
}
