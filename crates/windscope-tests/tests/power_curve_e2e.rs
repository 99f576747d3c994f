//! End-to-end tests for the power-curve query
//!
//! Run with: cargo test -p windscope-tests --test power_curve_e2e

use pretty_assertions::assert_eq;
use windscope_core::TurbineId;
use windscope_engine::PowerCurveRequest;
use windscope_tests::{mean, series_log, today, ArchiveTree};

fn request(turbines: &[&str]) -> PowerCurveRequest {
    PowerCurveRequest {
        from_date: Some("2024-01-05".into()),
        to_date: Some("2024-01-05".into()),
        turbines: Some(turbines.iter().map(|t| TurbineId::from(*t)).collect()),
    }
}

fn sample(end: &str, wind: &str, power: &str) -> String {
    mean(end, &[("1431", wind, wind, wind), ("634", power, power, power)])
}

#[tokio::test]
async fn test_band_and_ordering() {
    let tree = ArchiveTree::new();
    tree.add_zip(
        "10Min/DB91012_05.01.2024.zip",
        &[
            (
                "a.xml",
                &series_log(&[
                    sample("05.01.2024 00:00", "11.0", "2050"),
                    sample("05.01.2024 00:10", "3.2", "10"),
                    sample("05.01.2024 00:20", "5.1", "320"),
                ]),
            ),
            (
                "b.xml",
                &series_log(&[
                    sample("05.01.2024 00:30", "14.0", "2100"),
                    sample("05.01.2024 00:40", "4.4", "150"),
                ]),
            ),
        ],
    );
    let engine = tree.engine("");

    let query = request(&["T01"])
        .resolve(engine.registries(), today())
        .unwrap();
    let result = engine.power_curve(&query).await.unwrap();

    assert_eq!(result.curves.len(), 1);
    assert_eq!(result.curves[0].wind, vec![4.4, 5.1, 11.0]);
    assert_eq!(result.curves[0].power, vec![150.0, 320.0, 2050.0]);
    assert!(result.reference.is_none());
}

#[tokio::test]
async fn test_reference_curve_is_attached() {
    let tree = ArchiveTree::new();
    let reference = tree.add_file("refpc.csv", "wind,power\n3,20\n4,95\n5,220\n");
    tree.add_zip(
        "10Min/DB91010_05.01.2024.zip",
        &[("a.xml", &series_log(&[sample("05.01.2024 06:00", "7.5", "900")]))],
    );
    let engine = tree.engine(&format!("reference_curve = \"{}\"\n", reference.display()));

    let query = request(&["T01", "T02"])
        .resolve(engine.registries(), today())
        .unwrap();
    let result = engine.power_curve(&query).await.unwrap();

    let turbines: Vec<&TurbineId> = result.curves.iter().map(|c| &c.turbine).collect();
    assert_eq!(turbines, vec![&TurbineId::from("T02")]);
    let reference = result.reference.unwrap();
    assert_eq!(reference.wind, vec![3.0, 4.0, 5.0]);
    assert_eq!(reference.power, vec![20.0, 95.0, 220.0]);
}

#[tokio::test]
async fn test_custom_band_from_config() {
    let tree = ArchiveTree::new();
    tree.add_zip(
        "10Min/DB91012_05.01.2024.zip",
        &[(
            "a.xml",
            &series_log(&[
                sample("05.01.2024 00:00", "6.0", "500"),
                sample("05.01.2024 00:10", "9.0", "1500"),
            ]),
        )],
    );
    let engine = tree.engine("[power_curve]\nmin_power = 100.0\nmax_power = 1000.0\n");

    let query = request(&["T01"])
        .resolve(engine.registries(), today())
        .unwrap();
    let result = engine.power_curve(&query).await.unwrap();

    assert_eq!(result.curves[0].wind, vec![6.0]);
}
