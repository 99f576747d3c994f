//! End-to-end tests for the generation/availability query
//!
//! Run with: cargo test -p windscope-tests --test generation_e2e

use pretty_assertions::assert_eq;
use windscope_core::{Skip, TurbineId};
use windscope_engine::GenerationRequest;
use windscope_tests::{statistics_log, today, ArchiveTree};

fn request(from: &str, to: &str, turbines: &[&str]) -> GenerationRequest {
    GenerationRequest {
        from_date: Some(from.into()),
        to_date: Some(to.into()),
        turbines: Some(turbines.iter().map(|t| TurbineId::from(*t)).collect()),
    }
}

#[tokio::test]
async fn test_production_and_fault_downtime() {
    let tree = ArchiveTree::new();
    tree.add_zip(
        "Statistics/DB91012_05.01.2024.zip",
        &[(
            "stat.xml",
            &statistics_log(
                r#"<PRODUCTION KWH_LastDay="120.5"/>
<PRODUCTION KWH_LastDay="30"/>
<OPERATION MODE="3" TIMELASTDAY="1:30:00"/>
<OPERATION MODE="7" TIMELASTDAY="5:00:00"/>"#,
            ),
        )],
    );
    let engine = tree.engine("");

    let query = request("2024-01-05", "2024-01-05", &["T01"])
        .resolve(engine.registries(), today())
        .unwrap();
    let result = engine.generation(&query).await.unwrap();
    let t01 = TurbineId::from("T01");

    // Mode 7 is not a fault mode and does not count as downtime
    assert_eq!(result.generation("2024-01-05", &t01), Some(150.5));
    assert_eq!(result.availability("2024-01-05", &t01), Some(93.75));
    assert_eq!(result.skipped.total(), 0);
}

#[tokio::test]
async fn test_every_turbine_day_is_present() {
    let tree = ArchiveTree::new();
    tree.add_zip(
        "Statistics/DB91010_04.01.2024.zip",
        &[(
            "stat.xml",
            &statistics_log(r#"<PRODUCTION KWH_LastDay="812"/><OPERATION MODE="22" TIMELASTDAY="24:00:00"/>"#),
        )],
    );
    let engine = tree.engine("");

    let query = request("2024-01-04", "2024-01-05", &["T01", "T02", "T77"])
        .resolve(engine.registries(), today())
        .unwrap();
    let result = engine.generation(&query).await.unwrap();

    assert_eq!(result.days, vec!["2024-01-04", "2024-01-05"]);
    for day in &result.days {
        assert_eq!(result.values[day].len(), 3);
        assert_eq!(result.availability[day].len(), 3);
    }
    let t02 = TurbineId::from("T02");
    assert_eq!(result.generation("2024-01-04", &t02), Some(812.0));
    assert_eq!(result.availability("2024-01-04", &t02), Some(0.0));
    assert_eq!(result.generation("2024-01-05", &t02), Some(0.0));
    assert_eq!(result.availability("2024-01-05", &t02), Some(100.0));
    assert_eq!(result.availability("2024-01-04", &TurbineId::from("T77")), Some(100.0));
    // T01 on both days and T02 on the second; T77 has no device code
    assert_eq!(result.skipped.get(Skip::ArchiveMissing), 3);
}

#[tokio::test]
async fn test_downtime_over_a_day_is_not_clamped() {
    let tree = ArchiveTree::new();
    tree.add_zip(
        "Statistics/DB91012_05.01.2024.zip",
        &[(
            "stat.xml",
            &statistics_log(
                r#"<OPERATION MODE="1" TIMELASTDAY="20:00:00"/>
<OPERATION MODE="2" TIMELASTDAY="5:00:00"/>"#,
            ),
        )],
    );
    let engine = tree.engine("");

    let query = request("2024-01-05", "2024-01-05", &["T01"])
        .resolve(engine.registries(), today())
        .unwrap();
    let result = engine.generation(&query).await.unwrap();

    // 90000 s of downtime
    assert_eq!(result.availability("2024-01-05", &TurbineId::from("T01")), Some(-4.17));
}

#[tokio::test]
async fn test_corrupt_statistics_archive_keeps_defaults() {
    let tree = ArchiveTree::new();
    tree.add_file("Statistics/DB91012_05.01.2024.zip", b"PK\x03\x04 truncated");
    let engine = tree.engine("");

    let query = request("2024-01-05", "2024-01-05", &["T01"])
        .resolve(engine.registries(), today())
        .unwrap();
    let result = engine.generation(&query).await.unwrap();
    let t01 = TurbineId::from("T01");

    assert_eq!(result.generation("2024-01-05", &t01), Some(0.0));
    assert_eq!(result.availability("2024-01-05", &t01), Some(100.0));
    assert_eq!(result.skipped.get(Skip::ContainerCorrupt), 1);
}

#[tokio::test]
async fn test_default_range_is_yesterday() {
    let tree = ArchiveTree::new();
    let engine = tree.engine("");

    let query = GenerationRequest::default()
        .resolve(engine.registries(), today())
        .unwrap();
    let result = engine.generation(&query).await.unwrap();

    assert_eq!(result.days, vec!["2024-01-05"]);
    assert_eq!(result.turbines.len(), 10);
}
