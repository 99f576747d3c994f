//! Power-curve query - (wind speed, active power) scatter per turbine
//!
//! Same traversal as the series query, restricted to the two configured
//! parameter codes and to Average values. A measurement group contributes a
//! point only when both values are present and the power lies strictly
//! inside the configured band.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use windscope_core::{
    AggregationKind, ArchiveName, DateRange, MeasurementGroup, ParameterCode, PowerCurvePoint,
    PowerCurveResult, QueryResult, SkipCounts, TurbineCurve,
};

use crate::config::PowerCurveConfig;
use crate::engine::{visit_entries, ArchiveEngine, Slot};
use crate::parser::{decode_payload, parse_readings, ReadingFilter};
use crate::policy::{self, Gathered};
use crate::query::PowerCurveQuery;
use crate::reader::XmlEntries;
use crate::resolver::{ArchiveFamily, FamilyIndex};

#[derive(Debug)]
struct CurvePlan {
    range: DateRange,
    band: PowerCurveConfig,
}

impl CurvePlan {
    /// The group's point, if it has both values and a plausible power
    ///
    /// When a code repeats inside a group, its last data point carrying a
    /// `V` text wins, even when that text is not numeric.
    fn point_of(&self, group: &MeasurementGroup) -> Option<PowerCurvePoint> {
        let mut wind = None;
        let mut power = None;
        for dp in group.points.iter().filter(|dp| dp.has_average) {
            if dp.code == self.band.wind_code {
                wind = dp.value(AggregationKind::Average);
            } else if dp.code == self.band.power_code {
                power = dp.value(AggregationKind::Average);
            }
        }
        let (wind_speed, active_power) = (wind?, power?);
        self.band.accepts_power(active_power).then_some(PowerCurvePoint {
            wind_speed,
            active_power,
        })
    }

    fn collect(
        &self,
        archive: &ArchiveName,
        entries: XmlEntries,
        skips: &mut SkipCounts,
    ) -> Vec<PowerCurvePoint> {
        let mut points = Vec::new();
        let filter = ReadingFilter::new(
            |code: &ParameterCode| *code == self.band.wind_code || *code == self.band.power_code,
            &[AggregationKind::Average],
        )
        .within(self.range);
        for payload in entries {
            let payload = match payload {
                Ok(payload) => payload,
                Err(skip) => {
                    policy::record(skips, archive, skip);
                    break;
                }
            };
            let text = decode_payload(&payload.bytes);
            match parse_readings(&text, &filter, skips) {
                Ok(groups) => points.extend(groups.iter().filter_map(|g| self.point_of(g))),
                Err(skip) => {
                    debug!(entry = %payload.entry, "Payload dropped");
                    policy::record(skips, archive, skip);
                }
            }
        }
        points
    }
}

impl ArchiveEngine {
    /// Wind/power scatter per turbine, ascending by wind speed
    ///
    /// Turbines without a retained point are left out.
    pub async fn power_curve(&self, query: &PowerCurveQuery) -> QueryResult<PowerCurveResult> {
        self.bounded(self.run_power_curve(query)).await
    }

    async fn run_power_curve(&self, query: &PowerCurveQuery) -> QueryResult<PowerCurveResult> {
        let started = Instant::now();
        let mut skipped = SkipCounts::default();
        let days = query.range.days();
        let mut per_turbine: Vec<Vec<PowerCurvePoint>> = vec![Vec::new(); query.turbines.len()];

        let slots = self.slots(&query.turbines, &days);
        if !slots.is_empty() {
            let index = self
                .resolver
                .index(self.store(), ArchiveFamily::Series, &mut skipped)
                .await;
            let plan = Arc::new(CurvePlan {
                range: query.range,
                band: self.power_curve.clone(),
            });
            let mut gathered = self
                .fan_out(slots, |slot| self.curve_slot(&index, plan.clone(), slot))
                .await?;
            gathered.sort_by_key(|(slot, _)| (slot.turbine, slot.day));
            for (slot, found) in gathered {
                per_turbine[slot.turbine].extend(found.merge_into(&mut skipped));
            }
        }

        let curves: Vec<TurbineCurve> = query
            .turbines
            .iter()
            .zip(per_turbine)
            .filter_map(|(turbine, points)| TurbineCurve::from_points(turbine.clone(), points))
            .collect();

        info!(
            query = "power_curve",
            turbines = query.turbines.len(),
            days = days.len(),
            curves = curves.len(),
            points = curves.iter().map(TurbineCurve::len).sum::<usize>(),
            skipped = skipped.total(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query complete"
        );

        Ok(PowerCurveResult {
            curves,
            reference: self.reference.clone(),
            skipped,
        })
    }

    async fn curve_slot(
        &self,
        index: &FamilyIndex,
        plan: Arc<CurvePlan>,
        slot: Slot,
    ) -> QueryResult<(Slot, Gathered<Vec<PowerCurvePoint>>)> {
        let mut skips = SkipCounts::default();
        let mut points = Vec::new();

        for name in self.candidates_or_missing(index, &slot, &mut skips) {
            let Some(bytes) = self.reader.fetch(&name, &mut skips).await else {
                continue;
            };
            let plan = plan.clone();
            let found = visit_entries(name, bytes, move |archive, entries, skips| {
                plan.collect(archive, entries, skips)
            })
            .await?;
            if let Some(found) = found.merge_into(&mut skips) {
                points.extend(found);
            }
        }

        Ok((slot, Gathered::new(points, skips)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::*;
    use crate::query::PowerCurveRequest;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use windscope_core::{Skip, TurbineId};

    async fn run(engine: &ArchiveEngine, turbines: &[&str]) -> PowerCurveResult {
        let request = PowerCurveRequest {
            from_date: Some("2024-01-05".into()),
            to_date: Some("2024-01-05".into()),
            turbines: Some(turbines.iter().map(|t| TurbineId::from(*t)).collect()),
        };
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let query = request.resolve(engine.registries(), today).unwrap();
        engine.power_curve(&query).await.unwrap()
    }

    #[tokio::test]
    async fn test_band_filter_and_wind_order() {
        let (store, engine) = engine();
        let xml = log(&[
            mean("05.01.2024 00:00", &[("1431", "9.5"), ("634", "1800")]),
            mean("05.01.2024 00:10", &[("1431", "4.0"), ("634", "150")]),
            mean("05.01.2024 00:20", &[("1431", "2.0"), ("634", "10")]),
            mean("05.01.2024 00:30", &[("1431", "25.0"), ("634", "2100")]),
            mean("05.01.2024 00:40", &[("1431", "6.5"), ("634", "600.5")]),
            mean("05.01.2024 00:50", &[("1431", "7.0")]),
            mean("05.01.2024 01:00", &[("1431", "bad"), ("634", "700")]),
        ]);
        store.insert("10Min/DB91012_05.01.2024.zip", zip_of(&[("a.xml", xml)]));

        let result = run(&engine, &["T01"]).await;

        assert_eq!(result.curves.len(), 1);
        let curve = &result.curves[0];
        assert_eq!(curve.turbine, TurbineId::from("T01"));
        assert_eq!(curve.wind, vec![4.0, 6.5, 9.5]);
        assert_eq!(curve.power, vec![150.0, 600.5, 1800.0]);
        assert!(curve.power.iter().all(|p| *p > 10.0 && *p < 2100.0));
        assert_eq!(result.skipped.get(Skip::ValueMalformed), 1);
    }

    #[tokio::test]
    async fn test_last_data_point_wins() {
        let (store, engine) = engine();
        let xml = log(&[mean(
            "05.01.2024 00:00",
            &[("1431", "3.0"), ("634", "500"), ("1431", "5.0")],
        )]);
        store.insert("10Min/DB91012_05.01.2024.zip", zip_of(&[("a.xml", xml)]));

        let result = run(&engine, &["T01"]).await;
        assert_eq!(result.curves[0].wind, vec![5.0]);
    }

    #[tokio::test]
    async fn test_data_point_without_value_keeps_earlier_one() {
        let (store, engine) = engine();
        let xml = log(&[
            r#"<MEAN END="05.01.2024 00:00">
  <DP VAR_PK="1431"><V>5.0</V></DP><DP VAR_PK="634"><V>500</V></DP>
  <DP VAR_PK="1431" MIN="1.0"/><DP VAR_PK="634"><V/></DP>
</MEAN>"#
                .to_string(),
            r#"<MEAN END="05.01.2024 00:10">
  <DP VAR_PK="1431"><V>6.0</V></DP><DP VAR_PK="634"><V>800</V></DP>
  <DP VAR_PK="1431"><V>n/a</V></DP>
</MEAN>"#
                .to_string(),
        ]);
        store.insert("10Min/DB91012_05.01.2024.zip", zip_of(&[("a.xml", xml)]));

        let result = run(&engine, &["T01"]).await;
        assert_eq!(result.curves[0].wind, vec![5.0]);
        assert_eq!(result.curves[0].power, vec![500.0]);
        assert_eq!(result.skipped.get(Skip::ValueMalformed), 1);
    }

    #[tokio::test]
    async fn test_other_parameters_are_not_tallied() {
        let (store, engine) = engine();
        let xml = log(&[mean(
            "05.01.2024 00:00",
            &[("1431", "8.0"), ("634", "900"), ("220", "---"), ("301", "x")],
        )]);
        store.insert("10Min/DB91012_05.01.2024.zip", zip_of(&[("a.xml", xml)]));

        let result = run(&engine, &["T01"]).await;
        assert_eq!(result.curves[0].power, vec![900.0]);
        assert_eq!(result.skipped.total(), 0);
    }

    #[tokio::test]
    async fn test_empty_turbines_are_omitted() {
        let (store, engine) = engine();
        store.insert(
            "10Min/DB91012_05.01.2024.zip",
            zip_of(&[(
                "a.xml",
                log(&[mean("05.01.2024 00:00", &[("1431", "8"), ("634", "5")])]),
            )]),
        );
        store.insert(
            "10Min/DB91010_05.01.2024.zip",
            zip_of(&[(
                "a.xml",
                log(&[mean("05.01.2024 00:00", &[("1431", "8"), ("634", "1200")])]),
            )]),
        );

        let result = run(&engine, &["T01", "T02", "T03"]).await;
        let turbines: Vec<&TurbineId> = result.curves.iter().map(|c| &c.turbine).collect();
        assert_eq!(turbines, vec![&TurbineId::from("T02")]);
    }

    #[tokio::test]
    async fn test_temperature_rule_does_not_apply() {
        let (store, engine) = engine();
        let engine = engine.with_power_curve(PowerCurveConfig {
            wind_code: "1431".into(),
            power_code: "220".into(),
            min_power: 10.0,
            max_power: 2100.0,
        });
        store.insert(
            "10Min/DB91012_05.01.2024.zip",
            zip_of(&[(
                "a.xml",
                log(&[mean("05.01.2024 00:00", &[("1431", "8"), ("220", "900")])]),
            )]),
        );

        let result = run(&engine, &["T01"]).await;
        assert_eq!(result.curves[0].power, vec![900.0]);
    }
}
