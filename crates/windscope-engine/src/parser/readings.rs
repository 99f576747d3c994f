//! Time-series payload parser
//!
//! ```xml
//! <LOG>
//!   <MEAN END="05.01.2024 00:10">
//!     <DP VAR_PK="634" MIN="88.0" MAX="131.5"><V>100.2</V></DP>
//!   </MEAN>
//! </LOG>
//! ```

use chrono::NaiveDateTime;
use tracing::trace;
use windscope_core::{
    AggregationKind, DataPoint, DateRange, MeasurementGroup, ParameterCode, Skip, SkipCounts,
};

use super::{children_named, parse_document, parse_number};

/// Format of the `END` attribute of a measurement group
pub const READING_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Temperatures above this are corrupt sensor encodings
const TEMPERATURE_CEILING: f64 = 200.0;

/// Which readings of a payload a query looks at
///
/// Data points with other codes and groups ending outside `range` are
/// dropped, aggregation kinds outside `kinds` are left absent. None of them
/// is ever counted as malformed.
pub struct ReadingFilter<'a, F> {
    pub wants: F,
    pub kinds: &'a [AggregationKind],
    pub range: Option<DateRange>,
}

impl<'a, F: Fn(&ParameterCode) -> bool> ReadingFilter<'a, F> {
    pub fn new(wants: F, kinds: &'a [AggregationKind]) -> Self {
        Self {
            wants,
            kinds,
            range: None,
        }
    }

    /// Keep only groups whose end falls inside `range`
    pub fn within(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    fn field(
        &self,
        kind: AggregationKind,
        text: Option<&str>,
        skips: &mut SkipCounts,
    ) -> Option<f64> {
        if self.kinds.contains(&kind) {
            number_field(text, skips)
        } else {
            None
        }
    }
}

/// Parse a time-series payload into measurement groups, in payload order
///
/// Groups with a missing or malformed `END` are dropped; wanted values that
/// are not numeric become absent and are tallied. Only an unparseable
/// document fails as a whole.
pub fn parse_readings<F>(
    text: &str,
    filter: &ReadingFilter<'_, F>,
    skips: &mut SkipCounts,
) -> Result<Vec<MeasurementGroup>, Skip>
where
    F: Fn(&ParameterCode) -> bool,
{
    let doc = parse_document(text)?;
    let mut groups = Vec::new();

    for mean in children_named(doc.root_element(), "MEAN") {
        let end = match mean
            .attribute("END")
            .and_then(|ts| NaiveDateTime::parse_from_str(ts.trim(), READING_TIMESTAMP_FORMAT).ok())
        {
            Some(end) => end,
            None => {
                trace!(end = ?mean.attribute("END"), "Measurement group without valid END");
                skips.record(Skip::TimestampMalformed);
                continue;
            }
        };
        if filter.range.is_some_and(|range| !range.contains_instant(end)) {
            continue;
        }

        let points = children_named(mean, "DP")
            .filter_map(|dp| {
                let code = ParameterCode::from(dp.attribute("VAR_PK")?.trim());
                if !(filter.wants)(&code) {
                    return None;
                }
                let average = children_named(dp, "V").next().and_then(|v| v.text());
                Some(DataPoint {
                    code,
                    has_average: average.is_some(),
                    average: filter.field(AggregationKind::Average, average, skips),
                    min: filter.field(AggregationKind::Min, dp.attribute("MIN"), skips),
                    max: filter.field(AggregationKind::Max, dp.attribute("MAX"), skips),
                })
            })
            .collect();

        groups.push(MeasurementGroup { end, points });
    }

    Ok(groups)
}

fn number_field(text: Option<&str>, skips: &mut SkipCounts) -> Option<f64> {
    let text = text?;
    let value = parse_number(text);
    if value.is_none() {
        skips.record(Skip::ValueMalformed);
    }
    value
}

/// Plausibility rule for series values
///
/// A temperature parameter (display name contains `temp`, any case) reading
/// above 200 is a corrupt encoding, whatever the aggregation kind.
pub fn is_implausible(parameter_name: &str, value: f64) -> bool {
    value > TEMPERATURE_CEILING && parameter_name.to_lowercase().contains("temp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn parse_all(text: &str, skips: &mut SkipCounts) -> Result<Vec<MeasurementGroup>, Skip> {
        parse_readings(
            text,
            &ReadingFilter::new(|_: &ParameterCode| true, &AggregationKind::ALL),
            skips,
        )
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_groups() {
        let xml = r#"<LOG>
  <MEAN END="05.01.2024 00:10">
    <DP VAR_PK="634" MIN="88.0" MAX="131.5"><V>100.2</V></DP>
    <DP VAR_PK="1431"><V>7.5</V></DP>
  </MEAN>
  <MEAN END="05.01.2024 00:00">
    <DP VAR_PK="634"><V>90</V></DP>
  </MEAN>
</LOG>"#;
        let mut skips = SkipCounts::default();
        let groups = parse_all(xml, &mut skips).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].end, at(5, 0, 10));
        assert_eq!(
            groups[0].points[0],
            DataPoint {
                code: "634".into(),
                has_average: true,
                average: Some(100.2),
                min: Some(88.0),
                max: Some(131.5),
            }
        );
        assert_eq!(groups[0].points[1].min, None);
        assert_eq!(groups[1].end, at(5, 0, 0));
        assert_eq!(skips.total(), 0);
    }

    #[test]
    fn test_bad_timestamp_drops_group_only() {
        let xml = r#"<LOG>
  <MEAN END="2024-01-05 00:10"><DP VAR_PK="634"><V>1</V></DP></MEAN>
  <MEAN><DP VAR_PK="634"><V>2</V></DP></MEAN>
  <MEAN END="05.01.2024 00:20"><DP VAR_PK="634"><V>3</V></DP></MEAN>
</LOG>"#;
        let mut skips = SkipCounts::default();
        let groups = parse_all(xml, &mut skips).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].end, at(5, 0, 20));
        assert_eq!(skips.get(Skip::TimestampMalformed), 2);
    }

    #[test]
    fn test_bad_values_become_absent() {
        let xml = r#"<LOG><MEAN END="05.01.2024 00:10">
  <DP VAR_PK="634" MIN="---" MAX="12"><V>n/a</V></DP>
  <DP><V>5</V></DP>
</MEAN></LOG>"#;
        let mut skips = SkipCounts::default();
        let groups = parse_all(xml, &mut skips).unwrap();

        let points = &groups[0].points;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].average, None);
        assert_eq!(points[0].min, None);
        assert_eq!(points[0].max, Some(12.0));
        assert_eq!(skips.get(Skip::ValueMalformed), 2);
    }

    #[test]
    fn test_unwanted_readings_are_not_tallied() {
        let xml = r#"<LOG><MEAN END="05.01.2024 00:10">
  <DP VAR_PK="634" MIN="---" MAX="12"><V>100</V></DP>
  <DP VAR_PK="999" MIN="x" MAX="y"><V>z</V></DP>
</MEAN></LOG>"#;
        let code: ParameterCode = "634".into();
        let filter = ReadingFilter::new(|c: &ParameterCode| c == &code, &[AggregationKind::Average]);
        let mut skips = SkipCounts::default();
        let groups = parse_readings(xml, &filter, &mut skips).unwrap();

        let points = &groups[0].points;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].average, Some(100.0));
        assert_eq!(points[0].min, None);
        assert_eq!(points[0].max, None);
        assert_eq!(skips.get(Skip::ValueMalformed), 0);

        // Same payload, MIN now requested
        let filter = ReadingFilter::new(
            |c: &ParameterCode| c == &code,
            &[AggregationKind::Average, AggregationKind::Min],
        );
        let mut skips = SkipCounts::default();
        parse_readings(xml, &filter, &mut skips).unwrap();
        assert_eq!(skips.get(Skip::ValueMalformed), 1);
    }

    #[test]
    fn test_groups_outside_range_are_not_parsed() {
        let xml = r#"<LOG>
  <MEAN END="04.01.2024 23:50"><DP VAR_PK="634"><V>bad</V></DP></MEAN>
  <MEAN END="05.01.2024 00:10"><DP VAR_PK="634"><V>1</V></DP></MEAN>
</LOG>"#;
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let filter = ReadingFilter::new(|_: &ParameterCode| true, &AggregationKind::ALL)
            .within(DateRange::single(day));
        let mut skips = SkipCounts::default();
        let groups = parse_readings(xml, &filter, &mut skips).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].end, at(5, 0, 10));
        assert_eq!(skips.total(), 0);
    }

    #[test]
    fn test_missing_and_malformed_average_differ() {
        let xml = r#"<LOG><MEAN END="05.01.2024 00:10">
  <DP VAR_PK="1" MAX="3"/>
  <DP VAR_PK="2"><V/></DP>
  <DP VAR_PK="3"><V>bad</V></DP>
</MEAN></LOG>"#;
        let mut skips = SkipCounts::default();
        let groups = parse_all(xml, &mut skips).unwrap();

        let reported: Vec<_> = groups[0].points.iter().map(|p| p.has_average).collect();
        assert_eq!(reported, vec![false, false, true]);
        assert!(groups[0].points.iter().all(|p| p.average.is_none()));
        assert_eq!(skips.get(Skip::ValueMalformed), 1);
    }

    #[test]
    fn test_not_xml() {
        let mut skips = SkipCounts::default();
        assert_eq!(
            parse_all("<LOG><MEAN>", &mut skips),
            Err(Skip::PayloadMalformed)
        );
    }

    #[test]
    fn test_temperature_plausibility() {
        assert!(is_implausible("Gearbox Temp", 250.0));
        assert!(is_implausible("(Nac) TEMPERATURE outside", 200.5));
        assert!(!is_implausible("Gearbox Temp", 200.0));
        assert!(!is_implausible("Active Power", 1500.0));
    }
}
