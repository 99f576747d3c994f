//! Daily statistics payload parser
//!
//! ```xml
//! <LOG>
//!   <STATISTIC>
//!     <PRODUCTION KWH_LastDay="120.5"/>
//!     <OPERATION MODE="3" TIMELASTDAY="1:30:00"/>
//!   </STATISTIC>
//! </LOG>
//! ```

use tracing::trace;
use windscope_core::{DailyStatisticRecord, Skip, SkipCounts};

use super::{children_named, parse_document, parse_number};

/// Operation modes counted as downtime (fault and stop states)
pub const FAULT_MODES: [&str; 6] = ["1", "2", "3", "4", "5", "22"];

/// Duration assumed when an operation entry has no `TIMELASTDAY`
const DEFAULT_DURATION: &str = "0:00:00";

/// Parse a statistics payload into one day's record
///
/// Generation sums every `PRODUCTION/@KWH_LastDay` (missing or empty counts
/// as 0, anything else non-numeric is skipped). Downtime sums the
/// `TIMELASTDAY` of every `OPERATION` in a fault mode. A malformed duration
/// ends the operation pass: generation and the downtime summed so far are
/// kept.
pub fn parse_statistics(text: &str, skips: &mut SkipCounts) -> Result<DailyStatisticRecord, Skip> {
    let doc = parse_document(text)?;
    let statistic = children_named(doc.root_element(), "STATISTIC")
        .next()
        .ok_or(Skip::PayloadMalformed)?;

    let mut record = DailyStatisticRecord::default();

    for production in children_named(statistic, "PRODUCTION") {
        let raw = production.attribute("KWH_LastDay").unwrap_or("0");
        if raw.trim().is_empty() {
            continue;
        }
        match parse_number(raw) {
            Some(kwh) => record.generation_kwh += kwh,
            None => {
                trace!(value = raw, "Unparseable KWH_LastDay");
                skips.record(Skip::ValueMalformed);
            }
        }
    }

    for operation in children_named(statistic, "OPERATION") {
        let Some(mode) = operation.attribute("MODE") else {
            continue;
        };
        if !FAULT_MODES.iter().any(|m| *m == mode) {
            continue;
        }
        let raw = operation.attribute("TIMELASTDAY").unwrap_or(DEFAULT_DURATION);
        match parse_duration(raw) {
            Some(seconds) => record.downtime_seconds += seconds,
            None => {
                trace!(value = raw, "Unparseable TIMELASTDAY, ending operation pass");
                skips.record(Skip::DurationMalformed);
                break;
            }
        }
    }

    Ok(record)
}

/// Parse a downtime duration into seconds
///
/// Accepts `H:M:S`, `M:S` or a single component counted as minutes.
/// Components are integers and are not range-checked; a total that does not
/// fit in an `i64` number of seconds is rejected.
pub fn parse_duration(text: &str) -> Option<f64> {
    let parts = text
        .split(':')
        .map(|p| p.trim().parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;

    let (h, m, s) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        [m] => (0, *m, 0),
        _ => return None,
    };
    let seconds = h
        .checked_mul(3600)?
        .checked_add(m.checked_mul(60)?)?
        .checked_add(s)?;
    Some(seconds as f64)
}
