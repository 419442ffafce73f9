//! Licence purpose mapper

use crate::models::entities::{AbstractionPeriod, Purpose};
use crate::models::raw::PurposeRow;
use crate::transform::external_id::purpose_external_id;
use crate::transform::mappers::opt_text;
use nald_common::dates::parse_nald_date;
use nald_common::{Error, Result};

fn period_component(row: &PurposeRow, value: i64, field: &str) -> Result<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| {
            Error::transform(
                row.region_code,
                row.purpose_id.to_string(),
                format!("invalid abstraction period {field}: {value}"),
            )
        })
}

/// Map a purpose row. The abstraction period day/month components are
/// required; the annual quantity is absent when unconstrained.
pub fn map_purpose(row: &PurposeRow) -> Result<Purpose> {
    Ok(Purpose {
        issue: row.issue_no,
        increment: row.incr_no,
        primary_code: row.primary_code.clone(),
        secondary_code: row.secondary_code.clone(),
        use_code: row.use_code.clone(),
        abstraction_period: AbstractionPeriod {
            start_day: period_component(row, row.period_st_day, "start day")?,
            start_month: period_component(row, row.period_st_month, "start month")?,
            end_day: period_component(row, row.period_end_day, "end day")?,
            end_month: period_component(row, row.period_end_month, "end month")?,
        },
        time_limited_start_date: parse_nald_date(&row.timeltd_st_date),
        time_limited_end_date: parse_nald_date(&row.timeltd_end_date),
        annual_quantity: opt_text(&row.annual_qty).and_then(|qty| qty.parse().ok()),
        external_id: purpose_external_id(row.region_code, row.purpose_id),
    })
}
