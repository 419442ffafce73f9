//! Licence version mapper

use crate::models::entities::{LicenceVersion, Purpose, VersionStatus};
use crate::models::raw::LicenceVersionRow;
use crate::transform::external_id::licence_version_external_id;
use nald_common::dates::parse_nald_date;
use nald_common::{Error, Result};

/// Map a legacy status code. Any code outside the known set is a
/// data-integrity error: a silent default would hide miscategorized data.
pub fn map_status(row: &LicenceVersionRow) -> Result<VersionStatus> {
    match row.status.as_str() {
        "CURR" => Ok(VersionStatus::Current),
        "SUPER" => Ok(VersionStatus::Superseded),
        "DRAFT" => Ok(VersionStatus::Draft),
        other => Err(Error::transform(
            row.region_code,
            row.licence_id.to_string(),
            format!("unmapped licence version status code {other:?}"),
        )),
    }
}

/// Map a licence version row, attaching the already-mapped purposes whose
/// `(issue, increment)` matches. A purpose with no matching version is
/// simply not attached here; the graph assembly drops it.
pub fn map_licence_version(
    row: &LicenceVersionRow,
    mapped_purposes: &[Purpose],
) -> Result<LicenceVersion> {
    Ok(LicenceVersion {
        issue: row.issue_no,
        increment: row.incr_no,
        status: map_status(row)?,
        start_date: parse_nald_date(&row.eff_st_date),
        end_date: parse_nald_date(&row.eff_end_date),
        external_id: licence_version_external_id(
            row.region_code,
            row.licence_id,
            row.issue_no,
            row.incr_no,
        ),
        purposes: mapped_purposes
            .iter()
            .filter(|p| p.issue == row.issue_no && p.increment == row.incr_no)
            .cloned()
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entities::AbstractionPeriod;
    use chrono::NaiveDate;

    fn version_row() -> LicenceVersionRow {
        LicenceVersionRow {
            region_code: 1,
            licence_id: 10,
            issue_no: 100,
            incr_no: 1,
            status: "CURR".to_string(),
            eff_st_date: "01/08/2019".to_string(),
            eff_end_date: "null".to_string(),
            expiry_date: "null".to_string(),
            rev_date: "null".to_string(),
            lapsed_date: "null".to_string(),
            party_id: 100,
            address_id: 1000,
        }
    }

    fn purpose(issue: i64, increment: i64) -> Purpose {
        Purpose {
            issue,
            increment,
            primary_code: "A".to_string(),
            secondary_code: "AGR".to_string(),
            use_code: "140".to_string(),
            abstraction_period: AbstractionPeriod {
                start_day: 1,
                start_month: 4,
                end_day: 31,
                end_month: 10,
            },
            time_limited_start_date: None,
            time_limited_end_date: None,
            annual_quantity: Some(545.0),
            external_id: "1:42".to_string(),
        }
    }

    #[test]
    fn maps_version_with_matching_purposes() {
        let version = map_licence_version(
            &version_row(),
            &[purpose(100, 1), purpose(100, 2), purpose(99, 1)],
        )
        .unwrap();

        assert_eq!(version.status, VersionStatus::Current);
        assert_eq!(version.external_id, "1:10:100:1");
        assert_eq!(
            version.start_date,
            Some(NaiveDate::from_ymd_opt(2019, 8, 1).unwrap())
        );
        assert_eq!(version.end_date, None);
        // Only the (100, 1) purpose attaches
        assert_eq!(version.purposes.len(), 1);
    }

    #[test]
    fn purpose_with_no_matching_version_is_dropped_not_errored() {
        // Version list holds only (issue=1, increment=0); a purpose keyed
        // (issue=2, increment=0) silently attaches nowhere
        let mut row = version_row();
        row.issue_no = 1;
        row.incr_no = 0;
        let version = map_licence_version(&row, &[purpose(2, 0)]).unwrap();
        assert!(version.purposes.is_empty());
    }

    #[test]
    fn external_id_is_stable_across_repeated_mapping() {
        let row = version_row();
        let first = map_licence_version(&row, &[]).unwrap();
        let second = map_licence_version(&row, &[]).unwrap();
        assert_eq!(first.external_id, second.external_id);
        assert_eq!(first, second);
    }

    #[test]
    fn unmapped_status_fails_loud() {
        let mut row = version_row();
        row.status = "XYZ".to_string();
        let err = map_licence_version(&row, &[]).unwrap_err();
        assert!(err.to_string().contains("unmapped licence version status"));
        assert!(!err.is_transient());
    }

    #[test]
    fn superseded_and_draft_codes_map() {
        let mut row = version_row();
        row.status = "SUPER".to_string();
        assert_eq!(map_status(&row).unwrap(), VersionStatus::Superseded);
        row.status = "DRAFT".to_string();
        assert_eq!(map_status(&row).unwrap(), VersionStatus::Draft);
    }
}
