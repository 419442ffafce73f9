//! Financial agreement mapper
//!
//! Section 127 (two-part tariff) and section 130 agreements attach to a
//! licence with a start date and an optional end date.

use crate::models::entities::Agreement;
use crate::models::raw::AgreementRow;
use nald_common::dates::parse_nald_date;
use nald_common::{Error, Result};

fn map_agreement(row: &AgreementRow) -> Result<Agreement> {
    let start_date = parse_nald_date(&row.eff_st_date).ok_or_else(|| {
        Error::transform(
            row.region_code,
            row.licence_id.to_string(),
            format!("agreement {} has no start date", row.afsa_code),
        )
    })?;
    Ok(Agreement {
        agreement_code: row.afsa_code.clone(),
        start_date,
        end_date: parse_nald_date(&row.eff_end_date),
    })
}

/// Map section 130 and two-part tariff rows into one agreement list
pub fn map_agreements(
    section_130_rows: &[AgreementRow],
    two_part_tariff_rows: &[AgreementRow],
) -> Result<Vec<Agreement>> {
    section_130_rows
        .iter()
        .chain(two_part_tariff_rows)
        .map(map_agreement)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(code: &str, start: &str, end: &str) -> AgreementRow {
        AgreementRow {
            region_code: 1,
            licence_id: 10,
            afsa_code: code.to_string(),
            eff_st_date: start.to_string(),
            eff_end_date: end.to_string(),
        }
    }

    #[test]
    fn maps_both_agreement_kinds() {
        let agreements = map_agreements(
            &[row("S130U", "03/06/2019", "null")],
            &[row("S127", "01/04/2015", "31/03/2020")],
        )
        .unwrap();

        assert_eq!(agreements.len(), 2);
        assert_eq!(agreements[0].agreement_code, "S130U");
        assert_eq!(agreements[0].end_date, None);
        assert_eq!(agreements[1].agreement_code, "S127");
        assert_eq!(
            agreements[1].end_date,
            Some(NaiveDate::from_ymd_opt(2020, 3, 31).unwrap())
        );
    }

    #[test]
    fn missing_start_date_is_a_data_error() {
        let err = map_agreements(&[row("S130U", "null", "null")], &[]).unwrap_err();
        assert!(err.to_string().contains("has no start date"));
    }
}
