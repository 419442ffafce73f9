//! Licence mapper

use crate::models::entities::{Licence, RegionInfo};
use crate::models::raw::LicenceRow;
use nald_common::dates::parse_nald_date;
use nald_common::Result;

/// Regional charge area names keyed by the EIUC code prefix
fn regional_charge_area(eiuc_code: &str) -> String {
    let area = match eiuc_code.get(..2) {
        Some("AN") => "Anglian",
        Some("MD") => "Midlands",
        Some("NO") => "Northumbria",
        Some("NW") => "North West",
        Some("SO") => "Southern",
        Some("SW") => "South West (incl Wessex)",
        Some("TH") => "Thames",
        Some("WL") => "Wales",
        Some("YO") => "Yorkshire",
        _ => "Unknown",
    };
    area.to_string()
}

/// Map a licence header row to the normalized licence.
///
/// The licence start date prefers `ORIG_EFF_DATE`; when that is absent the
/// graph assembly falls back to the earliest licence-version start.
pub fn map_licence(row: &LicenceRow) -> Result<Licence> {
    Ok(Licence {
        licence_number: row.lic_no.clone(),
        region_code: row.region_code,
        // Water undertakers carry an EIUC code with an SWC suffix
        is_water_undertaker: row.eiuc_code.ends_with("SWC"),
        start_date: parse_nald_date(&row.orig_eff_date),
        expired_date: parse_nald_date(&row.expiry_date),
        lapsed_date: parse_nald_date(&row.lapsed_date),
        revoked_date: parse_nald_date(&row.rev_date),
        regions: RegionInfo {
            historical_area_code: row.area_code.clone(),
            regional_charge_area: regional_charge_area(&row.eiuc_code),
            standard_unit_charge_code: row.suc_code.clone(),
            local_environment_agency_plan_code: row.leap_code.clone(),
        },
    })
}
