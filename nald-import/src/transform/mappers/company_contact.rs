//! Company contact role mapper
//!
//! Person parties get a contact role spanning the merged interval of the
//! licence versions they appear on, keyed by party id. Organisation parties
//! produce no contact roles.

use crate::models::entities::{CompanyContact, RoleKind};
use crate::models::raw::LicenceVersionRow;
use crate::transform::context::TransformContext;
use crate::transform::intervals::{merge_intervals, row_end_date};
use crate::transform::mappers::party::map_contact;
use nald_common::dates::parse_nald_date;
use nald_common::Result;
use std::collections::BTreeMap;

/// Contact roles over merged licence-version intervals
pub fn map_company_contacts(
    licence_versions: &[LicenceVersionRow],
    ctx: &TransformContext,
) -> Result<Vec<CompanyContact>> {
    let merged = merge_intervals(
        licence_versions,
        |row| (row.region_code, row.party_id),
        |row| parse_nald_date(&row.eff_st_date),
        |row| {
            row_end_date([
                parse_nald_date(&row.eff_end_date),
                parse_nald_date(&row.expiry_date),
                parse_nald_date(&row.rev_date),
                parse_nald_date(&row.lapsed_date),
            ])
        },
    );

    let ordered: BTreeMap<_, _> = merged.into_iter().collect();

    let mut roles = Vec::new();
    for ((region_code, party_id), range) in ordered {
        let party = ctx.party(region_code, party_id)?;
        if let Some(contact) = map_contact(party)? {
            roles.push(CompanyContact {
                role: RoleKind::LicenceHolder,
                start_date: range.start_date,
                end_date: range.end_date,
                contact,
            });
        }
    }
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::raw::PartyRow;
    use chrono::NaiveDate;

    fn version_row(party_id: i64, start: &str, end: &str) -> LicenceVersionRow {
        LicenceVersionRow {
            region_code: 1,
            licence_id: 10,
            issue_no: 100,
            incr_no: 1,
            status: "CURR".to_string(),
            eff_st_date: start.to_string(),
            eff_end_date: end.to_string(),
            expiry_date: "null".to_string(),
            rev_date: "null".to_string(),
            lapsed_date: "null".to_string(),
            party_id,
            address_id: 1000,
        }
    }

    fn party(party_id: i64, party_type: &str) -> PartyRow {
        PartyRow {
            region_code: 1,
            party_id,
            party_type: party_type.to_string(),
            name: "DOE".to_string(),
            forename: "JOHN".to_string(),
            initials: "J".to_string(),
            salutation: "null".to_string(),
        }
    }

    #[test]
    fn person_party_gets_a_merged_contact_role() {
        let ctx = TransformContext::new(vec![party(100, "PER")], vec![]);
        let versions = [
            version_row(100, "01/08/2019", "null"),
            version_row(100, "01/09/2019", "04/10/2019"),
        ];
        let roles = map_company_contacts(&versions, &ctx).unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(
            roles[0].start_date,
            Some(NaiveDate::from_ymd_opt(2019, 8, 1).unwrap())
        );
        assert_eq!(
            roles[0].end_date,
            Some(NaiveDate::from_ymd_opt(2019, 10, 4).unwrap())
        );
        assert_eq!(roles[0].contact.external_id, "1:100");
    }

    #[test]
    fn organisation_party_yields_no_contact_roles() {
        let ctx = TransformContext::new(vec![party(101, "ORG")], vec![]);
        let versions = [version_row(101, "01/08/2019", "null")];
        assert!(map_company_contacts(&versions, &ctx).unwrap().is_empty());
    }
}
