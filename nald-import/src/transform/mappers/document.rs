//! Document role mapper
//!
//! Document roles associate a licence with the parties holding or paying
//! for it over time. Licence-holder roles are merged per
//! `(party, address)` pair so the output never contains two overlapping
//! intervals for the same association; billing roles reference the invoice
//! account and start at the earliest transfer into the invoicing system.

use crate::models::entities::{DocumentRole, RoleKind};
use crate::models::raw::{ChargeVersionRow, LicenceVersionRow};
use crate::transform::context::TransformContext;
use crate::transform::external_id::{address_external_id, party_external_id};
use crate::transform::intervals::{merge_intervals, row_end_date};
use crate::transform::mappers::party::map_contact;
use nald_common::dates::{min_date, parse_nald_date, parse_transfer_date};
use nald_common::Result;
use std::collections::BTreeMap;

/// Licence-holder document roles, one merged interval per party+address
fn holder_roles(
    licence_versions: &[LicenceVersionRow],
    ctx: &TransformContext,
) -> Result<Vec<DocumentRole>> {
    let merged = merge_intervals(
        licence_versions,
        |row| (row.region_code, row.party_id, row.address_id),
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
    for ((region_code, party_id, address_id), range) in ordered {
        let party = ctx.party(region_code, party_id)?;
        ctx.address(region_code, address_id)?;
        roles.push(DocumentRole {
            role: RoleKind::LicenceHolder,
            start_date: range.start_date,
            end_date: range.end_date,
            company_external_id: party_external_id(region_code, party_id),
            contact_external_id: map_contact(party)?.map(|c| c.external_id),
            address_external_id: Some(address_external_id(region_code, address_id)),
            invoice_account_number: None,
        });
    }
    Ok(roles)
}

/// Billing document roles, one per invoice account
fn billing_roles(charge_versions: &[ChargeVersionRow]) -> Vec<DocumentRole> {
    let mut grouped: BTreeMap<&str, Vec<&ChargeVersionRow>> = BTreeMap::new();
    for row in charge_versions {
        grouped.entry(row.ias_cust_ref.as_str()).or_default().push(row);
    }

    grouped
        .into_iter()
        .map(|(cust_ref, rows)| {
            let first = rows[0];
            DocumentRole {
                role: RoleKind::Billing,
                start_date: min_date(
                    rows.iter().map(|row| parse_transfer_date(&row.ias_xfer_date)),
                ),
                end_date: None,
                company_external_id: party_external_id(first.region_code, first.party_id),
                contact_external_id: None,
                address_external_id: Some(address_external_id(
                    first.region_code,
                    first.address_id,
                )),
                invoice_account_number: Some(cust_ref.to_string()),
            }
        })
        .collect()
}

/// All document roles for one licence
pub fn map_document_roles(
    licence_versions: &[LicenceVersionRow],
    charge_versions: &[ChargeVersionRow],
    ctx: &TransformContext,
) -> Result<Vec<DocumentRole>> {
    let mut roles = holder_roles(licence_versions, ctx)?;
    roles.extend(billing_roles(charge_versions));
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::raw::{AddressRow, PartyRow};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> Option<NaiveDate> {
        Some(NaiveDate::from_ymd_opt(y, m, day).unwrap())
    }

    fn ctx() -> TransformContext {
        TransformContext::new(
            vec![PartyRow {
                region_code: 1,
                party_id: 100,
                party_type: "ORG".to_string(),
                name: "BIG CO LTD".to_string(),
                forename: "null".to_string(),
                initials: "null".to_string(),
                salutation: "null".to_string(),
            }],
            vec![AddressRow {
                region_code: 1,
                address_id: 1000,
                addr_line1: "SUNNY FARM".to_string(),
                addr_line2: "null".to_string(),
                addr_line3: "null".to_string(),
                addr_line4: "null".to_string(),
                town: "null".to_string(),
                county: "null".to_string(),
                postcode: "null".to_string(),
                country: "null".to_string(),
            }],
        )
    }

    fn version_row(start: &str, end: &str) -> LicenceVersionRow {
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
            party_id: 100,
            address_id: 1000,
        }
    }

    #[test]
    fn holder_roles_never_overlap_per_association() {
        // Three overlapping historical edits for the same party+address
        // collapse to a single interval
        let versions = [
            version_row("01/08/2019", "null"),
            version_row("01/09/2019", "04/10/2019"),
            version_row("15/08/2019", "20/09/2019"),
        ];
        let roles = map_document_roles(&versions, &[], &ctx()).unwrap();

        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role, RoleKind::LicenceHolder);
        assert_eq!(roles[0].start_date, d(2019, 8, 1));
        assert_eq!(roles[0].end_date, d(2019, 10, 4));
        assert_eq!(roles[0].company_external_id, "1:100");
        assert_eq!(roles[0].contact_external_id, None);
    }

    #[test]
    fn billing_role_names_the_invoice_account() {
        let charges = [ChargeVersionRow {
            region_code: 1,
            licence_id: 10,
            party_id: 100,
            address_id: 1000,
            ias_cust_ref: "X1234".to_string(),
            ias_xfer_date: "25/12/2003 10:32:17".to_string(),
        }];
        let roles = map_document_roles(&[], &charges, &ctx()).unwrap();

        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role, RoleKind::Billing);
        assert_eq!(roles[0].invoice_account_number, Some("X1234".to_string()));
        assert_eq!(roles[0].start_date, d(2003, 12, 25));
        assert_eq!(roles[0].end_date, None);
    }
}
