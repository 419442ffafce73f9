//! Transform layer: raw NALD rows → normalized entity graphs
//!
//! Pure and deterministic. The orchestrator's leaf handlers extract a
//! bundle of rows plus a lookup context, call [`build_licence_graph`] or
//! [`build_company_graph`], and hand the result to the load gateway.

pub mod context;
pub mod external_id;
pub mod intervals;
pub mod mappers;

use crate::models::entities::{CompanyGraph, LicenceGraph};
use crate::models::raw::{
    AgreementRow, ChargeVersionRow, InvoiceAccountRow, LicenceRow, LicenceVersionRow, PartyRow,
    PurposeRow,
};
use context::TransformContext;
use nald_common::dates::min_date;
use nald_common::Result;
use std::collections::HashSet;

/// All raw rows extracted for one licence
#[derive(Debug, Clone, Default)]
pub struct LicenceBundle {
    pub licence: Option<LicenceRow>,
    pub licence_versions: Vec<LicenceVersionRow>,
    pub charge_versions: Vec<ChargeVersionRow>,
    pub purposes: Vec<PurposeRow>,
    pub section_130_agreements: Vec<AgreementRow>,
    pub two_part_tariff_agreements: Vec<AgreementRow>,
}

/// Assemble the normalized graph for one licence.
///
/// Versions are deduplicated to one per distinct `(issue, increment)` pair
/// (first occurrence wins; later rows for the same pair are historical
/// edits already accounted for by the role interval merge). Purposes that
/// match no version are dropped.
pub fn build_licence_graph(bundle: &LicenceBundle, ctx: &TransformContext) -> Result<LicenceGraph> {
    let licence_row = bundle.licence.as_ref().ok_or_else(|| {
        nald_common::Error::NotFound("licence row missing from bundle".to_string())
    })?;

    let purposes = bundle
        .purposes
        .iter()
        .map(mappers::purpose::map_purpose)
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    let mut versions = Vec::new();
    for row in &bundle.licence_versions {
        if seen.insert((row.issue_no, row.incr_no)) {
            versions.push(mappers::licence_version::map_licence_version(row, &purposes)?);
        }
    }

    let mut licence = mappers::licence::map_licence(licence_row)?;
    if licence.start_date.is_none() {
        // No original effective date on the header: fall back to the
        // earliest version start
        licence.start_date = min_date(versions.iter().map(|v| v.start_date));
        if licence.start_date.is_none() {
            return Err(nald_common::Error::transform(
                licence_row.region_code,
                licence_row.licence_id.to_string(),
                "licence has no start date on header or versions",
            ));
        }
    }

    Ok(LicenceGraph {
        licence,
        versions,
        agreements: mappers::agreement::map_agreements(
            &bundle.section_130_agreements,
            &bundle.two_part_tariff_agreements,
        )?,
        document_roles: mappers::document::map_document_roles(
            &bundle.licence_versions,
            &bundle.charge_versions,
            ctx,
        )?,
        has_charge_versions: !bundle.charge_versions.is_empty(),
    })
}

/// Assemble the normalized graph for one company (party).
///
/// Licence-holder addresses come from the party's licence versions via the
/// interval merger; billing addresses from its charge versions; invoice
/// accounts carry their own address intervals.
pub fn build_company_graph(
    party: &PartyRow,
    licence_versions: &[LicenceVersionRow],
    charge_versions: &[ChargeVersionRow],
    invoice_rows: &[InvoiceAccountRow],
    ctx: &TransformContext,
) -> Result<CompanyGraph> {
    Ok(CompanyGraph {
        company: mappers::party::map_company(party)?,
        contact: mappers::party::map_contact(party)?,
        addresses: mappers::company_address::map_company_addresses(
            licence_versions,
            charge_versions,
            ctx,
        )?,
        contacts: mappers::company_contact::map_company_contacts(licence_versions, ctx)?,
        invoice_accounts: mappers::invoice_account::map_invoice_accounts(invoice_rows, ctx)?,
    })
}
