//! Company address role mapper
//!
//! Two sources of company↔address associations:
//!
//! - Licence-holder roles come from licence-version rows, collapsed through
//!   the interval merger keyed by address id so overlapping historical edits
//!   yield one non-overlapping interval per address.
//! - Billing roles come from charge-version rows. A charge version is a
//!   point-in-time transfer record, not an interval with its own
//!   termination events, so billing roles start at the earliest observed
//!   transfer date and always end open.

use crate::models::entities::{CompanyAddress, RoleKind};
use crate::models::raw::{ChargeVersionRow, LicenceVersionRow};
use crate::transform::context::TransformContext;
use crate::transform::intervals::{merge_intervals, row_end_date};
use crate::transform::mappers::party::map_address;
use nald_common::dates::{min_date, parse_nald_date, parse_transfer_date};
use nald_common::Result;
use std::collections::BTreeMap;

/// Widest date range each licence-holder address was valid for
fn licence_holder_addresses(
    licence_versions: &[LicenceVersionRow],
    ctx: &TransformContext,
) -> Result<Vec<CompanyAddress>> {
    let merged = merge_intervals(
        licence_versions,
        |row| (row.region_code, row.address_id),
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

    // Deterministic output order regardless of hash iteration
    let ordered: BTreeMap<_, _> = merged.into_iter().collect();

    ordered
        .into_iter()
        .map(|((region_code, address_id), range)| {
            Ok(CompanyAddress {
                role: RoleKind::LicenceHolder,
                start_date: range.start_date,
                end_date: range.end_date,
                address: map_address(ctx.address(region_code, address_id)?),
            })
        })
        .collect()
}

/// One open-ended billing role per distinct charge-version address
fn billing_addresses(
    charge_versions: &[ChargeVersionRow],
    ctx: &TransformContext,
) -> Result<Vec<CompanyAddress>> {
    let mut grouped: BTreeMap<(i64, i64), Vec<&ChargeVersionRow>> = BTreeMap::new();
    for row in charge_versions {
        grouped
            .entry((row.region_code, row.address_id))
            .or_default()
            .push(row);
    }

    grouped
        .into_iter()
        .map(|((region_code, address_id), rows)| {
            let start_date = min_date(
                rows.iter()
                    .map(|row| parse_transfer_date(&row.ias_xfer_date)),
            );
            Ok(CompanyAddress {
                role: RoleKind::Billing,
                start_date,
                end_date: None,
                address: map_address(ctx.address(region_code, address_id)?),
            })
        })
        .collect()
}

/// All company address roles for one company's licence data
pub fn map_company_addresses(
    licence_versions: &[LicenceVersionRow],
    charge_versions: &[ChargeVersionRow],
    ctx: &TransformContext,
) -> Result<Vec<CompanyAddress>> {
    let mut addresses = licence_holder_addresses(licence_versions, ctx)?;
    addresses.extend(billing_addresses(charge_versions, ctx)?);
    Ok(addresses)
}
