//! Invoice account mapper

use crate::models::entities::{InvoiceAccount, InvoiceAccountAddress};
use crate::models::raw::InvoiceAccountRow;
use crate::transform::context::TransformContext;
use crate::transform::external_id::party_external_id;
use crate::transform::mappers::party::map_address;
use nald_common::dates::{min_date, parse_nald_date};
use nald_common::Result;
use std::collections::BTreeMap;

/// Group invoice account rows by account number, one address interval per
/// row. An agent party on a row means the account is billed through a
/// company other than the account holder.
pub fn map_invoice_accounts(
    rows: &[InvoiceAccountRow],
    ctx: &TransformContext,
) -> Result<Vec<InvoiceAccount>> {
    let mut grouped: BTreeMap<&str, Vec<&InvoiceAccountRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.ias_cust_ref.as_str()).or_default().push(row);
    }

    grouped
        .into_iter()
        .map(|(cust_ref, rows)| {
            let addresses = rows
                .iter()
                .map(|row| {
                    Ok(InvoiceAccountAddress {
                        start_date: parse_nald_date(&row.start_date),
                        end_date: None,
                        address: map_address(ctx.address(row.region_code, row.address_id)?),
                        agent_company_external_id: row
                            .agent_party_id
                            .map(|agent| party_external_id(row.region_code, agent)),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(InvoiceAccount {
                invoice_account_number: cust_ref.to_string(),
                start_date: min_date(addresses.iter().map(|a| a.start_date)),
                addresses,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::raw::AddressRow;
    use chrono::NaiveDate;

    fn address_row(address_id: i64) -> AddressRow {
        AddressRow {
            region_code: 1,
            address_id,
            addr_line1: "SUNNY FARM".to_string(),
            addr_line2: "null".to_string(),
            addr_line3: "null".to_string(),
            addr_line4: "null".to_string(),
            town: "null".to_string(),
            county: "null".to_string(),
            postcode: "null".to_string(),
            country: "null".to_string(),
        }
    }

    fn account_row(cust_ref: &str, address_id: i64, start: &str, agent: Option<i64>) -> InvoiceAccountRow {
        InvoiceAccountRow {
            region_code: 1,
            party_id: 100,
            ias_cust_ref: cust_ref.to_string(),
            start_date: start.to_string(),
            address_id,
            agent_party_id: agent,
        }
    }

    #[test]
    fn groups_rows_by_account_number() {
        let ctx = TransformContext::new(vec![], vec![address_row(1000), address_row(1001)]);
        let rows = [
            account_row("X1234", 1000, "01/01/2019", None),
            account_row("X1234", 1001, "01/06/2018", Some(200)),
            account_row("Y9999", 1000, "01/01/2020", None),
        ];
        let accounts = map_invoice_accounts(&rows, &ctx).unwrap();

        assert_eq!(accounts.len(), 2);
        let x = accounts.iter().find(|a| a.invoice_account_number == "X1234").unwrap();
        assert_eq!(x.addresses.len(), 2);
        // Account start is the earliest address interval start
        assert_eq!(
            x.start_date,
            Some(NaiveDate::from_ymd_opt(2018, 6, 1).unwrap())
        );
        let agented = x.addresses.iter().find(|a| a.agent_company_external_id.is_some()).unwrap();
        assert_eq!(agented.agent_company_external_id, Some("1:200".to_string()));
    }
}
