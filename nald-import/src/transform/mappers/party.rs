//! Party and address mappers
//!
//! NALD parties are `PER` (person) or `ORG` (organisation). Both become a
//! Company in the target model; persons additionally get a Contact so
//! correspondence can name the individual.

use crate::models::entities::{Address, Company, CompanyType, Contact};
use crate::models::raw::{AddressRow, PartyRow};
use crate::transform::external_id::{address_external_id, party_external_id};
use crate::transform::mappers::opt_text;
use nald_common::{Error, Result};

fn is_person(row: &PartyRow) -> bool {
    row.party_type == "PER"
}

/// Person display name: salutation, initials (or forename) and surname,
/// absent parts skipped
fn person_name(row: &PartyRow) -> String {
    let initials_or_forename = opt_text(&row.initials).or_else(|| opt_text(&row.forename));
    [opt_text(&row.salutation), initials_or_forename, opt_text(&row.name)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map a party row to a Company
pub fn map_company(row: &PartyRow) -> Result<Company> {
    let (name, company_type) = if is_person(row) {
        (person_name(row), CompanyType::Person)
    } else {
        match opt_text(&row.name) {
            Some(name) => (name, CompanyType::Organisation),
            None => {
                return Err(Error::transform(
                    row.region_code,
                    row.party_id.to_string(),
                    "organisation party has no name",
                ))
            }
        }
    };

    Ok(Company {
        name,
        company_type,
        external_id: party_external_id(row.region_code, row.party_id),
    })
}

/// Map a person party to a Contact; organisations have none
pub fn map_contact(row: &PartyRow) -> Result<Option<Contact>> {
    if !is_person(row) {
        return Ok(None);
    }
    let last_name = opt_text(&row.name).ok_or_else(|| {
        Error::transform(
            row.region_code,
            row.party_id.to_string(),
            "person party has no surname",
        )
    })?;
    Ok(Some(Contact {
        salutation: opt_text(&row.salutation),
        initials: opt_text(&row.initials),
        first_name: opt_text(&row.forename),
        last_name,
        external_id: party_external_id(row.region_code, row.party_id),
    }))
}

/// Map an address row; every free-text field may be absent
pub fn map_address(row: &AddressRow) -> Address {
    Address {
        address1: opt_text(&row.addr_line1),
        address2: opt_text(&row.addr_line2),
        address3: opt_text(&row.addr_line3),
        address4: opt_text(&row.addr_line4),
        town: opt_text(&row.town),
        county: opt_text(&row.county),
        postcode: opt_text(&row.postcode),
        country: opt_text(&row.country),
        external_id: address_external_id(row.region_code, row.address_id),
    }
}
