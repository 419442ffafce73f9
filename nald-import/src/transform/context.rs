//! Pre-fetched lookup context for the transform layer
//!
//! The mappers perform no I/O: every party and address a bundle of rows can
//! reference is fetched up front and handed over in a `TransformContext`.
//! A reference to a party or address that was never extracted is a
//! data-integrity error, reported with its legacy region+id.

use crate::models::raw::{AddressRow, PartyRow};
use nald_common::{Error, Result};
use std::collections::HashMap;

/// Lookup structures keyed by legacy `(region_code, id)`
#[derive(Debug, Default)]
pub struct TransformContext {
    parties: HashMap<(i64, i64), PartyRow>,
    addresses: HashMap<(i64, i64), AddressRow>,
}

impl TransformContext {
    pub fn new(parties: Vec<PartyRow>, addresses: Vec<AddressRow>) -> Self {
        Self {
            parties: parties
                .into_iter()
                .map(|p| ((p.region_code, p.party_id), p))
                .collect(),
            addresses: addresses
                .into_iter()
                .map(|a| ((a.region_code, a.address_id), a))
                .collect(),
        }
    }

    /// Look up a party; absence is an unresolvable foreign key
    pub fn party(&self, region_code: i64, party_id: i64) -> Result<&PartyRow> {
        self.parties.get(&(region_code, party_id)).ok_or_else(|| {
            Error::transform(
                region_code,
                party_id.to_string(),
                "party referenced but never extracted",
            )
        })
    }

    /// Look up an address; absence is an unresolvable foreign key
    pub fn address(&self, region_code: i64, address_id: i64) -> Result<&AddressRow> {
        self.addresses.get(&(region_code, address_id)).ok_or_else(|| {
            Error::transform(
                region_code,
                address_id.to_string(),
                "address referenced but never extracted",
            )
        })
    }
}
