//! External id construction
//!
//! External ids are the idempotency keys for every load-gateway upsert, so
//! their construction is centralized here and must stay byte-for-byte
//! stable across releases: legacy key components joined with a literal
//! colon, in the documented order. Changing the field order or delimiter
//! would orphan every previously loaded row.

/// `region:party_id` — companies and contacts share the party keyspace
pub fn party_external_id(region_code: i64, party_id: i64) -> String {
    format!("{region_code}:{party_id}")
}

/// `region:address_id`
pub fn address_external_id(region_code: i64, address_id: i64) -> String {
    format!("{region_code}:{address_id}")
}

/// `region:licence_id:issue:increment`
pub fn licence_version_external_id(
    region_code: i64,
    licence_id: i64,
    issue: i64,
    increment: i64,
) -> String {
    format!("{region_code}:{licence_id}:{issue}:{increment}")
}

/// `region:purpose_id`
pub fn purpose_external_id(region_code: i64, purpose_id: i64) -> String {
    format!("{region_code}:{purpose_id}")
}

/// `region:bill_run_no` — reconciliation key for imported NALD bill runs
pub fn bill_run_legacy_id(region_code: i64, bill_run_no: i64) -> String {
    format!("{region_code}:{bill_run_no}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_colon_joined_in_documented_order() {
        assert_eq!(party_external_id(1, 100), "1:100");
        assert_eq!(address_external_id(8, 1005), "8:1005");
        assert_eq!(licence_version_external_id(1, 10, 100, 1), "1:10:100:1");
        assert_eq!(purpose_external_id(3, 42), "3:42");
        assert_eq!(bill_run_legacy_id(2, 509), "2:509");
    }

    #[test]
    fn keys_are_stable_across_repeated_construction() {
        // Round-trip determinism: same inputs, identical bytes
        let a = licence_version_external_id(1, 10, 100, 1);
        let b = licence_version_external_id(1, 10, 100, 1);
        assert_eq!(a, b);
    }
}
