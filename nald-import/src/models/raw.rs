//! Raw NALD row types
//!
//! One struct per legacy staging table, matching the denormalized NALD
//! layout: one row per historical edit event, dates as `DD/MM/YYYY` text
//! with the literal string `null` for absent values. Date fields stay as
//! text here; parsing happens in the transform layer so unparseable legacy
//! values surface where they can be reported with row context.

use sqlx::FromRow;

/// Licence header row (`nald_licences`)
#[derive(Debug, Clone, FromRow)]
pub struct LicenceRow {
    pub lic_no: String,
    /// Legacy licence id (`AABL_ID`)
    pub licence_id: i64,
    /// Legacy region code (`FGAC_REGION_CODE`)
    pub region_code: i64,
    pub orig_eff_date: String,
    pub expiry_date: String,
    pub lapsed_date: String,
    pub rev_date: String,
    /// Historical area code (`AREP_AREA_CODE`)
    pub area_code: String,
    /// EIUC code; a `*SWC` suffix marks a water undertaker
    pub eiuc_code: String,
    /// Local Environment Agency Plan code (`AREP_LEAP_CODE`)
    pub leap_code: String,
    /// Standard unit charge code (`AREP_SUC_CODE`)
    pub suc_code: String,
}

/// Licence version row (`nald_licence_versions`)
///
/// One row per historical edit of a version; the same `(issue, increment)`
/// pair can appear many times with different party/address associations.
#[derive(Debug, Clone, FromRow)]
pub struct LicenceVersionRow {
    pub region_code: i64,
    pub licence_id: i64,
    pub issue_no: i64,
    pub incr_no: i64,
    /// Legacy status code: `CURR`, `SUPER` or `DRAFT`
    pub status: String,
    pub eff_st_date: String,
    pub eff_end_date: String,
    pub expiry_date: String,
    pub rev_date: String,
    pub lapsed_date: String,
    /// Party holding the licence for this edit (`ACON_APAR_ID`)
    pub party_id: i64,
    /// Address associated with this edit (`ACON_AADD_ID`)
    pub address_id: i64,
}

/// Charge version row (`nald_charge_versions`)
#[derive(Debug, Clone, FromRow)]
pub struct ChargeVersionRow {
    pub region_code: i64,
    pub licence_id: i64,
    /// Billing party (`ACON_APAR_ID`)
    pub party_id: i64,
    /// Billing address (`ACON_AADD_ID`)
    pub address_id: i64,
    /// Invoice account number (`IAS_CUST_REF`)
    pub ias_cust_ref: String,
    /// Point-in-time transfer into the invoicing system (`IAS_XFER_DATE`)
    pub ias_xfer_date: String,
}

/// Licence purpose row (`nald_licence_purposes`)
#[derive(Debug, Clone, FromRow)]
pub struct PurposeRow {
    pub region_code: i64,
    pub purpose_id: i64,
    pub licence_id: i64,
    pub issue_no: i64,
    pub incr_no: i64,
    pub primary_code: String,
    pub secondary_code: String,
    pub use_code: String,
    pub period_st_day: i64,
    pub period_st_month: i64,
    pub period_end_day: i64,
    pub period_end_month: i64,
    pub timeltd_st_date: String,
    pub timeltd_end_date: String,
    /// Annual quantity in megalitres, `null` when unconstrained
    pub annual_qty: String,
}

/// Party row (`nald_parties`): a person or an organisation
#[derive(Debug, Clone, FromRow)]
pub struct PartyRow {
    pub region_code: i64,
    pub party_id: i64,
    /// `PER` (person) or `ORG` (organisation)
    pub party_type: String,
    /// Surname for persons, full name for organisations
    pub name: String,
    pub forename: String,
    pub initials: String,
    pub salutation: String,
}

/// Address row (`nald_addresses`)
#[derive(Debug, Clone, FromRow)]
pub struct AddressRow {
    pub region_code: i64,
    pub address_id: i64,
    pub addr_line1: String,
    pub addr_line2: String,
    pub addr_line3: String,
    pub addr_line4: String,
    pub town: String,
    pub county: String,
    pub postcode: String,
    pub country: String,
}

/// Invoice account row (`nald_invoice_accounts`)
///
/// One row per account address assignment; the agent party is set when the
/// account is billed through someone other than the licence holder.
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceAccountRow {
    pub region_code: i64,
    pub party_id: i64,
    pub ias_cust_ref: String,
    pub start_date: String,
    pub address_id: i64,
    pub agent_party_id: Option<i64>,
}

/// Financial agreement row (section 127 / section 130)
#[derive(Debug, Clone, FromRow)]
pub struct AgreementRow {
    pub region_code: i64,
    pub licence_id: i64,
    /// Agreement code, e.g. `S127`, `S130U`, `S130W`
    pub afsa_code: String,
    pub eff_st_date: String,
    pub eff_end_date: String,
}

/// Discovery scan row: distinct licence numbers
#[derive(Debug, Clone, FromRow)]
pub struct LicenceNumberRow {
    pub lic_no: String,
}

/// Discovery scan row: distinct region + party pairs
#[derive(Debug, Clone, FromRow)]
pub struct PartyRefRow {
    pub region_code: i64,
    pub party_id: i64,
}
