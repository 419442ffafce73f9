//! Normalized target entities
//!
//! The entity graph produced by the transform layer and persisted by the
//! load gateway. Every entity carries a stable `external_id` derived from
//! its legacy keys; the load gateway upserts on it, so re-imports of
//! unchanged data are no-ops.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Licence, identified by its licence number business key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Licence {
    pub licence_number: String,
    pub region_code: i64,
    pub is_water_undertaker: bool,
    pub start_date: Option<NaiveDate>,
    pub expired_date: Option<NaiveDate>,
    pub lapsed_date: Option<NaiveDate>,
    pub revoked_date: Option<NaiveDate>,
    pub regions: RegionInfo,
}

/// Regional charging metadata carried on the licence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub historical_area_code: String,
    pub regional_charge_area: String,
    pub standard_unit_charge_code: String,
    pub local_environment_agency_plan_code: String,
}

/// Licence version status, mapped from legacy `CURR|SUPER|DRAFT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Current,
    Superseded,
    Draft,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Current => "current",
            VersionStatus::Superseded => "superseded",
            VersionStatus::Draft => "draft",
        }
    }
}

/// One licence version per distinct `(issue, increment)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenceVersion {
    pub issue: i64,
    pub increment: i64,
    pub status: VersionStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub external_id: String,
    pub purposes: Vec<Purpose>,
}

/// Abstraction purpose attached to a licence version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purpose {
    pub issue: i64,
    pub increment: i64,
    pub primary_code: String,
    pub secondary_code: String,
    pub use_code: String,
    pub abstraction_period: AbstractionPeriod,
    pub time_limited_start_date: Option<NaiveDate>,
    pub time_limited_end_date: Option<NaiveDate>,
    pub annual_quantity: Option<f64>,
    pub external_id: String,
}

/// Day/month window within which abstraction is permitted each year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractionPeriod {
    pub start_day: u32,
    pub start_month: u32,
    pub end_day: u32,
    pub end_month: u32,
}

/// Company type: a real organisation or a person modelled as a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyType {
    Person,
    Organisation,
}

/// Company party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub company_type: CompanyType,
    pub external_id: String,
}

/// Contact party (persons only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub salutation: Option<String>,
    pub initials: Option<String>,
    pub first_name: Option<String>,
    pub last_name: String,
    pub external_id: String,
}

/// Postal address, deduplicated by external id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub address4: Option<String>,
    pub town: Option<String>,
    pub county: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub external_id: String,
}

/// Capacity in which a party/address is associated with a licence or company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoleKind {
    LicenceHolder,
    Billing,
}

impl RoleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::LicenceHolder => "licenceHolder",
            RoleKind::Billing => "billing",
        }
    }
}

/// Time-boxed association between a company and an address.
/// `end_date = None` means open-ended/current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyAddress {
    pub role: RoleKind,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub address: Address,
}

/// Time-boxed association between a company and a contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyContact {
    pub role: RoleKind,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub contact: Contact,
}

/// Time-boxed association between a licence document and a party/address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRole {
    pub role: RoleKind,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub company_external_id: String,
    pub contact_external_id: Option<String>,
    pub address_external_id: Option<String>,
    pub invoice_account_number: Option<String>,
}

/// Invoice account with its address intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceAccount {
    pub invoice_account_number: String,
    pub start_date: Option<NaiveDate>,
    pub addresses: Vec<InvoiceAccountAddress>,
}

/// Address interval on an invoice account, optionally via an agent company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceAccountAddress {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub address: Address,
    pub agent_company_external_id: Option<String>,
}

/// Financial agreement attached to a licence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub agreement_code: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Fully assembled licence graph, ready for idempotent load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenceGraph {
    pub licence: Licence,
    pub versions: Vec<LicenceVersion>,
    pub agreements: Vec<Agreement>,
    pub document_roles: Vec<DocumentRole>,
    /// Whether charging data was imported for this licence; drives the
    /// supplementary billing flag
    pub has_charge_versions: bool,
}

/// Fully assembled company graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyGraph {
    pub company: Company,
    pub contact: Option<Contact>,
    pub addresses: Vec<CompanyAddress>,
    pub contacts: Vec<CompanyContact>,
    pub invoice_accounts: Vec<InvoiceAccount>,
}
