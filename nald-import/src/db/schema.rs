//! Schema initialization
//!
//! Creates the NALD staging tables and the normalized target tables if they
//! do not exist. Every target table that the load gateway upserts into
//! carries a UNIQUE constraint on its external id (or equivalent natural
//! key) — that constraint is what makes re-imports no-ops.

use nald_common::Result;
use sqlx::SqlitePool;

/// Staging tables: denormalized NALD rows, one row per historical edit.
/// Date columns are text in NALD's `DD/MM/YYYY` format with the literal
/// string `null` for absent values.
const STAGING_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS nald_licences (
        lic_no TEXT NOT NULL,
        licence_id INTEGER NOT NULL,
        region_code INTEGER NOT NULL,
        orig_eff_date TEXT NOT NULL DEFAULT 'null',
        expiry_date TEXT NOT NULL DEFAULT 'null',
        lapsed_date TEXT NOT NULL DEFAULT 'null',
        rev_date TEXT NOT NULL DEFAULT 'null',
        area_code TEXT NOT NULL DEFAULT '',
        eiuc_code TEXT NOT NULL DEFAULT '',
        leap_code TEXT NOT NULL DEFAULT '',
        suc_code TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nald_licence_versions (
        region_code INTEGER NOT NULL,
        licence_id INTEGER NOT NULL,
        issue_no INTEGER NOT NULL,
        incr_no INTEGER NOT NULL,
        status TEXT NOT NULL,
        eff_st_date TEXT NOT NULL DEFAULT 'null',
        eff_end_date TEXT NOT NULL DEFAULT 'null',
        expiry_date TEXT NOT NULL DEFAULT 'null',
        rev_date TEXT NOT NULL DEFAULT 'null',
        lapsed_date TEXT NOT NULL DEFAULT 'null',
        party_id INTEGER NOT NULL,
        address_id INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nald_charge_versions (
        region_code INTEGER NOT NULL,
        licence_id INTEGER NOT NULL,
        party_id INTEGER NOT NULL,
        address_id INTEGER NOT NULL,
        ias_cust_ref TEXT NOT NULL,
        ias_xfer_date TEXT NOT NULL DEFAULT 'null'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nald_licence_purposes (
        region_code INTEGER NOT NULL,
        purpose_id INTEGER NOT NULL,
        licence_id INTEGER NOT NULL,
        issue_no INTEGER NOT NULL,
        incr_no INTEGER NOT NULL,
        primary_code TEXT NOT NULL,
        secondary_code TEXT NOT NULL,
        use_code TEXT NOT NULL,
        period_st_day INTEGER NOT NULL,
        period_st_month INTEGER NOT NULL,
        period_end_day INTEGER NOT NULL,
        period_end_month INTEGER NOT NULL,
        timeltd_st_date TEXT NOT NULL DEFAULT 'null',
        timeltd_end_date TEXT NOT NULL DEFAULT 'null',
        annual_qty TEXT NOT NULL DEFAULT 'null'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nald_parties (
        region_code INTEGER NOT NULL,
        party_id INTEGER NOT NULL,
        party_type TEXT NOT NULL,
        name TEXT NOT NULL DEFAULT 'null',
        forename TEXT NOT NULL DEFAULT 'null',
        initials TEXT NOT NULL DEFAULT 'null',
        salutation TEXT NOT NULL DEFAULT 'null'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nald_addresses (
        region_code INTEGER NOT NULL,
        address_id INTEGER NOT NULL,
        addr_line1 TEXT NOT NULL DEFAULT 'null',
        addr_line2 TEXT NOT NULL DEFAULT 'null',
        addr_line3 TEXT NOT NULL DEFAULT 'null',
        addr_line4 TEXT NOT NULL DEFAULT 'null',
        town TEXT NOT NULL DEFAULT 'null',
        county TEXT NOT NULL DEFAULT 'null',
        postcode TEXT NOT NULL DEFAULT 'null',
        country TEXT NOT NULL DEFAULT 'null'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nald_invoice_accounts (
        region_code INTEGER NOT NULL,
        party_id INTEGER NOT NULL,
        ias_cust_ref TEXT NOT NULL,
        start_date TEXT NOT NULL DEFAULT 'null',
        address_id INTEGER NOT NULL,
        agent_party_id INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nald_agreements (
        region_code INTEGER NOT NULL,
        licence_id INTEGER NOT NULL,
        afsa_code TEXT NOT NULL,
        eff_st_date TEXT NOT NULL DEFAULT 'null',
        eff_end_date TEXT NOT NULL DEFAULT 'null'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nald_bill_runs (
        region_code INTEGER NOT NULL,
        bill_run_no INTEGER NOT NULL,
        bill_run_type TEXT NOT NULL,
        fin_year TEXT NOT NULL,
        initiation_date TEXT NOT NULL DEFAULT 'null',
        no_of_invs TEXT NOT NULL DEFAULT 'null',
        no_of_crns TEXT NOT NULL DEFAULT 'null',
        value_of_invs TEXT NOT NULL DEFAULT 'null',
        value_of_crns TEXT NOT NULL DEFAULT 'null',
        ias_xfer_date TEXT NOT NULL DEFAULT 'null'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nald_bill_headers (
        region_code INTEGER NOT NULL,
        header_id INTEGER NOT NULL,
        bill_run_no INTEGER NOT NULL,
        ias_cust_ref TEXT NOT NULL,
        net_amount TEXT NOT NULL DEFAULT '0',
        bill_type TEXT NOT NULL,
        fin_year TEXT NOT NULL,
        bill_no TEXT NOT NULL DEFAULT 'null'
    )
    "#,
];

/// Normalized target tables, upserted by the load gateway
const TARGET_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS licences (
        licence_number TEXT NOT NULL UNIQUE,
        region_code INTEGER NOT NULL,
        is_water_undertaker INTEGER NOT NULL,
        start_date TEXT,
        expired_date TEXT,
        lapsed_date TEXT,
        revoked_date TEXT,
        regions TEXT NOT NULL,
        include_in_supplementary_billing INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS licence_versions (
        external_id TEXT NOT NULL UNIQUE,
        licence_number TEXT NOT NULL,
        issue INTEGER NOT NULL,
        increment INTEGER NOT NULL,
        status TEXT NOT NULL,
        start_date TEXT,
        end_date TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS licence_purposes (
        external_id TEXT NOT NULL UNIQUE,
        version_external_id TEXT NOT NULL,
        primary_code TEXT NOT NULL,
        secondary_code TEXT NOT NULL,
        use_code TEXT NOT NULL,
        period_start_day INTEGER NOT NULL,
        period_start_month INTEGER NOT NULL,
        period_end_day INTEGER NOT NULL,
        period_end_month INTEGER NOT NULL,
        time_limited_start_date TEXT,
        time_limited_end_date TEXT,
        annual_quantity REAL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        external_id TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        company_type TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contacts (
        external_id TEXT NOT NULL UNIQUE,
        salutation TEXT,
        initials TEXT,
        first_name TEXT,
        last_name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS addresses (
        external_id TEXT NOT NULL UNIQUE,
        address1 TEXT,
        address2 TEXT,
        address3 TEXT,
        address4 TEXT,
        town TEXT,
        county TEXT,
        postcode TEXT,
        country TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS company_addresses (
        company_external_id TEXT NOT NULL,
        address_external_id TEXT NOT NULL,
        role TEXT NOT NULL,
        start_date TEXT,
        end_date TEXT,
        UNIQUE (company_external_id, address_external_id, role)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS company_contacts (
        company_external_id TEXT NOT NULL,
        contact_external_id TEXT NOT NULL,
        role TEXT NOT NULL,
        start_date TEXT,
        end_date TEXT,
        UNIQUE (company_external_id, contact_external_id, role)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS document_roles (
        document_ref TEXT NOT NULL,
        role TEXT NOT NULL,
        company_external_id TEXT NOT NULL,
        contact_external_id TEXT,
        address_external_id TEXT,
        invoice_account_number TEXT,
        start_date TEXT,
        end_date TEXT,
        UNIQUE (document_ref, role, company_external_id, address_external_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invoice_accounts (
        invoice_account_number TEXT NOT NULL UNIQUE,
        start_date TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invoice_account_addresses (
        invoice_account_number TEXT NOT NULL,
        address_external_id TEXT NOT NULL,
        start_date TEXT,
        end_date TEXT,
        agent_company_external_id TEXT,
        UNIQUE (invoice_account_number, address_external_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS agreements (
        licence_number TEXT NOT NULL,
        agreement_code TEXT NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT,
        UNIQUE (licence_number, agreement_code, start_date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS billing_batches (
        legacy_id TEXT NOT NULL UNIQUE,
        region_code INTEGER NOT NULL,
        batch_type TEXT NOT NULL,
        from_financial_year_ending INTEGER NOT NULL,
        to_financial_year_ending INTEGER NOT NULL,
        status TEXT NOT NULL,
        invoice_count INTEGER,
        credit_note_count INTEGER,
        net_total INTEGER,
        bill_run_number INTEGER NOT NULL,
        source TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS billing_invoices (
        legacy_id TEXT NOT NULL UNIQUE,
        batch_legacy_id TEXT NOT NULL,
        invoice_account_number TEXT NOT NULL,
        net_amount INTEGER NOT NULL,
        is_credit INTEGER NOT NULL,
        financial_year_ending INTEGER NOT NULL,
        invoice_number TEXT
    )
    "#,
];

/// Create staging and target tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    for statement in STAGING_TABLES.iter().chain(TARGET_TABLES) {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("Database tables initialized (staging + target schema)");
    Ok(())
}
