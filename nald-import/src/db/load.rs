//! Load gateway: idempotent upserts into the normalized target schema
//!
//! Every write resolves its row by external id (or the equivalent natural
//! key) and either inserts or updates in place, so delivering the same
//! graph twice leaves the database unchanged. Bill runs bypass the entity
//! graph entirely and load straight from staging with
//! `INSERT ... SELECT ... ON CONFLICT DO NOTHING`.

use crate::models::entities::{
    Address, Agreement, Company, CompanyAddress, CompanyContact, CompanyGraph, Contact,
    DocumentRole, InvoiceAccount, Licence, LicenceGraph, LicenceVersion,
};
use async_trait::async_trait;
use nald_common::{Error, Result};
use sqlx::SqlitePool;

/// Idempotent writes into the normalized schema
#[async_trait]
pub trait LoadGateway: Send + Sync {
    async fn upsert_licence(&self, licence: &Licence) -> Result<()>;
    async fn upsert_licence_version(
        &self,
        licence_number: &str,
        version: &LicenceVersion,
    ) -> Result<()>;
    async fn upsert_company(&self, company: &Company) -> Result<()>;
    async fn upsert_contact(&self, contact: &Contact) -> Result<()>;
    async fn upsert_address(&self, address: &Address) -> Result<()>;
    async fn upsert_company_address(
        &self,
        company_external_id: &str,
        entry: &CompanyAddress,
    ) -> Result<()>;
    async fn upsert_company_contact(
        &self,
        company_external_id: &str,
        entry: &CompanyContact,
    ) -> Result<()>;
    async fn upsert_document_role(&self, document_ref: &str, role: &DocumentRole) -> Result<()>;
    async fn upsert_invoice_account(&self, account: &InvoiceAccount) -> Result<()>;
    async fn upsert_agreement(&self, licence_number: &str, agreement: &Agreement) -> Result<()>;
    /// Mark a licence for inclusion in the next supplementary bill run
    async fn flag_for_supplementary_billing(&self, licence_number: &str) -> Result<()>;
    /// Load one region's historical bill runs and invoices from staging.
    /// Returns `(batches, invoices)` newly inserted.
    async fn import_bill_runs(&self, region_code: i64) -> Result<(u64, u64)>;
}

/// SQLite-backed load gateway
#[derive(Clone)]
pub struct SqliteLoader {
    pool: SqlitePool,
}

impl SqliteLoader {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoadGateway for SqliteLoader {
    async fn upsert_licence(&self, licence: &Licence) -> Result<()> {
        let regions = serde_json::to_string(&licence.regions)
            .map_err(|e| Error::Internal(format!("Failed to serialize region info: {}", e)))?;
        sqlx::query(
            "INSERT INTO licences
                 (licence_number, region_code, is_water_undertaker, start_date,
                  expired_date, lapsed_date, revoked_date, regions)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (licence_number) DO UPDATE SET
                 region_code = excluded.region_code,
                 is_water_undertaker = excluded.is_water_undertaker,
                 start_date = excluded.start_date,
                 expired_date = excluded.expired_date,
                 lapsed_date = excluded.lapsed_date,
                 revoked_date = excluded.revoked_date,
                 regions = excluded.regions,
                 updated_at = CURRENT_TIMESTAMP",
        )
        .bind(&licence.licence_number)
        .bind(licence.region_code)
        .bind(licence.is_water_undertaker)
        .bind(licence.start_date)
        .bind(licence.expired_date)
        .bind(licence.lapsed_date)
        .bind(licence.revoked_date)
        .bind(regions)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_licence_version(
        &self,
        licence_number: &str,
        version: &LicenceVersion,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO licence_versions
                 (external_id, licence_number, issue, increment, status, start_date, end_date)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (external_id) DO UPDATE SET
                 licence_number = excluded.licence_number,
                 status = excluded.status,
                 start_date = excluded.start_date,
                 end_date = excluded.end_date",
        )
        .bind(&version.external_id)
        .bind(licence_number)
        .bind(version.issue)
        .bind(version.increment)
        .bind(version.status.as_str())
        .bind(version.start_date)
        .bind(version.end_date)
        .execute(&self.pool)
        .await?;

        for purpose in &version.purposes {
            sqlx::query(
                "INSERT INTO licence_purposes
                     (external_id, version_external_id, primary_code, secondary_code,
                      use_code, period_start_day, period_start_month, period_end_day,
                      period_end_month, time_limited_start_date, time_limited_end_date,
                      annual_quantity)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT (external_id) DO UPDATE SET
                     version_external_id = excluded.version_external_id,
                     primary_code = excluded.primary_code,
                     secondary_code = excluded.secondary_code,
                     use_code = excluded.use_code,
                     period_start_day = excluded.period_start_day,
                     period_start_month = excluded.period_start_month,
                     period_end_day = excluded.period_end_day,
                     period_end_month = excluded.period_end_month,
                     time_limited_start_date = excluded.time_limited_start_date,
                     time_limited_end_date = excluded.time_limited_end_date,
                     annual_quantity = excluded.annual_quantity",
            )
            .bind(&purpose.external_id)
            .bind(&version.external_id)
            .bind(&purpose.primary_code)
            .bind(&purpose.secondary_code)
            .bind(&purpose.use_code)
            .bind(purpose.abstraction_period.start_day)
            .bind(purpose.abstraction_period.start_month)
            .bind(purpose.abstraction_period.end_day)
            .bind(purpose.abstraction_period.end_month)
            .bind(purpose.time_limited_start_date)
            .bind(purpose.time_limited_end_date)
            .bind(purpose.annual_quantity)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn upsert_company(&self, company: &Company) -> Result<()> {
        sqlx::query(
            "INSERT INTO companies (external_id, name, company_type)
             VALUES (?, ?, ?)
             ON CONFLICT (external_id) DO UPDATE SET
                 name = excluded.name,
                 company_type = excluded.company_type",
        )
        .bind(&company.external_id)
        .bind(&company.name)
        .bind(match company.company_type {
            crate::models::entities::CompanyType::Person => "person",
            crate::models::entities::CompanyType::Organisation => "organisation",
        })
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_contact(&self, contact: &Contact) -> Result<()> {
        sqlx::query(
            "INSERT INTO contacts (external_id, salutation, initials, first_name, last_name)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (external_id) DO UPDATE SET
                 salutation = excluded.salutation,
                 initials = excluded.initials,
                 first_name = excluded.first_name,
                 last_name = excluded.last_name",
        )
        .bind(&contact.external_id)
        .bind(&contact.salutation)
        .bind(&contact.initials)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_address(&self, address: &Address) -> Result<()> {
        sqlx::query(
            "INSERT INTO addresses
                 (external_id, address1, address2, address3, address4,
                  town, county, postcode, country)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (external_id) DO UPDATE SET
                 address1 = excluded.address1,
                 address2 = excluded.address2,
                 address3 = excluded.address3,
                 address4 = excluded.address4,
                 town = excluded.town,
                 county = excluded.county,
                 postcode = excluded.postcode,
                 country = excluded.country",
        )
        .bind(&address.external_id)
        .bind(&address.address1)
        .bind(&address.address2)
        .bind(&address.address3)
        .bind(&address.address4)
        .bind(&address.town)
        .bind(&address.county)
        .bind(&address.postcode)
        .bind(&address.country)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_company_address(
        &self,
        company_external_id: &str,
        entry: &CompanyAddress,
    ) -> Result<()> {
        self.upsert_address(&entry.address).await?;
        sqlx::query(
            "INSERT INTO company_addresses
                 (company_external_id, address_external_id, role, start_date, end_date)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (company_external_id, address_external_id, role) DO UPDATE SET
                 start_date = excluded.start_date,
                 end_date = excluded.end_date",
        )
        .bind(company_external_id)
        .bind(&entry.address.external_id)
        .bind(entry.role.as_str())
        .bind(entry.start_date)
        .bind(entry.end_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_company_contact(
        &self,
        company_external_id: &str,
        entry: &CompanyContact,
    ) -> Result<()> {
        self.upsert_contact(&entry.contact).await?;
        sqlx::query(
            "INSERT INTO company_contacts
                 (company_external_id, contact_external_id, role, start_date, end_date)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (company_external_id, contact_external_id, role) DO UPDATE SET
                 start_date = excluded.start_date,
                 end_date = excluded.end_date",
        )
        .bind(company_external_id)
        .bind(&entry.contact.external_id)
        .bind(entry.role.as_str())
        .bind(entry.start_date)
        .bind(entry.end_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_document_role(&self, document_ref: &str, role: &DocumentRole) -> Result<()> {
        sqlx::query(
            "INSERT INTO document_roles
                 (document_ref, role, company_external_id, contact_external_id,
                  address_external_id, invoice_account_number, start_date, end_date)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (document_ref, role, company_external_id, address_external_id)
             DO UPDATE SET
                 contact_external_id = excluded.contact_external_id,
                 invoice_account_number = excluded.invoice_account_number,
                 start_date = excluded.start_date,
                 end_date = excluded.end_date",
        )
        .bind(document_ref)
        .bind(role.role.as_str())
        .bind(&role.company_external_id)
        .bind(&role.contact_external_id)
        .bind(&role.address_external_id)
        .bind(&role.invoice_account_number)
        .bind(role.start_date)
        .bind(role.end_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_invoice_account(&self, account: &InvoiceAccount) -> Result<()> {
        sqlx::query(
            "INSERT INTO invoice_accounts (invoice_account_number, start_date)
             VALUES (?, ?)
             ON CONFLICT (invoice_account_number) DO UPDATE SET
                 start_date = excluded.start_date",
        )
        .bind(&account.invoice_account_number)
        .bind(account.start_date)
        .execute(&self.pool)
        .await?;

        for entry in &account.addresses {
            self.upsert_address(&entry.address).await?;
            sqlx::query(
                "INSERT INTO invoice_account_addresses
                     (invoice_account_number, address_external_id, start_date,
                      end_date, agent_company_external_id)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT (invoice_account_number, address_external_id) DO UPDATE SET
                     start_date = excluded.start_date,
                     end_date = excluded.end_date,
                     agent_company_external_id = excluded.agent_company_external_id",
            )
            .bind(&account.invoice_account_number)
            .bind(&entry.address.external_id)
            .bind(entry.start_date)
            .bind(entry.end_date)
            .bind(&entry.agent_company_external_id)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn upsert_agreement(&self, licence_number: &str, agreement: &Agreement) -> Result<()> {
        sqlx::query(
            "INSERT INTO agreements (licence_number, agreement_code, start_date, end_date)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (licence_number, agreement_code, start_date) DO UPDATE SET
                 end_date = excluded.end_date",
        )
        .bind(licence_number)
        .bind(&agreement.agreement_code)
        .bind(agreement.start_date)
        .bind(agreement.end_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn flag_for_supplementary_billing(&self, licence_number: &str) -> Result<()> {
        sqlx::query(
            "UPDATE licences
             SET include_in_supplementary_billing = 1, updated_at = CURRENT_TIMESTAMP
             WHERE licence_number = ? AND include_in_supplementary_billing = 0",
        )
        .bind(licence_number)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn import_bill_runs(&self, region_code: i64) -> Result<(u64, u64)> {
        // Pre-2015 runs predate the current charging scheme and never left
        // the legacy system, so they are excluded along with runs that were
        // never transferred to invoicing.
        let batches = sqlx::query(
            "INSERT INTO billing_batches
                 (legacy_id, region_code, batch_type, from_financial_year_ending,
                  to_financial_year_ending, status, invoice_count, credit_note_count,
                  net_total, bill_run_number, source)
             SELECT
                 region_code || ':' || bill_run_no,
                 region_code,
                 CASE bill_run_type
                     WHEN 'A' THEN 'annual'
                     WHEN 'S' THEN 'supplementary'
                     WHEN 'R' THEN 'two_part_tariff'
                 END,
                 CAST(fin_year AS INTEGER),
                 CAST(fin_year AS INTEGER),
                 'sent',
                 CASE WHEN no_of_invs = 'null' THEN NULL
                      ELSE CAST(no_of_invs AS INTEGER) END,
                 CASE WHEN no_of_crns = 'null' THEN NULL
                      ELSE CAST(no_of_crns AS INTEGER) END,
                 CASE WHEN value_of_invs = 'null' OR value_of_crns = 'null' THEN NULL
                      ELSE CAST(value_of_invs AS INTEGER) + CAST(value_of_crns AS INTEGER) END,
                 bill_run_no,
                 'nald'
             FROM nald_bill_runs
             WHERE region_code = ?
               AND bill_run_type IN ('A', 'S', 'R')
               AND CAST(fin_year AS INTEGER) >= 2015
               AND ias_xfer_date <> 'null'
             ON CONFLICT (legacy_id) DO NOTHING",
        )
        .bind(region_code)
        .execute(&self.pool)
        .await?
        .rows_affected();

        let invoices = sqlx::query(
            "INSERT INTO billing_invoices
                 (legacy_id, batch_legacy_id, invoice_account_number, net_amount,
                  is_credit, financial_year_ending, invoice_number)
             SELECT
                 h.region_code || ':' || h.header_id,
                 h.region_code || ':' || h.bill_run_no,
                 h.ias_cust_ref,
                 CAST(h.net_amount AS INTEGER),
                 CASE WHEN h.bill_type = 'C' THEN 1 ELSE 0 END,
                 CAST(h.fin_year AS INTEGER),
                 CASE WHEN h.bill_no = 'null' THEN NULL ELSE h.bill_no END
             FROM nald_bill_headers h
             JOIN nald_bill_runs r
               ON r.region_code = h.region_code AND r.bill_run_no = h.bill_run_no
             WHERE h.region_code = ?
               AND r.bill_run_type IN ('A', 'S', 'R')
               AND CAST(r.fin_year AS INTEGER) >= 2015
               AND r.ias_xfer_date <> 'null'
             ON CONFLICT (legacy_id) DO NOTHING",
        )
        .bind(region_code)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(
            region_code,
            batches,
            invoices,
            "Imported historical bill runs from staging"
        );
        Ok((batches, invoices))
    }
}

/// Persist a licence graph through the gateway
pub async fn load_licence_graph(gateway: &dyn LoadGateway, graph: &LicenceGraph) -> Result<()> {
    let licence_number = &graph.licence.licence_number;
    gateway.upsert_licence(&graph.licence).await?;
    for version in &graph.versions {
        gateway.upsert_licence_version(licence_number, version).await?;
    }
    for agreement in &graph.agreements {
        gateway.upsert_agreement(licence_number, agreement).await?;
    }
    for role in &graph.document_roles {
        gateway.upsert_document_role(licence_number, role).await?;
    }
    if graph.has_charge_versions {
        gateway.flag_for_supplementary_billing(licence_number).await?;
    }
    Ok(())
}

/// Persist a company graph through the gateway
pub async fn load_company_graph(gateway: &dyn LoadGateway, graph: &CompanyGraph) -> Result<()> {
    gateway.upsert_company(&graph.company).await?;
    if let Some(contact) = &graph.contact {
        gateway.upsert_contact(contact).await?;
    }
    for entry in &graph.addresses {
        gateway
            .upsert_company_address(&graph.company.external_id, entry)
            .await?;
    }
    for entry in &graph.contacts {
        gateway
            .upsert_company_contact(&graph.company.external_id, entry)
            .await?;
    }
    for account in &graph.invoice_accounts {
        gateway.upsert_invoice_account(account).await?;
    }
    Ok(())
}
