//! Extraction gateway: read-only access to the NALD staging tables
//!
//! Thin, parameterized queries keyed by region code and legacy identifiers.
//! The trait seam keeps the orchestrator and transform layer testable
//! without a database.

use crate::models::raw::{
    AddressRow, AgreementRow, ChargeVersionRow, InvoiceAccountRow, LicenceNumberRow,
    LicenceRow, LicenceVersionRow, PartyRefRow, PartyRow, PurposeRow,
};
use async_trait::async_trait;
use nald_common::Result;
use sqlx::SqlitePool;

/// Read-only queries against the legacy staging data
#[async_trait]
pub trait ExtractionGateway: Send + Sync {
    async fn licence(&self, licence_number: &str) -> Result<Option<LicenceRow>>;
    async fn licence_versions(&self, region_code: i64, licence_id: i64)
        -> Result<Vec<LicenceVersionRow>>;
    async fn charge_versions(&self, region_code: i64, licence_id: i64)
        -> Result<Vec<ChargeVersionRow>>;
    async fn licence_purposes(&self, region_code: i64, licence_id: i64)
        -> Result<Vec<PurposeRow>>;
    async fn section_130_agreements(&self, region_code: i64, licence_id: i64)
        -> Result<Vec<AgreementRow>>;
    async fn two_part_tariff_agreements(&self, region_code: i64, licence_id: i64)
        -> Result<Vec<AgreementRow>>;
    async fn party(&self, region_code: i64, party_id: i64) -> Result<Option<PartyRow>>;
    async fn parties(&self, region_code: i64, party_ids: &[i64]) -> Result<Vec<PartyRow>>;
    async fn addresses(&self, region_code: i64, address_ids: &[i64]) -> Result<Vec<AddressRow>>;
    async fn invoice_accounts(&self, region_code: i64, party_id: i64)
        -> Result<Vec<InvoiceAccountRow>>;
    async fn party_licence_versions(&self, region_code: i64, party_id: i64)
        -> Result<Vec<LicenceVersionRow>>;
    async fn party_charge_versions(&self, region_code: i64, party_id: i64)
        -> Result<Vec<ChargeVersionRow>>;
    /// Full scan of distinct licence numbers (root discovery)
    async fn all_licence_numbers(&self) -> Result<Vec<LicenceNumberRow>>;
    /// Full scan of distinct region+party pairs (root discovery)
    async fn all_parties(&self) -> Result<Vec<PartyRefRow>>;
}

/// SQLite-backed extraction gateway
#[derive(Clone)]
pub struct SqliteExtractor {
    pool: SqlitePool,
}

impl SqliteExtractor {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Expand an id list into a `(?, ?, ...)` placeholder group.
/// sqlx's SQLite driver has no array binds.
fn placeholders(count: usize) -> String {
    let mut s = String::from("(");
    for i in 0..count {
        if i > 0 {
            s.push_str(", ");
        }
        s.push('?');
    }
    s.push(')');
    s
}

#[async_trait]
impl ExtractionGateway for SqliteExtractor {
    async fn licence(&self, licence_number: &str) -> Result<Option<LicenceRow>> {
        let row = sqlx::query_as::<_, LicenceRow>(
            "SELECT * FROM nald_licences WHERE lic_no = ?",
        )
        .bind(licence_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn licence_versions(
        &self,
        region_code: i64,
        licence_id: i64,
    ) -> Result<Vec<LicenceVersionRow>> {
        let rows = sqlx::query_as::<_, LicenceVersionRow>(
            "SELECT * FROM nald_licence_versions
             WHERE region_code = ? AND licence_id = ?
             ORDER BY issue_no, incr_no",
        )
        .bind(region_code)
        .bind(licence_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn charge_versions(
        &self,
        region_code: i64,
        licence_id: i64,
    ) -> Result<Vec<ChargeVersionRow>> {
        let rows = sqlx::query_as::<_, ChargeVersionRow>(
            "SELECT * FROM nald_charge_versions WHERE region_code = ? AND licence_id = ?",
        )
        .bind(region_code)
        .bind(licence_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn licence_purposes(
        &self,
        region_code: i64,
        licence_id: i64,
    ) -> Result<Vec<PurposeRow>> {
        let rows = sqlx::query_as::<_, PurposeRow>(
            "SELECT * FROM nald_licence_purposes WHERE region_code = ? AND licence_id = ?",
        )
        .bind(region_code)
        .bind(licence_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn section_130_agreements(
        &self,
        region_code: i64,
        licence_id: i64,
    ) -> Result<Vec<AgreementRow>> {
        let rows = sqlx::query_as::<_, AgreementRow>(
            "SELECT * FROM nald_agreements
             WHERE region_code = ? AND licence_id = ? AND afsa_code LIKE 'S130%'",
        )
        .bind(region_code)
        .bind(licence_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn two_part_tariff_agreements(
        &self,
        region_code: i64,
        licence_id: i64,
    ) -> Result<Vec<AgreementRow>> {
        let rows = sqlx::query_as::<_, AgreementRow>(
            "SELECT * FROM nald_agreements
             WHERE region_code = ? AND licence_id = ? AND afsa_code = 'S127'",
        )
        .bind(region_code)
        .bind(licence_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn party(&self, region_code: i64, party_id: i64) -> Result<Option<PartyRow>> {
        let row = sqlx::query_as::<_, PartyRow>(
            "SELECT * FROM nald_parties WHERE region_code = ? AND party_id = ?",
        )
        .bind(region_code)
        .bind(party_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn parties(&self, region_code: i64, party_ids: &[i64]) -> Result<Vec<PartyRow>> {
        if party_ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT * FROM nald_parties WHERE region_code = ? AND party_id IN {}",
            placeholders(party_ids.len())
        );
        let mut query = sqlx::query_as::<_, PartyRow>(&sql).bind(region_code);
        for id in party_ids {
            query = query.bind(id);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn addresses(&self, region_code: i64, address_ids: &[i64]) -> Result<Vec<AddressRow>> {
        if address_ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT * FROM nald_addresses WHERE region_code = ? AND address_id IN {}",
            placeholders(address_ids.len())
        );
        let mut query = sqlx::query_as::<_, AddressRow>(&sql).bind(region_code);
        for id in address_ids {
            query = query.bind(id);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn invoice_accounts(
        &self,
        region_code: i64,
        party_id: i64,
    ) -> Result<Vec<InvoiceAccountRow>> {
        let rows = sqlx::query_as::<_, InvoiceAccountRow>(
            "SELECT * FROM nald_invoice_accounts WHERE region_code = ? AND party_id = ?",
        )
        .bind(region_code)
        .bind(party_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn party_licence_versions(
        &self,
        region_code: i64,
        party_id: i64,
    ) -> Result<Vec<LicenceVersionRow>> {
        let rows = sqlx::query_as::<_, LicenceVersionRow>(
            "SELECT * FROM nald_licence_versions WHERE region_code = ? AND party_id = ?",
        )
        .bind(region_code)
        .bind(party_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn party_charge_versions(
        &self,
        region_code: i64,
        party_id: i64,
    ) -> Result<Vec<ChargeVersionRow>> {
        let rows = sqlx::query_as::<_, ChargeVersionRow>(
            "SELECT * FROM nald_charge_versions WHERE region_code = ? AND party_id = ?",
        )
        .bind(region_code)
        .bind(party_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn all_licence_numbers(&self) -> Result<Vec<LicenceNumberRow>> {
        let rows = sqlx::query_as::<_, LicenceNumberRow>(
            "SELECT DISTINCT lic_no FROM nald_licences ORDER BY lic_no",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn all_parties(&self) -> Result<Vec<PartyRefRow>> {
        let rows = sqlx::query_as::<_, PartyRefRow>(
            "SELECT DISTINCT region_code, party_id FROM nald_licence_versions
             ORDER BY region_code, party_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
