//! Production job handler: extract, transform, load
//!
//! Root jobs scan staging and discover leaves; leaf jobs pull one unit's
//! rows, build the normalized graph, and upsert it. All database access
//! goes through the gateway traits, so tests can substitute either side.

use super::jobs::{Job, JobHandler, Outcome};
use crate::db::extract::ExtractionGateway;
use crate::db::load::{load_company_graph, load_licence_graph, LoadGateway};
use crate::transform::context::TransformContext;
use crate::transform::{build_company_graph, build_licence_graph, LicenceBundle};
use async_trait::async_trait;
use nald_common::{Error, Result};
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct ImportHandler {
    extractor: Arc<dyn ExtractionGateway>,
    loader: Arc<dyn LoadGateway>,
}

impl ImportHandler {
    pub fn new(extractor: Arc<dyn ExtractionGateway>, loader: Arc<dyn LoadGateway>) -> Self {
        Self { extractor, loader }
    }

    async fn discover_companies(&self) -> Result<Outcome> {
        let parties = self.extractor.all_parties().await?;
        tracing::info!(count = parties.len(), "Discovered parties for company import");
        Ok(Outcome::Discovered(
            parties
                .into_iter()
                .map(|p| Job::ImportCompany {
                    region_code: p.region_code,
                    party_id: p.party_id,
                })
                .collect(),
        ))
    }

    async fn discover_licences(&self) -> Result<Outcome> {
        let licences = self.extractor.all_licence_numbers().await?;
        tracing::info!(count = licences.len(), "Discovered licences for import");
        Ok(Outcome::Discovered(
            licences
                .into_iter()
                .map(|l| Job::ImportLicence {
                    licence_number: l.lic_no,
                })
                .collect(),
        ))
    }

    async fn import_company(&self, region_code: i64, party_id: i64) -> Result<Outcome> {
        let party = self
            .extractor
            .party(region_code, party_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("party {}:{} not in staging", region_code, party_id))
            })?;
        let versions = self
            .extractor
            .party_licence_versions(region_code, party_id)
            .await?;
        let charges = self
            .extractor
            .party_charge_versions(region_code, party_id)
            .await?;
        let invoice_rows = self.extractor.invoice_accounts(region_code, party_id).await?;

        let address_ids: BTreeSet<i64> = versions
            .iter()
            .map(|v| v.address_id)
            .chain(charges.iter().map(|c| c.address_id))
            .chain(invoice_rows.iter().map(|r| r.address_id))
            .collect();
        let address_ids: Vec<i64> = address_ids.into_iter().collect();
        let addresses = self.extractor.addresses(region_code, &address_ids).await?;

        let ctx = TransformContext::new(vec![party.clone()], addresses);
        let graph = build_company_graph(&party, &versions, &charges, &invoice_rows, &ctx)?;
        load_company_graph(self.loader.as_ref(), &graph).await?;

        tracing::debug!(
            company = %graph.company.external_id,
            addresses = graph.addresses.len(),
            invoice_accounts = graph.invoice_accounts.len(),
            "Imported company"
        );
        Ok(Outcome::Completed)
    }

    async fn import_licence(&self, licence_number: &str) -> Result<Outcome> {
        let licence = self
            .extractor
            .licence(licence_number)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("licence {} not in staging", licence_number))
            })?;
        let region_code = licence.region_code;
        let licence_id = licence.licence_id;

        let bundle = LicenceBundle {
            licence_versions: self
                .extractor
                .licence_versions(region_code, licence_id)
                .await?,
            charge_versions: self
                .extractor
                .charge_versions(region_code, licence_id)
                .await?,
            purposes: self
                .extractor
                .licence_purposes(region_code, licence_id)
                .await?,
            section_130_agreements: self
                .extractor
                .section_130_agreements(region_code, licence_id)
                .await?,
            two_part_tariff_agreements: self
                .extractor
                .two_part_tariff_agreements(region_code, licence_id)
                .await?,
            licence: Some(licence),
        };

        let party_ids: BTreeSet<i64> = bundle
            .licence_versions
            .iter()
            .map(|v| v.party_id)
            .chain(bundle.charge_versions.iter().map(|c| c.party_id))
            .collect();
        let party_ids: Vec<i64> = party_ids.into_iter().collect();
        let address_ids: BTreeSet<i64> = bundle
            .licence_versions
            .iter()
            .map(|v| v.address_id)
            .chain(bundle.charge_versions.iter().map(|c| c.address_id))
            .collect();
        let address_ids: Vec<i64> = address_ids.into_iter().collect();

        let ctx = TransformContext::new(
            self.extractor.parties(region_code, &party_ids).await?,
            self.extractor.addresses(region_code, &address_ids).await?,
        );

        let graph = build_licence_graph(&bundle, &ctx)?;
        load_licence_graph(self.loader.as_ref(), &graph).await?;

        tracing::debug!(
            licence = licence_number,
            versions = graph.versions.len(),
            document_roles = graph.document_roles.len(),
            "Imported licence"
        );
        Ok(Outcome::Completed)
    }

    async fn import_bill_runs(&self, region_code: i64) -> Result<Outcome> {
        self.loader.import_bill_runs(region_code).await?;
        Ok(Outcome::Completed)
    }
}

#[async_trait]
impl JobHandler for ImportHandler {
    async fn handle(&self, job: &Job) -> Result<Outcome> {
        match job {
            Job::ImportCompanies => self.discover_companies().await,
            Job::ImportCompany {
                region_code,
                party_id,
            } => self.import_company(*region_code, *party_id).await,
            Job::ImportLicences => self.discover_licences().await,
            Job::ImportLicence { licence_number } => self.import_licence(licence_number).await,
            Job::ImportBillRuns { region_code } => self.import_bill_runs(*region_code).await,
        }
    }
}
