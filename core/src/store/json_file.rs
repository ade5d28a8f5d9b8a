use super::FinancialRepository;
use crate::{
    error::PersistenceResult,
    model::{CompanyWallet, RideTransaction},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::PathBuf,
};

/// On-disk document. Wallet and transactions live in one file so a
/// save can never leave one updated without the other.
#[derive(Debug, Serialize, Deserialize)]
struct FinancialDocument {
    wallet:       Option<CompanyWallet>,
    #[serde(default)]
    transactions: Vec<RideTransaction>,
}

/// JSON-document repository. Writes go to a sibling temp file that is
/// renamed over the target.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl FinancialRepository for JsonFileStore {
    fn save(
        &mut self,
        wallet: &CompanyWallet,
        transactions: &[RideTransaction],
    ) -> PersistenceResult<()> {
        let doc = FinancialDocument {
            wallet:       Some(wallet.clone()),
            transactions: transactions.to_vec(),
        };
        let body = serde_json::to_vec_pretty(&doc)?;
        let tmp = self.temp_path();
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        log::info!(
            "saved wallet and {} transaction(s) to {}",
            transactions.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load(&self) -> PersistenceResult<(Option<CompanyWallet>, Vec<RideTransaction>)> {
        let body = match fs::read(&self.path) {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((None, Vec::new())),
            Err(e) => return Err(e.into()),
        };
        let doc: FinancialDocument = serde_json::from_slice(&body)?;
        Ok((doc.wallet, doc.transactions))
    }
}
