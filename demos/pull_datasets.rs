//! Pulls sample responses from the live `/datasets` endpoints, writes them
//! under `sample_responses/`, and checks them against the documented shapes.
//!
//! Needs a token (CDO_API_TOKEN or a `.cdorc` file); without one the pull is
//! skipped rather than failing, so the program is safe to run anywhere.
//!
//! ```sh
//! cargo run --example pull_datasets
//! ```

use std::fs;
use std::path::Path;

use anyhow::Result;
use cdoapi::schema::{self, shapes};
use cdoapi::{Client, DatasetsQuery, Error};

const SAMPLES_DIR: &str = "sample_responses";

#[tokio::main]
async fn main() -> Result<()> {
    sensible_env_logger::init!();

    let client = Client::from_env()?;
    fs::create_dir_all(SAMPLES_DIR)?;

    let datasets = match client.datasets(DatasetsQuery::default(), None).await {
        Ok(datasets) => datasets,
        Err(Error::MissingToken) => {
            log::info!("no token configured; skipping sample pull");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let datasets_path = Path::new(SAMPLES_DIR).join("datasets.json");
    fs::write(&datasets_path, serde_json::to_string_pretty(&datasets)?)?;
    log::info!("wrote {}", datasets_path.display());

    check(&datasets_path, &shapes::datasets());

    if let Some(first) = datasets.results.first() {
        let dataset = client.dataset_by_id(&first.id, None).await?;
        let path = Path::new(SAMPLES_DIR).join("datasets-id.json");
        fs::write(&path, serde_json::to_string_pretty(&dataset)?)?;
        log::info!("wrote {}", path.display());

        check(&path, &shapes::dataset());
    }

    client.close();
    Ok(())
}

fn check(path: &Path, shape: &schema::Schema) {
    if schema::validate_file(path, shape) {
        log::info!("{} matches the documented shape", path.display());
    } else {
        log::error!("{} no longer matches the documented shape", path.display());
    }
}
