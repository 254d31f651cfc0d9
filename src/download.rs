use reqwest::StatusCode;
use reqwest_middleware::ClientBuilder;
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::Error;

/// Where the OurAirports dataset is published
pub static AIRPORTS_URL: &'static str =
    "https://raw.githubusercontent.com/davidmegginson/ourairports-data/main/airports.csv";

fn to_err(error: impl std::fmt::Display) -> Error {
    Error::Download(error.to_string())
}

/// Returns the contents of `url`, retrying transient failures
async fn fetch(url: &str) -> Result<Vec<u8>, Error> {
    log::info!("Fetch {url}");
    // Retry up to 5 times with increasing intervals between attempts.
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(5);
    let client = ClientBuilder::new(reqwest::Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

    let response = client.get(url).send().await.map_err(to_err)?;
    if response.status() != StatusCode::OK {
        return Err(Error::Download(format!("{url} returned {}", response.status())));
    }
    Ok(response.bytes().await.map_err(to_err)?.to_vec())
}

/// Writes the dataset at `url` to `path`, unless `path` already exists.
/// Returns whether it was downloaded.
/// # Implementation
/// This function is idempotent but not pure: the first call caches the dataset to disk.
pub async fn dataset_cached(url: &str, path: &std::path::Path) -> Result<bool, Error> {
    if path.try_exists()? {
        log::info!("{} - cache hit", path.display());
        return Ok(false);
    }
    log::info!("{} - cache miss", path.display());
    let data = fetch(url).await?;

    let mut dir = path.to_path_buf();
    dir.pop();
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, data)?;
    log::info!("{} - cache write", path.display());
    Ok(true)
}
