use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
pub struct Args {
    /// Address the HTTP server binds to.
    #[clap(long, default_value = "127.0.0.1:8080")]
    pub(crate) http_addr: String,

    /// BreweryDB API key. Supplied via environment so it stays out of
    /// source control.
    #[clap(long, env = "BREWERY_DB_KEY", hide_env_values = true)]
    pub(crate) brewery_api_key: String,

    /// S3 bucket holding uploaded images and the upload counter.
    #[clap(long, env = "ADPUB_BUCKET")]
    pub(crate) bucket: Option<String>,

    /// When set, keep blobs in this local directory instead of S3.
    #[clap(long)]
    pub(crate) local_store_dir: Option<PathBuf>,

    /// Base URL of the IP geolocation provider.
    #[clap(long, default_value = "http://ip-api.com/json")]
    pub(crate) geo_api_base: String,

    /// Base URL of the business directory provider.
    #[clap(long, default_value = "http://api.brewerydb.com/v2")]
    pub(crate) brewery_api_base: String,
}
