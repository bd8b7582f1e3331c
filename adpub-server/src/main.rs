mod brewery;
mod counter;
mod errors;
mod geo;
mod params;

use actix_web::{get, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use blob_storage::{BlobStores, LocalBlobStore, PutOptions, S3BlobStore};
use clap::Parser;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::brewery::{BreweryClient, BusinessRecord};
use crate::errors::AdpubError;
use crate::geo::GeoClient;
use crate::params::Args;

/// Dependencies shared by every handler, built once at startup.
struct AppState {
    geo: GeoClient,
    breweries: BreweryClient,
    store: BlobStores,
}

const APP_TYPE_JSON: &str = "application/json";

#[derive(Serialize)]
struct DeploymentInfo {
    machine: String,
    platform: String,
    processor: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    images_uploaded: u64,
    deployment_info: DeploymentInfo,
}

#[derive(Serialize)]
struct BreweriesResponse {
    status: &'static str,
    data: Vec<BusinessRecord>,
}

#[derive(Deserialize)]
struct ImageRequest {
    data: String,
}

#[derive(Serialize)]
struct ImageData {
    url: String,
}

#[derive(Serialize)]
struct ImageResponse {
    status: &'static str,
    data: ImageData,
}

#[derive(Serialize)]
struct FailureResponse {
    status: &'static str,
}

/// Every failure, whatever its internal cause, collapses to this body.
/// Provider error detail stays in the logs.
fn failure() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(APP_TYPE_JSON)
        .json(FailureResponse { status: "failure" })
}

fn deployment_info() -> DeploymentInfo {
    let sys = sysinfo::System::new_all();
    let processor = sys
        .cpus()
        .first()
        .map(|c| c.brand().trim().to_string())
        .unwrap_or_default();
    DeploymentInfo {
        machine: std::env::consts::ARCH.to_string(),
        platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
        processor,
    }
}

#[get("/status")]
async fn status(shared_state: web::Data<AppState>) -> impl Responder {
    let images_uploaded = counter::current(shared_state.store.as_trait()).await;
    HttpResponse::Ok()
        .content_type(APP_TYPE_JSON)
        .json(StatusResponse {
            status: "OK",
            images_uploaded,
            deployment_info: deployment_info(),
        })
}

/// First entry of the X-Forwarded-For header, if any.
fn forwarded_for_ip(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get("x-forwarded-for")?.to_str().ok()?;
    let first = header.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

async fn lookup_breweries(
    req: &HttpRequest,
    shared_state: &AppState,
) -> Result<Vec<BusinessRecord>, AdpubError> {
    let request_ip = forwarded_for_ip(req).ok_or_else(|| {
        AdpubError::InputInvalid("request carried no usable x-forwarded-for header".to_string())
    })?;

    let city = shared_state.geo.locate(&request_ip).await?;
    let entries = shared_state.breweries.find_businesses(&city).await?;

    Ok(entries.into_iter().map(BusinessRecord::from).collect())
}

#[get("/breweries")]
async fn breweries(req: HttpRequest, shared_state: web::Data<AppState>) -> impl Responder {
    match lookup_breweries(&req, &shared_state).await {
        Ok(data) => HttpResponse::Ok()
            .content_type(APP_TYPE_JSON)
            .json(BreweriesResponse { status: "OK", data }),
        Err(e) => {
            tracing::warn!("breweries request failed: {}", e);
            failure()
        }
    }
}

/// Decodes the payload, stores it under a fresh key, bumps the counter and
/// returns the public URL of the stored blob.
async fn store_image(shared_state: &AppState, body: &[u8]) -> Result<String, AdpubError> {
    let req: ImageRequest = serde_json::from_slice(body)
        .map_err(|e| AdpubError::InputInvalid(format!("bad image request body: {}", e)))?;

    let bytes = BASE64
        .decode(req.data.as_bytes())
        .map_err(|e| AdpubError::InputInvalid(format!("payload is not valid base64: {}", e)))?;

    let key = format!("{}.png", Uuid::new_v4());
    let store = shared_state.store.as_trait();
    store
        .put(&key, &bytes, &PutOptions::public("image/png"))
        .await?;

    // The image is already durable; a counter failure must not fail the
    // upload. Logged and swallowed.
    match counter::increment(store).await {
        Ok(count) => tracing::info!(
            "stored {} ({} bytes), upload count now {}",
            key,
            bytes.len(),
            count
        ),
        Err(e) => tracing::warn!("upload counter update failed after storing {}: {}", key, e),
    }

    Ok(store.public_url(&key))
}

#[post("/image")]
async fn image(
    request_json_bytes: web::Bytes,
    shared_state: web::Data<AppState>,
) -> impl Responder {
    match store_image(&shared_state, &request_json_bytes).await {
        Ok(url) => HttpResponse::Ok()
            .content_type(APP_TYPE_JSON)
            .json(ImageResponse {
                status: "ok",
                data: ImageData { url },
            }),
        Err(e) => {
            tracing::warn!("image upload failed: {}", e);
            failure()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt::init();

    let store = match (&args.local_store_dir, &args.bucket) {
        (Some(dir), _) => BlobStores::Local(LocalBlobStore::new(dir.clone())),
        (None, Some(bucket)) => BlobStores::S3(S3BlobStore::from_env(bucket.clone()).await),
        (None, None) => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "either --bucket or --local-store-dir must be set",
            ));
        }
    };

    let http = reqwest::Client::new();
    let state = web::Data::new(AppState {
        geo: GeoClient::new(http.clone(), &args.geo_api_base),
        breweries: BreweryClient::new(http, &args.brewery_api_base, &args.brewery_api_key),
        store,
    });

    tracing::info!("adpub listening on {}", args.http_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(status)
            .service(breweries)
            .service(image)
    })
    .bind(args.http_addr.clone())?
    .run()
    .await
}
