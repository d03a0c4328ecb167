//! HTTP endpoint that runs one scrape per request.

use crate::orchestrator::Orchestrator;
use crate::record::JobRecord;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for `GET /scrape_jobs`
#[derive(Debug, Deserialize)]
pub struct ScrapeParams {
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_location")]
    pub location: String,
}

fn default_query() -> String {
    "AI developer".to_string()
}

fn default_location() -> String {
    "United States".to_string()
}

/// Successful response body
#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub query: String,
    pub location: String,
    pub jobs: Vec<JobRecord>,
}

/// Failure body, mirroring the message of the run error
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { detail: self.0 }),
        )
            .into_response()
    }
}

/// Handler for GET /scrape_jobs?query=<keywords>&location=<place>
async fn scrape_jobs_handler(
    State(orchestrator): State<Arc<Orchestrator>>,
    Query(params): Query<ScrapeParams>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let max_pages = orchestrator.config().max_pages;
    match orchestrator
        .run(&params.query, &params.location, max_pages)
        .await
    {
        Ok(report) => Ok(Json(ScrapeResponse {
            query: report.query,
            location: report.location,
            jobs: report.jobs,
        })),
        Err(e) => {
            ::log::error!("Scraping failed: {}", e);
            Err(ApiError(format!("Scraping failed: {}", e)))
        }
    }
}

/// Router exposing the scrape endpoint
pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/scrape_jobs", get(scrape_jobs_handler))
        .with_state(orchestrator)
}

/// Bind `addr` and serve until the process exits
pub async fn serve(orchestrator: Orchestrator, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    ::log::info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, router(Arc::new(orchestrator))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    #[test]
    fn test_params_defaults() {
        let uri: Uri = "/scrape_jobs".parse().unwrap();
        let Query(params) = Query::<ScrapeParams>::try_from_uri(&uri).unwrap();
        assert_eq!(params.query, "AI developer");
        assert_eq!(params.location, "United States");

        let uri: Uri = "/scrape_jobs?query=rust%20engineer&location=Berlin"
            .parse()
            .unwrap();
        let Query(params) = Query::<ScrapeParams>::try_from_uri(&uri).unwrap();
        assert_eq!(params.query, "rust engineer");
        assert_eq!(params.location, "Berlin");
    }

    #[test]
    fn test_failures_are_server_errors() {
        let response = ApiError("Scraping failed: login failed".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
