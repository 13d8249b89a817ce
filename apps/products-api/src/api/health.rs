//! Readiness endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use axum_helpers::{run_health_checks, HealthCheckFuture};
use database::mongodb::check_health_detailed;
use mongodb::Client;
use serde_json::Value;

/// `GET /ready`: 200 when MongoDB answers a ping, 503 otherwise
async fn ready(State(client): State<Client>) -> (StatusCode, Json<Value>) {
    let mongodb: HealthCheckFuture<'static> = Box::pin(async move {
        let status = check_health_detailed(&client).await;
        if status.healthy {
            Ok(())
        } else {
            Err(status.message.unwrap_or_else(|| "ping failed".to_string()))
        }
    });

    run_health_checks(vec![("mongodb", mongodb)]).await
}

pub fn router(client: Client) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(client)
}
