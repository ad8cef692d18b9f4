use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::address::WalletAddress;
use crate::aggregator::WalletAggregator;
use crate::config::Config;
use crate::error::TransportError;
use crate::features::{extract_features_now, TradeInput};
use crate::mentions::respond_to_mention;
use crate::rpc::Transport;

pub type SharedAggregator = Arc<WalletAggregator<Arc<dyn Transport>>>;

#[derive(Deserialize)]
pub struct WalletQuery {
    pub address: String,
    pub limit: Option<usize>, // defaults to the configured transaction limit
}

#[derive(Deserialize)]
pub struct MentionBody {
    pub text: String,
}

pub fn router(aggregator: SharedAggregator) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Wallet Analyzer API running" }))
        .route("/balance", get(balance))
        .route("/transactions", get(transactions))
        .route("/tokens", get(tokens))
        .route("/summary", get(summary))
        .route("/features", get(wallet_features).post(posted_features))
        .route("/mention", post(mention))
        .layer(cors)
        .with_state(aggregator)
}

pub async fn serve(cfg: Config, aggregator: SharedAggregator) -> eyre::Result<()> {
    let app = router(aggregator);

    let addr = SocketAddr::from(([127, 0, 0, 1], cfg.port));
    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

// ---------- handlers ----------

fn error_response(status: StatusCode, message: impl ToString) -> Response {
    (status, Json(json!({ "error": message.to_string() }))).into_response()
}

fn transport_failure(e: TransportError) -> Response {
    let status = match e {
        TransportError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    };
    error_response(status, e)
}

fn parse_address(raw: &str) -> Result<WalletAddress, Response> {
    WalletAddress::parse(raw).map_err(|e| error_response(StatusCode::BAD_REQUEST, e))
}

async fn balance(State(agg): State<SharedAggregator>, Query(q): Query<WalletQuery>) -> Response {
    let address = match parse_address(&q.address) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    match agg.analyze_balance(&address).await {
        Ok(analysis) => Json(analysis).into_response(),
        Err(e) => transport_failure(e),
    }
}

async fn transactions(
    State(agg): State<SharedAggregator>,
    Query(q): Query<WalletQuery>,
) -> Response {
    let address = match parse_address(&q.address) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let limit = q.limit.unwrap_or(agg.transaction_limit());
    match agg.analyze_transactions(&address, limit).await {
        Ok(analysis) => Json(analysis).into_response(),
        Err(e) => transport_failure(e),
    }
}

async fn tokens(State(agg): State<SharedAggregator>, Query(q): Query<WalletQuery>) -> Response {
    let address = match parse_address(&q.address) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    match agg.analyze_tokens(&address).await {
        Ok(analysis) => Json(analysis).into_response(),
        Err(e) => transport_failure(e),
    }
}

async fn summary(State(agg): State<SharedAggregator>, Query(q): Query<WalletQuery>) -> Response {
    match parse_address(&q.address) {
        Ok(address) => Json(agg.generate_summary(&address).await).into_response(),
        Err(resp) => resp,
    }
}

/// Features from the wallet's own recent history
async fn wallet_features(
    State(agg): State<SharedAggregator>,
    Query(q): Query<WalletQuery>,
) -> Response {
    let address = match parse_address(&q.address) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    let limit = q.limit.unwrap_or(agg.transaction_limit());
    let history = match agg.analyze_transactions(&address, limit).await {
        Ok(analysis) => analysis.trade_history(),
        Err(e) => return transport_failure(e),
    };
    match extract_features_now(&history) {
        Ok(features) => Json(features).into_response(),
        Err(e) => error_response(StatusCode::UNPROCESSABLE_ENTITY, e),
    }
}

/// Features from an externally supplied trade list
async fn posted_features(Json(trades): Json<Vec<TradeInput>>) -> Response {
    match extract_features_now(&trades) {
        Ok(features) => Json(features).into_response(),
        Err(e) => error_response(StatusCode::UNPROCESSABLE_ENTITY, e),
    }
}

async fn mention(State(agg): State<SharedAggregator>, Json(body): Json<MentionBody>) -> Response {
    Json(respond_to_mention(agg.as_ref(), &body.text).await).into_response()
}
