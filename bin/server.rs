// MilkTrack - Web Server
// REST API over both ledgers with Axum

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use milk_track::{
    init_logging, Commodity, CommodityLedger, Config, DailyLine, DateKey, InputError, Ledgers,
    PriceInput, RecordOutcome, SqliteStore, Summary,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
struct AppState {
    ledgers: Arc<Mutex<Ledgers<Arc<SqliteStore>>>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn reply<T: Serialize>(status: StatusCode, body: ApiResponse<T>) -> Response {
    (status, Json(body)).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    reply(StatusCode::BAD_REQUEST, ApiResponse::<()>::err(message))
}

/// Entries response
#[derive(Serialize)]
struct EntriesResponse {
    commodity: Commodity,
    unit: &'static str,
    last_entered_price: f64,
    overrides: BTreeMap<DateKey, f64>,
    entries: Vec<DailyLine>,
}

#[derive(Serialize)]
struct SummaryResponse {
    commodity: Commodity,
    #[serde(skip_serializing_if = "Option::is_none")]
    month: Option<String>,
    #[serde(flatten)]
    summary: Summary,
}

#[derive(Deserialize)]
struct SummaryQuery {
    month: Option<String>,
}

#[derive(Deserialize)]
struct RecordRequest {
    date: String,
    amount: String,
}

#[derive(Serialize)]
struct RecordResponse {
    date: DateKey,
    changed: bool,
    summary: Summary,
}

#[derive(Deserialize)]
struct PriceRequest {
    price: String,
}

#[derive(Serialize)]
struct PriceResponse {
    date: DateKey,
    price: f64,
    last_entered_price: f64,
}

fn entries_response(ledger: &dyn CommodityLedger) -> EntriesResponse {
    EntriesResponse {
        commodity: ledger.commodity(),
        unit: ledger.commodity().unit_label(),
        last_entered_price: ledger.last_entered_price(),
        overrides: ledger.overrides().clone(),
        entries: ledger.daily_lines(),
    }
}

/// "2024-07" → (2024, 7)
fn parse_month(text: &str) -> Option<(i32, u32)> {
    let (year, month) = text.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/:commodity/entries - Daily records with resolved prices
async fn get_entries(State(state): State<AppState>, Path(commodity): Path<String>) -> Response {
    let Ok(commodity) = commodity.parse::<Commodity>() else {
        return bad_request(format!("Unknown commodity: {}", commodity));
    };

    let Ok(ledgers) = state.ledgers.lock() else {
        error!("ledger lock poisoned");
        return reply(StatusCode::INTERNAL_SERVER_ERROR, ApiResponse::<()>::err("internal error"));
    };

    reply(StatusCode::OK, ApiResponse::ok(entries_response(ledgers.get(commodity))))
}

/// GET /api/:commodity/summary?month=YYYY-MM - Totals (all time or one month)
async fn get_summary(
    State(state): State<AppState>,
    Path(commodity): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> Response {
    let Ok(commodity) = commodity.parse::<Commodity>() else {
        return bad_request(format!("Unknown commodity: {}", commodity));
    };

    let month = match query.month.as_deref().map(parse_month) {
        Some(None) => return bad_request("month must be YYYY-MM"),
        Some(Some(month)) => Some(month),
        None => None,
    };

    let Ok(ledgers) = state.ledgers.lock() else {
        error!("ledger lock poisoned");
        return reply(StatusCode::INTERNAL_SERVER_ERROR, ApiResponse::<()>::err("internal error"));
    };
    let ledger = ledgers.get(commodity);

    let summary = match month {
        Some((year, month)) => ledger.month_summary(year, month),
        None => ledger.summary(),
    };

    reply(
        StatusCode::OK,
        ApiResponse::ok(SummaryResponse {
            commodity,
            month: month.map(|(y, m)| format!("{}-{:02}", y, m)),
            summary,
        }),
    )
}

/// POST /api/:commodity/entries - Record the amount for a day
async fn post_entry(
    State(state): State<AppState>,
    Path(commodity): Path<String>,
    Json(request): Json<RecordRequest>,
) -> Response {
    let Ok(commodity) = commodity.parse::<Commodity>() else {
        return bad_request(format!("Unknown commodity: {}", commodity));
    };

    let Ok(mut ledgers) = state.ledgers.lock() else {
        error!("ledger lock poisoned");
        return reply(StatusCode::INTERNAL_SERVER_ERROR, ApiResponse::<()>::err("internal error"));
    };
    let ledger = ledgers.get_mut(commodity);

    let date = DateKey::parse_opt(&request.date);
    match (date, ledger.record_amount(date, &request.amount)) {
        (Some(date), Ok(outcome)) => reply(
            StatusCode::OK,
            ApiResponse::ok(RecordResponse {
                date,
                changed: outcome == RecordOutcome::Recorded,
                summary: ledger.summary(),
            }),
        ),
        (_, Err(InputError::NotReady)) => reply(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiResponse::<()>::err("ledger is still loading"),
        ),
        _ => bad_request(ledger.prompt().unwrap_or("invalid input").to_string()),
    }
}

/// PUT /api/:commodity/prices/:date - Set the price for a day
async fn put_price(
    State(state): State<AppState>,
    Path((commodity, date)): Path<(String, String)>,
    Json(request): Json<PriceRequest>,
) -> Response {
    let Ok(commodity) = commodity.parse::<Commodity>() else {
        return bad_request(format!("Unknown commodity: {}", commodity));
    };
    let Some(date) = DateKey::parse_opt(&date) else {
        return bad_request(format!("Invalid date: {}", date));
    };

    let Ok(mut ledgers) = state.ledgers.lock() else {
        error!("ledger lock poisoned");
        return reply(StatusCode::INTERNAL_SERVER_ERROR, ApiResponse::<()>::err("internal error"));
    };
    let ledger = ledgers.get_mut(commodity);

    match ledger.set_price_override(Some(date), &request.price) {
        Ok(PriceInput::Committed(price)) => reply(
            StatusCode::OK,
            ApiResponse::ok(PriceResponse {
                date,
                price,
                last_entered_price: ledger.last_entered_price(),
            }),
        ),
        Ok(PriceInput::Buffered) => bad_request(format!("Not a valid price: {:?}", request.price)),
        Err(err) => reply(StatusCode::SERVICE_UNAVAILABLE, ApiResponse::<()>::err(err.to_string())),
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_logging(&config.log_filter);

    println!("🌐 MilkTrack - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    println!("✓ Database opened: {:?}", config.db_path);

    // Create shared state
    let state = AppState {
        ledgers: Arc::new(Mutex::new(Ledgers::open(Arc::new(store)))),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/:commodity/entries", get(get_entries).post(post_entry))
        .route("/:commodity/summary", get(get_summary))
        .route("/:commodity/prices/:date", put(put_price))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.server_addr.as_str()).await?;
    info!(addr = %config.server_addr, "listening");

    println!("\n🚀 Server running on http://{}", config.server_addr);
    println!("   API: http://{}/api/milk/entries", config.server_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;

    Ok(())
}
