use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{LadderError, MAX_BOND_SLOTS, RawBondSlot, RawLadderInput, run_ladder};

const DEFAULT_CASH_FLOWS: &str = "1000, 2000, 3000";
const DEFAULT_TERMS: &str = "1, 2, 3";
const DEFAULT_BONDS: [&str; MAX_BOND_SLOTS] = ["0.03, 1, 1000", "0.04, 2, 980", "0.05, 3, 950"];

#[derive(Parser, Debug)]
#[command(
    name = "bond-ladder",
    about = "Builds a bond ladder that matches a schedule of target cash flows"
)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a ladder once and print the report
    Build(LadderArgs),
    /// Serve the JSON API
    Serve {
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LadderArgs {
    #[arg(
        long,
        default_value = DEFAULT_CASH_FLOWS,
        help = "Desired cash flows, comma separated"
    )]
    cash_flows: String,
    #[arg(
        long,
        default_value = DEFAULT_TERMS,
        help = "Maturity period of each cash flow, comma separated"
    )]
    terms: String,
    #[arg(
        long,
        default_value = DEFAULT_BONDS[0],
        help = "Bond 1 as 'yield, maturity, face value'; empty to leave unused"
    )]
    bond1: String,
    #[arg(long, default_value = DEFAULT_BONDS[1], help = "Bond 2, same format as --bond1")]
    bond2: String,
    #[arg(long, default_value = DEFAULT_BONDS[2], help = "Bond 3, same format as --bond1")]
    bond3: String,
}

impl LadderArgs {
    fn raw_input(&self) -> RawLadderInput {
        let slots: [&String; MAX_BOND_SLOTS] = [&self.bond1, &self.bond2, &self.bond3];
        RawLadderInput {
            cash_flows: self.cash_flows.clone(),
            terms: self.terms.clone(),
            bonds: slots
                .into_iter()
                .map(|text| RawBondSlot::from_triple(text))
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LadderPayload {
    cash_flows: Option<String>,
    terms: Option<String>,
    bond1: Option<String>,
    bond2: Option<String>,
    bond3: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultsResponse {
    cash_flows: &'static str,
    terms: &'static str,
    bonds: [&'static str; MAX_BOND_SLOTS],
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn default_ladder_args() -> LadderArgs {
    LadderArgs {
        cash_flows: DEFAULT_CASH_FLOWS.to_string(),
        terms: DEFAULT_TERMS.to_string(),
        bond1: DEFAULT_BONDS[0].to_string(),
        bond2: DEFAULT_BONDS[1].to_string(),
        bond3: DEFAULT_BONDS[2].to_string(),
    }
}

fn ladder_args_from_payload(payload: LadderPayload) -> LadderArgs {
    let mut args = default_ladder_args();
    if let Some(v) = payload.cash_flows {
        args.cash_flows = v;
    }
    if let Some(v) = payload.terms {
        args.terms = v;
    }
    if let Some(v) = payload.bond1 {
        args.bond1 = v;
    }
    if let Some(v) = payload.bond2 {
        args.bond2 = v;
    }
    if let Some(v) = payload.bond3 {
        args.bond3 = v;
    }
    args
}

pub fn run_cli_build(args: &LadderArgs) -> Result<String, LadderError> {
    let report = run_ladder(&args.raw_input())?;
    let [size, unmet] = report.summary.headline();
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| LadderError::Unexpected(e.to_string()))?;
    Ok(format!("{size}\n{unmet}\n{json}\n"))
}

pub fn router() -> Router {
    Router::new()
        .route(
            "/api/ladder",
            get(ladder_get_handler).post(ladder_post_handler),
        )
        .route("/api/defaults", get(defaults_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("bond ladder HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/ladder");
    axum::serve(listener, router()).await
}

async fn defaults_handler() -> Response {
    json_response(
        StatusCode::OK,
        DefaultsResponse {
            cash_flows: DEFAULT_CASH_FLOWS,
            terms: DEFAULT_TERMS,
            bonds: DEFAULT_BONDS,
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn ladder_get_handler(query: Result<Query<LadderPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => ladder_handler_impl(payload),
        Err(rejection) => payload_rejected(&rejection.body_text()),
    }
}

async fn ladder_post_handler(body: Result<Json<LadderPayload>, JsonRejection>) -> Response {
    match body {
        Ok(Json(payload)) => ladder_handler_impl(payload),
        Err(rejection) => payload_rejected(&rejection.body_text()),
    }
}

fn payload_rejected(msg: &str) -> Response {
    warn!(error = msg, "malformed ladder payload");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn ladder_handler_impl(payload: LadderPayload) -> Response {
    let args = ladder_args_from_payload(payload);
    match run_ladder(&args.raw_input()) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(err) => {
            warn!(error = %err, "rejected ladder request");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn report_from_json(json: &str) -> Result<crate::core::LadderReport, String> {
    let payload = serde_json::from_str::<LadderPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    let args = ladder_args_from_payload(payload);
    run_ladder(&args.raw_input()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    async fn call(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router().oneshot(request).await.expect("router responds");
        let status = response.status();
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body = serde_json::from_slice(&bytes).expect("body is json");
        (status, body)
    }

    #[test]
    fn cli_parses_build_with_defaults() {
        let cli = Cli::try_parse_from(["bond-ladder", "build"]).expect("parses");
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args, default_ladder_args());
        assert!(!cli.verbose);
    }

    #[test]
    fn cli_parses_overrides_and_blank_bond() {
        let cli = Cli::try_parse_from([
            "bond-ladder",
            "build",
            "--cash-flows",
            "500",
            "--terms",
            "5",
            "--bond2",
            "",
            "-v",
        ])
        .expect("parses");
        assert!(cli.verbose);
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        let raw = args.raw_input();
        assert_eq!(raw.cash_flows, "500");
        assert!(raw.bonds[1].is_blank());
        assert!(!raw.bonds[0].is_blank());
    }

    #[test]
    fn cli_parses_serve_port() {
        let cli = Cli::try_parse_from(["bond-ladder", "serve", "--port", "9000"]).expect("parses");
        assert!(matches!(cli.command, Command::Serve { port: 9000 }));
    }

    #[test]
    fn cli_build_prints_headline_and_report() {
        let output = run_cli_build(&default_ladder_args()).expect("valid defaults");
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("Bond Ladder Size: 3"));
        assert_eq!(lines.next(), Some("Unmet Cash Flow: 4933.30"));
        assert!(output.contains("\"ladderSize\": 3"));
    }

    #[test]
    fn cli_build_reports_validation_error() {
        let mut args = default_ladder_args();
        args.terms = "1, 2".to_string();
        let err = run_cli_build(&args).expect_err("must reject mismatch");
        assert_eq!(err.to_string(), "Cash flows and terms must align in number");
    }

    #[test]
    fn report_from_json_overlays_defaults() {
        let report = report_from_json(
            r#"{
              "cashFlows": "100",
              "terms": "1",
              "bond1": "0.10, 1, 1000",
              "bond2": "",
              "bond3": ""
            }"#,
        )
        .expect("json should parse");
        assert_eq!(report.positions.len(), 1);
        assert_approx(report.positions[0].quantity, 100.0 / 1100.0);
    }

    #[test]
    fn report_from_json_uses_defaults_when_empty() {
        let report = report_from_json("{}").expect("defaults are valid");
        assert_eq!(report.summary.ladder_size, 3);
        assert_approx(report.leftover[2], 2002.5);
    }

    #[test]
    fn report_from_json_rejects_all_blank_bonds() {
        let err = report_from_json(r#"{"bond1": "", "bond2": "", "bond3": ""}"#)
            .expect_err("must require a bond");
        assert!(err.contains("at least one bond"));
    }

    #[tokio::test]
    async fn post_ladder_returns_report() {
        let request = Request::post("/api/ladder")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"cashFlows": "500", "terms": "5", "bond1": "0.02, 3, 1000", "bond2": "", "bond3": ""}"#,
            ))
            .expect("request builds");
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ladderSize"], 0);
        assert_eq!(body["leftover"][0], 500.0);
        assert_eq!(body["periods"][0]["matched"], 0.0);
    }

    #[tokio::test]
    async fn get_ladder_reads_query_string() {
        let request = Request::get("/api/ladder?cashFlows=100&terms=1&bond1=0.1,1,1000&bond2=&bond3=")
            .body(Body::empty())
            .expect("request builds");
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ladderSize"], 1);
        assert_eq!(body["positions"][0]["maturityPeriod"], 1);
    }

    #[tokio::test]
    async fn invalid_ladder_is_bad_request() {
        let request = Request::get("/api/ladder?cashFlows=1000,2000&terms=1,2,3")
            .body(Body::empty())
            .expect("request builds");
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cash flows and terms must align in number");
    }

    #[tokio::test]
    async fn post_with_wrong_field_type_is_json_bad_request() {
        let request = Request::post("/api/ladder")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"terms": 5}"#))
            .expect("request builds");
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn post_with_broken_json_is_json_bad_request() {
        let request = Request::post("/api/ladder")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .expect("request builds");
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn post_without_content_type_is_json_bad_request() {
        let request = Request::post("/api/ladder")
            .body(Body::from(r#"{"terms": "1"}"#))
            .expect("request builds");
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn get_with_duplicate_query_key_is_json_bad_request() {
        let request = Request::get("/api/ladder?terms=1&terms=2")
            .body(Body::empty())
            .expect("request builds");
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn defaults_endpoint_lists_form_values() {
        let request = Request::get("/api/defaults")
            .body(Body::empty())
            .expect("request builds");
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cashFlows"], DEFAULT_CASH_FLOWS);
        assert_eq!(body["bonds"][2], DEFAULT_BONDS[2]);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let request = Request::get("/nope").body(Body::empty()).expect("request builds");
        let (status, body) = call(request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }
}
