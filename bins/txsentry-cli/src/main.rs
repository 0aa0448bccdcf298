//! txsentry-cli: command-line fraud verdicts.
//!
//! `predict` loads the artifacts locally and scores one transaction given as
//! six positional values. `query` sends the same values to a running
//! txsentry-server. Both print exactly one JSON object on stdout, either the
//! verdict or `{"error": ...}`, and exit with status 0 either way.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Number, Value};
use tracing::debug;

use txsentry_core::constants::{DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use txsentry_core::validation::positional_payload;
use txsentry_core::{ArtifactPaths, InferenceService};

/// txsentry command-line interface.
#[derive(Parser)]
#[command(name = "txsentry-cli")]
#[command(version, about = "Fraud verdicts for blockchain transactions.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a transaction with local artifacts.
    Predict(PredictArgs),
    /// Score a transaction through a running txsentry-server.
    Query(QueryArgs),
}

/// The six feature values, in schema order.
///
/// Kept as strings so that non-numeric input is reported by the service's
/// validation rather than by argument parsing.
#[derive(Args, Debug)]
struct FeatureArgs {
    /// Transferred value in ETH.
    #[arg(allow_hyphen_values = true)]
    tx_value_eth: String,
    /// Gas price in gwei.
    #[arg(allow_hyphen_values = true)]
    gas_price_gwei: String,
    /// Time since the sender's previous transaction.
    #[arg(allow_hyphen_values = true)]
    time_since_last_tx: String,
    /// Number of transactions sent by the address.
    #[arg(allow_hyphen_values = true)]
    num_transactions_per_address: String,
    /// Account age in days.
    #[arg(allow_hyphen_values = true)]
    account_age_days: String,
    /// Gas fee relative to transferred value.
    #[arg(allow_hyphen_values = true)]
    gas_fee_ratio: String,
}

impl FeatureArgs {
    fn values(&self) -> [&str; 6] {
        [
            &self.tx_value_eth,
            &self.gas_price_gwei,
            &self.time_since_last_tx,
            &self.num_transactions_per_address,
            &self.account_age_days,
            &self.gas_fee_ratio,
        ]
    }
}

#[derive(Args)]
struct PredictArgs {
    #[command(flatten)]
    features: FeatureArgs,

    /// Path to the model artifact.
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Path to the scaler artifact.
    #[arg(short, long, default_value = DEFAULT_SCALER_PATH)]
    scaler: PathBuf,
}

#[derive(Args)]
struct QueryArgs {
    #[command(flatten)]
    features: FeatureArgs,

    /// Base URL of the prediction server.
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the JSON result.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version keep clap's own output and exit status.
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            println!("{}", usage_error(&e));
            return Ok(());
        }
    };

    let output = match cli.command {
        Commands::Predict(args) => predict(args),
        Commands::Query(args) => query(args).await,
    };

    println!("{}", output.unwrap_or_else(|e| error_json(&e)));
    Ok(())
}

fn predict(args: PredictArgs) -> Result<Value> {
    let paths = ArtifactPaths { model: args.model, scaler: args.scaler };
    let service = InferenceService::load(&paths)?;
    let result = service.predict(&positional_payload(&args.features.values()))?;
    Ok(serde_json::to_value(result)?)
}

async fn query(args: QueryArgs) -> Result<Value> {
    let endpoint = format!("{}/predict", args.url.trim_end_matches('/'));
    let payload = query_payload(&args.features);
    debug!(%endpoint, %payload, "Sending prediction request");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("build HTTP client")?;
    let resp = client
        .post(&endpoint)
        .json(&payload)
        .send()
        .await
        .with_context(|| format!("request to {endpoint} failed"))?;

    let status = resp.status();
    let body: Value = resp
        .json()
        .await
        .with_context(|| format!("server returned {status} with a non-JSON body"))?;
    if !body.is_object() {
        bail!("server returned {status} with an unexpected body: {body}");
    }
    Ok(body)
}

/// Positional payload with numeric values sent as JSON numbers.
fn query_payload(features: &FeatureArgs) -> Value {
    let mut payload = positional_payload(&features.values());
    if let Some(map) = payload.as_object_mut() {
        for v in map.values_mut() {
            let number = v
                .as_str()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .and_then(Number::from_f64);
            if let Some(n) = number {
                *v = Value::Number(n);
            }
        }
    }
    payload
}

fn error_json(e: &anyhow::Error) -> Value {
    json!({ "error": format!("{e:#}") })
}

/// Argument errors as error JSON, without clap's usage banner.
fn usage_error(e: &clap::Error) -> Value {
    let rendered = e.to_string();
    let summary = rendered.split("\n\n").next().unwrap_or(&rendered);
    let message = summary
        .trim_start_matches("error: ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    json!({ "error": message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    fn demo_paths() -> (PathBuf, PathBuf) {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../artifacts");
        (root.join("fraud_model.json"), root.join("scaler.json"))
    }

    fn predict_args(values: [&str; 6], model: PathBuf, scaler: PathBuf) -> PredictArgs {
        let model = model.to_string_lossy().into_owned();
        let scaler = scaler.to_string_lossy().into_owned();
        let mut argv = vec!["txsentry-cli", "predict"];
        argv.extend(values);
        argv.extend(["--model", model.as_str(), "--scaler", scaler.as_str()]);
        match Cli::parse_from(argv).command {
            Commands::Predict(args) => args,
            Commands::Query(_) => unreachable!(),
        }
    }

    #[test]
    fn predicts_demo_scenario() {
        let (model, scaler) = demo_paths();
        let args = predict_args(["0.1", "5", "12", "20", "365", "0.02"], model, scaler);
        let out = predict(args).unwrap();
        assert_eq!(out, json!({ "is_fraud": false, "fraud_probability": 17.67 }));
    }

    #[test]
    fn predicts_high_risk_scenario() {
        let (model, scaler) = demo_paths();
        let args = predict_args(["2.0", "40", "1", "3", "10", "0.9"], model, scaler);
        let out = predict(args).unwrap();
        assert_eq!(out, json!({ "is_fraud": true, "fraud_probability": 80.0 }));
    }

    #[test]
    fn non_numeric_argument_becomes_error_json() {
        let (model, scaler) = demo_paths();
        let args = predict_args(["0.1", "abc", "12", "20", "365", "0.02"], model, scaler);
        let out = error_json(&predict(args).unwrap_err());
        let msg = out["error"].as_str().unwrap();
        assert!(msg.contains("gas_price_gwei"));
    }

    #[test]
    fn negative_values_parse_as_positionals() {
        let (model, scaler) = demo_paths();
        let args = predict_args(["0.1", "5", "12", "20", "365", "-0.5"], model, scaler);
        assert_eq!(args.features.gas_fee_ratio, "-0.5");
        assert!(predict(args).is_ok());
    }

    #[test]
    fn missing_artifact_becomes_error_json() {
        let dir = tempfile::tempdir().unwrap();
        let (_, scaler) = demo_paths();
        let args = predict_args(
            ["0.1", "5", "12", "20", "365", "0.02"],
            dir.path().join("absent.json"),
            scaler,
        );
        let out = error_json(&predict(args).unwrap_err());
        assert!(out["error"].as_str().unwrap().contains("absent.json"));
    }

    #[test]
    fn query_payload_sends_numbers_when_possible() {
        let cli = Cli::parse_from(["txsentry-cli", "query", "0.1", "5", "x", "20", "365", "0.02"]);
        let Commands::Query(args) = cli.command else { unreachable!() };
        let payload = query_payload(&args.features);
        assert_eq!(payload["gas_price_gwei"], json!(5.0));
        assert_eq!(payload["time_since_last_tx"], json!("x"));
        assert_eq!(args.url, "http://127.0.0.1:5000");
    }

    #[test]
    fn short_argument_list_becomes_error_json() {
        let err = Cli::try_parse_from(["txsentry-cli", "predict", "0.1", "5", "12", "20", "365"])
            .err()
            .unwrap();
        assert!(err.use_stderr());
        let out = usage_error(&err);
        let msg = out["error"].as_str().unwrap();
        assert!(msg.contains("GAS_FEE_RATIO"), "{msg}");
        assert!(!msg.contains("Usage"), "{msg}");
    }

    #[test]
    fn surplus_argument_becomes_error_json() {
        let err = Cli::try_parse_from([
            "txsentry-cli", "predict", "0.1", "5", "12", "20", "365", "0.02", "7",
        ])
        .err()
        .unwrap();
        assert!(err.use_stderr());
        assert!(usage_error(&err)["error"].as_str().unwrap().contains("'7'"));
    }

    #[test]
    fn help_keeps_clap_handling() {
        let err = Cli::try_parse_from(["txsentry-cli", "--help"]).err().unwrap();
        assert!(!err.use_stderr());
    }

    // ── query ────────────────────────────────────────────────────────────────

    fn query_args(url: &str) -> QueryArgs {
        let cli = Cli::parse_from([
            "txsentry-cli", "query", "0.1", "5", "12", "20", "365", "0.02", "--url", url,
        ]);
        let Commands::Query(args) = cli.command else { unreachable!() };
        args
    }

    /// Serve one canned response and hand back the request body received.
    async fn canned_server(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let _ = tx.send(read_request_body(&mut sock).await);
            let resp = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
        });
        (url, rx)
    }

    async fn read_request_body(sock: &mut TcpStream) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                return buf;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    return buf[end + 4..end + 4 + len].to_vec();
                }
            }
        }
    }

    #[tokio::test]
    async fn query_returns_server_verdict() {
        let (url, sent) =
            canned_server("200 OK", r#"{"is_fraud":false,"fraud_probability":17.67}"#).await;
        let out = query(query_args(&url)).await.unwrap();
        assert_eq!(out, json!({ "is_fraud": false, "fraud_probability": 17.67 }));

        let sent: Value = serde_json::from_slice(&sent.await.unwrap()).unwrap();
        assert_eq!(sent["tx_value_eth"], json!(0.1));
        assert_eq!(sent["account_age_days"], json!(365.0));
    }

    #[tokio::test]
    async fn query_passes_server_errors_through() {
        let cases = [
            ("400 Bad Request", r#"{"error":"missing required fields: gas_fee_ratio"}"#),
            ("500 Internal Server Error", r#"{"error":"numeric backend fault"}"#),
        ];
        for (status, body) in cases {
            let (url, _sent) = canned_server(status, body).await;
            let out = query(query_args(&url)).await.unwrap();
            assert_eq!(out, serde_json::from_str::<Value>(body).unwrap(), "{status}");
        }
    }

    #[tokio::test]
    async fn non_json_reply_becomes_error_json() {
        let (url, _sent) = canned_server("502 Bad Gateway", "<html>bad gateway</html>").await;
        let out = error_json(&query(query_args(&url)).await.unwrap_err());
        let msg = out["error"].as_str().unwrap();
        assert!(msg.contains("502"), "{msg}");
        assert!(msg.contains("non-JSON"), "{msg}");
    }

    #[tokio::test]
    async fn non_object_reply_becomes_error_json() {
        let (url, _sent) = canned_server("200 OK", "[1, 2]").await;
        let out = error_json(&query(query_args(&url)).await.unwrap_err());
        assert!(out["error"].as_str().unwrap().contains("unexpected body"));
    }

    #[tokio::test]
    async fn refused_connection_becomes_error_json() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let out = error_json(&query(query_args(&url)).await.unwrap_err());
        let msg = out["error"].as_str().unwrap();
        assert!(msg.contains(&format!("request to {url}/predict failed")), "{msg}");
    }
}
