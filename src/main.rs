use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use greenfin_ai::config::{AppConfig, RiskStrategyKind};
use greenfin_ai::error::AppError;
use greenfin_ai::telemetry;
use greenfin_ai::workflows::prediction::{
    prediction_router, CompanyDirectory, DisabledCompletionGateway, FormulaRisk,
    GroqCompletionClient, ImpactScores, InMemoryPredictionRepository, ModelRisk,
    PredictionService, PredictionView, ReportGenerator, RiskEstimationStrategy,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
struct OpsState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Green Finance Advisor",
    about = "Run the green finance risk prediction service or generate a single prediction from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the prediction pipeline once and print the report
    Predict(PredictArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Exact company name as it appears in the directory
    #[arg(long)]
    company: String,
    /// Community impact value
    #[arg(long)]
    community: f64,
    /// Environment impact value
    #[arg(long)]
    environment: f64,
    /// Customers impact value (narrated in the report, never scored)
    #[arg(long)]
    customers: f64,
    /// Governance impact value
    #[arg(long)]
    governance: f64,
    /// Elapsed certification periods
    #[arg(long, default_value_t = 1)]
    certification_cycle: i64,
    /// Override the configured company dataset path
    #[arg(long)]
    companies_csv: Option<PathBuf>,
    /// Skip the remote completion call and render the local fallback report
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Predict(args) => run_predict(args).await,
    }
}

fn build_risk_strategy(config: &AppConfig) -> Result<Box<dyn RiskEstimationStrategy>, AppError> {
    match config.data.risk_strategy {
        RiskStrategyKind::Formula => Ok(Box::new(FormulaRisk)),
        RiskStrategyKind::Model => {
            let model = ModelRisk::from_dir(&config.data.models_dir).map_err(|err| {
                error!(error = %err, "failed to load risk model artifacts");
                err
            })?;
            Ok(Box::new(model))
        }
    }
}

fn build_report_generator(config: &AppConfig) -> ReportGenerator {
    match GroqCompletionClient::from_config(&config.llm) {
        Ok(client) => ReportGenerator::new(Box::new(client)),
        Err(err) => {
            warn!(error = %err, "completion service unavailable, reports degrade to the local fallback");
            ReportGenerator::new(Box::new(DisabledCompletionGateway))
        }
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let directory = Arc::new(
        CompanyDirectory::from_path(&config.data.companies_path).map_err(|err| {
            error!(error = %err, path = %config.data.companies_path.display(), "failed to load company directory");
            err
        })?,
    );

    let risk = build_risk_strategy(&config)?;
    let reports = build_report_generator(&config);
    let repository = Arc::new(InMemoryPredictionRepository::default());
    let service = Arc::new(PredictionService::new(
        config.esg_weights,
        risk,
        reports,
        repository,
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let ops_state = OpsState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let ops_router = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(ops_state);

    let app = ops_router
        .merge(prediction_router(service, directory))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "green finance prediction service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = args.companies_csv {
        config.data.companies_path = path;
    }

    let directory = CompanyDirectory::from_path(&config.data.companies_path)?;
    let details = directory.lookup(&args.company)?.clone();

    let risk = build_risk_strategy(&config)?;
    let reports = if args.offline {
        ReportGenerator::new(Box::new(DisabledCompletionGateway))
    } else {
        build_report_generator(&config)
    };
    let repository = Arc::new(InMemoryPredictionRepository::default());
    let service = Arc::new(PredictionService::new(
        config.esg_weights,
        risk,
        reports,
        repository,
    ));

    let scores = ImpactScores {
        community: args.community,
        environment: args.environment,
        customers: args.customers,
        governance: args.governance,
        certification_cycle: args.certification_cycle,
    };

    // The pipeline blocks on the outbound completion call.
    let record = tokio::task::spawn_blocking(move || service.predict("cli", &details, scores))
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))??;

    render_prediction(&record.view());
    Ok(())
}

fn render_prediction(view: &PredictionView) {
    println!("Green finance prediction");
    println!("Company: {}", view.company_name);
    println!(
        "ESG score: {:.2} ({} readiness)",
        view.esg_score, view.readiness
    );
    println!(
        "Risk probability: {:.2}% ({} risk)",
        view.risk_probability * 100.0,
        view.risk_band
    );

    match &view.llm_error {
        Some(error) => println!("Report source: local fallback ({error})"),
        None => println!("Report source: completion service"),
    }

    println!("\n{}", view.llm_report);
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[test]
    fn cli_parses_predict_subcommand() {
        let cli = Cli::parse_from([
            "greenfin-ai",
            "predict",
            "--company",
            "Solaria Energy",
            "--community",
            "60",
            "--environment",
            "80",
            "--customers",
            "55",
            "--governance",
            "70",
            "--offline",
        ]);
        match cli.command {
            Some(Command::Predict(args)) => {
                assert_eq!(args.company, "Solaria Energy");
                assert_eq!(args.certification_cycle, 1);
                assert!(args.offline);
            }
            other => panic!("expected predict subcommand, got {other:?}"),
        }
    }
}
