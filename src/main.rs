use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::Duration;
use clap::{Args, Parser, Subcommand};
use jobboard::applications::{
    application_router, needs_follow_up, ApplicationDetails, ApplicationService,
    ApplicationStatus, DEFAULT_FOLLOW_UP_THRESHOLD_DAYS,
};
use jobboard::clock::{Clock, SystemClock};
use jobboard::config::AppConfig;
use jobboard::error::AppError;
use jobboard::jobs::{
    job_router, Currency, ExperienceLevel, Job, JobCategory, JobId, JobStatus, JobStore, JobType,
    SalaryPeriod, SalaryRange, WorkMode,
};
use jobboard::stats::{stats_router, StatsService};
use jobboard::store::InMemoryStore;
use jobboard::telemetry;
use jobboard::users::{Education, ExperienceBucket, JobPreferences, UserId, UserProfile};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "jobboard",
    about = "Run the job-board core service or walk through a seeded demo",
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
    /// Seed an in-memory store and print recommendations and stats
    Demo,
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

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => Ok(run_server(args).await?),
        Command::Demo => run_demo(),
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let store = Arc::new(InMemoryStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let applications = Arc::new(ApplicationService::new(
        store.clone(),
        store.clone(),
        clock.clone(),
    ));
    let stats = Arc::new(StatsService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        clock.clone(),
    ));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(application_router(applications))
        .merge(job_router(store.clone(), clock.clone()))
        .merge(stats_router(stats))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board core ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
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

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Walk through the core on a seeded store: browse, apply, employer review,
/// stats. Replaces hitting the HTTP API by hand when demoing.
fn run_demo() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(InMemoryStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let now = clock.now();

    seed_jobs(store.as_ref(), now)?;
    let user = seed_user(store.as_ref())?;

    let applications = ApplicationService::new(store.clone(), store.clone(), clock.clone());
    let stats = StatsService::new(store.clone(), store.clone(), store.clone(), clock.clone());

    let submitted = applications.create(
        JobId("demo-rust-backend".to_string()),
        user.id.clone(),
        ApplicationDetails {
            cover_letter: "I have shipped production Rust services for three years and would \
                           love to bring that experience to your platform team."
                .to_string(),
            expected_salary: Some(125_000),
            ..ApplicationDetails::default()
        },
    )?;
    println!(
        "Submitted application {} for {} (status: {})",
        submitted.id.0,
        submitted.job.0,
        submitted.status.label()
    );

    let reviewed = applications.transition_status(
        &submitted.id,
        ApplicationStatus::UnderReview,
        Some("resume screen passed".to_string()),
    )?;
    println!(
        "Employer moved it to {}; history now has {} entries",
        reviewed.status.label(),
        reviewed.status_history.len()
    );
    println!(
        "Needs follow-up today: {}",
        needs_follow_up(&reviewed, clock.now(), DEFAULT_FOLLOW_UP_THRESHOLD_DAYS)
    );

    let summary = stats.dashboard(&user.id)?;
    println!("\nDashboard for {}", user.name);
    println!(
        "- funnel: {} total, {} under review, response rate {}%",
        summary.stats.total, summary.stats.under_review, summary.stats.response_rate
    );
    println!("- profile completion: {}%", summary.profile_completion);
    println!("- recommended jobs:");
    for job in &summary.recommended_jobs {
        println!("    {} at {} ({})", job.title, job.company, job.location);
    }

    let platform = stats.platform()?;
    println!(
        "\nPlatform: {} eligible jobs from {} companies, {} applications",
        platform.total_jobs, platform.total_companies, platform.total_applications
    );
    for entry in &platform.top_categories {
        println!("    {}: {}", entry.category, entry.count);
    }

    Ok(())
}

fn seed_jobs(
    store: &InMemoryStore,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    let postings = [
        demo_job(
            "demo-rust-backend",
            "Backend Engineer",
            "Signalworks",
            "Denver, CO",
            JobCategory::Technology,
            ExperienceLevel::Mid,
            WorkMode::Remote,
            vec!["Rust", "PostgreSQL"],
            true,
            now,
        ),
        demo_job(
            "demo-frontend",
            "Frontend Engineer",
            "Brightline",
            "Austin, TX",
            JobCategory::Technology,
            ExperienceLevel::Mid,
            WorkMode::Hybrid,
            vec!["React", "TypeScript"],
            false,
            now,
        ),
        demo_job(
            "demo-designer",
            "Product Designer",
            "Northbeam",
            "New York, NY",
            JobCategory::Design,
            ExperienceLevel::Senior,
            WorkMode::OnSite,
            vec!["Figma"],
            false,
            now,
        ),
        demo_job(
            "demo-marketing",
            "Growth Marketer",
            "Brightline",
            "Remote",
            JobCategory::Marketing,
            ExperienceLevel::Entry,
            WorkMode::Remote,
            vec!["SEO"],
            false,
            now,
        ),
    ];

    for job in postings {
        job.validate_new(now)?;
        JobStore::insert(store, job)?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn demo_job(
    id: &str,
    title: &str,
    company: &str,
    location: &str,
    category: JobCategory,
    experience_level: ExperienceLevel,
    work_mode: WorkMode,
    skills: Vec<&str>,
    featured: bool,
    now: chrono::DateTime<chrono::Utc>,
) -> Job {
    Job {
        id: JobId(id.to_string()),
        title: title.to_string(),
        company: company.to_string(),
        description: format!("{title} role at {company}"),
        requirements: "See description".to_string(),
        location: location.to_string(),
        job_type: JobType::FullTime,
        work_mode,
        experience_level,
        category,
        salary: SalaryRange {
            min: Some(90_000),
            max: Some(140_000),
            currency: Currency::Usd,
            period: SalaryPeriod::Annually,
        },
        skills: skills.into_iter().map(str::to_string).collect(),
        tags: Vec::new(),
        application_deadline: now + Duration::days(30),
        status: JobStatus::Active,
        featured,
        urgent: false,
        view_count: 0,
        total_applications: 0,
        posted_at: now,
    }
}

fn seed_user(store: &InMemoryStore) -> Result<UserProfile, jobboard::store::StoreError> {
    let user = UserProfile {
        id: UserId("demo-user".to_string()),
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: Some("5551230000".to_string()),
        location: Some("Denver, CO".to_string()),
        bio: Some("Backend engineer".to_string()),
        resume: Some("s3://resumes/asha.pdf".to_string()),
        skills: vec!["Rust".to_string(), "React".to_string()],
        experience: Some(ExperienceBucket::ThreeToFiveYears),
        education: Education {
            degree: Some("BSc Computer Science".to_string()),
            institution: Some("CU Boulder".to_string()),
            year: Some(2019),
        },
        preferences: JobPreferences {
            preferred_work_modes: vec![WorkMode::Remote, WorkMode::Hybrid],
            ..JobPreferences::default()
        },
    };
    store.upsert_user(user.clone())?;
    Ok(user)
}
