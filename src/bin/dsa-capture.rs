//! Capture a saved problem page and file it under one or more topics.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dsa_tracker::capture::{
    ApiClient, EntryDraft, FileSource, RetryPolicy, fetch_details_with_retry, submit_to_topics,
};

/// `dsa-capture` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dsa-capture",
    about = "Extract a problem page and save it to the DSA tracker",
    version
)]
struct CliArgs {
    /// Saved HTML of the problem page.
    #[arg(long, value_name = "path")]
    html: PathBuf,
    /// Address of the page; stored as the problem link.
    #[arg(long, value_name = "url")]
    url: Option<String>,
    /// Topic to file the problem under. Repeat for several topics.
    #[arg(long = "topic", value_name = "name")]
    topics: Vec<String>,
    #[arg(long, env = "DSA_API_URL", default_value = "http://localhost:3001")]
    api_url: String,
    /// Bearer token from a previous login.
    #[arg(long, env = "DSA_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Log in with these credentials when no token is given.
    #[arg(long, env = "DSA_EMAIL", requires = "password")]
    email: Option<String>,
    #[arg(long, env = "DSA_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long, default_value = "")]
    approach: String,
    #[arg(long, default_value = "")]
    time_complexity: String,
    #[arg(long, default_value = "")]
    space_complexity: String,
    /// Mark the problem as a basic one.
    #[arg(long)]
    basic: bool,
    /// Print the extracted details and exit without saving.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "dsa_tracker=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(CliArgs::parse()).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let source = FileSource {
        path: args.html.clone(),
        page_url: args.url.clone(),
    };
    let details = fetch_details_with_retry(&source, RetryPolicy::default()).await?;
    if details.title.is_empty() && details.description.is_empty() {
        warn!("Problem details not found. Please refresh the page.");
    }

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(ExitCode::SUCCESS);
    }

    let mut client = ApiClient::new(&args.api_url);
    match (args.token, args.email, args.password) {
        (Some(token), _, _) => client = client.with_token(token),
        (None, Some(email), Some(password)) => {
            let auth = client.login(&email, &password).await?;
            info!("logged in as {}", auth.user.username);
        }
        _ => return Err("a token or email and password is required".into()),
    }

    let mut draft = EntryDraft::from_details(&details, args.url.unwrap_or_default());
    draft.approach = args.approach;
    draft.time_complexity = args.time_complexity;
    draft.space_complexity = args.space_complexity;
    draft.is_basic = args.basic;

    let report = submit_to_topics(&client, &draft, &args.topics).await?;
    for topic in &report.saved {
        println!("saved: {}", topic);
    }
    for (topic, message) in &report.failed {
        println!("failed: {} ({})", topic, message);
    }

    if report.all_saved() {
        let n = report.saved.len();
        println!(
            "Problem saved successfully to {} topic{}!",
            n,
            if n > 1 { "s" } else { "" }
        );
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
