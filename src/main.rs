use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use newsprobe::config::Config;
use newsprobe::dashboard::RandomDashboardSource;
use newsprobe::keywords::{DEFAULT_TOP_N, extract_keywords};
use newsprobe::pipeline::AnalysisInput;
use newsprobe::report::{Report, load_report, render_dashboard, render_markdown, save_report};

#[derive(Parser)]
#[command(name = "newsprobe")]
#[command(version, about = "Misinformation analysis pipeline and dashboard API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the six-stage analysis pipeline for a topic
    Analyze {
        /// News topic to analyze
        query: String,
        /// Source URL to include (repeatable)
        #[arg(long = "url")]
        urls: Vec<String>,
        /// Hashtag to track (repeatable)
        #[arg(long = "hashtag")]
        hashtags: Vec<String>,
        /// Extra keyword (repeatable); replaces the query the stages see
        #[arg(long = "keyword")]
        keywords: Vec<String>,
        /// Markdown report path (defaults to NEWSPROBE_OUTPUT)
        #[arg(long)]
        output: Option<PathBuf>,
        /// What to print once the report is ready
        #[arg(long, value_enum, default_value_t = OutputFormat::Dashboard)]
        format: OutputFormat,
    },
    /// Fetch a Reddit post and rank its keywords
    Reddit {
        /// Reddit post URL
        url: String,
        /// Keywords to keep
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
        /// Also run the pipeline on the extracted keywords
        #[arg(long)]
        analyze: bool,
    },
    /// Serve the dashboard REST API
    Serve {
        /// Listen address (defaults to NEWSPROBE_HTTP_BIND)
        #[arg(long)]
        bind: Option<SocketAddr>,
        /// Seed for reproducible dashboard payloads
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Render a saved report JSON file
    Render {
        /// Report JSON path
        report: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Markdown,
    Dashboard,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env may carry RUST_LOG, so it is read before the subscriber starts
    Config::load_env_file();
    // stdout carries rendered output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsprobe=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    match cli.command {
        Commands::Analyze {
            query,
            urls,
            hashtags,
            keywords,
            output,
            format,
        } => {
            let input = AnalysisInput {
                query,
                urls,
                hashtags,
                keywords,
            };
            run_analysis(&config, input, output, format).await
        }
        Commands::Reddit {
            url,
            top_n,
            analyze,
        } => run_reddit(&config, &url, top_n, analyze).await,
        Commands::Serve { bind, seed } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let source = match seed {
                Some(seed) => RandomDashboardSource::seeded(seed),
                None => RandomDashboardSource::new(),
            };
            newsprobe::http::start_http_server(Arc::new(config), Arc::new(source)).await
        }
        Commands::Render { report: path, format } => {
            let report = load_report(&path)?;
            print_report(&report, format)
        }
    }
}

async fn run_analysis(
    config: &Config,
    input: AnalysisInput,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let pipeline = newsprobe::build_news_pipeline(config)?;
    let outcome = pipeline.analyze(input).await?;
    info!(
        "Run {} finished: {}",
        outcome.trace.run_id,
        outcome.trace.stage_order().join(" -> ")
    );

    let path = output.unwrap_or_else(|| config.output.report_path.clone());
    let error_log = config.error_log_for(&path);
    if let Some(saved) = save_report(&outcome.report, &path, &error_log) {
        eprintln!("Report saved to {}", saved.display());
    }

    print_report(&outcome.report, format)
}

async fn run_reddit(config: &Config, url: &str, top_n: usize, analyze: bool) -> Result<()> {
    let post = newsprobe::fetch_reddit_post(config, url).await?;
    let keywords = extract_keywords(&post, top_n);

    println!("r/{} | u/{} | score {}", post.subreddit, post.author, post.score);
    println!("{}\n", post.title);
    for keyword in &keywords {
        println!("{:>4}  {}", keyword.frequency, keyword.text);
    }

    if analyze {
        let input = AnalysisInput::from_reddit_keywords(
            post.title.clone(),
            keywords.into_iter().map(|k| k.text).collect(),
        );
        run_analysis(config, input, None, OutputFormat::Dashboard).await?;
    }
    Ok(())
}

fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Markdown => println!("{}", render_markdown(report)),
        OutputFormat::Dashboard => println!("{}", render_dashboard(report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}
