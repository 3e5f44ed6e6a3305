use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pingpong_catalog::agents::assistant::AssistantAgent;
use pingpong_catalog::agents::backend::create_backend;
use pingpong_catalog::agents::chat::{ChatError, ChatSession};
use pingpong_catalog::agents::RetryPolicy;
use pingpong_catalog::api::state::AppState;
use pingpong_catalog::config::{AiConfig, AppConfig};
use pingpong_catalog::view::{
    PlayerDetail, PlayersView, RankingRow, ScreenBody, SkillPage, Tab, ViewController, Weaknesses,
    WeaknessesView,
};
use pingpong_catalog::{StatBlock, STAT_MAX};

#[derive(Parser)]
#[command(name = "pingpong-catalog")]
#[command(about = "School table-tennis player catalog with ratings and an AI assistant")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./config.toml")]
    config: PathBuf,

    /// Catalog file (JSON or TOML); overrides `catalog_path` from config
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides config
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// List the players of a group, weakest first
    Players {
        /// Group id; omit to list the available groups
        #[arg(long)]
        group: Option<String>,
    },

    /// Global ranking, strongest first
    Ranking,

    /// Browse the skill book
    Skills {
        /// Page to show (0-based, clamped)
        #[arg(long, default_value_t = 0)]
        page: usize,
    },

    /// Show a player's detail card
    Player {
        /// Player id
        id: String,
    },

    /// Show a player's recorded weaknesses
    Weaknesses {
        /// Player id
        id: String,
    },

    /// Validate the configuration and catalog, then exit
    Validate,

    /// Chat with the assistant on the terminal
    Chat,
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_tracing(&level, cli.json_logs);

    tracing::info!("Starting pingpong-catalog v{}", env!("CARGO_PKG_VERSION"));

    let catalog_path = cli.catalog.clone().or_else(|| config.catalog_path.clone());
    let catalog = Arc::new(
        pingpong_catalog::load_catalog(catalog_path.as_deref()).context("loading catalog")?,
    );
    let geometry = config.radar.geometry();
    let mut vc = ViewController::new(catalog.clone(), geometry);

    match cli.command {
        Commands::Serve { host, port } => {
            let assistant = build_assistant(&config.ai)?;
            let state = AppState::with_assistant(catalog, geometry, assistant)
                .with_cors_origin(config.server.cors_origin.clone());

            let app = pingpong_catalog::api::build_router(state);
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Players { group } => {
            if let Some(id) = group {
                vc.select_group(&id)?;
            }
            if let ScreenBody::Players { groups, view } = vc.render()?.body {
                println!("Groups:");
                for g in &groups {
                    println!("  {:<28} {} player(s)", g.label, g.player_count);
                }
                println!();
                print_players(&view);
            }
        }
        Commands::Ranking => {
            vc.select_tab(Tab::Ranking);
            if let ScreenBody::Ranking { rows } = vc.render()?.body {
                print_ranking(&rows);
            }
        }
        Commands::Skills { page } => {
            vc.select_tab(Tab::Skills);
            vc.go_to_skill(page);
            match vc.render()?.body {
                ScreenBody::Skills { page: Some(page) } => print_skill_page(&page),
                _ => println!("The skill book is empty"),
            }
        }
        Commands::Player { id } => {
            vc.open_detail(&id)?;
            if let Some(detail) = vc.render()?.detail {
                print_detail(&detail);
            }
        }
        Commands::Weaknesses { id } => {
            vc.open_weaknesses(&id)?;
            if let Some(weaknesses) = vc.render()?.weaknesses {
                print_weaknesses(&weaknesses);
            }
        }
        Commands::Validate => {
            config.validate()?;
            println!(
                "OK: {} groups, {} players, {} skills; AI backend {} ({})",
                catalog.groups().len(),
                catalog.player_count(),
                catalog.skills().len(),
                config.ai.backend,
                config.ai.model
            );
        }
        Commands::Chat => {
            let agent = build_assistant(&config.ai)?;
            run_chat(ChatSession::new(catalog), &agent).await?;
        }
    }

    Ok(())
}

fn build_assistant(ai: &AiConfig) -> Result<AssistantAgent> {
    let backend = create_backend(ai)?;
    let agent = AssistantAgent::new(backend)
        .with_retry_policy(RetryPolicy::default().with_max_retries(ai.max_retries));
    Ok(match ai.max_tokens {
        Some(n) => agent.with_max_tokens(n),
        None => agent,
    })
}

async fn run_chat(mut session: ChatSession, agent: &AssistantAgent) -> Result<()> {
    println!("Ask about the players. Type /quit to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }

        match session.send(&line, agent).await {
            Ok(turn) => println!("{}\n", turn.content),
            Err(ChatError::EmptyMessage) => continue,
            Err(e) => println!("{}", e),
        }
    }

    Ok(())
}

fn stat_bar(value: u8) -> String {
    let filled = value.min(STAT_MAX) as usize;
    format!(
        "{}{}",
        "#".repeat(filled),
        ".".repeat(STAT_MAX as usize - filled)
    )
}

fn print_stats(stats: &StatBlock) {
    for (field, value) in stats.entries() {
        println!("  {:<12} {} {}", field.label(), stat_bar(value), value);
    }
}

fn print_players(view: &PlayersView) {
    match view {
        PlayersView::NoGroupSelected { message } => println!("{}", message),
        PlayersView::Empty { group, message } => {
            println!("{}\n  {}", group.label, message)
        }
        PlayersView::Players { group, players } => {
            println!("{}", group.label);
            for p in players {
                println!(
                    "  [{}] {:<12} avg {:>4}  {:<12} {}",
                    p.rank, p.name, p.average_display, p.style, p.id
                );
            }
        }
    }
}

fn print_ranking(rows: &[RankingRow]) {
    for row in rows {
        let p = &row.player;
        println!(
            "{}  [{}] {:<12} {:>4}  group {}",
            row.position_label, p.rank, p.name, p.average_display, p.group_id
        );
    }
}

fn print_skill_page(page: &SkillPage) {
    let rank = page
        .skill
        .rank
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("Skill {}/{}", page.index + 1, page.total);
    println!("  {} [{}]", page.skill.name, rank);
    println!("  {}", page.skill.description);
    if page.has_next {
        println!("\n  next: --page {}", page.index + 1);
    }
}

fn print_detail(detail: &PlayerDetail) {
    let card = &detail.card;
    println!("{} ({})", card.name, detail.group_title);
    println!("  Rank {}  average {}", card.rank, card.average_display);
    println!("  Style: {}  Specialty: {}", card.style, detail.specialty);
    println!("  {}", detail.description);
    println!();
    print_stats(&card.stats);

    if !detail.skills.is_empty() {
        println!();
        println!("  Skills:");
        for skill in &detail.skills {
            let rank = skill
                .rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("    {} [{}]", skill.name, rank);
        }
    }

    println!();
    println!("  Radar: {}", detail.radar.svg_points);
}

fn print_weaknesses(view: &WeaknessesView) {
    println!("{}", view.player_name);
    match &view.weaknesses {
        Weaknesses::List { items } => {
            for item in items {
                println!("  - {}", item);
            }
        }
        Weaknesses::NoneRecorded { message } => println!("  {}", message),
    }
}
