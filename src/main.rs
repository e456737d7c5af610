use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use yatube::config::LogFormat;
use yatube::models::group_slug;
use yatube::Config;

#[derive(Debug, Parser)]
#[command(name = "yatube", version, about = "Yatube blog server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and run the web server.
    Serve,
    /// Apply pending database migrations and exit.
    Migrate,
    /// Create a post group.
    AddGroup {
        #[arg(long)]
        title: String,
        /// Normalized with `slugify`; derived from the title when omitted.
        #[arg(long)]
        slug: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "yatube=debug,tower_http=debug".into());

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    init_tracing(config.log_format);

    let db_pool = yatube::db::create_pool(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!("Starting yatube");
            tracing::info!("Web server will listen on: {}", config.web_addr());

            yatube::db::migrate(&db_pool).await?;

            let app_state = yatube::web::AppState::new(db_pool, config.page_limit);
            yatube::web::serve(&config, app_state).await?;
        }
        Command::Migrate => {
            yatube::db::migrate(&db_pool).await?;
        }
        Command::AddGroup {
            title,
            slug,
            description,
        } => {
            let slug = group_slug(slug.as_deref().unwrap_or(&title))
                .context("group slug must contain at least one letter or digit")?;
            let group = yatube::db::groups::create(&db_pool, &title, &slug, &description).await?;
            println!("Created group {} ({})", group, group.url());
        }
    }

    Ok(())
}
