use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use tracing::info;
use tracing_subscriber::EnvFilter;

use services::{AssessmentServices, Clock};
use ui::{App, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://assess.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "assess", about = "Proctored timed assessments")]
struct Args {
    /// SQLite database holding items and results.
    #[arg(long = "db", env = "ASSESS_DB_URL", default_value = DEFAULT_DB_URL, value_parser = parse_db_url)]
    db_url: String,

    /// Insert sample items when the item tables are empty.
    #[arg(long)]
    seed_demo: bool,

    /// Let proctored tests run without fullscreen.
    #[arg(long)]
    no_fullscreen: bool,
}

struct DesktopApp {
    services: AssessmentServices,
    fullscreen_required: bool,
}

impl UiApp for DesktopApp {
    fn services(&self) -> AssessmentServices {
        self.services.clone()
    }

    fn fullscreen_required(&self) -> bool {
        self.fullscreen_required
    }
}

fn parse_db_url(raw: &str) -> Result<String, String> {
    if raw.trim().is_empty() {
        return Err("database url must not be empty".to_owned());
    }
    Ok(normalize_sqlite_url(raw))
}

/// Turns bare and relative paths into absolute `sqlite://` urls.
fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" {
        return trimmed.to_owned();
    }

    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Creates the database file and its parent directories so the pool can open it.
fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database url: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ASSESS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    prepare_sqlite_file(&args.db_url)?;
    let services = AssessmentServices::new_sqlite(&args.db_url, Clock::system(), args.seed_demo)
        .await
        .with_context(|| format!("opening {}", args.db_url))?;
    info!(db = %args.db_url, fullscreen = !args.no_fullscreen, "assessment services ready");

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        services,
        fullscreen_required: !args.no_fullscreen,
    });
    let context = build_app_context(&app);

    // Dioxus/tao can default to an always-on-top window on macOS.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Assessments")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_url_is_kept() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = normalize_sqlite_url("data/assess.sqlite3");
        let path = url.strip_prefix("sqlite://").unwrap();
        assert!(Path::new(path).is_absolute(), "{url}");
        assert!(url.ends_with("data/assess.sqlite3"));

        let prefixed = normalize_sqlite_url("sqlite:data/assess.sqlite3");
        assert_eq!(prefixed, url);
    }

    #[test]
    fn absolute_urls_round_trip() {
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/assess.sqlite3"),
            "sqlite:///tmp/assess.sqlite3"
        );
    }

    #[test]
    fn blank_db_is_rejected() {
        assert!(Args::try_parse_from(["assess", "--db", "  "]).is_err());
    }

    #[test]
    fn flags_parse() {
        let args =
            Args::try_parse_from(["assess", "--db", "sqlite::memory:", "--seed-demo", "--no-fullscreen"])
                .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert!(args.seed_demo);
        assert!(args.no_fullscreen);
    }

    #[test]
    fn prepare_creates_missing_file() {
        let dir = std::env::temp_dir().join(format!("assess-prepare-{}", std::process::id()));
        let file = dir.join("nested").join("db.sqlite3");
        let url = format!("sqlite://{}", file.display());
        prepare_sqlite_file(&url).unwrap();
        assert!(file.exists());
        std::fs::remove_dir_all(&dir).unwrap();
        assert!(prepare_sqlite_file("postgres://nope").is_err());
    }
}
