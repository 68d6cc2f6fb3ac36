//! hexplore - Entry Point

use clap::Parser;
use hexplore::config::{CliOverrides, ResolvedConfig};
use hexplore::model::{AppError, SessionId, SessionRecord, UserId};
use hexplore::source::Backend;
use hexplore::view::{ColorConfig, Launch};
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::info;

/// hexplore - annotate and share views of large binary files
#[derive(Parser, Debug)]
#[command(name = "hexplore")]
#[command(version)]
#[command(about = "TUI hex explorer with shareable byte-range annotations")]
pub struct Args {
    /// Local file to upload and open as a new session you own
    #[arg(conflicts_with_all = ["session", "list"])]
    pub file: Option<PathBuf>,

    /// Open an existing session, optionally with a `#comment-START-END` link
    #[arg(long, value_name = "ID[#FRAGMENT]")]
    pub session: Option<String>,

    /// Deep link to open at, e.g. `comment-100-104`
    #[arg(long, value_name = "FRAGMENT")]
    pub link: Option<String>,

    /// Open a copy of the session owned by you
    #[arg(long, requires = "session")]
    pub fork: bool,

    /// Rename the session (owner only) and exit
    #[arg(long, value_name = "NAME", requires = "session", conflicts_with = "fork")]
    pub rename: Option<String>,

    /// List your sessions and exit
    #[arg(long)]
    pub list: bool,

    /// Act as this user (owner of shared files and forks)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Bytes fetched per page request
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub page_size: Option<u64>,

    /// Directory holding uploaded blobs and session records
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            user: self.user.clone(),
            store_dir: self.store_dir.clone(),
            page_size: self.page_size,
        }
    }
}

/// Split `ID#FRAGMENT` into its parts.
fn split_session_arg(raw: &str) -> (&str, Option<&str>) {
    match raw.split_once('#') {
        Some((id, fragment)) => (id, Some(fragment).filter(|f| !f.is_empty())),
        None => (raw, None),
    }
}

fn require_user<'a>(viewer: Option<&'a UserId>, what: &str) -> Result<&'a UserId, AppError> {
    viewer.ok_or_else(|| {
        AppError::InvalidArguments(format!(
            "{what} needs a user: pass --user or set HEXPLORE_USER"
        ))
    })
}

/// Work out which session to open and at which link.
fn resolve_launch(
    args: &Args,
    storage: &Backend,
    viewer: Option<&UserId>,
) -> Result<(SessionRecord, Option<String>), Box<dyn std::error::Error>> {
    let (record, fragment) = match (&args.file, &args.session) {
        (Some(path), None) => {
            let owner = require_user(viewer, "Sharing a file")?;
            (storage.share_file(path, owner)?, None)
        }
        (None, Some(raw)) => {
            let (id, fragment) = split_session_arg(raw);
            let record = storage.open(&SessionId::new(id)?)?;
            (record, fragment.map(str::to_owned))
        }
        _ => {
            return Err(AppError::InvalidArguments(
                "pass a FILE to share or --session ID to open".to_string(),
            )
            .into())
        }
    };

    let record = if args.fork {
        let owner = require_user(viewer, "Forking")?;
        storage.fork(&record, record.comments.clone(), owner)?
    } else {
        record
    };

    Ok((record, args.link.clone().or(fragment)))
}

fn list_sessions(storage: &Backend, viewer: Option<&UserId>) -> Result<(), Box<dyn std::error::Error>> {
    let owner = require_user(viewer, "Listing sessions")?;
    for record in storage.list(owner)? {
        println!(
            "{}\t{}\t{} bytes\t{} annotations\t{}",
            record.id,
            record.filename,
            record.file_size,
            record.comments.len(),
            record.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config: ResolvedConfig = hexplore::config::resolve(args.config.clone(), args.overrides())?;

    hexplore::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let viewer = config.user.clone().map(UserId::new).transpose()?;
    let (events_tx, events_rx) = mpsc::channel();
    let storage = Backend::local(&config.store_dir, events_tx);

    if args.list {
        return list_sessions(&storage, viewer.as_ref());
    }

    if let (Some(name), Some(raw)) = (&args.rename, &args.session) {
        let owner = require_user(viewer.as_ref(), "Renaming")?;
        let (id, _) = split_session_arg(raw);
        let record = storage.rename(&SessionId::new(id)?, name, owner)?;
        println!("{}\t{}", record.id, record.filename);
        return Ok(());
    }

    let (record, fragment) = resolve_launch(&args, &storage, viewer.as_ref())?;
    let id = record.id.clone();
    info!(session = %id, fragment = ?fragment, "Launching viewer");

    hexplore::view::run_with_storage(
        storage,
        events_rx,
        Launch {
            record,
            viewer,
            fragment,
            settings: config.session_settings(),
            colors: ColorConfig::from_env_and_args(args.no_color),
        },
    )?;

    println!("Session {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["hexplore", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["hexplore"]);
        assert_eq!(args.file, None);
        assert_eq!(args.session, None);
        assert!(!args.fork);
        assert!(!args.list);
        assert!(!args.no_color);
        assert_eq!(args.overrides(), CliOverrides::default());
    }

    #[test]
    fn test_file_conflicts_with_session() {
        let result = Args::try_parse_from(["hexplore", "dump.bin", "--session", "abc"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ArgumentConflict
        );
    }

    #[test]
    fn test_fork_requires_session() {
        let result = Args::try_parse_from(["hexplore", "--fork"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_page_size_rejects_zero() {
        let result = Args::try_parse_from(["hexplore", "--page-size", "0"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_overrides_carry_cli_values() {
        let args = Args::parse_from([
            "hexplore",
            "--user",
            "ada",
            "--page-size",
            "4096",
            "--store-dir",
            "/tmp/hx",
        ]);
        assert_eq!(
            args.overrides(),
            CliOverrides {
                user: Some("ada".to_string()),
                store_dir: Some(PathBuf::from("/tmp/hx")),
                page_size: Some(4096),
            }
        );
    }

    #[test]
    fn test_split_session_arg() {
        assert_eq!(split_session_arg("abc"), ("abc", None));
        assert_eq!(
            split_session_arg("abc#comment-1-2"),
            ("abc", Some("comment-1-2"))
        );
        assert_eq!(split_session_arg("abc#"), ("abc", None));
    }

    #[test]
    fn test_require_user_explains_missing_user() {
        let err = require_user(None, "Forking").unwrap_err();
        assert!(err.to_string().contains("--user"));
    }
}
