//! Packlist Entry Point
//!
//! Loads the lists from the configured backend and prints the active one.

use std::fmt::Write as _;
use std::process::ExitCode;

use packlist::{Config, HttpRemoteStore, Snapshot, StateController};
use rolling_logger::LoggerOptions;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("packlist: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let logging = match &config.log_dir {
        Some(dir) => rolling_logger::init_logger(
            dir,
            "packlist",
            LoggerOptions {
                level: config.log_level,
                ..Default::default()
            },
        ),
        None => rolling_logger::init_stderr_logger(config.log_level),
    };
    if let Err(e) = logging {
        eprintln!("packlist: logging disabled: {}", e);
    }

    let remote = match HttpRemoteStore::new(&config) {
        Ok(remote) => remote,
        Err(e) => {
            eprintln!("packlist: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let controller = StateController::new(remote);
    if let Err(e) = controller.bootstrap().await {
        rolling_logger::error(&format!("startup aborted: {}", e));
        eprintln!("packlist: could not load lists from {}: {}", config.api_base(), e);
        for line in rolling_logger::recent_lines() {
            eprintln!("  {}", line);
        }
        return ExitCode::FAILURE;
    }

    print!("{}", render(&controller.snapshot()));
    ExitCode::SUCCESS
}

fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let Some(list) = &snapshot.list else {
        out.push_str("No travel lists yet.\n");
        return out;
    };

    let _ = write!(out, "{}", list.name);
    if let Some(destination) = &list.destination {
        let _ = write!(out, " ({})", destination);
    }
    out.push('\n');

    if let Some(stats) = &snapshot.stats {
        let _ = writeln!(
            out,
            "{}% packed ({} of {}, {} remaining)",
            stats.progress_percentage, stats.packed_items, stats.total_items, stats.remaining_items
        );
    }

    for group in snapshot.groups() {
        let _ = writeln!(
            out,
            "\n{} {}  {}/{}",
            group.category.icon,
            group.category.name_ar,
            group.packed_count(),
            group.len()
        );
        for item in &group.items {
            let mark = if item.is_packed { 'x' } else { ' ' };
            let _ = write!(out, "  [{}] {} ({})", mark, item.name_ar, item.name);
            if let Some(notes) = &item.notes {
                let _ = write!(out, " - {}", notes);
            }
            out.push('\n');
        }
    }
    out
}
