//! Command implementations.

use std::io::Write;
use std::path::Path;

use tracing::warn;

use aceup_client::{Client, ClientError, TransferTask, UploadOutcome};

use crate::Command;
use crate::config::Config;

/// File the `upload` command appends multi-part results to.
const RESULTS_FILE: &str = "results.txt";

pub async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let mut client = Client::connect(
        config.api_key.as_str(),
        config.api_token.as_str(),
        &config.work_dir,
    )
    .await?
    .with_workers(config.workers);

    match command {
        Command::Upload {
            paths,
            password,
            urls_only,
        } => {
            for path in paths {
                upload_path(&mut client, &path, password.as_deref(), urls_only).await?;
            }
        }
        Command::Folder { paths, password } => {
            for path in paths {
                if !path.is_dir() {
                    eprintln!("This path is not a folder: {}", path.display());
                    continue;
                }
                let mut entries: Vec<_> = std::fs::read_dir(&path)?
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .collect();
                entries.sort();
                for entry in entries {
                    upload_path(&mut client, &entry, password.as_deref(), false).await?;
                }
            }
        }
        Command::Remote { urls, password } => {
            for url in urls {
                let task = TransferTask::remote_url(url, password.clone());
                let outcomes = client.run(task).await?;
                print_outcomes(&outcomes, false)?;
            }
        }
        Command::Info { slugs } => {
            let info = client.file_info(&slugs).await?;
            for slug in &slugs {
                match info.get(slug) {
                    Some(record) if record.is_known() => println!(
                        "{slug}: {} ({} bytes) {} [{}]",
                        record.name.as_deref().unwrap_or("-"),
                        record.size.as_deref().unwrap_or("-"),
                        record.url.as_deref().unwrap_or("-"),
                        record.status.as_deref().unwrap_or("-"),
                    ),
                    _ => println!("{slug}: unknown"),
                }
            }
        }
    }
    Ok(())
}

/// Uploads one path, reporting failures without aborting the batch.
async fn upload_path(
    client: &mut Client,
    path: &Path,
    password: Option<&str>,
    urls_only: bool,
) -> anyhow::Result<()> {
    let task = TransferTask::path(path, password.map(str::to_string));
    match client.run(task).await {
        Ok(outcomes) => print_outcomes(&outcomes, urls_only),
        Err(ClientError::SourceNotFound(source)) => {
            eprintln!("This path does not exist: {source}");
            Ok(())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "upload failed");
            eprintln!("Failed to upload {}: {e}", path.display());
            Ok(())
        }
    }
}

/// Prints outcome lines; multi-part uploads are also appended to
/// `results.txt` so the volume links survive a scrolled-away terminal.
fn print_outcomes(outcomes: &[UploadOutcome], urls_only: bool) -> anyhow::Result<()> {
    let multi_part = outcomes.len() > 1;
    let mut results_file = if multi_part {
        println!(
            "File was too large for a single transfer; it was split into {} parts.",
            outcomes.len()
        );
        Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(RESULTS_FILE)?,
        )
    } else {
        None
    };

    for outcome in outcomes {
        let name = outcome.name.as_deref().unwrap_or("?");
        if outcome.success {
            let url = outcome.url.as_deref().unwrap_or("");
            if urls_only {
                println!("{url}");
            } else {
                println!("{name} : {url}");
            }
            if let Some(file) = results_file.as_mut() {
                writeln!(file, "{name} : {url}")?;
            }
        } else {
            eprintln!("{name} : upload failed ({})", summarize(&outcome.raw));
        }
    }
    Ok(())
}

/// First line of a response body, shortened for terminal output.
fn summarize(raw: &str) -> &str {
    let line = raw.lines().next().unwrap_or(raw);
    match line.char_indices().nth(120) {
        Some((index, _)) => &line[..index],
        None => line,
    }
}
