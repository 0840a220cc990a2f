// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use equipment_summary::cli::{CliArgs, Command};
use equipment_summary::config::{self, AppConfig};
use equipment_summary::report::{self, HistoryRecord, ReportFormat};
use equipment_summary::state::StateFile;
use equipment_summary::{BlobStore, DirStore, EquipmentRow, HistoryStore, SummaryId, console_format, pipeline, ui};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() {
    env_logger::init();

    // Parse CLI arguments
    let args = CliArgs::parse_args();
    ui::set_colors(args.use_colors());

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        std::process::exit(1);
    }

    // Set console width override if specified (for testing)
    if let Some(width) = args.console_width {
        console_format::set_console_width(width);
    }

    let config = match config::build_app_config(&args) {
        Ok(c) => c,
        Err(e) => {
            ui::print_error(&format!("Configuration error: {}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args.command, &config) {
        ui::print_error(&e);
        std::process::exit(1);
    }
}

/// Load state under the lock and run one command
///
/// Commands that change the history save it themselves, and only delete
/// retained uploads once the new history is on disk.
fn run(command: &Command, config: &AppConfig) -> Result<(), String> {
    let state = StateFile::lock(&config.data_dir)
        .map_err(|e| format!("Failed to open data directory {}: {}", config.data_dir.display(), e))?;
    let blobs: Arc<dyn BlobStore> = Arc::new(DirStore::new(config.uploads_dir.clone()));
    let store = state.load(blobs).map_err(|e| e.to_string())?;

    match command {
        Command::Upload { file, name, show_rows, json } => {
            upload(&state, &store, config, file, name.as_deref(), *show_rows, *json)
        }
        Command::History { json } => history(&store, config, *json),
        Command::Show { id, json } => show(&store, config, id, *json),
        Command::Report { id, format, output } => write_report(&store, config, id, *format, output.as_deref()),
        Command::Delete { id } => delete(&state, &store, config, id),
    }
}

fn save(state: &StateFile, store: &HistoryStore) -> Result<(), String> {
    state.save(store).map_err(|e| format!("Failed to save history to {}: {}", state.path().display(), e))
}

/// JSON answer to an upload
#[derive(serde::Serialize)]
struct UploadReport<'a> {
    summary: HistoryRecord<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<&'a [EquipmentRow]>,
    evicted: Vec<SummaryId>,
}

fn upload(
    state: &StateFile,
    store: &HistoryStore,
    config: &AppConfig,
    file: &Path,
    name: Option<&str>,
    show_rows: bool,
    json: bool,
) -> Result<(), String> {
    let filename = match name {
        Some(n) => n.trim().to_string(),
        None => file
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .ok_or_else(|| format!("Invalid file path: {}", file.display()))?,
    };

    let raw = fs::read(file).map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    debug!("Read {} bytes from {:?}", raw.len(), file);

    let outcome = pipeline::stage(store, &config.owner, &filename, &raw).map_err(|e| e.to_string())?;
    if let Err(e) = save(state, store) {
        outcome.abandon(store);
        return Err(e);
    }
    outcome.commit(store);

    if json {
        let report = UploadReport {
            summary: HistoryRecord::from(outcome.summary.as_ref()).rounded(),
            rows: show_rows.then_some(outcome.rows.as_slice()),
            evicted: outcome.evicted.iter().map(|s| s.id).collect(),
        };
        let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{}", text);
        return Ok(());
    }

    ui::status(&format!("Uploaded {} as {}", filename, outcome.summary.id.short()));
    console_format::print_summary(&outcome.summary, config.use_colors);
    if show_rows {
        println!();
        console_format::print_rows_table(&outcome.rows);
    }
    for old in &outcome.evicted {
        ui::print_warning(&format!("history is full, dropped {} ({})", old.id.short(), old));
    }
    Ok(())
}

fn history(store: &HistoryStore, config: &AppConfig, json: bool) -> Result<(), String> {
    let summaries = store.list(&config.owner);

    if json {
        let text = report::export_history_json(&summaries).map_err(|e| e.to_string())?;
        println!("{}", text);
    } else {
        console_format::print_history_table(&summaries, config.use_colors);
    }
    Ok(())
}

fn show(store: &HistoryStore, config: &AppConfig, id: &str, json: bool) -> Result<(), String> {
    let summary = store.resolve(&config.owner, id).map_err(|e| e.to_string())?;

    if json {
        let text = report::export_summary_json(&summary).map_err(|e| e.to_string())?;
        println!("{}", text);
    } else {
        console_format::print_summary(&summary, config.use_colors);
    }
    Ok(())
}

fn write_report(
    store: &HistoryStore,
    config: &AppConfig,
    id: &str,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<(), String> {
    let summary = store.resolve(&config.owner, id).map_err(|e| e.to_string())?;
    let path = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(report::report_filename(&summary, format)));

    let written = report::export_report(&summary, format, &path)
        .map_err(|e| format!("Failed to write report to {}: {}", path.display(), e))?;

    ui::status(&format!("Report saved to: {} ({} bytes, {})", path.display(), written, format.content_type()));
    Ok(())
}

fn delete(state: &StateFile, store: &HistoryStore, config: &AppConfig, id: &str) -> Result<(), String> {
    let summary = store.resolve(&config.owner, id).map_err(|e| e.to_string())?;
    let removed = store.remove(&config.owner, &summary.id).map_err(|e| e.to_string())?;
    save(state, store)?;
    store.release(&[removed]);

    ui::status(&format!("Deleted {} ({})", summary.id.short(), summary));
    Ok(())
}
