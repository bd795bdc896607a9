//! `fundus-replay`: replay recorded editor messages against a report.
//!
//! ```text
//! fundus-replay <report.json> <script.json>
//! ```
//!
//! Seeds the editor from a fetched report document, applies each message in
//! the script (a JSON array of editor messages) and prints the resulting save
//! payload to stdout.

use std::path::Path;
use std::process::ExitCode;

use fundus_annotator::persistence::{FetchedReport, PersistenceError};
use fundus_annotator::{EditorConfig, EditorError, EditorMessage, EditorSession};

fn main() -> ExitCode {
    let config = EditorConfig::load_from_default_path().unwrap_or_default();

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let [_, report_path, script_path] = args.as_slice() else {
        eprintln!("Usage: fundus-replay <report.json> <script.json>");
        return ExitCode::from(2);
    };

    match run(config, Path::new(report_path), Path::new(script_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Replay failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PersistenceError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn run(config: EditorConfig, report_path: &Path, script_path: &Path) -> Result<(), EditorError> {
    let report: FetchedReport = read_json(report_path)?;
    let script: Vec<EditorMessage> = read_json(script_path)?;

    let mut session = EditorSession::new(config);
    session.open_fetched(&report)?;
    log::info!(
        "Replaying {} messages against report {}",
        script.len(),
        report.id
    );

    for (index, message) in script.into_iter().enumerate() {
        if let Err(e) = session.update(message) {
            log::error!("Message #{} failed", index);
            return Err(e);
        }
    }

    let payload = session.save_payload()?;
    println!("{}", payload.to_json()?);
    Ok(())
}
