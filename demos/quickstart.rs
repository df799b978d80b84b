//! Run History Quickstart
//!
//! Walks through the full life of a history file: appending runs,
//! summarizing, querying, exporting, and repairing damage.
//!
//! Run with: cargo run --example quickstart

use std::fs::OpenOptions;
use std::io::Write;

use bitacora::{repair, RunLog, RunRecord};

fn main() -> bitacora::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Bitacora Run History ===\n");

    let dir = std::env::temp_dir().join("bitacora_quickstart");
    std::fs::create_dir_all(&dir)?;
    let history_path = dir.join("training_history.jsonl");
    std::fs::remove_file(&history_path).ok();

    let mut log = RunLog::new(&history_path);

    // -------------------------------------------------------------------------
    // 1. Record a few training runs
    // -------------------------------------------------------------------------
    println!("1. Recording training runs...");

    for (run, lr) in [0.1, 0.05, 0.01].into_iter().enumerate() {
        let mae = 4.5 - run as f64;
        let record = RunRecord::builder()
            .param("lr", lr)
            .param("epochs", 30_u32)
            .param("optimizer", "adam")
            .metric("mae", mae)
            .metric("rmse", mae * 1.28)
            .epoch_series("loss", &[1.9, 1.1, 0.7])
            .model_path("final", format!("models/run_{run:04}.bin"))
            .build();
        log.append(&record)?;
    }

    println!("   Recorded {} runs at {}", log.count()?, history_path.display());

    // -------------------------------------------------------------------------
    // 2. Summarize the most recent runs
    // -------------------------------------------------------------------------
    println!("\n2. Recent runs:");
    log.print_recent_runs(10)?;

    // -------------------------------------------------------------------------
    // 3. Query by hyperparameter
    // -------------------------------------------------------------------------
    println!("\n3. Runs with lr=0.01:");

    for found in log.find_by_param("lr", 0.01)? {
        println!(
            "   mae={:?} model={:?}",
            found.metric("mae"),
            found.model_path("final")
        );
    }

    // -------------------------------------------------------------------------
    // 4. Export to CSV and SQLite
    // -------------------------------------------------------------------------
    println!("\n4. Exporting...");

    let csv_rows = log.export_csv(dir.join("training_history.csv"))?;
    let db_rows = log.export_sqlite(dir.join("training_history.db"))?;
    println!("   CSV rows: {csv_rows}, SQLite rows: {db_rows}");

    // -------------------------------------------------------------------------
    // 5. Damage the file, then audit and repair
    // -------------------------------------------------------------------------
    println!("\n5. Simulating a crash-damaged history...");

    let mut file = OpenOptions::new().append(true).open(log.path())?;
    file.write_all(b"interrupted write, no json here\n")?;
    drop(file);

    let report = log.audit()?;
    println!(
        "   Audit: {} lines, {} valid, {} malformed",
        report.total_lines, report.valid_lines, report.malformed_lines
    );

    let recovered = log.repair(true)?;
    println!(
        "   Repair kept {} records (backup at {})",
        recovered,
        repair::backup_path(log.path()).display()
    );

    // -------------------------------------------------------------------------
    // 6. Auto-export every 2 runs
    // -------------------------------------------------------------------------
    println!("\n6. Auto-export every 2 runs...");

    log.enable_auto_export(2, Some(dir.join("auto_export.csv")))?;
    log.append(&RunRecord::builder().metric("mae", 1.2).build())?;
    log.append(&RunRecord::builder().metric("mae", 1.1).build())?;

    let exists = dir.join("auto_export.csv").exists();
    println!("   auto_export.csv written: {exists}");

    println!("\nDone. Files are under {}", dir.display());
    Ok(())
}
