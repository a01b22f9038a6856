use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dpr_core::layout::Layout;
use dpr_core::payload::serialize;
use dpr_core::wizard::{FormSession, FormState};
use dpr_data::logging::init_tracing;
use dpr_data::snapshot::{self, PayloadWriter, SnapshotWriter};
use dpr_data::{asset_import, layout_config};
use tracing::warn;

/// Turn a saved DPR form into the flat cell payload for the report generator.
///
/// Starts from a form snapshot (or an empty form), optionally adds fixed-asset
/// line items from a CSV file with the columns:
/// - category: one of the layout's asset categories
/// - description: the item's description
/// - amount: the item's amount (may be empty)
///
/// A form on its last step is submitted; anything earlier is written as a
/// preview without the submit checks.
#[derive(Parser, Debug)]
#[command(name = "dpr-payload")]
#[command(version, about, long_about = None)]
struct Args {
    /// Form snapshot (JSON) to start from
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// TOML layout file; the standard DPR/CMA layout when omitted
    #[arg(short, long)]
    layout: Option<PathBuf>,

    /// CSV file of fixed-asset line items to add before serializing
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Write the form snapshot here after every change
    #[arg(long)]
    save: Option<PathBuf>,

    /// Where to write the payload JSON
    #[arg(short, long)]
    out: PathBuf,

    /// Pretty-print the payload
    #[arg(short, long, default_value_t = false)]
    pretty: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let custom = match &args.layout {
        Some(path) => {
            println!("Loading layout from: {}", path.display());
            let layout = layout_config::load_from_file(path)
                .with_context(|| format!("Failed to load layout: {}", path.display()))?;
            Some(layout)
        }
        None => None,
    };
    let layout = custom.as_ref().unwrap_or_else(|| Layout::standard());

    let state = match &args.snapshot {
        Some(path) => snapshot::load_snapshot(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?,
        None => FormState::new(layout),
    };

    let observer = (
        args.save.as_ref().map(SnapshotWriter::new),
        PayloadWriter::new(&args.out, args.pretty),
    );
    let mut session = FormSession::resume(layout, state, observer);

    if let Some(path) = &args.assets {
        let records = asset_import::load_from_file(path)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        println!("Parsed {} asset items from CSV", records.len());

        let added = asset_import::apply(&mut session, &records)
            .with_context(|| format!("Failed to import assets from: {}", path.display()))?;
        println!("Added {added} asset items.");
    }

    let payload = if session.state().cursor.is_last() {
        let payload = session.submit().context("Form could not be submitted")?;
        if let Some(err) = session.observer_mut().1.take_error() {
            return Err(err).context("Failed to write payload");
        }
        payload
    } else {
        let state = session.state();
        warn!(
            step = %state.current_section(),
            "form is not on its last step; writing a preview"
        );
        let payload = serialize(layout, &state.sections, &state.assets);
        snapshot::write_payload(&args.out, &payload, args.pretty)
            .with_context(|| format!("Failed to write payload: {}", args.out.display()))?;
        payload
    };

    if let Some(writer) = &mut session.observer_mut().0
        && let Some(err) = writer.take_error()
    {
        return Err(err)
            .with_context(|| format!("Failed to save snapshot: {}", writer.path().display()));
    }

    println!(
        "Wrote {} cells to {} ({} rows left out).",
        payload.cells.len(),
        args.out.display(),
        payload.diagnostics.len()
    );

    Ok(())
}
