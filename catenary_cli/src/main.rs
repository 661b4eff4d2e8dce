//! # Catenary CLI Application
//!
//! Runs a sag-tension study for a Drake conductor over a line section.
//!
//! ```text
//! catenary_cli                      prompt for a single demo span
//! catenary_cli feeder.rsp           study the spans stored in a document
//! catenary_cli --save demo.rsp      prompt, then save the demo section
//! ```
//!
//! Set `RUST_LOG=debug` to watch the solvers.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use catenary_core::conductor::{Conductor, MaterialLibrary};
use catenary_core::document::RulingSpanDocument;
use catenary_core::errors::CalcResult;
use catenary_core::file_io::{load_document_with_lock_check, save_document, FileLock};
use catenary_core::geometry::Vector2;
use catenary_core::loads::{
    standard_temperatures, Condition, DesignCondition, LoadLimit, LoadingCondition, NescDistrict,
};
use catenary_core::report::render_report;
use catenary_core::ruling_span::RulingSpan;
use catenary_core::sag_tension::SagTensionStudy;
use catenary_core::units::UnitSystem;

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

#[derive(Debug, Default)]
struct Args {
    document: Option<PathBuf>,
    save: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut rest = std::env::args().skip(1);
    while let Some(arg) = rest.next() {
        if arg == "--save" {
            args.save = rest.next().map(PathBuf::from);
        } else {
            args.document = Some(PathBuf::from(arg));
        }
    }
    args
}

fn demo_document(conductor: &Conductor) -> CalcResult<RulingSpanDocument> {
    println!("No document given. Describe one span (SI units).");
    let span_m = prompt_f64("Enter span length (m) [400.0]: ", 400.0);
    let rise_m = prompt_f64("Enter rise to far support (m) [10.0]: ", 10.0);
    let tension_n = prompt_f64("Enter stringing tension H (N) [22000.0]: ", 22_000.0);
    println!();

    let section = RulingSpan::from_steps(
        Vector2::new(0.0, 30.0),
        &[Vector2::new(span_m, rise_m)],
        conductor.weight(),
        tension_n,
    )?;
    let mut document = RulingSpanDocument::from_ruling_span(&section, UnitSystem::Metric, "", "DEMO");
    document.settings.design = Some(DesignCondition::new(
        LoadingCondition::new("Stringing", 15.0),
        LoadLimit::HorizontalTension(tension_n),
        Condition::Initial,
    ));
    Ok(document)
}

fn default_design() -> DesignCondition {
    DesignCondition::new(
        NescDistrict::Heavy.loading(UnitSystem::Metric),
        LoadLimit::RatedStrengthFraction(0.40),
        Condition::Initial,
    )
}

fn default_loadings() -> Vec<LoadingCondition> {
    let mut loadings = vec![NescDistrict::Heavy.loading(UnitSystem::Metric)];
    loadings.extend(
        standard_temperatures(UnitSystem::Metric)
            .into_iter()
            .map(|t| LoadingCondition::new(format!("{t:.0} °C"), t)),
    );
    loadings
}

fn run(args: &Args) -> CalcResult<()> {
    let conductor = Conductor::drake(&MaterialLibrary::standard())?;

    let mut document = match &args.document {
        Some(path) => {
            let (document, lock) = load_document_with_lock_check(path)?;
            if let Some(lock) = lock {
                println!(
                    "Note: {} is locked by {} ({}) since {}",
                    path.display(),
                    lock.user_id,
                    lock.machine,
                    lock.locked_at.format("%Y-%m-%d %H:%M")
                );
            }
            log::info!("loaded {} ({} spans)", path.display(), document.spans.len());
            document
        }
        None => demo_document(&conductor)?,
    };

    if let Some(path) = &args.save {
        let user = std::env::var("USER").unwrap_or_else(|_| "catenary_cli".to_string());
        let lock = FileLock::acquire(path, user)?;
        document.touch();
        save_document(&document, path)?;
        drop(lock);
        println!("Saved {}", path.display());
    }

    // The conductor model works in SI
    document.convert_units(UnitSystem::Metric)?;
    let section = document.to_ruling_span()?;
    let settings = &document.settings;

    let design = settings.design.clone().unwrap_or_else(default_design);
    let loadings = if settings.loadings.is_empty() {
        default_loadings()
    } else {
        settings.loadings.clone()
    };

    let study = loadings.into_iter().fold(
        SagTensionStudy::new(conductor, design)
            .with_ruling_span(&section)
            .with_tolerances(settings.tolerances),
        SagTensionStudy::with_loading,
    );
    println!(
        "Ruling span {:.1} m over {} span(s)",
        section.ruling_span_length(),
        section.len()
    );
    let result = study.run()?;

    println!("{}", render_report(&result, UnitSystem::Metric));

    println!("JSON Output (final, span 1):");
    let rows = result.rows(0, Condition::Final)?;
    if let Ok(json) = serde_json::to_string_pretty(&rows) {
        println!("{}", json);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("Catenary CLI - Sag-Tension Calculator");
    println!("=====================================");
    println!();

    if let Err(e) = run(&parse_args()) {
        eprintln!("Error: {}", e);
        if e.is_recoverable() {
            eprintln!("Another session holds the file; try again once it is closed.");
        }
        if let Ok(json) = serde_json::to_string_pretty(&e) {
            eprintln!();
            eprintln!("Error JSON:");
            eprintln!("{}", json);
        }
        std::process::exit(1);
    }
}
