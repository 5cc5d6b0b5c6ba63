mod logging;
mod workspace;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use idforge_core::schemes::sim::validate_any_carrier;
use idforge_core::{
    Carrier, GeneratedId, GenerationError, GeneratorContext, GeneratorRegistry, Gender,
    PhoneFormat, Scheme, ValidationError, clamp_count, decode_national_id, generate_batch,
    group_by_label, validate_sim,
};
use idforge_export::output::write_batch;
use idforge_export::{ExportError, Symbology, export_document, parse_text_list, write_document};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;
use workspace::{
    Preferences, SessionBatch, WorkspaceError, WorkspacePaths, clear_session,
    load_or_create_preferences, load_session, save_preferences, save_session,
};

const PREVIEW_SYMBOLOGY: Symbology = Symbology::Code128;
const BARCODE_LIST_TITLE: &str = "Generated Barcodes";

#[derive(Debug, Error)]
enum CliError {
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("logging error: {0}")]
    Logging(#[from] logging::LoggingError),
    #[error("{0}")]
    InvalidInput(String),
}

#[derive(Parser, Debug)]
#[command(name = "idforge", version, about = "Checksum-valid fake identifiers for testing")]
struct Cli {
    /// Directory holding settings, session batches, exports and logs.
    #[arg(long, global = true, default_value = ".idforge")]
    workspace: PathBuf,
    /// Seed the random source for reproducible output.
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a batch of identifiers.
    Generate(GenerateArgs),
    /// Check values against a scheme.
    Validate(ValidateArgs),
    /// Export the last generated batch as a barcode document.
    Export(ExportArgs),
    /// Export a free-text list as barcodes.
    Barcode(BarcodeArgs),
    /// Drop the last generated batch for a scheme.
    Clear(ClearArgs),
    /// Show or reset saved preferences.
    Prefs(PrefsArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// national_id, passport, sim, imei or phone.
    scheme: Scheme,
    /// Number of values (1-100).
    #[arg(long)]
    count: Option<usize>,
    #[arg(long)]
    min_age: Option<u32>,
    #[arg(long)]
    max_age: Option<u32>,
    /// Male, Female or Random.
    #[arg(long)]
    gender: Option<Gender>,
    /// SIM carrier; repeat to mix carriers.
    #[arg(long = "carrier", value_name = "CARRIER")]
    carriers: Vec<Carrier>,
    /// Type Allocation Code for IMEIs; anything but 8 digits is replaced.
    #[arg(long)]
    tac: Option<String>,
    /// Local, International or Random.
    #[arg(long)]
    format: Option<PhoneFormat>,
    /// Also write the batch to a .csv or .json file.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Show barcode previews.
    #[arg(long, conflicts_with = "text")]
    barcodes: bool,
    /// Show plain text.
    #[arg(long)]
    text: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    scheme: Scheme,
    #[arg(required = true)]
    values: Vec<String>,
    /// Pin SIM validation to one carrier.
    #[arg(long)]
    carrier: Option<Carrier>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    scheme: Scheme,
    /// CODE128, CODE39 or EAN13.
    #[arg(long, default_value = "CODE128")]
    symbology: Symbology,
    /// Output directory; defaults to the workspace `out` directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BarcodeArgs {
    /// File with one value per line; `-` reads stdin. Defaults to the saved list.
    #[arg(long)]
    input: Option<PathBuf>,
    /// CODE128, CODE39 or EAN13. Defaults to the saved type.
    #[arg(long)]
    symbology: Option<Symbology>,
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ClearArgs {
    scheme: Scheme,
}

#[derive(Args, Debug)]
struct PrefsArgs {
    #[command(subcommand)]
    action: PrefsAction,
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    Show,
    Reset,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let paths = WorkspacePaths::new(cli.workspace.clone());
    paths.ensure_dirs()?;
    logging::init_logging(&paths.cli_log_path())?;

    let run_id = Uuid::new_v4().to_string();
    let command = command_name(&cli.command);
    tracing::info!(event = "run_started", run_id = %run_id, command);
    let timer = Instant::now();

    let mut rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    };

    let result = match cli.command {
        Command::Generate(args) => run_generate(&paths, args, &mut rng),
        Command::Validate(args) => run_validate(args),
        Command::Export(args) => run_export(&paths, args),
        Command::Barcode(args) => run_barcode(&paths, args),
        Command::Clear(args) => run_clear(&paths, args),
        Command::Prefs(args) => run_prefs(&paths, args),
    };

    let duration_ms = timer.elapsed().as_millis();
    match &result {
        Ok(()) => {
            tracing::info!(event = "run_finished", run_id = %run_id, status = "success", duration_ms)
        }
        Err(err) => {
            tracing::error!(event = "run_finished", run_id = %run_id, status = "failed", duration_ms, error = %err)
        }
    }
    result
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Generate(_) => "generate",
        Command::Validate(_) => "validate",
        Command::Export(_) => "export",
        Command::Barcode(_) => "barcode",
        Command::Clear(_) => "clear",
        Command::Prefs(_) => "prefs",
    }
}

fn run_generate(
    paths: &WorkspacePaths,
    args: GenerateArgs,
    rng: &mut ChaCha8Rng,
) -> Result<(), CliError> {
    let mut prefs = load_or_create_preferences(paths)?;
    let before = prefs.clone();
    apply_generate_args(&mut prefs, &args);

    let scheme = args.scheme;
    let (params, count, show_barcodes) = scheme_request(&prefs, scheme);
    let registry = GeneratorRegistry::new();
    let ctx = GeneratorContext::default();
    let items = generate_batch(
        &registry,
        scheme.generator_id(),
        &ctx,
        params.as_ref(),
        count,
        rng,
    )?;

    // Only remember overrides that produced a batch.
    if prefs != before {
        save_preferences(paths, &prefs)?;
    }
    save_session(paths, &SessionBatch::new(scheme, items.clone()))?;
    if let Some(out) = &args.out {
        write_batch(out, &items)?;
    }

    print_batch(scheme, &items, show_barcodes);
    Ok(())
}

/// Fold command-line overrides into the saved form values, clamped the same
/// way the form clamps them.
fn apply_generate_args(prefs: &mut Preferences, args: &GenerateArgs) {
    let show_barcodes = match (args.barcodes, args.text) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    let (count, shown) = match args.scheme {
        Scheme::NationalId => {
            let id = &mut prefs.national_id;
            if let Some(min_age) = args.min_age {
                id.min_age = min_age;
            }
            if let Some(max_age) = args.max_age {
                id.max_age = max_age;
            }
            id.min_age = id.min_age.max(1);
            id.max_age = id.max_age.max(id.min_age);
            if let Some(gender) = args.gender {
                id.gender = gender;
            }
            (&mut id.count, &mut id.show_barcodes)
        }
        Scheme::Sim => {
            let sim = &mut prefs.sim;
            if !args.carriers.is_empty() {
                sim.carriers = dedup_carriers(&args.carriers);
            }
            if sim.carriers.is_empty() {
                sim.carriers.push(Carrier::Vodacom);
            }
            (&mut sim.count, &mut sim.show_barcodes)
        }
        Scheme::Imei => {
            if let Some(tac) = &args.tac {
                prefs.imei.tac = tac.clone();
            }
            (&mut prefs.imei.count, &mut prefs.imei.show_barcodes)
        }
        Scheme::Phone => {
            if let Some(format) = args.format {
                prefs.phone.format = format;
            }
            (&mut prefs.phone.count, &mut prefs.phone.show_barcodes)
        }
        Scheme::Passport => (&mut prefs.passport.count, &mut prefs.passport.show_barcodes),
    };

    if let Some(requested) = args.count {
        *count = requested;
    }
    *count = clamp_count(*count);
    if let Some(value) = show_barcodes {
        *shown = value;
    }
}

fn dedup_carriers(carriers: &[Carrier]) -> Vec<Carrier> {
    let mut unique = Vec::with_capacity(carriers.len());
    for carrier in carriers {
        if !unique.contains(carrier) {
            unique.push(*carrier);
        }
    }
    unique
}

fn scheme_request(prefs: &Preferences, scheme: Scheme) -> (Option<Value>, usize, bool) {
    match scheme {
        Scheme::NationalId => {
            let id = &prefs.national_id;
            let params = json!({
                "min_age": id.min_age,
                "max_age": id.max_age,
                "gender": id.gender,
            });
            (Some(params), id.count, id.show_barcodes)
        }
        Scheme::Sim => {
            let carriers: Vec<&str> = prefs.sim.carriers.iter().map(|c| c.as_str()).collect();
            let params = json!({ "carriers": carriers });
            (Some(params), prefs.sim.count, prefs.sim.show_barcodes)
        }
        Scheme::Imei => {
            let params = (!prefs.imei.tac.is_empty()).then(|| json!({ "tac": prefs.imei.tac }));
            (params, prefs.imei.count, prefs.imei.show_barcodes)
        }
        Scheme::Phone => {
            let params = json!({ "format": prefs.phone.format });
            (Some(params), prefs.phone.count, prefs.phone.show_barcodes)
        }
        Scheme::Passport => (None, prefs.passport.count, prefs.passport.show_barcodes),
    }
}

fn print_batch(scheme: Scheme, items: &[GeneratedId], show_barcodes: bool) {
    if scheme == Scheme::Sim {
        for (label, members) in group_by_label(items) {
            let heading = label
                .parse::<Carrier>()
                .map(Carrier::label)
                .unwrap_or(label.as_str());
            println!("{heading}");
            for item in members {
                println!("  {}", render_line(&item.value, show_barcodes));
            }
        }
        return;
    }
    for item in items {
        println!("{}", render_line(&item.value, show_barcodes));
    }
}

fn render_line(value: &str, show_barcodes: bool) -> String {
    if !show_barcodes {
        return value.to_string();
    }
    match PREVIEW_SYMBOLOGY.check(value) {
        Ok(()) => format!("{value}  [{PREVIEW_SYMBOLOGY}]"),
        Err(err) => format!("{value}  [barcode error: {}]", err.reason),
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let mut failed = 0_usize;
    for value in &args.values {
        match describe_validation(args.scheme, args.carrier, value) {
            Ok(detail) => println!("{value}: ok{detail}"),
            Err(err) => {
                failed += 1;
                println!("{value}: invalid ({err})");
            }
        }
    }

    tracing::info!(
        event = "values_validated",
        scheme = %args.scheme,
        total = args.values.len(),
        failed
    );
    if failed > 0 {
        return Err(CliError::InvalidInput(format!(
            "{failed} of {} values failed {} validation",
            args.values.len(),
            args.scheme
        )));
    }
    Ok(())
}

fn describe_validation(
    scheme: Scheme,
    carrier: Option<Carrier>,
    value: &str,
) -> Result<String, ValidationError> {
    match (scheme, carrier) {
        (Scheme::Sim, Some(carrier)) => {
            validate_sim(carrier, value).map(|()| format!(" ({})", carrier.label()))
        }
        (Scheme::Sim, None) => {
            validate_any_carrier(value).map(|carrier| format!(" ({})", carrier.label()))
        }
        (Scheme::NationalId, _) => {
            let year = GeneratorContext::default().current_year;
            let decoded = decode_national_id(value, year)?;
            Ok(format!(
                " (born {}, {:?}, citizenship {})",
                decoded.birth_date, decoded.gender, decoded.citizenship
            ))
        }
        (other, _) => other.validate(value).map(|()| String::new()),
    }
}

fn run_export(paths: &WorkspacePaths, args: ExportArgs) -> Result<(), CliError> {
    let batch = load_session(paths, args.scheme)?
        .filter(|batch| !batch.items.is_empty())
        .ok_or_else(|| {
            CliError::InvalidInput(format!(
                "no generated {} values; run `idforge generate {}` first",
                args.scheme, args.scheme
            ))
        })?;

    let title = export_title(&batch);
    let document = export_document(&batch.values(), args.symbology, &title)?;
    let out_dir = args.out_dir.unwrap_or_else(|| paths.out_dir.clone());
    let path = write_document(&out_dir, &document)?;
    println!(
        "{} ({} pages, {} barcode errors)",
        path.display(),
        document.pages.len(),
        document.error_count()
    );
    Ok(())
}

fn export_title(batch: &SessionBatch) -> String {
    if batch.scheme != Scheme::Sim {
        return batch.scheme.export_title().to_string();
    }
    let groups = group_by_label(&batch.items);
    match groups.as_slice() {
        [(label, _)] => {
            let name = label
                .parse::<Carrier>()
                .map(Carrier::label)
                .unwrap_or(label.as_str());
            format!("{name} SIM Numbers")
        }
        _ => "Mixed Carrier SIMs".to_string(),
    }
}

fn run_barcode(paths: &WorkspacePaths, args: BarcodeArgs) -> Result<(), CliError> {
    let mut prefs = load_or_create_preferences(paths)?;
    let before = prefs.clone();

    if let Some(input) = &args.input {
        prefs.barcode.text_list = read_input(input)?;
    }
    if let Some(symbology) = args.symbology {
        prefs.barcode.barcode_type = symbology;
    }
    if prefs != before {
        save_preferences(paths, &prefs)?;
    }

    let items = parse_text_list(&prefs.barcode.text_list);
    if items.is_empty() {
        return Err(CliError::InvalidInput("barcode list is empty".to_string()));
    }
    let document = export_document(&items, prefs.barcode.barcode_type, BARCODE_LIST_TITLE)?;
    let out_dir = args.out_dir.unwrap_or_else(|| paths.out_dir.clone());
    let path = write_document(&out_dir, &document)?;

    for item in &items {
        match prefs.barcode.barcode_type.check(item) {
            Ok(()) => println!("{item}"),
            Err(err) => println!("{item}  [barcode error: {}]", err.reason),
        }
    }
    println!("{}", path.display());
    Ok(())
}

fn read_input(input: &Path) -> Result<String, CliError> {
    if input.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    Ok(std::fs::read_to_string(input)?)
}

fn run_clear(paths: &WorkspacePaths, args: ClearArgs) -> Result<(), CliError> {
    if clear_session(paths, args.scheme)? {
        tracing::info!(event = "session_cleared", scheme = %args.scheme);
        println!("cleared {} batch", args.scheme);
    } else {
        println!("no {} batch to clear", args.scheme);
    }
    Ok(())
}

fn run_prefs(paths: &WorkspacePaths, args: PrefsArgs) -> Result<(), CliError> {
    match args.action {
        PrefsAction::Show => {
            let prefs = load_or_create_preferences(paths)?;
            let encoded = toml::to_string_pretty(&prefs).map_err(WorkspaceError::from)?;
            print!("{encoded}");
        }
        PrefsAction::Reset => {
            save_preferences(paths, &Preferences::default())?;
            println!("preferences reset");
        }
    }
    Ok(())
}
