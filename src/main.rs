//! Energy audit entry point: CLI wiring, config loading, and export.

mod cli;

use std::path::{Path, PathBuf};
use std::process;

use chrono::Local;
use tracing::info;
use tracing_subscriber::EnvFilter;

use energy_audit::audit::report::report_file_stem;
use energy_audit::config::AuditConfig;
use energy_audit::demo::synthetic_readings;
use energy_audit::error::AppError;
use energy_audit::io::export::{export_daily_csv, export_hourly_csv, export_json, export_report_text};
use energy_audit::io::import::{load_readings, read_records};
use energy_audit::reading::{Reading, normalize_records};
use energy_audit::runner::{AuditRun, run_audit};

use cli::CliOptions;

/// Input path meaning "read the CSV from stdin".
const STDIN_PATH: &str = "-";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = match cli::parse_args().map_err(AppError::Usage) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(&opts) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(opts: &CliOptions) -> Result<(), AppError> {
    let config = load_config(opts)?;
    let readings = load_input(opts, &config)?;
    let run = run_audit(&readings, &config.site_info());

    println!("{}", run.report);

    write_exports(opts, &run, &config.site.name)?;

    #[cfg(feature = "api")]
    if opts.serve {
        serve(run, opts.port.unwrap_or(cli::DEFAULT_PORT))?;
    }

    Ok(())
}

/// Loads the config file (or defaults), applies CLI overrides, and validates.
fn load_config(opts: &CliOptions) -> Result<AuditConfig, AppError> {
    let mut config = match &opts.config {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            AuditConfig::from_toml_file(path)?
        }
        None => AuditConfig::default(),
    };
    opts.apply_to(&mut config);

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        return Err(AppError::InvalidConfig(errors));
    }
    Ok(config)
}

fn load_input(opts: &CliOptions, config: &AuditConfig) -> Result<Vec<Reading>, AppError> {
    match &opts.input {
        Some(path) if path.as_os_str() == STDIN_PATH => {
            let records = read_records(std::io::stdin().lock(), config.delimiter())?;
            let readings = normalize_records(&records);
            info!(
                rows = records.len(),
                readings = readings.len(),
                "loaded energy readings from stdin"
            );
            Ok(readings)
        }
        Some(path) => load_readings(path, config.delimiter()),
        None => {
            let start = config
                .demo
                .start_date
                .unwrap_or_else(|| Local::now().date_naive());
            info!(
                %start,
                hours = config.demo.hours,
                seed = config.demo.seed,
                "using synthetic demo dataset"
            );
            Ok(synthetic_readings(start, config.demo.hours, config.demo.seed))
        }
    }
}

fn write_exports(opts: &CliOptions, run: &AuditRun, site_name: &str) -> Result<(), AppError> {
    let daily = run.kpis.as_ref().map(|k| k.daily.as_slice()).unwrap_or_default();
    let hourly = run
        .kpis
        .as_ref()
        .map(|k| k.hourly_profile.as_slice())
        .unwrap_or_default();

    if let Some(path) = &opts.daily_out {
        export_daily_csv(daily, path)?;
    }
    if let Some(path) = &opts.hourly_out {
        export_hourly_csv(hourly, path)?;
    }
    if let Some(path) = &opts.json_out {
        export_json(run, path)?;
    }
    if let Some(path) = &opts.report_out {
        let target = report_target(path, site_name);
        export_report_text(&run.report, &target)?;
    }
    Ok(())
}

/// Resolves `--report-out`: a directory gets a file named after the site.
fn report_target(path: &Path, site_name: &str) -> PathBuf {
    if path.is_dir() {
        path.join(format!("{}.txt", report_file_stem(site_name)))
    } else {
        path.to_path_buf()
    }
}

#[cfg(feature = "api")]
fn serve(run: AuditRun, port: u16) -> Result<(), AppError> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let state = Arc::new(energy_audit::api::AppState { run });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new().map_err(|source| AppError::Io {
        context: "failed to create tokio runtime".to_string(),
        source,
    })?;
    rt.block_on(energy_audit::api::serve(state, addr))
        .map_err(|source| AppError::Io {
            context: format!("API server on {addr}"),
            source,
        })
}
