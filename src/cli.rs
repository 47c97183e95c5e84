use std::env;
use std::path::PathBuf;

use energy_audit::config::AuditConfig;

/// Default port of the read-only report API.
#[cfg(feature = "api")]
pub const DEFAULT_PORT: u16 = 3000;

/// Parsed command-line options.
#[derive(Debug, Default)]
pub struct CliOptions {
    /// CSV input; `-` reads standard input. `None` runs the demo dataset.
    pub input: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub name: Option<String>,
    pub area_m2: Option<f64>,
    pub period: Option<String>,
    pub seed: Option<u64>,
    pub delimiter: Option<String>,
    pub daily_out: Option<PathBuf>,
    pub hourly_out: Option<PathBuf>,
    pub json_out: Option<PathBuf>,
    pub report_out: Option<PathBuf>,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: Option<u16>,
}

impl CliOptions {
    /// Applies command-line overrides on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut AuditConfig) {
        if let Some(name) = &self.name {
            config.site.name = name.clone();
        }
        if let Some(area) = self.area_m2 {
            config.site.area_m2 = Some(area);
        }
        if let Some(period) = &self.period {
            config.site.period = Some(period.clone());
        }
        if let Some(seed) = self.seed {
            config.demo.seed = seed;
        }
        if let Some(delimiter) = &self.delimiter {
            config.input.delimiter = delimiter.clone();
        }
    }
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<(), String> {
    if slot.replace(value).is_some() {
        return Err(format!("{flag} provided more than once"));
    }
    Ok(())
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();
    let mut demo = false;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--input" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --input (expected a CSV path or `-`)")?;
                set_once(&mut opts.input, PathBuf::from(path), flag)?;
            }
            "--demo" => {
                if demo {
                    return Err("--demo provided more than once".to_string());
                }
                demo = true;
            }
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                set_once(&mut opts.config, PathBuf::from(path), flag)?;
            }
            "--name" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --name (expected a site name)")?;
                set_once(&mut opts.name, name.to_string(), flag)?;
            }
            "--area" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --area (expected m²)")?;
                let area = raw
                    .parse::<f64>()
                    .map_err(|_| format!("--area value \"{raw}\" is not a number"))?;
                set_once(&mut opts.area_m2, area, flag)?;
            }
            "--period" => {
                i += 1;
                let period = args.next_or_err(i, "missing value for --period (expected a label)")?;
                set_once(&mut opts.period, period.to_string(), flag)?;
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                set_once(&mut opts.seed, seed, flag)?;
            }
            "--delimiter" => {
                i += 1;
                let d = args.next_or_err(i, "missing value for --delimiter (expected auto, `,` or `;`)")?;
                set_once(&mut opts.delimiter, d.to_string(), flag)?;
            }
            "--daily-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --daily-out (expected a file path)")?;
                set_once(&mut opts.daily_out, PathBuf::from(path), flag)?;
            }
            "--hourly-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --hourly-out (expected a file path)")?;
                set_once(&mut opts.hourly_out, PathBuf::from(path), flag)?;
            }
            "--json-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --json-out (expected a file path)")?;
                set_once(&mut opts.json_out, PathBuf::from(path), flag)?;
            }
            "--report-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --report-out (expected a file or directory)")?;
                set_once(&mut opts.report_out, PathBuf::from(path), flag)?;
            }
            #[cfg(feature = "api")]
            "--serve" => {
                if opts.serve {
                    return Err("--serve provided more than once".to_string());
                }
                opts.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                let port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                set_once(&mut opts.port, port, flag)?;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if demo && opts.input.is_some() {
        return Err(
            "arguments `--input` and `--demo` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("energy-audit - energy KPIs and recommendations from a consumption CSV");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  energy-audit [--input <csv> | --demo] [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --input <path>        CSV with datetime,load_kwh[,pv_kwh][,price_eur_per_kwh] (`-` = stdin)");
    eprintln!("  --demo                Analyse the built-in 48-hour synthetic dataset (default)");
    eprintln!("  --config <path>       Load settings from a TOML file");
    eprintln!("  --name <name>         Site name for the report");
    eprintln!("  --area <m2>           Floor area, enables EUI");
    eprintln!("  --period <label>      Reporting period label");
    eprintln!("  --seed <u64>          Demo dataset seed");
    eprintln!("  --delimiter <d>       CSV separator: auto, `,` or `;`");
    eprintln!("  --daily-out <path>    Write the daily rollup CSV");
    eprintln!("  --hourly-out <path>   Write the hourly profile CSV");
    eprintln!("  --json-out <path>     Write KPIs, recommendations and report as JSON");
    eprintln!("  --report-out <path>   Write the text report (file or directory)");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve               Serve the report over HTTP after the analysis");
        eprintln!("  --port <u16>          API server port (default: {DEFAULT_PORT})");
    }
    eprintln!("  --help                Show this help message");
    eprintln!();
    eprintln!("Logging is controlled with RUST_LOG (default: info).");
}
