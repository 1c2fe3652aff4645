use clap::{Parser, Subcommand};
use std::path::PathBuf;
use sunny16::catalog::StopIncrement;
use sunny16::{config, form, output, page, table};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exposure inputs, named like the calculator form fields.
#[derive(clap::Args, Clone)]
struct ExposureArgs {
    /// Aperture f-number, e.g. 16 or 5.6
    #[arg(long)]
    aperture: Option<String>,

    /// Shutter speed, e.g. 1/125 or 0.5
    #[arg(long)]
    shutter: Option<String>,

    /// ISO speed
    #[arg(long)]
    iso: Option<String>,

    /// Light level as EV at ISO 100 (16 snow/sand .. 11 open shade)
    #[arg(long)]
    ev: Option<String>,

    /// Keep the aperture fixed
    #[arg(long)]
    lock_aperture: bool,

    /// Keep the shutter speed fixed
    #[arg(long)]
    lock_shutter: bool,

    /// Keep the ISO fixed
    #[arg(long)]
    lock_iso: bool,

    /// Stop increment: full or third. With full, values between full stops
    /// fall back to the configured defaults
    #[arg(long)]
    stops: Option<StopIncrement>,
}

impl ExposureArgs {
    /// The arguments as form field pairs.
    fn fields(&self) -> Vec<(&str, &str)> {
        let mut fields = Vec::new();
        let values = [
            (form::APERTURE, &self.aperture),
            (form::SHUTTER_SPEED, &self.shutter),
            (form::ISO, &self.iso),
            (form::EV, &self.ev),
        ];
        for (name, value) in values {
            if let Some(value) = value {
                fields.push((name, value.as_str()));
            }
        }
        let locks = [
            (form::LOCK_APERTURE, self.lock_aperture),
            (form::LOCK_SHUTTER_SPEED, self.lock_shutter),
            (form::LOCK_ISO, self.lock_iso),
        ];
        for (name, locked) in locks {
            if locked {
                fields.push((name, "on"));
            }
        }
        // Flags are explicit input, so only narrow to full stops on request.
        let stops = self.stops.unwrap_or(StopIncrement::Third);
        fields.push((form::STOP_INCREMENT, stops.as_str()));
        fields
    }

    fn any_locked(&self) -> bool {
        self.lock_aperture || self.lock_shutter || self.lock_iso
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "sunny16")]
#[command(about = "Sunny 16 exposure calculator")]
#[command(long_about = "\
Sunny 16 exposure calculator

Lock two of aperture, shutter speed and ISO, pick the light, and the third
value is calculated and snapped to the nearest standard stop.

Light conditions (EV at ISO 100):
  16  Snow/Sand
  15  Sunny
  14  Slight Overcast
  13  Overcast
  12  Heavy Overcast
  11  Open Shade/Sunset

Examples:
  sunny16 calc --lock-iso --iso 400 --lock-shutter --shutter 1/250 --ev 14
  sunny16 table --aperture 8
  sunny16 render --lock-iso --lock-aperture --output calculator.html

Set SUNNY16_LOG=debug to trace how values are snapped.
Run 'sunny16 gen-config' to generate a documented sunny16.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = "sunny16.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calculate the unlocked variable
    Calc {
        #[command(flatten)]
        exposure: ExposureArgs,

        /// Print the result record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the selectable values
    Options {
        /// Stop increment: full or third
        #[arg(long)]
        stops: Option<StopIncrement>,
    },
    /// Print the ISO needed per light condition and shutter speed
    Table {
        /// Fixed aperture f-number
        #[arg(long, default_value_t = 16.0)]
        aperture: f64,
    },
    /// Render the calculator as an HTML page
    Render {
        #[command(flatten)]
        exposure: ExposureArgs,

        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a stock sunny16.toml with all options documented
    GenConfig,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SUNNY16_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::GenConfig => print!("{}", config::stock_config_toml()),
        command => {
            let settings = config::load_config(&cli.config)?;
            run(command, &settings)?;
        }
    }

    Ok(())
}

fn run(
    command: Command,
    settings: &config::CalculatorConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = settings.catalog()?;
    let engine = settings.engine(&catalog);
    let default_increment = settings.form.stop_increment;

    match command {
        Command::Calc { exposure, json } => {
            let submission = form::submit(&engine, exposure.fields(), default_increment)?;
            if json {
                let record = submission.result.to_record();
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                output::print_result(&catalog, &submission.form.request, &submission.result);
            }
        }
        Command::Options { stops } => {
            let increment = stops.unwrap_or(default_increment);
            output::print_options(increment, &form::form_options(&catalog, increment));
        }
        Command::Table { aperture } => {
            let chart = table::iso_chart(&engine, aperture)?;
            output::print_chart(&chart);
        }
        Command::Render { exposure, output } => {
            let submission = form::submit(&engine, exposure.fields(), default_increment)?;
            let html = page::render_calculator_page(&submission, exposure.any_locked())
                .into_string();
            match output {
                Some(path) => {
                    std::fs::write(&path, html)?;
                    info!(path = %path.display(), "wrote calculator page");
                    println!("{}", path.display());
                }
                None => println!("{html}"),
            }
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}
