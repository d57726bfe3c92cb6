//! Scan a gateway and build a sensor assignment from the readings it reports
//!
//! ```text
//! ecowitt-scan <gateway | --file payload.json> [INDEX=SENSOR ...] [SENSOR:NAME ...] [--save]
//! ```
//!
//! Without selections the readings are listed with their index. `3=1` puts
//! reading 3 into sensor 1, `1:Greenhouse` names sensor 1. The resulting
//! settings are printed, or written to the settings file with `--save`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use ecowitt_config::{config_path, Settings};
use ecowitt_core::display::NOT_AVAILABLE;
use ecowitt_core::{AssignmentBuilder, RawReading};
use ecowitt_ingest::{FixtureSource, GatewayClient, RefreshEngine, TelemetrySource};
use ecowitt_obs::LogFormat;

#[derive(Debug, Default, PartialEq)]
struct ScanArgs {
    gateway: Option<String>,
    file: Option<PathBuf>,
    selections: BTreeMap<usize, u32>,
    names: BTreeMap<u32, String>,
    save: bool,
}

const USAGE: &str =
    "usage: ecowitt-scan <gateway | --file payload.json> [INDEX=SENSOR ...] [SENSOR:NAME ...] [--save]";

fn parse_args<I>(args: I) -> Result<ScanArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = ScanArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--save" {
            parsed.save = true;
        } else if arg == "--file" {
            let path = args.next().context("--file needs a path")?;
            parsed.file = Some(PathBuf::from(path));
        } else if let Some((sensor, name)) = arg
            .split_once(':')
            .and_then(|(n, name)| n.trim().parse::<u32>().ok().map(|n| (n, name)))
        {
            // names may contain '=', so this is checked before selections
            parsed.names.insert(sensor, name.trim().to_string());
        } else if let Some((index, sensor)) = arg.split_once('=') {
            let index = index
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid reading index in {arg:?}"))?;
            let sensor = sensor
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid sensor number in {arg:?}"))?;
            parsed.selections.insert(index, sensor);
        } else if parsed.gateway.is_none() && !arg.starts_with('-') {
            parsed.gateway = Some(arg);
        } else {
            bail!("Unexpected argument {arg:?}\n{USAGE}");
        }
    }
    if parsed.gateway.is_none() == parsed.file.is_none() {
        bail!("Give either a gateway address or --file\n{USAGE}");
    }
    Ok(parsed)
}

fn print_readings(readings: &[RawReading]) {
    println!("{:>3}  {:<12} {:<28} {:<14} Source", "#", "Id", "Label", "Value");
    for (index, reading) in readings.iter().enumerate() {
        let value = if reading.unit.is_empty() || reading.original.contains(&reading.unit) {
            reading.original.clone()
        } else {
            format!("{} {}", reading.original, reading.unit)
        };
        let source = if reading.source_label.is_empty() {
            NOT_AVAILABLE
        } else {
            reading.source_label.as_str()
        };
        println!(
            "{:>3}  {:<12} {:<28} {:<14} {}",
            index, reading.id, reading.label, value, source
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    ecowitt_obs::init("ecowitt-scan", LogFormat::Pretty);
    let args = parse_args(std::env::args().skip(1))?;

    let mut settings = Settings::load()?;

    let source: Box<dyn TelemetrySource> = match (&args.gateway, &args.file) {
        (Some(address), _) => {
            settings.gateway_address = address.clone();
            Box::new(GatewayClient::new(address, settings.fetch_timeout())?)
        }
        (None, Some(file)) => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let payload = serde_json::from_str(&text).context("Payload is not valid JSON")?;
            Box::new(FixtureSource::payloads([payload]))
        }
        (None, None) => bail!("{USAGE}"),
    };

    let mut engine = RefreshEngine::new(source);
    let readings = engine.scan().await.context("Scan failed")?;
    if readings.is_empty() {
        bail!("Gateway reported no recognized readings");
    }
    print_readings(&readings);

    if args.selections.is_empty() {
        return Ok(());
    }

    let mut builder = AssignmentBuilder::new();
    for (&index, &sensor) in &args.selections {
        let reading = readings
            .get(index)
            .with_context(|| format!("No reading #{index}"))?;
        builder.assign(reading, sensor);
    }
    for (&sensor, name) in &args.names {
        builder.name(sensor, name.clone());
    }
    settings.assignment = builder.build()?;

    if args.save {
        let path = config_path();
        settings.save_to(&path)?;
        tracing::info!(path = %path.display(), "Settings saved");
    } else {
        println!();
        print!("{}", settings.to_toml()?);
    }
    Ok(())
}
