use clap::Parser;
use load_planner::catalog::{VehicleCatalog, VehicleSelection};
use load_planner::input::{
    self, InputOptions, LengthUnit, LoadRecord, StackMode, StackValue, WeightUnit,
};
use load_planner::planner::Planner;
use load_planner::report::PlanReport;
use load_planner::types::Load;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "load_planner",
    about = "Plans cargo loads into trucks and containers"
)]
struct Cli {
    /// JSON file with an array of load records
    #[arg(long)]
    loads: Option<String>,

    /// Inline load as ID:NAME:LxWxH:KG[:nostack] (repeatable)
    #[arg(long = "load")]
    load: Vec<String>,

    /// Trailer type to use (repeatable)
    #[arg(long = "trailer")]
    trailers: Vec<String>,

    /// Container type to use (repeatable)
    #[arg(long = "container")]
    containers: Vec<String>,

    /// JSON file replacing the built-in vehicle catalog
    #[arg(long)]
    catalog: Option<String>,

    /// Unit of load dimensions: mm, cm, m, or in
    #[arg(long, default_value = "mm")]
    length_unit: LengthUnit,

    /// Unit of load weights: kg, t, or lb
    #[arg(long, default_value = "kg")]
    weight_unit: WeightUnit,

    /// Stackability: sheet (per record), yes, or no
    #[arg(long, default_value = "sheet")]
    stack_mode: StackMode,

    /// Show ASCII layout of each layer
    #[arg(long)]
    layout: bool,

    /// Print the plan as JSON
    #[arg(long)]
    json: bool,

    /// Log every placement to stderr
    #[arg(long)]
    verbose: bool,
}

fn parse_dimensions(s: &str) -> Result<(f64, f64, f64), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 3 {
        return Err(format!("invalid dimensions '{}', expected LxWxH", s));
    }
    let parse = |part: &str, what: &str| {
        part.parse::<f64>().map_err(|_| format!("invalid {} in '{}'", what, s))
    };
    Ok((
        parse(parts[0], "length")?,
        parse(parts[1], "width")?,
        parse(parts[2], "height")?,
    ))
}

fn parse_load(s: &str) -> Result<LoadRecord, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 4 && parts.len() != 5 {
        return Err(format!("invalid load '{}', expected ID:NAME:LxWxH:KG[:nostack]", s));
    }
    let (length, width, height) = parse_dimensions(parts[2])?;
    let weight = parts[3]
        .parse::<f64>()
        .map_err(|_| format!("invalid weight in '{}'", s))?;
    let stackable = match parts.get(4) {
        None => None,
        Some(&"nostack") => Some(StackValue::Flag(false)),
        Some(flag) => return Err(format!("unknown flag '{}' in '{}', expected nostack", flag, s)),
    };
    Ok(LoadRecord {
        id: parts[0].to_string(),
        name: parts[1].to_string(),
        length,
        width,
        height,
        weight,
        stackable,
        priority: None,
    })
}

fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))
}

fn collect_loads(cli: &Cli, options: &InputOptions) -> Result<Vec<Load>, String> {
    let mut loads = match &cli.loads {
        Some(path) => {
            input::loads_from_json(&read_file(path)?, options).map_err(|e| e.to_string())?
        }
        None => Vec::new(),
    };
    for s in &cli.load {
        let record = parse_load(s)?;
        loads.push(record.into_load(options).map_err(|e| e.to_string())?);
    }
    Ok(loads)
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let options = InputOptions {
        length_unit: cli.length_unit,
        weight_unit: cli.weight_unit,
        stack_mode: cli.stack_mode,
    };

    let loads = collect_loads(&cli, &options).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let catalog = match &cli.catalog {
        Some(path) => read_file(path)
            .and_then(|json| VehicleCatalog::from_json(&json).map_err(|e| e.to_string())),
        None => Ok(VehicleCatalog::default()),
    }
    .unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let mut selection = VehicleSelection {
        trailers: cli.trailers.clone(),
        containers: cli.containers.clone(),
    };
    if selection.is_empty() {
        selection = catalog.select_all();
    }

    let result = Planner::new(&catalog, &selection)
        .and_then(|planner| planner.plan(&loads))
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let report = PlanReport::from(&result);

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", report.to_text(cli.layout));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_load() {
        let record = parse_load("7:Press:4000x2000x2000.5:8000:nostack").unwrap();
        assert_eq!(record.id, "7");
        assert_eq!(record.name, "Press");
        assert_eq!(record.height, 2000.5);
        assert_eq!(record.weight, 8000.0);
        assert_eq!(record.stackable, Some(StackValue::Flag(false)));

        let plain = parse_load("A:Boxes:1200x800x1000:300").unwrap();
        assert_eq!(plain.stackable, None);
    }

    #[test]
    fn test_parse_load_errors() {
        assert!(parse_load("A:Boxes:1200x800:300").is_err());
        assert!(parse_load("A:Boxes:1200x800x1000").is_err());
        assert!(parse_load("A:Boxes:1200x800x1000:heavy").is_err());
        assert!(parse_load("A:Boxes:1200x800x1000:300:fragile").is_err());
    }
}
