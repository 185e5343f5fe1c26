//! EPL Match Prediction CLI
//!
//! Pick a home team, an away team and a match day; get a home-win verdict.

use clap::{Parser, Subcommand};
use epl::{Config, Result};

#[derive(Parser)]
#[command(name = "epl")]
#[command(about = "Premier League home-win prediction from rolling team form", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Override the match data CSV path
    #[arg(long)]
    data: Option<String>,

    /// Override the model path (without .mpk)
    #[arg(long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show match data and model status
    Status,
    /// List the selectable home teams, away teams and match days
    Teams,
    /// Predict a single match
    Predict {
        /// Home team name
        home: String,
        /// Away team name
        away: String,
        /// Match day (weekday name or 0-6, Monday = 0)
        #[arg(long, default_value = "Saturday")]
        day: String,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Pick teams and day at a prompt, repeatedly
    Interactive,
    /// Model management commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show model information
    Info,
    /// Write a model artifact from fitted logistic coefficients
    Import {
        /// Weights in feature order: venue,opponent,day,gf_rolling,ga_rolling
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        weights: Vec<f32>,
        /// Intercept
        #[arg(long, allow_hyphen_values = true)]
        bias: f32,
    },
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let mut config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };
    if let Some(data) = cli.data {
        config.data.matches_path = data;
    }
    if let Some(model) = cli.model {
        config.data.model_path = model;
    }

    // Run command
    let result = match cli.command {
        Commands::Status => commands::status(&config),
        Commands::Teams => commands::teams(&config),
        Commands::Predict {
            home,
            away,
            day,
            format,
        } => commands::predict(&config, &home, &away, &day, format),
        Commands::Interactive => commands::interactive(&config),
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
            ModelCommands::Import { weights, bias } => {
                commands::model_import(&config, &weights, bias)
            }
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use std::io::{self, BufRead, Write};
    use std::path::Path;

    use epl::data::MatchTable;
    use epl::model::{BurnClassifier, LogisticModel};
    use epl::predict::inference::{
        format_prediction, prediction_csv_row, prediction_json, CSV_HEADER,
    };
    use epl::predict::{selection, AppState, Predictor};
    use epl::{EplError, FeatureVector, MatchDay};

    type MyBackend = burn::backend::NdArray<f32>;

    fn load_predictor(config: &Config) -> Result<Predictor<BurnClassifier<MyBackend>>> {
        AppState::initialize(config, |path| {
            BurnClassifier::<MyBackend>::load(Default::default(), path)
        })
        .into_predictor()
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("outputs")?;
        println!("Created data/ and outputs/ directories");

        println!("\nNext steps:");
        println!("  1. Put the processed match table at {}", config.data.matches_path);
        println!("  2. Put the trained model at {}", config.data.model_file().display());
        println!("  3. Run 'epl predict \"Arsenal\" \"Chelsea\" --day Saturday'");

        Ok(())
    }

    pub fn status(config: &Config) -> Result<()> {
        let table = MatchTable::load(&config.data.matches_path)?;
        let stats = table.get_stats();
        let model_file = config.data.model_file();

        println!("Match Data Status");
        println!("───────────────────────────────");
        println!("  Path:       {}", config.data.matches_path);
        println!("  Records:    {}", stats.record_count);
        println!("  Teams:      {}", stats.team_count);
        println!("  Opponents:  {}", stats.opponent_count);
        if let (Some(earliest), Some(latest)) = (stats.earliest_match, stats.latest_match) {
            println!("  Range:      {} to {}", earliest, latest);
        }
        println!(
            "  Model:      {} ({})",
            model_file.display(),
            if model_file.is_file() { "present" } else { "missing" }
        );

        Ok(())
    }

    pub fn teams(config: &Config) -> Result<()> {
        let table = MatchTable::load(&config.data.matches_path)?;

        println!("Home teams:");
        println!("{}", selection::numbered(&table.home_teams()));
        println!("\nAway teams:");
        println!("{}", selection::numbered(&table.away_teams()));
        println!("\nMatch days:");
        for day in MatchDay::ALL {
            println!("  {}  {}", day.code(), day);
        }

        Ok(())
    }

    pub fn predict(
        config: &Config,
        home: &str,
        away: &str,
        day: &str,
        format: OutputFormat,
    ) -> Result<()> {
        let day: MatchDay = day.parse()?;
        let predictor = load_predictor(config)?;
        let report = predictor.predict(home, away, day)?;

        match format {
            OutputFormat::Table => print!("{}", format_prediction(&report)),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&prediction_json(&report))
                    .map_err(|e| EplError::Io(e.into()))?;
                println!("{}", json);
            }
            OutputFormat::Csv => {
                println!("{}", CSV_HEADER);
                println!("{}", prediction_csv_row(&report));
            }
        }

        Ok(())
    }

    pub fn interactive(config: &Config) -> Result<()> {
        // Fail before prompting if anything is missing
        let predictor = load_predictor(config)?;
        let home_teams = predictor.table().home_teams();
        let away_teams = predictor.table().away_teams();

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        println!("Home teams:\n{}", selection::numbered(&home_teams));
        println!("\nAway teams:\n{}", selection::numbered(&away_teams));
        println!("\nEnter a number or a name, blank for the default, 'q' to quit.");

        loop {
            let default_home = selection::default_home(&home_teams);
            let Some(input) = prompt(&mut lines, "Home team", default_home)? else {
                break;
            };
            let Some(home) = selection::parse_choice(&input, &home_teams, default_home) else {
                println!("  Unknown home team: {}", input.trim());
                continue;
            };

            let default_away = selection::default_away(&away_teams, home);
            let Some(input) = prompt(&mut lines, "Away team", default_away)? else {
                break;
            };
            let Some(away) = selection::parse_choice(&input, &away_teams, default_away) else {
                println!("  Unknown away team: {}", input.trim());
                continue;
            };

            let default_day = MatchDay::default();
            let Some(input) = prompt(&mut lines, "Match day", Some(default_day.name()))? else {
                break;
            };

            let outcome = selection::parse_day(&input, default_day)
                .and_then(|day| predictor.predict(home, away, day));
            match outcome {
                Ok(report) => print!("{}", format_prediction(&report)),
                Err(e) if e.is_selection_error() => println!("  {}", e),
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Read one answer; `None` on end of input or quit
    fn prompt<B: BufRead>(
        lines: &mut io::Lines<B>,
        label: &str,
        default: Option<&str>,
    ) -> Result<Option<String>> {
        match default {
            Some(d) => print!("{} [{}]: ", label, d),
            None => print!("{}: ", label),
        }
        io::stdout().flush()?;

        match lines.next() {
            Some(line) => {
                let line = line?;
                if line.trim().eq_ignore_ascii_case("q") {
                    Ok(None)
                } else {
                    Ok(Some(line))
                }
            }
            None => Ok(None),
        }
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let model_file = config.data.model_file();
        if !model_file.is_file() {
            return Err(EplError::SystemFilesMissing {
                paths: vec![model_file],
            });
        }

        let device = Default::default();
        let model = LogisticModel::<MyBackend>::load(&device, Path::new(&config.data.model_path))?;
        let (weights, bias) = model.coefficients()?;

        println!("Model Information");
        println!("───────────────────────────────");
        println!("  Path:       {}", model_file.display());
        for (name, w) in FeatureVector::NAMES.iter().zip(&weights) {
            println!("  {:<11} {:+.4}", format!("{}:", name), w);
        }
        println!("  {:<11} {:+.4}", "intercept:", bias);

        Ok(())
    }

    pub fn model_import(config: &Config, weights: &[f32], bias: f32) -> Result<()> {
        let weights: [f32; FeatureVector::DIM] = weights.try_into().map_err(|_| {
            EplError::Model(format!(
                "expected {} weights ({}), got {}",
                FeatureVector::DIM,
                FeatureVector::NAMES.join(","),
                weights.len()
            ))
        })?;

        let path = Path::new(&config.data.model_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let device = Default::default();
        LogisticModel::<MyBackend>::from_coefficients(&device, weights, bias).save(path)?;
        println!("Model written to {}", config.data.model_file().display());

        Ok(())
    }
}
