use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fitlog_core::format::{format_date_short, measurements_to_csv};
use fitlog_core::profile::{activity_level_for, activity_levels};
use fitlog_core::validate::{
    validate_activity_level, validate_exercise, validate_lift, validate_measurement, validate_reps,
};
use fitlog_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(about = "Personal body measurement and strength training log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record, list and remove body measurements
    #[command(subcommand)]
    Measure(MeasureCommand),

    /// Record, list and edit strength exercises
    #[command(subcommand)]
    Exercise(ExerciseCommand),

    /// Write the whole dataset to stdout or a file
    Export {
        /// Output file (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },

    /// Replace collections with those found in an export document
    Import {
        /// Path to a JSON export document
        file: PathBuf,
    },

    /// Delete every measurement and exercise
    ClearAll,

    /// Derived metric calculators
    #[command(subcommand)]
    Calc(CalcCommand),

    /// Show or change the user profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Show or set the onboarding flag
    Intro {
        /// Mark the introduction as seen
        #[arg(long)]
        seen: bool,
    },

    /// Show when the next weigh-in reminder is due
    Remind,
}

#[derive(Subcommand)]
enum MeasureCommand {
    /// Record a measurement (merged into any existing record for the date)
    Add(MeasureArgs),

    /// Delete the measurement for a date
    Delete { date: String },

    /// List measurements, most recent first
    List {
        #[arg(long)]
        json: bool,
    },

    /// Delete every measurement
    Clear,
}

#[derive(Args)]
struct MeasureArgs {
    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<String>,
    /// Body weight in kg
    #[arg(long)]
    weight: Option<f64>,
    #[arg(long)]
    water_mass: Option<f64>,
    #[arg(long)]
    water_pct: Option<f64>,
    #[arg(long)]
    fat_mass: Option<f64>,
    #[arg(long)]
    fat_pct: Option<f64>,
    #[arg(long)]
    muscle_mass: Option<f64>,
    #[arg(long)]
    muscle_pct: Option<f64>,
    #[arg(long)]
    bone_mass: Option<f64>,
    #[arg(long)]
    bone_pct: Option<f64>,
    #[arg(long)]
    visceral_fat: Option<f64>,
    #[arg(long)]
    bmi: Option<f64>,
    #[arg(long)]
    score: Option<f64>,
    /// Circumferences in cm
    #[arg(long)]
    chest: Option<f64>,
    #[arg(long)]
    waist: Option<f64>,
    #[arg(long)]
    hips: Option<f64>,
    #[arg(long)]
    arms: Option<f64>,
    #[arg(long)]
    forearms: Option<f64>,
    #[arg(long)]
    thighs: Option<f64>,
    #[arg(long)]
    calves: Option<f64>,
    #[arg(long)]
    neck: Option<f64>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Record a set
    Add {
        #[arg(long)]
        name: String,
        /// Weight lifted in kg
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        reps: u32,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Explicit id (a UUID is generated otherwise)
        #[arg(long)]
        id: Option<String>,
    },

    /// Replace a recorded set; omitted fields keep their current value
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        reps: Option<u32>,
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a set by id
    Delete { id: String },

    /// List sets, optionally only those of one exercise
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CalcCommand {
    /// Estimated one-rep-max (Brzycki)
    OneRepMax {
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        reps: u32,
    },

    /// Total daily energy expenditure (Katch-McArdle)
    Tdee {
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        body_fat: f64,
        /// Activity multiplier (defaults to the profile's)
        #[arg(long)]
        activity: Option<f64>,
    },

    /// Recommended daily water intake
    Water {
        #[arg(long)]
        weight: f64,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    Show,
    Set {
        #[arg(long, value_enum)]
        gender: Option<GenderArg>,
        #[arg(long)]
        age: Option<u32>,
        /// Activity multiplier, e.g. 1.55
        #[arg(long)]
        activity: Option<f64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    fitlog_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let store = JsonDirStore::new(&data_dir);
    let mut ledger = FitnessLedger::open(store.clone())?;

    match cli.command {
        Commands::Measure(cmd) => cmd_measure(&mut ledger, &store, cmd),
        Commands::Exercise(cmd) => cmd_exercise(&mut ledger, cmd),
        Commands::Export { output, format } => cmd_export(&ledger, output, format, &config),
        Commands::Import { file } => cmd_import(&mut ledger, file),
        Commands::ClearAll => {
            ledger.clear_all_data()?;
            println!("✓ All data cleared");
            Ok(())
        }
        Commands::Calc(cmd) => cmd_calc(&store, cmd),
        Commands::Profile(cmd) => cmd_profile(store, cmd),
        Commands::Intro { seen } => {
            if seen {
                ledger.set_has_seen_intro(true)?;
            }
            println!("Intro seen: {}", ledger.has_seen_intro());
            Ok(())
        }
        Commands::Remind => {
            let now = chrono::Local::now();
            let reminder = fitlog_core::reminder::weight_reminder(&now, config.reminders.hour)?;
            println!("{}", reminder.title);
            println!("  {}", reminder.body);
            println!("  Due: {}", reminder.at.format("%d.%m.%Y, %H:%M"));
            Ok(())
        }
    }
}

fn parse_date_or_today(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_calendar_date(raw),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

// ============================================================================
// Measurements
// ============================================================================

fn cmd_measure(
    ledger: &mut FitnessLedger<JsonDirStore>,
    store: &JsonDirStore,
    cmd: MeasureCommand,
) -> Result<()> {
    match cmd {
        MeasureCommand::Add(args) => {
            let incoming = measurement_from_args(args)?;
            validate_measurement(&incoming)?;

            // Derive against the merged record so readings stored earlier in
            // the day count toward composition and TDEE
            let date = incoming.date;
            let mut merged = ledger
                .measurement_on(date)
                .cloned()
                .unwrap_or_else(|| Measurement::new(date));
            merged.merge_from(incoming);
            merged.fill_composition();
            if merged.tdee.is_none() {
                let profile = UserProfile::load(store)?;
                merged.tdee = merged.derive_tdee(profile.activity_level.value);
            }

            ledger.add_measurement(merged)?;
            if let Some(saved) = ledger.measurement_on(date) {
                println!("✓ Measurement saved for {}", format_date_short(date));
                println!("  {}", describe_measurement(saved));
            }
            Ok(())
        }
        MeasureCommand::Delete { date } => {
            let date = parse_calendar_date(&date)?;
            let existed = ledger.measurement_on(date).is_some();
            ledger.delete_measurement(date)?;
            if existed {
                println!("✓ Deleted measurement for {}", format_date_short(date));
            } else {
                println!("No measurement for {}", format_date_short(date));
            }
            Ok(())
        }
        MeasureCommand::List { json } => {
            let sorted = ledger.sorted_measurements();
            if json {
                println!("{}", serde_json::to_string_pretty(&sorted)?);
            } else if sorted.is_empty() {
                println!("No measurements recorded.");
            } else {
                for m in sorted {
                    println!("{}  {}", format_date_short(m.date), describe_measurement(m));
                }
            }
            Ok(())
        }
        MeasureCommand::Clear => {
            ledger.clear_measurements()?;
            println!("✓ Measurements cleared");
            Ok(())
        }
    }
}

fn measurement_from_args(args: MeasureArgs) -> Result<Measurement> {
    let date = parse_date_or_today(args.date.as_deref())?;
    let circumferences = Circumferences {
        chest: args.chest,
        waist: args.waist,
        hips: args.hips,
        arms: args.arms,
        forearms: args.forearms,
        thighs: args.thighs,
        calves: args.calves,
        neck: args.neck,
    };

    Ok(Measurement {
        weight: args.weight,
        water_mass: args.water_mass,
        water_percentage: args.water_pct,
        body_fat_mass: args.fat_mass,
        body_fat_percentage: args.fat_pct,
        muscle_mass: args.muscle_mass,
        muscle_percentage: args.muscle_pct,
        bone_mass: args.bone_mass,
        bone_percentage: args.bone_pct,
        visceral_fat: args.visceral_fat,
        bmi: args.bmi,
        total_score: args.score,
        notes: args.notes,
        measurements: (!circumferences.is_empty()).then_some(circumferences),
        ..Measurement::new(date)
    })
}

fn describe_measurement(m: &Measurement) -> String {
    let mut parts = Vec::new();
    let mut push = |label: &str, value: Option<f64>, unit: &str| {
        if let Some(v) = value {
            parts.push(format!("{} {:.1}{}", label, v, unit));
        }
    };

    push("weight", m.weight, " kg");
    push("fat", m.body_fat_percentage, "%");
    push("fat", m.body_fat_mass, " kg");
    push("muscle", m.muscle_percentage, "%");
    push("muscle", m.muscle_mass, " kg");
    push("water", m.water_percentage, "%");
    push("water", m.water_mass, " kg");
    push("bone", m.bone_percentage, "%");
    push("bone", m.bone_mass, " kg");
    push("visceral", m.visceral_fat, "");
    push("BMI", m.bmi, "");
    push("score", m.total_score, "");
    push("TDEE", m.tdee, " kcal");
    if let Some(c) = &m.measurements {
        for (part, value) in c.entries() {
            push(part.label(), value, " cm");
        }
    }

    if let Some(notes) = &m.notes {
        parts.push(format!("({})", notes));
    }
    parts.join(", ")
}

// ============================================================================
// Exercises
// ============================================================================

fn cmd_exercise(ledger: &mut FitnessLedger<JsonDirStore>, cmd: ExerciseCommand) -> Result<()> {
    match cmd {
        ExerciseCommand::Add {
            name,
            weight,
            reps,
            date,
            id,
        } => {
            validate_lift(&name, weight, reps)?;
            let date = parse_date_or_today(date.as_deref())?;
            let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let exercise = Exercise::new(id, name.trim(), date, weight, reps);
            validate_exercise(&exercise)?;

            let summary = format!(
                "✓ Logged {} {} kg × {} (1RM ≈ {} kg)\n  id: {}",
                exercise.name,
                exercise.weight,
                exercise.reps,
                exercise.calculated_one_rep_max,
                exercise.id
            );
            ledger.add_exercise(exercise)?;
            println!("{}", summary);
            Ok(())
        }
        ExerciseCommand::Update {
            id,
            name,
            weight,
            reps,
            date,
        } => {
            let current = ledger
                .exercise(&id)
                .cloned()
                .ok_or_else(|| Error::Other(format!("No exercise with id {}", id)))?;

            let date = match date {
                Some(raw) => parse_calendar_date(&raw)?,
                None => current.date,
            };
            let name = name.unwrap_or(current.name);
            let weight = weight.unwrap_or(current.weight);
            let reps = reps.unwrap_or(current.reps);
            validate_lift(&name, weight, reps)?;

            let replacement = Exercise::new(id, name.trim(), date, weight, reps);
            let summary = format!(
                "✓ Updated {} {} kg × {} (1RM ≈ {} kg)",
                replacement.name,
                replacement.weight,
                replacement.reps,
                replacement.calculated_one_rep_max
            );
            if !ledger.update_exercise(replacement)? {
                return Err(Error::Other("exercise disappeared during update".into()));
            }
            println!("{}", summary);
            Ok(())
        }
        ExerciseCommand::Delete { id } => {
            let existed = ledger.exercise(&id).is_some();
            ledger.delete_exercise(&id)?;
            if existed {
                println!("✓ Deleted exercise {}", id);
            } else {
                println!("No exercise with id {}", id);
            }
            Ok(())
        }
        ExerciseCommand::List { name, json } => {
            let listed: Vec<&Exercise> = match name {
                Some(name) => ledger.exercises_named(&name),
                None => {
                    let mut all: Vec<&Exercise> = ledger.exercises().iter().collect();
                    all.sort_by(|a, b| b.date.cmp(&a.date));
                    all
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&listed)?);
            } else if listed.is_empty() {
                println!("No exercises recorded.");
            } else {
                for e in listed {
                    println!(
                        "{}  {:<20} {:>6.1} kg × {:<2}  1RM {:>5} kg  [{}]",
                        format_date_short(e.date),
                        e.name,
                        e.weight,
                        e.reps,
                        e.calculated_one_rep_max,
                        e.id
                    );
                }
            }
            Ok(())
        }
    }
}

// ============================================================================
// Export / import
// ============================================================================

fn cmd_export(
    ledger: &FitnessLedger<JsonDirStore>,
    output: Option<PathBuf>,
    format: ExportFormat,
    config: &Config,
) -> Result<()> {
    let contents = match format {
        ExportFormat::Json if config.export.pretty => {
            serde_json::to_string_pretty(&ledger.export_document())?
        }
        ExportFormat::Json => ledger.export_data()?,
        ExportFormat::Csv => measurements_to_csv(ledger.sorted_measurements())?,
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, contents)?;
            println!("✓ Exported to {}", path.display());
        }
        None => println!("{}", contents),
    }
    Ok(())
}

fn cmd_import(ledger: &mut FitnessLedger<JsonDirStore>, file: PathBuf) -> Result<()> {
    let document = std::fs::read_to_string(&file)?;
    let report = ledger.import_report(&document)?;

    print_outcome("measurements", report.measurements);
    print_outcome("exercises", report.exercises);
    Ok(())
}

fn print_outcome(field: &str, outcome: FieldOutcome) {
    match outcome {
        FieldOutcome::Imported(count) => println!("✓ Imported {} {}", count, field),
        FieldOutcome::Skipped => println!("! Skipped {}: not a list of records", field),
        FieldOutcome::Absent => println!("  No {} in document", field),
    }
}

// ============================================================================
// Calculators and profile
// ============================================================================

fn cmd_calc(store: &JsonDirStore, cmd: CalcCommand) -> Result<()> {
    match cmd {
        CalcCommand::OneRepMax { weight, reps } => {
            validate_reps(reps)?;
            println!("{}", calculate_one_rep_max(weight, reps));
        }
        CalcCommand::Tdee {
            weight,
            body_fat,
            activity,
        } => {
            let input = Measurement {
                weight: Some(weight),
                body_fat_percentage: Some(body_fat),
                ..Measurement::new(chrono::Local::now().date_naive())
            };
            validate_measurement(&input)?;
            let activity = match activity {
                Some(value) => value,
                None => UserProfile::load(store)?.activity_level.value,
            };
            validate_activity_level(activity)?;
            println!("{}", calculate_tdee(weight, body_fat, activity));
        }
        CalcCommand::Water { weight } => {
            let input = Measurement {
                weight: Some(weight),
                ..Measurement::new(chrono::Local::now().date_naive())
            };
            validate_measurement(&input)?;
            println!("{}", calculate_water_intake(weight));
        }
    }
    Ok(())
}

fn cmd_profile(mut store: JsonDirStore, cmd: ProfileCommand) -> Result<()> {
    let profile = match cmd {
        ProfileCommand::Show => UserProfile::load(&store)?,
        ProfileCommand::Set {
            gender,
            age,
            activity,
        } => {
            let activity_level = match activity {
                Some(value) => {
                    validate_activity_level(value)?;
                    Some(activity_level_for(value).cloned().unwrap_or(ActivityLevel {
                        value,
                        label: "Custom".into(),
                    }))
                }
                None => None,
            };
            UserProfile::update(
                &mut store,
                ProfileUpdate {
                    gender: gender.map(Gender::from),
                    age,
                    activity_level,
                },
            )?
        }
    };

    println!("Gender:   {:?}", profile.gender);
    println!("Age:      {}", profile.age);
    println!(
        "Activity: {} ({})",
        profile.activity_level.value, profile.activity_level.label
    );
    if activity_level_for(profile.activity_level.value).is_none() {
        println!("  Presets:");
        for level in activity_levels() {
            println!("    {:<6} {}", level.value, level.label);
        }
    }
    Ok(())
}
