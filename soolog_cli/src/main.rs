use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use soolog_core::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "soolog")]
#[command(about = "Personal drinking log and statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a new drink record
    Log {
        /// Category (soju, beer, somaek, wine, fruit_soju, liquor, highball, etc)
        kind: String,

        /// Brand preset title (for categories with presets)
        #[arg(long)]
        preset: Option<String>,

        /// Alcohol percent (falls back to preset/category default)
        #[arg(long)]
        percent: Option<f64>,

        /// Free-form brand or drink name
        #[arg(long)]
        brand: Option<String>,

        /// Number of units consumed (e.g. 1.5)
        #[arg(long)]
        units: f64,

        /// Serving-size preset title (bottle, glass, ...)
        #[arg(long)]
        unit: Option<String>,

        /// Custom serving-size name (with --unit-ml)
        #[arg(long, conflicts_with = "unit")]
        unit_name: Option<String>,

        /// Custom serving-size volume in mL (with --unit-name)
        #[arg(long, conflicts_with = "unit")]
        unit_ml: Option<f64>,

        /// Companion name, repeatable; must exist in the people roster
        #[arg(long = "with")]
        with: Vec<String>,

        /// How drunk you felt (fine, light, moderate, heavy, wasted)
        #[arg(long)]
        feeling: Option<String>,

        /// Optional memo
        #[arg(long)]
        memo: Option<String>,

        /// Skip the health journal sync
        #[arg(long)]
        no_sync: bool,
    },

    /// Show the dashboard (streak, calendar, tolerance, best companion)
    Dashboard {
        /// Month to render, YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// List records, newest first
    History {
        /// Maximum number of records to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show one record in detail
    Show {
        /// Record id (a unique prefix is enough)
        id: String,
    },

    /// Delete a record
    Delete {
        /// Record id (a unique prefix is enough)
        id: String,
    },

    /// Correct a record's date and time
    Redate {
        /// Record id (a unique prefix is enough)
        id: String,

        /// New timestamp, RFC3339 or YYYY-MM-DD
        #[arg(long)]
        date: String,
    },

    /// Manage the companion roster
    People {
        #[command(subcommand)]
        action: PeopleAction,
    },

    /// Export the full history to CSV
    Export {
        /// Output path (defaults to soolog_history.csv in the data dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PeopleAction {
    /// Add a person
    Add { name: String },
    /// List everyone with their record counts
    List,
    /// Remove a person (their records stay, without them)
    Remove { name: String },
    /// Per-person summary
    Show { name: String },
}

fn main() -> Result<()> {
    soolog_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Log {
            kind,
            preset,
            percent,
            brand,
            units,
            unit,
            unit_name,
            unit_ml,
            with,
            feeling,
            memo,
            no_sync,
        } => cmd_log(
            data_dir, &config, &kind, preset, percent, brand, units, unit, unit_name, unit_ml,
            with, feeling, memo, no_sync,
        ),
        Commands::Dashboard { month } => cmd_dashboard(data_dir, month),
        Commands::History { limit } => cmd_history(data_dir, limit),
        Commands::Show { id } => cmd_show(data_dir, &id),
        Commands::Delete { id } => cmd_delete(data_dir, &id),
        Commands::Redate { id, date } => cmd_redate(data_dir, &config, &id, &date),
        Commands::People { action } => cmd_people(data_dir, action),
        Commands::Export { out } => cmd_export(data_dir, out),
    }
}

fn store_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("store.json")
}

fn journal_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("health.jsonl")
}

#[allow(clippy::too_many_arguments)]
fn cmd_log(
    data_dir: PathBuf,
    config: &Config,
    kind: &str,
    preset: Option<String>,
    percent: Option<f64>,
    brand: Option<String>,
    units: f64,
    unit: Option<String>,
    unit_name: Option<String>,
    unit_ml: Option<f64>,
    with: Vec<String>,
    feeling: Option<String>,
    memo: Option<String>,
    no_sync: bool,
) -> Result<()> {
    let catalog = default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Other("Invalid catalog".into()));
    }

    let kind = AlcoholKind::parse(kind).ok_or_else(|| {
        Error::Other(format!(
            "unknown kind '{}' (soju, beer, somaek, wine, fruit_soju, liquor, highball, etc)",
            kind
        ))
    })?;

    let mut store = RecordStore::open(store_path(&data_dir))?;
    let mut form = EntryForm::new(catalog, kind);

    // Step 1: brand and strength
    if let Some(ref title) = preset {
        form.select_brand_preset(title)?;
    } else if catalog.brand_presets(kind).is_some() {
        // No tile named, take the catch-all one so a manual percent applies
        form.select_brand_preset("other")?;
    }
    if let Some(p) = percent {
        form.set_percent(p)?;
    }
    if brand.is_some() {
        form.set_brand(brand);
    }

    // Step 2: unit and volume
    match (unit, unit_name, unit_ml) {
        (Some(ref title), _, _) => form.select_unit_preset(title)?,
        (None, Some(ref name), Some(ml)) => form.set_custom_unit(name, ml)?,
        (None, None, Some(ml)) => form.set_custom_unit("other", ml)?,
        (None, Some(_), None) => {
            return Err(Error::Other("--unit-name requires --unit-ml".into()));
        }
        (None, None, None) => {} // keep the category's default serving
    }
    form.set_units(units)?;

    // Step 3: companions and feeling
    for name in &with {
        let person = store.person_by_name(name).ok_or_else(|| {
            Error::Other(format!(
                "unknown person '{}' - add them first with `soolog people add`",
                name
            ))
        })?;
        form.toggle_companion(person.id);
    }
    if let Some(ref s) = feeling {
        let parsed = Feeling::parse(s).ok_or_else(|| {
            Error::Other(format!(
                "unknown feeling '{}' (fine, light, moderate, heavy, wasted)",
                s
            ))
        })?;
        form.set_feeling(Some(parsed));
    }
    form.set_memo(memo);

    let record = form.save(Utc::now())?;
    let record_id = record.id;
    let record_units = record.units;
    let record_time = record.timestamp;

    display_record_summary(&record);

    store.insert_record(record);
    store.save()?;

    // The record is saved either way; a failed sync only skips the flag
    if !no_sync && config.health.enabled {
        let mut bridge = JournalHealthBridge::new(journal_path(&data_dir));
        if sync_units(&mut bridge, record_units, record_time) {
            store.mark_health_synced(record_id)?;
            store.save()?;
            println!("  Health journal updated.");
        } else {
            println!("  Note: health journal not updated (record saved anyway).");
        }
    }

    println!("\n✓ Record saved! ({})", short_id(record_id));
    Ok(())
}

fn cmd_dashboard(data_dir: PathBuf, month: Option<String>) -> Result<()> {
    let store = RecordStore::open(store_path(&data_dir))?;
    let records = store.records_sorted(SortOrder::NewestFirst);
    let people = store.people_sorted();
    let now = Utc::now();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  MY LIVER                               │");
    println!("╰─────────────────────────────────────────╯");

    // Sobriety streak
    let streak = stats::sobriety_streak_days(&records, now);
    if records.is_empty() {
        println!("\n  No records yet - start logging to see your stats.");
    } else {
        println!("\n  {} day(s) since your last drink 🍃", streak);
    }

    // Calendar
    let (year, month) = match month {
        Some(ref s) => parse_month(s)
            .ok_or_else(|| Error::Other(format!("invalid month '{}', expected YYYY-MM", s)))?,
        None => (now.year(), now.month()),
    };
    let days = stats::drinking_days(&records, year, month);
    println!();
    render_calendar(year, month, &days);

    // Tolerance estimate
    println!();
    match stats::estimated_bottle_capacity(&records) {
        Some(bottles) => {
            let band = ToleranceBand::from_bottles(bottles);
            println!("  Estimated capacity: {:.1} bottle(s) of soju", bottles);
            println!("  {}", band.message());
        }
        None => {
            println!("  Not enough data for a capacity estimate.");
            println!("  Log how drunk you felt to unlock this.");
        }
    }

    // Best companion
    println!();
    match stats::best_companion(&records, &people) {
        Some((person, count)) => {
            println!("  Best drinking companion: {} ({} times) 👑", person.name, count);
        }
        None => println!("  No shared drinks logged yet."),
    }

    // Latest record
    if let Some(latest) = records.first() {
        println!();
        println!("  Latest: {}", history_line(latest));
    }

    println!();
    Ok(())
}

fn cmd_history(data_dir: PathBuf, limit: usize) -> Result<()> {
    let store = RecordStore::open(store_path(&data_dir))?;
    let records = store.records_sorted(SortOrder::NewestFirst);

    if records.is_empty() {
        println!("No records yet. Log your first drink with `soolog log`.");
        return Ok(());
    }

    for record in records.iter().take(limit) {
        println!("{}  {}", short_id(record.id), history_line(record));
    }
    if records.len() > limit {
        println!("... and {} more (use --limit)", records.len() - limit);
    }
    Ok(())
}

fn cmd_show(data_dir: PathBuf, id: &str) -> Result<()> {
    let store = RecordStore::open(store_path(&data_dir))?;
    let record = store.record_by_id_prefix(id)?.clone();

    println!("\n  {}", record.kind.label());
    println!("  {}", record.timestamp.format("%Y-%m-%d %H:%M UTC"));
    if let Some(feeling) = record.feeling {
        println!("  Felt: {}", feeling.label());
    }
    println!();
    println!("  Total alcohol:   {:.1} mL", record.total_pure_alcohol());
    println!(
        "  Amount:          {} {}",
        format_units(record.units),
        record.unit_name
    );
    println!("  Strength:        {:.1} %", record.alcohol_percent);
    println!("  Unit volume:     {:.0} mL", record.unit_ml);
    println!("  Alcohol / unit:  {:.1} mL", record.alcohol_per_unit);
    println!(
        "  Brand:           {}",
        record.brand.as_deref().unwrap_or("-")
    );

    let companions: Vec<String> = record
        .companions
        .iter()
        .filter_map(|id| store.person(*id))
        .map(|p| p.name.clone())
        .collect();
    if !companions.is_empty() {
        println!("  With:            {}", companions.join(", "));
    }
    if let Some(ref memo) = record.memo {
        println!("  Memo:            {}", memo);
    }
    println!(
        "  Health journal:  {}",
        if record.health_synced {
            "synced"
        } else {
            "not synced"
        }
    );
    println!();
    Ok(())
}

fn cmd_delete(data_dir: PathBuf, id: &str) -> Result<()> {
    let mut store = RecordStore::open(store_path(&data_dir))?;
    let record_id = store.record_by_id_prefix(id)?.id;
    store.remove_record(record_id);
    store.save()?;
    println!("✓ Record {} deleted", short_id(record_id));
    Ok(())
}

fn cmd_redate(data_dir: PathBuf, config: &Config, id: &str, date: &str) -> Result<()> {
    let timestamp = parse_timestamp(date)
        .ok_or_else(|| Error::Other(format!("invalid date '{}', expected RFC3339 or YYYY-MM-DD", date)))?;

    let mut store = RecordStore::open(store_path(&data_dir))?;
    let record = store.record_by_id_prefix(id)?.clone();
    store.set_timestamp(record.id, timestamp)?;
    store.save()?;
    println!("✓ Record {} moved to {}", short_id(record.id), timestamp.format("%Y-%m-%d %H:%M UTC"));

    // A synced record gets a fresh journal entry at the corrected date; the
    // old entry has no id we could remove.
    if config.health.enabled && record.health_synced && record.units > 0.0 {
        let mut bridge = JournalHealthBridge::new(journal_path(&data_dir));
        if sync_units(&mut bridge, record.units, timestamp) {
            println!("  Health journal updated with the new date.");
        } else {
            println!("  Note: health journal not updated.");
        }
    }
    Ok(())
}

fn cmd_people(data_dir: PathBuf, action: PeopleAction) -> Result<()> {
    let mut store = RecordStore::open(store_path(&data_dir))?;

    match action {
        PeopleAction::Add { name } => {
            let person = Person::new(name.trim());
            let display = person.name.clone();
            store.insert_person(person)?;
            store.save()?;
            println!("✓ Added {}", display);
        }
        PeopleAction::List => {
            let people = store.people_sorted();
            if people.is_empty() {
                println!("No people yet. Add your drinking companions with `soolog people add`.");
                return Ok(());
            }
            for person in people {
                let count = store.records_with(person.id).len();
                println!("{}  ({} record(s) together)", person.name, count);
            }
        }
        PeopleAction::Remove { name } => {
            let id = store
                .person_by_name(&name)
                .map(|p| p.id)
                .ok_or_else(|| Error::Other(format!("no person named '{}'", name)))?;
            store.remove_person(id);
            store.save()?;
            println!("✓ Removed {}", name);
        }
        PeopleAction::Show { name } => {
            let person = store
                .person_by_name(&name)
                .cloned()
                .ok_or_else(|| Error::Other(format!("no person named '{}'", name)))?;
            let records = store.records_with(person.id);

            println!("\n  {}", person.name);
            println!("  Records together: {}", records.len());
            match stats::favourite_kind(&records) {
                Some(kind) => println!("  Favourite drink:  {}", kind.label()),
                None => println!("  Favourite drink:  -"),
            }
            match records.first() {
                Some(latest) => println!(
                    "  Last met:         {}",
                    latest.timestamp.format("%Y-%m-%d")
                ),
                None => println!("  Last met:         never"),
            }
            println!();
        }
    }
    Ok(())
}

fn cmd_export(data_dir: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let store = RecordStore::open(store_path(&data_dir))?;
    let records = store.records_sorted(SortOrder::NewestFirst);
    let people = store.people_sorted();

    let out = out.unwrap_or_else(|| data_dir.join("soolog_history.csv"));
    let count = export_csv(&records, &people, &out)?;

    println!("✓ Exported {} record(s)", count);
    println!("  CSV: {}", out.display());
    Ok(())
}

// ============================================================================
// Display helpers
// ============================================================================

fn short_id(id: uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn format_units(units: f64) -> String {
    if units.fract() == 0.0 {
        format!("{:.0}", units)
    } else {
        format!("{:.1}", units)
    }
}

fn history_line(record: &DrinkRecord) -> String {
    let name = record
        .brand
        .clone()
        .unwrap_or_else(|| record.kind.label().to_string());
    let sync = if record.health_synced { "✓" } else { " " };
    format!(
        "{}  {:<10} {} {} {}  {}",
        record.timestamp.format("%Y-%m-%d %H:%M"),
        record.kind.label(),
        name,
        format_units(record.units),
        record.unit_name,
        sync
    )
}

fn display_record_summary(record: &DrinkRecord) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} ", record.kind.label().to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    if let Some(ref brand) = record.brand {
        println!("  {}", brand);
    }
    println!(
        "  {} {} at {:.1}%",
        format_units(record.units),
        record.unit_name,
        record.alcohol_percent
    );
    println!("  Total pure alcohol: {:.1} mL", record.total_pure_alcohol());
    if let Some(feeling) = record.feeling {
        println!("  Felt: {}", feeling.label());
    }
}

fn parse_month(s: &str) -> Option<(i32, u32)> {
    let (year, month) = s.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if (1..=12).contains(&month) {
        Some((year, month))
    } else {
        None
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Utc.from_local_datetime(&date.and_hms_opt(12, 0, 0)?).single()
}

fn render_calendar(year: i32, month: u32, drinking_days: &BTreeSet<u32>) {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return,
    };
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let day_count = match next_month {
        Some(next) => (next - first).num_days() as u32,
        None => return,
    };

    println!("  {:<4}-{:02}              (* = drinking day)", year, month);
    println!("  Su Mo Tu We Th Fr Sa");

    let leading = first.weekday().num_days_from_sunday();
    let mut line = String::from("  ");
    for _ in 0..leading {
        line.push_str("   ");
    }
    let mut weekday = leading;
    for day in 1..=day_count {
        if drinking_days.contains(&day) {
            line.push_str(&format!("{:>2}*", day));
        } else {
            line.push_str(&format!("{:>2} ", day));
        }
        weekday += 1;
        if weekday == 7 {
            println!("{}", line.trim_end());
            line = String::from("  ");
            weekday = 0;
        }
    }
    if line.trim() != "" {
        println!("{}", line.trim_end());
    }
}
