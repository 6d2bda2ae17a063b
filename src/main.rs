// Local JSON store:  cargo run -- import ./data/kayit-2025.xlsx
// Firestore store:   FIRESTORE_API_KEY=... cargo run -- --firestore-project okul-kayit summary

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use renewal_lib::export::{roster_to_xlsx, template_xlsx, write_not_renewed_csv};
use renewal_lib::stats::{class_breakdown, teacher_leaderboard, teacher_students};
use renewal_lib::store::toggle_renewed;
use renewal_lib::utils::write_error_to_log;
use renewal_lib::{JsonFileStore, RenewalStore, Roster, Teacher, import_workbook, ingest_file};
use renewal_tracker::{
    ERRORS_LOG_FILE,
    model::{FirestoreConfig, FirestoreStore, firestore_store},
    utils::{
        generate_unique_filename, render_classes, render_leaderboard, render_not_renewed,
        render_students, render_summary,
    },
};
use rpassword::prompt_password;

#[derive(Parser)]
#[command(name = "renewal-tracker")]
#[command(about = "Track student registration renewals imported from a school workbook")]
#[command(version)]
struct Args {
    /// JSON file holding the roster between runs
    #[arg(long, default_value = "renewal-data.json")]
    data_file: PathBuf,

    /// Keep the roster in this Firestore project instead of the local data file
    #[arg(long)]
    firestore_project: Option<String>,

    /// Firestore REST endpoint
    #[arg(long, default_value = firestore_store::DEFAULT_BASE_URL)]
    firestore_url: String,

    /// Firestore database id
    #[arg(long, default_value = firestore_store::DEFAULT_DATABASE)]
    firestore_database: String,

    /// API key sent with every Firestore request
    #[arg(long, env = "FIRESTORE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OAuth access token for Firestore
    #[arg(long, env = "FIRESTORE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// File that failed runs are appended to
    #[arg(long, default_value = ERRORS_LOG_FILE)]
    error_log: PathBuf,

    /// Prompt for the access token instead of passing it on the command line
    #[arg(long)]
    ask_token: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a workbook and replace the stored roster with it
    Import { file: PathBuf },
    /// Validate a workbook without storing anything
    Validate { file: PathBuf },
    /// School progress, teacher leaderboard and class breakdown
    Summary,
    /// Teachers ranked by renewal percentage
    Leaderboard,
    /// Renewal counts per class
    Classes,
    /// Students of one teacher, by id or name
    Teacher {
        teacher: String,
        /// Only list students whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Students who have not renewed, grouped by class
    NotRenewed {
        /// Also write the list to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Mark students as renewed
    Renew {
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Mark them as not renewed instead
        #[arg(long)]
        undo: bool,
    },
    /// Flip one student's renewed flag
    Toggle { id: i64 },
    /// Write the stored roster to a workbook the importer accepts
    Export { path: Option<PathBuf> },
    /// Write an empty upload template
    Template { path: PathBuf },
}

fn open_store(arguments: &Args) -> Box<dyn RenewalStore> {
    match &arguments.firestore_project {
        Some(project_id) => {
            let config = FirestoreConfig {
                base_url: arguments.firestore_url.clone(),
                project_id: project_id.clone(),
                database: arguments.firestore_database.clone(),
                api_key: arguments.api_key.clone(),
                access_token: arguments.access_token.clone(),
            };
            log::debug!("Using Firestore project {}", config.project_id);
            Box::new(FirestoreStore::new(reqwest::blocking::Client::new(), config))
        }
        None => {
            log::debug!("Using data file {}", arguments.data_file.display());
            Box::new(JsonFileStore::new(&arguments.data_file))
        }
    }
}

fn find_teacher<'a>(roster: &'a Roster, query: &str) -> Option<&'a Teacher> {
    match query.trim().parse::<i64>() {
        Ok(id) => roster.teacher(id),
        Err(_) => roster.teacher_by_name(query),
    }
}

fn fail(log_path: &Path, error_type: &str, error: &anyhow::Error) -> ! {
    eprintln!("❌ {error_type}: {error:#}");
    match write_error_to_log(log_path, error_type, &format!("{error:#}")) {
        Ok(()) => eprintln!("❌ Check {} for details.", log_path.display()),
        Err(e) => log::warn!("Could not write to {}: {e}", log_path.display()),
    }
    std::process::exit(1);
}

fn run(arguments: &Args) -> Result<(), anyhow::Error> {
    match &arguments.command {
        Command::Validate { file } => {
            let roster = ingest_file(file)?;
            println!(
                "✅ {} is valid: {} teachers, {} students",
                file.display(),
                roster.teachers.len(),
                roster.students.len()
            );
        }
        Command::Import { file } => {
            let bytes = std::fs::read(file)
                .map_err(|e| renewal_lib::IngestError::UnreadableFile {
                    detail: format!("{}: {e}", file.display()),
                })?;
            let mut store = open_store(arguments);
            let roster = import_workbook(store.as_mut(), &bytes)?;
            println!(
                "✅ Imported {} teachers and {} students",
                roster.teachers.len(),
                roster.students.len()
            );
        }
        Command::Summary => {
            let roster = open_store(arguments).load_all()?;
            print!("{}", render_summary(&roster));
        }
        Command::Leaderboard => {
            let roster = open_store(arguments).load_all()?;
            print!("{}", render_leaderboard(&teacher_leaderboard(&roster)));
        }
        Command::Classes => {
            let roster = open_store(arguments).load_all()?;
            print!("{}", render_classes(&class_breakdown(&roster.students)));
        }
        Command::Teacher { teacher, search } => {
            let roster = open_store(arguments).load_all()?;
            let found = find_teacher(&roster, teacher)
                .ok_or_else(|| anyhow::anyhow!("No teacher matches \"{teacher}\""))?;
            let students = teacher_students(&roster, found.id, search.as_deref());
            println!("{} ({} students)", found.name, students.len());
            print!("{}", render_students(&students));
        }
        Command::NotRenewed { csv } => {
            let roster = open_store(arguments).load_all()?;
            print!("{}", render_not_renewed(&roster.students));
            if let Some(csv_path) = csv {
                let written = write_not_renewed_csv(&roster.students, csv_path)?;
                println!("✅ CSV file created: {} ({written} students)", csv_path.display());
            }
        }
        Command::Renew { ids, undo } => {
            let mut store = open_store(arguments);
            store.set_renewed_bulk(ids, !undo)?;
            let state = if *undo { "not renewed" } else { "renewed" };
            println!("✅ Marked {} students as {state}", ids.len());
        }
        Command::Toggle { id } => {
            let mut store = open_store(arguments);
            let renewed = toggle_renewed(store.as_mut(), *id)?;
            let state = if renewed { "renewed" } else { "not renewed" };
            println!("✅ Student {id} is now {state}");
        }
        Command::Export { path } => {
            let roster = open_store(arguments).load_all()?;
            let path = path
                .clone()
                .unwrap_or_else(|| PathBuf::from(generate_unique_filename("renewal export", "xlsx")));
            std::fs::write(&path, roster_to_xlsx(&roster)?)?;
            println!("✅ Workbook created: {}", path.display());
        }
        Command::Template { path } => {
            std::fs::write(path, template_xlsx()?)?;
            println!("✅ Template created: {}", path.display());
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let arguments = {
        let mut _args = Args::parse();
        if _args.ask_token {
            let _token = prompt_password("Access token: ")?;
            _args.access_token = Some(_token);
        }
        _args
    };

    if let Err(error) = run(&arguments) {
        let error_type = match &arguments.command {
            Command::Import { .. } | Command::Validate { .. } => "Workbook Import Error",
            _ => "Renewal Tracker Error",
        };
        fail(&arguments.error_log, error_type, &error);
    }

    Ok(())
}
