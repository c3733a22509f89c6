use clap::{Args, Parser, Subcommand};
use liftlog_core::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Owner recorded on every row this single-user CLI creates
const LOCAL_USER: RecordId = 1;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Strength training log with simple and circuit exercises", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, inspect and delete trainings
    #[command(subcommand)]
    Training(TrainingCommand),

    /// Create programs that group trainings
    #[command(subcommand)]
    Program(ProgramCommand),

    /// Add, link, edit and delete exercises
    #[command(subcommand)]
    Exercise(ExerciseCommand),

    /// Log a performed session for an exercise
    Log {
        /// Exercise id
        id: RecordId,

        /// Session date (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// One performed set as set,reps,weight,rest (repeatable)
        #[arg(long = "set", required = true)]
        sets: Vec<SetResult>,
    },

    /// Finish a training slot and show the one after it
    Next {
        #[arg(long)]
        training: RecordId,

        /// Link id of the slot just completed
        link: RecordId,
    },

    /// Export a training's logged sets as CSV
    Export {
        #[arg(long)]
        training: RecordId,

        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Muscles trained, or the exercises hitting one muscle
    Stats { muscle: Option<String> },

    /// Show the exercise catalog
    Catalog,
}

#[derive(Subcommand)]
enum TrainingCommand {
    New {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        muscle: String,

        /// Program the training belongs to
        #[arg(long)]
        program: Option<RecordId>,
    },

    List,

    Show {
        id: RecordId,

        /// Include itemized schemas and logged sessions
        #[arg(long)]
        full: bool,
    },

    Finish { id: RecordId },

    Delete { id: RecordId },
}

#[derive(Subcommand)]
enum ProgramCommand {
    New {
        #[arg(long)]
        name: String,

        /// Planned length in weeks
        #[arg(long, default_value_t = 0)]
        weeks: u32,

        /// Planned trainings per week
        #[arg(long, default_value_t = 0)]
        per_week: u32,
    },

    List,

    /// Show a program and its trainings in order
    Show { id: RecordId },

    /// Delete a program along with its trainings
    Delete { id: RecordId },
}

#[derive(Args)]
struct ExerciseArgs {
    #[arg(long)]
    name: String,

    /// Set schema, e.g. "3,10,60" or "2,10,60-1,8,90"
    #[arg(long)]
    schema: Schema,

    /// Muscles worked (looked up in the catalog when omitted)
    #[arg(long)]
    muscle: Option<String>,

    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Add a standalone exercise to a training
    Add {
        #[arg(long)]
        training: RecordId,

        #[command(flatten)]
        exercise: ExerciseArgs,
    },

    /// Add an exercise in circuit after an existing one
    Link {
        #[arg(long)]
        training: RecordId,

        /// Exercise id the circuit starts from
        #[arg(long)]
        first: RecordId,

        #[command(flatten)]
        exercise: ExerciseArgs,
    },

    /// Change the fields of an exercise
    Edit {
        id: RecordId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        schema: Option<Schema>,

        #[arg(long)]
        muscle: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    Delete {
        #[arg(long)]
        training: RecordId,

        id: RecordId,
    },

    Show { id: RecordId },
}

/// Paths and settings every command needs
struct Context {
    store_path: PathBuf,
    catalog: Catalog,
    json: bool,
}

impl Context {
    fn load(&self) -> Result<MemoryStore> {
        MemoryStore::load_from(&self.store_path)
    }

    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut MemoryStore) -> Result<T>,
    {
        MemoryStore::update(&self.store_path, f)
    }

    /// Print `value` as JSON, or hand it to `text` for the human form
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text(value);
        }
        Ok(())
    }

    fn draft(&self, args: ExerciseArgs) -> ExerciseDraft {
        let muscle = args
            .muscle
            .or_else(|| self.catalog.find(&args.name).map(|e| e.muscle_target.clone()))
            .unwrap_or_default();
        ExerciseDraft::new(args.name, args.schema)
            .with_muscle_target(muscle)
            .with_notes(args.notes)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    liftlog_core::logging::init_with_level(if cli.verbose { "info" } else { "warn" });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let ctx = Context {
        store_path: data_dir.join(config::STORE_FILE),
        catalog: config.catalog,
        json: cli.json,
    };
    tracing::info!("Using store at {:?}", ctx.store_path);

    match cli.command {
        Commands::Training(command) => cmd_training(&ctx, command),
        Commands::Program(command) => cmd_program(&ctx, command),
        Commands::Exercise(command) => cmd_exercise(&ctx, command),
        Commands::Log { id, date, sets } => cmd_log(&ctx, id, date, sets),
        Commands::Next { training, link } => cmd_next(&ctx, training, link),
        Commands::Export { training, out } => cmd_export(&ctx, training, out.as_deref()),
        Commands::Stats { muscle } => cmd_stats(&ctx, muscle),
        Commands::Catalog => ctx.emit(&ctx.catalog.exercises, |entries| {
            for entry in entries {
                println!("{:<20} {}", entry.name, entry.muscle_target);
            }
        }),
    }
}

/// A training slot with its members summarized
#[derive(Serialize)]
struct SlotSummary {
    id: RecordId,
    #[serde(rename = "type")]
    kind: LinkKind,
    #[serde(rename = "exercises_list")]
    members: Vec<MinimalView>,
}

#[derive(Serialize)]
struct TrainingSummary {
    #[serde(flatten)]
    training: Training,
    exercises: Vec<SlotSummary>,
}

#[derive(Serialize)]
struct TrainingDetail {
    #[serde(flatten)]
    training: Training,
    exercises: Vec<ResolvedExercise>,
}

fn cmd_training(ctx: &Context, command: TrainingCommand) -> Result<()> {
    match command {
        TrainingCommand::New {
            name,
            muscle,
            program,
        } => {
            let training = ctx.update(|store| {
                linkage::create_training(store, LOCAL_USER, program, &name, &muscle)
            })?;
            ctx.emit(&training, |t| println!("Created training {} ({})", t.id, t.name))
        }

        TrainingCommand::List => {
            let store = ctx.load()?;
            let trainings = Store::<Training>::list(&store, &|_| true)?;
            ctx.emit(&trainings, |trainings| {
                for t in trainings {
                    let status = if t.finished { "done" } else { "open" };
                    println!("{:>4}  {:<24} {}", t.id, t.name, status);
                }
            })
        }

        TrainingCommand::Show { id, full: false } => {
            let store = ctx.load()?;
            let training = Store::<Training>::get(&store, id)?;
            let exercises = training
                .link_ids
                .iter()
                .map(|link_id| -> Result<SlotSummary> {
                    let link = Store::<ExerciseLink>::get(&store, link_id)?;
                    let members = link
                        .member_ids
                        .iter()
                        .map(|member_id| -> Result<MinimalView> {
                            view::minimize(&Store::<ExerciseData>::get(&store, member_id)?)
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Ok(SlotSummary {
                        id: link.id,
                        kind: link.kind(),
                        members,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            ctx.emit(&TrainingSummary { training, exercises }, |summary| {
                print_training_header(&summary.training);
                for slot in &summary.exercises {
                    print_slot_header(slot.id, slot.kind);
                    for member in &slot.members {
                        print_exercise(member);
                    }
                }
            })
        }

        TrainingCommand::Show { id, full: true } => {
            let store = ctx.load()?;
            let training = Store::<Training>::get(&store, id)?;
            let exercises = view::resolve_training(&store, id)?;

            ctx.emit(&TrainingDetail { training, exercises }, |detail| {
                print_training_header(&detail.training);
                for slot in &detail.exercises {
                    print_slot_header(slot.id, slot.kind);
                    for member in slot.members.as_slice() {
                        print_full_exercise(member);
                    }
                }
            })
        }

        TrainingCommand::Finish { id } => {
            let training = ctx.update(|store| workout::finish_training(store, id))?;
            ctx.emit(&training, |t| println!("Finished training {} ({})", t.id, t.name))
        }

        TrainingCommand::Delete { id } => {
            ctx.update(|store| linkage::destroy_training(store, id))?;
            ctx.emit(&serde_json::json!({ "deleted": id }), |_| {
                println!("Deleted training {}", id)
            })
        }
    }
}

fn cmd_program(ctx: &Context, command: ProgramCommand) -> Result<()> {
    match command {
        ProgramCommand::New {
            name,
            weeks,
            per_week,
        } => {
            let program = ctx.update(|store| {
                Store::<Program>::create(
                    store,
                    Program {
                        user_id: LOCAL_USER,
                        name,
                        duration: weeks,
                        training_number: per_week,
                        ..Program::default()
                    },
                )
            })?;
            ctx.emit(&program, |p| println!("Created program {} ({})", p.id, p.name))
        }

        ProgramCommand::List => {
            let store = ctx.load()?;
            let programs = Store::<Program>::list(&store, &|_| true)?;
            ctx.emit(&programs, |programs| {
                for p in programs {
                    println!("{:>4}  {:<24} {} trainings", p.id, p.name, p.training_ids.len());
                }
            })
        }

        ProgramCommand::Show { id } => {
            let store = ctx.load()?;
            let (program, trainings) = linkage::program_trainings(&store, id)?;
            ctx.emit(&ProgramDetail { program, trainings }, |detail| {
                let p = &detail.program;
                println!("Program {}: {}", p.id, p.name);
                if p.duration > 0 || p.training_number > 0 {
                    println!("  {} weeks, {} per week", p.duration, p.training_number);
                }
                for t in &detail.trainings {
                    let status = if t.finished { "done" } else { "open" };
                    println!("{:>4}  {:<24} {}", t.id, t.name, status);
                }
            })
        }

        ProgramCommand::Delete { id } => {
            ctx.update(|store| linkage::destroy_program(store, id))?;
            ctx.emit(&serde_json::json!({ "deleted": id }), |_| {
                println!("Deleted program {}", id)
            })
        }
    }
}

#[derive(Serialize)]
struct ProgramDetail {
    #[serde(flatten)]
    program: Program,
    trainings: Vec<Training>,
}

#[derive(Serialize)]
struct Linked {
    link: ExerciseLink,
    exercise: ExerciseData,
}

fn cmd_exercise(ctx: &Context, command: ExerciseCommand) -> Result<()> {
    match command {
        ExerciseCommand::Add { training, exercise } => {
            let draft = ctx.draft(exercise);
            let (link, exercise) =
                ctx.update(|store| linkage::create_simple(store, training, &draft))?;
            ctx.emit(&Linked { link, exercise }, |created| {
                println!(
                    "Added exercise {} ({}) as link {}",
                    created.exercise.id, created.exercise.name, created.link.id
                )
            })
        }

        ExerciseCommand::Link {
            training,
            first,
            exercise,
        } => {
            let draft = ctx.draft(exercise);
            let (link, exercise) = ctx.update(|store| {
                let link = linkage::find_link_for_member(&*store, training, first)?;
                linkage::extend_to_circuit(store, link.id, first, &draft)
            })?;
            ctx.emit(&Linked { link, exercise }, |created| {
                println!(
                    "Linked exercise {} ({}) into circuit {} ({} exercises)",
                    created.exercise.id,
                    created.exercise.name,
                    created.link.id,
                    created.link.member_ids.len()
                )
            })
        }

        ExerciseCommand::Edit {
            id,
            name,
            schema,
            muscle,
            notes,
        } => {
            let data = ctx.update(|store| {
                let current = Store::<ExerciseData>::get(store, id)?;
                let schema = match schema {
                    Some(schema) => schema,
                    None => schema::decode(&current.schema)?,
                };
                let draft = ExerciseDraft::new(name.unwrap_or(current.name), schema)
                    .with_muscle_target(muscle.unwrap_or(current.muscle_target))
                    .with_notes(notes.unwrap_or(current.notes));
                linkage::update_exercise(store, id, &draft)
            })?;
            ctx.emit(&data, |d| println!("Updated exercise {} ({})", d.id, d.name))
        }

        ExerciseCommand::Delete { training, id } => {
            let link = ctx.update(|store| linkage::delete_exercise(store, training, id))?;
            ctx.emit(&link, |link| match link {
                Some(link) => println!(
                    "Deleted exercise {}, link {} has {} left",
                    id,
                    link.id,
                    link.member_ids.len()
                ),
                None => println!("Deleted exercise {} and its link", id),
            })
        }

        ExerciseCommand::Show { id } => {
            let store = ctx.load()?;
            let data = Store::<ExerciseData>::get(&store, id)?;
            let view = view::expand(&data)?;
            ctx.emit(&view, print_full_exercise)
        }
    }
}

fn cmd_log(ctx: &Context, id: RecordId, date: Option<String>, sets: Vec<SetResult>) -> Result<()> {
    let session = SessionRecord::new(date.unwrap_or_else(performance::today), sets);
    let data = ctx.update(|store| workout::log_session(store, id, &session))?;
    ctx.emit(&session, |s| {
        println!("Logged {} sets of {} on {}", s.sets.len(), data.name, s.date)
    })
}

#[derive(Serialize)]
struct NextSlot {
    finished: RecordId,
    next: Option<ResolvedExercise>,
}

fn cmd_next(ctx: &Context, training_id: RecordId, link_id: RecordId) -> Result<()> {
    let next = ctx.update(|store| {
        let next = workout::next_link(&*store, training_id, link_id)?;
        workout::finish_link(store, link_id)?;
        match next {
            Some(next_id) => {
                let link = Store::<ExerciseLink>::get(store, next_id)?;
                view::resolve(&link, &*store).map(Some)
            }
            None => {
                workout::finish_training(store, training_id)?;
                Ok(None)
            }
        }
    })?;

    ctx.emit(
        &NextSlot {
            finished: link_id,
            next,
        },
        |slot| match &slot.next {
            Some(next) => {
                print_slot_header(next.id, next.kind);
                for member in next.members.as_slice() {
                    print_exercise(&member.summary);
                }
            }
            None => println!("Training {} complete", training_id),
        },
    )
}

fn cmd_export(ctx: &Context, training_id: RecordId, out: Option<&Path>) -> Result<()> {
    let store = ctx.load()?;
    match out {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let rows = export_history(&store, training_id, file)?;
            ctx.emit(&serde_json::json!({ "rows": rows, "path": path }), |_| {
                println!("✓ Exported {} sets", rows);
                println!("  CSV: {}", path.display());
            })
        }
        None => {
            export_history(&store, training_id, std::io::stdout().lock())?;
            Ok(())
        }
    }
}

fn cmd_stats(ctx: &Context, muscle: Option<String>) -> Result<()> {
    let store = ctx.load()?;
    let exercises = Store::<ExerciseData>::list(&store, &|_| true)?;

    match muscle {
        Some(muscle) => {
            let matching = stats::exercises_targeting(&exercises, &muscle);
            ctx.emit(&matching, |matching| {
                for exercise in matching {
                    println!("{:>4}  {}", exercise.id, exercise.name);
                }
            })
        }
        None => ctx.emit(&stats::muscles_targeted(&exercises), |muscles| {
            for muscle in muscles {
                println!("{}", muscle);
            }
        }),
    }
}

fn print_training_header(training: &Training) {
    let status = if training.finished { " [done]" } else { "" };
    println!("\n{} (training {}){}", training.name, training.id, status);
    if !training.muscle_target.is_empty() {
        println!("  {}", training.muscle_target);
    }
    println!();
}

fn print_slot_header(link_id: RecordId, kind: LinkKind) {
    match kind {
        LinkKind::Simple => println!("Link {}", link_id),
        LinkKind::Circuit => println!("Link {} (circuit)", link_id),
    }
}

fn print_exercise(view: &MinimalView) {
    let done = if view.finished { "✓" } else { " " };
    println!(
        "  {} [{}] {}: {} sets x {} reps, rest {}s",
        done, view.id, view.name, view.set_count, view.reps, view.rest
    );
    if !view.muscle_target.is_empty() {
        println!("        {}", view.muscle_target);
    }
    if !view.notes.is_empty() {
        println!("        ℹ {}", view.notes);
    }
}

fn print_full_exercise(view: &FullView) {
    print_exercise(&view.summary);
    for block in &view.schema {
        println!(
            "        → {} x {} reps, rest {}s",
            block.set_count, block.reps, block.rest_seconds
        );
    }
    for session in &view.performances {
        let sets: Vec<String> = session
            .sets
            .iter()
            .map(|set| format!("{}x{}@{}", set.set_number, set.reps, set.weight))
            .collect();
        println!("        {}: {}", session.date, sets.join("  "));
    }
    if !view.performances.is_empty() {
        println!(
            "        Total volume: {}",
            export::total_volume(&view.performances)
        );
    }
}
