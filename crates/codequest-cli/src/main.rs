//! CodeQuest CLI
//!
//! Interactive terminal player for the CodeQuest curriculum.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use codequest_engine::{
    render_preview, timer_channel, AttemptOutcome, CategoryFilter, Config, Language, LevelSession,
    Localizer, MessageKey, Player, PlayerUpdate, QuestError, Screen,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// CodeQuest - learn React and TypeScript one quest at a time
///
/// Work through prerequisite-gated levels of short lessons. Type code line by
/// line, then submit it with `:run`.
#[derive(Parser, Debug)]
#[command(name = "codequest")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: codequest.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Path to a YAML content catalog (default: built-in curriculum)
    #[arg(long, value_name = "FILE")]
    catalog: Option<String>,

    /// Interface language (en or ko); saved as the new preference
    #[arg(short, long, value_name = "CODE")]
    language: Option<String>,

    /// Print the level overview and exit
    #[arg(long)]
    list: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

/// Whether the input loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout is the lesson display; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("CodeQuest starting");
    tracing::debug!(config = ?args.config, catalog = ?args.catalog, "Arguments");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Runs the interactive player until the learner quits or stdin closes.
async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(catalog) = args.catalog {
        config.catalog = Some(catalog);
    }
    config.validate()?;

    let (timer_tx, mut timer_rx) = timer_channel();
    let mut player = Player::from_config(&config, timer_tx)?;

    if let Some(code) = args.language.as_deref() {
        let language = parse_language(code)?;
        if let Err(e) = player.set_language(language) {
            tracing::warn!(error = %e, "Language preference not saved");
        }
    }

    if args.list {
        print_levels(&player, &CategoryFilter::All);
        return Ok(());
    }

    print_banner(&player);
    print_levels(&player, &CategoryFilter::All);
    print_overview_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed");
                    break;
                };
                if handle_line(&mut player, &line) == Flow::Quit {
                    break;
                }
            }
            Some(fired) = timer_rx.recv() => {
                let update = player.handle_timer(&fired);
                print_update(&player, &update);
            }
            Ok(()) = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    player.back_to_levels();
    println!();
    print_progress(&player);
    Ok(())
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

fn parse_language(code: &str) -> anyhow::Result<Language> {
    Language::from_code(code).ok_or_else(|| {
        anyhow::anyhow!("Unsupported language '{code}'\n\nSuggestion: Use 'en' or 'ko'")
    })
}

// ============================================================================
// Input handling
// ============================================================================

fn handle_line(player: &mut Player, line: &str) -> Flow {
    match player.screen() {
        Screen::Levels => handle_overview_command(player, line.trim()),
        Screen::Lesson(_) => {
            handle_lesson_input(player, line);
            Flow::Continue
        }
        Screen::NotFound(_) => {
            handle_not_found_input(player, line.trim());
            Flow::Continue
        }
    }
}

fn handle_overview_command(player: &mut Player, line: &str) -> Flow {
    let (command, argument) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(command, rest)| (command, rest.trim()));

    match command {
        "" => {}
        "list" | "ls" => print_levels(player, &CategoryFilter::parse(argument)),
        "start" => {
            if argument.is_empty() {
                println!("Usage: start <level-id>");
            } else {
                match player.start_level(argument) {
                    Ok(()) => print_screen(player),
                    Err(e) => print_error(&e),
                }
            }
        }
        "progress" => print_progress(player),
        "lang" => match parse_language(argument) {
            Ok(language) => {
                if let Err(e) = player.set_language(language) {
                    tracing::warn!(error = %e, "Language preference not saved");
                }
                print_banner(player);
            }
            Err(e) => println!("{e}"),
        },
        "help" => print_overview_help(),
        "quit" | "exit" => return Flow::Quit,
        other => println!("Unknown command '{other}'. Type 'help' for the list of commands."),
    }
    Flow::Continue
}

fn handle_lesson_input(player: &mut Player, line: &str) {
    let result = match line.trim() {
        ":run" => player.submit().map(|outcome| print_attempt(player, outcome)),
        ":hint" => player.request_hint().map(|hint| {
            let localizer = player.localizer();
            match hint {
                Some(hint) => println!(
                    "{}: {}",
                    localizer.text(MessageKey::Hints),
                    hint.get(localizer.language())
                ),
                None => println!("{}", localizer.text(MessageKey::NoMoreHints)),
            }
        }),
        ":show" => {
            print_lesson(player);
            Ok(())
        }
        ":clear" => player.set_code(String::new()),
        ":reset" => player.reset_code().map(|()| print_code(player)),
        ":preview" => {
            if let Some(session) = player.session() {
                let preview = render_preview(session.code());
                println!("--- {} ---", player.localizer().text(MessageKey::Preview));
                println!("{}", preview.output);
            }
            Ok(())
        }
        ":next" => player.advance_now().map(|update| {
            if update == PlayerUpdate::Nothing {
                println!("Solve the exercise first, then use :next to skip the wait.");
            } else {
                print_update(player, &update);
            }
        }),
        ":back" => {
            player.back_to_levels();
            print_levels(player, &CategoryFilter::All);
            Ok(())
        }
        ":help" => {
            print_lesson_help();
            Ok(())
        }
        _ => player.edit_code(line),
    };

    if let Err(e) = result {
        print_error(&e);
    }
}

fn handle_not_found_input(player: &mut Player, line: &str) {
    if matches!(line, ":back" | "back") {
        player.back_to_levels();
        print_levels(player, &CategoryFilter::All);
    } else {
        println!("{}", player.localizer().text(MessageKey::LevelNotFound));
        println!("Type :back to return to the level list.");
    }
}

// ============================================================================
// Output
// ============================================================================

fn print_banner(player: &Player) {
    let localizer = player.localizer();
    println!("=== {} ===", localizer.text(MessageKey::Title));
    println!("{}", localizer.text(MessageKey::Subtitle));
    println!();
}

fn print_levels(player: &Player, filter: &CategoryFilter) {
    let localizer = player.localizer();
    let language = localizer.language();

    let heading = match filter {
        CategoryFilter::All => localizer.text(MessageKey::AllCategories).to_string(),
        CategoryFilter::Category(category) => category.clone(),
    };
    println!("--- {heading} ---");

    let views = player.levels_in(filter);
    if views.is_empty() {
        println!("  (no levels)");
    }
    for view in views {
        let level = view.level;
        let status = if view.completed {
            format!("[{}]", localizer.text(MessageKey::Completed))
        } else if view.locked {
            format!(
                "[{}: {} {}]",
                localizer.text(MessageKey::Locked),
                localizer.text(MessageKey::Requires),
                level.prerequisites.join(", ")
            )
        } else {
            String::new()
        };
        println!(
            "  {:<14} {} ({}, {} {}) {status}",
            level.id,
            level.title.get(language),
            localizer.text(level.difficulty.message_key()),
            level.points,
            localizer.text(MessageKey::Points),
        );
    }
    println!();
}

fn print_progress(player: &Player) {
    let localizer = player.localizer();
    let progress = player.progress();
    println!(
        "{}: {}",
        localizer.text(MessageKey::TotalPoints),
        progress.total_points()
    );
    println!(
        "{}",
        localizer.format(
            MessageKey::LevelsCompleted,
            &[
                ("completed", &progress.completed_levels()),
                ("total", &player.catalog().len()),
                ("percent", &player.completion_percent()),
            ],
        )
    );
}

fn print_screen(player: &Player) {
    match player.screen() {
        Screen::Levels => print_levels(player, &CategoryFilter::All),
        Screen::Lesson(_) => {
            print_lesson(player);
            print_lesson_help();
        }
        Screen::NotFound(details) => {
            println!("{}", player.localizer().text(MessageKey::LevelNotFound));
            println!("{details}");
            println!("Type :back to return to the level list.");
        }
    }
}

fn print_lesson(player: &Player) {
    let Some(session) = player.session() else {
        return;
    };
    let localizer = player.localizer();
    let language = localizer.language();
    let lesson = session.current_lesson();
    let position = session.position();

    println!();
    println!(
        "=== {} :: {} ===",
        session.level().title.get(language),
        lesson.title.get(language)
    );
    println!(
        "{} ({}%)",
        localizer.format(
            MessageKey::LessonPosition,
            &[("current", &position.number), ("total", &position.total)],
        ),
        position.percent()
    );
    if !lesson.content.is_blank() {
        println!();
        println!("{}", lesson.content.get(language));
    }
    for example in &lesson.examples {
        println!();
        println!("{}", example.get(language));
    }
    println!();
    println!("--- {} ---", localizer.text(MessageKey::Exercise));
    println!("{}", lesson.exercise.description.get(language));
    for hint in session.visible_hints() {
        println!("  * {}", hint.get(language));
    }
    if let Some(solution) = session.solution() {
        println!("--- {} ---", localizer.text(MessageKey::Solution));
        println!("{solution}");
    }
    print_code(player);
}

fn print_code(player: &Player) {
    if let Some(session) = player.session() {
        println!("--- {} ---", player.localizer().text(MessageKey::YourCode));
        println!("{}", session.code());
        println!("---");
    }
}

fn print_attempt(player: &Player, outcome: AttemptOutcome) {
    let Some(session) = player.session() else {
        return;
    };
    if outcome == AttemptOutcome::Ignored {
        tracing::debug!("Submission ignored; exercise already solved");
        return;
    }
    if let Some(message) = session.status_message() {
        println!("{}", message.render(player.localizer()));
    }
    if let Some(solution) = session.solution() {
        println!("--- {} ---", player.localizer().text(MessageKey::Solution));
        println!("{solution}");
    }
}

fn print_update(player: &Player, update: &PlayerUpdate) {
    let localizer = player.localizer();
    match update {
        PlayerUpdate::Nothing => {}
        PlayerUpdate::SolutionHidden => {
            if let Some(message) = player.session().and_then(LevelSession::status_message) {
                println!("{}", message.render(localizer));
            }
        }
        PlayerUpdate::NextLesson { .. } => print_lesson(player),
        PlayerUpdate::LevelComplete {
            points,
            first_completion,
            ..
        } => {
            println!();
            if *first_completion {
                println!(
                    "{}",
                    localizer.format(MessageKey::LevelComplete, &[("points", points)])
                );
            } else {
                println!("{}", localizer.text(MessageKey::LevelReplayed));
            }
            print_progress(player);
            println!();
            print_levels(player, &CategoryFilter::All);
        }
    }
}

fn print_error(error: &QuestError) {
    tracing::debug!(error = ?error, "Command failed");
    println!("{error}");
}

fn print_overview_help() {
    println!("Commands:");
    println!("  list [category]   show levels (optionally only one category)");
    println!("  start <level-id>  start an unlocked level");
    println!("  progress          show points and completed levels");
    println!("  lang <en|ko>      switch the interface language");
    println!("  help              show this help");
    println!("  quit              leave CodeQuest");
    println!();
}

fn print_lesson_help() {
    println!("Type code line by line. Commands:");
    println!("  :run      submit your code");
    println!("  :hint     reveal the next hint");
    println!("  :show     show the lesson and your code again");
    println!("  :clear    empty the code buffer");
    println!("  :reset    restore the starting code");
    println!("  :preview  preview what your component renders");
    println!("  :next     continue right away after a correct answer");
    println!("  :back     return to the level list");
    println!();
}
