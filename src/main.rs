use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vnscript::config::Config;
use vnscript::lexer::tokenize;
use vnscript::{Directive, Interpreter, RuntimeError, ScriptError, Signal, State};

#[derive(ClapParser)]
#[command(author, version, about = "Visual novel script interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a script in the terminal
    Run {
        /// Script to play (defaults to the configured start script)
        script: Option<String>,
        /// Show text at once instead of typing it out
        #[arg(long)]
        instant: bool,
        /// Print directives as JSON lines and read signals from stdin
        #[arg(long)]
        json: bool,
    },
    /// Read a script's declarations and report problems
    Check {
        /// Script to check
        script: String,
    },
    /// Print the token stream of a script
    Tokens {
        /// Script to tokenize
        script: String,
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the configuration in effect
    Show,
    /// Write a config file with defaults for the current environment
    Init,
    /// Print where the config file lives
    Path,
    /// Open the config file in $EDITOR
    Edit,
}

fn read_script(name: &str, config: &Config) -> Result<String, ScriptError> {
    let path = config.resolve_script(name)?;
    tracing::info!(path = %path.display(), "loading script");
    Ok(fs::read_to_string(path)?)
}

fn report(result: Result<Vec<Directive>, RuntimeError>) -> Vec<Directive> {
    result.unwrap_or_else(|err| {
        eprintln!("Error: {}", err);
        Vec::new()
    })
}

fn render(directive: &Directive) {
    match directive {
        Directive::ShowBackground { name, .. } => println!("[background: {}]", name),
        Directive::ShowCharacter {
            name,
            mood,
            position,
            ..
        } => println!("[{} ({}) enters {}]", name, mood, position),
        Directive::ClearSlot { target } => println!("[clear {:?}]", target),
        Directive::ShowText {
            speaker,
            is_thought,
            ..
        } => match (speaker, is_thought) {
            (Some(speaker), false) => print!("{}: ", speaker),
            (Some(speaker), true) => print!("{} (thinking): ", speaker),
            (None, true) => print!("(thinking) "),
            (None, false) => {}
        },
        Directive::PlaySound {
            name,
            channel,
            volume,
            repeat,
            ..
        } => println!(
            "[{} {} at {:.2}{}]",
            channel,
            name,
            volume,
            if *repeat { ", repeating" } else { "" }
        ),
        Directive::StopChannel { channel } => println!("[stop {:?}]", channel),
        Directive::PresentChoice { prompt, options } => {
            println!("{}", prompt);
            for (i, option) in options.iter().enumerate() {
                println!("  {}) {}", i + 1, option.text);
            }
        }
        Directive::EndOfScript => println!("[end]"),
    }
}

fn type_out(interpreter: &mut Interpreter, speed: Duration) -> io::Result<()> {
    let mut out = io::stdout();
    while *interpreter.state() == State::Revealing {
        let before = interpreter.environment().revealed_len();
        interpreter.tick();
        if let Some(c) = interpreter.environment().full_text().chars().nth(before) {
            write!(out, "{}", c)?;
            out.flush()?;
        }
        thread::sleep(speed);
    }
    writeln!(out)
}

fn play_interactive(
    interpreter: &mut Interpreter,
    config: &Config,
    instant: bool,
) -> Result<(), ScriptError> {
    let mut lines = io::stdin().lock().lines();
    let mut directives = report(interpreter.start());

    loop {
        interpreter.take_warnings();
        directives.iter().for_each(render);

        match interpreter.state() {
            State::Revealing => {
                if instant {
                    interpreter.skip();
                    println!("{}", interpreter.environment().full_text());
                } else {
                    type_out(interpreter, Duration::from_millis(config.text_speed_ms))?;
                }
                directives = Vec::new();
            }
            State::AwaitingAdvance => {
                let Some(line) = lines.next() else {
                    break;
                };
                line?;
                directives = report(interpreter.advance());
            }
            State::AwaitingChoice { choice, .. } => {
                let options = choice.options.clone();
                print!("> ");
                io::stdout().flush()?;
                let Some(line) = lines.next() else {
                    break;
                };
                let line = line?;
                let answer = line.trim();
                let destination = match answer.parse::<usize>() {
                    Ok(n) if (1..=options.len()).contains(&n) => {
                        options[n - 1].destination.clone()
                    }
                    Ok(_) => {
                        println!("Pick a number from 1 to {}", options.len());
                        directives = Vec::new();
                        continue;
                    }
                    Err(_) => answer.to_string(),
                };
                directives = report(interpreter.select_option(&destination));
            }
            State::Ready | State::Dispatching | State::Finished => break,
        }
    }
    Ok(())
}

fn emit_json(
    out: &mut impl Write,
    result: Result<Vec<Directive>, RuntimeError>,
) -> Result<(), ScriptError> {
    match result {
        Ok(directives) => {
            for directive in directives {
                writeln!(out, "{}", serde_json::to_string(&directive)?)?;
            }
        }
        Err(err) => writeln!(out, "{}", serde_json::json!({ "error": err.to_string() }))?,
    }
    out.flush()?;
    Ok(())
}

fn play_json(interpreter: &mut Interpreter) -> Result<(), ScriptError> {
    let mut out = io::stdout().lock();
    emit_json(&mut out, interpreter.start())?;

    for line in io::stdin().lock().lines() {
        if interpreter.is_finished() {
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Signal>() {
            Ok(signal) => emit_json(&mut out, interpreter.handle(signal))?,
            Err(err) => writeln!(out, "{}", serde_json::json!({ "error": err.to_string() }))?,
        }
        interpreter.take_warnings();
    }
    Ok(())
}

fn check_script(name: &str, config: &Config) -> Result<(), ScriptError> {
    let source = read_script(name, config)?;
    let mut interpreter = Interpreter::load(&source, config.interpreter_options());

    match interpreter.entry_line() {
        Some(line) => println!("Entry line: {}", line + 1),
        None => println!("Entry line: none (nothing to play)"),
    }

    println!("\nLabels:");
    for (label, line) in interpreter.labels().sorted() {
        println!("  {} -> line {}", label, line + 1);
    }

    let assets = interpreter.assets();
    println!("\nCharacters:");
    for character in assets.characters() {
        let moods: Vec<&str> = character.moods.iter().map(|mood| mood.name.as_str()).collect();
        println!("  {} [{}]", character.name, moods.join(", "));
    }
    for (title, list) in [
        ("Backgrounds", assets.backgrounds()),
        ("Sounds", assets.sounds()),
        ("Music", assets.music()),
    ] {
        println!("\n{}:", title);
        for asset in list {
            println!("  {} = {}", asset.name, asset.location);
        }
    }

    println!("\nVariables:");
    for (name, value) in interpreter.variables().iter() {
        println!("  {} = {}", name, value);
    }

    let warnings = interpreter.take_warnings();
    println!("\nWarnings: {}", warnings.len());
    for warning in warnings {
        println!("  {}", warning);
    }
    Ok(())
}

fn print_tokens(name: &str, json: bool, config: &Config) -> Result<(), ScriptError> {
    let source = read_script(name, config)?;
    let tokens = tokenize(&source);
    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!(
                "{:>6}  {:<12} {:?}",
                token.location().to_string(),
                token.kind().to_string(),
                token.lexeme()
            );
        }
    }
    Ok(())
}

fn edit_config(config: &Config) -> Result<(), ScriptError> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| {
        if cfg!(windows) {
            String::from("notepad")
        } else {
            String::from("nano")
        }
    });

    let config_path = Config::get_config_path();
    if !config_path.exists() {
        config.save()?;
    }
    std::process::Command::new(editor).arg(&config_path).status()?;
    Ok(())
}

fn print_config_path(path: &Path) {
    let state = if path.exists() { "" } else { " (not created yet)" };
    println!("{}{}", path.display(), state);
}

fn main() -> Result<(), ScriptError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Run {
            script,
            instant,
            json,
        } => {
            let name = script.unwrap_or_else(|| config.start_script.clone());
            let source = read_script(&name, &config)?;
            let mut interpreter = Interpreter::load(&source, config.interpreter_options());
            if json {
                play_json(&mut interpreter)?;
            } else {
                play_interactive(&mut interpreter, &config, instant)?;
            }
        }
        Commands::Check { script } => check_script(&script, &config)?,
        Commands::Tokens { script, json } => print_tokens(&script, json, &config)?,
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                println!("Environment: {}", config.env_name);
                print_config_path(&Config::get_config_path());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigCommands::Init => {
                let config_path = Config::get_config_path();
                if config_path.exists() {
                    println!("Config file already exists at: {}", config_path.display());
                    println!(
                        "Use 'vnscript config edit' to modify it or remove the file to reinitialize."
                    );
                } else {
                    Config::default().save()?;
                    println!("Initialized new config file at: {}", config_path.display());
                }
            }
            ConfigCommands::Path => print_config_path(&Config::get_config_path()),
            ConfigCommands::Edit => edit_config(&config)?,
        },
    }

    Ok(())
}
