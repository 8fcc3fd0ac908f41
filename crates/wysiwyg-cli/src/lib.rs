use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wysiwyg_config::{Config, LoadOptions};
use wysiwyg_core::diff::build_unified_diff;
use wysiwyg_core::{
    BufferSource, Command, EditError, Editor, ExitCode, FileStore, FixedLink, MemoryPreview,
    PreviewMode,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Toolbar-driven HTML text editor", long_about = None)]
struct Cli {
    /// Use this config file on top of the discovered ones
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the persisted buffer (overrides storage.dir)
    #[arg(long = "store", value_name = "DIR", global = true)]
    store: Option<PathBuf>,

    /// Suppress informational output
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Run a toolbar command against the persisted buffer
    Apply(ApplyArgs),
    /// Replace the buffer with new text
    Set(SetArgs),
    /// Print the buffer
    Show,
    /// Print the preview document
    Preview(PreviewArgs),
    /// Delete the last character of the buffer
    Undo,
    /// Write the buffer to content.json
    Export(ExportArgs),
    /// Replace the buffer with the content of an exported file
    Import(ImportArgs),
    /// List the configured toolbar buttons
    Buttons,
    /// Show where the buffer lives and how large it is
    Status,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Command name (bold, italic, link, alignCenter, ...)
    #[arg(value_name = "COMMAND")]
    command: String,

    /// Selected range in characters, e.g. 4..9
    #[arg(long = "select", value_name = "START..END", value_parser = parse_range)]
    select: Option<(usize, usize)>,

    /// Link target for the link command
    #[arg(long = "link", value_name = "URL")]
    link: Option<String>,

    /// Print the diff without persisting
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct SetArgs {
    /// Read text from file (use '-' for stdin)
    #[arg(long = "with", value_name = "PATH", allow_hyphen_values = true)]
    with: Option<PathBuf>,

    /// Inline text with escape sequences (\\n, \\t, \\\\ , \\")
    #[arg(long = "with-string", value_name = "TEXT", allow_hyphen_values = true)]
    with_string: Option<String>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Override the configured preview mode
    #[arg(long = "mode", value_enum)]
    mode: Option<PreviewModeValue>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PreviewModeValue {
    Raw,
    Escaped,
}

impl From<PreviewModeValue> for PreviewMode {
    fn from(value: PreviewModeValue) -> Self {
        match value {
            PreviewModeValue::Raw => PreviewMode::Raw,
            PreviewModeValue::Escaped => PreviewMode::Escaped,
        }
    }
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Directory to write content.json into (defaults to the working directory)
    #[arg(long = "output", value_name = "DIR")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Previously exported JSON file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

type CliEditor = Editor<FileStore, MemoryPreview>;

/// Entry point for CLI execution. Returns the desired exit code; only
/// configuration failures surface as `Err`.
pub fn run() -> Result<i32> {
    init_tracing();
    let cli = Cli::parse();

    let mut load = LoadOptions::default();
    if let Some(path) = &cli.config {
        load = load.with_override_path(path);
    }

    let config = Config::load(load).context("failed to load configuration")?;

    match dispatch(&cli, &config) {
        Ok(code) => Ok(code as i32),
        Err(err) => {
            report_edit_error(&err);
            Ok(err.exit_code() as i32)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn dispatch(cli: &Cli, config: &Config) -> Result<ExitCode, EditError> {
    match &cli.command {
        CliCommand::Apply(args) => handle_apply(cli, config, args),
        CliCommand::Set(args) => handle_set(cli, config, args),
        CliCommand::Show => {
            let editor = open_editor(cli, config)?;
            print!("{}", editor.buffer());
            io::stdout().flush().ok();
            Ok(ExitCode::Success)
        }
        CliCommand::Preview(args) => {
            let editor = open_editor(cli, config)?;
            let html = match args.mode {
                Some(mode) => PreviewMode::from(mode).render(editor.buffer()),
                None => editor.preview().html().to_string(),
            };
            println!("{html}");
            Ok(ExitCode::Success)
        }
        CliCommand::Undo => {
            let mut editor = open_editor(cli, config)?;
            match editor.undo() {
                Some(removed) => {
                    editor.save_to_store()?;
                    info(cli, format!("Removed {removed:?}"));
                }
                None => info(cli, "Buffer is empty; nothing to undo."),
            }
            Ok(ExitCode::Success)
        }
        CliCommand::Export(args) => {
            let editor = open_editor(cli, config)?;
            let dir = args
                .output
                .clone()
                .unwrap_or_else(|| config.sources.working_directory.clone());
            let path = editor.export_to_dir(&dir)?;
            info(cli, format!("Exported {}", path.display()));
            Ok(ExitCode::Success)
        }
        CliCommand::Import(args) => {
            let mut editor = open_editor(cli, config)?;
            editor.import_from_file(&args.file)?;
            editor.save_to_store()?;
            info(cli, format!("Imported {}", args.file.display()));
            Ok(ExitCode::Success)
        }
        CliCommand::Buttons => {
            for (idx, button) in config.toolbar.buttons.iter().enumerate() {
                println!("{idx:>2}  {button}");
            }
            Ok(ExitCode::Success)
        }
        CliCommand::Status => {
            let editor = open_editor(cli, config)?;
            println!("key:      {}", config.storage.key);
            println!("store:    {}", editor.store().dir().display());
            println!("chars:    {}", editor.buffer().chars().count());
            println!(
                "autosave: {} every {} ms",
                if config.autosave.enabled { "on" } else { "off" },
                config.autosave.interval.as_millis()
            );
            println!("preview:  {}", config.preview.mode);
            for layer in &config.sources.layers {
                println!("config:   {}", layer.describe());
            }
            Ok(ExitCode::Success)
        }
    }
}

fn open_editor(cli: &Cli, config: &Config) -> Result<CliEditor, EditError> {
    let dir = cli
        .store
        .clone()
        .unwrap_or_else(|| config.storage.dir.clone());
    debug!(store = %dir.display(), "opening editor");
    Editor::new(
        FileStore::new(dir),
        MemoryPreview::default(),
        config.editor_options(),
    )
}

fn handle_apply(cli: &Cli, config: &Config, args: &ApplyArgs) -> Result<ExitCode, EditError> {
    let command = match args.command.parse::<Command>() {
        Ok(command) => command,
        Err(_) => {
            eprintln!(
                "Unknown command '{}'; nothing changed. Run `wysiwyg buttons` to list commands.",
                args.command
            );
            return Ok(ExitCode::UnknownCommand);
        }
    };

    if !config.toolbar.buttons.contains(&command) {
        return Err(EditError::InvalidArguments(format!(
            "command '{command}' is not on the configured toolbar"
        )));
    }

    if command.requires_link() && args.link.is_none() {
        return Err(EditError::InvalidArguments(
            "command 'link' requires --link".to_string(),
        ));
    }

    let mut editor = open_editor(cli, config)?.with_prompt(FixedLink(args.link.clone()));
    if let Some((start, end)) = args.select {
        editor.select(start, end)?;
    }

    let before = editor.buffer().to_string();
    let outcome = editor.execute(command)?;

    if args.dry_run {
        if cli.quiet {
            return Ok(ExitCode::Success);
        }
        match build_unified_diff(&before, &outcome.result, &config.storage.key) {
            Some(diff) => {
                print!("{diff}");
                io::stdout().flush().ok();
            }
            None => println!("No changes (dry run)"),
        }
        return Ok(ExitCode::Success);
    }

    if outcome.changed {
        editor.save_to_store()?;
        info(cli, format!("Applied {command}"));
    } else {
        info(cli, format!("{command}: buffer unchanged"));
    }

    Ok(ExitCode::Success)
}

fn handle_set(cli: &Cli, config: &Config, args: &SetArgs) -> Result<ExitCode, EditError> {
    let source = match (&args.with, &args.with_string) {
        (Some(_), Some(_)) => {
            return Err(EditError::InvalidArguments(
                "--with and --with-string cannot be used together".to_string(),
            ))
        }
        (Some(path), None) if path.as_os_str() == "-" => BufferSource::Stdin,
        (Some(path), None) => BufferSource::File(path.clone()),
        (None, Some(text)) => BufferSource::Inline(text.clone()),
        (None, None) => {
            return Err(EditError::InvalidArguments(
                "'set' requires --with or --with-string".to_string(),
            ))
        }
    };

    let text = source.read()?;
    let mut editor = open_editor(cli, config)?;
    editor.on_input(text);
    editor.save_to_store()?;
    info(cli, format!("Stored {} chars", editor.buffer().chars().count()));
    Ok(ExitCode::Success)
}

fn info(cli: &Cli, message: impl AsRef<str>) {
    if !cli.quiet {
        println!("{}", message.as_ref());
    }
}

fn report_edit_error(err: &EditError) {
    match err {
        EditError::InvalidLinkUrl(url) => eprintln!("Invalid URL: '{url}'"),
        EditError::StaleSelection { start, end } => {
            eprintln!("Selection {start}..{end} is outside the buffer.")
        }
        EditError::Io(io_err) => eprintln!("I/O error: {io_err}"),
        other => eprintln!("{other}"),
    }
}

fn parse_range(value: &str) -> Result<(usize, usize), String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{value}'"))?;
    let start = start
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid start '{start}': {err}"))?;
    let end = end
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid end '{end}': {err}"))?;
    if start > end {
        return Err(format!("start {start} is after end {end}"));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selection_ranges() {
        assert_eq!(parse_range("4..9"), Ok((4, 9)));
        assert_eq!(parse_range("0..0"), Ok((0, 0)));
        assert!(parse_range("9..4").is_err());
        assert!(parse_range("4-9").is_err());
        assert!(parse_range("a..b").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
