mod commands;
mod examples;
mod output;
mod session;
mod theme;

use std::{
    fmt::Write,
    io::{self, Write as IoWrite},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, RgbColor, Style},
    },
    error::ErrorKind,
};
use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};
use walkmate::{DocumentStore, MemoryStore, RedisStore, Service, StoreBackend, StoreIdentity, WalkmateConfig};

use commands::{LoginArgs, PostArgs, SignupArgs, TargetArg, UserArg};
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use session::SessionFile;
use theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("REDIS_URL", "Redis connection URL used by the default config"),
    ("WALKMATE_CONFIG", "Path to a walkmate.toml to load"),
    ("WALKMATE_PASSWORD", "Password for signup and login"),
    ("RUST_LOG", "Log filter, overrides [logging] filter"),
];

#[derive(Parser)]
#[command(name = "walkmate")]
#[command(version)]
#[command(
    about = "Share walks, follow walkers and read their feed",
    long_about = r#"WalkMate command line client:

• Sign up, log in and keep a session between runs
• Share geo-tagged walks and manage your own posts
• Follow other walkers and read the merged feed of their walks
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file; defaults to $WALKMATE_CONFIG, then ./walkmate.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and sign in
    Signup(SignupArgs),

    /// Sign in and remember the session
    Login(LoginArgs),

    /// End the current session
    Logout,

    /// Show the signed-in user's profile
    Whoami,

    /// Share a walk
    Post(PostArgs),

    /// List a user's walks, newest first
    Posts(UserArg),

    /// Delete one of your walks
    DeletePost {
        /// Id of the post to delete
        post_id: String,
    },

    /// Follow another user
    Follow(TargetArg),

    /// Stop following a user
    Unfollow(TargetArg),

    /// Check whether you follow a user
    IsFollowing(TargetArg),

    /// Follower, following and post counts
    Stats(UserArg),

    /// Walks shared by everyone you follow
    Feed,

    /// Find other users by name prefix
    Search {
        /// Start of the name, case-insensitive
        query: String,
    },

    /// Run a walkthrough against a throwaway in-memory store
    Demo,
}

impl Cli {
    fn parse_with_styles() -> Self {
        let command = build_cli_command();
        match command.styles(help_styles()).try_get_matches() {
            Ok(matches) => match Cli::from_arg_matches(&matches) {
                Ok(cli) => cli,
                Err(err) => err.exit(),
            },
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = print_blank_line_stdout();
                    if let Err(print_err) = err.print()
                        && print_err.kind() != io::ErrorKind::BrokenPipe
                    {
                        eprintln!("Failed to display help: {print_err}");
                    }
                    let _ = print_blank_line_stdout();
                    std::process::exit(0);
                }
                _ => {
                    let exit_code = err.exit_code();
                    let _ = print_blank_line_stderr();
                    if let Err(print_err) = err.print()
                        && print_err.kind() != io::ErrorKind::BrokenPipe
                    {
                        eprintln!("Failed to display error: {print_err}");
                    }
                    let _ = print_blank_line_stderr();
                    std::process::exit(exit_code);
                }
            },
        }
    }
}

fn build_cli_command() -> Command {
    let use_color = detect_color_support();
    let appendix = render_top_level_appendix(use_color);
    let mut command = Cli::command().after_long_help(appendix);
    command = command.color(if use_color { ColorChoice::Auto } else { ColorChoice::Never });
    attach_command_examples(&mut command, use_color);
    command
}

fn attach_command_examples(command: &mut Command, use_color: bool) {
    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            let help_text = render_examples(example.groups, use_color);
            *subcommand = subcommand.clone().after_long_help(help_text);
        }
    }
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let heading = stylize("Examples:", theme.highlight, true, use_color);
    let _ = writeln!(buffer, "{heading}");

    for (index, group) in groups.iter().enumerate() {
        let title = stylize(group.title, theme.primary, true, use_color);
        let _ = writeln!(buffer, "  {title}");

        for command in group.commands {
            let arrow = stylize(ICONS.arrow, theme.secondary, false, use_color);
            let command_text = stylize(command, theme.secondary, false, use_color);
            let _ = writeln!(buffer, "    {arrow} {command_text}");
        }

        if index + 1 < groups.len() {
            buffer.push('\n');
        }
    }

    buffer
}

fn render_top_level_appendix(use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let env_heading = stylize("Environment Variables:", theme.highlight, true, use_color);
    let _ = writeln!(buffer, "{env_heading}");
    for (key, description) in ENVIRONMENT_VARIABLES {
        let key_text = stylize(key, theme.key, true, use_color);
        let value_text = stylize(description, theme.value, false, use_color);
        let _ = writeln!(buffer, "  {key_text}  {value_text}");
    }

    buffer.push('\n');

    let tip_heading = stylize("Tip:", theme.highlight, true, use_color);
    let tip_text = stylize(
        "Use 'walkmate <command> --help' to view examples for each command.",
        theme.secondary,
        false,
        use_color,
    );
    let _ = writeln!(buffer, "{tip_heading} {tip_text}");
    buffer
}

fn print_blank_line_stdout() -> io::Result<()> {
    let mut stdout = io::stdout();
    IoWrite::write_all(&mut stdout, b"\n")?;
    IoWrite::flush(&mut stdout)
}

fn print_blank_line_stderr() -> io::Result<()> {
    let mut stderr = io::stderr();
    IoWrite::write_all(&mut stderr, b"\n")?;
    IoWrite::flush(&mut stderr)
}

fn stylize(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    let styled = text.color(color);
    if bold { styled.bold().to_string() } else { styled.to_string() }
}

fn detect_color_support() -> bool {
    ShouldColorize::from_env().should_colorize()
}

fn help_styles() -> Styles {
    let theme = &THEME;
    Styles::styled()
        .usage(style_from_color(theme.primary).bold())
        .header(style_from_color(theme.highlight).bold())
        .literal(style_from_color(theme.secondary))
        .placeholder(style_from_color(theme.muted))
        .valid(style_from_color(theme.success))
        .invalid(style_from_color(theme.warning))
        .error(style_from_color(theme.error).bold())
}

fn style_from_color(color: ThemeColor) -> Style {
    Style::new().fg_color(Some(color_to_clap_color(color)))
}

fn color_to_clap_color(color: ThemeColor) -> ClapColor {
    match color {
        ThemeColor::Black => ClapColor::Ansi(AnsiColor::Black),
        ThemeColor::Red => ClapColor::Ansi(AnsiColor::Red),
        ThemeColor::Green => ClapColor::Ansi(AnsiColor::Green),
        ThemeColor::Yellow => ClapColor::Ansi(AnsiColor::Yellow),
        ThemeColor::Blue => ClapColor::Ansi(AnsiColor::Blue),
        ThemeColor::Magenta => ClapColor::Ansi(AnsiColor::Magenta),
        ThemeColor::Cyan => ClapColor::Ansi(AnsiColor::Cyan),
        ThemeColor::White => ClapColor::Ansi(AnsiColor::White),
        ThemeColor::BrightBlack => ClapColor::Ansi(AnsiColor::BrightBlack),
        ThemeColor::BrightRed => ClapColor::Ansi(AnsiColor::BrightRed),
        ThemeColor::BrightGreen => ClapColor::Ansi(AnsiColor::BrightGreen),
        ThemeColor::BrightYellow => ClapColor::Ansi(AnsiColor::BrightYellow),
        ThemeColor::BrightBlue => ClapColor::Ansi(AnsiColor::BrightBlue),
        ThemeColor::BrightMagenta => ClapColor::Ansi(AnsiColor::BrightMagenta),
        ThemeColor::BrightCyan => ClapColor::Ansi(AnsiColor::BrightCyan),
        ThemeColor::BrightWhite => ClapColor::Ansi(AnsiColor::BrightWhite),
        ThemeColor::TrueColor { r, g, b } => ClapColor::Rgb(RgbColor(r, g, b)),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse_with_styles();

    let _ = print_blank_line_stdout();

    match execute(cli).await {
        Ok(()) => {
            let _ = print_blank_line_stdout();
        }
        Err(err) => {
            eprintln!("{} {err:#}", ICONS.error);
            let _ = print_blank_line_stdout();
            std::process::exit(1);
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = WalkmateConfig::load(cli.config.as_deref())?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.filter.as_str()))
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        no_color: cli.no_color,
    });

    if let Commands::Demo = cli.command {
        return commands::handle_demo(config.feed, &output).await;
    }

    let session_file = SessionFile::new(config.session.path());
    match config.store.backend {
        StoreBackend::Memory => {
            output.warning("Using the in-memory store; nothing is kept after this command exits.");
            run(cli.command, MemoryStore::new(), &config, &session_file, &output).await
        }
        StoreBackend::Redis => {
            let url = config.redis_url()?;
            let store = RedisStore::connect(&url, config.store.prefix.clone())
                .await
                .context("Failed to connect to Redis")?;
            run(cli.command, store, &config, &session_file, &output).await
        }
    }
}

async fn run<S>(
    command: Commands,
    store: S,
    config: &WalkmateConfig,
    session_file: &SessionFile,
    output: &OutputManager,
) -> Result<()>
where
    S: DocumentStore + Clone,
{
    let service = Service::new(store.clone(), StoreIdentity::new(store), config.feed);
    commands::resume_saved_session(&service, session_file, output).await?;
    commands::dispatch(command, &service, session_file, output).await
}
