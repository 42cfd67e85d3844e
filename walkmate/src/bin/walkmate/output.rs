use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;
use walkmate::{Post, User, UserStats};

use crate::theme::{ICONS, THEME};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub no_color: bool,
}

/// Trait for data that can be displayed as a table
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

/// Output manager handles formatting and display
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                println!("{json}");
            }
            OutputFormat::Table => {
                let table = data.to_table(&self.options);
                println!("{table}");
            }
            OutputFormat::Compact => {
                println!("{}", data.to_compact());
            }
        }
        Ok(())
    }

    /// Display a success message with color and icon
    pub fn success(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", self.decorate(ICONS.success, message, THEME.success));
        }
    }

    /// Display an error message with color and icon
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.decorate(ICONS.error, message, THEME.error));
    }

    pub fn warning(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", self.decorate(ICONS.warning, message, THEME.warning));
        }
    }

    pub fn info(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", self.decorate(ICONS.info, message, THEME.info));
        }
    }

    /// Display a heading
    pub fn heading(&self, text: &str) {
        if !self.options.quiet {
            let output = if self.options.no_color {
                format!("\n{text}\n{}", "=".repeat(text.chars().count()))
            } else {
                format!("\n{}", text.color(THEME.primary).bold())
            };
            println!("{output}");
        }
    }

    /// Display a key-value pair
    pub fn key_value(&self, key: &str, value: &str) {
        if !self.options.quiet {
            let output = if self.options.no_color {
                format!("{key}: {value}")
            } else {
                format!("{}: {}", key.color(THEME.key).bold(), value.color(THEME.value))
            };
            println!("{output}");
        }
    }

    /// Display a bullet list item
    pub fn bullet(&self, text: &str) {
        if !self.options.quiet {
            let output = if self.options.no_color {
                format!("  {} {text}", ICONS.bullet)
            } else {
                format!("  {} {text}", ICONS.bullet.color(THEME.muted))
            };
            println!("{output}");
        }
    }

    fn decorate(&self, icon: &str, message: &str, color: colored::Color) -> String {
        if self.options.no_color {
            format!("{icon} {message}")
        } else {
            format!("{} {}", icon.color(color), message.color(color))
        }
    }
}

fn themed_table(options: &GlobalOptions, headers: &[&str]) -> Table {
    let mut table = Table::new();
    if options.no_color {
        table.load_preset(comfy_table::presets::ASCII_FULL);
    } else {
        table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
    }

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| {
            let cell = Cell::new(h).add_attribute(Attribute::Bold);
            if options.no_color { cell } else { cell.fg(TableColor::Cyan) }
        })
        .collect();
    table.set_header(header_cells);
    table
}

/// A list of posts, as shown by `posts` and `feed`.
#[derive(Serialize)]
#[serde(transparent)]
pub struct PostList(pub Vec<Post>);

impl TableDisplay for PostList {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Id", "Title", "Creator", "Location", "Created"]);
        for post in &self.0 {
            table.add_row(vec![
                Cell::new(&post.id),
                Cell::new(&post.title),
                Cell::new(&post.creator_id),
                Cell::new(format!("{} {}", ICONS.pin, post.location)),
                Cell::new(post.created_at.format("%Y-%m-%d %H:%M UTC").to_string()),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|post| format!("{}:{}", post.id, post.title))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct UserList(pub Vec<User>);

impl TableDisplay for UserList {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Id", "Name"]);
        for user in &self.0 {
            table.add_row(vec![Cell::new(&user.id), Cell::new(&user.name)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|user| format!("{}:{}", user.id, user.name))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A profile header: the user plus follower/following/post counts.
#[derive(Serialize)]
pub struct Profile {
    pub user: User,
    pub stats: UserStats,
}

impl TableDisplay for Profile {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Name", "Followers", "Following", "Posts"]);
        table.add_row(vec![
            Cell::new(&self.user.name),
            Cell::new(self.stats.followers),
            Cell::new(self.stats.following),
            Cell::new(self.stats.posts),
        ]);
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "{} followers={} following={} posts={}",
            self.user.name, self.stats.followers, self.stats.following, self.stats.posts
        )
    }
}
