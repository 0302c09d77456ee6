//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use eventfold_core::TracingOutputFormat;
use eventfold_protocol::ListParams;

/// eventfold - Recurring events from every source, in one listing
#[derive(Debug, Parser)]
#[command(name = "eventfold")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "EVENTFOLD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log format: compact, pretty or json
    #[arg(long, global = true)]
    pub log_format: Option<TracingOutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List occurrences from the local store and remote sources
    List(ListArgs),

    /// Expand the recurring events of an events file
    Expand(ExpandArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Listing filters, named after the request parameters.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Exact event type
    #[arg(long)]
    pub event_type: Option<String>,

    /// Service body ids, comma separated
    #[arg(long)]
    pub service_body: Option<String>,

    /// How event type and service body combine: AND or OR
    #[arg(long)]
    pub relation: Option<String>,

    /// Category slugs, comma separated; prefix with '-' to exclude
    #[arg(long, allow_hyphen_values = true)]
    pub categories: Option<String>,

    /// How included categories combine: AND or OR
    #[arg(long)]
    pub category_relation: Option<String>,

    /// Tag slugs, comma separated; prefix with '-' to exclude
    #[arg(long, allow_hyphen_values = true)]
    pub tags: Option<String>,

    /// How included tags combine: AND or OR
    #[arg(long)]
    pub tag_relation: Option<String>,

    /// Publication status
    #[arg(long)]
    pub status: Option<String>,

    /// List past occurrences instead of upcoming ones
    #[arg(long)]
    pub archive: bool,

    /// Start of an explicit range (YYYY-MM-DD), requires --end-date
    #[arg(long)]
    pub start_date: Option<String>,

    /// End of an explicit range (YYYY-MM-DD), requires --start-date
    #[arg(long)]
    pub end_date: Option<String>,

    /// Sort order: ASC or DESC
    #[arg(long)]
    pub order: Option<String>,

    /// Sources to query, comma separated ("local" plus remote ids)
    #[arg(long)]
    pub source_ids: Option<String>,

    /// IANA timezone deciding "today"
    #[arg(long)]
    pub timezone: Option<String>,

    /// Page number
    #[arg(long)]
    pub page: Option<String>,

    /// Page size
    #[arg(long)]
    pub per_page: Option<String>,

    /// Print per-source status to stderr
    #[arg(long)]
    pub show_status: bool,
}

impl ListArgs {
    /// Converts the flags into request parameters.
    pub fn to_params(&self) -> ListParams {
        ListParams {
            event_type: self.event_type.clone(),
            service_body: self.service_body.clone(),
            relation: self.relation.clone(),
            categories: self.categories.clone(),
            category_relation: self.category_relation.clone(),
            tags: self.tags.clone(),
            tag_relation: self.tag_relation.clone(),
            status: self.status.clone(),
            archive: self.archive.then(|| "true".to_string()),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            order: self.order.clone(),
            source_ids: self.source_ids.clone(),
            timezone: self.timezone.clone(),
            page: self.page.clone(),
            per_page: self.per_page.clone(),
        }
    }
}

/// Arguments of `expand`.
#[derive(Debug, Clone, Args)]
pub struct ExpandArgs {
    /// Events file (JSON array or {"events": [...]})
    pub file: PathBuf,

    /// Only expand the event with this id
    #[arg(long)]
    pub id: Option<String>,

    /// Start of an explicit range (YYYY-MM-DD)
    #[arg(long, requires = "end_date")]
    pub start_date: Option<String>,

    /// End of an explicit range (YYYY-MM-DD)
    #[arg(long, requires = "start_date")]
    pub end_date: Option<String>,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn list_flags_become_params() {
        let cli = parse(&[
            "eventfold",
            "list",
            "--tags",
            "-online,regional",
            "--category-relation",
            "AND",
            "--archive",
            "--per-page",
            "20",
        ]);
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        let params = args.to_params();
        assert_eq!(params.tags.as_deref(), Some("-online,regional"));
        assert_eq!(params.category_relation.as_deref(), Some("AND"));
        assert_eq!(params.archive.as_deref(), Some("true"));
        assert_eq!(params.per_page.as_deref(), Some("20"));
        assert!(params.timezone.is_none());
    }

    #[test]
    fn global_flags() {
        let cli = parse(&["eventfold", "config", "path", "--debug", "--log-format", "json"]);
        assert!(cli.debug);
        assert_eq!(cli.log_format, Some(TracingOutputFormat::Json));
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Path
            }
        ));
    }

    #[test]
    fn expand_range_needs_both_bounds() {
        assert!(
            Cli::try_parse_from(["eventfold", "expand", "e.json", "--start-date", "2025-01-01"])
                .is_err()
        );
        let cli = parse(&["eventfold", "expand", "e.json", "--id", "7"]);
        let Command::Expand(args) = cli.command else {
            panic!("expected expand");
        };
        assert_eq!(args.id.as_deref(), Some("7"));
    }
}
