use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;

use crate::dupes::{
    DateStrategy, DetectionOptions, FavoriteStrategy, MergeOptions, PickStrategy, TextStrategy,
    VisitsStrategy,
};

#[derive(Parser, Debug)]
#[command(version, about = "Find and merge duplicate bookmarks", long_about = None)]
pub struct Args {
    /// Directory holding config.yaml and the bookmarks database
    /// (defaults to $BBDUP_BASE_PATH, then ~/.local/share/bbdup)
    #[clap(long, global = true)]
    pub base_path: Option<String>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[clap(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for the detection settings in config.yaml.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct DetectionArgs {
    /// Don't group bookmarks with identical urls
    #[clap(long, default_value = "false")]
    pub no_exact: bool,

    /// Don't group bookmarks whose normalized urls match
    #[clap(long, default_value = "false")]
    pub no_normalized: bool,

    /// Don't group bookmarks with similar titles
    #[clap(long, default_value = "false")]
    pub no_title: bool,

    /// Title similarity threshold [0.0, 1.0]
    #[clap(long)]
    pub threshold: Option<f64>,

    /// Drop the query string before comparing urls
    #[clap(long, default_value = "false")]
    pub ignore_query: bool,

    /// Treat http and https urls as different
    #[clap(long, default_value = "false")]
    pub keep_protocol: bool,

    /// Treat `www.` hosts as different
    #[clap(long, default_value = "false")]
    pub keep_www: bool,

    /// Treat a trailing slash as significant
    #[clap(long, default_value = "false")]
    pub keep_trailing_slash: bool,

    /// Compare urls and titles case-sensitively
    #[clap(long, default_value = "false")]
    pub case_sensitive: bool,
}

impl DetectionArgs {
    pub fn apply(&self, mut options: DetectionOptions) -> DetectionOptions {
        if self.no_exact {
            options.exact_url_matching = false;
        }
        if self.no_normalized {
            options.normalized_url_matching = false;
        }
        if self.no_title {
            options.title_similarity_matching = false;
        }
        if let Some(threshold) = self.threshold {
            options.title_similarity_threshold = threshold;
        }
        if self.ignore_query {
            options.ignore_query_params = true;
        }
        if self.keep_protocol {
            options.ignore_protocol = false;
        }
        if self.keep_www {
            options.ignore_www = false;
        }
        if self.keep_trailing_slash {
            options.ignore_trailing_slash = false;
        }
        if self.case_sensitive {
            options.case_sensitive = true;
        }
        options
    }
}

fn parse_strategy<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| format!("unknown strategy {value:?}"))
}

/// Overrides for the merge settings in config.yaml.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct MergeArgs {
    /// Title to keep: first, last, longest or custom
    #[clap(long = "keep-title", value_parser = parse_strategy::<TextStrategy>)]
    pub title: Option<TextStrategy>,

    /// Description to keep: first, last, longest or custom
    #[clap(long = "keep-description", value_parser = parse_strategy::<TextStrategy>)]
    pub description: Option<TextStrategy>,

    /// Category to keep: first, last or custom
    #[clap(long = "keep-category", value_parser = parse_strategy::<PickStrategy>)]
    pub category: Option<PickStrategy>,

    /// Favicon to keep: first, last or custom
    #[clap(long = "keep-favicon", value_parser = parse_strategy::<PickStrategy>)]
    pub favicon: Option<PickStrategy>,

    /// Favorite flag: any, all, first or last
    #[clap(long = "keep-favorite", value_parser = parse_strategy::<FavoriteStrategy>)]
    pub favorite: Option<FavoriteStrategy>,

    /// Visit count: sum, max, first or last
    #[clap(long = "keep-visits", value_parser = parse_strategy::<VisitsStrategy>)]
    pub visits: Option<VisitsStrategy>,

    /// Dates: earliest, latest, first or last
    #[clap(long = "keep-dates", value_parser = parse_strategy::<DateStrategy>, conflicts_with = "touch")]
    pub dates: Option<DateStrategy>,

    /// Keep the earliest date added and set date modified to now
    #[clap(long, default_value = "false")]
    pub touch: bool,

    /// Keep the earliest member's tags instead of combining them
    #[clap(long, default_value = "false")]
    pub no_combine_tags: bool,

    /// Value for --keep-title custom
    #[clap(long)]
    pub custom_title: Option<String>,

    /// Value for --keep-description custom
    #[clap(long)]
    pub custom_description: Option<String>,

    /// Value for --keep-category custom
    #[clap(long)]
    pub custom_category: Option<String>,

    /// Value for --keep-favicon custom
    #[clap(long)]
    pub custom_favicon: Option<String>,
}

impl MergeArgs {
    pub fn apply(&self, mut options: MergeOptions) -> MergeOptions {
        if let Some(title) = self.title {
            options.keep_title = title;
        }
        if let Some(description) = self.description {
            options.keep_description = description;
        }
        if let Some(category) = self.category {
            options.keep_category = category;
        }
        if let Some(favicon) = self.favicon {
            options.keep_favicon = favicon;
        }
        if let Some(favorite) = self.favorite {
            options.keep_favorite = favorite;
        }
        if let Some(visits) = self.visits {
            options.keep_visits = visits;
        }
        if self.dates.is_some() {
            options.keep_dates = self.dates;
        }
        if self.touch {
            options.keep_dates = None;
        }
        if self.no_combine_tags {
            options.combine_tags = false;
        }

        let custom = &mut options.custom;
        if self.custom_title.is_some() {
            custom.title = self.custom_title.clone();
        }
        if self.custom_description.is_some() {
            custom.description = self.custom_description.clone();
        }
        if self.custom_category.is_some() {
            custom.category = self.custom_category.clone();
        }
        if self.custom_favicon.is_some() {
            custom.favicon = self.custom_favicon.clone();
        }

        options
    }
}

/// Non-interactive answer for `add` when the new bookmark has duplicates.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDuplicate {
    Add,
    Merge,
    Cancel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate api docs in markdown format
    #[cfg(feature = "markdown-docs")]
    #[clap(hide = true)]
    MarkdownDocs {},

    /// Scan the whole collection for duplicates
    Scan {
        /// Print the report as json
        #[clap(long, default_value = "false")]
        json: bool,

        #[clap(flatten)]
        detection: DetectionArgs,
    },
    /// List bookmarks a new url/title would duplicate
    Check {
        /// a url
        #[clap(allow_hyphen_values = true)]
        url: String,

        /// Bookmark title
        #[clap(short, long)]
        title: Option<String>,

        #[clap(flatten)]
        detection: DetectionArgs,
    },
    /// Merge bookmarks by id. The first id is kept, the others are deleted.
    Merge {
        #[clap(required = true, num_args = 2..)]
        ids: Vec<u64>,

        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,

        #[clap(flatten)]
        merge: MergeArgs,
    },
    /// Scan and merge every duplicate group
    MergeAll {
        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,

        #[clap(flatten)]
        detection: DetectionArgs,

        #[clap(flatten)]
        merge: MergeArgs,
    },
    /// Add a bookmark, warning about duplicates
    Add {
        /// a url
        #[clap(allow_hyphen_values = true)]
        url: String,

        /// Bookmark title
        #[clap(short, long)]
        title: Option<String>,

        /// Bookmark description
        #[clap(short, long)]
        description: Option<String>,

        /// Bookmark category
        #[clap(short, long)]
        category: Option<String>,

        /// Bookmark tags
        #[clap(short = 'g', long)]
        tags: Option<String>,

        /// Mark as favorite
        #[clap(long, default_value = "false")]
        favorite: bool,

        /// What to do when duplicates exist, instead of asking
        #[clap(long, value_enum)]
        on_duplicate: Option<OnDuplicate>,

        #[clap(flatten)]
        detection: DetectionArgs,

        #[clap(flatten)]
        merge: MergeArgs,
    },
    /// Print the effective configuration
    Config {
        /// Print the built-in defaults instead
        #[clap(long, default_value = "false")]
        defaults: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(parse_strategy::<TextStrategy>("Longest"), Ok(TextStrategy::Longest));
        assert_eq!(parse_strategy::<VisitsStrategy>("max"), Ok(VisitsStrategy::Max));
        assert!(parse_strategy::<PickStrategy>("longest").is_err());
    }

    #[test]
    fn test_merge_args() {
        let args = Args::parse_from([
            "bbdup",
            "merge",
            "3",
            "1",
            "--keep-title",
            "custom",
            "--custom-title",
            "Merged",
            "--keep-visits",
            "max",
            "--touch",
            "--no-combine-tags",
        ]);
        let Command::Merge { ids, yes, merge } = args.command else {
            panic!("expected merge command");
        };
        assert_eq!(ids, vec![3, 1]);
        assert!(!yes);

        let options = merge.apply(MergeOptions::default());
        assert_eq!(options.keep_title, TextStrategy::Custom);
        assert_eq!(options.custom.title.as_deref(), Some("Merged"));
        assert_eq!(options.keep_visits, VisitsStrategy::Max);
        assert_eq!(options.keep_dates, None);
        assert!(!options.combine_tags);
        assert_eq!(options.keep_description, TextStrategy::Longest);
    }

    #[test]
    fn test_detection_args() {
        let args = Args::parse_from(["bbdup", "scan", "--no-title", "--keep-www", "--threshold", "0.5"]);
        let Command::Scan { detection, json } = args.command else {
            panic!("expected scan command");
        };
        assert!(!json);

        let options = detection.apply(DetectionOptions::default());
        assert!(!options.title_similarity_matching);
        assert!(!options.ignore_www);
        assert!(options.ignore_protocol);
        assert_eq!(options.title_similarity_threshold, 0.5);
    }

    #[test]
    fn test_merge_needs_two_ids() {
        assert!(Args::try_parse_from(["bbdup", "merge", "1"]).is_err());
    }
}
