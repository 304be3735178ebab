use anyhow::bail;
use bbdup::{
    app::{AddOutcome, AppFactory, AppService, Decision},
    bookmarks::{Bookmark, BookmarkCreate},
    cli::{self, OnDuplicate},
    dupes::{DuplicateDetector, ScanReport},
    logging, parse_tags,
};
use chrono::Utc;
use clap::Parser;
use inquire::error::InquireResult;

const DECISION_ADD: &str = "Add anyway";
const DECISION_MERGE: &str = "Merge into existing";
const DECISION_CANCEL: &str = "Cancel";

fn print_bookmark(bmark: &Bookmark) {
    println!("  #{:<5} {}  {}", bmark.id, bmark.title, bmark.url);
}

fn print_report(report: &ScanReport) {
    println!(
        "{} duplicate groups ({} duplicates) among {} bookmarks, took {}ms",
        report.groups.len(),
        report.total_duplicates,
        report.scanned_count,
        report.elapsed_ms
    );
    println!(
        "exact: {}, normalized: {}, title-similar: {}",
        report.exact_matches, report.normalized_matches, report.title_similar_matches
    );

    for group in &report.groups {
        println!();
        println!(
            "[{}] {} (similarity {:.2})",
            group.duplicate_type, group.normalized_url, group.similarity
        );
        for bmark in &group.bookmarks {
            print_bookmark(bmark);
        }
    }
}

fn confirm(message: String) -> anyhow::Result<bool> {
    match inquire::prompt_confirmation(message) {
        InquireResult::Ok(answer) => Ok(answer),
        InquireResult::Err(err) => bail!("An error occurred: {}", err),
    }
}

fn ask_decision(candidate: &Bookmark, dupes: &[Bookmark]) -> anyhow::Result<Decision> {
    println!("{} looks like a duplicate of:", candidate.url);
    for bmark in dupes {
        print_bookmark(bmark);
    }

    let choice = inquire::Select::new(
        "What do you want to do?",
        vec![DECISION_ADD, DECISION_MERGE, DECISION_CANCEL],
    )
    .prompt()?;

    Ok(match choice {
        DECISION_ADD => Decision::AddAnyway,
        DECISION_MERGE => Decision::Merge,
        _ => Decision::Cancel,
    })
}

fn run(args: cli::Args) -> anyhow::Result<()> {
    let paths = AppFactory::get_paths(args.base_path)?;
    let service: AppService = AppFactory::create_app_service(&paths)?;
    let config = service.config().clone();

    match args.command {
        #[cfg(feature = "markdown-docs")]
        cli::Command::MarkdownDocs {} => {
            println!("{}", clap_markdown::help_markdown::<cli::Args>());
            Ok(())
        }

        cli::Command::Scan { json, detection } => {
            let options = detection.apply(config.detection.clone());
            options.validate()?;

            let report = service.scan(&options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }

        cli::Command::Check {
            url,
            title,
            detection,
        } => {
            let options = detection.apply(config.detection.clone());
            options.validate()?;

            let candidate = BookmarkCreate {
                url,
                title,
                ..Default::default()
            }
            .to_candidate(Utc::now());

            let dupes = service.check(&candidate, &options)?;
            println!("{}", serde_json::to_string_pretty(&dupes)?);
            Ok(())
        }

        cli::Command::Merge { ids, yes, merge } => {
            let options = merge.apply(config.merge.clone());

            if !yes
                && !confirm(format!(
                    "Merge {} bookmarks into #{} and delete the rest?",
                    ids.len(),
                    ids[0]
                ))?
            {
                return Ok(());
            }

            let bmark = service.merge_ids(&ids, &options)?;
            println!("{}", serde_json::to_string_pretty(&bmark)?);
            Ok(())
        }

        cli::Command::MergeAll {
            yes,
            detection,
            merge,
        } => {
            let detection = detection.apply(config.detection.clone());
            detection.validate()?;
            let merge = merge.apply(config.merge.clone());

            if !yes {
                let report = service.scan(&detection)?;
                if report.groups.is_empty() {
                    println!("No duplicates found");
                    return Ok(());
                }
                print_report(&report);
                if !confirm(format!(
                    "Merge {} groups and delete {} bookmarks?",
                    report.groups.len(),
                    report.total_duplicates
                ))? {
                    return Ok(());
                }
            }

            let merged = service.merge_all(&detection, &merge)?;
            println!("{} groups merged", merged.len());
            Ok(())
        }

        cli::Command::Add {
            url,
            title,
            description,
            category,
            tags,
            favorite,
            on_duplicate,
            detection,
            merge,
        } => {
            let detection = detection.apply(config.detection.clone());
            detection.validate()?;
            let merge = merge.apply(config.merge.clone());

            let bmark_create = BookmarkCreate {
                url,
                title,
                description,
                category,
                tags: tags.map(parse_tags),
                is_favorite: favorite,
                ..Default::default()
            };

            let outcome = service.add(bmark_create, &detection, &merge, |candidate, dupes| {
                match on_duplicate {
                    Some(OnDuplicate::Add) => Ok(Decision::AddAnyway),
                    Some(OnDuplicate::Merge) => Ok(Decision::Merge),
                    Some(OnDuplicate::Cancel) => Ok(Decision::Cancel),
                    None => ask_decision(candidate, dupes),
                }
            })?;

            match outcome {
                AddOutcome::Created(bmark) | AddOutcome::Merged(bmark) => {
                    println!("{}", serde_json::to_string_pretty(&bmark)?)
                }
                AddOutcome::Cancelled => println!("Nothing added"),
            }
            Ok(())
        }

        cli::Command::Config { defaults } => {
            if defaults {
                let detector = DuplicateDetector::new();
                let mut defaults = bbdup::config::Config::default();
                defaults.detection = detector.default_detection_options();
                defaults.merge = detector.default_merge_options();
                print!("{}", serde_yml::to_string(&defaults)?);
            } else {
                println!("# {}/config.yaml", paths.base_path);
                print!("{}", serde_yml::to_string(&config)?);
            }
            Ok(())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    logging::init_logging(args.verbose, args.quiet);

    run(args)
}
