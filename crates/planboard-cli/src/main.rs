// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use planboard_app::ItemId;
use planboard_db::Store;
use planboard_testkit::PlanFaker;
use runtime::PlanRuntime;
use std::env;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PLANBOARD_LOG";
const DEMO_SEED: u64 = 2026;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `planboard --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_logging(config.log_level());

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let scope_key = options
        .scope_key
        .clone()
        .unwrap_or_else(|| config.scope_key().to_owned());
    planboard_db::validate_scope_key(&scope_key)?;

    let mut store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or PLANBOARD_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    store.set_max_payload_size(config.max_payload_size())?;
    if options.demo {
        store.try_save(&PlanFaker::new(DEMO_SEED).document(4, 1), &scope_key)?;
    }
    info!(db = %db_path.display(), scope_key = %scope_key, "store ready");

    if options.check_only {
        store.try_load(&scope_key)?;
        return Ok(());
    }

    let mut runtime = PlanRuntime::load(&store, &scope_key, config.session_settings());
    match options.action {
        Action::List => {
            let lines = runtime.list();
            if lines.is_empty() {
                println!("no items in scope {scope_key:?}; add one with --add <title>");
            }
            for line in lines {
                println!("{line}");
            }
        }
        Action::Show(id) => println!("{}", runtime.show(id)?),
        Action::Outline(id) => println!("{}", runtime.outline(id)?),
        Action::Add(title) => {
            let id = runtime.add(&title)?;
            println!("added item {id}");
        }
        Action::Paste { id, row, col } => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("read tab-separated cells from stdin")?;
            if runtime.paste(id, row, col, &text)? {
                println!("pasted into item {id} at {row}/{col}");
            } else {
                println!("nothing to paste");
            }
        }
    }
    Ok(())
}

fn init_logging(config_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(config_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    List,
    Show(ItemId),
    Outline(ItemId),
    Add(String),
    Paste { id: ItemId, row: usize, col: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    scope_key: Option<String>,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    action: Action,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        scope_key: None,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        action: Action::List,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                options.config_path =
                    PathBuf::from(next_value(&mut iter, "--config", "a file path")?);
            }
            "--scope" => {
                options.scope_key = Some(next_value(&mut iter, "--scope", "a scope key")?);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--list" => {
                options.action = Action::List;
            }
            "--show" => {
                options.action = Action::Show(parse_item_id(
                    "--show",
                    &next_value(&mut iter, "--show", "an item id")?,
                )?);
            }
            "--outline" => {
                options.action = Action::Outline(parse_item_id(
                    "--outline",
                    &next_value(&mut iter, "--outline", "an item id")?,
                )?);
            }
            "--add" => {
                options.action = Action::Add(next_value(&mut iter, "--add", "a title")?);
            }
            "--paste" => {
                let mut next = || next_value(&mut iter, "--paste", "<id> <row> <col>");
                let id = parse_item_id("--paste", &next()?)?;
                let row = parse_index("--paste", "row", &next()?)?;
                let col = parse_index("--paste", "col", &next()?)?;
                options.action = Action::Paste { id, row, col };
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn next_value<S: AsRef<str>>(
    iter: &mut impl Iterator<Item = S>,
    flag: &str,
    what: &str,
) -> Result<String> {
    iter.next()
        .map(|value| value.as_ref().to_owned())
        .ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn parse_item_id(flag: &str, raw: &str) -> Result<ItemId> {
    raw.parse::<i64>()
        .map(ItemId::new)
        .map_err(|_| anyhow!("{flag} expects a numeric item id, got {raw:?}; see --list"))
}

fn parse_index(flag: &str, what: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>()
        .map_err(|_| anyhow!("{flag} expects a non-negative {what} index, got {raw:?}"))
}

fn print_help() {
    println!("planboard");
    println!("  --config <path>          Use a specific config path");
    println!("  --scope <key>            Use a document scope other than [storage].scope_key");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Run against seeded demo data (in-memory)");
    println!("  --check                  Validate config + DB and exit");
    println!("  --list                   List items in the scope (default)");
    println!("  --show <id>              Print an item's table with section totals");
    println!("  --outline <id>           Print questions with their outcomes");
    println!("  --add <title>            Add an item to the shortlist");
    println!("  --paste <id> <row> <col> Paste tab-separated cells from stdin");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{Action, CliOptions, parse_cli_args};
    use anyhow::Result;
    use planboard_app::ItemId;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/planboard-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                scope_key: None,
                print_config_path: false,
                print_db_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
                action: Action::List,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_and_scope_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml", "--scope", "work"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(options.scope_key.as_deref(), Some("work"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--paste", "1", "2"], default_options_path())
            .expect_err("missing col should fail");
        assert!(error.to_string().contains("--paste requires <id> <row> <col>"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.print_db_path);
        assert!(!options.demo);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_demo_and_db_path_print_flags() -> Result<()> {
        let options = parse_cli_args(vec!["--demo", "--print-path"], default_options_path())?;
        assert!(!options.print_config_path);
        assert!(options.print_db_path);
        assert!(options.demo);
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_item_actions() -> Result<()> {
        let show = parse_cli_args(vec!["--show", "3"], default_options_path())?;
        assert_eq!(show.action, Action::Show(ItemId::new(3)));

        let outline = parse_cli_args(vec!["--outline", "2"], default_options_path())?;
        assert_eq!(outline.action, Action::Outline(ItemId::new(2)));

        let add = parse_cli_args(vec!["--add", "Paint the shed"], default_options_path())?;
        assert_eq!(add.action, Action::Add("Paint the shed".to_owned()));

        let paste = parse_cli_args(vec!["--paste", "1", "14", "0"], default_options_path())?;
        assert_eq!(
            paste.action,
            Action::Paste {
                id: ItemId::new(1),
                row: 14,
                col: 0,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_non_numeric_indices() {
        let error = parse_cli_args(vec!["--show", "first"], default_options_path())
            .expect_err("non-numeric id should fail");
        assert!(error.to_string().contains("numeric item id"));

        let error = parse_cli_args(vec!["--paste", "1", "-2", "0"], default_options_path())
            .expect_err("negative row should fail");
        assert!(error.to_string().contains("non-negative row index"));
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
