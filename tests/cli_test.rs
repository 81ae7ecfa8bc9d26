use clap::{CommandFactory, Parser};
use kiln::cli::{parse_answers, Args, Command};
use kiln::error::Error;
use std::path::PathBuf;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn test_subcommand_with_global_flags() {
    let args = Args::try_parse_from([
        "kiln",
        "entity",
        "--non-interactive",
        "-a",
        "entityName=Invoice",
        "--answer",
        "entityType=Not persistent",
        "-C",
        "/work/sales",
    ])
    .unwrap();

    assert_eq!(args.command, Command::Entity);
    assert!(args.non_interactive);
    assert!(!args.verbose);
    assert_eq!(args.answers, strings(&["entityName=Invoice", "entityType=Not persistent"]));
    assert_eq!(args.project_dir, Some(PathBuf::from("/work/sales")));
}

#[test]
fn test_flags_before_subcommand() {
    let args = Args::try_parse_from([
        "kiln",
        "-v",
        "--templates",
        "/opt/templates",
        "init",
        "--versions-url",
        "https://repo.example.org/versions.json",
    ])
    .unwrap();

    assert_eq!(args.command, Command::Init);
    assert!(args.verbose);
    assert_eq!(args.templates, PathBuf::from("/opt/templates"));
    assert!(args.project_dir.is_none());
    assert_eq!(args.versions_url.as_deref(), Some("https://repo.example.org/versions.json"));
}

#[test]
fn test_templates_help_names_the_override() {
    let command = Args::command();
    let templates = command
        .get_arguments()
        .find(|arg| arg.get_id() == "templates")
        .unwrap();

    let help = templates.get_long_help().unwrap().to_string();
    assert!(help.contains("KILN_TEMPLATES"), "{help}");
    assert_eq!(templates.get_env(), Some(std::ffi::OsStr::new("KILN_TEMPLATES")));
}

#[test]
fn test_missing_subcommand_is_an_error() {
    assert!(Args::try_parse_from(["kiln"]).is_err());
    assert!(Args::try_parse_from(["kiln", "deploy"]).is_err());
}

#[test]
fn test_parse_answers() {
    let answers =
        parse_answers(&strings(&["name=Invoice", " packageName =com.company.sales", "caption=a=b", "name=Order"]))
            .unwrap();

    assert_eq!(answers.keys().collect::<Vec<_>>(), vec!["name", "packageName", "caption"]);
    assert_eq!(answers["name"], "Order");
    assert_eq!(answers["packageName"], "com.company.sales");
    assert_eq!(answers["caption"], "a=b");
}

#[test]
fn test_parse_answers_rejects_malformed_pairs() {
    for pair in ["name", "=Invoice"] {
        match parse_answers(&strings(&[pair])) {
            Err(Error::ConfigError(message)) => assert!(message.contains(pair)),
            other => panic!("expected config error for '{pair}', got {other:?}"),
        }
    }
}
