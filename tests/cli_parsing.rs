use clap::Parser;
use factotum::cli::{Cli, Commands};

#[test]
fn test_parse_classify() {
    let cli = Cli::try_parse_from(vec!["factotum", "classify", "Create a ticket"]).unwrap();
    match cli.command {
        Commands::Classify { message } => assert_eq!(message, "Create a ticket"),
        _ => panic!("Wrong command"),
    }
    assert!(!cli.json);
}

#[test]
fn test_parse_process_defaults() {
    let cli = Cli::try_parse_from(vec!["factotum", "process", "Build the export feature"]).unwrap();
    match cli.command {
        Commands::Process { message, wait_secs } => {
            assert_eq!(message, "Build the export feature");
            assert_eq!(wait_secs, 60);
        }
        _ => panic!("Wrong command"),
    }
}

#[test]
fn test_parse_process_with_wait_override() {
    let cli = Cli::try_parse_from(vec![
        "factotum",
        "process",
        "Build the export feature",
        "--wait-secs",
        "5",
    ])
    .unwrap();
    match cli.command {
        Commands::Process { wait_secs, .. } => assert_eq!(wait_secs, 5),
        _ => panic!("Wrong command"),
    }
}

#[test]
fn test_parse_templates_with_global_json_flag() {
    let cli = Cli::try_parse_from(vec!["factotum", "templates", "--json"]).unwrap();
    assert!(matches!(cli.command, Commands::Templates));
    assert!(cli.json);
}

#[test]
fn test_missing_message_is_an_error() {
    assert!(Cli::try_parse_from(vec!["factotum", "classify"]).is_err());
}
