//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn parse_sync_defaults() {
    let cmd = parse(&["gcache", "sync"]);
    match cmd {
        CliCommand::Sync { manifest, game_dir, yes } => {
            assert!(manifest.is_none());
            assert!(game_dir.is_none());
            assert!(!yes);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_sync_with_overrides() {
    let cmd = parse(&[
        "gcache",
        "sync",
        "--manifest",
        "/etc/gcache/manifest.toml",
        "--game-dir",
        "/opt/game",
        "--yes",
    ]);
    match cmd {
        CliCommand::Sync { manifest, game_dir, yes } => {
            assert_eq!(manifest, Some(PathBuf::from("/etc/gcache/manifest.toml")));
            assert_eq!(game_dir, Some(PathBuf::from("/opt/game")));
            assert!(yes);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_status() {
    let cmd = parse(&["gcache", "status", "--game-dir", "/opt/game"]);
    match cmd {
        CliCommand::Status { manifest, game_dir } => {
            assert!(manifest.is_none());
            assert_eq!(game_dir, Some(PathBuf::from("/opt/game")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_checksum() {
    let cmd = parse(&["gcache", "checksum", "file.bin"]);
    match cmd {
        CliCommand::Checksum { path } => assert_eq!(path, PathBuf::from("file.bin")),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["gcache", "frobnicate"]).is_err());
}
