//! Tests for status, forget-session, completions, man.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use clap_complete::Shell;

#[test]
fn cli_parse_status() {
    match parse(&["spamirror", "status"]) {
        CliCommand::Status => {}
        _ => panic!("expected Status"),
    }
}

#[test]
fn cli_parse_forget_session() {
    match parse(&["spamirror", "forget-session"]) {
        CliCommand::ForgetSession => {}
        _ => panic!("expected ForgetSession"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["spamirror", "completions", "zsh"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Zsh),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_parse_completions_unknown_shell() {
    assert!(Cli::try_parse_from(["spamirror", "completions", "cmd.exe"]).is_err());
}

#[test]
fn cli_parse_man() {
    match parse(&["spamirror", "man"]) {
        CliCommand::Man => {}
        _ => panic!("expected Man"),
    }
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["spamirror"]).is_err());
}
