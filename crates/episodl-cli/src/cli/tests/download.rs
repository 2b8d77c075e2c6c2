//! Tests for the download subcommand and config overrides.

use super::parse;
use crate::cli::{Cli, CliCommand, Overrides};
use clap::Parser;
use episodl_core::config::EpisodlConfig;
use std::path::{Path, PathBuf};

#[test]
fn cli_parse_download() {
    match parse(&["episodl", "download", "titles/show.json"]) {
        CliCommand::Download {
            source,
            concurrency,
            batch_size,
            storage_root,
            snapshot_dir,
        } => {
            assert_eq!(source, "titles/show.json");
            assert!(concurrency.is_none());
            assert!(batch_size.is_none());
            assert!(storage_root.is_none());
            assert!(snapshot_dir.is_none());
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_all_flags() {
    match parse(&[
        "episodl",
        "download",
        "https://example.com/show.json",
        "--concurrency",
        "3",
        "--batch-size",
        "10",
        "--storage-root",
        "/media",
        "--snapshot-dir",
        "/tmp/snaps",
    ]) {
        CliCommand::Download {
            source,
            concurrency,
            batch_size,
            storage_root,
            snapshot_dir,
        } => {
            assert_eq!(source, "https://example.com/show.json");
            assert_eq!(concurrency, Some(3));
            assert_eq!(batch_size, Some(10));
            assert_eq!(storage_root.as_deref(), Some(Path::new("/media")));
            assert_eq!(snapshot_dir.as_deref(), Some(Path::new("/tmp/snaps")));
        }
        _ => panic!("expected Download with flags"),
    }
}

#[test]
fn cli_parse_download_requires_source() {
    assert!(Cli::try_parse_from(["episodl", "download"]).is_err());
}

#[test]
fn cli_parse_download_rejects_zero_limits() {
    for flag in ["--concurrency", "--batch-size"] {
        assert!(
            Cli::try_parse_from(["episodl", "download", "show.json", flag, "0"]).is_err(),
            "{flag} 0 must be rejected"
        );
        assert!(Cli::try_parse_from(["episodl", "download", "show.json", flag, "1"]).is_ok());
    }
}

#[test]
fn overrides_replace_only_given_fields() {
    let cfg = Overrides {
        concurrency: Some(4),
        storage_root: Some(PathBuf::from("/media")),
        ..Overrides::default()
    }
    .apply(EpisodlConfig::default());
    assert_eq!(cfg.concurrency_limit, 4);
    assert_eq!(cfg.batch_size, 5);
    assert_eq!(cfg.storage_root, PathBuf::from("/media"));
    assert_eq!(cfg.snapshot_dir, PathBuf::from("."));
    assert_eq!(cfg.bind, "0.0.0.0:8000");
}
