use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::TimeDelta;
use clap::{Parser, ValueEnum};
use refetch_fetch::{FetchOptions, FileDigest};

#[derive(Clone, Debug, Parser)]
#[command(name = "refetch", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Args {
    /// URL to download
    pub url: String,

    /// File to write; replaced atomically
    pub dest: PathBuf,

    /// Create missing parent directories of DEST
    #[arg(long)]
    pub make_dirs: bool,

    /// How to tell whether DEST is already current
    #[arg(long, value_enum, default_value_t = FreshnessArg::None)]
    pub freshness: FreshnessArg,

    /// Send this token as If-None-Match
    #[arg(long, value_name = "TOKEN", group = "etag_source")]
    pub etag: Option<String>,

    /// Read and store the ETag in this sidecar file
    #[arg(long, value_name = "PATH", group = "etag_source")]
    pub etag_file: Option<PathBuf>,

    /// Use the sha256 of DEST as If-None-Match
    #[arg(long, group = "etag_source")]
    pub etag_sha256: bool,

    /// Seconds after which DEST is stale when the server sends no Last-Modified
    #[arg(long, value_name = "SECONDS", default_value_t = 0)]
    pub shelf_life: u64,

    /// Permission bits of the written file, in octal
    #[arg(long, value_name = "OCTAL", value_parser = parse_mode)]
    pub mode: Option<u32>,

    /// Refuse bodies larger than this many decoded bytes
    #[arg(long, value_name = "BYTES")]
    pub max_size: Option<u64>,

    /// Expected digest of the body, e.g. sha256:<hex>
    #[arg(long, value_name = "ALGO:DIGEST")]
    pub hash: Option<HashArg>,

    /// Keep DEST when the downloaded bytes are identical
    #[arg(long)]
    pub compare_content: bool,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Log every decision (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FreshnessArg {
    None,
    Head,
    IfModifiedSince,
    Etag,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashArg {
    pub algorithm: String,
    pub digest:    String,
}

impl FromStr for HashArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((algorithm, digest)) if !algorithm.is_empty() && !digest.is_empty() => Ok(Self {
                algorithm: algorithm.to_string(),
                digest:    digest.to_string(),
            }),
            _ => Err(format!("expected ALGO:DIGEST, got {s:?}")),
        }
    }
}

fn parse_mode(s: &str) -> Result<u32, String> {
    let digits = s.strip_prefix("0o").unwrap_or(s);
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(mode),
        _ => Err(format!("invalid octal mode {s:?}")),
    }
}

impl Args {
    fn has_etag_source(&self) -> bool {
        self.etag.is_some() || self.etag_file.is_some() || self.etag_sha256
    }

    pub fn fetch_options(&self) -> anyhow::Result<FetchOptions> {
        let mut options = FetchOptions::new()
            .destination(&self.dest)
            .make_dirs(self.make_dirs)
            .compare_content(self.compare_content);

        match self.freshness {
            FreshnessArg::None => {}
            FreshnessArg::Head => options = options.head_last_modified(),
            FreshnessArg::IfModifiedSince => options = options.if_modified_since(),
            FreshnessArg::Etag if !self.has_etag_source() => {
                bail!("--freshness etag needs --etag, --etag-file or --etag-sha256")
            }
            FreshnessArg::Etag => {}
        }

        if let Some(etag) = &self.etag {
            options = options.etag(etag.clone());
        }
        if let Some(path) = &self.etag_file {
            options = options.etag_file(path);
        }
        if self.etag_sha256 {
            options = options.etag_provider(FileDigest::default());
        }

        let shelf_life = i64::try_from(self.shelf_life)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .context("shelf life is out of range")?;
        options = options.shelf_life(shelf_life);

        if let Some(mode) = self.mode {
            options = options.mode(mode);
        }
        if let Some(max_size) = self.max_size {
            options = options.max_size(max_size);
        }
        if let Some(hash) = &self.hash {
            options = options.verify_hash(&hash.algorithm, &hash.digest);
        }
        if let Some(secs) = self.timeout {
            options = options.timeout(Duration::from_secs(secs));
        }

        options.validate().context("invalid options")?;
        Ok(options)
    }
}
