//! End-to-end tests for windscope
//!
//! The suites under `tests/` build a real archive tree in a temporary
//! directory (ZIP files generated on the fly), load the engine from a TOML
//! configuration exactly as the CLI does, and run the three queries against
//! the filesystem store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p windscope-tests
//! ```
//!
//! # Test Structure
//!
//! - `series_e2e.rs` - time series, plausibility rule, ordering
//! - `generation_e2e.rs` - daily generation and availability
//! - `power_curve_e2e.rs` - scatter extraction and reference curve
//! - `config_e2e.rs` - configuration layering and registry loading

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;
use windscope_engine::{ArchiveEngine, EngineConfig};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Parameter dictionary written by [`ArchiveTree::new`]
pub const PARAMETERS_CSV: &str = "\
VAR_PK,Parameter
634,Active Power
1431,Wind Speed
220,Gearbox Bearing Temp
301,Rotor Speed
";

/// "Today" used by every suite, so that defaulted dates are stable
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 6).expect("valid date")
}

/// A temporary archive root laid out like a production export
///
/// ```text
/// <root>/
///   10Min/<file>.zip
///   Statistics/<file>.zip
///   parameters.csv
///   config.toml
/// ```
pub struct ArchiveTree {
    dir: TempDir,
}

impl ArchiveTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("10Min")).expect("create series dir");
        std::fs::create_dir_all(dir.path().join("Statistics")).expect("create stats dir");
        std::fs::write(dir.path().join("parameters.csv"), PARAMETERS_CSV)
            .expect("write parameters");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a ZIP archive at `<root>/<name>`
    pub fn add_zip(&self, name: &str, entries: &[(&str, &str)]) -> PathBuf {
        let path = self.root().join(name);
        let file = std::fs::File::create(&path).expect("create archive");
        let mut writer = ZipWriter::new(file);
        for (entry, content) in entries {
            writer
                .start_file(entry.to_string(), SimpleFileOptions::default())
                .expect("start entry");
            writer.write_all(content.as_bytes()).expect("write entry");
        }
        writer.finish().expect("finish archive");
        path
    }

    /// Write an arbitrary file at `<root>/<name>`
    pub fn add_file(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root().join(name);
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// Engine configuration pointing at this tree
    ///
    /// `extra` goes first, so it may hold top-level keys such as
    /// `reference_curve` as well as `[archives]`, `[engine]` or
    /// `[power_curve]` sections.
    pub fn config(&self, extra: &str) -> EngineConfig {
        let root = self.root().display().to_string().replace('\\', "/");
        let toml = format!(
            "{extra}\n[store]\ntype = \"fs\"\nroot = \"{root}\"\n\n[registry]\nparameters = \"{root}/parameters.csv\"\n"
        );
        let path = self.add_file("config.toml", toml);
        EngineConfig::load(&path).expect("load config")
    }

    /// Engine built from [`ArchiveTree::config`]
    pub fn engine(&self, extra: &str) -> ArchiveEngine {
        ArchiveEngine::from_config(&self.config(extra)).expect("build engine")
    }
}

impl Default for ArchiveTree {
    fn default() -> Self {
        Self::new()
    }
}

/// One `MEAN` group; each point is `(code, average, min, max)`
pub fn mean(end: &str, points: &[(&str, &str, &str, &str)]) -> String {
    let dps: String = points
        .iter()
        .map(|(code, avg, min, max)| {
            format!(r#"<DP VAR_PK="{code}" MIN="{min}" MAX="{max}"><V>{avg}</V></DP>"#)
        })
        .collect();
    format!(r#"<MEAN END="{end}">{dps}</MEAN>"#)
}

/// A time-series log document
pub fn series_log(groups: &[String]) -> String {
    format!("<?xml version=\"1.0\"?>\n<LOG>{}</LOG>", groups.concat())
}

/// A statistics log document
pub fn statistics_log(body: &str) -> String {
    format!("<?xml version=\"1.0\"?>\n<LOG><STATISTIC>{body}</STATISTIC></LOG>")
}
