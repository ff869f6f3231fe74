use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use vitetags_core::{
    Config, DanglingImport, Manifest, ManifestEntry, ManifestProvider, SCHEMA_VERSION,
};
use walkdir::WalkDir;

/// Directory Vite writes its own metadata (including the manifest) into.
const VITE_META_DIR: &str = ".vite";

#[derive(Serialize)]
struct CheckReport<'a> {
    schema_version: u32,
    ok: bool,
    manifest: PathBuf,
    output_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    entries: usize,
    entry_points: Vec<&'a str>,
    /// Imports naming keys the manifest does not have.
    dangling_imports: Vec<DanglingImport>,
    /// Built paths the manifest references that are not on disk.
    missing_files: Vec<String>,
    /// Files in the output directory no entry references.
    unreferenced_files: Vec<String>,
}

/// Run the check command.
///
/// Fails (exit status 1) on an unreadable manifest, dangling imports or
/// missing built files. Unreferenced files are reported only, since Vite
/// copies `public/` into the output as-is.
pub fn run(config: &Config, public_root: &Path, json: bool) -> Result<()> {
    let output_dir = public_root.join(&config.output_base);

    let manifest = match Manifest::load(&config.manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            let report = CheckReport {
                schema_version: SCHEMA_VERSION,
                ok: false,
                manifest: config.manifest_path.clone(),
                output_dir,
                error: Some(e.to_string()),
                entries: 0,
                entry_points: Vec::new(),
                dangling_imports: Vec::new(),
                missing_files: Vec::new(),
                unreferenced_files: Vec::new(),
            };
            print_report(&report, json)?;
            std::process::exit(1);
        }
    };

    let provider = ManifestProvider::from_manifest(manifest.clone(), &config.output_base);
    let referenced = manifest.referenced_files();

    let missing_files: Vec<String> = referenced
        .iter()
        .filter_map(|file| provider.resolve_path(&ManifestEntry::adhoc(*file)))
        .filter(|path| !public_root.join(path).is_file())
        .collect();

    let unreferenced_files = unreferenced_files(&output_dir, &referenced);

    let dangling_imports = manifest.dangling_imports();
    let ok = dangling_imports.is_empty() && missing_files.is_empty();
    tracing::debug!(
        entries = manifest.len(),
        dangling = dangling_imports.len(),
        missing = missing_files.len(),
        unreferenced = unreferenced_files.len(),
        "manifest checked"
    );

    let report = CheckReport {
        schema_version: SCHEMA_VERSION,
        ok,
        manifest: config.manifest_path.clone(),
        output_dir,
        error: None,
        entries: manifest.len(),
        entry_points: manifest.entry_points(),
        dangling_imports,
        missing_files,
        unreferenced_files,
    };
    print_report(&report, json)?;

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Files under `output_dir`, relative and slash-separated, that are not in
/// `referenced`. Vite's metadata directory is skipped.
fn unreferenced_files(output_dir: &Path, referenced: &BTreeSet<&str>) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(output_dir)
        .into_iter()
        .filter_entry(|entry| entry.depth() != 1 || entry.file_name() != VITE_META_DIR)
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable output entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(output_dir).ok()?;
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            (!referenced.contains(relative.as_str())).then_some(relative)
        })
        .collect();
    files.sort();
    files
}

fn print_report(report: &CheckReport<'_>, json: bool) -> Result<()> {
    if json {
        let json = serde_json::to_string_pretty(report).into_diagnostic()?;
        println!("{json}");
        return Ok(());
    }

    let mut out = io::stdout().lock();
    w(&mut out, &format!("Manifest:    {}\n", report.manifest.display()))?;
    if let Some(error) = &report.error {
        w(&mut out, &format!("  \x1b[31merror\x1b[0m {error}\n"))?;
        return Ok(());
    }
    w(&mut out, &format!("Output dir:  {}\n", report.output_dir.display()))?;
    w(
        &mut out,
        &format!(
            "Entries:     {} ({} entry points)\n\n",
            report.entries,
            report.entry_points.len()
        ),
    )?;

    for dangling in &report.dangling_imports {
        w(
            &mut out,
            &format!(
                "  [\x1b[31merror\x1b[0m] {} imports unknown key {}\n",
                dangling.owner, dangling.import
            ),
        )?;
    }
    for path in &report.missing_files {
        w(&mut out, &format!("  [\x1b[31merror\x1b[0m] missing built file {path}\n"))?;
    }
    for file in &report.unreferenced_files {
        w(&mut out, &format!("  [\x1b[34minfo\x1b[0m] unreferenced {file}\n"))?;
    }

    if report.ok {
        w(&mut out, "\x1b[32mManifest OK\x1b[0m\n")?;
    } else {
        w(&mut out, "\x1b[31mManifest has problems\x1b[0m\n")?;
    }
    Ok(())
}

fn w(out: &mut impl Write, s: &str) -> Result<()> {
    out.write_all(s.as_bytes()).into_diagnostic()
}
