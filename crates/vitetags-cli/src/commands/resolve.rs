use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use vitetags_core::{
    AssetContext, Config, DevServerProbe, ManifestProvider, RequirementsBuffer, ScriptOptions,
    SimpleUrlGenerator, StyleOptions, SCHEMA_VERSION,
};

/// Arguments of `vitetags resolve`.
#[derive(Debug)]
pub struct ResolveAction {
    pub entry: String,
    pub css: bool,
    pub media: Option<String>,
    pub preload: bool,
    pub options: Option<String>,
    pub base_url: String,
    pub public_root: PathBuf,
    pub verify: bool,
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    schema_version: u32,
    entry: &'a str,
    mode: &'static str,
    dev_server: bool,
    found: bool,
    head: Vec<String>,
    body: Vec<String>,
    suppressed: Vec<Suppressed>,
}

#[derive(Serialize)]
struct Suppressed {
    file: String,
    path: String,
}

/// Render the tags a page requiring the entry would receive.
pub fn run(config: &Config, action: &ResolveAction, json: bool) -> Result<()> {
    let provider = ManifestProvider::new(config);
    let probe = DevServerProbe::new(config);
    let mut urls = SimpleUrlGenerator::new(&action.base_url, &action.public_root)
        .with_verify_exists(action.verify);
    let mut page = RequirementsBuffer::new();

    let mut assets =
        AssetContext::new(&provider, &probe, &mut urls, &mut page).with_config(config);
    if action.css {
        let mut options = match &action.options {
            Some(raw) => StyleOptions::from_json(raw).into_diagnostic()?,
            None => StyleOptions::new(),
        };
        options.preload &= action.preload;
        assets
            .css(&action.entry, action.media.as_deref(), &options)
            .into_diagnostic()?;
    } else {
        let mut options = match &action.options {
            Some(raw) => ScriptOptions::from_json(raw).into_diagnostic()?,
            None => ScriptOptions::new(),
        };
        options.preload &= action.preload;
        assets.javascript(&action.entry, &options).into_diagnostic()?;
    }

    let suppressed: Vec<Suppressed> = assets
        .suppression()
        .iter()
        .map(|(file, path)| Suppressed {
            file: file.to_string(),
            path: path.to_string(),
        })
        .collect();
    drop(assets);

    let dev_server = probe.is_running();
    let found = dev_server || provider.resolve_resource(&action.entry).is_some();
    if !found {
        tracing::warn!(entry = %action.entry, "entry is not in the manifest");
    }

    if json {
        let report = ResolveReport {
            schema_version: SCHEMA_VERSION,
            entry: &action.entry,
            mode: config.mode.as_str(),
            dev_server,
            found,
            head: page.render_head(),
            body: page.render_body(),
            suppressed,
        };
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
    } else {
        for tag in page.render_head().iter().chain(&page.render_body()) {
            println!("{tag}");
        }
    }

    Ok(())
}
