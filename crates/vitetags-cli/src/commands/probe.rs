use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use vitetags_core::{Config, DevServerProbe, DevServerState, SCHEMA_VERSION};

#[derive(Serialize)]
struct ProbeReport<'a> {
    schema_version: u32,
    mode: &'static str,
    timeout_ms: u64,
    #[serde(flatten)]
    state: &'a DevServerState,
}

/// Run the probe command.
///
/// Exits with status 1 when no dev server is reachable, so scripts can branch
/// on it.
pub fn run(config: &Config, json: bool) -> Result<()> {
    let probe = DevServerProbe::new(config);
    let state = probe.state();

    if json {
        let report = ProbeReport {
            schema_version: SCHEMA_VERSION,
            mode: config.mode.as_str(),
            timeout_ms: config.probe_timeout_ms,
            state,
        };
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
    } else if state.running {
        println!(
            "dev server running at {}",
            state.base_url.as_deref().unwrap_or_default()
        );
    } else if config.mode.is_live() {
        println!("dev server disabled in live mode");
    } else if let Some(check_url) = &state.check_url {
        println!("dev server not reachable at {check_url}");
    } else {
        println!("no dev server configured");
        println!("hint: set DEV_SERVER_URL or dev_server_url in vitetags.json");
    }

    if !state.running {
        std::process::exit(1);
    }
    Ok(())
}
