use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use vitetags_core::version::version_string;
use vitetags_core::{SCHEMA_VERSION, VERSION};

#[derive(Serialize)]
struct VersionReport {
    schema_version: u32,
    version: &'static str,
}

pub fn run(json: bool) -> Result<()> {
    if json {
        let report = VersionReport {
            schema_version: SCHEMA_VERSION,
            version: VERSION,
        };
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
