//! Subcommand handlers: validate and generate.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use sesamegen_config::{COMPONENT_NAME, ConfigError, Document};
use sesamegen_core::{CodegenUnit, Statement, registry, resolve_modules};

use crate::cli::{GenerateArgs, GlobalOpts, OutputFormat, ValidateArgs};
use crate::error::CliError;

// ── Shared pipeline ──────────────────────────────────────────────────

fn load_document(path: &Path) -> Result<Document, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Document::from_yaml(&text)?)
}

/// Resolve modules, then run every registered generator over the
/// document. The whole pass fails on the first error.
fn build_unit(doc: &Document) -> Result<CodegenUnit, CliError> {
    if !doc.has_module(COMPONENT_NAME) {
        return Err(ConfigError::MissingComponent {
            component: COMPONENT_NAME,
        }
        .into());
    }
    resolve_modules(doc.module_names())?;

    let mut unit = CodegenUnit::new();
    for name in doc.module_names() {
        if let Some(manifest) = registry().get(name) {
            tracing::debug!(component = name, "generating registration statements");
            (manifest.generate)(doc, &mut unit)?;
        }
    }
    Ok(unit)
}

// ── validate ─────────────────────────────────────────────────────────

pub fn handle_validate(args: &ValidateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let doc = load_document(&args.config)?;
    let unit = build_unit(&doc)?;

    if !global.quiet {
        let config = doc.server_config().map_err(CliError::Config)?;
        let entities = unit
            .statements
            .iter()
            .filter(|s| matches!(s, Statement::RegisterEntity { .. }))
            .count();
        println!(
            "configuration valid: 1 server, {} trigger(s), {} entity declaration(s), {} statement(s)",
            config.triggers.len(),
            entities,
            unit.statements.len()
        );
    }
    Ok(())
}

// ── generate ─────────────────────────────────────────────────────────

pub fn handle_generate(args: &GenerateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let doc = load_document(&args.config)?;
    let unit = build_unit(&doc)?;

    let rendered = match args.format {
        OutputFormat::Cpp => unit.to_string(),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&unit).expect("serialization should not fail")
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered).map_err(|source| CliError::WriteOutput {
                path: path.display().to_string(),
                source,
            })?;
            if !global.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{}", rendered.trim_end());
        }
    }
    Ok(())
}
