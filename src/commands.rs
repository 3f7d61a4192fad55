use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use memviz::input::load_definitions;
use memviz::{
    AnalyzerConfig, Architecture, ExportFormat, LayoutOptions, MemoryLayout, OptimizationResult,
    optimize_with,
};
use memviz_utils::Stopwatch;

use crate::app::GlobalOptions;
use crate::output::{print_cache, print_layout, print_optimization, print_output, print_types};

/// Build the effective configuration: file, then environment, then flags.
pub fn resolve_config(opts: &GlobalOptions) -> Result<AnalyzerConfig> {
    let mut config = match &opts.config {
        Some(path) => AnalyzerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
            .merge_with_env(),
        None => AnalyzerConfig::from_env(),
    };

    if let Some(arch) = &opts.arch {
        config.architecture = arch.parse::<Architecture>()?;
    }
    if opts.strict {
        config.unknown_types = memviz::UnknownTypePolicy::Strict;
    }
    if let Some(line_size) = opts.line_size {
        config.cache_line_size = line_size;
    }
    config.validate()?;

    debug!(?config, "resolved configuration");
    Ok(config)
}

fn analyze(path: &Path, config: &AnalyzerConfig) -> Result<MemoryLayout> {
    let definitions = load_definitions(path)?;
    let watch = Stopwatch::start_new();
    let memory = MemoryLayout::analyze(&definitions, config.architecture, &config.layout_options())
        .with_context(|| format!("failed to lay out structs from {}", path.display()))?;
    debug!(elapsed_us = watch.elapsed_us(), "analysis finished");
    Ok(memory)
}

pub fn layout(path: &Path, opts: &GlobalOptions) -> Result<()> {
    let config = resolve_config(opts)?;
    let memory = analyze(path, &config)?;
    print_output(&memory, opts, |memory| {
        for info in &memory.structs {
            print_layout(&info.name, &info.layout, config.max_display_blocks);
        }
    })
}

#[derive(Serialize)]
struct NamedOptimization {
    name: String,
    #[serde(flatten)]
    result: OptimizationResult,
}

pub fn optimize(path: &Path, opts: &GlobalOptions) -> Result<()> {
    let config = resolve_config(opts)?;
    let options: LayoutOptions = config.layout_options();
    let results = load_definitions(path)?
        .into_iter()
        .map(|def| -> Result<NamedOptimization> {
            let result = optimize_with(&def.fields, config.architecture, &options)
                .with_context(|| format!("failed to optimize `{}`", def.name))?;
            Ok(NamedOptimization {
                name: def.name,
                result,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let saved: u64 = results.iter().map(|r| u64::from(r.result.bytes_saved)).sum();
    info!(structs = results.len(), saved, "optimization finished");

    print_output(&results, opts, |results| {
        for named in results {
            print_optimization(&named.name, &named.result);
        }
    })
}

pub fn cache(path: &Path, opts: &GlobalOptions) -> Result<()> {
    let config = resolve_config(opts)?;
    let memory = analyze(path, &config)?;
    print_output(&memory, opts, |memory| {
        for info in &memory.structs {
            print_cache(&info.name, &info.layout, &info.cache);
        }
    })
}

pub fn export(path: &Path, output: Option<&Path>, opts: &GlobalOptions) -> Result<()> {
    let config = resolve_config(opts)?;
    let memory = analyze(path, &config)?;
    let document = ExportFormat::from_memory_layout(&memory, Utc::now());
    let json = document.to_json_pretty()?;

    match output {
        Some(out) => {
            fs::write(out, json)
                .with_context(|| format!("failed to write export file {}", out.display()))?;
            info!(path = %out.display(), structs = document.structs.len(), "wrote export");
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn types(opts: &GlobalOptions) -> Result<()> {
    let config = resolve_config(opts)?;
    let arch = config.architecture;
    let table: Vec<_> = memviz::PrimitiveType::ALL
        .iter()
        .map(|ty| (ty.name(), ty.info(arch)))
        .collect();
    print_output(&table, opts, |_| print_types(arch))
}
