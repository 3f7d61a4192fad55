use colored::Colorize;
use serde::Serialize;

use memviz::{
    Architecture, BlockKind, CacheLineAnalysis, Layout, OptimizationResult, PrimitiveType,
    consolidate_entries, rounded_percent,
};

use crate::app::GlobalOptions;

/// Print `data` as JSON (if `--json`) or call `display_fn` for human-readable output.
pub fn print_output<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    display_fn: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if opts.json {
        let json = serde_json::to_string_pretty(data)?;
        println!("{json}");
    } else {
        display_fn(data);
    }
    Ok(())
}

fn print_header(name: &str, layout: &Layout) {
    let percent = rounded_percent(layout.padding_bytes, layout.total_size);
    let padding = format!("{} padding ({percent}%)", layout.padding_bytes);
    let padding = if layout.padding_bytes == 0 {
        padding.green()
    } else {
        padding.yellow()
    };
    println!(
        "{}  {} bytes  align {}  data {}  {}",
        name.bold(),
        layout.total_size,
        layout.max_align,
        layout.data_bytes,
        padding
    );
}

/// Offset table for one struct, consolidated above `max_blocks` entries.
pub fn print_layout(name: &str, layout: &Layout, max_blocks: usize) {
    print_header(name, layout);
    if layout.entries.is_empty() {
        println!("  {}", "(no fields)".dimmed());
        println!();
        return;
    }

    println!("  {:>6}  {:>5}  {}", "offset".dimmed(), "size".dimmed(), "field".dimmed());
    for block in consolidate_entries(&layout.entries, max_blocks) {
        match block.kind {
            BlockKind::Field => {
                let ty = block.ty.map(PrimitiveType::label).unwrap_or_default();
                println!(
                    "  {:>6}  {:>5}  {} {}",
                    block.offset,
                    block.size,
                    block.label,
                    ty.cyan()
                );
            }
            BlockKind::Padding => println!(
                "  {:>6}  {:>5}  {}",
                block.offset,
                block.size,
                "[padding]".yellow()
            ),
        }
    }
    println!();
}

pub fn print_optimization(name: &str, result: &OptimizationResult) {
    print_header(name, &result.original);
    if result.is_already_optimal() {
        println!("  {}", "Already optimal".green());
    } else {
        println!(
            "  {} {} bytes (-{})",
            "optimized:".bold(),
            result.optimized.total_size,
            result.bytes_saved
        );
        println!(
            "  {}",
            format!(
                "Save {} bytes ({}% reduction)",
                result.bytes_saved,
                result.savings_percent()
            )
            .green()
        );
        println!("  {} {}", "order:".bold(), result.reordered_field_names.join(", "));
    }
    println!();
}

pub fn print_cache(name: &str, layout: &Layout, analysis: &CacheLineAnalysis) {
    print_header(name, layout);
    println!(
        "  {} line(s) of {} bytes",
        analysis.lines_spanned(),
        analysis.line_size
    );
    for line in &analysis.lines {
        println!(
            "  line {:>3}  [{:>5}, {:>5})  used {:>3}  padding {:>3}  {}",
            line.line_number,
            line.start_offset,
            line.end_offset,
            line.bytes_used,
            line.bytes_padding,
            line.fields.join(", ").dimmed()
        );
    }

    let hot = analysis.hot_fields();
    if !hot.is_empty() {
        println!("  {} {}", "crosses a line:".red().bold(), hot.join(", "));
    }
    println!();
}

pub fn print_types(arch: Architecture) {
    let bits = if arch.is_64_bit() { 64 } else { 32 };
    println!(
        "{} ({bits}-bit, {}-byte words)",
        arch.to_string().bold(),
        arch.word_size()
    );
    println!("  {:<12} {:>4} {:>5}", "type".dimmed(), "size".dimmed(), "align".dimmed());
    for ty in PrimitiveType::ALL {
        let info = ty.info(arch);
        println!("  {:<12} {:>4} {:>5}", ty.label(), info.size, info.align);
    }
}
