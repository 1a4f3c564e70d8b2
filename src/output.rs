use colored::{ColoredString, Colorize};
use tidyscan::utils::{display_path, format_size};
use tidyscan::{AnalysisResult, PluginDescriptor, Report, SafetyLevel};

pub fn print_banner() {
    println!(
        "{}",
        concat!("tidyscan - read-only cleanup analysis v", env!("CARGO_PKG_VERSION"))
            .bold()
            .cyan()
    );
    println!();
}

fn print_header(label: &str) {
    println!("{}", format!("=== {label} ===").bold().white());
}

fn level_tag(level: SafetyLevel) -> ColoredString {
    let label = format!("{:<9}", level.label());
    match level {
        SafetyLevel::Critical => label.red().bold(),
        SafetyLevel::Important => label.red(),
        SafetyLevel::Moderate => label.yellow(),
        SafetyLevel::Safe => label.green(),
        SafetyLevel::VerySafe => label.green().bold(),
    }
}

fn print_result(result: &AnalysisResult) {
    println!(
        "  {} {:>3}  {:<7} {:>10}  {}",
        level_tag(result.level()),
        result.score(),
        result.recommendation().label(),
        format_size(result.size()).yellow(),
        display_path(result.path()).dimmed()
    );
}

fn print_list(label: &str, results: &[AnalysisResult]) {
    if results.is_empty() {
        return;
    }
    print_header(label);
    for result in results {
        print_result(result);
    }
    println!();
}

pub fn print_report(report: &Report) {
    for category in &report.categories {
        print_header(&category.name);
        for result in &category.top_files {
            print_result(result);
        }
        println!(
            "  {} {} in {} files, {} reclaimable",
            format!("{} total:", category.name).bold(),
            format_size(category.total_bytes).green(),
            category.file_count,
            format_size(category.reclaimable_bytes).green()
        );
        if category.access_errors > 0 {
            println!(
                "  {}",
                format!("{} entries could not be read", category.access_errors).dimmed()
            );
        }
        println!();
    }

    print_list("Largest files", &report.large_files);
    print_list("Old files", &report.old_files);
    print_list("Recommendations", &report.recommendations);

    print_header("Summary");
    println!("  {:<30} {}", "Files analyzed:", report.file_count);
    println!("  {:<30} {}", "Total size:", format_size(report.total_bytes).green());
    if let Some(disk) = &report.disk {
        println!(
            "  {:<30} {} of {} ({:.0}%)",
            "Disk used:",
            format_size(disk.used_bytes),
            format_size(disk.total_bytes),
            disk.usage_percent() * 100.0
        );
    }
    println!("  {}", "─".repeat(45).dimmed());
    println!(
        "  {:<30} {}",
        "Total reclaimable:".bold(),
        format_size(report.reclaimable_bytes).green().bold()
    );
    println!();

    for error in &report.plugin_errors {
        print_warning(&format!("{}: {}", error.plugin, error.message));
    }
    if report.incomplete {
        print_warning("analysis was cancelled; totals are partial");
    }
    if !report.is_trustworthy() {
        print_info("some locations were skipped, so totals may be understated");
    }
    println!(
        "{}",
        "Nothing was deleted. This report is read-only.".yellow().bold()
    );
}

pub fn print_plugins(plugins: &[PluginDescriptor]) {
    print_header("Plugins");
    for plugin in plugins {
        let state = if plugin.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        println!(
            "  {:<22} {:<12} {:>4}  {}",
            plugin.name.bold(),
            plugin.category,
            plugin.priority,
            state
        );
        for root in &plugin.candidate_roots {
            println!("      {}", root.dimmed());
        }
    }
}

pub fn print_inspect(result: &AnalysisResult) {
    print_result(result);
}

pub fn print_valid(path: &str) {
    println!("{} {}", "OK".green().bold(), path);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "Warning:".red().bold(), msg.red());
}

pub fn print_info(msg: &str) {
    println!("{} {}", "Info:".cyan().bold(), msg);
}
