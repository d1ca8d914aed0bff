//! trackscan CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use trackscan::{
    collect_repo_details, custom, render, scan_directory, write_output, Cli, ProviderRegistry,
    ScanOptions, SourceOverrides, TrackingSchema,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run(cli: &Cli) -> trackscan::Result<()> {
    // input validation happens before any file is touched
    let custom_functions = custom::parse_signatures(&cli.custom_functions)?;
    let registry = ProviderRegistry::builtin()?;

    let options = ScanOptions {
        ignore: cli.ignore.clone(),
        custom_functions,
    };

    let report = scan_directory(&cli.path, &registry, &options)?;

    if cli.verbose {
        eprintln!(
            "Scanned {} files ({} skipped), found {} events",
            report.files_scanned,
            report.parse_errors,
            report.events.len()
        );
    }

    let source = collect_repo_details(
        &cli.path,
        &SourceOverrides {
            repository_url: cli.repository_url.clone(),
            commit_hash: cli.commit_hash.clone(),
            commit_timestamp: cli.commit_timestamp.clone(),
        },
    );

    let schema = TrackingSchema::new(report.events, source);
    let document = render(&schema, cli.format)?;

    if cli.stdout {
        write_output(&document, None)?;
    } else {
        write_output(&document, Some(&cli.output))?;
        println!("Tracking schema written to {}", cli.output.display());
    }

    Ok(())
}
