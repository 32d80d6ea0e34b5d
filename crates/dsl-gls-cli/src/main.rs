use anyhow::{Context, Result, bail};
use dsl_gls_config::Config;
use dsl_gls_engine::{
    DEFAULT_DICTIONARY_ID, DslDictionary, annotation_description, find_abbreviation_file,
    write_glossary,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::{env, process};

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <dsl-file> <gls-file>", args[0]);
        process::exit(1);
    }
    let source = PathBuf::from(&args[1]);
    let output = PathBuf::from(&args[2]);

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    match convert(&source, &output, &config) {
        Ok(entries) => log::info!("wrote {entries} entries to {}", output.display()),
        Err(e) => {
            eprintln!("Conversion failed: {e:#}");
            process::exit(1);
        }
    }
}

/// Converts `source` into a glossary at `output`; returns the entry count.
fn convert(source: &Path, output: &Path, config: &Config) -> Result<usize> {
    if is_same_file(source, output) {
        bail!("source and output names must be different");
    }

    let abbreviations = find_abbreviation_file(source);
    if let Some(path) = &abbreviations {
        log::info!("using abbreviations from {}", path.display());
    }
    let dictionary_id = config
        .dictionary_id
        .as_deref()
        .unwrap_or(DEFAULT_DICTIONARY_ID);

    let dictionary = DslDictionary::open(source, abbreviations.as_deref(), dictionary_id)
        .with_context(|| format!("cannot read dictionary {}", source.display()))?;
    let description = annotation_description(source)
        .with_context(|| format!("cannot read annotation for {}", source.display()))?;

    let file = File::create(output)
        .with_context(|| format!("cannot create output file {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    let entries = write_glossary(
        &mut writer,
        &dictionary,
        &config.author,
        description.as_deref(),
    )
    .with_context(|| format!("cannot write {}", output.display()))?;
    Ok(entries)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
