use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use vm_translator::TranslateOptions;
use vm_translator::translate::{SourceUnit, order_units, unit_name};

#[derive(Parser)]
#[command(name = "vmtranslator")]
#[command(about = "Stack VM to Hack assembly translator", version)]
struct Cli {
    #[arg(help = "Input .vm file or directory of .vm files")]
    input: PathBuf,

    #[arg(
        short,
        long,
        help = "Output .asm file (default: Foo.vm -> Foo.asm, Dir/ -> Dir/Dir.asm)"
    )]
    output: Option<PathBuf>,

    #[arg(
        long,
        overrides_with = "no_bootstrap",
        help = "Emit bootstrap code (default for directories)"
    )]
    bootstrap: bool,

    #[arg(
        long,
        overrides_with = "bootstrap",
        help = "Omit bootstrap code (default for single files)"
    )]
    no_bootstrap: bool,

    #[arg(long, help = "Precede each command's code with a `// command` line")]
    annotate: bool,

    #[arg(long, help = "Do not reject goto/if-goto targets that are never declared")]
    no_label_check: bool,
}

/// Units to translate and where their output goes by default.
struct Job {
    units: Vec<SourceUnit>,
    default_output: PathBuf,
    is_program: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let job = load_job(&cli.input)?;

    let options = TranslateOptions {
        bootstrap: if cli.bootstrap || cli.no_bootstrap {
            cli.bootstrap
        } else {
            job.is_program
        },
        annotate: cli.annotate,
        check_labels: !cli.no_label_check,
        ..TranslateOptions::default()
    };
    let output = cli.output.unwrap_or(job.default_output);

    run(&job.units, &options, &output)?;
    println!(
        "Translated {} unit(s) from {} -> {}",
        job.units.len(),
        cli.input.display(),
        output.display()
    );
    Ok(())
}

fn run(units: &[SourceUnit], options: &TranslateOptions, output: &Path) -> Result<()> {
    let file = fs::File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut out = BufWriter::new(file);
    vm_translator::translate_to(units, options, &mut out).context("Translation failed")?;
    Ok(())
}

fn load_job(input: &Path) -> Result<Job> {
    if input.is_dir() {
        load_directory(input)
    } else {
        load_file(input)
    }
}

fn load_file(path: &Path) -> Result<Job> {
    if !is_vm_file(path) {
        bail!("{} is not a .vm file", path.display());
    }
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Job {
        units: vec![SourceUnit::new(unit_name(path), source)],
        default_output: path.with_extension("asm"),
        is_program: false,
    })
}

fn load_directory(dir: &Path) -> Result<Job> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read directory {}", dir.display()))?
            .path();
        if path.is_file() && is_vm_file(&path) {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        bail!("no .vm files in {}", dir.display());
    }
    paths.sort();

    let mut units = Vec::with_capacity(paths.len());
    for path in &paths {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        units.push(SourceUnit::new(unit_name(path), source));
    }
    order_units(&mut units, &TranslateOptions::default().entry_function);

    Ok(Job {
        units,
        default_output: dir.join(format!("{}.asm", directory_name(dir)?)),
        is_program: true,
    })
}

/// Last path component of `dir`, resolving `.` and friends.
fn directory_name(dir: &Path) -> Result<String> {
    let resolved = if dir.file_name().is_some() {
        dir.to_path_buf()
    } else {
        dir.canonicalize()
            .with_context(|| format!("Failed to resolve {}", dir.display()))?
    };
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no directory name", dir.display()))
}

fn is_vm_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "vm")
}
