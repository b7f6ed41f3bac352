use clap::Parser;
use ipamark::{pipeline, IpamarkError, PipelineConfig, Result, TransformOp};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ipamark")]
#[command(about = "Stamps a status dot onto (or desaturates) the images inside an iOS .ipa")]
#[command(version)]
struct Cli {
    /// The archive to modify (.ipa/.tipa)
    #[arg(short, long, default_value = "app.ipa")]
    input: PathBuf,

    /// Output path for the modified archive
    #[arg(short, long, default_value = "modified_icon.ipa")]
    output: PathBuf,

    /// Working directory for intermediate files (removed when the run ends)
    #[arg(short, long, default_value = "output")]
    workdir: PathBuf,

    /// Rescale saturation to this percentage instead of stamping the dot
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=400))]
    saturation: Option<u32>,

    /// The compression level of the ipa (0-9, defaults to 6)
    #[arg(short = 'c', long, default_value = "6", value_parser = clap::value_parser!(u32).range(0..=9))]
    compress: u32,

    /// Overwrite an existing output file without confirming
    #[arg(long)]
    overwrite: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("[!] {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let input_ext = cli
        .input
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    if !matches!(input_ext.as_deref(), Some("ipa") | Some("tipa")) {
        return Err(IpamarkError::InvalidInput(
            "Input must be an .ipa or .tipa".to_string(),
        ));
    }

    if !cli.input.exists() {
        return Err(IpamarkError::FileNotFound(cli.input));
    }

    if cli.output.exists() && !cli.overwrite {
        print!("[<] {} already exists. overwrite? [Y/n] ", cli.output.display());
        std::io::stdout().flush()?;

        let mut response = String::new();
        std::io::stdin().read_line(&mut response)?;
        let response = response.trim().to_lowercase();

        if !matches!(response.as_str(), "y" | "yes" | "") {
            println!("[>] quitting.");
            return Ok(());
        }
    }

    let config = PipelineConfig {
        archive: cli.input,
        output: cli.output,
        workdir: cli.workdir,
        mode: match cli.saturation {
            Some(percent) => TransformOp::Saturation(percent),
            None => TransformOp::StatusDot,
        },
        compression_level: cli.compress,
    };

    let report = pipeline::run(&config)?;

    println!(
        "[*] transformed \x1b[96m{}\x1b[0m image(s)",
        report.transformed
    );
    if !report.failures.is_empty() {
        println!(
            "[!] skipped \x1b[96m{}\x1b[0m file(s):",
            report.failures.len()
        );
        for (path, reason) in &report.failures {
            println!("[!]   {}: {}", path.display(), reason);
        }
    }
    println!("[*] done: {}", config.output.display());

    Ok(())
}
