use anyhow::{Context, Result};
use bt2ts::{
    Category, CollisionPolicy, ContainerKind, FileClassifier, PackageIndex, PackageMetadata,
    Pipeline, RepackOptions, scan_tree,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "bt2ts", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rebuild a mod archive into the mod-manager folder layout
    Repack(RepackArgs),
    /// Show how an already extracted tree would be sorted
    Classify(ClassifyArgs),
}

#[derive(Debug, Args)]
struct RepackArgs {
    archive: PathBuf,

    /// Container format; inferred from the file name or contents when omitted
    #[arg(long, value_enum)]
    kind: Option<KindArg>,

    /// Directory for the scratch tree, build root and package
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Package metadata JSON; enables manifest.json and README.md
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Saved package registry listing used to resolve dependencies
    #[arg(long)]
    package_index: Option<PathBuf>,

    /// Zip the build root into <package>-<version>.zip
    #[arg(long, requires = "metadata")]
    pack: bool,

    #[arg(long, value_enum, default_value_t = CollisionArg::Reject)]
    on_collision: CollisionArg,

    /// Leave the scratch directory behind if the run fails
    #[arg(long)]
    keep_scratch: bool,
}

#[derive(Debug, Args)]
struct ClassifyArgs {
    dir: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Zip,
    #[value(name = "7z")]
    SevenZip,
}

impl From<KindArg> for ContainerKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Zip => ContainerKind::Zip,
            KindArg::SevenZip => ContainerKind::SevenZip,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CollisionArg {
    Reject,
    Overwrite,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(policy: CollisionArg) -> Self {
        match policy {
            CollisionArg::Reject => CollisionPolicy::Reject,
            CollisionArg::Overwrite => CollisionPolicy::Overwrite,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.cmd {
        Command::Repack(args) => repack(args),
        Command::Classify(args) => classify(args),
    }
}

fn repack(args: RepackArgs) -> Result<()> {
    let start_time = Instant::now();

    let kind = match args.kind {
        Some(kind) => kind.into(),
        None => ContainerKind::infer(&args.archive)
            .with_context(|| format!("Cannot tell the format of {}", args.archive.display()))?,
    };

    let mut options = RepackOptions::new(&args.work_dir)
        .collision_policy(args.on_collision.into())
        .keep_scratch_on_failure(args.keep_scratch)
        .pack(args.pack);

    if let Some(path) = &args.metadata {
        let metadata = PackageMetadata::load(path).context("Failed to load package metadata")?;
        println!("Package name: {}", metadata.package_name()?);
        options = options.metadata(metadata);
    }
    if let Some(path) = &args.package_index {
        let index = PackageIndex::load(path).context("Failed to load package index")?;
        options = options.package_index(index);
    }

    let report = Pipeline::new(options)
        .run(&args.archive, kind)
        .with_context(|| format!("Failed to repack {}", args.archive.display()))?;

    println!("✓ Built {}", report.build_root.display());
    for (category, count) in &report.counts {
        if *count > 0 {
            println!("  {:<22} {}", category.to_string(), count);
        }
    }

    if let Some(manifest) = &report.manifest {
        println!("✓ Wrote manifest for {} {}", manifest.name, manifest.version_number);
        for dependency in &manifest.dependencies {
            println!("  depends on {}", dependency);
        }
    }

    match &report.package {
        Some(package) => {
            println!("✓ Packaged {} ({} files)", package.path.display(), package.entries.len());
            println!("  sha256 {}", package.sha256);
        }
        None if report.manifest.is_some() => {
            println!(
                "Add an icon.png (256x256) to {} and zip its contents to upload",
                report.build_root.display()
            );
        }
        None => {}
    }

    println!("\nDone in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

fn classify(args: ClassifyArgs) -> Result<()> {
    let entries = scan_tree(&args.dir)
        .with_context(|| format!("Failed to scan {}", args.dir.display()))?;
    let result = FileClassifier::for_scratch_root(&args.dir)
        .classify(&entries)
        .context("Failed to classify files")?;

    for category in Category::ALL {
        let files = result.files(category);
        if files.is_empty() {
            continue;
        }
        println!("{} ({}):", category, files.len());
        for entry in files {
            println!("  {}", entry.relative_path);
        }
    }

    let flags = result.flags();
    println!(
        "\nsideloader: {}  deli: {}  lvo: {}",
        flags.sideloader, flags.deli, flags.lvo
    );
    Ok(())
}
