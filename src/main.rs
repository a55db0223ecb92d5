use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context};
use log::info;

use protoscribe::descriptor::DescriptorPool;
use protoscribe::options::{EnforceMode, Options};
use protoscribe::proto::FileDescriptorSet;
use protoscribe::{Backend, GeneratorContext};

/// Sink writing generated files under an output directory, creating parent
/// directories as needed.
struct DirContext {
    root: PathBuf,
}

impl GeneratorContext for DirContext {
    fn write_file(&mut self, path: &str, contents: &[u8]) -> io::Result<()> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, contents)?;
        info!("wrote {}", full.display());
        Ok(())
    }
}

struct Args {
    backend: Backend,
    out_dir: PathBuf,
    input: String,
    options: Options,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut backend = None;
    let mut out_dir = PathBuf::from(".");
    let mut input = None;
    let mut options = Options::default();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.is_empty() {
        print_usage();
        bail!("missing arguments");
    }
    for arg in &argv {
        if let Some(value) = arg.strip_prefix("--backend=") {
            backend = Some(match value {
                "cpp" => Backend::Cpp,
                "java" => Backend::Java,
                "kotlin" => Backend::Kotlin,
                "objc" => Backend::ObjectiveC,
                other => bail!("unknown backend {other:?}"),
            });
        } else if let Some(value) = arg.strip_prefix("--out=") {
            out_dir = PathBuf::from(value);
        } else if arg == "--lite" {
            options.enforce_mode = EnforceMode::LiteRuntime;
        } else if arg == "--code-size" {
            options.enforce_mode = EnforceMode::CodeSize;
        } else if arg == "--annotate" {
            options.annotate_code = true;
        } else if arg == "--strip-nonfunctional" {
            options.strip_nonfunctional_codegen = true;
        } else if arg.starts_with("--") {
            bail!("unknown flag {arg:?}");
        } else if input.is_none() {
            input = Some(arg.clone());
        } else {
            bail!("unexpected argument {arg:?}");
        }
    }
    let Some(backend) = backend else {
        print_usage();
        bail!("--backend is required");
    };
    let Some(input) = input else {
        print_usage();
        bail!("descriptor input is required");
    };
    Ok(Args {
        backend,
        out_dir,
        input,
        options,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let bytes = if args.input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(&args.input).with_context(|| format!("reading {}", args.input))?
    };
    let set: FileDescriptorSet =
        serde_json::from_slice(&bytes).context("parsing FileDescriptorSet JSON")?;
    info!("loaded descriptor set with {} files", set.file.len());

    // Files arrive dependency-first, the order protoc emits them in.
    let mut pool = DescriptorPool::new();
    for proto in &set.file {
        pool.add_file(proto)
            .with_context(|| format!("linking {}", proto.name))?;
    }

    let mut context = DirContext {
        root: args.out_dir.clone(),
    };
    for proto in &set.file {
        let fd = pool
            .file_by_name(&proto.name)
            .context("file vanished from pool")?;
        protoscribe::generate(fd, args.backend, &args.options, &mut context)
            .with_context(|| format!("generating for {}", proto.name))?;
    }
    Ok(())
}

fn print_usage() {
    eprintln!("protoscribe code generator");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  protoscribe-codegen --backend=<cpp|java|kotlin|objc> [--out=DIR] <set.json>");
    eprintln!("  protoscribe-codegen --backend=cpp - < set.json");
    eprintln!();
    eprintln!("FLAGS:");
    eprintln!("  --lite                  lite-runtime enforce mode");
    eprintln!("  --code-size             code-size enforce mode");
    eprintln!("  --annotate              emit .meta annotation sidecars");
    eprintln!("  --strip-nonfunctional   omit comments and embedded descriptors");
    eprintln!();
    eprintln!("The input is a FileDescriptorSet in JSON form, dependencies first.");
}
