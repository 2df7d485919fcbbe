use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use kernelgen::batch;
use kernelgen::config::GenConfig;
use kernelgen::expr::{assign, fma, index};
use kernelgen::kernel::{Kernel, Statement};
use kernelgen::{
    Architecture, Catalog, Direction, IntrinsicOp, Language, NumericType, Parameter, Procedure,
    TransitionRegistry, TypedOperand,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "kernelgen",
    version,
    about = "Retargetable SIMD kernel generator for C, OpenCL C, CUDA and Fortran"
)]
struct Cli {
    /// Config file (default: nearest kernelgen.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Target architecture: generic, x86, arm, mppa
    #[arg(long, global = true)]
    arch: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up the intrinsic implementing an operation on a type
    Lookup {
        /// Operation: add, sub, mul, div, load, load_aligned, store,
        /// store_aligned, set, set1, set_lane, mask_load, mask_store, fmadd
        op: String,
        /// Numeric type, e.g. f32x8
        #[arg(value_name = "TYPE")]
        ty: String,
    },
    /// Show the conversion chain between two vector types
    Path {
        from: String,
        to: String,
    },
    /// List every intrinsic and conversion known for the architecture
    Catalog,
    /// Generate a vectorized saxpy kernel
    Demo {
        /// Output language: c, opencl, cuda, fortran
        #[arg(long)]
        language: Option<String>,
        /// Write source and manifest into this directory instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Render the saxpy update for every language and architecture
        #[arg(long)]
        all: bool,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref());
    if let Some(arch) = &cli.arch {
        config.architecture = parse_architecture(arch);
    }

    match cli.command {
        Command::Lookup { op, ty } => cmd_lookup(&config, &op, &ty),
        Command::Path { from, to } => cmd_path(&config, &from, &to),
        Command::Catalog => cmd_catalog(&config),
        Command::Demo {
            language,
            output,
            all,
        } => {
            if let Some(language) = &language {
                config.language = parse_language(language);
            }
            cmd_demo(&config, output, all)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> GenConfig {
    let loaded = match path {
        Some(path) => GenConfig::load(path),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            GenConfig::discover(&cwd)
        }
    };
    match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn load_catalog(config: &GenConfig) -> Catalog {
    match config.catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn parse_architecture(name: &str) -> Architecture {
    Architecture::from_name(name).unwrap_or_else(|| {
        eprintln!("error: unknown architecture '{}'", name);
        eprintln!("  available: generic, x86, arm, mppa");
        process::exit(1);
    })
}

fn parse_language(name: &str) -> Language {
    Language::from_name(name).unwrap_or_else(|| {
        eprintln!("error: unknown language '{}'", name);
        eprintln!("  available: c, opencl, cuda, fortran");
        process::exit(1);
    })
}

fn parse_type(name: &str) -> NumericType {
    name.parse().unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        process::exit(1);
    })
}

// --- kernelgen lookup ---

fn cmd_lookup(config: &GenConfig, op: &str, ty: &str) {
    let Some(op) = IntrinsicOp::from_name(op) else {
        eprintln!("error: unknown operation '{}'", op);
        process::exit(1);
    };
    let ty = parse_type(ty);
    let catalog = load_catalog(config);
    match catalog.lookup(op, config.architecture, &ty) {
        Some(name) => println!("{}", name),
        None => {
            eprintln!("{} has no {} instruction for {}", config.architecture, op, ty);
            process::exit(1);
        }
    }
}

// --- kernelgen path ---

fn cmd_path(config: &GenConfig, from: &str, to: &str) {
    let (from, to) = (parse_type(from), parse_type(to));
    let catalog = load_catalog(config);
    match catalog.conversion_path(&from, &to, config.architecture) {
        Ok(path) if path.is_empty() => println!("{} and {} share a representation", from, to),
        Ok(path) => println!("{}", path.join(" -> ")),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

// --- kernelgen catalog ---

fn cmd_catalog(config: &GenConfig) {
    let catalog = load_catalog(config);
    let entries = catalog.entries(config.architecture);
    let conversions = catalog.conversion_edges(config.architecture);
    if entries.is_empty() && conversions.is_empty() {
        println!("{}: no intrinsics", config.architecture);
        return;
    }
    println!("{} ({} intrinsics)", config.architecture, entries.len());
    for (key, name) in &entries {
        println!("  {:<14} {:<8} {}", key.op.name(), key.sig.to_string(), name);
    }
    if !conversions.is_empty() {
        println!("conversions ({})", conversions.len());
        for (from, to, name) in &conversions {
            println!("  {:<8} -> {:<8} {}", from.to_string(), to.to_string(), name);
        }
    }
}

// --- kernelgen demo ---

fn cmd_demo(config: &GenConfig, output: Option<PathBuf>, all: bool) {
    let procedure = saxpy_procedure();
    let lanes = demo_lanes(config.architecture);
    let catalog = load_catalog(config);

    if all {
        let (update, _) = saxpy_update(&procedure, lanes);
        let targets = batch::all_targets();
        let mut failed = 0;
        for rendered in
            batch::render_matrix_with(&update, &targets, &catalog, TransitionRegistry::builtin())
        {
            let target = format!("{}/{}", rendered.language.name(), rendered.architecture.name());
            match rendered.source {
                Ok(text) => println!("{:<16} {}", target, text.trim_start()),
                Err(e) => {
                    failed += 1;
                    println!("{:<16} error: {}", target, e);
                }
            }
        }
        if failed > 0 {
            eprintln!("{} targets cannot express the update", failed);
        }
        return;
    }

    let cx = config.context(&catalog);
    let body = saxpy_body(&procedure, lanes);
    let kernel = match Kernel::generate(procedure, &body, &cx, config.indent) {
        Ok(kernel) => kernel,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    match output {
        Some(dir) => match kernel.write_to(&dir) {
            Ok(path) => {
                eprintln!("wrote {} ({})", path.display(), &kernel.fingerprint[..16]);
            }
            Err(e) => {
                eprintln!("error: cannot write '{}': {}", dir.display(), e);
                process::exit(1);
            }
        },
        None => print!("{}", kernel.source),
    }
}

fn demo_lanes(architecture: Architecture) -> u32 {
    match architecture {
        Architecture::X86 => 8,
        Architecture::Arm => 4,
        _ => 1,
    }
}

fn saxpy_procedure() -> Procedure {
    let float = NumericType::float(32);
    Procedure::new("saxpy")
        .param(Parameter::new("n", NumericType::int(32), Direction::In))
        .param(Parameter::new("a", float, Direction::In))
        .param(Parameter::new("x", float, Direction::In).with_dimension("n"))
        .param(Parameter::new("y", float, Direction::InOut).with_dimension("n"))
}

/// `vy = a * vx + vy`, with the two vector registers it reads.
fn saxpy_update(
    procedure: &Procedure,
    lanes: u32,
) -> (kernelgen::Expr, (TypedOperand, TypedOperand)) {
    let ty = NumericType::float(32).vector(lanes);
    let vx = TypedOperand::variable("vx", ty);
    let vy = TypedOperand::variable("vy", ty);
    let a = param(procedure, "a");
    (assign(&vy, fma(&a, &vx, &vy)), (vx, vy))
}

fn saxpy_body(procedure: &Procedure, lanes: u32) -> Vec<Statement> {
    let (x, y) = (param(procedure, "x"), param(procedure, "y"));
    let i = TypedOperand::variable("i", NumericType::int(32));
    let (update, (vx, vy)) = saxpy_update(procedure, lanes);
    vec![
        Statement::Declare(i.clone()),
        Statement::Declare(vx.clone()),
        Statement::Declare(vy.clone()),
        assign(&vx, index(&x, &i)).into(),
        assign(&vy, index(&y, &i)).into(),
        update.into(),
        assign(index(&y, &i), &vy).into(),
    ]
}

fn param(procedure: &Procedure, name: &str) -> TypedOperand {
    match procedure.parameter(name) {
        Some(parameter) => parameter.operand(),
        None => {
            eprintln!("error: demo procedure has no parameter '{}'", name);
            process::exit(1);
        }
    }
}
