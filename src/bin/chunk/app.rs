//! Main CLI application

use crate::built_info;
use crate::config::{load_config, Config};
use crate::size::ByteSize;
use crate::split::{join_files, split_file};
use cmdflag::flag::program;
use cmdflag::{
    handler, Application, Command, ErrorPolicy, FlagSet, Output, FULL_VERSION_FLAG, VERSION_FLAG,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_SIZE: ByteSize = ByteSize(1 << 20);

const SPLIT_HELP: &str = "split cuts every file into chunks of the same size, the last one maybe smaller.
e.g. split -size 1M file1 file2
generates, next to each file:
file1_0
file1_1
...
file2_00
file2_01
...
The default size and separator come from chunk.yml when present.";

const JOIN_HELP: &str = "join concatenates chunks in the order given, e.g.
join -o file1 file1_0 file1_1 file1_2";

/// CLI application
pub struct App {
    /// The command tree
    root: Arc<Command>,
}

impl App {
    /// Build the application for a loaded configuration
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        output: Output,
    ) -> anyhow::Result<Self> {
        let globals = FlagSet::new(program(), ErrorPolicy::Exit).with_output(output);
        let root = Command::with_build_info(Some(globals), cmdflag::build_info!(built_info));
        {
            let mut globals = root.globals();
            globals.bool(VERSION_FLAG, false, "print the program version");
            globals.bool(FULL_VERSION_FLAG, false, "print the program version and build details");
            globals.string("config", "", "load settings from `file` instead of chunk.yml");
        }
        build_command(&root, Arc::new(config), config_path)?;
        Ok(App { root })
    }

    /// Run the application with command line arguments, program name excluded
    pub fn run(self, args: Vec<String>) -> anyhow::Result<()> {
        Ok(self.root.parse_from(args)?)
    }
}

/// Register the commands on the root command
fn build_command(
    root: &Arc<Command>,
    config: Arc<Config>,
    config_path: Option<PathBuf>,
) -> cmdflag::Result<()> {
    root.add_help()?;

    let defaults = Arc::clone(&config);
    root.add(
        Application::new("split")
            .descr("split files into fixed size chunks")
            .args("file ...")
            .help(SPLIT_HELP)
            .policy(ErrorPolicy::Propagate)
            .init(move |fs| {
                let size_default = match defaults.size.as_deref().map(ByteSize::parse) {
                    Some(Ok(size)) => size,
                    _ => DEFAULT_SIZE,
                };
                let size = fs.var(
                    "size",
                    size_default,
                    "chunk `size`, with an optional K, M or G suffix",
                );
                let dir = fs.string(
                    "dir",
                    "",
                    "write the chunks to `directory` instead of next to each file",
                );
                let config = Arc::clone(&defaults);
                let out = fs.output();
                handler(move |files| {
                    if files.is_empty() {
                        anyhow::bail!("no file to split");
                    }
                    if let Some(Err(reason)) = config.size.as_deref().map(ByteSize::parse) {
                        anyhow::bail!("invalid size in configuration: {}", reason);
                    }
                    let target = match dir.get() {
                        d if !d.is_empty() => Some(PathBuf::from(d)),
                        _ => config.dir.clone(),
                    };
                    for file in files {
                        let chunks = split_file(
                            Path::new(file),
                            size.get().0,
                            config.separator(),
                            target.as_deref(),
                        )?;
                        out.write_str(&format!("{}: {} chunks\n", file, chunks.len()))?;
                    }
                    Ok(files.len())
                })
            }),
    )?;

    root.add(
        Application::new("join")
            .descr("join chunks back into a single file")
            .args("chunk ...")
            .help(JOIN_HELP)
            .policy(ErrorPolicy::Propagate)
            .init(|fs| {
                let output = fs.string("o", "", "write to `file` instead of the standard output");
                handler(move |chunks| {
                    if chunks.is_empty() {
                        anyhow::bail!("no chunk to join");
                    }
                    let path = output.get();
                    let mut out: Box<dyn Write> = if path.is_empty() {
                        Box::new(io::stdout().lock())
                    } else {
                        Box::new(BufWriter::new(File::create(&path)?))
                    };
                    let total = join_files(chunks, &mut out)?;
                    tracing::debug!(bytes = total, "joined chunks");
                    Ok(chunks.len())
                })
            }),
    )?;

    let shown = Arc::clone(&config);
    let config_cmd = root.add(
        Application::new("config")
            .descr("inspect the configuration")
            .args("[show | path]")
            .init(move |fs| {
                let config = Arc::clone(&shown);
                let out = fs.output();
                handler(move |args| {
                    // Without a subcommand, same as `config show`
                    if args.is_empty() {
                        out.write_str(&serde_yaml::to_string(&*config)?)?;
                    }
                    Ok(0)
                })
            }),
    )?;
    config_cmd.add(
        Application::new("show")
            .descr("print the effective configuration as YAML")
            .init(move |fs| {
                let config = Arc::clone(&config);
                let out = fs.output();
                handler(move |_| {
                    out.write_str(&serde_yaml::to_string(&*config)?)?;
                    Ok(0)
                })
            }),
    )?;
    config_cmd.add(
        Application::new("path")
            .descr("print the configuration file in use")
            .init(move |fs| {
                let path = config_path.clone();
                let out = fs.output();
                handler(move |_| {
                    let shown = match &path {
                        Some(path) => path.display().to_string(),
                        None => "(none)".to_string(),
                    };
                    out.write_str(&format!("{}\n", shown))?;
                    Ok(0)
                })
            }),
    )?;
    config_cmd.add_help()?;
    Ok(())
}

/// Run the CLI application with the process arguments
pub fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, config_path) = load_config(extract_config_arg(&args).as_deref())?;

    let app = App::new(config, config_path, Output::stdout())?;
    app.run(args)
}

/// Extract the -config argument before the command line is parsed
fn extract_config_arg(args: &[String]) -> Option<PathBuf> {
    for (i, arg) in args.iter().enumerate() {
        if arg == "--" || arg == "-" {
            return None;
        }
        let Some(name) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
            // Global flags stop at the first command
            return None;
        };
        if let Some(value) = name.strip_prefix("config=") {
            return Some(PathBuf::from(value));
        }
        if name == "config" {
            return args.get(i + 1).map(PathBuf::from);
        }
    }
    None
}
