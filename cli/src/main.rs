use std::{error::Error, io, path::PathBuf, process::exit};

use astgen::{
    config::{ConfigError, MissingInput},
    sink::Sink,
    EmitError, Generator, Selection,
};
use clap::Parser;
use tracing::Level;

/// Generates expression-tree declarations from node descriptors.
#[derive(Debug, Parser)]
#[command(name = "astgen", version)]
struct Args {
    /// Descriptor file, one `Name : Type field, ...` per line.
    #[arg(short, long, value_name = "FILE")]
    descriptors: Option<PathBuf>,

    /// Process every descriptor instead of only the first.
    #[arg(short, long)]
    all: bool,

    /// Render full Rust declarations instead of field lines.
    #[arg(short, long)]
    render: bool,

    /// Write `<base-name>.rs` into this directory instead of stdout.
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[arg(short, long, default_value = "Expr")]
    base_name: String,

    /// More logging on stderr; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn exit_code(err: &(dyn Error + 'static)) -> i32 {
    if let Some(err) = err.downcast_ref::<EmitError>() {
        err.exit_code()
    } else if err.is::<ConfigError>() {
        65
    } else if err.is::<MissingInput>() {
        66
    } else {
        74
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let selection = if args.all {
        Selection::All
    } else {
        Selection::First
    };
    let sink = match &args.output_dir {
        Some(dir) => Sink::directory(dir),
        None => Sink::Stdout,
    };
    let generator = Generator::default()
        .with_selection(selection)
        .with_render(args.render)
        .with_base_name(args.base_name)
        .with_sink(sink);

    println!("{}\n", generator.banner());

    let result = match &args.descriptors {
        Some(path) => generator.run_file(path),
        None => generator.run_builtin(),
    };

    if let Err(err) = result {
        eprintln!("{}", err);
        if let Some(source) = err.source() {
            eprintln!("  caused by: {}", source);
        }
        exit(exit_code(err.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn no_arguments_means_first_builtin_descriptor() {
        let args = Args::try_parse_from(["astgen"]).unwrap();
        assert!(!args.all);
        assert!(!args.render);
        assert!(args.descriptors.is_none());
        assert!(args.output_dir.is_none());
        assert_eq!(args.base_name, "Expr");
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn parses_every_flag() {
        let args = Args::try_parse_from([
            "astgen", "-d", "nodes.ast", "--all", "-r", "-o", "src", "-b", "Stmt", "-vv",
        ])
        .unwrap();
        assert_eq!(args.descriptors, Some(PathBuf::from("nodes.ast")));
        assert!(args.all);
        assert!(args.render);
        assert_eq!(args.output_dir, Some(PathBuf::from("src")));
        assert_eq!(args.base_name, "Stmt");
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn maps_errors_to_exit_codes() {
        let malformed: Box<dyn Error> = Box::new(EmitError::NoDescriptors);
        assert_eq!(exit_code(malformed.as_ref()), 65);

        let config: Box<dyn Error> = Box::new(
            astgen::config::parse("Binary Expr left").unwrap_err(),
        );
        assert_eq!(exit_code(config.as_ref()), 65);

        let io: Box<dyn Error> = Box::new(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert_eq!(exit_code(io.as_ref()), 74);
    }

    #[test]
    fn missing_descriptor_file_is_noinput() {
        let err = Generator::default()
            .run_file("no/such/nodes.ast")
            .unwrap_err();
        assert_eq!(exit_code(err.as_ref()), 66);
    }

    #[test]
    fn invalid_base_name_is_a_data_error() {
        let err = Generator::default()
            .with_base_name("../Escaped")
            .run_builtin()
            .unwrap_err();
        assert_eq!(exit_code(err.as_ref()), 65);
    }
}
