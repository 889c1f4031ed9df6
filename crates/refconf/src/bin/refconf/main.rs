mod cli;

use refconf::{AggregateBuilder, Context, Document, Format, Value};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("REFCONF_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let context = Context::default().with_format(cli.format.into());

    let command_result = match cli.command {
        cli::Command::Get(get_cli) => get(&cli.config, cli.must_exist, &context, get_cli),
        cli::Command::Exists(exists_cli) => {
            exists(&cli.config, cli.must_exist, &context, exists_cli)
        }
        cli::Command::Set(set_cli) => set(&cli.config, cli.must_exist, &context, set_cli),
        cli::Command::Dump(dump_cli) => dump(&cli.config, cli.must_exist, &context, dump_cli),
        cli::Command::Build(build_cli) => build(&context, build_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn get(
    config: &std::path::Path,
    must_exist: bool,
    context: &Context,
    cli: cli::GetCommand,
) -> anyhow::Result<()> {
    let document = Document::load(config, must_exist, context)?;
    let value = document.get_or(&cli.key, Value::Null)?;

    output(&cli.output, &value)
}

pub fn exists(
    config: &std::path::Path,
    must_exist: bool,
    context: &Context,
    cli: cli::ExistsCommand,
) -> anyhow::Result<()> {
    let document = Document::load(config, must_exist, context)?;
    println!("{}", document.exists(&cli.key));

    Ok(())
}

pub fn set(
    config: &std::path::Path,
    must_exist: bool,
    context: &Context,
    cli: cli::SetCommand,
) -> anyhow::Result<()> {
    let value = Format::Yaml
        .parse(cli.value.as_bytes())
        .map_err(|message| anyhow::anyhow!("Invalid value '{}': {message}", cli.value))?;

    let mut document = Document::load(config, must_exist, context)?;
    document.set(&cli.key, value)?;
    document.write()?;

    Ok(())
}

pub fn dump(
    config: &std::path::Path,
    must_exist: bool,
    context: &Context,
    cli: cli::DumpCommand,
) -> anyhow::Result<()> {
    let document = Document::load(config, must_exist, context)?;

    output(&cli.output, &Value::Object(document.into_settings()))
}

pub fn build(context: &Context, cli: cli::BuildCommand) -> anyhow::Result<()> {
    let glob = cli
        .glob
        .unwrap_or_else(|| context.default_glob().to_string());

    let settings = AggregateBuilder::new(context).build(&cli.name, &cli.target, &glob)?;
    let count = settings
        .get(&cli.name)
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    eprintln!("{} written with {count} entries", cli.target.display());

    Ok(())
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), value)?;
            println!();
        }
    };

    Ok(())
}
