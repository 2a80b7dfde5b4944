use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use qr_caption::args::Args;
use qr_caption::{cli, gui, logging};

fn main() -> Result<()> {
    let launched_bare = std::env::args_os().len() == 1;
    let args = Args::parse();

    logging::setup_logging(args.verbose);

    if args.gui || launched_bare {
        tracing::info!("starting interactive mode");
        return gui::run().map_err(|e| anyhow::anyhow!("GUI error: {e}"));
    }

    if args.data.is_none() {
        Args::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "--data is required unless --gui is given",
            )
            .exit();
    }

    cli::run(&args)
}
