use std::io;
use std::time::Duration;

use clap::{crate_authors, crate_description, crate_version, CommandFactory, Parser};
use clap_complete::generate;
use eyre::Result;
use tokio::runtime::Builder;
use tracing::{info, trace};

use fleetctl::{admin, officer, watch, Config, Opts, SubCommand};
use fleetwatch_common::{init_logging, ConfigFile};
use fleetwatch_engine::BackendClient;

/// Binary name, using a different binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

/// How long the runtime waits for the `stdin` reader on exit.
const EXIT_GRACE: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let opts = Opts::parse();

    // Initialise logging.
    //
    init_logging(NAME, opts.debug, opts.logdir.clone())?;

    // These do not need any configuration.
    //
    match &opts.subcmd {
        // Standalone completion generation
        //
        // NOTE: you can generate UNIX shells completion on Windows and vice-versa.  Not worth
        //       trying to limit depending on the OS.
        //
        SubCommand::Completion(copts) => {
            let generator = copts.shell;
            generate(generator, &mut Opts::command(), NAME, &mut io::stdout());
            return Ok(());
        }

        // Standalone `version` command
        //
        SubCommand::Version => {
            eprintln!("{}", version());
            eprintln!("Modules: ");
            eprintln!("\t{}", fleetwatch_common::version());
            eprintln!("\t{}", fleetwatch_formats::version());
            eprintln!("\t{}", fleetwatch_engine::version());
            return Ok(());
        }

        // Handle `config`
        //
        SubCommand::Config => {
            eprintln!("Default config file: {:?}", ConfigFile::<Config>::default_file()?);
            return Ok(());
        }
        _ => (),
    }

    let cfn = opts.config.as_ref().map(|p| p.to_string_lossy().to_string());
    let cfg = ConfigFile::<Config>::load(cfn.as_deref())?;

    // Banner
    //
    banner()?;

    // Everything is single-threaded, see the `watch` command.
    //
    let rt = Builder::new_current_thread().enable_all().build()?;
    let res = rt.block_on(handle_subcmd(&cfg, &opts.subcmd));

    // Do not wait for a pending read on `stdin`.
    //
    rt.shutdown_timeout(EXIT_GRACE);
    res
}

pub async fn handle_subcmd(cfg: &ConfigFile<Config>, subcmd: &SubCommand) -> Result<()> {
    match subcmd {
        // Handle `watch`
        //
        SubCommand::Watch(wopts) => {
            trace!("watch");

            let stats = watch(cfg, wopts).await?;
            info!("Stats: {stats}");
            eprintln!("{stats}");
        }

        // Handle `admin list` and `admin approve`
        //
        SubCommand::Admin(aopts) => {
            trace!("admin");

            let client = BackendClient::new(&cfg.inner().base_url)?;
            admin(&client, aopts).await?;
        }

        // Handle `officer ID`
        //
        SubCommand::Officer(oopts) => {
            trace!("officer");

            let client = BackendClient::new(&cfg.inner().base_url)?;
            officer(&client, oopts).await?;
        }

        // Already done before loading the configuration.
        //
        SubCommand::Completion(_) | SubCommand::Version | SubCommand::Config => (),
    }
    Ok(())
}

/// Return our version number
///
#[inline]
pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}

/// Display banner
///
fn banner() -> Result<()> {
    Ok(eprintln!(
        r##"
{}/{} by {}
{}
"##,
        NAME,
        VERSION,
        AUTHORS,
        crate_description!()
    ))
}
