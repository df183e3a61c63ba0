//! Command dispatch: bridges CLI args -> BlueLink facade -> output formatting.

pub mod config_cmd;
pub mod vehicle;

use bluelink_core::{BlueLink, BlueLinkConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Log in, then run one vehicle command.
pub async fn dispatch(
    cmd: Command,
    bluelink: &mut BlueLink,
    global: &GlobalOpts,
    conn: &BlueLinkConfig,
) -> Result<(), CliError> {
    let identity = bluelink.login().await?;

    match cmd {
        Command::Login => {
            vehicle::show_login(&identity, conn, global);
            Ok(())
        }
        Command::Lock => vehicle::lock(bluelink, global).await,
        Command::Unlock => vehicle::unlock(bluelink, global).await,
        Command::Start(args) => vehicle::start(bluelink, &args, global).await,
        Command::Stop => vehicle::stop(bluelink, global).await,
        Command::Find => vehicle::find(bluelink, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
