use mitre_matrix::commands;
use structopt::StructOpt;

fn main() -> Result<(), mitre_matrix::error::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let arguments: commands::Cli = StructOpt::from_args();
    let req_client =
        mitre_matrix::HttpReqwest::with_timeout(std::time::Duration::from_secs(arguments.timeout));

    arguments.command.handle(req_client)?;

    Ok(())
}
