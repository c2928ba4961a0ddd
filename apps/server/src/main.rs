use anyhow::Context;
use corral::kernel::config::Environment;
use corral_logger::Logger;
use corral_server::Server;

#[corral_runtime::main(service)]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::load().context("Critical: No usable profile selected")?;

    let _log =
        Logger::from_profile(&environment.profile().app.name, &environment.profile().log)?;

    Server::builder().environment(environment).build().await?.run().await
}
