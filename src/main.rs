use anyhow::Result;
use clap::Parser;
use std::io;

mod int_range;
mod logging;
mod manga;
#[cfg(test)]
mod test_server;

use manga::get::GetManga;

#[tokio::main]
async fn main() -> Result<()> {
    let args = GetManga::parse();
    logging::init(args.verbose)?;

    let job = args.job(&mut io::stdin().lock(), &mut io::stdout())?;
    let reports = args.get()?.download(&job).await;
    println!("{}", manga::summary(&reports));

    Ok(())
}
