use anyhow::{bail, Context};
use clap::Parser;
use sql_playground::config::Cli;
use sql_playground::{chapters, repl, Session};
use std::io;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_writer(io::stderr)
        .init();

    let chapter = match cli.chapter.as_deref() {
        Some(id) => match chapters::find(id) {
            Some(chapter) => Some(chapter),
            None => bail!("unknown chapter: {id}"),
        },
        None => None,
    };

    let store = cli.open_store().context("opening state store")?;
    if cli.starts_fresh() {
        store.clear().context("clearing saved state")?;
    }
    let mut session = Session::open(store).context("opening database")?;
    info!(data_dir = %cli.data_dir.display(), in_memory = cli.in_memory, "session ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Some(chapter) = chapter {
        if let Some(base) = chapter.base_sql {
            session.seed(base).context("running chapter setup")?;
        }
        repl::describe_chapter(chapter, &mut out)?;
    }

    repl::run(&mut session, io::stdin().lock(), &mut out)?;
    Ok(())
}
