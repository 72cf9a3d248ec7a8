use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use mpyq_archive::MpqArchive;
use std::{io::Write, path::PathBuf};

#[derive(Args)]
pub struct CatArgs {
    /// An input MPYQ file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Name of the member to print
    #[arg(short, long, value_name = "NAME")]
    name: String,
}

impl CatArgs {
    pub fn handle(&self) -> Result<()> {
        let mut mpq = MpqArchive::open(&self.file)
            .context(format!("path: {}", &self.file.display()))?;
        let mut member = mpq.by_name(&self.name)?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        std::io::copy(&mut member, &mut out).into_diagnostic()?;
        out.flush().into_diagnostic()
    }
}
