use clap::Args;
use miette::{IntoDiagnostic, Result};
use std::io::Write;

use super::SourceArgs;

#[derive(Args)]
pub struct CatArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Name of the file to print
    #[arg(short, long, value_name = "NAME")]
    name: String,
}

impl CatArgs {
    pub fn handle(&self) -> Result<()> {
        let fs = self.source.load()?;
        let data = fs.read_data(&self.name)?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(&data).into_diagnostic()?;
        out.flush().into_diagnostic()
    }
}
