use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use mpyq_archive::{extract::enclosed_path, read::MpqFile, MpqArchive};
use std::{fs::File, path::PathBuf};
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input MPYQ file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let mut mpq = MpqArchive::open(&self.file)
            .context(format!("path: {}", &self.file.display()))?;

        let count = mpq.len();
        for i in 0..count {
            let mut member: MpqFile<'_, File> = mpq.by_index(i)?;

            let p = enclosed_path(&self.directory, member.name())?;
            info!("writing {}", p.display());

            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)
                    .into_diagnostic()
                    .context(format!("creating {}", parent.display()))?;
            }
            let mut out = if !self.overwrite {
                File::create_new(&p)
                    .into_diagnostic()
                    .context(format!("creating {}", &p.display()))?
            } else {
                File::create(&p)
                    .into_diagnostic()
                    .context(format!("creating {}", &p.display()))?
            };

            std::io::copy(&mut member, &mut out).into_diagnostic()?;
        }
        Ok(())
    }
}
