use clap::Args;
use miette::Result;

use super::SourceArgs;
use crate::commands::format_entry;

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Also print the archive serving each entry
    #[arg(long, default_value_t = false)]
    origin: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let fs = self.source.load()?;

        let origins: std::collections::HashMap<_, _> = fs
            .archives()
            .map(|(path, archive)| (archive.id(), path.to_path_buf()))
            .collect();

        for entry in fs.entries() {
            match origins.get(&entry.archive).filter(|_| self.origin) {
                Some(path) => println!("{} {}", format_entry(entry), path.display()),
                None => println!("{}", format_entry(entry)),
            }
        }
        Ok(())
    }
}
