pub mod cat;
pub mod extract;
pub mod list;
pub mod verify;

#[derive(clap::Subcommand)]
pub enum ArchiveCommands {
    /// List the entries of an MPYQ file
    List(list::ListArgs),
    /// Write a single member of an MPYQ file to stdout
    Cat(cat::CatArgs),
    /// Extract an MPYQ file into a directory
    Extract(extract::ExtractArgs),
    /// Check every member against its recorded digest
    Verify(verify::VerifyArgs),
}

impl ArchiveCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            ArchiveCommands::List(list) => list.handle(),
            ArchiveCommands::Cat(cat) => cat.handle(),
            ArchiveCommands::Extract(extract) => extract.handle(),
            ArchiveCommands::Verify(verify) => verify.handle(),
        }
    }
}
