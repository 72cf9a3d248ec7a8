pub mod cat;
pub mod list;
pub mod unpack;
pub mod verify;

use clap::Args;
use miette::{Context, Result};
use mpyq_archive::{MpqFileSystem, MpqFileSystemOptions};
use std::path::PathBuf;

#[derive(clap::Subcommand)]
pub enum OverlayCommands {
    /// List the entries served by the overlay
    List(list::ListArgs),
    /// Write the winning version of a file to stdout
    Cat(cat::CatArgs),
    /// Extract the overlay into a directory
    Unpack(unpack::UnpackArgs),
    /// Check every served file against its recorded digest
    Verify(verify::VerifyArgs),
}

impl OverlayCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            OverlayCommands::List(list) => list.handle(),
            OverlayCommands::Cat(cat) => cat.handle(),
            OverlayCommands::Unpack(unpack) => unpack.handle(),
            OverlayCommands::Verify(verify) => verify.handle(),
        }
    }
}

/// Where to look for archives
#[derive(Args)]
pub struct SourceArgs {
    /// A directory holding MPYQ files
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Extension of the archives to load
    #[arg(long, value_name = "EXT", default_value = "mpq")]
    ext: String,

    /// Follow symbolic links while searching
    #[arg(long, default_value_t = false)]
    follow_links: bool,

    /// Do not descend further than this many directories
    #[arg(long, value_name = "DEPTH")]
    max_depth: Option<usize>,
}

impl SourceArgs {
    pub fn load(&self) -> Result<MpqFileSystem> {
        let options = MpqFileSystemOptions::builder()
            .extension(self.ext.trim_start_matches('.'))
            .follow_links(self.follow_links)
            .maybe_max_depth(self.max_depth)
            .build();

        let mut fs = MpqFileSystem::with_options(options);
        fs.init(&self.directory)
            .context(format!("path: {}", self.directory.display()))?;
        Ok(fs)
    }
}
