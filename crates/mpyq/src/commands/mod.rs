pub mod archive;
pub mod overlay;

use mpyq_archive::MpqEntry;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle a single MPYQ archive
    Archive {
        #[command(subcommand)]
        command: archive::ArchiveCommands,
    },
    /// Handle every archive below a directory as one overlay
    Overlay {
        #[command(subcommand)]
        command: overlay::OverlayCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Archive { command } => command.handle(),
            Commands::Overlay { command } => command.handle(),
        }
    }
}

/// One line per entry: index, date, size, digest and name
pub(crate) fn format_entry(entry: &MpqEntry) -> String {
    format!(
        "{:>6} {:>11} {:>10} {:<32} {}",
        entry.index, entry.file_date, entry.file_size, entry.md5, entry.key
    )
}

/// Print every mismatch and fail when there is at least one
pub(crate) fn report_mismatches(
    checked: usize,
    mismatches: &[mpyq_archive::checksum::Mismatch],
) -> miette::Result<()> {
    use itertools::Itertools;
    use owo_colors::{OwoColorize, Stream::Stdout};

    if mismatches.is_empty() {
        println!(
            "{} {checked} entries",
            "ok".if_supports_color(Stdout, |text| text.green())
        );
        return Ok(());
    }

    println!(
        "{}",
        mismatches
            .iter()
            .map(|mismatch| format!(
                "{} {} expected {} found {}",
                "mismatch".if_supports_color(Stdout, |text| text.red()),
                mismatch.key,
                mismatch.expected,
                mismatch.actual
            ))
            .join("\n")
    );
    miette::bail!("{} of {checked} entries failed verification", mismatches.len())
}
