mod exports;
mod styling;
mod summary;
mod tables;

pub use exports::export_graph;
pub use summary::print_summary;

use styling::{dim, magenta_bold};

/// Prints the runvis banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🧭 runvis"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Pipeline Run Graph Tool")
    );
}
