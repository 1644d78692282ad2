//! recorte CLI tool
//!
//! Command-line interface for operating the image staging and background
//! removal pipeline against a local storage root.

fn main() -> anyhow::Result<()> {
    recorte::cli::main()
}
