//! # track-vet CLI
//!
//! Command-line interface for the track vetter.
//!
//! ## Usage
//! ```bash
//! track-vet index ~/Music
//! track-vet vet ~/Downloads/new-tracks --threshold 0.8
//! track-vet vet ~/Downloads/new-tracks --output json
//! ```

mod cli;

use track_vetter::Result;

fn main() -> Result<()> {
    cli::run()
}
