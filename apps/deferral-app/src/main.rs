//! # Deferral CLI Entry Point
//!
//! Drives one session over the JSON documents in the data directory and
//! prints the resulting view.
//!
//! ```text
//! deferral                 buckets (default)
//! deferral history         deferred-purchase history
//! deferral simulate 12     select longest MCI offers, simulate 12 months
//! deferral confirm 12      ... then accept terms, confirm, print receipt
//! ```
//!
//! Set `DEFERRAL_DATA_DIR` to point at a directory with `purchases.json`,
//! `deferred-purchases.json` and `terms.json`.

#[tokio::main]
async fn main() {
    // Setup and dispatch live in lib.rs
    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Err(err) = deferral_app::run(args).await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
