//! Simple CLI that reads HTML from stdin and outputs JSON to stdout.
//!
//! Options can be passed as a JSON object in the first argument, e.g.
//! `extract_stdin '{"focus": "precision", "include_comments": true}'`.
//! Set `RUST_LOG=rs_mainbody=debug` to trace the extraction stages on stderr.

use std::io::{self, Read};
use std::process::ExitCode;

use rs_mainbody::{Extractor, Options};
use serde_json::json;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let options: Options = match std::env::args().nth(1) {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(options) => options,
            Err(err) => {
                error!(%err, "invalid options");
                return ExitCode::from(2);
            }
        },
        None => Options::default(),
    };

    let mut html = Vec::new();
    if let Err(err) = io::stdin().read_to_end(&mut html) {
        error!(%err, "failed to read from stdin");
        return ExitCode::FAILURE;
    }

    let mut extractor = match Extractor::new(options) {
        Ok(extractor) => extractor,
        Err(err) => {
            error!(%err, "invalid options");
            return ExitCode::from(2);
        }
    };

    let output = match extractor.extract_bytes(&html) {
        Ok(doc) => json!({
            "metadata": doc.metadata,
            "text": doc.text,
            "comments": doc.comments,
            "body_xml": doc.body_xml(),
        }),
        Err(err) => {
            error!(%err, "extraction failed");
            json!({ "metadata": null, "text": "", "comments": null, "body_xml": null })
        }
    };

    println!("{output}");
    ExitCode::SUCCESS
}
