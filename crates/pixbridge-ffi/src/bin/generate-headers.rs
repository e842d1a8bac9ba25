//! Write the C header for the pixbridge ABI.
//!
//! Usage: `generate-headers [OUT]`. Without `OUT` the header goes to
//! `include/pixbridge.h` in the crate directory. Set `HEADERS_TO_STDOUT=1` to
//! print it instead.

use pixbridge_ffi::headers;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let target = if env::var("HEADERS_TO_STDOUT").is_ok_and(|v| v == "1") {
        None
    } else {
        Some(
            env::args_os()
                .nth(1)
                .map(PathBuf::from)
                .unwrap_or_else(headers::default_path),
        )
    };

    match headers::generate_headers(target.as_deref()) {
        Ok(()) => {
            if let Some(path) = &target {
                eprintln!("wrote {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("generate-headers: {e}");
            ExitCode::FAILURE
        }
    }
}
