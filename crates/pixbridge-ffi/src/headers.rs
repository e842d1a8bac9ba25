//! C header generation.
//!
//! The header is produced by cbindgen from this crate's exports plus the
//! `#[repr(C)]` types of `pixbridge-core`, configured by `cbindgen.toml` next
//! to the crate manifest.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "cbindgen.toml";

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("Failed to load cbindgen.toml: {0}")]
    Config(String),

    #[error("Failed to generate bindings: {0}")]
    Generate(#[from] cbindgen::Error),

    #[error("Generated header is not UTF-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),

    #[error("Failed to write header: {0}")]
    Io(#[from] io::Error),
}

/// Where the header lands when no path is given.
pub fn default_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("include")
        .join("pixbridge.h")
}

/// Render the header as a string.
pub fn render() -> Result<String, HeaderError> {
    let crate_dir = env!("CARGO_MANIFEST_DIR");
    let config = cbindgen::Config::from_file(Path::new(crate_dir).join(CONFIG_FILE))
        .map_err(HeaderError::Config)?;
    let bindings = cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_config(config)
        .generate()?;

    let mut header = Vec::new();
    bindings.write(&mut header);
    Ok(String::from_utf8(header)?)
}

/// Write the header to `out`, or to stdout when `out` is `None`.
pub fn generate_headers(out: Option<&Path>) -> Result<(), HeaderError> {
    let header = render()?;
    match out {
        Some(path) => {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, &header)?;
            log::info!("wrote {} bytes to {}", header.len(), path.display());
        }
        None => io::stdout().write_all(header.as_bytes())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_declares_the_abi() {
        let header = render().unwrap();
        for name in [
            "PIXBRIDGE_H",
            "typedef struct BufferView",
            "typedef struct RawImageDescriptor",
            "PixbridgeImageBuffer",
            "PIXBRIDGE_STATUS_OK",
            "PIXBRIDGE_STATUS_NULL_POINTER",
            "COLOR_FORMAT_RGB8",
            "uint32_t encode(",
            "pixbridge_last_error",
            "pixbridge_buffer_new",
            "pixbridge_buffer_raw",
            "pixbridge_buffer_encode",
            "pixbridge_buffer_extract",
            "pixbridge_buffer_free",
            "pixbridge_version",
        ] {
            assert!(header.contains(name), "header is missing {name}");
        }
    }

    #[test]
    fn test_opaque_handle_is_forward_declared() {
        let header = render().unwrap();
        let forward = "typedef struct PixbridgeImageBuffer PixbridgeImageBuffer;";
        assert!(header.contains(forward));
    }

    #[test]
    fn test_generate_writes_file() {
        let name = format!("pixbridge-headers-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        let path = dir.join("nested").join("pixbridge.h");
        generate_headers(Some(&path)).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, render().unwrap());
        fs::remove_dir_all(&dir).unwrap();
    }
}
