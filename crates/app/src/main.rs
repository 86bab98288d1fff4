//! Entry point for dae2mesh.
//! Flattens a COLLADA file into raw GPU buffers and reports what was found.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use asset::MeshBuffers;

fn parse_input_arg(args: &[String]) -> Option<PathBuf> {
    // Accept: --input=<file> or the first positional argument.
    for arg in args {
        if let Some(val) = arg.strip_prefix("--input=") {
            return Some(PathBuf::from(val));
        }
    }
    args.iter()
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
}

fn parse_out_dir_arg(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .find_map(|arg| arg.strip_prefix("--out-dir="))
        .filter(|val| !val.is_empty())
        .map(PathBuf::from)
}

fn parse_quiet_arg(args: &[String]) -> bool {
    // --quiet[=on|off], default off
    for arg in args {
        if arg == "--quiet" {
            return true;
        }
        if let Some(val) = arg.strip_prefix("--quiet=") {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn write_buffers(buffers: &MeshBuffers, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let files = [
        ("positions.bin", buffers.position_bytes()),
        ("normals.bin", buffers.normal_bytes()),
        ("texcoords.bin", buffers.tex_coord_bytes()),
        ("indices.bin", buffers.index_bytes()),
    ];
    for (name, bytes) in files {
        let path = out_dir.join(name);
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let default_filter = if parse_quiet_arg(&args) { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let Some(input) = parse_input_arg(&args) else {
        bail!("Usage: dae2mesh <file.dae> [--out-dir=<dir>] [--quiet]");
    };
    let out_dir = parse_out_dir_arg(&args);

    let buffers = asset::load_collada_from_path(&input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    log::info!(
        "{}: {} vertices, {} normals, {} texcoords, {} indices",
        input.display(),
        buffers.vertex_count(),
        buffers.normals.len() / 3,
        buffers.tex_coords.len() / 2,
        buffers.indices.len()
    );
    if !buffers.is_valid() {
        log::warn!("{} contained no triangles", input.display());
    }

    if let Some(dir) = out_dir {
        write_buffers(&buffers, &dir)?;
    }
    Ok(())
}
