use std::process::ExitCode;

use aseprite_reader::{DecodeOptions, LinkPolicy};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    if let Some(index) = args.iter().position(|arg| arg == flag) {
        args.remove(index);
        true
    } else {
        false
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let degrade_links = take_flag(&mut args, "--degrade-links");
    let Some(path) = args.pop() else {
        eprintln!("usage: aseprite-reader [--degrade-links] <file.aseprite>");
        return ExitCode::FAILURE;
    };

    let data = match std::fs::read(&path) {
        Ok(data) => data,
        Err(err) => {
            error!(%path, %err, "could not read file");
            return ExitCode::FAILURE;
        }
    };

    let options = DecodeOptions {
        link_policy: if degrade_links {
            LinkPolicy::Degrade
        } else {
            LinkPolicy::Fail
        },
        ..DecodeOptions::default()
    };
    let doc = match aseprite_reader::decode_with(&data, &options) {
        Ok(doc) => doc,
        Err(err) => {
            error!(%path, %err, "decoding failed");
            return ExitCode::FAILURE;
        }
    };

    info!(
        %path,
        width = doc.width(),
        height = doc.height(),
        depth = ?doc.color_depth(),
        pixel_ratio = %doc.pixel_ratio(),
        "sprite"
    );
    for layer in doc.layers() {
        info!(name = %layer.name, kind = ?layer.kind, child_level = layer.child_level, "layer");
    }
    for tag in doc.tags() {
        info!(name = %tag.name, from = tag.from, to = tag.to, direction = %tag.direction, "tag");
    }
    for (index, frame) in doc.frames().iter().enumerate() {
        info!(
            frame = index,
            duration = frame.duration,
            cels = frame.cels.len(),
            "frame"
        );
    }
    if let Some(palette) = doc.palette() {
        info!(colors = palette.colors.len(), "palette");
    }
    info!(
        slices = doc.slices().len(),
        tilesets = doc.tilesets().len(),
        "done"
    );
    ExitCode::SUCCESS
}
