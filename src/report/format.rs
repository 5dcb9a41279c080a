use crate::model::{ImageSpec, Linearity};

const MEGABYTE: f64 = 1024.0 * 1024.0;

/// One-line summary, e.g. `a.png :   64 x   64, 3 channel, uint8`.
/// With `sum`, the in-memory size is appended in megabytes.
pub fn info_line(name: &str, spec: &ImageSpec, sum: bool) -> String {
    let mut line = format!("{name} : {:4} x {:4}", spec.width, spec.height);
    if spec.is_volume() {
        line.push_str(&format!(" x {:4}", spec.depth));
    }
    line.push_str(&format!(
        ", {} channel, {}{}",
        spec.nchannels,
        spec.format.type_name(),
        if spec.is_volume() { " volume" } else { "" }
    ));
    if sum {
        line.push_str(&format!(" ({:.2} MB)", spec.image_bytes() as f64 / MEGABYTE));
    }
    line
}

pub fn verbose_lines(spec: &ImageSpec) -> Vec<String> {
    let mut lines = vec![format!("    channel list: {}", spec.channel_names.join(", "))];

    if spec.x != 0 || spec.y != 0 || spec.z != 0 {
        let mut origin = format!("    origin: x={}, y={}", spec.x, spec.y);
        if spec.is_volume() {
            origin.push_str(&format!(", z={}", spec.z));
        }
        lines.push(origin);
    }

    if spec.full_width != spec.width
        || spec.full_height != spec.height
        || spec.full_depth != spec.depth
    {
        let mut full = format!(
            "    full (uncropped) size: {:4} x {}",
            spec.full_width, spec.full_height
        );
        if spec.is_volume() {
            full.push_str(&format!(" x {}", spec.full_depth));
        }
        lines.push(full);
    }

    if spec.is_tiled() {
        let mut tile = format!("    tile size: {} x {}", spec.tile_width, spec.tile_height);
        if spec.is_volume() {
            tile.push_str(&format!(" x {}", spec.tile_depth));
        }
        lines.push(tile);
    }

    lines.push(match spec.linearity {
        Linearity::Linear => "    linear color space".to_string(),
        Linearity::GammaCorrected(gamma) => format!("    gamma-corrected: {gamma}"),
        Linearity::Srgb => "    sRGB color space".to_string(),
        Linearity::Unknown => "    unknown color space".to_string(),
    });

    lines.extend(
        spec.attributes
            .iter()
            .map(|attribute| format!("    {}: {}", attribute.name, attribute.value)),
    );
    lines
}

/// `Total size: ...` in megabytes, switching to gigabytes past 1024 MB.
pub fn total_line(total_bytes: u64) -> String {
    let megabytes = total_bytes as f64 / MEGABYTE;
    if megabytes > 1024.0 {
        format!("Total size: {:.2} GB", megabytes / 1024.0)
    } else {
        format!("Total size: {megabytes:.2} MB")
    }
}
