//! Color analysis: average readback and temperature report.

use crate::{AverageArgs, CctArgs};
use anyhow::Result;
use lensfx_core::Image;
use lensfx_ops::stats::{color_report, ColorReport, PixelPick};
use lensfx_ops::AreaAverage;
use tracing::{info, trace};

/// Average color through the 1x1 [`AreaAverage`] readback.
pub fn average_color(image: Image, extent: Option<lensfx_core::Rect>) -> Result<[f32; 4]> {
    let filter = AreaAverage { input: Some(image), extent };
    let pixel = super::render(&filter)?;
    Ok(pixel.pixel_rgba(0, 0))
}

/// `average color: r g b a` line printed by `average` and the demo.
pub fn format_average(rgba: [f32; 4]) -> String {
    format!("average color: {:.4} {:.4} {:.4} {:.4}", rgba[0], rgba[1], rgba[2], rgba[3])
}

fn format_pick(p: &PixelPick) -> String {
    format!("({}, {}) rgb {:.4} {:.4} {:.4}", p.x, p.y, p.rgb[0], p.rgb[1], p.rgb[2])
}

/// Multi-line color report.
pub fn format_report(report: &ColorReport) -> String {
    let kelvin = |k: Option<f32>| k.map_or_else(|| "n/a".to_string(), |k| format!("{k:.0} K"));
    let mut lines = vec![
        format_average(report.average),
        format!("temperature:   {}", kelvin(report.temperature)),
        format!("kelvin offset: {:+}", report.kelvin_offset),
        format!("tint:          {:+.4}", report.tint),
    ];
    match report.highlight {
        Some(hl) => lines.push(format!(
            "highlights:    rgb {:.4} {:.4} {:.4} ({})",
            hl[0],
            hl[1],
            hl[2],
            kelvin(report.highlight_temperature)
        )),
        None => lines.push("highlights:    none".to_string()),
    }
    lines.push(format!("brightest:     {}", format_pick(&report.brightest)));
    lines.push(format!("neutral:       {}", format_pick(&report.neutral)));
    if let Some(mw) = &report.max_white {
        lines.push(format!("max white:     {}", format_pick(mw)));
    }
    lines.join("\n")
}

pub fn run_average(args: AverageArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), rect = ?args.rect, "analyze::run_average");

    let image = super::load_image(&args.input)?;
    let extent = args.rect.as_deref().map(super::parse_rect).transpose()?;
    if verbose {
        println!("Averaging {} over {}", args.input.display(), extent.unwrap_or(image.extent()));
    }

    let rgba = average_color(image, extent)?;
    println!("{}", format_average(rgba));
    Ok(())
}

pub fn run_cct(args: CctArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), "analyze::run_cct");

    let image = super::load_image(&args.input)?;
    info!(w = image.width(), h = image.height(), "Analyzing color");
    if verbose {
        println!("Color report for {}", args.input.display());
    }

    let report = color_report(&image)?;
    println!("{}", format_report(&report));
    Ok(())
}
