use crate::args::Args;
use crate::font::FontChain;
use crate::pipeline::{generate, save, GenerationRequest};
use anyhow::{Context, Result};

/// One generation from command-line arguments: encode, caption, report, save.
pub fn run(args: &Args) -> Result<()> {
    let data = args.data.as_deref().unwrap_or_default();

    let request = GenerationRequest::new(data, args.text.as_deref())?
        .module_size(args.qr_size)
        .caption_font_size(args.text_size)
        .colors(args.qr_color, args.bg_color)
        .error_correction(args.error_level);

    let fonts = match &args.font {
        Some(path) => FontChain::with_file(path.clone()),
        None => FontChain::default(),
    };

    let generated = generate(&request, &fonts).context("Failed to generate QR code")?;

    println!("QR code info:");
    println!(
        "- Version: {} ({}x{} modules)",
        generated.version, generated.modules, generated.modules
    );
    println!("- Error correction level: {}", args.error_level.letter());
    println!("- Data size: {} characters", request.payload().chars().count());

    for warning in &generated.composed.warnings {
        eprintln!("Warning: {warning}");
    }

    save(generated.image(), &args.output)?;

    println!("\nSaved to: {}", args.output.display());
    Ok(())
}
