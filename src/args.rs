use crate::color::parse_color;
use clap::{Parser, ValueEnum};
use image::Rgb;
use qrcode::EcLevel;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[clap(rename_all = "UPPER")]
pub enum EcArg {
    L,
    M,
    Q,
    #[default]
    H,
}

impl EcArg {
    pub const ALL: [EcArg; 4] = [EcArg::L, EcArg::M, EcArg::Q, EcArg::H];

    /// Level name with its approximate recovery capacity, as shown in the GUI.
    pub fn label(self) -> &'static str {
        match self {
            EcArg::L => "L (7%)",
            EcArg::M => "M (15%)",
            EcArg::Q => "Q (25%)",
            EcArg::H => "H (30%)",
        }
    }

    pub fn letter(self) -> char {
        match self {
            EcArg::L => 'L',
            EcArg::M => 'M',
            EcArg::Q => 'Q',
            EcArg::H => 'H',
        }
    }
}

impl From<EcArg> for EcLevel {
    fn from(v: EcArg) -> Self {
        match v {
            EcArg::L => EcLevel::L,
            EcArg::M => EcLevel::M,
            EcArg::Q => EcLevel::Q,
            EcArg::H => EcLevel::H,
        }
    }
}

fn color_arg(s: &str) -> Result<Rgb<u8>, String> {
    parse_color(s).map_err(|e| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "qr-caption", version)]
#[command(about = "Generate QR codes with an optional caption, from the command line or a window")]
pub struct Args {
    /// Launch the interactive window
    #[arg(long)]
    pub gui: bool,

    /// Data to encode in the QR code (required unless --gui)
    #[arg(short, long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
    pub data: Option<String>,

    /// Caption drawn below the QR code
    #[arg(short, long)]
    pub text: Option<String>,

    /// Output image path, format picked from the extension
    #[arg(short, long, default_value = "qrcode.png")]
    pub output: PathBuf,

    /// Size of one QR module in pixels
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    pub qr_size: u32,

    /// Caption font size in pixels
    #[arg(long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..))]
    pub text_size: u32,

    /// QR code color (e.g. black, #FF0000)
    #[arg(long, default_value = "black", value_parser = color_arg)]
    pub qr_color: Rgb<u8>,

    /// Background color (e.g. white, #FFFFFF)
    #[arg(long, default_value = "white", value_parser = color_arg)]
    pub bg_color: Rgb<u8>,

    /// QR code error correction level (L: 7%, M: 15%, Q: 25%, H: 30%)
    #[arg(short = 'e', long, default_value = "H")]
    pub error_level: EcArg,

    /// Font file tried before the system fonts when drawing the caption
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
