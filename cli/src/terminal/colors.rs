use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 94, g: 188, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 196, b: 87 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 210, g: 210, b: 210 };
pub const DEVICE: Color = Color::TrueColor { r: 130, g: 220, b: 140 };
pub const ALIAS: Color = Color::TrueColor { r: 200, g: 150, b: 255 };
