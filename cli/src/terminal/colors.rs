use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 120, g: 200, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 190, b: 90 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 215, g: 215, b: 215 };

pub const IPV4_ADDR: Color = Color::TrueColor { r: 140, g: 230, b: 140 };
pub const HOSTNAME: Color = Color::TrueColor { r: 120, g: 200, b: 255 };
pub const PORT: Color = Color::TrueColor { r: 255, g: 190, b: 90 };
pub const URL: Color = Color::TrueColor { r: 170, g: 150, b: 255 };
pub const VULNERABLE: Color = Color::TrueColor { r: 255, g: 95, b: 95 };
