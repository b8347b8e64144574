use iced::Color;

pub const RED: Color = Color::from_rgb(
    0xE2 as f32 / 255.0,
    0x4E as f32 / 255.0,
    0x1B as f32 / 255.0,
);
pub const GREEN: Color = Color::from_rgb(
    0x2A as f32 / 255.0,
    0xA1 as f32 / 255.0,
    0x64 as f32 / 255.0,
);
pub const GREY: Color = Color::from_rgb(
    0x71 as f32 / 255.0,
    0x71 as f32 / 255.0,
    0x71 as f32 / 255.0,
);
