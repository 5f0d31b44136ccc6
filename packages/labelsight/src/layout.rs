use imageproc::rect::Rect;

/// Background box width relative to the measured text width.
pub const BOX_WIDTH_SCALE: f32 = 1.1;
/// Background box height relative to the measured text height.
pub const BOX_HEIGHT_SCALE: f32 = 1.4;

/// Placement of the text block and its background box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    pub text_size: (f32, f32),
    pub box_origin: (f32, f32),
    pub box_size: (f32, f32),
    pub text_origin: (f32, f32),
}

impl TextLayout {
    /// Box anchored at `position`, text centered inside it.
    pub fn compute(text_size: (u32, u32), position: (i32, i32)) -> Self {
        let (text_w, text_h) = (text_size.0 as f32, text_size.1 as f32);
        let (x, y) = (position.0 as f32, position.1 as f32);
        let box_w = text_w * BOX_WIDTH_SCALE;
        let box_h = text_h * BOX_HEIGHT_SCALE;

        Self {
            text_size: (text_w, text_h),
            box_origin: (x, y),
            box_size: (box_w, box_h),
            text_origin: (x + (box_w - text_w) / 2.0, y + (box_h - text_h) / 2.0),
        }
    }

    /// The background box in pixels, or `None` when there is nothing to draw.
    pub fn box_rect(&self) -> Option<Rect> {
        let width = self.box_size.0.round() as u32;
        let height = self.box_size.1.round() as u32;
        if width == 0 || height == 0 {
            return None;
        }
        Some(
            Rect::at(self.box_origin.0.round() as i32, self.box_origin.1.round() as i32)
                .of_size(width, height),
        )
    }

    pub fn text_position(&self) -> (i32, i32) {
        (
            self.text_origin.0.round() as i32,
            self.text_origin.1.round() as i32,
        )
    }
}
