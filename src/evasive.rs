/// The landing scene's "No" button, which slides away from the pointer.
///
/// Units are whatever the host uses for the viewport (terminal cells in
/// the binary).

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dodge {
    /// Pointer distance from the button centre that makes it move.
    pub trigger_radius: f32,
    /// How far it moves per pointer event.
    pub step: f32,
    /// Gap kept between the button and the viewport edges.
    pub margin: f32,
}

impl Dodge {
    /// New position for `button` after the pointer moved to `pointer`, or
    /// `None` when the pointer is not close enough to bother.
    pub fn flee(&self, button: Rect, pointer: (f32, f32), viewport: (f32, f32)) -> Option<Rect> {
        let (cx, cy) = button.center();
        let (dx, dy) = (pointer.0 - cx, pointer.1 - cy);
        if dx.hypot(dy) >= self.trigger_radius {
            return None;
        }
        // atan2(0, 0) is 0, so a pointer dead centre pushes the button left.
        let angle = dy.atan2(dx);
        let x = button.x - angle.cos() * self.step;
        let y = button.y - angle.sin() * self.step;

        let max_x = (viewport.0 - button.width - self.margin).max(self.margin);
        let max_y = (viewport.1 - button.height - self.margin).max(self.margin);
        Some(Rect {
            x: x.clamp(self.margin, max_x),
            y: y.clamp(self.margin, max_y),
            ..button
        })
    }
}
