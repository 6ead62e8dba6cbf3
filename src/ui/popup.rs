use ratatui::layout::Rect;

/// Creates a centered rect with min/max constraints for width and height.
/// The actual size prefers max, is clamped to fit within `area` with a
/// two cell margin, and never goes below min unless `area` itself is smaller.
pub fn centered_rect_constrained(
    area: Rect,
    min_width: u16,
    max_width: u16,
    min_height: u16,
    max_height: u16,
) -> Rect {
    let w = max_width
        .min(area.width.saturating_sub(4))
        .max(min_width)
        .min(area.width);
    let h = max_height
        .min(area.height.saturating_sub(4))
        .max(min_height)
        .min(area.height);

    let x = area.x + (area.width - w) / 2;
    let y = area.y + (area.height - h) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_max_size_when_room() {
        let r = centered_rect_constrained(Rect::new(0, 0, 100, 40), 20, 72, 8, 18);
        assert_eq!(r, Rect::new(14, 11, 72, 18));
    }

    #[test]
    fn test_stays_inside_small_area() {
        let area = Rect::new(5, 2, 30, 10);
        let r = centered_rect_constrained(area, 40, 72, 12, 18);
        assert_eq!(r, area);
    }
}
